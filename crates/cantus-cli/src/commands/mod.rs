//! CLI command implementations

pub mod analyze;
pub mod compose;
pub mod styles;
