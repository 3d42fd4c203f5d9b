//! Cantus End-to-End Test Infrastructure
//!
//! This crate holds the integration tests for the composition pipeline:
//!
//! - **Pipeline**: text in, assembled composition out, with diagnostics
//! - **Determinism**: identical requests give identical compositions
//! - **Invariants**: property tests over random prompts, seeds and overrides
//! - **Style providers**: static and generative template sources
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p cantus-tests
//! ```

pub mod determinism;
pub mod fixtures;

pub use determinism::{
    composition_bytes, compute_hash, verify_composition_determinism, verify_determinism,
    DeterminismResult, DiffInfo,
};
