//! Cantus CLI library.
//!
//! This crate hosts the composition pipeline on the command line: argument
//! parsing, loading budgets and style registries, and the subcommands.

pub mod cli_args;
pub mod commands;
pub mod config;
