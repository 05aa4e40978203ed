//! Worklog split CLI library.
//!
//! This crate provides the CLI interface for allocating hours and logging
//! them to Tempo.

mod cli;
pub mod commands;
mod config;
pub mod plan;

pub use cli::{Cli, Commands};
pub use config::Config;
