//! CLI subcommand implementations.

pub mod allocate;
pub mod run;
pub mod submit;
