//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::allocate::AllocateArgs;
use crate::commands::run::RunArgs;
use crate::commands::submit::SubmitArgs;

/// Split a pool of hours across tickets and log them to Tempo.
///
/// Hours are divided evenly over the working days of a date range, then by
/// ticket and activity percentages from a plan file.
#[derive(Debug, Parser)]
#[command(name = "wl", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compute the per-day allocation table for a plan.
    Allocate(AllocateArgs),

    /// Log a saved allocation table to Tempo.
    Submit(SubmitArgs),

    /// Allocate a plan and log it to Tempo in one step.
    Run(RunArgs),
}
