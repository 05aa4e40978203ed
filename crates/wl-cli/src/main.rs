use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use wl_cli::commands::{allocate, run, submit};
use wl_cli::{Cli, Commands, Config};
use wl_tempo::SubmissionReport;

fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

/// Submission runs on a single thread; requests go out one at a time.
fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    Ok(runtime.block_on(future))
}

fn ensure_submitted(report: &SubmissionReport) -> Result<()> {
    if report.all_succeeded() {
        return Ok(());
    }
    anyhow::bail!(
        "{} of {} worklogs were not logged",
        report.failed().count() + report.not_attempted,
        report.results.len() + report.not_attempted
    )
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let mut stdout = io::stdout();
    match &cli.command {
        Some(Commands::Allocate(args)) => {
            let config = load_config(cli.config.as_deref())?;
            allocate::run(&mut stdout, args, &config)?;
        }
        Some(Commands::Submit(args)) => {
            let config = load_config(cli.config.as_deref())?;
            let report = block_on(submit::run(&mut stdout, args, &config))??;
            ensure_submitted(&report)?;
        }
        Some(Commands::Run(args)) => {
            let config = load_config(cli.config.as_deref())?;
            let report = block_on(run::run(&mut stdout, args, &config))??;
            ensure_submitted(&report)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
