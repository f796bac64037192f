mod cli;
mod collections;
mod config;
mod engine;
mod environment;
mod error;
mod http;
mod report;
mod runner;
mod storage;
mod testing;
mod timing;
mod walker;

use std::path::Path;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Commands};
use config::RunnerConfig;
use error::Result;
use runner::{Orchestrator, PassState, RunSummary};

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "getman_batch=debug"
    } else {
        "getman_batch=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = RunnerConfig::load(cli.config.as_deref())?;
    config.apply(&cli.overrides);
    config.validate()?;

    match cli.command {
        Commands::List => handle_list(&config),
        Commands::Run { summary } => handle_run(&config, summary.as_deref()),
    }
}

fn handle_list(config: &RunnerConfig) -> Result<()> {
    let discovered = collections::discover(&config.collections_dir, &config.env_file_name)?;
    for (path, file_name) in discovered.iter() {
        println!("{}\t{}", collections::collection_name(file_name), path.display());
    }
    info!("{} eligible collection(s)", discovered.len());
    Ok(())
}

fn handle_run(config: &RunnerConfig, summary_path: Option<&Path>) -> Result<()> {
    let mut engine = engine::from_config(config);
    info!(
        "Running collections from {} with {} on engine {}",
        config.collections_dir.display(),
        config.environment_file().display(),
        engine.name()
    );

    let mut orchestrator = Orchestrator::new(config, engine.as_mut());
    let summaries = match orchestrator.run() {
        Ok(summaries) => summaries,
        Err(e) => {
            if let PassState::Failed { index } = orchestrator.state() {
                error!("Pass aborted at collection #{}, remaining collections skipped", index + 1);
            }
            return Err(e);
        }
    };
    log_totals(&summaries);

    if let Some(path) = summary_path {
        storage::save_summary(path, &summaries)?;
        info!("Summary written to {}", path.display());
    }

    Ok(())
}

fn log_totals(summaries: &[RunSummary]) {
    let requests: u64 = summaries.iter().map(|s| s.requests_total).sum();
    let failed_requests: u64 = summaries.iter().map(|s| s.requests_failed).sum();
    let failed_assertions: u64 = summaries.iter().map(|s| s.assertions_failed).sum();

    info!(
        "Done: {} collection(s), {requests} request(s), {failed_requests} failed request(s), {failed_assertions} failed assertion(s)",
        summaries.len()
    );
}
