//! Command-line interface for the batch runner.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::engine::EngineKind;

/// Run Postman collections in batch against one environment.
#[derive(Debug, Parser)]
#[command(name = "getman-batch")]
#[command(about = "Getman batch runner - execute API test collections and summarise the results")]
pub struct Cli {
    /// Path to the configuration file (defaults to ./getman-batch.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub overrides: Overrides,

    #[command(subcommand)]
    pub command: Commands,
}

/// Settings that take precedence over the configuration file.
#[derive(Debug, Clone, Default, Args)]
pub struct Overrides {
    /// Environment file name inside the environment directory (can also be set via GETMAN_ENV_FILE)
    #[arg(short, long, env = "GETMAN_ENV_FILE", global = true)]
    pub env_file: Option<String>,

    /// Root of the collections tree
    #[arg(long, global = true)]
    pub collections_dir: Option<PathBuf>,

    /// Directory holding environment definitions
    #[arg(long, global = true)]
    pub environment_dir: Option<PathBuf>,

    /// Root directory for HTML reports
    #[arg(long, global = true)]
    pub report_dir: Option<PathBuf>,

    /// Execution engine (can also be set via GETMAN_ENGINE)
    #[arg(long, value_enum, env = "GETMAN_ENGINE", global = true)]
    pub engine: Option<EngineKind>,

    /// Command used to launch newman (can also be set via GETMAN_NEWMAN)
    #[arg(long, env = "GETMAN_NEWMAN", global = true)]
    pub newman: Option<String>,

    /// Validate TLS certificates
    #[arg(long, global = true)]
    pub secure: bool,

    /// Script execution timeout in milliseconds
    #[arg(long, global = true)]
    pub script_timeout: Option<u64>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run every eligible collection in sequence
    Run {
        /// Also write the run summaries as JSON to this path
        #[arg(long)]
        summary: Option<PathBuf>,
    },
    /// List the eligible collections without running them
    List,
}
