//! # Execution Engines
//!
//! An engine runs one collection against one environment, writes the HTML
//! report and hands back the run statistics. The orchestrator only talks to
//! the [`Engine`] trait; which engine is used is a configuration choice.

pub mod http;
pub mod newman;

use std::fmt::{self, Display};
use std::path::PathBuf;

use clap::ValueEnum;
use serde::Deserialize;

use crate::config::RunnerConfig;
use crate::error::Result;

/// A structured document loaded from disk, kept with its origin.
#[derive(Debug, Clone)]
pub struct Document {
    pub path: PathBuf,
    pub value: serde_json::Value,
}

/// Everything an engine needs for one collection run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub collection: Document,
    pub environment: Document,
    pub report_path: PathBuf,
    /// Skip TLS certificate validation.
    pub insecure: bool,
    pub script_timeout_ms: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Counter {
    pub total: u64,
    pub failed: u64,
}

impl Counter {
    pub fn record(&mut self, passed: bool) {
        self.total += 1;
        if !passed {
            self.failed += 1;
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStats {
    pub requests: Counter,
    pub assertions: Counter,
    pub test_scripts: Counter,
}

/// Start and completion of a run, in milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct RunTimings {
    pub started: i64,
    pub completed: i64,
}

/// Terminal result of a successful run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct RunResult {
    pub stats: RunStats,
    pub timings: RunTimings,
}

pub trait Engine {
    fn name(&self) -> &'static str;

    /// Run one collection to completion.
    fn run(&mut self, options: &RunOptions) -> Result<RunResult>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// The external `newman` CLI.
    #[default]
    Newman,
    /// Built-in HTTP smoke runner.
    Http,
}

impl Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EngineKind::Newman => "newman",
            EngineKind::Http => "http",
        };
        write!(f, "{label}")
    }
}

/// Build the engine selected in `config`.
pub fn from_config(config: &RunnerConfig) -> Box<dyn Engine> {
    match config.engine {
        EngineKind::Newman => Box::new(newman::NewmanEngine::new(&config.newman_command)),
        EngineKind::Http => Box::new(http::HttpEngine::new()),
    }
}
