//! # Run Orchestrator
//!
//! Runs every eligible collection, one after another, and gathers a
//! [`RunSummary`] for each. The first failure ends the pass: the failing
//! collection gets no summary and the remaining collections are not started.

use std::path::Path;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::collections::{self, Discovered};
use crate::config::RunnerConfig;
use crate::engine::{Engine, RunOptions, RunResult};
use crate::error::Result;
use crate::report::ReportFolder;
use crate::storage;
use crate::timing::format_elapsed;

/// Outcome of one collection, as recorded in the pass summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    #[serde(rename = "Collection")]
    pub collection: String,
    #[serde(rename = "RequestsTotal")]
    pub requests_total: u64,
    #[serde(rename = "RequestFailed")]
    pub requests_failed: u64,
    #[serde(rename = "AssertionsFailed")]
    pub assertions_failed: u64,
    #[serde(rename = "TestScriptTotal")]
    pub test_scripts_total: u64,
    #[serde(rename = "TestScriptFailed")]
    pub test_scripts_failed: u64,
    #[serde(rename = "Report_link")]
    pub report_link: String,
}

impl RunSummary {
    fn new(collection: &str, result: &RunResult, report_link: String) -> Self {
        let stats = &result.stats;
        Self {
            collection: collection.to_string(),
            requests_total: stats.requests.total,
            requests_failed: stats.requests.failed,
            assertions_failed: stats.assertions.failed,
            test_scripts_total: stats.test_scripts.total,
            test_scripts_failed: stats.test_scripts.failed,
            report_link,
        }
    }
}

/// Where a pass currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassState {
    Idle,
    Running { index: usize },
    Succeeded,
    Failed { index: usize },
}

pub struct Orchestrator<'a, E: Engine + ?Sized> {
    config: &'a RunnerConfig,
    engine: &'a mut E,
    state: PassState,
}

impl<'a, E: Engine + ?Sized> Orchestrator<'a, E> {
    pub fn new(config: &'a RunnerConfig, engine: &'a mut E) -> Self {
        Self {
            config,
            engine,
            state: PassState::Idle,
        }
    }

    pub fn state(&self) -> PassState {
        self.state
    }

    /// Discover and run every eligible collection.
    pub fn run(&mut self) -> Result<Vec<RunSummary>> {
        self.run_in(ReportFolder::now())
    }

    /// Run the pass with every report placed under `folder`.
    pub fn run_in(&mut self, folder: ReportFolder) -> Result<Vec<RunSummary>> {
        let discovered =
            collections::discover(&self.config.collections_dir, &self.config.env_file_name)?;
        info!(
            "Found {} collection(s) in {}",
            discovered.len(),
            self.config.collections_dir.display()
        );
        if discovered.is_empty() {
            warn!("No eligible collections to run");
        }
        if self.config.insecure {
            warn!("TLS certificate validation is disabled");
        }

        self.run_discovered(&discovered, &folder)
    }

    fn run_discovered(
        &mut self,
        discovered: &Discovered,
        folder: &ReportFolder,
    ) -> Result<Vec<RunSummary>> {
        let mut summaries = Vec::with_capacity(discovered.len());

        for (index, (path, file_name)) in discovered.iter().enumerate() {
            self.state = PassState::Running { index };

            match self.run_one(path, file_name, folder) {
                Ok(summary) => summaries.push(summary),
                Err(err) => {
                    error!("Error in {file_name}: {err}");
                    if let PassState::Running { index } = self.state {
                        self.state = PassState::Failed { index };
                    }
                    return Err(err);
                }
            }
        }

        self.state = PassState::Succeeded;
        Ok(summaries)
    }

    fn run_one(
        &mut self,
        path: &Path,
        file_name: &str,
        folder: &ReportFolder,
    ) -> Result<RunSummary> {
        let environment_path = self.config.environment_file();
        let name = collections::collection_name(file_name);

        let options = RunOptions {
            collection: storage::load_document(path)?,
            environment: storage::load_document(&environment_path)?,
            report_path: folder.export_path(&self.config.report_dir, name),
            insecure: self.config.insecure,
            script_timeout_ms: self.config.script_timeout_ms,
        };

        info!("Executing: {name}");
        debug!(
            "engine={} collection={} environment={} report={}",
            self.engine.name(),
            path.display(),
            environment_path.display(),
            options.report_path.display()
        );

        let result = self.engine.run(&options)?;
        let summary = RunSummary::new(name, &result, folder.link(name));

        info!(
            "Execution Time: {}",
            format_elapsed(result.timings.started, result.timings.completed)
        );
        info!("{summary:?}");

        Ok(summary)
    }
}
