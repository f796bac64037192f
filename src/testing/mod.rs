//! # Testing & Assertions
//!
//! Assertions evaluated by the HTTP engine and the per-request outcomes that
//! make up its report.

use crate::engine::{Counter, RunStats};

/// Status codes from this value upwards fail the default assertion.
const FIRST_ERROR_STATUS: u16 = 400;

/// A check evaluated against a response status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assertion {
    pub name: String,
    /// Exclusive upper bound for a passing status.
    pub status_below: u16,
}

impl Assertion {
    /// The check applied to every request: the status is not a 4xx or 5xx.
    pub fn status_not_error() -> Self {
        Self {
            name: "Status code is not an error".to_string(),
            status_below: FIRST_ERROR_STATUS,
        }
    }

    pub fn evaluate(&self, status: u16) -> AssertionResult {
        let passed = status < self.status_below;
        let message = if passed {
            String::new()
        } else {
            format!("expected status below {}, got {status}", self.status_below)
        };

        AssertionResult {
            name: self.name.clone(),
            passed,
            actual: status.to_string(),
            message,
        }
    }
}

/// Result of evaluating an assertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionResult {
    pub name: String,
    pub passed: bool,
    pub actual: String,
    pub message: String,
}

/// What happened to a single request.
#[derive(Debug, Clone, Default)]
pub struct RequestOutcome {
    pub name: String,
    pub method: String,
    pub url: String,
    pub status: Option<u16>,
    pub status_text: String,
    pub duration_ms: u64,
    pub size_bytes: usize,
    /// Transport-level failure; no response was received.
    pub error: Option<String>,
    pub assertions: Vec<AssertionResult>,
}

impl RequestOutcome {
    pub fn passed(&self) -> bool {
        self.error.is_none() && self.assertions.iter().all(|a| a.passed)
    }
}

/// Summary report for one collection run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub collection: String,
    pub environment: String,
    pub started: i64,
    pub completed: i64,
    /// Test scripts present in the collection but not executed.
    pub skipped_scripts: usize,
    pub outcomes: Vec<RequestOutcome>,
}

impl RunReport {
    pub fn stats(&self) -> RunStats {
        let mut requests = Counter::default();
        let mut assertions = Counter::default();

        for outcome in &self.outcomes {
            requests.record(outcome.error.is_none());
            for assertion in &outcome.assertions {
                assertions.record(assertion.passed);
            }
        }

        RunStats {
            requests,
            assertions,
            test_scripts: Counter::default(),
        }
    }
}
