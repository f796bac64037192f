//! Engine backed by the external `newman` CLI.
//!
//! newman prints its `cli` report to the console, writes the `htmlextra`
//! report, and exports the full run summary through the `json` reporter,
//! which is where the statistics are read back from.

use std::ffi::OsString;
use std::fs;
use std::path::Path;
use std::process::Command;

use serde::Deserialize;
use tracing::debug;

use super::{Engine, RunOptions, RunResult, RunStats, RunTimings};
use crate::error::{Error, Result};

const REPORTERS: &str = "cli,htmlextra,json";

#[derive(Debug, Clone)]
pub struct NewmanEngine {
    program: String,
    prefix_args: Vec<String>,
}

impl NewmanEngine {
    /// `command` may carry leading arguments, e.g. `npx newman`.
    pub fn new(command: &str) -> Self {
        let mut parts = command.split_whitespace().map(String::from);
        let program = parts.next().unwrap_or_else(|| "newman".to_string());
        Self {
            program,
            prefix_args: parts.collect(),
        }
    }

    /// Full argument list passed to the newman program.
    pub fn arguments(&self, options: &RunOptions, json_export: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.prefix_args.iter().map(OsString::from).collect();
        args.push("run".into());
        args.push(options.collection.path.clone().into());
        args.push("--environment".into());
        args.push(options.environment.path.clone().into());
        args.push("--reporters".into());
        args.push(REPORTERS.into());
        args.push("--reporter-htmlextra-export".into());
        args.push(options.report_path.clone().into());
        args.push("--reporter-json-export".into());
        args.push(json_export.into());
        args.push("--timeout-script".into());
        args.push(options.script_timeout_ms.to_string().into());
        if options.insecure {
            args.push("--insecure".into());
        }
        args
    }
}

impl Engine for NewmanEngine {
    fn name(&self) -> &'static str {
        "newman"
    }

    fn run(&mut self, options: &RunOptions) -> Result<RunResult> {
        let export = tempfile::Builder::new()
            .prefix("getman-newman-")
            .suffix(".json")
            .tempfile()
            .map_err(|e| Error::Engine(format!("Failed to create newman export file: {e}")))?;

        let args = self.arguments(options, export.path());
        debug!("{} {:?}", self.program, args);

        let status = Command::new(&self.program)
            .args(&args)
            .status()
            .map_err(|e| Error::Engine(format!("Failed to launch `{}`: {e}", self.program)))?;

        let raw = fs::read_to_string(export.path()).map_err(|source| Error::Read {
            path: export.path().to_path_buf(),
            source,
        })?;
        if raw.trim().is_empty() {
            return Err(Error::Engine(format!(
                "newman exited with {status} without producing a run result"
            )));
        }
        if !status.success() {
            // newman exits non-zero when assertions fail; the export still holds the run.
            debug!("newman exited with {status}");
        }

        parse_export(&raw)
    }
}

#[derive(Debug, Deserialize)]
struct NewmanExport {
    run: NewmanRun,
}

#[derive(Debug, Deserialize)]
struct NewmanRun {
    stats: RunStats,
    timings: RunTimings,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

/// Read a run result from newman's JSON reporter export.
pub fn parse_export(raw: &str) -> Result<RunResult> {
    let export: NewmanExport = serde_json::from_str(raw)?;

    if let Some(error) = export.run.error {
        let message = error
            .get("message")
            .and_then(serde_json::Value::as_str)
            .map(String::from)
            .unwrap_or_else(|| error.to_string());
        return Err(Error::Engine(message));
    }

    Ok(RunResult {
        stats: export.run.stats,
        timings: export.run.timings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Counter, Document};
    use serde_json::json;
    use std::path::PathBuf;
    use tempfile::tempdir;

    const EXPORT: &str = r#"{
        "collection": { "info": { "name": "users" } },
        "run": {
            "stats": {
                "iterations": { "total": 1, "pending": 0, "failed": 0 },
                "requests": { "total": 3, "pending": 0, "failed": 0 },
                "testScripts": { "total": 3, "pending": 0, "failed": 1 },
                "assertions": { "total": 7, "pending": 0, "failed": 2 }
            },
            "timings": { "responseAverage": 20, "started": 1700000000000, "completed": 1700000125000 },
            "failures": [],
            "error": null
        }
    }"#;

    fn options(dir: &Path, insecure: bool) -> RunOptions {
        RunOptions {
            collection: Document {
                path: dir.join("collections").join("users.json"),
                value: json!({}),
            },
            environment: Document {
                path: dir.join("environment").join("qa.json"),
                value: json!({}),
            },
            report_path: dir.join("report").join("users.html"),
            insecure,
            script_timeout_ms: 1_800_000,
        }
    }

    #[test]
    fn splits_command_prefix() {
        let engine = NewmanEngine::new("npx newman");
        assert_eq!(engine.program, "npx");
        assert_eq!(engine.prefix_args, vec!["newman"]);

        let engine = NewmanEngine::new("newman");
        assert!(engine.prefix_args.is_empty());
    }

    #[test]
    fn arguments_cover_reporters_timeout_and_tls() {
        let dir = PathBuf::from("/suite");
        let engine = NewmanEngine::new("newman");
        let args: Vec<String> = engine
            .arguments(&options(&dir, true), Path::new("/tmp/export.json"))
            .into_iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();

        assert_eq!(args[0], "run");
        assert_eq!(args[1], dir.join("collections").join("users.json").to_string_lossy());
        let position = |flag: &str| args.iter().position(|arg| arg == flag).unwrap();
        assert_eq!(args[position("--environment") + 1], dir.join("environment").join("qa.json").to_string_lossy());
        assert_eq!(args[position("--reporters") + 1], "cli,htmlextra,json");
        assert_eq!(args[position("--reporter-htmlextra-export") + 1], dir.join("report").join("users.html").to_string_lossy());
        assert_eq!(args[position("--reporter-json-export") + 1], "/tmp/export.json");
        assert_eq!(args[position("--timeout-script") + 1], "1800000");
        assert_eq!(args.last().unwrap(), "--insecure");

        let secure: Vec<OsString> = engine.arguments(&options(&dir, false), Path::new("/tmp/export.json"));
        assert!(!secure.contains(&OsString::from("--insecure")));
    }

    #[test]
    fn parse_export_reads_stats_and_timings() {
        let result = parse_export(EXPORT).unwrap();
        assert_eq!(result.stats.requests, Counter { total: 3, failed: 0 });
        assert_eq!(result.stats.assertions, Counter { total: 7, failed: 2 });
        assert_eq!(result.stats.test_scripts, Counter { total: 3, failed: 1 });
        assert_eq!(result.timings.completed - result.timings.started, 125_000);
    }

    #[test]
    fn parse_export_surfaces_run_error() {
        let raw = EXPORT.replace(r#""error": null"#, r#""error": { "message": "collection could not be loaded" }"#);
        let err = parse_export(&raw).unwrap_err();
        assert!(matches!(err, Error::Engine(message) if message == "collection could not be loaded"));
    }

    #[test]
    fn parse_export_rejects_missing_fields() {
        let err = parse_export(r#"{ "run": { "stats": {} } }"#).unwrap_err();
        assert!(matches!(err, Error::RunResult(_)));
    }

    #[cfg(unix)]
    #[test]
    fn runs_fake_newman_and_reads_export() {
        let dir = tempdir().unwrap();
        let export = dir.path().join("canned.json");
        fs::write(&export, EXPORT).unwrap();
        let script = dir.path().join("newman.sh");
        fs::write(
            &script,
            format!(
                "while [ $# -gt 0 ]; do\n  if [ \"$1\" = \"--reporter-json-export\" ]; then out=\"$2\"; fi\n  shift\ndone\ncp \"{}\" \"$out\"\nexit 1\n",
                export.display()
            ),
        )
        .unwrap();

        let mut engine = NewmanEngine::new(&format!("sh {}", script.display()));
        let result = engine.run(&options(dir.path(), true)).unwrap();
        assert_eq!(result.stats.assertions.failed, 2);
    }

    #[cfg(unix)]
    #[test]
    fn crash_without_export_is_an_engine_error() {
        let dir = tempdir().unwrap();
        let script = dir.path().join("newman.sh");
        fs::write(&script, "echo boom >&2\nexit 3\n").unwrap();

        let mut engine = NewmanEngine::new(&format!("sh {}", script.display()));
        let err = engine.run(&options(dir.path(), true)).unwrap_err();
        assert!(matches!(err, Error::Engine(_)));
    }

    #[test]
    fn missing_program_is_an_engine_error() {
        let dir = tempdir().unwrap();
        let mut engine = NewmanEngine::new("getman-batch-no-such-newman");
        let err = engine.run(&options(dir.path(), true)).unwrap_err();
        assert!(matches!(err, Error::Engine(message) if message.contains("Failed to launch")));
    }
}
