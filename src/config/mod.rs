//! # Runner Configuration
//!
//! Settings come from an optional TOML file, then environment variables and
//! command-line flags (see [`crate::cli::Overrides`]), later sources winning.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::cli::Overrides;
use crate::engine::EngineKind;
use crate::environment::environment_path;
use crate::error::{Error, Result};

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "getman-batch.toml";

/// 30 minutes.
pub const DEFAULT_SCRIPT_TIMEOUT_MS: u64 = 1_800_000;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunnerConfig {
    /// File name of the environment definition inside `environment_dir`.
    pub env_file_name: String,
    pub collections_dir: PathBuf,
    pub environment_dir: PathBuf,
    pub report_dir: PathBuf,
    /// Skip TLS certificate validation. Self-signed certificates are common
    /// on test environments, hence the default.
    pub insecure: bool,
    pub script_timeout_ms: u64,
    pub engine: EngineKind,
    pub newman_command: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            env_file_name: String::new(),
            collections_dir: PathBuf::from("collections"),
            environment_dir: PathBuf::from("environment"),
            report_dir: PathBuf::from("./report"),
            insecure: true,
            script_timeout_ms: DEFAULT_SCRIPT_TIMEOUT_MS,
            engine: EngineKind::Newman,
            newman_command: "newman".to_string(),
        }
    }
}

impl RunnerConfig {
    /// Load `path`, or the default config file if present, or built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| Error::ConfigFile {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(env_file) = &overrides.env_file {
            self.env_file_name = env_file.clone();
        }
        if let Some(dir) = &overrides.collections_dir {
            self.collections_dir = dir.clone();
        }
        if let Some(dir) = &overrides.environment_dir {
            self.environment_dir = dir.clone();
        }
        if let Some(dir) = &overrides.report_dir {
            self.report_dir = dir.clone();
        }
        if let Some(engine) = overrides.engine {
            self.engine = engine;
        }
        if let Some(command) = &overrides.newman {
            self.newman_command = command.clone();
        }
        if overrides.secure {
            self.insecure = false;
        }
        if let Some(timeout) = overrides.script_timeout {
            self.script_timeout_ms = timeout;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.env_file_name.trim().is_empty() {
            return Err(Error::Config(
                "environment file name is missing. Set GETMAN_ENV_FILE, use --env-file or set env_file_name in the config file".to_string(),
            ));
        }
        if self.script_timeout_ms == 0 {
            return Err(Error::Config("script_timeout_ms must be greater than zero".to_string()));
        }
        if self.newman_command.trim().is_empty() {
            return Err(Error::Config("newman_command cannot be empty".to_string()));
        }
        Ok(())
    }

    /// Path of the selected environment definition.
    pub fn environment_file(&self) -> PathBuf {
        environment_path(&self.environment_dir, &self.env_file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_match_documented_values() {
        let config = RunnerConfig::default();
        assert!(config.insecure);
        assert_eq!(config.script_timeout_ms, 1_800_000);
        assert_eq!(config.engine, EngineKind::Newman);
        assert_eq!(config.report_dir, PathBuf::from("./report"));
    }

    #[test]
    fn reads_partial_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("getman-batch.toml");
        fs::write(
            &path,
            "env_file_name = \"qa.json\"\nengine = \"http\"\ninsecure = false\n",
        )
        .unwrap();

        let config = RunnerConfig::load(Some(&path)).unwrap();
        assert_eq!(config.env_file_name, "qa.json");
        assert_eq!(config.engine, EngineKind::Http);
        assert!(!config.insecure);
        assert_eq!(config.collections_dir, PathBuf::from("collections"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "env_file = \"qa.json\"\n").unwrap();

        let err = RunnerConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, Error::ConfigFile { .. }));
    }

    #[test]
    fn overrides_win_over_file_values() {
        let mut config = RunnerConfig {
            env_file_name: "dev.json".into(),
            ..Default::default()
        };
        config.apply(&Overrides {
            env_file: Some("qa.json".into()),
            report_dir: Some(PathBuf::from("out")),
            engine: Some(EngineKind::Http),
            secure: true,
            script_timeout: Some(60_000),
            ..Default::default()
        });

        assert_eq!(config.env_file_name, "qa.json");
        assert_eq!(config.report_dir, PathBuf::from("out"));
        assert_eq!(config.engine, EngineKind::Http);
        assert!(!config.insecure);
        assert_eq!(config.script_timeout_ms, 60_000);
        assert_eq!(config.collections_dir, PathBuf::from("collections"));
    }

    #[test]
    fn validate_requires_environment_file_name() {
        let err = RunnerConfig::default().validate().unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let config = RunnerConfig {
            env_file_name: "qa.json".into(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn environment_file_lives_in_environment_dir() {
        let config = RunnerConfig {
            env_file_name: "qa.json".into(),
            environment_dir: PathBuf::from("suite/environment"),
            ..Default::default()
        };
        assert_eq!(config.environment_file(), PathBuf::from("suite/environment/qa.json"));
    }
}
