use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::errors::ReptestError;

pub const DEFAULT_DURATION_SECONDS: u64 = 10;
pub const DEFAULT_MIN_ITERATIONS: u64 = 100;

/// Settings for one call to `RepetitionTester::run_all_tests`.
///
/// Built once by the caller and read-only for the duration of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    pub duration_budget_seconds: u64,
    pub min_iterations: u64,
    pub show_progress: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            duration_budget_seconds: DEFAULT_DURATION_SECONDS,
            min_iterations: DEFAULT_MIN_ITERATIONS,
            show_progress: true,
        }
    }
}

/// On-disk form of `RunConfig`; every key is optional.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub duration_seconds: Option<u64>,
    pub min_iterations: Option<u64>,
    pub show_progress: Option<bool>,
}

impl RunConfig {
    pub fn with_duration_budget(mut self, seconds: u64) -> Self {
        self.duration_budget_seconds = seconds;
        self
    }

    pub fn with_min_iterations(mut self, iterations: u64) -> Self {
        self.min_iterations = iterations;
        self
    }

    pub fn with_show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Duration budget in clock ticks, saturating instead of overflowing.
    pub fn duration_budget_ticks(&self) -> u64 {
        self.duration_budget_seconds.saturating_mul(1_000_000_000)
    }

    /// Overlays any keys present in `file` onto this config.
    pub fn merge(self, file: &ConfigFile) -> Self {
        Self {
            duration_budget_seconds: file
                .duration_seconds
                .unwrap_or(self.duration_budget_seconds),
            min_iterations: file.min_iterations.unwrap_or(self.min_iterations),
            show_progress: file.show_progress.unwrap_or(self.show_progress),
        }
    }

    pub fn from_toml_str(contents: &str, path: &Path) -> Result<Self, ReptestError> {
        let file = parse_config_file(contents, path)?;
        Ok(Self::default().merge(&file))
    }

    pub fn load(path: &Path) -> Result<Self, ReptestError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ReptestError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents, path)
    }
}

pub fn parse_config_file(contents: &str, path: &Path) -> Result<ConfigFile, ReptestError> {
    toml::from_str(contents).map_err(|e| ReptestError::ConfigParse {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })
}

/// `<config dir>/reptest/config.toml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("reptest").join("config.toml"))
}
