mod loader;
mod parallel;
mod thresholds;

pub use loader::{directory_ancestors, load_config, parse_and_validate_config, CONFIG_FILE_NAME};
pub use parallel::ParallelConfig;
pub use thresholds::ThresholdsConfig;

use crate::core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration structure for codesense
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CodesenseConfig {
    #[serde(default)]
    pub analysis: AnalysisSettings,

    #[serde(default)]
    pub thresholds: ThresholdsConfig,

    #[serde(default)]
    pub ignore: IgnoreConfig,

    #[serde(default)]
    pub parallel: ParallelConfig,
}

impl CodesenseConfig {
    /// Check every section, reporting all problems at once.
    pub fn validate(&self) -> Result<()> {
        let mut errors = self.thresholds.validation_errors();

        for pattern in &self.ignore.patterns {
            if let Err(e) = glob::Pattern::new(pattern) {
                errors.push(format!("ignore pattern '{pattern}' is invalid: {e}"));
            }
        }
        if self.ignore.directories.iter().any(|d| d.trim().is_empty()) {
            errors.push("ignore.directories must not contain empty names".to_string());
        }
        if self.analysis.max_file_bytes == 0 {
            errors.push("analysis.max_file_bytes must be at least 1".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Configuration(errors.join("; ")))
        }
    }

    /// Render as TOML, used by `codesense init`.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Configuration(format!("cannot serialize config: {e}")))
    }
}

/// Per-file analysis budgets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisSettings {
    /// Files longer than this skip the expensive security scans
    #[serde(default = "default_security_scan_max_lines")]
    pub security_scan_max_lines: usize,

    /// Wall-clock budget per file in milliseconds; 0 disables it
    #[serde(default = "default_file_timeout_ms")]
    pub file_timeout_ms: u64,

    /// Larger files are not read
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            security_scan_max_lines: default_security_scan_max_lines(),
            file_timeout_ms: default_file_timeout_ms(),
            max_file_bytes: default_max_file_bytes(),
        }
    }
}

impl AnalysisSettings {
    pub fn file_timeout(&self) -> Option<Duration> {
        (self.file_timeout_ms > 0).then(|| Duration::from_millis(self.file_timeout_ms))
    }
}

fn default_security_scan_max_lines() -> usize {
    5000
}
fn default_file_timeout_ms() -> u64 {
    10_000
}
fn default_max_file_bytes() -> u64 {
    5 * 1024 * 1024
}

/// Directories and globs never descended into.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IgnoreConfig {
    #[serde(default = "default_ignored_directories")]
    pub directories: Vec<String>,

    /// Glob patterns matched against directory names and repo-relative paths
    #[serde(default = "default_ignore_patterns")]
    pub patterns: Vec<String>,

    #[serde(default)]
    pub respect_gitignore: bool,
}

impl Default for IgnoreConfig {
    fn default() -> Self {
        Self {
            directories: default_ignored_directories(),
            patterns: default_ignore_patterns(),
            respect_gitignore: false,
        }
    }
}

fn default_ignored_directories() -> Vec<String> {
    [
        "node_modules",
        ".git",
        "__pycache__",
        ".venv",
        "venv",
        "env",
        ".env",
        "dist",
        "build",
        ".next",
        "coverage",
        ".pytest_cache",
        ".mypy_cache",
        "eggs",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_ignore_patterns() -> Vec<String> {
    vec!["*.egg-info".to_string()]
}
