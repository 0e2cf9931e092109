//! Shared error types for the analysis pipeline

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Main error type for codesense operations
#[derive(Debug, Error)]
pub enum Error {
    /// File system related errors
    #[error("File system error: {message}")]
    FileSystem {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Parsing errors
    #[error("Parse error in {file}:{line}:{column}: {message}")]
    Parse {
        file: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    /// Analysis errors
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A single detection rule failed on a file
    #[error("Rule '{rule}' failed: {message}")]
    Rule { rule: String, message: String },

    /// Per-file time budget exhausted
    #[error("Analysis of {file} exceeded {budget:?}")]
    Timeout { file: PathBuf, budget: Duration },

    /// Repository root could not be acquired
    #[error("Cannot read repository at {path}: {message}")]
    Acquisition { path: PathBuf, message: String },

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Generic errors with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },

    /// IO errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// TOML errors
    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    /// Pattern errors
    #[error(transparent)]
    Pattern(#[from] glob::PatternError),
}

impl Error {
    /// Create a file system error with path context
    pub fn file_system(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::FileSystem {
            message: message.into(),
            path: Some(path.into()),
            source: None,
        }
    }

    /// Create a file system error wrapping the io cause
    pub fn io_at(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::FileSystem {
            message: source.to_string(),
            path: Some(path.into()),
            source: Some(source),
        }
    }

    /// Create a parse error with location
    pub fn parse(
        file: impl Into<PathBuf>,
        line: usize,
        column: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::Parse {
            file: file.into(),
            line,
            column,
            message: message.into(),
        }
    }

    pub fn rule(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rule {
            rule: rule.into(),
            message: message.into(),
        }
    }

    pub fn timeout(file: impl Into<PathBuf>, budget: Duration) -> Self {
        Self::Timeout {
            file: file.into(),
            budget,
        }
    }

    pub fn acquisition(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Acquisition {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            message: self.to_string(),
        }
    }

    /// Errors confined to one file or one rule; the run continues past them.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Acquisition { .. } | Self::Configuration(_))
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquisition_is_fatal() {
        let err = Error::acquisition("/missing", "not found");
        assert!(!err.is_recoverable());
        assert!(err.to_string().contains("/missing"));
    }

    #[test]
    fn test_rule_and_timeout_are_recoverable() {
        assert!(Error::rule("py-bare-except", "boom").is_recoverable());
        assert!(Error::timeout("a.py", Duration::from_millis(5)).is_recoverable());
    }

    #[test]
    fn test_context_wraps_message() {
        let result: Result<()> = Err(Error::Analysis("bad".into()));
        let err = result.context("scoring a.py").unwrap_err();
        assert_eq!(err.to_string(), "scoring a.py: Analysis error: bad");
    }
}
