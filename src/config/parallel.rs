//! Parallelism configuration for per-file analysis.

use serde::{Deserialize, Serialize};

fn default_enabled() -> bool {
    true
}

/// Controls the worker pool that analyzes files.
///
/// When enabled, files are processed concurrently on a rayon pool sized by
/// `max_concurrency` (or the number of CPU cores when unset).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParallelConfig {
    /// Enable parallel processing (default: true)
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Maximum worker threads (default: available cores)
    #[serde(default)]
    pub max_concurrency: Option<usize>,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_concurrency: None,
        }
    }
}

impl ParallelConfig {
    /// Create a config with parallel processing disabled.
    pub fn sequential() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Worker count actually used; a sequential config always yields 1.
    pub fn effective_concurrency(&self) -> usize {
        if !self.enabled {
            return 1;
        }
        self.max_concurrency.filter(|n| *n > 0).unwrap_or_else(num_cpus)
    }
}

/// Returns the number of available CPU cores.
fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_uses_one_worker() {
        assert_eq!(ParallelConfig::sequential().effective_concurrency(), 1);
    }

    #[test]
    fn test_explicit_concurrency() {
        let config = ParallelConfig {
            enabled: true,
            max_concurrency: Some(3),
        };
        assert_eq!(config.effective_concurrency(), 3);
    }

    #[test]
    fn test_zero_concurrency_falls_back_to_cores() {
        let config = ParallelConfig {
            enabled: true,
            max_concurrency: Some(0),
        };
        assert!(config.effective_concurrency() >= 1);
    }
}
