use std::fs;
use std::path::{Path, PathBuf};

use super::CodesenseConfig;
use crate::core::{Error, Result};

pub const CONFIG_FILE_NAME: &str = ".codesense.toml";

const MAX_TRAVERSAL_DEPTH: usize = 10;

/// Parse and validate config from a TOML string
pub fn parse_and_validate_config(contents: &str) -> Result<CodesenseConfig> {
    let config = toml::from_str::<CodesenseConfig>(contents)?;
    config.validate()?;
    Ok(config)
}

/// Generate directory ancestors up to a depth limit
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Resolve the configuration for an analysis of `root`.
///
/// An explicit path must exist and be valid. Discovered files that fail to
/// parse are logged and skipped in favour of defaults.
pub fn load_config(explicit: Option<&Path>, root: &Path) -> Result<CodesenseConfig> {
    if let Some(path) = explicit {
        let contents = fs::read_to_string(path).map_err(|e| Error::io_at(e, path))?;
        let config = parse_and_validate_config(&contents).map_err(|e| {
            Error::Configuration(format!("{}: {}", path.display(), e))
        })?;
        tracing::debug!("Loaded config from {}", path.display());
        return Ok(config);
    }

    if let Some(config) = try_load_config_from_path(&root.join(CONFIG_FILE_NAME)) {
        return Ok(config);
    }

    let current = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            tracing::warn!("Failed to get current directory: {}. Using default config.", e);
            return Ok(CodesenseConfig::default());
        }
    };

    Ok(directory_ancestors(current, MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find_map(|path| try_load_config_from_path(&path))
        .unwrap_or_else(|| {
            tracing::debug!(
                "No config found after checking {} directories. Using default config.",
                MAX_TRAVERSAL_DEPTH
            );
            CodesenseConfig::default()
        }))
}

fn try_load_config_from_path(config_path: &Path) -> Option<CodesenseConfig> {
    let contents = match fs::read_to_string(config_path) {
        Ok(contents) => contents,
        Err(e) => {
            // "not found" is the normal case while searching
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Failed to read config file {}: {}", config_path.display(), e);
            }
            return None;
        }
    };

    match parse_and_validate_config(&contents) {
        Ok(config) => {
            tracing::debug!("Loaded config from {}", config_path.display());
            Some(config)
        }
        Err(e) => {
            tracing::warn!("Ignoring {}: {}. Using defaults.", config_path.display(), e);
            None
        }
    }
}
