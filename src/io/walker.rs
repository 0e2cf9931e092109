use crate::config::IgnoreConfig;
use crate::core::{normalize_relative_path, Error, Language, Result};
use ignore::{DirEntry, WalkBuilder};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A discovered source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Repo-relative, forward-slash normalized.
    pub relative: String,
    pub language: Language,
}

/// Result of one walk.
#[derive(Debug, Default)]
pub struct Discovery {
    pub files: Vec<SourceFile>,
    /// Entries the walk could not read, such as unreadable directories.
    pub skipped: usize,
}

pub struct FileWalker {
    root: PathBuf,
    ignored_dirs: HashSet<String>,
    ignore_patterns: Vec<glob::Pattern>,
    respect_gitignore: bool,
}

impl FileWalker {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            ignored_dirs: HashSet::new(),
            ignore_patterns: Vec::new(),
            respect_gitignore: false,
        }
    }

    pub fn with_ignore_config(mut self, config: &IgnoreConfig) -> Result<Self> {
        self.ignored_dirs = config.directories.iter().cloned().collect();
        self.ignore_patterns = config
            .patterns
            .iter()
            .map(|p| {
                glob::Pattern::new(p)
                    .map_err(|e| Error::Configuration(format!("invalid ignore pattern '{p}': {e}")))
            })
            .collect::<Result<_>>()?;
        self.respect_gitignore = config.respect_gitignore;
        Ok(self)
    }

    /// Supported source files under the root, sorted by relative path.
    ///
    /// Entries that cannot be read are logged, skipped and counted; only an
    /// inaccessible root is an error.
    pub fn walk(&self) -> Result<Discovery> {
        check_root(&self.root)?;

        let filter = EntryFilter {
            root: self.root.clone(),
            ignored_dirs: self.ignored_dirs.clone(),
            patterns: self.ignore_patterns.clone(),
        };
        let filter = Arc::new(filter);

        let walker = WalkBuilder::new(&self.root)
            .standard_filters(false)
            .hidden(false)
            .git_ignore(self.respect_gitignore)
            .git_exclude(self.respect_gitignore)
            .filter_entry(move |entry| filter.keep(entry))
            .build();

        let discovery = self.collect(walker);
        tracing::debug!(
            "Discovered {} source files under {} ({} unreadable entries)",
            discovery.files.len(),
            self.root.display(),
            discovery.skipped
        );
        Ok(discovery)
    }

    fn collect<I>(&self, entries: I) -> Discovery
    where
        I: IntoIterator<Item = std::result::Result<DirEntry, ignore::Error>>,
    {
        let mut discovery = Discovery::default();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry: {e}");
                    discovery.skipped += 1;
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let path = entry.path();
            let Some(language) = Language::from_path(path) else {
                continue;
            };
            let relative = path
                .strip_prefix(&self.root)
                .map(normalize_relative_path)
                .unwrap_or_else(|_| normalize_relative_path(path));
            discovery.files.push(SourceFile {
                path: path.to_path_buf(),
                relative,
                language,
            });
        }

        discovery.files.sort_by(|a, b| a.relative.cmp(&b.relative));
        discovery
    }
}

struct EntryFilter {
    root: PathBuf,
    ignored_dirs: HashSet<String>,
    patterns: Vec<glob::Pattern>,
}

impl EntryFilter {
    fn keep(&self, entry: &DirEntry) -> bool {
        // The root itself is never filtered.
        if entry.depth() == 0 {
            return true;
        }
        let name = entry.file_name().to_string_lossy();
        let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
        if is_dir && self.ignored_dirs.contains(name.as_ref()) {
            return false;
        }
        if self.patterns.is_empty() {
            return true;
        }
        let relative = entry
            .path()
            .strip_prefix(&self.root)
            .map(normalize_relative_path)
            .unwrap_or_default();
        !self
            .patterns
            .iter()
            .any(|p| p.matches(&name) || p.matches(&relative))
    }
}

fn check_root(root: &Path) -> Result<()> {
    let metadata = std::fs::metadata(root)
        .map_err(|e| Error::acquisition(root, format!("cannot access root: {e}")))?;
    if !metadata.is_dir() {
        return Err(Error::acquisition(root, "root is not a directory"));
    }
    std::fs::read_dir(root)
        .map_err(|e| Error::acquisition(root, format!("cannot read root: {e}")))?;
    Ok(())
}
