//! Repository orchestration.
//!
//! Discovers source files, analyzes each one on a rayon pool, scores the
//! results and assembles a deterministic [`RepositoryResult`]. Per-file
//! failures are counted and never stop the run; only an inaccessible root
//! produces a failed result.

use crate::analyzers::{analyze_file, get_analyzer, FileAnalysis};
use crate::config::CodesenseConfig;
use crate::core::{
    AnalysisSummary, CodeSmell, Deadline, Error, FileMetrics, Language, RepositoryResult,
    Result, RiskScore,
};
use crate::debt::RuleCatalog;
use crate::io::{read_lossy, Discovery, FileWalker, SourceFile};
use crate::risk::score_file;
use rayon::prelude::*;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;

/// What happened to one discovered file.
#[derive(Debug)]
pub enum FileOutcome {
    Analyzed(FileAnalysis),
    Failed { path: String, reason: String },
}

/// Analyzes repositories with one configuration and one compiled catalog.
pub struct RepositoryAnalyzer<'c> {
    config: &'c CodesenseConfig,
    catalog: RuleCatalog,
}

impl<'c> RepositoryAnalyzer<'c> {
    pub fn new(config: &'c CodesenseConfig) -> Self {
        Self {
            config,
            catalog: RuleCatalog::new(config),
        }
    }

    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    pub fn analyze(&self, root: &Path) -> RepositoryResult {
        let discovery = match self.discover(root) {
            Ok(discovery) => discovery,
            Err(e) => {
                tracing::error!("{e}");
                return RepositoryResult::failed(e.to_string(), self.catalog.version());
            }
        };
        tracing::info!(
            "Analyzing {} files under {}",
            discovery.files.len(),
            root.display()
        );

        let outcomes = self.analyze_files(&discovery.files);
        assemble(outcomes, discovery.skipped, self.catalog.version())
    }

    fn discover(&self, root: &Path) -> Result<Discovery> {
        FileWalker::new(root.to_path_buf())
            .with_ignore_config(&self.config.ignore)?
            .walk()
    }

    fn analyze_files(&self, files: &[SourceFile]) -> Vec<FileOutcome> {
        let workers = self.config.parallel.effective_concurrency();
        if workers <= 1 || files.len() <= 1 {
            return files.iter().map(|file| self.analyze_one(file)).collect();
        }

        match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
            Ok(pool) => {
                pool.install(|| files.par_iter().map(|file| self.analyze_one(file)).collect())
            }
            Err(e) => {
                tracing::warn!("Cannot build worker pool ({e}), analyzing sequentially");
                files.iter().map(|file| self.analyze_one(file)).collect()
            }
        }
    }

    /// Analyze one file; every failure is folded into the outcome.
    pub fn analyze_one(&self, file: &SourceFile) -> FileOutcome {
        let _span = tracing::debug_span!("file", path = %file.relative).entered();

        let attempt = catch_unwind(AssertUnwindSafe(|| self.try_analyze(file)));
        let reason = match attempt {
            Ok(Ok(analysis)) => return FileOutcome::Analyzed(analysis),
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!("analysis of {} panicked", file.relative),
        };

        tracing::warn!("Skipping {}: {}", file.relative, reason);
        FileOutcome::Failed {
            path: file.relative.clone(),
            reason,
        }
    }

    fn try_analyze(&self, file: &SourceFile) -> Result<FileAnalysis> {
        let settings = &self.config.analysis;
        let size = std::fs::metadata(&file.path)
            .map_err(|e| Error::io_at(e, &file.path))?
            .len();
        if size > settings.max_file_bytes {
            return Err(Error::file_system(
                format!(
                    "file is {size} bytes, above the {} byte limit",
                    settings.max_file_bytes
                ),
                &file.path,
            ));
        }

        let content = read_lossy(&file.path)?;
        let deadline = settings.file_timeout().map(Deadline::start);
        let analyzer = get_analyzer(file.language);
        analyze_file(
            analyzer.as_ref(),
            &file.relative,
            &content,
            &self.catalog,
            deadline.as_ref(),
        )
    }
}

/// Analyze `root` with `config`.
pub fn analyze_repository(root: &Path, config: &CodesenseConfig) -> RepositoryResult {
    RepositoryAnalyzer::new(config).analyze(root)
}

/// Fold per-file outcomes into the sorted aggregate.
///
/// `unreadable_entries` counts what the walk could not read; those are
/// reported as failed files alongside the per-file failures.
pub fn assemble(
    outcomes: Vec<FileOutcome>,
    unreadable_entries: usize,
    ruleset_version: &str,
) -> RepositoryResult {
    let mut summary = AnalysisSummary {
        failed_files: unreadable_entries,
        ruleset_version: ruleset_version.to_string(),
        ..AnalysisSummary::default()
    };
    let mut analyses = Vec::new();
    for outcome in outcomes {
        match outcome {
            FileOutcome::Analyzed(analysis) => analyses.push(analysis),
            FileOutcome::Failed { .. } => summary.failed_files += 1,
        }
    }
    analyses.sort_by(|a, b| a.metrics.path.cmp(&b.metrics.path));

    let mut risks: Vec<RiskScore> = analyses
        .iter()
        .map(|a| score_file(&a.metrics, &a.smells))
        .collect();
    risks.sort_by(|a, b| {
        b.risk_score
            .cmp(&a.risk_score)
            .then_with(|| a.path.cmp(&b.path))
    });

    let mut languages: Vec<Language> = Vec::new();
    let mut metrics: Vec<FileMetrics> = Vec::with_capacity(analyses.len());
    let mut smells: Vec<CodeSmell> = Vec::new();
    for analysis in analyses {
        summary.total_loc += analysis.metrics.loc;
        summary.rule_failures += analysis.rule_failures;
        summary.degraded_files += usize::from(analysis.degraded);
        summary.security_scans_skipped += usize::from(analysis.security_scan_skipped);
        languages.push(analysis.metrics.language);
        metrics.push(analysis.metrics);
        smells.extend(analysis.smells);
    }

    summary.total_files = metrics.len();
    summary.total_smells = smells.len();
    languages.sort_by_key(|l| l.as_str());
    languages.dedup();
    summary.languages = languages;

    RepositoryResult {
        metrics,
        smells,
        risks,
        summary,
        error: None,
    }
}
