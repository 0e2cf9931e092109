//! Language analyzers: parse one file, compute its metrics and run the rule catalog.

pub mod javascript;
pub mod python;

use crate::complexity::{StructureMetrics, SyntaxSummary};
use crate::core::{CodeSmell, Deadline, Error, FileMetrics, Language, LineIndex, Result};
use crate::debt::{is_react_source, RuleCatalog, RuleContext};
use crate::metrics::count_lines;
use tree_sitter::{Parser, Tree};

pub trait Analyzer: Send + Sync {
    fn language(&self) -> Language;

    /// Syntax summary, or `None` when the source does not parse cleanly.
    fn summarize(
        &self,
        content: &str,
        path: &str,
        deadline: Option<&Deadline>,
    ) -> Result<Option<SyntaxSummary>>;

    /// Structure to report when `summarize` yields nothing.
    fn fallback_structure(&self, content: &str) -> StructureMetrics;
}

/// Everything one analyzer run produced for a file.
#[derive(Debug, Clone)]
pub struct FileAnalysis {
    pub metrics: FileMetrics,
    pub smells: Vec<CodeSmell>,
    /// Parsed with errors; metrics are estimates and structural rules were skipped.
    pub degraded: bool,
    pub rule_failures: usize,
    pub security_scan_skipped: bool,
}

pub fn get_analyzer(language: Language) -> Box<dyn Analyzer> {
    type AnalyzerFactory = fn() -> Box<dyn Analyzer>;

    static ANALYZER_MAP: &[(Language, AnalyzerFactory)] = &[
        (Language::Python, || Box::new(python::PythonAnalyzer)),
        (Language::JavaScript, || {
            Box::new(javascript::JavaScriptAnalyzer::javascript())
        }),
        (Language::TypeScript, || {
            Box::new(javascript::JavaScriptAnalyzer::typescript())
        }),
    ];

    ANALYZER_MAP
        .iter()
        .find(|(lang, _)| *lang == language)
        .map(|(_, factory)| factory())
        .unwrap_or_else(|| Box::new(python::PythonAnalyzer))
}

/// Analyze one decoded file. `path` is repo-relative and forward-slash normalized.
pub fn analyze_file(
    analyzer: &dyn Analyzer,
    path: &str,
    content: &str,
    catalog: &RuleCatalog,
    deadline: Option<&Deadline>,
) -> Result<FileAnalysis> {
    let language = analyzer.language();
    let counts = count_lines(content, language);
    let summary = analyzer.summarize(content, path, deadline)?;

    let structure = match &summary {
        Some(summary) => summary.structure(),
        None => {
            tracing::warn!("Parse errors in {path}, continuing with degraded metrics");
            analyzer.fallback_structure(content)
        }
    };

    let lines = LineIndex::new(content);
    let ctx = RuleContext {
        path,
        language,
        content,
        lines: &lines,
        loc: counts.physical_lines,
        syntax: summary.as_ref(),
        thresholds: catalog.thresholds(),
        react: is_react_source(path, language, content),
    };
    let report = catalog.run(&ctx, deadline)?;

    let metrics = FileMetrics {
        path: path.to_string(),
        loc: counts.physical_lines,
        sloc: counts.code_lines,
        cyclomatic_max: structure.cyclomatic_max,
        cyclomatic_avg: structure.cyclomatic_avg,
        fn_count: structure.fn_count,
        class_count: structure.class_count,
        nesting_max: structure.nesting_max,
        dup_ratio: 0.0,
        comment_ratio: counts.comment_ratio(),
        language,
    };

    Ok(FileAnalysis {
        metrics,
        smells: report.smells,
        degraded: summary.is_none(),
        rule_failures: report.rule_failures,
        security_scan_skipped: report.security_scan_skipped,
    })
}

/// Parse with a grammar, bounded by the remaining per-file budget.
///
/// A tree with error nodes is returned as `Ok(None)`; running out of time is
/// a timeout error.
pub(crate) fn parse_tree(
    grammar: tree_sitter::Language,
    content: &str,
    path: &str,
    deadline: Option<&Deadline>,
) -> Result<Option<Tree>> {
    let mut parser = Parser::new();
    parser
        .set_language(&grammar)
        .map_err(|e| Error::Analysis(format!("Failed to load grammar for {path}: {e}")))?;

    if let Some(deadline) = deadline {
        deadline.check(path)?;
        parser.set_timeout_micros(deadline.remaining().as_micros().max(1) as u64);
    }

    let Some(tree) = parser.parse(content, None) else {
        return match deadline {
            Some(deadline) => Err(Error::timeout(path, deadline.budget())),
            None => Ok(None),
        };
    };

    if tree.root_node().has_error() {
        tracing::debug!("Syntax errors in {path}");
        return Ok(None);
    }
    Ok(Some(tree))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CodesenseConfig;
    use crate::core::SmellType;
    use std::time::Duration;

    fn catalog() -> RuleCatalog {
        RuleCatalog::new(&CodesenseConfig::default())
    }

    #[test]
    fn test_get_analyzer_per_language() {
        for language in [Language::Python, Language::JavaScript, Language::TypeScript] {
            assert_eq!(get_analyzer(language).language(), language);
        }
    }

    #[test]
    fn test_metrics_for_clean_python() {
        let source = "# helpers\ndef add(a, b):\n    \"\"\"Add.\"\"\"\n    return a + b\n";
        let analysis = analyze_file(
            &python::PythonAnalyzer,
            "pkg/math.py",
            source,
            &catalog(),
            None,
        )
        .unwrap();

        let metrics = &analysis.metrics;
        assert_eq!(metrics.path, "pkg/math.py");
        assert_eq!(metrics.loc, 5);
        assert_eq!(metrics.sloc, 3);
        assert_eq!(metrics.fn_count, 1);
        assert_eq!(metrics.cyclomatic_max, 1);
        assert_eq!(metrics.comment_ratio, 0.2);
        assert_eq!(metrics.dup_ratio, 0.0);
        assert!(!analysis.degraded);
        assert!(analysis.smells.is_empty());
    }

    #[test]
    fn test_broken_python_still_runs_pattern_rules() {
        let source = "def broken(:\n    x = eval(data)\n";
        let analysis = analyze_file(
            &python::PythonAnalyzer,
            "broken.py",
            source,
            &catalog(),
            None,
        )
        .unwrap();

        assert!(analysis.degraded);
        assert_eq!(analysis.metrics.cyclomatic_max, 1);
        assert_eq!(analysis.metrics.nesting_max, 0);
        assert_eq!(analysis.metrics.fn_count, 0);
        assert!(analysis
            .smells
            .iter()
            .any(|s| s.smell_type == SmellType::CodeInjection));
    }

    #[test]
    fn test_expired_budget_is_a_timeout() {
        let deadline = Deadline::start(Duration::ZERO);
        let err = analyze_file(
            &python::PythonAnalyzer,
            "slow.py",
            "x = 1\n",
            &catalog(),
            Some(&deadline),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Timeout { .. }));
    }
}
