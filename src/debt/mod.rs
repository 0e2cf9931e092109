//! Rule catalog and the non-security rule families.

pub mod async_errors;
pub mod error_swallowing;
pub mod patterns;
pub mod react;
pub mod reliability;
pub mod smells;

use crate::complexity::SyntaxSummary;
use crate::config::{CodesenseConfig, ThresholdsConfig};
use crate::core::{CodeSmell, Deadline, Language, LineIndex, Result, Severity, SmellType};
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Bumped whenever a rule, threshold default or message changes.
pub const RULESET_VERSION: &str = "2";

pub const PYTHON: &[Language] = &[Language::Python];
pub const JS_FAMILY: &[Language] = &[Language::JavaScript, Language::TypeScript];
pub const TYPESCRIPT: &[Language] = &[Language::TypeScript];
pub const ALL_LANGUAGES: &[Language] = &[
    Language::Python,
    Language::JavaScript,
    Language::TypeScript,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleFamily {
    /// Needs a syntax tree; skipped when the file did not parse.
    Structural,
    /// Runs over raw text.
    Pattern,
}

/// Everything a rule may look at for one file.
pub struct RuleContext<'a> {
    pub path: &'a str,
    pub language: Language,
    pub content: &'a str,
    pub lines: &'a LineIndex,
    pub loc: usize,
    pub syntax: Option<&'a SyntaxSummary>,
    pub thresholds: &'a ThresholdsConfig,
    /// Computed once per file with [`is_react_source`].
    pub react: bool,
}

impl<'a> RuleContext<'a> {
    pub fn smell(
        &self,
        smell_type: SmellType,
        severity: Severity,
        line: usize,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> CodeSmell {
        CodeSmell::new(self.path, smell_type, severity, line, message, suggestion)
    }

    pub fn line_of(&self, offset: usize) -> usize {
        self.lines.line_of(offset)
    }

    pub fn line_text(&self, line: usize) -> &'a str {
        &self.content[self.lines.line_range(line)]
    }

    pub fn is_react_file(&self) -> bool {
        self.react
    }

    /// Syntax summary for structural rules.
    pub fn syntax(&self) -> Result<&'a SyntaxSummary> {
        self.syntax.ok_or_else(|| {
            crate::core::Error::Analysis(format!("{} has no syntax tree", self.path))
        })
    }
}

/// JSX/TSX sources, or JavaScript-family sources that mention react in
/// any case.
pub fn is_react_source(path: &str, language: Language, content: &str) -> bool {
    if !language.is_javascript_family() {
        return false;
    }
    let jsx_extension = path
        .rsplit_once('.')
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case("jsx") || ext.eq_ignore_ascii_case("tsx"));
    jsx_extension
        || content
            .as_bytes()
            .windows(5)
            .any(|window| window.eq_ignore_ascii_case(b"react"))
}

/// One independent detection rule.
pub trait Rule: Send + Sync {
    fn id(&self) -> &'static str;
    fn family(&self) -> RuleFamily;
    fn applies_to(&self, language: Language) -> bool;

    /// Expensive security scans are skipped on files above the size cutoff.
    fn is_expensive(&self) -> bool {
        false
    }

    fn check(&self, ctx: &RuleContext) -> Result<Vec<CodeSmell>>;
}

/// A rule backed by a plain function.
pub struct FnRule {
    id: &'static str,
    family: RuleFamily,
    languages: &'static [Language],
    expensive: bool,
    check: fn(&RuleContext) -> Result<Vec<CodeSmell>>,
}

impl FnRule {
    pub fn structural(
        id: &'static str,
        languages: &'static [Language],
        check: fn(&RuleContext) -> Result<Vec<CodeSmell>>,
    ) -> Self {
        Self {
            id,
            family: RuleFamily::Structural,
            languages,
            expensive: false,
            check,
        }
    }

    pub fn pattern(
        id: &'static str,
        languages: &'static [Language],
        check: fn(&RuleContext) -> Result<Vec<CodeSmell>>,
    ) -> Self {
        Self {
            id,
            family: RuleFamily::Pattern,
            languages,
            expensive: false,
            check,
        }
    }

    pub fn expensive(mut self) -> Self {
        self.expensive = true;
        self
    }
}

impl Rule for FnRule {
    fn id(&self) -> &'static str {
        self.id
    }

    fn family(&self) -> RuleFamily {
        self.family
    }

    fn applies_to(&self, language: Language) -> bool {
        self.languages.contains(&language)
    }

    fn is_expensive(&self) -> bool {
        self.expensive
    }

    fn check(&self, ctx: &RuleContext) -> Result<Vec<CodeSmell>> {
        (self.check)(ctx)
    }
}

/// Outcome of running the catalog over one file.
#[derive(Debug, Default)]
pub struct CatalogReport {
    pub smells: Vec<CodeSmell>,
    pub rule_failures: usize,
    pub security_scan_skipped: bool,
}

/// Immutable, ordered set of rules shared by every worker.
pub struct RuleCatalog {
    rules: Vec<Box<dyn Rule>>,
    thresholds: ThresholdsConfig,
    security_scan_max_lines: usize,
}

impl RuleCatalog {
    /// The full rule set, configured from `config`.
    pub fn new(config: &CodesenseConfig) -> Self {
        Self::with_rules(standard_rules(), config)
    }

    pub fn with_rules(rules: Vec<Box<dyn Rule>>, config: &CodesenseConfig) -> Self {
        Self {
            rules,
            thresholds: config.thresholds.clone(),
            security_scan_max_lines: config.analysis.security_scan_max_lines,
        }
    }

    pub fn version(&self) -> &'static str {
        RULESET_VERSION
    }

    pub fn thresholds(&self) -> &ThresholdsConfig {
        &self.thresholds
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rule_ids(&self, language: Language) -> Vec<&'static str> {
        self.rules
            .iter()
            .filter(|r| r.applies_to(language))
            .map(|r| r.id())
            .collect()
    }

    /// Run every applicable rule in catalog order.
    ///
    /// A failing or panicking rule is logged and counted; the others still
    /// run. Running out of time aborts the file with a timeout error.
    pub fn run(&self, ctx: &RuleContext, deadline: Option<&Deadline>) -> Result<CatalogReport> {
        let skip_expensive = ctx.loc > self.security_scan_max_lines;
        let mut report = CatalogReport::default();

        for rule in self.rules.iter().filter(|r| r.applies_to(ctx.language)) {
            if let Some(deadline) = deadline {
                deadline.check(ctx.path)?;
            }
            if rule.family() == RuleFamily::Structural && ctx.syntax.is_none() {
                continue;
            }
            if rule.is_expensive() && skip_expensive {
                report.security_scan_skipped = true;
                continue;
            }

            match catch_unwind(AssertUnwindSafe(|| rule.check(ctx))) {
                Ok(Ok(smells)) => report.smells.extend(smells),
                Ok(Err(e)) => {
                    tracing::warn!("Rule {} failed on {}: {}", rule.id(), ctx.path, e);
                    report.rule_failures += 1;
                }
                Err(_) => {
                    tracing::warn!("Rule {} panicked on {}", rule.id(), ctx.path);
                    report.rule_failures += 1;
                }
            }
        }

        if report.security_scan_skipped {
            tracing::info!(
                "Skipped expensive security scans for {} ({} lines > {})",
                ctx.path,
                ctx.loc,
                self.security_scan_max_lines
            );
        }

        Ok(report)
    }
}

fn standard_rules() -> Vec<Box<dyn Rule>> {
    let mut rules: Vec<Box<dyn Rule>> = Vec::new();
    rules.extend(crate::security::rules());
    rules.extend(reliability::rules());
    rules.extend(async_errors::rules());
    rules.extend(react::rules());
    rules.extend(error_swallowing::rules());
    rules.extend(smells::rules());
    rules.extend(patterns::rules());
    rules
}


#[cfg(test)]
mod tests {
    use super::test_support::Fixture;
    use super::*;
    use crate::core::Error;

    fn exploding(_: &RuleContext) -> Result<Vec<CodeSmell>> {
        panic!("rule bug")
    }

    fn failing(_: &RuleContext) -> Result<Vec<CodeSmell>> {
        Err(Error::rule("failing", "bad input"))
    }

    fn always(ctx: &RuleContext) -> Result<Vec<CodeSmell>> {
        Ok(vec![ctx.smell(
            SmellType::UnresolvedTodos,
            Severity::LOW,
            1,
            "found",
            "fix",
        )])
    }

    fn catalog(rules: Vec<Box<dyn Rule>>) -> RuleCatalog {
        RuleCatalog::with_rules(rules, &CodesenseConfig::default())
    }

    #[test]
    fn test_failures_are_isolated_per_rule() {
        let catalog = catalog(vec![
            Box::new(FnRule::pattern("exploding", ALL_LANGUAGES, exploding)),
            Box::new(FnRule::pattern("failing", ALL_LANGUAGES, failing)),
            Box::new(FnRule::pattern("always", ALL_LANGUAGES, always)),
        ]);
        let fixture = Fixture::new("a.py", "x = 1\n");
        let report = catalog.run(&fixture.ctx(), None).unwrap();
        assert_eq!(report.rule_failures, 2);
        assert_eq!(report.smells.len(), 1);
    }

    #[test]
    fn test_structural_rules_need_a_tree() {
        let catalog = catalog(vec![Box::new(FnRule::structural(
            "always",
            ALL_LANGUAGES,
            always,
        ))]);
        let fixture = Fixture::new("a.py", "x = 1\n");
        assert!(catalog.run(&fixture.ctx(), None).unwrap().smells.is_empty());

        let fixture = fixture.with_syntax(SyntaxSummary::default());
        assert_eq!(catalog.run(&fixture.ctx(), None).unwrap().smells.len(), 1);
    }

    #[test]
    fn test_expensive_rules_skipped_above_cutoff() {
        let mut config = CodesenseConfig::default();
        config.analysis.security_scan_max_lines = 2;
        let catalog = RuleCatalog::with_rules(
            vec![Box::new(
                FnRule::pattern("always", ALL_LANGUAGES, always).expensive(),
            )],
            &config,
        );

        let fixture = Fixture::new("a.py", "a\nb\nc\nd\n");
        let report = catalog.run(&fixture.ctx(), None).unwrap();
        assert!(report.smells.is_empty());
        assert!(report.security_scan_skipped);
    }

    #[test]
    fn test_language_filter() {
        let catalog = catalog(vec![Box::new(FnRule::pattern("always", PYTHON, always))]);
        let fixture = Fixture::new("a.js", "x\n");
        assert!(catalog.run(&fixture.ctx(), None).unwrap().smells.is_empty());
    }

    #[test]
    fn test_expired_deadline_is_a_timeout() {
        let catalog = catalog(vec![Box::new(FnRule::pattern("always", ALL_LANGUAGES, always))]);
        let fixture = Fixture::new("a.py", "x\n");
        let deadline = Deadline::start(std::time::Duration::ZERO);
        let err = catalog.run(&fixture.ctx(), Some(&deadline)).unwrap_err();
        assert!(matches!(err, Error::Timeout { .. }));
    }

    #[test]
    fn test_standard_catalog_covers_every_language() {
        let catalog = RuleCatalog::new(&CodesenseConfig::default());
        for language in ALL_LANGUAGES {
            assert!(!catalog.rule_ids(*language).is_empty());
        }
        assert_eq!(catalog.version(), "2");
    }

    #[test]
    fn test_react_detection() {
        let fixture = Fixture::new("src/App.tsx", "export const x = 1;");
        assert!(fixture.ctx().is_react_file());
        let fixture = Fixture::new("src/util.js", "import React from 'react';");
        assert!(fixture.ctx().is_react_file());
        let fixture = Fixture::new("src/util.js", "module.exports = {};");
        assert!(!fixture.ctx().is_react_file());
    }

    #[test]
    fn test_react_source_ignores_case_and_language() {
        assert!(is_react_source("Page.JSX", Language::JavaScript, ""));
        assert!(is_react_source("hooks.ts", Language::TypeScript, "// uses REACT hooks"));
        assert!(!is_react_source("views.py", Language::Python, "import react"));
        assert!(!is_react_source("util.ts", Language::TypeScript, "const reac = 1;"));
    }
}
