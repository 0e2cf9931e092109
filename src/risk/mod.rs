//! File risk scoring.
//!
//! An additive model over one file's metrics and findings. Each band adds a
//! fixed number of points and, for the heavier bands, a feature tag. Tags are
//! kept in the order the bands are evaluated and truncated to
//! [`MAX_TOP_FEATURES`]; the total is clamped to 0..=100 before the tier is
//! derived from it.

use crate::core::{CodeSmell, FileMetrics, RiskScore, RiskTier, SmellType};
use std::collections::BTreeSet;

pub const MAX_TOP_FEATURES: usize = 4;
pub const MAX_SCORE: u32 = 100;

/// Running total plus the tags of the bands that fired.
#[derive(Debug, Default)]
struct ScoreSheet {
    points: u32,
    features: Vec<String>,
}

impl ScoreSheet {
    fn add(&mut self, points: u32) {
        self.points += points;
    }

    fn add_tagged(&mut self, points: u32, tag: impl Into<String>) {
        self.points += points;
        self.features.push(tag.into());
    }

    fn finish(mut self, path: &str) -> RiskScore {
        let risk_score = self.points.min(MAX_SCORE);
        self.features.truncate(MAX_TOP_FEATURES);
        RiskScore {
            path: path.to_string(),
            risk_score,
            tier: RiskTier::from_score(risk_score),
            top_features: self.features,
        }
    }
}

/// Score one file. `smells` should contain only this file's findings.
pub fn score_file(metrics: &FileMetrics, smells: &[CodeSmell]) -> RiskScore {
    let mut sheet = ScoreSheet::default();

    score_complexity(&mut sheet, metrics.cyclomatic_max);
    score_critical_smells(&mut sheet, smells);
    score_nesting(&mut sheet, metrics.nesting_max);

    if metrics.fn_count > 30 {
        sheet.add_tagged(10, "too_many_functions");
    } else if metrics.fn_count > 20 {
        sheet.add(5);
    }

    if metrics.sloc > 100 && metrics.comment_ratio < 0.02 {
        sheet.add_tagged(5, "poor_documentation");
    }

    let medium = smells.iter().filter(|s| s.severity.is_medium()).count();
    if medium >= 5 {
        sheet.add(10);
    } else if medium >= 3 {
        sheet.add(5);
    }

    if metrics.loc > 800 {
        sheet.add_tagged(10, "very_large_file");
    } else if metrics.loc > 500 {
        sheet.add(5);
    }

    let low = smells.iter().filter(|s| s.severity.is_low()).count();
    if low >= 8 {
        sheet.add(5);
    }

    let distinct: BTreeSet<SmellType> = smells.iter().map(|s| s.smell_type).collect();
    if distinct.len() >= 5 {
        sheet.add_tagged(10, "multiple_issue_types");
    } else if distinct.len() >= 3 {
        sheet.add(5);
    }

    sheet.finish(&metrics.path)
}

fn score_complexity(sheet: &mut ScoreSheet, cyclomatic_max: u32) {
    if cyclomatic_max > 25 {
        sheet.add_tagged(25, "extreme_complexity");
    } else if cyclomatic_max > 15 {
        sheet.add_tagged(20, "high_complexity");
    } else if cyclomatic_max > 10 {
        sheet.add_tagged(12, "moderate_complexity");
    }
}

// Security findings take the whole band; otherwise the band grows with the
// number of other critical findings.
fn score_critical_smells(sheet: &mut ScoreSheet, smells: &[CodeSmell]) {
    let (security, other) = smells
        .iter()
        .filter(|s| s.severity.is_critical())
        .fold((0usize, 0usize), |(security, other), s| {
            if s.smell_type.is_security() {
                (security + 1, other)
            } else {
                (security, other + 1)
            }
        });

    if security > 0 {
        sheet.add_tagged(30, format!("security_vulnerabilities_{security}"));
    } else if other >= 3 {
        sheet.add_tagged(25, "multiple_critical_issues");
    } else if other >= 2 {
        sheet.add_tagged(20, "critical_issues");
    } else if other >= 1 {
        sheet.add_tagged(15, "has_critical_issue");
    }
}

fn score_nesting(sheet: &mut ScoreSheet, nesting_max: u32) {
    if nesting_max > 7 {
        sheet.add_tagged(15, "deep_nesting");
    } else if nesting_max > 5 {
        sheet.add_tagged(10, "nesting_depth");
    } else if nesting_max > 4 {
        sheet.add(5);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Language, Severity};
    use pretty_assertions::assert_eq;

    fn metrics() -> FileMetrics {
        FileMetrics {
            path: "app/service.py".to_string(),
            loc: 120,
            sloc: 90,
            cyclomatic_max: 1,
            cyclomatic_avg: 1.0,
            fn_count: 3,
            class_count: 0,
            nesting_max: 1,
            dup_ratio: 0.0,
            comment_ratio: 0.1,
            language: Language::Python,
        }
    }

    fn smell(smell_type: SmellType, severity: Severity) -> CodeSmell {
        CodeSmell::new("app/service.py", smell_type, severity, 1, "m", "s")
    }

    #[test]
    fn test_clean_file_is_low() {
        let score = score_file(&metrics(), &[]);
        assert_eq!(score.risk_score, 0);
        assert_eq!(score.tier, RiskTier::Low);
        assert!(score.top_features.is_empty());
    }

    #[test]
    fn test_complexity_bands() {
        let mut m = metrics();
        for (max, points, tag) in [
            (26, 25, "extreme_complexity"),
            (25, 20, "high_complexity"),
            (16, 20, "high_complexity"),
            (11, 12, "moderate_complexity"),
        ] {
            m.cyclomatic_max = max;
            let score = score_file(&m, &[]);
            assert_eq!(score.risk_score, points, "cyclomatic_max = {max}");
            assert_eq!(score.top_features, vec![tag.to_string()]);
        }
        m.cyclomatic_max = 10;
        assert_eq!(score_file(&m, &[]).risk_score, 0);
    }

    #[test]
    fn test_security_band_counts_findings() {
        let smells = [
            smell(SmellType::HardcodedSecret, Severity::CRITICAL),
            smell(SmellType::SqlInjection, Severity::CRITICAL),
            smell(SmellType::BareExcept, Severity::HIGH),
        ];
        let score = score_file(&metrics(), &smells);
        // 30 for security, 5 for three distinct types
        assert_eq!(score.risk_score, 35);
        assert_eq!(score.top_features, vec!["security_vulnerabilities_2".to_string()]);
        assert_eq!(score.tier, RiskTier::Medium);
    }

    #[test]
    fn test_non_security_critical_bands() {
        let one = [smell(SmellType::CallbackHell, Severity::HIGH)];
        let three = [
            smell(SmellType::CallbackHell, Severity::HIGH),
            smell(SmellType::CallbackHell, Severity::HIGH),
            smell(SmellType::CallbackHell, Severity::HIGH),
        ];
        let one = score_file(&metrics(), &one);
        let three = score_file(&metrics(), &three);
        assert_eq!(one.risk_score, 15);
        assert_eq!(one.top_features, vec!["has_critical_issue".to_string()]);
        assert_eq!(three.risk_score, 25);
        assert_eq!(three.top_features, vec!["multiple_critical_issues".to_string()]);
    }

    #[test]
    fn test_silent_bands_add_points_without_tags() {
        let mut m = metrics();
        m.nesting_max = 5;
        m.fn_count = 21;
        m.loc = 501;
        let score = score_file(&m, &[]);
        assert_eq!(score.risk_score, 15);
        assert!(score.top_features.is_empty());
    }

    #[test]
    fn test_features_keep_insertion_order_and_truncate() {
        let mut m = metrics();
        m.cyclomatic_max = 30;
        m.nesting_max = 8;
        m.fn_count = 31;
        m.sloc = 200;
        m.comment_ratio = 0.0;
        m.loc = 900;
        let smells = [smell(SmellType::CodeInjection, Severity::CRITICAL)];

        let score = score_file(&m, &smells);
        assert_eq!(
            score.top_features,
            vec![
                "extreme_complexity".to_string(),
                "security_vulnerabilities_1".to_string(),
                "deep_nesting".to_string(),
                "too_many_functions".to_string(),
            ]
        );
        // 25 + 30 + 15 + 10 + 5 + 10
        assert_eq!(score.risk_score, 95);
        assert_eq!(score.tier, RiskTier::Critical);
    }

    #[test]
    fn test_score_is_clamped() {
        let mut m = metrics();
        m.cyclomatic_max = 30;
        m.nesting_max = 8;
        m.fn_count = 31;
        m.sloc = 200;
        m.comment_ratio = 0.0;
        m.loc = 900;
        let smells: Vec<CodeSmell> = [
            (SmellType::CodeInjection, Severity::CRITICAL),
            (SmellType::GodClass, Severity::MEDIUM),
            (SmellType::DeepNesting, Severity::MEDIUM),
            (SmellType::ExcessiveGlobalState, Severity::MEDIUM),
            (SmellType::MutableDefaultArgument, Severity::MEDIUM),
            (SmellType::LongFile, Severity::MEDIUM),
        ]
        .into_iter()
        .map(|(t, s)| smell(t, s))
        .collect();

        let score = score_file(&m, &smells);
        assert_eq!(score.risk_score, MAX_SCORE);
        assert_eq!(score.tier, RiskTier::Critical);
    }
}
