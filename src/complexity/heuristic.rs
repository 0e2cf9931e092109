//! Text estimates for JavaScript/TypeScript that tree-sitter could not parse.

use super::StructureMetrics;
use crate::metrics::round_to;
use once_cell::sync::Lazy;
use regex::Regex;

const DECISION_TOKENS: &[&str] = &[
    "if", "else", "for", "while", "switch", "case", "catch", "&&", "||", "?",
];
const MAX_COMPLEXITY: u32 = 50;
const MAX_AVERAGE: f64 = 20.0;

static FUNCTION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"function\s+\w+",
        r"const\s+\w+\s*=\s*(?:async\s*)?\(",
        r"(?:async\s+)?(\w+)\s*\([^)]*\)\s*\{",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static CLASS_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"class\s+\w+").unwrap());

/// Estimate structure from raw text.
///
/// Complexity is one plus the number of decision tokens (substring counts,
/// so `elseif` or `format` inflate it), nesting is the deepest brace level.
pub fn estimate(content: &str) -> StructureMetrics {
    let complexity = 1 + DECISION_TOKENS
        .iter()
        .map(|token| content.matches(token).count() as u32)
        .sum::<u32>();

    let fn_count: usize = FUNCTION_PATTERNS
        .iter()
        .map(|pattern| pattern.find_iter(content).count())
        .sum();

    let average = (complexity as f64 / fn_count.max(1) as f64).min(MAX_AVERAGE);

    StructureMetrics {
        cyclomatic_max: complexity.min(MAX_COMPLEXITY),
        cyclomatic_avg: round_to(average, 2),
        nesting_max: brace_depth(content),
        fn_count,
        class_count: CLASS_PATTERN.find_iter(content).count(),
    }
}

/// Deepest `{` nesting; unmatched `}` never drive the depth negative.
pub fn brace_depth(content: &str) -> u32 {
    let mut depth = 0u32;
    let mut max_depth = 0u32;
    for c in content.chars() {
        match c {
            '{' => {
                depth += 1;
                max_depth = max_depth.max(depth);
            }
            '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    max_depth
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_counts_tokens() {
        let metrics = estimate("function f(a) { if (a && b) { return 1; } }");
        // "if" and "&&"
        assert_eq!(metrics.cyclomatic_max, 3);
        assert_eq!(metrics.nesting_max, 2);
        assert!(metrics.fn_count >= 1);
    }

    #[test]
    fn test_estimate_caps_complexity() {
        let content = "if ".repeat(200);
        let metrics = estimate(&content);
        assert_eq!(metrics.cyclomatic_max, 50);
        assert_eq!(metrics.cyclomatic_avg, 20.0);
    }

    #[test]
    fn test_brace_depth_ignores_unmatched_closers() {
        assert_eq!(brace_depth("}}{{}{"), 2);
    }

    #[test]
    fn test_class_count() {
        assert_eq!(estimate("class A {}\nclass B extends A {}").class_count, 2);
    }
}
