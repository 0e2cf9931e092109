//! JavaScript and TypeScript analyzer.
//!
//! Both languages share one visitor; the grammar follows the file extension so
//! `.tsx` and `.jsx` sources parse with JSX enabled.

pub mod parser;

use crate::analyzers::{parse_tree, Analyzer};
use crate::complexity::{self, heuristic, StructureMetrics, SyntaxSummary};
use crate::core::{Deadline, Language, Result};

pub struct JavaScriptAnalyzer {
    language: Language,
}

impl JavaScriptAnalyzer {
    pub fn javascript() -> Self {
        Self {
            language: Language::JavaScript,
        }
    }

    pub fn typescript() -> Self {
        Self {
            language: Language::TypeScript,
        }
    }
}

impl Analyzer for JavaScriptAnalyzer {
    fn language(&self) -> Language {
        self.language
    }

    fn summarize(
        &self,
        content: &str,
        path: &str,
        deadline: Option<&Deadline>,
    ) -> Result<Option<SyntaxSummary>> {
        let variant = parser::detect_variant(path, self.language);
        let tree = parse_tree(parser::grammar(variant), content, path, deadline)?;
        Ok(tree.map(|tree| complexity::javascript::summarize(tree.root_node(), content)))
    }

    fn fallback_structure(&self, content: &str) -> StructureMetrics {
        heuristic::estimate(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn test_tsx_component_parses() {
        let source = indoc! {r#"
            export function Card({ title }: { title: string }) {
              return <div className="card">{title}</div>;
            }
        "#};
        let summary = JavaScriptAnalyzer::typescript()
            .summarize(source, "Card.tsx", None)
            .unwrap()
            .unwrap();
        assert_eq!(summary.functions.len(), 1);
        assert_eq!(summary.functions[0].name, "Card");
    }

    #[test]
    fn test_uppercase_tsx_extension_parses_jsx() {
        let summary = JavaScriptAnalyzer::typescript()
            .summarize("const A = () => <div>hi</div>;\n", "App.TSX", None)
            .unwrap();
        assert!(summary.is_some());
    }

    #[test]
    fn test_broken_source_falls_back_to_estimate() {
        let analyzer = JavaScriptAnalyzer::javascript();
        let source = "function f( {\n  if (x) {\n    y();\n";
        assert!(analyzer.summarize(source, "f.js", None).unwrap().is_none());
        let estimate = analyzer.fallback_structure(source);
        assert!(estimate.nesting_max >= 1);
    }
}
