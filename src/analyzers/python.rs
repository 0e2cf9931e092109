use crate::analyzers::{parse_tree, Analyzer};
use crate::complexity::{self, StructureMetrics, SyntaxSummary};
use crate::core::{Deadline, Language, Result};

/// Python analyzer backed by the tree-sitter Python grammar.
pub struct PythonAnalyzer;

impl Analyzer for PythonAnalyzer {
    fn language(&self) -> Language {
        Language::Python
    }

    fn summarize(
        &self,
        content: &str,
        path: &str,
        deadline: Option<&Deadline>,
    ) -> Result<Option<SyntaxSummary>> {
        let tree = parse_tree(tree_sitter_python::LANGUAGE.into(), content, path, deadline)?;
        Ok(tree.map(|tree| complexity::python::summarize(tree.root_node(), content)))
    }

    // No estimate is attempted for Python that fails to parse.
    fn fallback_structure(&self, _content: &str) -> StructureMetrics {
        StructureMetrics::degraded()
    }
}
