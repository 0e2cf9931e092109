//! JavaScript/TypeScript visitor over tree-sitter-javascript/typescript trees.

use super::{ClassInfo, FrameStack, FunctionInfo, SyntaxSummary};
use tree_sitter::Node;

const FUNCTION_KINDS: &[&str] = &[
    "function_declaration",
    "function_expression",
    "arrow_function",
    "method_definition",
    "generator_function_declaration",
    "generator_function",
];

const CLASS_KINDS: &[&str] = &["class_declaration", "class", "abstract_class_declaration"];

/// Walk a parsed program once and summarize it.
pub fn summarize(root: Node, source: &str) -> SyntaxSummary {
    let mut visitor = JavaScriptVisitor {
        source: source.as_bytes(),
        frames: FrameStack::new(),
        summary: SyntaxSummary::default(),
        class_stack: Vec::new(),
    };
    visitor.visit(root);
    visitor.summary.file_complexity = visitor.frames.file_complexity();
    visitor.summary.nesting_max = visitor.frames.max_depth();
    visitor.summary
}

struct JavaScriptVisitor<'a> {
    source: &'a [u8],
    frames: FrameStack,
    summary: SyntaxSummary,
    class_stack: Vec<usize>,
}

impl<'a> JavaScriptVisitor<'a> {
    fn text(&self, node: Node) -> &'a str {
        node.utf8_text(self.source).unwrap_or("")
    }

    fn visit_children(&mut self, node: Node) {
        for child in node.children(&mut node.walk()) {
            self.visit(child);
        }
    }

    fn nested(&mut self, node: Node) {
        self.frames.enter_block();
        self.visit_children(node);
        self.frames.exit_block();
    }

    fn visit(&mut self, node: Node) {
        let kind = node.kind();
        if !node.is_named() {
            return;
        }

        if FUNCTION_KINDS.contains(&kind) {
            self.visit_function(node);
            return;
        }
        if CLASS_KINDS.contains(&kind) {
            self.visit_class(node);
            return;
        }

        match kind {
            "if_statement" | "for_statement" | "for_in_statement" | "while_statement"
            | "do_statement" => {
                self.frames.decision(1);
                self.nested(node);
            }
            "with_statement" | "try_statement" => self.nested(node),
            "catch_clause" | "switch_case" | "ternary_expression" => {
                self.frames.decision(1);
                self.visit_children(node);
            }
            "binary_expression" => {
                let logical = node
                    .child_by_field_name("operator")
                    .is_some_and(|op| matches!(op.kind(), "&&" | "||" | "??"));
                if logical {
                    self.frames.decision(1);
                }
                self.visit_children(node);
            }
            _ => self.visit_children(node),
        }
    }

    fn visit_function(&mut self, node: Node) {
        let name = self.function_name(node);
        let param_count = node
            .child_by_field_name("parameters")
            .map(|params| {
                params
                    .named_children(&mut params.walk())
                    .filter(|p| p.kind() != "comment")
                    .count()
            })
            // `x => x` has a bare `parameter` field instead
            .unwrap_or_else(|| usize::from(node.child_by_field_name("parameter").is_some()));
        let is_async = node
            .children(&mut node.walk())
            .take_while(|c| !c.is_named())
            .any(|c| c.kind() == "async");

        let slot = self.summary.functions.len();
        self.summary.functions.push(FunctionInfo {
            is_public: !name.starts_with('_'),
            name,
            line: node.start_position().row + 1,
            end_line: node.end_position().row + 1,
            complexity: 1,
            param_count,
            has_docstring: false,
            has_mutable_default: false,
            is_async,
        });
        if node.kind() == "method_definition" {
            for &class in &self.class_stack {
                self.summary.classes[class].method_count += 1;
            }
        }

        self.frames.push_function(slot);
        self.nested(node);
        if let Some((slot, complexity)) = self.frames.pop_function() {
            self.summary.functions[slot].complexity = complexity;
        }
    }

    fn function_name(&self, node: Node) -> String {
        if let Some(name) = node.child_by_field_name("name") {
            return self.text(name).to_string();
        }

        // const handler = () => {...}
        if let Some(parent) = node.parent() {
            if parent.kind() == "variable_declarator" {
                if let Some(name) = parent.child_by_field_name("name") {
                    return self.text(name).to_string();
                }
            }
        }

        "<anonymous>".to_string()
    }

    fn visit_class(&mut self, node: Node) {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_else(|| "<anonymous>".to_string());
        let index = self.summary.classes.len();
        self.summary.classes.push(ClassInfo {
            name,
            line: node.start_position().row + 1,
            method_count: 0,
        });

        self.class_stack.push(index);
        self.visit_children(node);
        self.class_stack.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use tree_sitter::Parser;

    fn summarize_js(source: &str) -> SyntaxSummary {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_javascript::LANGUAGE.into())
            .unwrap();
        let tree = parser.parse(source, None).unwrap();
        assert!(!tree.root_node().has_error());
        summarize(tree.root_node(), source)
    }

    fn summarize_ts(source: &str) -> SyntaxSummary {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into())
            .unwrap();
        let tree = parser.parse(source, None).unwrap();
        assert!(!tree.root_node().has_error());
        summarize(tree.root_node(), source)
    }

    #[test]
    fn test_decision_points() {
        let source = indoc! {"
            function check(a, b, c) {
                if ((a && b || c) ?? a) {
                    return 1;
                } else if (b) {
                    return 2;
                }
                for (const x of c) {}
                while (a) { a--; }
                do { b--; } while (b);
                switch (a) {
                    case 1: break;
                    case 2: break;
                    default: break;
                }
                try { run(); } catch (e) {}
                return a ? b : c;
            }
        "};
        let summary = summarize_js(source);
        let check = &summary.functions[0];
        assert_eq!(check.name, "check");
        assert_eq!(check.param_count, 3);
        // if, &&, ||, ??, else-if, for-of, while, do, 2 cases, catch, ternary
        assert_eq!(check.complexity, 1 + 12);
    }

    #[test]
    fn test_arrow_name_from_declarator() {
        let summary = summarize_js("const load = async (id) => { return id; };\n");
        let load = &summary.functions[0];
        assert_eq!(load.name, "load");
        assert!(load.is_async);
        assert_eq!(load.param_count, 1);
    }

    #[test]
    fn test_bare_arrow_parameter() {
        let summary = summarize_js("items.map(x => x * 2);\n");
        assert_eq!(summary.functions[0].name, "<anonymous>");
        assert_eq!(summary.functions[0].param_count, 1);
    }

    #[test]
    fn test_nested_callbacks_deepen_nesting() {
        let source = indoc! {"
            a(function () {
                b(function () {
                    c(function () {
                        d(function () {
                            if (x) { go(); }
                        });
                    });
                });
            });
        "};
        let summary = summarize_js(source);
        assert_eq!(summary.nesting_max, 5);
        assert_eq!(summary.functions.len(), 4);
    }

    #[test]
    fn test_class_methods() {
        let source = indoc! {"
            class Store {
                get(id) { return this.items[id]; }
                set(id, v) { this.items[id] = v; }
            }
        "};
        let summary = summarize_js(source);
        assert_eq!(summary.classes.len(), 1);
        assert_eq!(summary.classes[0].name, "Store");
        assert_eq!(summary.classes[0].method_count, 2);
    }

    #[test]
    fn test_typescript_parameters() {
        let source = indoc! {"
            function add(a: number, b?: number, ...rest: number[]): number {
                return a + (b ?? 0);
            }
        "};
        let summary = summarize_ts(source);
        assert_eq!(summary.functions[0].param_count, 3);
        assert_eq!(summary.functions[0].complexity, 2);
    }

    #[test]
    fn test_no_functions_uses_file_frame() {
        let summary = summarize_js("if (a) { b(); }\n");
        let structure = summary.structure();
        assert_eq!(structure.cyclomatic_max, 2);
        assert_eq!(structure.fn_count, 0);
    }
}
