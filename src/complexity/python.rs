//! Python visitor over a tree-sitter-python tree.

use super::{CallSite, ClassInfo, FrameStack, FunctionInfo, HandlerInfo, SyntaxSummary};
use tree_sitter::Node;

const QUERY_ATTRIBUTES: &[&str] = &["objects", "query", "filter", "get", "find", "execute"];
const BLOCKING_CALLS: &[&str] = &["time.sleep", "open"];
const BLOCKING_PREFIXES: &[&str] = &["requests.", "urllib."];

/// Walk a parsed module once and summarize it.
pub fn summarize(root: Node, source: &str) -> SyntaxSummary {
    let mut visitor = PythonVisitor::new(source);
    visitor.visit(root);
    visitor.finish()
}

struct PythonVisitor<'a> {
    source: &'a [u8],
    frames: FrameStack,
    summary: SyntaxSummary,
    class_stack: Vec<usize>,
    function_stack: Vec<usize>,
    async_reported: Vec<bool>,
    /// One entry per enclosing loop body; true once an N+1 candidate was recorded.
    loop_stack: Vec<bool>,
}

impl<'a> PythonVisitor<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source: source.as_bytes(),
            frames: FrameStack::new(),
            summary: SyntaxSummary::default(),
            class_stack: Vec::new(),
            function_stack: Vec::new(),
            async_reported: Vec::new(),
            loop_stack: Vec::new(),
        }
    }

    fn finish(mut self) -> SyntaxSummary {
        self.summary.file_complexity = self.frames.file_complexity();
        self.summary.nesting_max = self.frames.max_depth();
        self.summary
    }

    fn text(&self, node: Node) -> &'a str {
        node.utf8_text(self.source).unwrap_or("")
    }

    fn visit_children(&mut self, node: Node) {
        for child in node.children(&mut node.walk()) {
            self.visit(child);
        }
    }

    fn visit(&mut self, node: Node) {
        match node.kind() {
            "function_definition" => self.visit_function(node),
            "class_definition" => self.visit_class(node),
            "if_statement" => self.visit_if(node),
            "for_statement" | "while_statement" => self.visit_loop(node),
            "with_statement" => self.visit_with(node),
            "try_statement" => {
                self.frames.enter_block();
                self.visit_children(node);
                self.frames.exit_block();
            }
            "except_clause" | "except_group_clause" => {
                self.frames.decision(1);
                self.record_handler(node);
                self.visit_children(node);
            }
            "assert_statement" | "for_in_clause" | "conditional_expression"
            | "boolean_operator" => {
                self.frames.decision(1);
                self.visit_children(node);
            }
            "attribute" => {
                self.check_loop_query(node);
                self.visit_children(node);
            }
            "call" => {
                self.check_blocking_call(node);
                self.visit_children(node);
            }
            _ => self.visit_children(node),
        }
    }

    fn visit_function(&mut self, node: Node) {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_else(|| "<anonymous>".to_string());
        let is_async = node.child(0).is_some_and(|c| c.kind() == "async");
        let (param_count, has_mutable_default) = node
            .child_by_field_name("parameters")
            .map(|params| self.inspect_parameters(params))
            .unwrap_or((0, false));
        let has_docstring = node
            .child_by_field_name("body")
            .is_some_and(|body| has_docstring(body));

        let slot = self.summary.functions.len();
        self.summary.functions.push(FunctionInfo {
            is_public: !name.starts_with('_'),
            name,
            line: node.start_position().row + 1,
            end_line: node.end_position().row + 1,
            complexity: 1,
            param_count,
            has_docstring,
            has_mutable_default,
            is_async,
        });
        self.async_reported.push(false);
        for &class in &self.class_stack {
            self.summary.classes[class].method_count += 1;
        }

        // a body runs when called, not once per iteration of an enclosing loop
        let outer_loops = std::mem::take(&mut self.loop_stack);
        self.function_stack.push(slot);
        self.frames.push_function(slot);
        self.frames.enter_block();

        self.visit_children(node);

        self.frames.exit_block();
        if let Some((slot, complexity)) = self.frames.pop_function() {
            self.summary.functions[slot].complexity = complexity;
        }
        self.function_stack.pop();
        self.loop_stack = outer_loops;
    }

    /// Count positional and keyword parameters, excluding `*args`/`**kwargs`.
    fn inspect_parameters(&self, params: Node) -> (usize, bool) {
        let mut count = 0;
        let mut mutable_default = false;

        for param in params.named_children(&mut params.walk()) {
            match param.kind() {
                "identifier" => count += 1,
                "typed_parameter" => {
                    if param
                        .named_child(0)
                        .is_some_and(|first| first.kind() == "identifier")
                    {
                        count += 1;
                    }
                }
                "default_parameter" | "typed_default_parameter" => {
                    count += 1;
                    if param
                        .child_by_field_name("value")
                        .is_some_and(|value| matches!(value.kind(), "list" | "dictionary" | "set"))
                    {
                        mutable_default = true;
                    }
                }
                _ => {}
            }
        }

        (count, mutable_default)
    }

    fn visit_class(&mut self, node: Node) {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_default();
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

    /// `elif` nests one level below the branch before it; `else` sits at
    /// the innermost level of the chain.
    fn visit_if(&mut self, node: Node) {
        self.frames.decision(1);
        let base = self.frames.depth();
        self.frames.enter_block();
        let mut level = base + 1;

        for child in node.children(&mut node.walk()) {
            match child.kind() {
                "elif_clause" => {
                    self.frames.decision(1);
                    level += 1;
                    self.frames.set_depth(level);
                    self.visit_children(child);
                }
                "else_clause" => {
                    self.frames.set_depth(level);
                    self.visit_children(child);
                }
                _ => self.visit(child),
            }
        }

        self.frames.set_depth(base);
    }

    fn visit_loop(&mut self, node: Node) {
        self.frames.decision(1);
        self.frames.enter_block();
        let body_id = node.child_by_field_name("body").map(|b| b.id());

        for child in node.children(&mut node.walk()) {
            if Some(child.id()) == body_id {
                self.loop_stack.push(false);
                self.visit(child);
                self.loop_stack.pop();
            } else {
                self.visit(child);
            }
        }

        self.frames.exit_block();
    }

    fn visit_with(&mut self, node: Node) {
        self.frames.decision(1);
        for child in node.children(&mut node.walk()) {
            if child.kind() == "with_clause" {
                self.collect_managed_opens(child);
            }
        }

        self.frames.enter_block();
        self.visit_children(node);
        self.frames.exit_block();
    }

    fn collect_managed_opens(&mut self, node: Node) {
        if node.kind() == "call"
            && node
                .child_by_field_name("function")
                .is_some_and(|f| self.text(f) == "open")
        {
            self.summary
                .managed_open_lines
                .push(node.start_position().row + 1);
        }
        for child in node.children(&mut node.walk()) {
            self.collect_managed_opens(child);
        }
    }

    fn record_handler(&mut self, node: Node) {
        let parts: Vec<Node> = node
            .named_children(&mut node.walk())
            .filter(|c| c.kind() != "comment")
            .collect();
        let is_typed = parts.iter().any(|c| c.kind() != "block");
        let is_noop = parts
            .iter()
            .find(|c| c.kind() == "block")
            .is_some_and(|block| is_noop_block(*block));

        self.summary.handlers.push(HandlerInfo {
            line: node.start_position().row + 1,
            is_typed,
            is_noop,
        });
    }

    fn check_loop_query(&mut self, node: Node) {
        if !matches!(self.loop_stack.last(), Some(false)) {
            return;
        }
        let Some(attribute) = node.child_by_field_name("attribute") else {
            return;
        };
        let name = self.text(attribute);
        if QUERY_ATTRIBUTES.contains(&name) {
            self.summary.loop_queries.push(CallSite {
                line: node.start_position().row + 1,
                callee: name.to_string(),
            });
            self.loop_stack.iter_mut().for_each(|reported| *reported = true);
        }
    }

    fn check_blocking_call(&mut self, node: Node) {
        let Some(&slot) = self.function_stack.last() else {
            return;
        };
        if !self.summary.functions[slot].is_async || self.async_reported[slot] {
            return;
        }
        let Some(function) = node.child_by_field_name("function") else {
            return;
        };
        let callee = self.text(function);
        let blocking = BLOCKING_CALLS.contains(&callee)
            || BLOCKING_PREFIXES.iter().any(|p| callee.starts_with(p));
        if blocking {
            self.summary.async_blocking_calls.push(CallSite {
                line: node.start_position().row + 1,
                callee: callee.to_string(),
            });
            self.async_reported[slot] = true;
        }
    }
}

fn first_statement(block: Node) -> Option<Node> {
    let mut cursor = block.walk();
    let first = block
        .named_children(&mut cursor)
        .find(|c| c.kind() != "comment");
    first
}

fn has_docstring(body: Node) -> bool {
    first_statement(body).is_some_and(|stmt| {
        stmt.kind() == "expression_statement"
            && stmt
                .named_child(0)
                .is_some_and(|expr| matches!(expr.kind(), "string" | "concatenated_string"))
    })
}

fn is_noop_block(block: Node) -> bool {
    let statements: Vec<Node> = block
        .named_children(&mut block.walk())
        .filter(|c| c.kind() != "comment")
        .collect();

    match statements.as_slice() {
        [only] => {
            only.kind() == "pass_statement"
                || (only.kind() == "expression_statement"
                    && only.named_child_count() == 1
                    && only.named_child(0).is_some_and(|e| e.kind() == "ellipsis"))
        }
        _ => false,
    }
}
