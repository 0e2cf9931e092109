//! Complexity visitors.
//!
//! One traversal per file collects decision points, nesting depth and the
//! per-function/per-class facts the structural rules consume.

pub mod heuristic;
pub mod javascript;
pub mod python;

use crate::metrics::round_to;

/// Facts about one function-like node.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionInfo {
    pub name: String,
    pub line: usize,
    pub end_line: usize,
    pub complexity: u32,
    pub param_count: usize,
    pub is_public: bool,
    pub has_docstring: bool,
    pub has_mutable_default: bool,
    pub is_async: bool,
}

impl FunctionInfo {
    pub fn length(&self) -> usize {
        self.end_line.saturating_sub(self.line) + 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassInfo {
    pub name: String,
    pub line: usize,
    /// Methods defined anywhere inside the class body, nested classes included.
    pub method_count: usize,
}

/// An exception handler (`except` clause).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerInfo {
    pub line: usize,
    pub is_typed: bool,
    /// Body consists only of `pass` or `...`.
    pub is_noop: bool,
}

/// A call or attribute access of interest, with the text that matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    pub line: usize,
    pub callee: String,
}

/// Everything one visitor pass learned about a file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyntaxSummary {
    pub functions: Vec<FunctionInfo>,
    pub classes: Vec<ClassInfo>,
    pub handlers: Vec<HandlerInfo>,
    /// Query-like accesses inside loop bodies, one per loop nest.
    pub loop_queries: Vec<CallSite>,
    /// Blocking calls inside async functions, one per function.
    pub async_blocking_calls: Vec<CallSite>,
    /// Lines holding an `open(...)` that is managed by a `with` item.
    pub managed_open_lines: Vec<usize>,
    /// Complexity of the whole file treated as a single frame.
    pub file_complexity: u32,
    pub nesting_max: u32,
}

/// Structural numbers that end up in `FileMetrics`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StructureMetrics {
    pub cyclomatic_max: u32,
    pub cyclomatic_avg: f64,
    pub nesting_max: u32,
    pub fn_count: usize,
    pub class_count: usize,
}

impl StructureMetrics {
    /// Metrics for a file that could not be parsed.
    pub fn degraded() -> Self {
        Self {
            cyclomatic_max: 1,
            cyclomatic_avg: 1.0,
            nesting_max: 0,
            fn_count: 0,
            class_count: 0,
        }
    }
}

impl SyntaxSummary {
    /// Max/avg over functions, or the whole-file frame when there are none.
    pub fn structure(&self) -> StructureMetrics {
        let (max, avg) = if self.functions.is_empty() {
            let file = self.file_complexity.max(1);
            (file, file as f64)
        } else {
            let total: u32 = self.functions.iter().map(|f| f.complexity).sum();
            let max = self.functions.iter().map(|f| f.complexity).max().unwrap_or(1);
            (max, total as f64 / self.functions.len() as f64)
        };

        StructureMetrics {
            cyclomatic_max: max,
            cyclomatic_avg: round_to(avg, 2),
            nesting_max: self.nesting_max,
            fn_count: self.functions.len(),
            class_count: self.classes.len(),
        }
    }
}

/// Open function frames plus the whole-file frame.
///
/// A decision point counts toward every open frame, so a nested function's
/// branches also raise its enclosing function's complexity.
#[derive(Debug, Default)]
pub(crate) struct FrameStack {
    open: Vec<(usize, u32)>,
    file: u32,
    depth: u32,
    max_depth: u32,
}

impl FrameStack {
    pub(crate) fn new() -> Self {
        Self {
            open: Vec::new(),
            file: 1,
            depth: 0,
            max_depth: 0,
        }
    }

    pub(crate) fn decision(&mut self, weight: u32) {
        self.file += weight;
        for (_, complexity) in &mut self.open {
            *complexity += weight;
        }
    }

    /// Open a frame for the function stored at `slot`.
    pub(crate) fn push_function(&mut self, slot: usize) {
        self.open.push((slot, 1));
    }

    /// Close the innermost frame, returning its slot and complexity.
    pub(crate) fn pop_function(&mut self) -> Option<(usize, u32)> {
        self.open.pop()
    }

    pub(crate) fn enter_block(&mut self) {
        self.depth += 1;
        self.max_depth = self.max_depth.max(self.depth);
    }

    pub(crate) fn exit_block(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub(crate) fn depth(&self) -> u32 {
        self.depth
    }

    pub(crate) fn set_depth(&mut self, depth: u32) {
        self.depth = depth;
        self.max_depth = self.max_depth.max(depth);
    }

    pub(crate) fn file_complexity(&self) -> u32 {
        self.file
    }

    pub(crate) fn max_depth(&self) -> u32 {
        self.max_depth
    }
}
