//! Regex-driven rules: the first-match pattern machinery and the counted
//! text rules for maintainability and cosmetic issues.

use super::{FnRule, Rule, RuleContext, ALL_LANGUAGES, JS_FAMILY, PYTHON, TYPESCRIPT};
use crate::core::{CodeSmell, Language, Result, Severity, SmellType};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Ordered `(pattern, message)` pairs of one rule family.
pub type LabelledPatterns = Lazy<Vec<(Regex, &'static str)>>;

/// Compile literal patterns; only called from `Lazy` initialisers.
pub fn compile_labelled(patterns: &[(&str, &'static str)]) -> Vec<(Regex, &'static str)> {
    patterns
        .iter()
        .map(|(pattern, label)| (Regex::new(pattern).unwrap(), *label))
        .collect()
}

/// A single regex match, resolved to its line.
pub struct PatternHit<'t> {
    pub index: usize,
    pub label: &'static str,
    pub captures: Captures<'t>,
    pub matched: &'t str,
    pub line: usize,
    pub line_text: &'t str,
}

/// Reports the first accepted match across an ordered list of patterns.
pub struct PatternRule {
    id: &'static str,
    smell_type: SmellType,
    severity: Severity,
    languages: &'static [Language],
    expensive: bool,
    patterns: &'static LabelledPatterns,
    suggestion: &'static str,
    accept: fn(&PatternHit) -> bool,
    describe: fn(&PatternHit, &'static str) -> (String, String),
}

fn accept_any(_: &PatternHit) -> bool {
    true
}

fn labelled(hit: &PatternHit, suggestion: &'static str) -> (String, String) {
    (hit.label.to_string(), suggestion.to_string())
}

impl PatternRule {
    pub fn new(
        id: &'static str,
        smell_type: SmellType,
        severity: Severity,
        languages: &'static [Language],
        patterns: &'static LabelledPatterns,
        suggestion: &'static str,
    ) -> Self {
        Self {
            id,
            smell_type,
            severity,
            languages,
            expensive: false,
            patterns,
            suggestion,
            accept: accept_any,
            describe: labelled,
        }
    }

    pub fn expensive(mut self) -> Self {
        self.expensive = true;
        self
    }

    pub fn accepting(mut self, accept: fn(&PatternHit) -> bool) -> Self {
        self.accept = accept;
        self
    }

    pub fn describing(mut self, describe: fn(&PatternHit, &'static str) -> (String, String)) -> Self {
        self.describe = describe;
        self
    }

    fn first_hit<'t>(&self, ctx: &RuleContext<'t>) -> Option<PatternHit<'t>> {
        for (index, (regex, label)) in self.patterns.iter().enumerate() {
            for captures in regex.captures_iter(ctx.content) {
                let Some(whole) = captures.get(0) else {
                    continue;
                };
                let line = ctx.line_of(whole.start());
                let hit = PatternHit {
                    index,
                    label: *label,
                    matched: whole.as_str(),
                    line,
                    line_text: ctx.line_text(line),
                    captures,
                };
                if (self.accept)(&hit) {
                    return Some(hit);
                }
            }
        }
        None
    }
}

impl Rule for PatternRule {
    fn id(&self) -> &'static str {
        self.id
    }

    fn family(&self) -> super::RuleFamily {
        super::RuleFamily::Pattern
    }

    fn applies_to(&self, language: Language) -> bool {
        self.languages.contains(&language)
    }

    fn is_expensive(&self) -> bool {
        self.expensive
    }

    fn check(&self, ctx: &RuleContext) -> Result<Vec<CodeSmell>> {
        Ok(self
            .first_hit(ctx)
            .map(|hit| {
                let (message, suggestion) = (self.describe)(&hit, self.suggestion);
                ctx.smell(self.smell_type, self.severity, hit.line, message, suggestion)
            })
            .into_iter()
            .collect())
    }
}

const VERY_LONG_FILE_LINES: usize = 800;
const CALLBACK_HELL_DEPTH: usize = 4;

static GLOBAL_STATEMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*global\s+\w+").unwrap());
static PRINT_CALL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bprint\s*\(").unwrap());
static CONSOLE_CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"console\.(?:log|warn|error|debug|info)").unwrap());
static TODO_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:TODO|FIXME|HACK|XXX|BUG)\b").unwrap());
static ANY_ANNOTATION: Lazy<Regex> = Lazy::new(|| Regex::new(r":\s*any\b").unwrap());
static CALLBACK_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"function\s*\([^)]*\)\s*\{|=>\s*\{|\(\s*\([^)]*\)\s*=>\s*\{").unwrap()
});

static BUNDLE_IMPORTS: LabelledPatterns = Lazy::new(|| {
    compile_labelled(&[
        (
            r#"import\s+\w+\s+from\s+["']lodash["']"#,
            "Full lodash import (~70KB)",
        ),
        (
            r#"import\s+\w+\s+from\s+["']moment["']"#,
            "moment.js import (~290KB) - use date-fns or dayjs",
        ),
        (
            r"import\s+\*\s+as\s+\w+\s+from",
            "Namespace import prevents tree-shaking",
        ),
    ])
});

/// More than `global_statements` module-level rebinds.
pub fn detect_global_state(ctx: &RuleContext) -> Option<CodeSmell> {
    let mut matches = GLOBAL_STATEMENT.find_iter(ctx.content);
    let first = matches.next()?;
    let count = 1 + matches.count();
    if count <= ctx.thresholds.global_statements {
        return None;
    }

    Some(ctx.smell(
        SmellType::ExcessiveGlobalState,
        Severity::MEDIUM,
        ctx.line_of(first.start()),
        format!("Found {count} global variable mutations - makes testing and reasoning difficult"),
        "Pass dependencies explicitly, use dependency injection, or encapsulate in a class",
    ))
}

/// Depth of nested callback openers, tracked line by line.
///
/// Returns the maximum depth and the first line it was reached on. A `});`
/// also counts as a `})`, so such lines close two levels.
pub fn callback_depth(content: &str) -> (usize, usize) {
    let mut depth = 0usize;
    let mut max_depth = 0usize;
    let mut max_line = 1usize;

    for (idx, line) in content.split('\n').enumerate() {
        let opened = CALLBACK_START.find_iter(line).count();
        let closed = line.matches("});").count() + line.matches("})").count();
        depth = (depth + opened).saturating_sub(closed);
        if depth > max_depth {
            max_depth = depth;
            max_line = idx + 1;
        }
    }

    (max_depth, max_line)
}

pub fn detect_callback_hell(ctx: &RuleContext) -> Option<CodeSmell> {
    let (depth, line) = callback_depth(ctx.content);
    (depth >= CALLBACK_HELL_DEPTH).then(|| {
        ctx.smell(
            SmellType::CallbackHell,
            Severity::HIGH,
            line,
            format!("Deep callback nesting (depth: {depth})"),
            "Refactor using async/await or Promises to flatten structure",
        )
    })
}

pub fn detect_any_types(ctx: &RuleContext) -> Option<CodeSmell> {
    let count = ANY_ANNOTATION.find_iter(ctx.content).count();
    (count > ctx.thresholds.any_types).then(|| {
        ctx.smell(
            SmellType::ExcessiveAnyTypes,
            Severity::HIGH,
            1,
            format!("Found {count} uses of 'any' type - defeats TypeScript benefits"),
            "Define proper interfaces/types or use 'unknown' for truly unknown types",
        )
    })
}

pub fn detect_debug_statements(ctx: &RuleContext) -> Option<CodeSmell> {
    let (pattern, kind) = match ctx.language {
        Language::Python => (&*PRINT_CALL, "print"),
        Language::JavaScript | Language::TypeScript => (&*CONSOLE_CALL, "console"),
    };
    let count = pattern.find_iter(ctx.content).count();
    (count > ctx.thresholds.debug_statements).then(|| {
        ctx.smell(
            SmellType::DebugStatements,
            Severity::LOW,
            1,
            format!("Found {count} {kind} statements"),
            "Remove debug statements or use proper logging library",
        )
    })
}

pub fn detect_todos(ctx: &RuleContext) -> Option<CodeSmell> {
    let mut matches = TODO_MARKER.find_iter(ctx.content);
    let first = matches.next()?;
    let count = 1 + matches.count();

    Some(ctx.smell(
        SmellType::UnresolvedTodos,
        Severity::LOW,
        ctx.line_of(first.start()),
        format!("Found {count} TODO/FIXME comments"),
        "Address or create tickets for tracking",
    ))
}

pub fn detect_long_file(ctx: &RuleContext) -> Option<CodeSmell> {
    if ctx.loc <= ctx.thresholds.long_file_lines {
        return None;
    }
    let severity = if ctx.loc > VERY_LONG_FILE_LINES {
        Severity::MEDIUM
    } else {
        Severity::LOW
    };

    Some(ctx.smell(
        SmellType::LongFile,
        severity,
        1,
        format!("File has {} lines", ctx.loc),
        "Split into multiple modules by responsibility",
    ))
}

fn found(smell: Option<CodeSmell>) -> Result<Vec<CodeSmell>> {
    Ok(smell.into_iter().collect())
}

pub(super) fn rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(FnRule::pattern("global-state", PYTHON, |ctx| {
            found(detect_global_state(ctx))
        })),
        Box::new(FnRule::pattern("callback-hell", JS_FAMILY, |ctx| {
            found(detect_callback_hell(ctx))
        })),
        Box::new(FnRule::pattern("any-types", TYPESCRIPT, |ctx| {
            found(detect_any_types(ctx))
        })),
        Box::new(PatternRule::new(
            "bundle-import",
            SmellType::LargeBundleImport,
            Severity::MEDIUM,
            JS_FAMILY,
            &BUNDLE_IMPORTS,
            "Use named imports: import { specific } from 'library'",
        )),
        Box::new(FnRule::pattern("debug-statements", ALL_LANGUAGES, |ctx| {
            found(detect_debug_statements(ctx))
        })),
        Box::new(FnRule::pattern("todos", ALL_LANGUAGES, |ctx| {
            found(detect_todos(ctx))
        })),
        Box::new(FnRule::pattern("long-file", ALL_LANGUAGES, |ctx| {
            found(detect_long_file(ctx))
        })),
    ]
}
