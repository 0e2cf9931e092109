//! Promise and `await` misuse in JavaScript/TypeScript.

use super::{FnRule, Rule, RuleContext, JS_FAMILY};
use crate::core::{CodeSmell, Severity, SmellType};
use once_cell::sync::Lazy;
use regex::Regex;

static AWAITING_ASYNC_FN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:async\s+function|\basync\s*\([^)]*\)\s*=>)[^}]*await\s+[^}]*\}").unwrap()
});
static TRY_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"try\s*\{").unwrap());
static CATCH_CALL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.catch\s*\(").unwrap());
static AWAIT_IN_LOOP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:for|while)\s*\([^)]*\)\s*\{[^}]*await\s+").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsyncErrorPattern {
    /// More awaiting async functions than `try` blocks and `.catch()` handlers.
    UnhandledRejection,
    /// `await` inside a loop body with no `Promise.all` in the file.
    SequentialAwait,
}

impl AsyncErrorPattern {
    pub fn smell_type(&self) -> SmellType {
        match self {
            Self::UnhandledRejection => SmellType::UnhandledPromiseRejection,
            Self::SequentialAwait => SmellType::SequentialAwait,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::UnhandledRejection => "Async functions without proper error handling",
            Self::SequentialAwait => "Await inside loop executes sequentially instead of in parallel",
        }
    }

    pub fn remediation(&self) -> &'static str {
        match self {
            Self::UnhandledRejection => "Wrap await calls in try-catch or add .catch() handlers",
            Self::SequentialAwait => {
                "Use Promise.all() with map to parallelize: await Promise.all(items.map(async i => ...))"
            }
        }
    }
}

fn report(ctx: &RuleContext, pattern: AsyncErrorPattern, line: usize) -> CodeSmell {
    ctx.smell(
        pattern.smell_type(),
        Severity::HIGH,
        line,
        pattern.description(),
        pattern.remediation(),
    )
}

pub fn detect_unhandled_rejection(ctx: &RuleContext) -> Option<CodeSmell> {
    let awaiting = AWAITING_ASYNC_FN.find_iter(ctx.content).count();
    let handlers =
        TRY_BLOCK.find_iter(ctx.content).count() + CATCH_CALL.find_iter(ctx.content).count();

    (awaiting > 0 && handlers < awaiting)
        .then(|| report(ctx, AsyncErrorPattern::UnhandledRejection, 1))
}

pub fn detect_sequential_await(ctx: &RuleContext) -> Option<CodeSmell> {
    if ctx.content.contains("Promise.all") {
        return None;
    }
    let found = AWAIT_IN_LOOP.find(ctx.content)?;
    Some(report(
        ctx,
        AsyncErrorPattern::SequentialAwait,
        ctx.line_of(found.start()),
    ))
}

pub(super) fn rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(FnRule::pattern("unhandled-rejection", JS_FAMILY, |ctx| {
            Ok(detect_unhandled_rejection(ctx).into_iter().collect())
        })),
        Box::new(FnRule::pattern("sequential-await", JS_FAMILY, |ctx| {
            Ok(detect_sequential_await(ctx).into_iter().collect())
        })),
    ]
}
