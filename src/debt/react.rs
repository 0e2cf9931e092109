//! React hook and JSX rules, applied to `.jsx`/`.tsx` files and anything importing react.

use super::{FnRule, Rule, RuleContext, JS_FAMILY};
use crate::core::{CodeSmell, Result, Severity, SmellType};
use once_cell::sync::Lazy;
use regex::Regex;

const MAX_INLINE_OBJECT_PROPS: usize = 5;
const MAX_ANONYMOUS_HANDLERS: usize = 5;

static EMPTY_DEPS_EFFECT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"useEffect\s*\(\s*\(\)\s*=>\s*\{[^}]*\}\s*,\s*\[\s*\]\s*\)").unwrap()
});
static EXTERNAL_STATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:props\.|state\.|\w+(?:State|Props))\b").unwrap());
static SETTING_EFFECT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"useEffect\s*\(\s*\(\)\s*=>\s*\{[^}]*set\w+\s*\([^}]*\}\s*,").unwrap()
});
static CLEANUP_RETURN: Lazy<Regex> = Lazy::new(|| Regex::new(r"return\s*\(\s*\)\s*=>").unwrap());
static INLINE_OBJECT_PROP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:style|className|options)=\{\{[^}]+\}\}").unwrap());
static ANONYMOUS_HANDLER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"on\w+=\{(?:\([^)]*\)\s*=>|\(\s*\)\s*=>|function\s*\()").unwrap()
});

/// First empty-deps `useEffect` whose body reads props or state.
pub fn detect_missing_dependencies(ctx: &RuleContext) -> Option<CodeSmell> {
    let effect = EMPTY_DEPS_EFFECT
        .find_iter(ctx.content)
        .find(|effect| EXTERNAL_STATE.is_match(effect.as_str()))?;

    Some(ctx.smell(
        SmellType::MissingEffectDependencies,
        Severity::HIGH,
        ctx.line_of(effect.start()),
        "useEffect with empty deps array uses external variables",
        "Add used variables to dependency array or use useCallback",
    ))
}

pub fn detect_state_update_without_cleanup(ctx: &RuleContext) -> Option<CodeSmell> {
    if CLEANUP_RETURN.is_match(ctx.content) {
        return None;
    }
    let effect = SETTING_EFFECT.find(ctx.content)?;

    Some(ctx.smell(
        SmellType::StateUpdateWithoutCleanup,
        Severity::HIGH,
        ctx.line_of(effect.start()),
        "useEffect sets state but has no cleanup - may cause memory leak",
        "Return cleanup function: return () => { /* cleanup */ }",
    ))
}

pub fn detect_inline_object_props(ctx: &RuleContext) -> Option<CodeSmell> {
    let count = INLINE_OBJECT_PROP.find_iter(ctx.content).count();
    (count > MAX_INLINE_OBJECT_PROPS).then(|| {
        ctx.smell(
            SmellType::InlineObjectProps,
            Severity::MEDIUM,
            1,
            format!("Found {count} inline object/array props - causes re-renders"),
            "Move objects outside component or use useMemo",
        )
    })
}

pub fn detect_anonymous_handlers(ctx: &RuleContext) -> Option<CodeSmell> {
    let count = ANONYMOUS_HANDLER.find_iter(ctx.content).count();
    (count > MAX_ANONYMOUS_HANDLERS).then(|| {
        ctx.smell(
            SmellType::AnonymousHandlers,
            Severity::MEDIUM,
            1,
            format!("Found {count} anonymous functions in event handlers"),
            "Use useCallback for event handlers to prevent unnecessary re-renders",
        )
    })
}

fn react_only(
    ctx: &RuleContext,
    detect: fn(&RuleContext) -> Option<CodeSmell>,
) -> Result<Vec<CodeSmell>> {
    if !ctx.is_react_file() {
        return Ok(Vec::new());
    }
    Ok(detect(ctx).into_iter().collect())
}

pub(super) fn rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(FnRule::pattern("effect-dependencies", JS_FAMILY, |ctx| {
            react_only(ctx, detect_missing_dependencies)
        })),
        Box::new(FnRule::pattern("effect-cleanup", JS_FAMILY, |ctx| {
            react_only(ctx, detect_state_update_without_cleanup)
        })),
        Box::new(FnRule::pattern("inline-object-props", JS_FAMILY, |ctx| {
            react_only(ctx, detect_inline_object_props)
        })),
        Box::new(FnRule::pattern("anonymous-handlers", JS_FAMILY, |ctx| {
            react_only(ctx, detect_anonymous_handlers)
        })),
    ]
}
