//! Structural maintainability and documentation rules over the syntax summary.

use super::{FnRule, Rule, RuleContext, ALL_LANGUAGES, PYTHON};
use crate::complexity::{ClassInfo, FunctionInfo};
use crate::core::{CodeSmell, Language, Result, Severity, SmellType};
use crate::metrics::{is_component_path, is_config_path, is_test_path};

/// Complexity above which a function is severity 5.
const EXTREME_COMPLEXITY: u32 = 25;
/// Complexity above which a function is severity 4.
const VERY_HIGH_COMPLEXITY: u32 = 15;
const MANY_PARAMETERS: usize = 7;
const HUGE_CLASS_METHODS: usize = 25;
const VERY_DEEP_NESTING: u32 = 5;

pub fn detect_high_complexity(ctx: &RuleContext, func: &FunctionInfo) -> Option<CodeSmell> {
    if func.complexity <= ctx.thresholds.complexity {
        return None;
    }
    let severity = if func.complexity > EXTREME_COMPLEXITY {
        Severity::CRITICAL
    } else if func.complexity > VERY_HIGH_COMPLEXITY {
        Severity::HIGH
    } else {
        Severity::MEDIUM
    };

    Some(ctx.smell(
        SmellType::HighComplexity,
        severity,
        func.line,
        format!(
            "Function '{}' has complexity {} - research shows bug probability increases exponentially above 10",
            func.name, func.complexity
        ),
        "Extract conditional logic into well-named helper functions or use strategy/state pattern",
    ))
}

pub fn detect_long_parameter_list(ctx: &RuleContext, func: &FunctionInfo) -> Option<CodeSmell> {
    if func.param_count <= ctx.thresholds.parameters {
        return None;
    }

    Some(ctx.smell(
        SmellType::TooManyParameters,
        if func.param_count > MANY_PARAMETERS {
            Severity::HIGH
        } else {
            Severity::MEDIUM
        },
        func.line,
        format!(
            "Function '{}' has {} parameters - hard to call correctly and test",
            func.name, func.param_count
        ),
        "Group related params into a dataclass/NamedTuple, or split into multiple functions",
    ))
}

pub fn detect_god_class(ctx: &RuleContext, class: &ClassInfo) -> Option<CodeSmell> {
    if class.method_count <= ctx.thresholds.god_class_methods {
        return None;
    }

    Some(ctx.smell(
        SmellType::GodClass,
        if class.method_count > HUGE_CLASS_METHODS {
            Severity::HIGH
        } else {
            Severity::MEDIUM
        },
        class.line,
        format!(
            "Class '{}' has {} methods - violates Single Responsibility Principle",
            class.name, class.method_count
        ),
        "Identify different responsibilities and extract into focused collaborating classes",
    ))
}

/// File-scoped, reported at line 1.
pub fn detect_deep_nesting(ctx: &RuleContext, depth: u32) -> Option<CodeSmell> {
    if depth <= ctx.thresholds.nesting {
        return None;
    }

    Some(ctx.smell(
        SmellType::DeepNesting,
        if depth > VERY_DEEP_NESTING {
            Severity::HIGH
        } else {
            Severity::MEDIUM
        },
        1,
        format!("Nesting depth {depth} exceeds cognitive limit - hard to understand control flow"),
        "Use guard clauses (early returns), extract nested blocks to functions, or flatten with helper methods",
    ))
}

pub fn detect_mutable_default(ctx: &RuleContext, func: &FunctionInfo) -> Option<CodeSmell> {
    func.has_mutable_default.then(|| {
        ctx.smell(
            SmellType::MutableDefaultArgument,
            Severity::MEDIUM,
            func.line,
            format!(
                "Mutable default in '{}' - shared across calls causing subtle bugs",
                func.name
            ),
            "Use None as default and create new object: def foo(items=None): items = items or []",
        )
    })
}

/// Python functions over the limit, ignoring tests, settings and migrations.
pub fn detect_long_python_function(ctx: &RuleContext, func: &FunctionInfo) -> Option<CodeSmell> {
    if is_test_path(ctx.path) || is_config_path(ctx.path) {
        return None;
    }
    let length = func.length();
    (length > ctx.thresholds.python_long_function_lines).then(|| {
        ctx.smell(
            SmellType::LongFunction,
            Severity::LOW,
            func.line,
            format!(
                "Function '{}' is {} lines - consider if it can be broken down",
                func.name, length
            ),
            "Optional: Extract cohesive blocks if it improves readability",
        )
    })
}

/// JS/TS functions over the limit; pages and components get more room.
pub fn detect_long_js_function(ctx: &RuleContext, func: &FunctionInfo) -> Option<CodeSmell> {
    if is_test_path(ctx.path) {
        return None;
    }
    let limit = if is_component_path(ctx.path) {
        ctx.thresholds.js_component_long_function_lines
    } else {
        ctx.thresholds.js_long_function_lines
    };
    let length = func.length();
    (length > limit).then(|| {
        ctx.smell(
            SmellType::LongFunction,
            Severity::LOW,
            func.line,
            format!("Function '{}' has ~{} lines - quite large", func.name, length),
            "Optional: Consider breaking into smaller functions if it improves readability",
        )
    })
}

/// One summary finding for all undocumented public functions.
pub fn detect_missing_docstrings(ctx: &RuleContext, functions: &[FunctionInfo]) -> Option<CodeSmell> {
    let mut undocumented = functions
        .iter()
        .filter(|f| f.is_public && !f.has_docstring);
    let first = undocumented.next()?;
    let count = 1 + undocumented.count();

    let message = if count == 1 {
        format!("Public function '{}' has no docstring", first.name)
    } else {
        format!(
            "{count} public functions have no docstring, starting with '{}'",
            first.name
        )
    };
    Some(ctx.smell(
        SmellType::MissingDocstring,
        Severity::INFO,
        first.line,
        message,
        "Describe purpose, arguments and return value in a docstring",
    ))
}

fn per_function(
    ctx: &RuleContext,
    detect: fn(&RuleContext, &FunctionInfo) -> Option<CodeSmell>,
) -> Result<Vec<CodeSmell>> {
    let syntax = ctx.syntax()?;
    Ok(syntax
        .functions
        .iter()
        .filter_map(|func| detect(ctx, func))
        .collect())
}

fn check_long_functions(ctx: &RuleContext) -> Result<Vec<CodeSmell>> {
    match ctx.language {
        Language::Python => per_function(ctx, detect_long_python_function),
        Language::JavaScript | Language::TypeScript => per_function(ctx, detect_long_js_function),
    }
}

pub(super) fn rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(FnRule::structural("high-complexity", ALL_LANGUAGES, |ctx| {
            per_function(ctx, detect_high_complexity)
        })),
        Box::new(FnRule::structural("too-many-parameters", ALL_LANGUAGES, |ctx| {
            per_function(ctx, detect_long_parameter_list)
        })),
        Box::new(FnRule::structural("god-class", ALL_LANGUAGES, |ctx| {
            let syntax = ctx.syntax()?;
            Ok(syntax
                .classes
                .iter()
                .filter_map(|class| detect_god_class(ctx, class))
                .collect())
        })),
        Box::new(FnRule::structural("deep-nesting", ALL_LANGUAGES, |ctx| {
            let syntax = ctx.syntax()?;
            Ok(detect_deep_nesting(ctx, syntax.nesting_max).into_iter().collect())
        })),
        Box::new(FnRule::structural("mutable-default", PYTHON, |ctx| {
            per_function(ctx, detect_mutable_default)
        })),
        Box::new(FnRule::structural("long-function", ALL_LANGUAGES, check_long_functions)),
        Box::new(FnRule::structural("missing-docstring", PYTHON, |ctx| {
            let syntax = ctx.syntax()?;
            Ok(detect_missing_docstrings(ctx, &syntax.functions)
                .into_iter()
                .collect())
        })),
    ]
}
