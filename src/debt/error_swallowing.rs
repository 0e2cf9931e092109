//! Exception handlers that hide failures.

use super::{FnRule, Rule, RuleContext, JS_FAMILY, PYTHON};
use crate::complexity::HandlerInfo;
use crate::core::{CodeSmell, Result, Severity, SmellType};
use once_cell::sync::Lazy;
use regex::Regex;

static EMPTY_CATCH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"catch\s*(?:\([^)]*\)\s*)?\{\s*\}").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSwallowingPattern {
    /// `except:` with no exception type.
    BareExcept,
    /// Handler body is only `pass` or `...`.
    NoOpHandler,
}

impl ErrorSwallowingPattern {
    pub fn smell_type(&self) -> SmellType {
        match self {
            Self::BareExcept => SmellType::BareExcept,
            Self::NoOpHandler => SmellType::SwallowedException,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::BareExcept => {
                "Bare 'except:' catches KeyboardInterrupt and SystemExit, preventing graceful shutdown"
            }
            Self::NoOpHandler => {
                "Exception silently ignored - bugs will be invisible and hard to debug"
            }
        }
    }

    pub fn remediation(&self) -> &'static str {
        match self {
            Self::BareExcept => "Use 'except Exception:' to catch only errors, not system signals",
            Self::NoOpHandler => {
                "At minimum, log the exception. Consider re-raising or handling appropriately"
            }
        }
    }
}

/// Patterns a single handler exhibits, in reporting order.
pub fn classify_handler(handler: &HandlerInfo) -> Vec<ErrorSwallowingPattern> {
    let mut patterns = Vec::new();
    if !handler.is_typed {
        patterns.push(ErrorSwallowingPattern::BareExcept);
    }
    if handler.is_noop {
        patterns.push(ErrorSwallowingPattern::NoOpHandler);
    }
    patterns
}

fn check_python_handlers(ctx: &RuleContext) -> Result<Vec<CodeSmell>> {
    let syntax = ctx.syntax()?;
    Ok(syntax
        .handlers
        .iter()
        .flat_map(|handler| {
            classify_handler(handler).into_iter().map(move |pattern| {
                ctx.smell(
                    pattern.smell_type(),
                    Severity::HIGH,
                    handler.line,
                    pattern.description(),
                    pattern.remediation(),
                )
            })
        })
        .collect())
}

/// Counted: `catch (e) {}` and `catch {}` blocks.
pub fn detect_empty_catch(ctx: &RuleContext) -> Option<CodeSmell> {
    let count = EMPTY_CATCH.find_iter(ctx.content).count();
    (count > 0).then(|| {
        ctx.smell(
            SmellType::EmptyCatchBlock,
            Severity::HIGH,
            1,
            format!("Found {count} empty catch blocks"),
            "Log errors or handle them appropriately",
        )
    })
}

pub(super) fn rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(FnRule::structural("exception-handlers", PYTHON, check_python_handlers)),
        Box::new(FnRule::pattern("empty-catch", JS_FAMILY, |ctx| {
            Ok(detect_empty_catch(ctx).into_iter().collect())
        })),
    ]
}

#[cfg(test)]
mod tests {
    use super::super::test_support::Fixture;
    use super::*;
    use crate::complexity::SyntaxSummary;

    #[test]
    fn test_bare_noop_handler_yields_both_patterns() {
        let handler = HandlerInfo {
            line: 4,
            is_typed: false,
            is_noop: true,
        };
        assert_eq!(
            classify_handler(&handler),
            vec![
                ErrorSwallowingPattern::BareExcept,
                ErrorSwallowingPattern::NoOpHandler
            ]
        );
    }

    #[test]
    fn test_typed_handler_with_body_is_clean() {
        let handler = HandlerInfo {
            line: 4,
            is_typed: true,
            is_noop: false,
        };
        assert!(classify_handler(&handler).is_empty());
    }

    #[test]
    fn test_python_handlers_reported_at_their_line() {
        let summary = SyntaxSummary {
            handlers: vec![HandlerInfo {
                line: 5,
                is_typed: true,
                is_noop: true,
            }],
            ..SyntaxSummary::default()
        };
        let fixture = Fixture::new("a.py", "").with_syntax(summary);
        let smells = check_python_handlers(&fixture.ctx()).unwrap();
        assert_eq!(smells.len(), 1);
        assert_eq!(smells[0].smell_type, SmellType::SwallowedException);
        assert_eq!(smells[0].line, 5);
        assert_eq!(smells[0].severity, Severity::HIGH);
    }

    #[test]
    fn test_empty_catch_counts_every_block() {
        let fixture = Fixture::new(
            "a.js",
            "try { a(); } catch (e) {}\ntry { b(); } catch {\n}\ntry { c(); } catch (e) { log(e); }\n",
        );
        let smell = detect_empty_catch(&fixture.ctx()).unwrap();
        assert_eq!(smell.message, "Found 2 empty catch blocks");
        assert_eq!(smell.line, 1);
    }
}
