//! Performance and reliability rules: N+1 queries, blocking calls, leaks.

use super::patterns::{compile_labelled, LabelledPatterns, PatternRule};
use super::{FnRule, Rule, RuleContext, JS_FAMILY, PYTHON};
use crate::core::{CodeSmell, Result, Severity, SmellType};
use once_cell::sync::Lazy;
use regex::Regex;

/// Bytes after an `open(` searched for a matching `.close()`.
const CLOSE_LOOKAHEAD_BYTES: usize = 500;

static OPEN_CALL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bopen\s*\(").unwrap());
static HTTP_LITERAL: Lazy<Regex> = Lazy::new(|| Regex::new(r#"["']http://([^"']+)["']"#).unwrap());
static SET_INTERVAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"setInterval\s*\(").unwrap());
static CLEAR_INTERVAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"clearInterval\s*\(").unwrap());
static ADD_LISTENER: Lazy<Regex> = Lazy::new(|| Regex::new(r"addEventListener\s*\(").unwrap());
static REMOVE_LISTENER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"removeEventListener\s*\(").unwrap());

static SYNC_IO: LabelledPatterns = Lazy::new(|| {
    compile_labelled(&[
        (
            r"fs\.(?:readFileSync|writeFileSync|appendFileSync)",
            "Synchronous file I/O blocks event loop",
        ),
        (r"execSync\s*\(", "Synchronous exec blocks event loop"),
        (r"spawnSync\s*\(", "Synchronous spawn blocks event loop"),
    ])
});

static LOOP_FETCH: LabelledPatterns = Lazy::new(|| {
    compile_labelled(&[(
        r"(?:for|while|\.forEach|\.map)\s*\([^)]*\)\s*(?:\{[^}]*|=>[^}]*?)(?:fetch|axios|\.get|\.post|\.query|\.findOne|\.find)\s*\(",
        "Database/API call inside loop - N+1 performance problem",
    )])
});

static UNBOUNDED_PUSH: LabelledPatterns = Lazy::new(|| {
    compile_labelled(&[(
        r"(?:while\s*\(true\)|setInterval)\s*(?:\{[^}]*|[^{]*)\.push\s*\(",
        "Unbounded array growth in infinite loop/interval",
    )])
});

fn check_python_loop_queries(ctx: &RuleContext) -> Result<Vec<CodeSmell>> {
    let syntax = ctx.syntax()?;
    Ok(syntax
        .loop_queries
        .iter()
        .map(|site| {
            ctx.smell(
                SmellType::NPlusOneQuery,
                Severity::HIGH,
                site.line,
                "Database query inside loop causes N+1 performance issue - each iteration hits the database",
                "Use select_related/prefetch_related (Django), joinedload (SQLAlchemy), or batch queries",
            )
        })
        .collect())
}

fn check_async_blocking_calls(ctx: &RuleContext) -> Result<Vec<CodeSmell>> {
    let syntax = ctx.syntax()?;
    Ok(syntax
        .async_blocking_calls
        .iter()
        .map(|site| {
            tracing::trace!("Blocking call {} in async function of {}", site.callee, ctx.path);
            ctx.smell(
                SmellType::BlockingCallInAsync,
                Severity::HIGH,
                site.line,
                "Synchronous blocking call inside async function defeats concurrency benefits",
                "Use aiohttp instead of requests, aiofiles instead of open(), asyncio.sleep instead of time.sleep",
            )
        })
        .collect())
}

fn window(content: &str, start: usize, len: usize) -> &str {
    let mut end = (start + len).min(content.len());
    while !content.is_char_boundary(end) {
        end -= 1;
    }
    &content[start..end]
}

/// First `open(` that is neither a `with` item nor closed shortly after.
pub fn detect_resource_leak(ctx: &RuleContext) -> Option<CodeSmell> {
    let managed = ctx.syntax.map(|s| s.managed_open_lines.as_slice()).unwrap_or(&[]);

    for line in 1..=ctx.lines.line_count() {
        let range = ctx.lines.line_range(line);
        let text = &ctx.content[range.clone()];
        if !OPEN_CALL.is_match(text)
            || text.contains("with ")
            || text.trim_start().starts_with('#')
            || managed.contains(&line)
        {
            continue;
        }
        if window(ctx.content, range.start, CLOSE_LOOKAHEAD_BYTES).contains(".close()") {
            continue;
        }

        return Some(ctx.smell(
            SmellType::ResourceLeak,
            Severity::HIGH,
            line,
            "File opened without 'with' statement - may not be properly closed on exception",
            "Use context manager: with open(filename) as f:",
        ));
    }
    None
}

/// Counted: plain `http://` literals that are not loopback.
pub fn detect_insecure_http(ctx: &RuleContext) -> Option<CodeSmell> {
    let count = HTTP_LITERAL
        .captures_iter(ctx.content)
        .filter_map(|caps| caps.get(1))
        .filter(|host| {
            let host = host.as_str();
            !(host.starts_with("localhost") || host.starts_with("127.0.0.1"))
        })
        .count();

    (count > 0).then(|| {
        ctx.smell(
            SmellType::InsecureHttp,
            Severity::HIGH,
            1,
            format!("Found {count} insecure HTTP URLs (non-localhost)"),
            "Use HTTPS for all external URLs",
        )
    })
}

pub fn detect_interval_leak(ctx: &RuleContext) -> Option<CodeSmell> {
    let set = SET_INTERVAL.find_iter(ctx.content).count();
    let cleared = CLEAR_INTERVAL.find_iter(ctx.content).count();
    (set > cleared + 1).then(|| {
        ctx.smell(
            SmellType::IntervalLeak,
            Severity::HIGH,
            1,
            format!("Found {set} setInterval but only {cleared} clearInterval"),
            "Store interval ID and clear in cleanup (useEffect return, componentWillUnmount)",
        )
    })
}

pub fn detect_listener_leak(ctx: &RuleContext) -> Option<CodeSmell> {
    let added = ADD_LISTENER.find_iter(ctx.content).count();
    let removed = REMOVE_LISTENER.find_iter(ctx.content).count();
    (added > removed + 2).then(|| {
        ctx.smell(
            SmellType::EventListenerLeak,
            Severity::HIGH,
            1,
            format!("Found {added} addEventListener but only {removed} removeEventListener"),
            "Clean up listeners in useEffect cleanup or componentWillUnmount",
        )
    })
}

pub(super) fn rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(FnRule::structural("n-plus-one", PYTHON, check_python_loop_queries)),
        Box::new(FnRule::structural(
            "blocking-in-async",
            PYTHON,
            check_async_blocking_calls,
        )),
        Box::new(FnRule::pattern("resource-leak", PYTHON, |ctx| {
            Ok(detect_resource_leak(ctx).into_iter().collect())
        })),
        Box::new(FnRule::pattern("insecure-http", JS_FAMILY, |ctx| {
            Ok(detect_insecure_http(ctx).into_iter().collect())
        })),
        Box::new(PatternRule::new(
            "blocking-io",
            SmellType::BlockingIo,
            Severity::HIGH,
            JS_FAMILY,
            &SYNC_IO,
            "Use async versions: readFile, writeFile, exec, spawn",
        )),
        Box::new(PatternRule::new(
            "loop-fetch",
            SmellType::NPlusOneQuery,
            Severity::HIGH,
            JS_FAMILY,
            &LOOP_FETCH,
            "Batch queries using Promise.all(), or fetch all data before the loop",
        )),
        Box::new(PatternRule::new(
            "unbounded-push",
            SmellType::MemoryLeak,
            Severity::HIGH,
            JS_FAMILY,
            &UNBOUNDED_PUSH,
            "Limit array size or use circular buffer pattern",
        )),
        Box::new(FnRule::pattern("interval-leak", JS_FAMILY, |ctx| {
            Ok(detect_interval_leak(ctx).into_iter().collect())
        })),
        Box::new(FnRule::pattern("listener-leak", JS_FAMILY, |ctx| {
            Ok(detect_listener_leak(ctx).into_iter().collect())
        })),
    ]
}

#[cfg(test)]
mod tests {
    use super::super::test_support::Fixture;
    use super::*;
    use crate::complexity::{CallSite, SyntaxSummary};
    use indoc::indoc;

    fn run(id: &str, fixture: &Fixture) -> Vec<CodeSmell> {
        rules()
            .into_iter()
            .find(|rule| rule.id() == id)
            .unwrap()
            .check(&fixture.ctx())
            .unwrap()
    }

    #[test]
    fn test_resource_leak_first_unmanaged_open() {
        let source = indoc! {r#"
            with open("a") as f:
                pass
            data = open("b").read()
            log = open("c")
        "#};
        let fixture = Fixture::new("a.py", source);
        let smell = detect_resource_leak(&fixture.ctx()).unwrap();
        assert_eq!(smell.line, 3);
        assert_eq!(smell.smell_type, SmellType::ResourceLeak);
    }

    #[test]
    fn test_resource_leak_closed_nearby() {
        let source = indoc! {r#"
            f = open("a")
            data = f.read()
            f.close()
        "#};
        let fixture = Fixture::new("a.py", source);
        assert!(detect_resource_leak(&fixture.ctx()).is_none());
    }

    #[test]
    fn test_resource_leak_respects_managed_lines() {
        let source = "with (\n    open('a') as f,\n):\n    pass\n";
        let summary = SyntaxSummary {
            managed_open_lines: vec![2],
            ..SyntaxSummary::default()
        };
        let fixture = Fixture::new("a.py", source).with_syntax(summary);
        assert!(detect_resource_leak(&fixture.ctx()).is_none());
    }

    #[test]
    fn test_reopen_is_not_open() {
        let fixture = Fixture::new("a.py", "conn.reopen(x)\n# open(y)\n");
        assert!(detect_resource_leak(&fixture.ctx()).is_none());
    }

    #[test]
    fn test_python_structural_sites() {
        let summary = SyntaxSummary {
            loop_queries: vec![CallSite {
                line: 3,
                callee: "objects".to_string(),
            }],
            async_blocking_calls: vec![CallSite {
                line: 7,
                callee: "time.sleep".to_string(),
            }],
            ..SyntaxSummary::default()
        };
        let fixture = Fixture::new("a.py", "").with_syntax(summary);
        let queries = run("n-plus-one", &fixture);
        assert_eq!(queries[0].line, 3);
        assert_eq!(queries[0].severity, Severity::HIGH);
        let blocking = run("blocking-in-async", &fixture);
        assert_eq!(blocking[0].smell_type, SmellType::BlockingCallInAsync);
        assert_eq!(blocking[0].line, 7);
    }

    #[test]
    fn test_insecure_http_skips_loopback() {
        let source = r#"const a = "http://example.com"; const b = 'http://localhost:3000'; const c = "http://127.0.0.1"; const d = 'http://api.test/x';"#;
        let fixture = Fixture::new("a.js", source);
        let smell = detect_insecure_http(&fixture.ctx()).unwrap();
        assert_eq!(smell.message, "Found 2 insecure HTTP URLs (non-localhost)");
    }

    #[test]
    fn test_blocking_io_reports_first_pattern_at_its_line() {
        let fixture = Fixture::new(
            "a.js",
            "const out = execSync('ls');\nconst data = fs.readFileSync('x');\n",
        );
        let smells = run("blocking-io", &fixture);
        assert_eq!(smells.len(), 1);
        assert_eq!(smells[0].line, 2);
        assert_eq!(smells[0].message, "Synchronous file I/O blocks event loop");
    }

    #[test]
    fn test_loop_fetch() {
        let source = indoc! {"
            const ids = [1, 2];
            ids.forEach((id) => {
              fetch(`/users/${id}`);
            });
        "};
        let fixture = Fixture::new("a.js", source);
        let smells = run("loop-fetch", &fixture);
        assert_eq!(smells.len(), 1);
        assert_eq!(smells[0].smell_type, SmellType::NPlusOneQuery);
        assert_eq!(smells[0].line, 2);
    }

    #[test]
    fn test_unbounded_push() {
        let fixture = Fixture::new("a.js", "let x = 1;\nwhile (true) {\n  samples.push(read());\n}\n");
        let smells = run("unbounded-push", &fixture);
        assert_eq!(smells[0].smell_type, SmellType::MemoryLeak);
        assert_eq!(smells[0].line, 2);

        let fixture = Fixture::new("a.js", "setInterval(() => samples.push(read()), 10);\n");
        assert_eq!(run("unbounded-push", &fixture).len(), 1);
    }

    #[test]
    fn test_interval_and_listener_balance() {
        let intervals = "setInterval(a, 1);\nsetInterval(b, 1);\nclearInterval(x);\n";
        let fixture = Fixture::new("a.js", intervals);
        assert!(detect_interval_leak(&fixture.ctx()).is_none());
        let fixture = Fixture::new("a.js", &format!("{intervals}setInterval(c, 1);\n"));
        assert!(detect_interval_leak(&fixture.ctx()).is_some());

        let listeners = "el.addEventListener('a', f);\n".repeat(3);
        let fixture = Fixture::new("a.js", &listeners);
        let smell = detect_listener_leak(&fixture.ctx()).unwrap();
        assert_eq!(smell.message, "Found 3 addEventListener but only 0 removeEventListener");
    }
}
