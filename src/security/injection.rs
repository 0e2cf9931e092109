//! SQL built from strings and dynamic code execution.

use crate::core::{Severity, SmellType};
use crate::debt::patterns::{compile_labelled, LabelledPatterns, PatternHit, PatternRule};
use crate::debt::{Rule, JS_FAMILY, PYTHON};
use once_cell::sync::Lazy;

/// Characters of the matched call echoed back in the message.
const ECHOED_CHARS: usize = 20;

static PYTHON_SQL: LabelledPatterns = Lazy::new(|| {
    const MESSAGE: &str =
        "Potential SQL injection: user input may be directly interpolated into SQL query";
    compile_labelled(&[
        (r#"(?im)execute\s*\(\s*["'].*%s"#, MESSAGE),
        (r#"(?im)execute\s*\(\s*f["']"#, MESSAGE),
        (r"(?im)cursor\.execute\s*\([^,]+\+", MESSAGE),
        (r#"(?im)\.raw\s*\(\s*["'].*\{"#, MESSAGE),
    ])
});

static CODE_EXECUTION: LabelledPatterns = Lazy::new(|| {
    compile_labelled(&[
        (r"(?im)os\.system\s*\([^)]*\+", ""),
        (
            r"(?im)subprocess\.(?:call|run|Popen)\s*\([^)]*shell\s*=\s*True",
            "",
        ),
        (r"(?im)\beval\s*\(", ""),
        (r"(?im)\bexec\s*\(", ""),
    ])
});

// The `[^;]*?` keeps a match inside one statement.
static JAVASCRIPT_SQL: LabelledPatterns = Lazy::new(|| {
    compile_labelled(&[
        (
            r#"(?i)query\s*\(\s*[`"'][^;]*?\$\{"#,
            "SQL query with template literal interpolation",
        ),
        (
            r#"(?i)execute\s*\(\s*[`"'][^;]*?\+"#,
            "SQL execute with string concatenation",
        ),
        (
            r#"(?i)\.raw\s*\(\s*[`"'][^;]*?\$\{"#,
            "Raw SQL query with interpolation",
        ),
    ])
});

fn describe_execution(hit: &PatternHit, suggestion: &'static str) -> (String, String) {
    let echoed: String = hit.matched.chars().take(ECHOED_CHARS).collect();
    (
        format!("Dangerous function '{echoed}...' can execute arbitrary code"),
        suggestion.to_string(),
    )
}

pub fn python_sql_rules() -> Vec<Box<dyn Rule>> {
    vec![Box::new(
        PatternRule::new(
            "sql-injection",
            SmellType::SqlInjection,
            Severity::CRITICAL,
            PYTHON,
            &PYTHON_SQL,
            "Use parameterized queries: cursor.execute('SELECT * FROM users WHERE id = ?', (user_id,))",
        )
        .expensive(),
    )]
}

/// Always runs, whatever the file size.
pub fn code_injection_rules() -> Vec<Box<dyn Rule>> {
    vec![Box::new(
        PatternRule::new(
            "code-injection",
            SmellType::CodeInjection,
            Severity::CRITICAL,
            PYTHON,
            &CODE_EXECUTION,
            "Avoid eval/exec. For subprocess, use shell=False and pass args as list",
        )
        .describing(describe_execution),
    )]
}

pub fn javascript_sql_rules() -> Vec<Box<dyn Rule>> {
    vec![Box::new(
        PatternRule::new(
            "sql-injection-js",
            SmellType::SqlInjection,
            Severity::CRITICAL,
            JS_FAMILY,
            &JAVASCRIPT_SQL,
            "Use parameterized queries or prepared statements",
        )
        .expensive(),
    )]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CodeSmell;
    use crate::debt::test_support::Fixture;
    use indoc::indoc;

    fn first(rules: Vec<Box<dyn Rule>>, path: &str, source: &str) -> Vec<CodeSmell> {
        let fixture = Fixture::new(path, source);
        rules[0].check(&fixture.ctx()).unwrap()
    }

    #[test]
    fn test_python_sql_formatting() {
        let source = indoc! {r#"
            def find(cursor, name):
                cursor.execute("SELECT * FROM users WHERE name = '%s'" % name)
        "#};
        let smells = first(python_sql_rules(), "db.py", source);
        assert_eq!(smells.len(), 1);
        assert_eq!(smells[0].line, 2);
        assert_eq!(smells[0].smell_type, SmellType::SqlInjection);
    }

    #[test]
    fn test_parameterised_query_is_clean() {
        let source = "cursor.execute('SELECT * FROM users WHERE id = ?', (user_id,))\n";
        assert!(first(python_sql_rules(), "db.py", source).is_empty());
    }

    #[test]
    fn test_code_injection_echoes_call() {
        let source = "x = 1\nresult = eval(user_input)\n";
        let smells = first(code_injection_rules(), "a.py", source);
        assert_eq!(smells[0].line, 2);
        assert_eq!(
            smells[0].message,
            "Dangerous function 'eval(...' can execute arbitrary code"
        );
    }

    #[test]
    fn test_shell_true_preferred_over_eval() {
        let source = "eval(x)\nsubprocess.run(cmd, shell=True)\n";
        let smells = first(code_injection_rules(), "a.py", source);
        assert_eq!(smells[0].line, 2);
        assert_eq!(
            smells[0].message,
            "Dangerous function 'subprocess.run(cmd, ...' can execute arbitrary code"
        );
    }

    #[test]
    fn test_method_named_exec_like_is_not_exec() {
        let source = "cursor.executemany(q, rows)\nrunner.do_exec(x)\n";
        assert!(first(code_injection_rules(), "a.py", source).is_empty());
    }

    #[test]
    fn test_javascript_template_sql() {
        let source = "const rows = await db.query(`SELECT * FROM t WHERE id = ${id}`);\n";
        let smells = first(javascript_sql_rules(), "repo.js", source);
        assert_eq!(smells[0].message, "SQL query with template literal interpolation");
    }
}
