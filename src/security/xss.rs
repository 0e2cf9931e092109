//! DOM sinks that render or evaluate untrusted strings.

use crate::core::{Severity, SmellType};
use crate::debt::patterns::{compile_labelled, LabelledPatterns, PatternRule};
use crate::debt::{Rule, JS_FAMILY};
use once_cell::sync::Lazy;

static XSS_SINKS: LabelledPatterns = Lazy::new(|| {
    compile_labelled(&[
        (
            r"\.innerHTML\s*=",
            "Direct innerHTML assignment - XSS vulnerability",
        ),
        (
            r"dangerouslySetInnerHTML\s*=",
            "dangerouslySetInnerHTML usage - XSS risk",
        ),
        (
            r"document\.write\s*\(",
            "document.write usage - XSS and performance issues",
        ),
        (r"\beval\s*\(", "eval() usage - code injection vulnerability"),
        (
            r"new\s+Function\s*\(",
            "new Function() - similar risks to eval()",
        ),
    ])
});

pub fn rules() -> Vec<Box<dyn Rule>> {
    vec![Box::new(PatternRule::new(
        "xss",
        SmellType::XssVulnerability,
        Severity::CRITICAL,
        JS_FAMILY,
        &XSS_SINKS,
        "Use textContent instead of innerHTML, or sanitize HTML with DOMPurify",
    ))]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debt::test_support::Fixture;

    #[test]
    fn test_inner_html_assignment() {
        let fixture = Fixture::new("a.js", "const el = find();\nel.innerHTML = html;\n");
        let smells = rules()[0].check(&fixture.ctx()).unwrap();
        assert_eq!(smells.len(), 1);
        assert_eq!(smells[0].line, 2);
        assert_eq!(smells[0].severity, Severity::CRITICAL);
    }

    #[test]
    fn test_one_finding_per_file() {
        let fixture = Fixture::new(
            "a.js",
            "eval(a);\neval(b);\ndocument.write(c);\n",
        );
        let smells = rules()[0].check(&fixture.ctx()).unwrap();
        assert_eq!(smells.len(), 1);
        assert_eq!(smells[0].message, "document.write usage - XSS and performance issues");
    }

    #[test]
    fn test_text_content_is_safe() {
        let fixture = Fixture::new("a.js", "el.textContent = value;\nconst evaluate = 1;\n");
        assert!(rules()[0].check(&fixture.ctx()).unwrap().is_empty());
    }
}
