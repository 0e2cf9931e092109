//! Credentials committed to source: passwords, API keys, cloud keys, private keys and JWTs.

use crate::core::{Severity, SmellType};
use crate::debt::patterns::{compile_labelled, LabelledPatterns, PatternHit, PatternRule};
use crate::debt::{Rule, JS_FAMILY, PYTHON};
use once_cell::sync::Lazy;
use regex::Regex;

/// Values that are obviously examples, compared case-insensitively.
const PLACEHOLDER_PREFIXES: &[&str] = &["your", "test", "demo", "example", "xxx", "000"];

static KEY_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(password|secret|key|token|api)").unwrap());

static PYTHON_SECRETS: LabelledPatterns = Lazy::new(|| {
    compile_labelled(&[
        (
            r#"(?im)(?:password|passwd|pwd|secret|api_key|apikey|token|auth)\s*=\s*["'][^"']{8,}["']"#,
            "",
        ),
        (
            r#"(?im)(?:AWS|aws)_(?:SECRET|ACCESS).*=\s*["'][A-Za-z0-9/+=]{20,}["']"#,
            "",
        ),
        (r"(?im)-----BEGIN (?:RSA |DSA |EC )?PRIVATE KEY-----", ""),
    ])
});

static DATABASE_URLS: LabelledPatterns = Lazy::new(|| {
    const MESSAGE: &str = "Database connection string with embedded credentials - security risk if committed to version control";
    compile_labelled(&[
        (
            r"(?im)(?:mongodb\+srv|mysql|postgresql|postgres)://[^:]+:[^@]+@",
            MESSAGE,
        ),
        (
            r#"(?im)DATABASE_URL\s*=\s*["'](?:mysql|postgres|mongodb)://[^"']+["']"#,
            MESSAGE,
        ),
    ])
});

static API_KEYS: LabelledPatterns = Lazy::new(|| {
    compile_labelled(&[
        (
            r#"(?im)(?:api[_-]?key|apikey|api[_-]?secret)\s*[:=]\s*["']([A-Za-z0-9_\-]{20,})["']"#,
            "",
        ),
        (
            r#"(?im)(?:OPENAI|openai|gpt)[_-]?(?:API|api)[_-]?(?:KEY|key)\s*[:=]\s*["']sk-[A-Za-z0-9]{20,}["']"#,
            "",
        ),
        (
            r#"(?im)(?:GITHUB|github)[_-]?(?:TOKEN|token|PAT)\s*[:=]\s*["']gh[ps]_[A-Za-z0-9]{20,}["']"#,
            "",
        ),
    ])
});

static AWS_KEYS: LabelledPatterns = Lazy::new(|| {
    const MESSAGE: &str =
        "AWS credentials detected in code - this grants access to your AWS resources";
    compile_labelled(&[
        (r"(?im)AKIA[0-9A-Z]{16}", MESSAGE),
        (
            r#"(?im)(?:AWS|aws)[_-]?(?:SECRET|secret)[_-]?(?:ACCESS|access)?[_-]?(?:KEY|key)\s*[:=]\s*["'][A-Za-z0-9/+=]{40}["']"#,
            MESSAGE,
        ),
    ])
});

static PRIVATE_KEYS: LabelledPatterns = Lazy::new(|| {
    compile_labelled(&[(
        r"(?im)-----BEGIN (?:RSA |DSA |EC |OPENSSH )?PRIVATE KEY-----",
        "Private key found in code - severe security breach if committed",
    )])
});

static JWT_TOKENS: LabelledPatterns = Lazy::new(|| {
    compile_labelled(&[(
        r"(?im)eyJ[A-Za-z0-9_-]{10,}\.[A-Za-z0-9_-]{10,}\.[A-Za-z0-9_-]{10,}",
        "JWT token hardcoded in source - tokens should be generated dynamically or stored securely",
    )])
});

static JAVASCRIPT_SECRETS: LabelledPatterns = Lazy::new(|| {
    compile_labelled(&[
        (
            r#"(?i)(?:api[_-]?key|apikey)\s*[:=]\s*["'][a-zA-Z0-9_\-]{20,}["']"#,
            "Hardcoded API key",
        ),
        (
            r#"(?i)(?:password|passwd|pwd)\s*[:=]\s*["'][^"']+["']"#,
            "Hardcoded password",
        ),
        (
            r#"(?i)(?:secret|token)\s*[:=]\s*["'][a-zA-Z0-9_\-]{15,}["']"#,
            "Hardcoded secret/token",
        ),
        (r"(?i)Bearer\s+[a-zA-Z0-9_\-\.]+", "Hardcoded Bearer token"),
        (
            r"(?i)(?:aws_access_key_id|aws_secret)\s*[:=]",
            "Hardcoded AWS credentials",
        ),
        (
            r"(?i)-----BEGIN\s+(?:RSA\s+)?PRIVATE\s+KEY-----",
            "Private key in code",
        ),
    ])
});

/// Names the kind of secret after the first keyword on the matched line.
fn describe_secret(hit: &PatternHit, suggestion: &'static str) -> (String, String) {
    let key = KEY_NAME
        .captures(hit.line_text)
        .and_then(|caps| caps.get(1))
        .map_or("credential", |m| m.as_str());
    (
        format!("Hardcoded {key} detected - this will be exposed in version control"),
        suggestion.to_string(),
    )
}

pub fn is_placeholder(value: &str) -> bool {
    let value = value.to_ascii_lowercase();
    PLACEHOLDER_PREFIXES
        .iter()
        .any(|prefix| value.starts_with(prefix))
}

fn real_api_key(hit: &PatternHit) -> bool {
    hit.captures
        .get(1)
        .map_or(true, |value| !is_placeholder(value.as_str()))
}

fn api_key_kind(line: &str) -> &'static str {
    let line = line.to_ascii_lowercase();
    if line.contains("openai") || line.contains("gpt") {
        "OpenAI API key"
    } else if line.contains("github") {
        "GitHub token"
    } else {
        "API key"
    }
}

fn describe_api_key(hit: &PatternHit, _: &'static str) -> (String, String) {
    let kind = api_key_kind(hit.line_text);
    (
        format!("{kind} hardcoded in source code - immediate security risk"),
        format!(
            "Rotate the exposed {kind} immediately. Use environment variables: os.getenv('API_KEY') and add to .gitignore"
        ),
    )
}

/// Only tokens assigned on the same line count.
fn assigned_jwt(hit: &PatternHit) -> bool {
    hit.line_text.contains('=') && hit.line_text.contains("eyJ")
}

pub fn python_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(
            PatternRule::new(
                "hardcoded-secret",
                SmellType::HardcodedSecret,
                Severity::CRITICAL,
                PYTHON,
                &PYTHON_SECRETS,
                "Use environment variables: os.environ.get('SECRET_KEY') or a secrets manager",
            )
            .expensive()
            .describing(describe_secret),
        ),
        Box::new(
            PatternRule::new(
                "database-credentials",
                SmellType::DatabaseCredentials,
                Severity::CRITICAL,
                PYTHON,
                &DATABASE_URLS,
                "Use environment variables for DB credentials: DB_HOST, DB_USER, DB_PASSWORD. Store connection strings in .env files (gitignored)",
            )
            .expensive(),
        ),
        Box::new(
            PatternRule::new(
                "api-key",
                SmellType::ApiKeyExposed,
                Severity::CRITICAL,
                PYTHON,
                &API_KEYS,
                "",
            )
            .expensive()
            .accepting(real_api_key)
            .describing(describe_api_key),
        ),
        Box::new(
            PatternRule::new(
                "aws-credentials",
                SmellType::AwsCredentials,
                Severity::CRITICAL,
                PYTHON,
                &AWS_KEYS,
                "URGENT: Rotate AWS credentials in AWS Console. Use AWS IAM roles, AWS Secrets Manager, or environment variables",
            )
            .expensive(),
        ),
        Box::new(
            PatternRule::new(
                "private-key",
                SmellType::PrivateKeyExposed,
                Severity::CRITICAL,
                PYTHON,
                &PRIVATE_KEYS,
                "Remove private keys from code immediately. Store in secure key management system. Generate new keys if already committed.",
            )
            .expensive(),
        ),
        Box::new(
            PatternRule::new(
                "jwt-token",
                SmellType::JwtTokenHardcoded,
                Severity::CRITICAL,
                PYTHON,
                &JWT_TOKENS,
                "Never hardcode JWTs. Generate tokens on authentication and store in secure HTTP-only cookies or secure storage",
            )
            .expensive()
            .accepting(assigned_jwt),
        ),
    ]
}

pub fn javascript_rules() -> Vec<Box<dyn Rule>> {
    vec![Box::new(
        PatternRule::new(
            "hardcoded-secret-js",
            SmellType::HardcodedSecret,
            Severity::CRITICAL,
            JS_FAMILY,
            &JAVASCRIPT_SECRETS,
            "Use environment variables, secrets manager, or .env files (gitignored)",
        )
        .expensive(),
    )]
}
