pub mod errors;
pub mod line_index;

pub use errors::{Error, Result};
pub use line_index::LineIndex;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::Path;
use std::time::{Duration, Instant};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Copy, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
}

impl Language {
    pub fn from_extension(ext: &str) -> Option<Self> {
        static EXTENSION_MAP: &[(&[&str], Language)] = &[
            (&["py"], Language::Python),
            (&["js", "jsx"], Language::JavaScript),
            (&["ts", "tsx"], Language::TypeScript),
        ];

        let ext = ext.to_ascii_lowercase();
        EXTENSION_MAP
            .iter()
            .find(|(exts, _)| exts.contains(&ext.as_str()))
            .map(|(_, lang)| *lang)
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Serialized name, also used in the summary's language list.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
        }
    }

    /// Marker that starts a whole-line comment.
    pub fn line_comment_marker(&self) -> &'static str {
        match self {
            Language::Python => "#",
            Language::JavaScript | Language::TypeScript => "//",
        }
    }

    pub fn is_javascript_family(&self) -> bool {
        matches!(self, Language::JavaScript | Language::TypeScript)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        static DISPLAY_STRINGS: &[(Language, &str)] = &[
            (Language::Python, "Python"),
            (Language::JavaScript, "JavaScript"),
            (Language::TypeScript, "TypeScript"),
        ];

        let display_str = DISPLAY_STRINGS
            .iter()
            .find(|(l, _)| l == self)
            .map(|(_, s)| *s)
            .unwrap_or("Unknown");

        write!(f, "{display_str}")
    }
}

/// Smell severity on a 1 (cosmetic) to 5 (security critical) scale.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Copy, PartialOrd, Ord)]
#[serde(try_from = "u8", into = "u8")]
pub struct Severity(u8);

impl Severity {
    pub const INFO: Severity = Severity(1);
    pub const LOW: Severity = Severity(2);
    pub const MEDIUM: Severity = Severity(3);
    pub const HIGH: Severity = Severity(4);
    pub const CRITICAL: Severity = Severity(5);

    /// Build a severity, clamping out-of-range values into 1..=5.
    pub fn new(value: u8) -> Self {
        Severity(value.clamp(1, 5))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Severity 4 and above counts as a critical finding for scoring.
    pub fn is_critical(self) -> bool {
        self.0 >= 4
    }

    pub fn is_medium(self) -> bool {
        self.0 == 3
    }

    pub fn is_low(self) -> bool {
        self.0 <= 2
    }
}

impl TryFrom<u8> for Severity {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        if (1..=5).contains(&value) {
            Ok(Severity(value))
        } else {
            Err(format!("severity must be between 1 and 5, got {value}"))
        }
    }
}

impl From<Severity> for u8 {
    fn from(severity: Severity) -> Self {
        severity.0
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Copy)]
#[serde(rename_all = "snake_case")]
pub enum SmellCategory {
    Security,
    Reliability,
    ErrorHandling,
    Maintainability,
    Cosmetic,
}

/// Every smell the rule catalog can emit. The display string is the stable
/// `type` key consumed downstream.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Copy, PartialOrd, Ord)]
pub enum SmellType {
    SqlInjection,
    HardcodedSecret,
    DatabaseCredentials,
    ApiKeyExposed,
    AwsCredentials,
    PrivateKeyExposed,
    JwtTokenHardcoded,
    CodeInjection,
    XssVulnerability,
    NPlusOneQuery,
    BlockingCallInAsync,
    ResourceLeak,
    BlockingIo,
    InsecureHttp,
    MemoryLeak,
    IntervalLeak,
    EventListenerLeak,
    UnhandledPromiseRejection,
    SequentialAwait,
    MissingEffectDependencies,
    StateUpdateWithoutCleanup,
    BareExcept,
    SwallowedException,
    EmptyCatchBlock,
    HighComplexity,
    DeepNesting,
    TooManyParameters,
    GodClass,
    MutableDefaultArgument,
    ExcessiveGlobalState,
    CallbackHell,
    ExcessiveAnyTypes,
    LargeBundleImport,
    InlineObjectProps,
    AnonymousHandlers,
    LongFunction,
    MissingDocstring,
    DebugStatements,
    UnresolvedTodos,
    LongFile,
}

static SMELL_TABLE: &[(SmellType, &str, SmellCategory)] = &[
    (SmellType::SqlInjection, "SQL Injection Risk", SmellCategory::Security),
    (SmellType::HardcodedSecret, "Hardcoded Secret", SmellCategory::Security),
    (SmellType::DatabaseCredentials, "Database Credentials Exposed", SmellCategory::Security),
    (SmellType::ApiKeyExposed, "API Key Exposed", SmellCategory::Security),
    (SmellType::AwsCredentials, "AWS Credentials Exposed", SmellCategory::Security),
    (SmellType::PrivateKeyExposed, "Private Key Exposed", SmellCategory::Security),
    (SmellType::JwtTokenHardcoded, "JWT Token Hardcoded", SmellCategory::Security),
    (SmellType::CodeInjection, "Code Injection Risk", SmellCategory::Security),
    (SmellType::XssVulnerability, "XSS Vulnerability", SmellCategory::Security),
    (SmellType::NPlusOneQuery, "N+1 Query Problem", SmellCategory::Reliability),
    (SmellType::BlockingCallInAsync, "Blocking Call in Async", SmellCategory::Reliability),
    (SmellType::ResourceLeak, "Resource Leak Risk", SmellCategory::Reliability),
    (SmellType::BlockingIo, "Blocking I/O", SmellCategory::Reliability),
    (SmellType::InsecureHttp, "Insecure HTTP", SmellCategory::Reliability),
    (SmellType::MemoryLeak, "Memory Leak Risk", SmellCategory::Reliability),
    (SmellType::IntervalLeak, "Interval Leak", SmellCategory::Reliability),
    (SmellType::EventListenerLeak, "Event Listener Leak", SmellCategory::Reliability),
    (SmellType::UnhandledPromiseRejection, "Unhandled Promise Rejection", SmellCategory::Reliability),
    (SmellType::SequentialAwait, "Sequential Await", SmellCategory::Reliability),
    (SmellType::MissingEffectDependencies, "Missing Dependencies", SmellCategory::Reliability),
    (SmellType::StateUpdateWithoutCleanup, "State Update Without Cleanup", SmellCategory::Reliability),
    (SmellType::BareExcept, "Bare Except", SmellCategory::ErrorHandling),
    (SmellType::SwallowedException, "Swallowed Exception", SmellCategory::ErrorHandling),
    (SmellType::EmptyCatchBlock, "Empty Catch Block", SmellCategory::ErrorHandling),
    (SmellType::HighComplexity, "High Cyclomatic Complexity", SmellCategory::Maintainability),
    (SmellType::DeepNesting, "Deep Nesting", SmellCategory::Maintainability),
    (SmellType::TooManyParameters, "Too Many Parameters", SmellCategory::Maintainability),
    (SmellType::GodClass, "God Class", SmellCategory::Maintainability),
    (SmellType::MutableDefaultArgument, "Mutable Default Argument", SmellCategory::Maintainability),
    (SmellType::ExcessiveGlobalState, "Excessive Global State", SmellCategory::Maintainability),
    (SmellType::CallbackHell, "Callback Hell", SmellCategory::Maintainability),
    (SmellType::ExcessiveAnyTypes, "Excessive Any Types", SmellCategory::Maintainability),
    (SmellType::LargeBundleImport, "Large Bundle Import", SmellCategory::Maintainability),
    (SmellType::InlineObjectProps, "Inline Object Props", SmellCategory::Maintainability),
    (SmellType::AnonymousHandlers, "Anonymous Handlers", SmellCategory::Maintainability),
    (SmellType::LongFunction, "Long Function", SmellCategory::Cosmetic),
    (SmellType::MissingDocstring, "Missing Docstring", SmellCategory::Cosmetic),
    (SmellType::DebugStatements, "Debug Statements", SmellCategory::Cosmetic),
    (SmellType::UnresolvedTodos, "Unresolved TODOs", SmellCategory::Cosmetic),
    (SmellType::LongFile, "Long File", SmellCategory::Cosmetic),
];

impl SmellType {
    pub fn as_str(&self) -> &'static str {
        SMELL_TABLE
            .iter()
            .find(|(t, _, _)| t == self)
            .map(|(_, s, _)| *s)
            .unwrap_or("Unknown")
    }

    pub fn category(&self) -> SmellCategory {
        SMELL_TABLE
            .iter()
            .find(|(t, _, _)| t == self)
            .map(|(_, _, c)| *c)
            .unwrap_or(SmellCategory::Cosmetic)
    }

    /// Membership in the scorer's security set.
    pub fn is_security(&self) -> bool {
        self.category() == SmellCategory::Security
    }

    pub fn all() -> impl Iterator<Item = SmellType> {
        SMELL_TABLE.iter().map(|(t, _, _)| *t)
    }
}

impl std::str::FromStr for SmellType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        SMELL_TABLE
            .iter()
            .find(|(_, name, _)| *name == s)
            .map(|(t, _, _)| *t)
            .ok_or_else(|| Error::Validation(format!("unknown smell type '{s}'")))
    }
}

impl std::fmt::Display for SmellType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for SmellType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SmellType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Per-file structural metrics, created once per analysis run.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FileMetrics {
    pub path: String,
    pub loc: usize,
    pub sloc: usize,
    pub cyclomatic_max: u32,
    pub cyclomatic_avg: f64,
    pub fn_count: usize,
    pub class_count: usize,
    pub nesting_max: u32,
    /// Always 0.0: duplicate detection is not implemented.
    pub dup_ratio: f64,
    pub comment_ratio: f64,
    pub language: Language,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CodeSmell {
    pub path: String,
    #[serde(rename = "type")]
    pub smell_type: SmellType,
    pub severity: Severity,
    pub line: usize,
    pub message: String,
    pub suggestion: String,
}

impl CodeSmell {
    pub fn new(
        path: impl Into<String>,
        smell_type: SmellType,
        severity: Severity,
        line: usize,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            smell_type,
            severity,
            line: line.max(1),
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Copy, Ord, PartialOrd)]
pub enum RiskTier {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskTier {
    pub const CRITICAL_THRESHOLD: u32 = 70;
    pub const HIGH_THRESHOLD: u32 = 50;
    pub const MEDIUM_THRESHOLD: u32 = 30;

    pub fn from_score(score: u32) -> Self {
        if score >= Self::CRITICAL_THRESHOLD {
            RiskTier::Critical
        } else if score >= Self::HIGH_THRESHOLD {
            RiskTier::High
        } else if score >= Self::MEDIUM_THRESHOLD {
            RiskTier::Medium
        } else {
            RiskTier::Low
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        static DISPLAY_STRINGS: &[(RiskTier, &str)] = &[
            (RiskTier::Low, "Low"),
            (RiskTier::Medium, "Medium"),
            (RiskTier::High, "High"),
            (RiskTier::Critical, "Critical"),
        ];

        let display_str = DISPLAY_STRINGS
            .iter()
            .find(|(t, _)| t == self)
            .map(|(_, s)| *s)
            .unwrap_or("Unknown");

        write!(f, "{display_str}")
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RiskScore {
    pub path: String,
    pub risk_score: u32,
    pub tier: RiskTier,
    pub top_features: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AnalysisSummary {
    pub total_files: usize,
    pub total_loc: usize,
    pub total_smells: usize,
    pub languages: Vec<Language>,
    /// Files and walk entries excluded because they could not be read, or
    /// files that ran out of time.
    pub failed_files: usize,
    /// Files that failed to parse and were analyzed with degraded metrics.
    pub degraded_files: usize,
    pub rule_failures: usize,
    pub security_scans_skipped: usize,
    pub ruleset_version: String,
}

/// Aggregate output of one repository analysis.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct RepositoryResult {
    pub metrics: Vec<FileMetrics>,
    pub smells: Vec<CodeSmell>,
    pub risks: Vec<RiskScore>,
    pub summary: AnalysisSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RepositoryResult {
    /// Empty result carrying a fatal acquisition error.
    pub fn failed(error: impl Into<String>, ruleset_version: &str) -> Self {
        Self {
            summary: AnalysisSummary {
                ruleset_version: ruleset_version.to_string(),
                ..AnalysisSummary::default()
            },
            error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Wall-clock budget for analyzing one file.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    budget: Duration,
}

impl Deadline {
    pub fn start(budget: Duration) -> Self {
        Self {
            started: Instant::now(),
            budget,
        }
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    pub fn remaining(&self) -> Duration {
        self.budget.saturating_sub(self.started.elapsed())
    }

    pub fn expired(&self) -> bool {
        self.started.elapsed() >= self.budget
    }

    /// Fail with a timeout error for `path` once the budget is spent.
    pub fn check(&self, path: &str) -> Result<()> {
        if self.expired() {
            Err(Error::timeout(path, self.budget))
        } else {
            Ok(())
        }
    }
}

/// Normalize a repo-relative path to forward slashes.
pub fn normalize_relative_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
