// Export modules for library usage
pub mod analyzers;
pub mod cli;
pub mod commands;
pub mod complexity;
pub mod config;
pub mod core;
pub mod debt;
pub mod io;
pub mod metrics;
pub mod observability;
pub mod pipeline;
pub mod risk;
pub mod security;

// Re-export commonly used types
pub use crate::core::{
    AnalysisSummary, CodeSmell, Error, FileMetrics, Language, RepositoryResult, Result,
    RiskScore, RiskTier, Severity, SmellCategory, SmellType,
};

pub use crate::config::{load_config, CodesenseConfig};

pub use crate::debt::{Rule, RuleCatalog, RULESET_VERSION};

pub use crate::analyzers::{analyze_file, get_analyzer, Analyzer, FileAnalysis};

pub use crate::risk::score_file;

pub use crate::pipeline::{analyze_repository, RepositoryAnalyzer};

pub use crate::io::output::{create_writer, OutputFormat, OutputWriter};
