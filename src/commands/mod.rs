//! CLI command implementations.
//!
//! - **analyze**: analyze a source tree and write the aggregate result
//! - **init**: write a default `.codesense.toml`

pub mod analyze;
pub mod init;

pub use analyze::{handle_analyze, AnalyzeConfig};
pub use init::init_config;
