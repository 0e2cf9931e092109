pub mod output;
pub mod walker;

pub use output::{create_writer, JsonWriter, OutputFormat, OutputWriter, TerminalWriter};
pub use walker::{Discovery, FileWalker, SourceFile};

use crate::core::{Error, Result};
use std::path::Path;

/// Read a file as text, replacing invalid UTF-8 sequences.
pub fn read_lossy(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| Error::io_at(e, path))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn write_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).map_err(|e| Error::io_at(e, path))
}
