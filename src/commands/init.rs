use crate::config::{CodesenseConfig, CONFIG_FILE_NAME};
use crate::io;
use anyhow::{Context, Result};
use std::path::Path;

/// Write the default configuration into `dir`.
pub fn init_config(dir: &Path, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!("Configuration file already exists. Use --force to overwrite.");
    }

    let contents = CodesenseConfig::default()
        .to_toml_string()
        .context("Failed to render default configuration")?;
    let header = "# codesense configuration\n\n";
    io::write_file(&config_path, &format!("{header}{contents}"))
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!("Created {CONFIG_FILE_NAME} configuration file");

    Ok(())
}
