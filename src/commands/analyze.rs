use crate::config::{load_config, CodesenseConfig};
use crate::core::RepositoryResult;
use crate::io::output::create_writer;
use crate::pipeline::analyze_repository;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

pub struct AnalyzeConfig {
    pub path: PathBuf,
    pub format: crate::cli::OutputFormat,
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub jobs: Option<usize>,
    pub no_parallel: bool,
    pub security_scan_max_lines: Option<usize>,
    pub timeout_ms: Option<u64>,
    pub ignore_dirs: Vec<String>,
    pub top: usize,
}

/// Run an analysis and write the result. Returns the result so the caller
/// can pick an exit code.
pub fn handle_analyze(config: AnalyzeConfig) -> Result<RepositoryResult> {
    let settings = resolve_settings(&config)?;
    let result = analyze_repository(&config.path, &settings);
    write_result(&config, &result)?;
    Ok(result)
}

/// File configuration with command-line overrides applied on top.
pub fn resolve_settings(config: &AnalyzeConfig) -> Result<CodesenseConfig> {
    let mut settings = load_config(config.config.as_deref(), &config.path)
        .context("Failed to load configuration")?;

    if let Some(jobs) = config.jobs {
        settings.parallel.max_concurrency = (jobs > 0).then_some(jobs);
    }
    if config.no_parallel {
        settings.parallel.enabled = false;
    }
    if let Some(max_lines) = config.security_scan_max_lines {
        settings.analysis.security_scan_max_lines = max_lines;
    }
    if let Some(timeout_ms) = config.timeout_ms {
        settings.analysis.file_timeout_ms = timeout_ms;
    }
    for dir in &config.ignore_dirs {
        if !settings.ignore.directories.contains(dir) {
            settings.ignore.directories.push(dir.clone());
        }
    }

    settings.validate().context("Invalid configuration")?;
    Ok(settings)
}

fn write_result(config: &AnalyzeConfig, result: &RepositoryResult) -> Result<()> {
    let format = config.format.into();
    match &config.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut buffered = BufWriter::new(file);
            create_writer(format, &mut buffered, config.top).write_results(result)?;
            buffered.flush()?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            create_writer(format, &mut lock, config.top).write_results(result)?;
            lock.flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use tempfile::TempDir;

    fn analyze_config(path: PathBuf) -> AnalyzeConfig {
        AnalyzeConfig {
            path,
            format: OutputFormat::Json,
            output: None,
            config: None,
            jobs: None,
            no_parallel: false,
            security_scan_max_lines: None,
            timeout_ms: None,
            ignore_dirs: Vec::new(),
            top: 10,
        }
    }

    #[test]
    fn test_overrides_apply_on_top_of_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(".codesense.toml"),
            "[analysis]\nsecurity_scan_max_lines = 42\n",
        )
        .unwrap();

        let mut config = analyze_config(dir.path().to_path_buf());
        config.jobs = Some(2);
        config.timeout_ms = Some(0);
        config.ignore_dirs = vec!["vendor".to_string()];

        let settings = resolve_settings(&config).unwrap();
        assert_eq!(settings.analysis.security_scan_max_lines, 42);
        assert_eq!(settings.analysis.file_timeout(), None);
        assert_eq!(settings.parallel.max_concurrency, Some(2));
        assert!(settings.ignore.directories.contains(&"vendor".to_string()));

        config.security_scan_max_lines = Some(7);
        config.no_parallel = true;
        let settings = resolve_settings(&config).unwrap();
        assert_eq!(settings.analysis.security_scan_max_lines, 7);
        assert_eq!(settings.parallel.effective_concurrency(), 1);
    }

    #[test]
    fn test_output_file_receives_json() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("app.py"), "x = 1\n").unwrap();
        let out = dir.path().join("result.json");

        let mut config = analyze_config(dir.path().to_path_buf());
        config.output = Some(out.clone());
        let result = handle_analyze(config).unwrap();

        assert_eq!(result.summary.total_files, 1);
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(out).unwrap()).unwrap();
        assert_eq!(written["metrics"][0]["path"], "app.py");
    }
}
