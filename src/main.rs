use anyhow::Result;
use codesense::cli::{Cli, Commands};
use codesense::commands::{handle_analyze, init_config, AnalyzeConfig};
use codesense::observability::init_tracing;
use clap::Parser;
use std::path::Path;
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            path,
            format,
            output,
            config,
            jobs,
            no_parallel,
            security_scan_max_lines,
            timeout_ms,
            ignore_dirs,
            top,
            verbosity,
        } => {
            init_tracing(verbosity);
            let result = handle_analyze(AnalyzeConfig {
                path,
                format,
                output,
                config,
                jobs,
                no_parallel,
                security_scan_max_lines,
                timeout_ms,
                ignore_dirs,
                top,
            })?;
            Ok(if result.is_failed() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }
        Commands::Init { force } => {
            init_tracing(0);
            init_config(Path::new("."), force)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
