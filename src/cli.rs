use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "codesense")]
#[command(about = "Code smell detector and file risk scorer for Python and JavaScript/TypeScript", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a source tree and report metrics, smells and risk scores
    Analyze {
        /// Repository root to analyze
        path: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Configuration file (defaults to a discovered .codesense.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of worker threads (0 = all cores)
        #[arg(short = 'j', long = "jobs", env = "CODESENSE_JOBS")]
        jobs: Option<usize>,

        /// Analyze files one at a time
        #[arg(long = "no-parallel")]
        no_parallel: bool,

        /// Skip expensive security scans on files longer than this
        #[arg(long = "security-scan-max-lines")]
        security_scan_max_lines: Option<usize>,

        /// Per-file time budget in milliseconds (0 disables it)
        #[arg(long = "timeout-ms")]
        timeout_ms: Option<u64>,

        /// Additional directory name to skip (repeatable)
        #[arg(long = "ignore-dir")]
        ignore_dirs: Vec<String>,

        /// Risks listed by the terminal format
        #[arg(long = "top", default_value = "10")]
        top: usize,

        /// Increase log verbosity (-v, -vv, -vvv)
        #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
        verbosity: u8,
    },

    /// Write the default configuration to .codesense.toml
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum OutputFormat {
    Json,
    Terminal,
}

impl From<OutputFormat> for crate::io::output::OutputFormat {
    fn from(f: OutputFormat) -> Self {
        match f {
            OutputFormat::Json => crate::io::output::OutputFormat::Json,
            OutputFormat::Terminal => crate::io::output::OutputFormat::Terminal,
        }
    }
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_conversion() {
        assert_eq!(
            crate::io::output::OutputFormat::from(OutputFormat::Json),
            crate::io::output::OutputFormat::Json
        );
        assert_eq!(
            crate::io::output::OutputFormat::from(OutputFormat::Terminal),
            crate::io::output::OutputFormat::Terminal
        );
    }

    #[test]
    fn test_analyze_flags() {
        let cli = Cli::try_parse_from([
            "codesense",
            "analyze",
            "repo",
            "--format",
            "terminal",
            "--no-parallel",
            "--ignore-dir",
            "vendor",
            "--ignore-dir",
            "third_party",
            "--security-scan-max-lines",
            "100",
            "-vv",
        ])
        .unwrap();

        let Commands::Analyze {
            path,
            format,
            no_parallel,
            ignore_dirs,
            security_scan_max_lines,
            verbosity,
            top,
            ..
        } = cli.command
        else {
            panic!("expected analyze");
        };
        assert_eq!(path, PathBuf::from("repo"));
        assert_eq!(format, OutputFormat::Terminal);
        assert!(no_parallel);
        assert_eq!(ignore_dirs, vec!["vendor", "third_party"]);
        assert_eq!(security_scan_max_lines, Some(100));
        assert_eq!(verbosity, 2);
        assert_eq!(top, 10);
    }

    #[test]
    fn test_init_force() {
        let cli = Cli::try_parse_from(["codesense", "init", "--force"]).unwrap();
        assert!(matches!(cli.command, Commands::Init { force: true }));
    }
}
