use crate::core::{RepositoryResult, Result, RiskTier};
use colored::*;
use std::collections::BTreeMap;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Terminal,
}

pub trait OutputWriter {
    fn write_results(&mut self, results: &RepositoryResult) -> Result<()>;
}

pub fn create_writer<'w, W: Write + 'w>(
    format: OutputFormat,
    writer: W,
    top: usize,
) -> Box<dyn OutputWriter + 'w> {
    match format {
        OutputFormat::Json => Box::new(JsonWriter::new(writer)),
        OutputFormat::Terminal => Box::new(TerminalWriter::new(writer).with_top(top)),
    }
}

/// Pretty-printed aggregate, the stable downstream contract.
pub struct JsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutputWriter for JsonWriter<W> {
    fn write_results(&mut self, results: &RepositoryResult) -> Result<()> {
        let json = serde_json::to_string_pretty(results)?;
        self.writer.write_all(json.as_bytes())?;
        writeln!(self.writer)?;
        Ok(())
    }
}

pub struct TerminalWriter<W: Write> {
    writer: W,
    top: usize,
}

impl<W: Write> TerminalWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, top: 10 }
    }

    pub fn with_top(mut self, top: usize) -> Self {
        self.top = top;
        self
    }

    fn write_header(&mut self) -> Result<()> {
        writeln!(self.writer)?;
        writeln!(self.writer, "{}", "═══════════════════════════════════════════".cyan())?;
        writeln!(self.writer, "{}", "           CODESENSE ANALYSIS".bold().cyan())?;
        writeln!(self.writer, "{}", "═══════════════════════════════════════════".cyan())?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_summary(&mut self, results: &RepositoryResult) -> Result<()> {
        let summary = &results.summary;
        let languages: Vec<&str> = summary.languages.iter().map(|l| l.as_str()).collect();

        writeln!(self.writer, "{}", "Summary".bold())?;
        writeln!(self.writer, "───────────────────────────────────────────")?;
        writeln!(self.writer, "  Files analyzed:  {}", summary.total_files)?;
        writeln!(self.writer, "  Lines of code:   {}", summary.total_loc)?;
        writeln!(self.writer, "  Smells found:    {}", summary.total_smells)?;
        writeln!(self.writer, "  Languages:       {}", languages.join(", "))?;
        writeln!(self.writer, "  Rule set:        v{}", summary.ruleset_version)?;

        if summary.failed_files > 0 {
            let line = format!("  Failed files:    {}", summary.failed_files);
            writeln!(self.writer, "{}", line.yellow())?;
        }
        if summary.degraded_files > 0 {
            let line = format!("  Degraded files:  {}", summary.degraded_files);
            writeln!(self.writer, "{}", line.yellow())?;
        }
        if summary.rule_failures > 0 {
            let line = format!("  Rule failures:   {}", summary.rule_failures);
            writeln!(self.writer, "{}", line.yellow())?;
        }
        if summary.security_scans_skipped > 0 {
            let line = format!(
                "  Security scans skipped (large files): {}",
                summary.security_scans_skipped
            );
            writeln!(self.writer, "{}", line.yellow())?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_top_risks(&mut self, results: &RepositoryResult) -> Result<()> {
        if results.risks.is_empty() {
            return Ok(());
        }
        writeln!(self.writer, "{}", format!("Top {} risks", self.top).bold())?;
        writeln!(self.writer, "───────────────────────────────────────────")?;
        for (rank, risk) in results.risks.iter().take(self.top).enumerate() {
            let features = if risk.top_features.is_empty() {
                String::new()
            } else {
                format!(" [{}]", risk.top_features.join(", "))
            };
            writeln!(
                self.writer,
                "  {:>2}. {:>3} {:<8} {}{}",
                rank + 1,
                risk.risk_score,
                colorize_tier(risk.tier),
                risk.path,
                features.dimmed()
            )?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_smell_counts(&mut self, results: &RepositoryResult) -> Result<()> {
        if results.smells.is_empty() {
            writeln!(self.writer, "{}", "No code smells found.".green())?;
            return Ok(());
        }
        let mut per_file: BTreeMap<&str, usize> = BTreeMap::new();
        for smell in &results.smells {
            *per_file.entry(smell.path.as_str()).or_default() += 1;
        }

        writeln!(self.writer, "{}", "Smells per file".bold())?;
        writeln!(self.writer, "───────────────────────────────────────────")?;
        for (path, count) in per_file {
            writeln!(self.writer, "  {count:>4}  {path}")?;
        }
        Ok(())
    }
}

impl<W: Write> OutputWriter for TerminalWriter<W> {
    fn write_results(&mut self, results: &RepositoryResult) -> Result<()> {
        if let Some(error) = &results.error {
            writeln!(self.writer, "{} {}", "error:".red().bold(), error)?;
            return Ok(());
        }
        self.write_header()?;
        self.write_summary(results)?;
        self.write_top_risks(results)?;
        self.write_smell_counts(results)?;
        Ok(())
    }
}

fn colorize_tier(tier: RiskTier) -> ColoredString {
    let label = tier.to_string();
    match tier {
        RiskTier::Critical => label.red().bold(),
        RiskTier::High => label.red(),
        RiskTier::Medium => label.yellow(),
        RiskTier::Low => label.green(),
    }
}
