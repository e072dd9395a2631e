//! Output formatting for CLI commands.
//!
//! Supports table (human-readable) and JSON output formats.

use std::io::Write;

use alertcheck_driver::{CaseReport, SuiteReport};
use serde::Serialize;

use crate::cli::Format;
use crate::error::CliError;

/// Mismatches shown per failed case in table output.
const MISMATCH_PREVIEW: usize = 3;

/// Output formatter that handles both table and JSON output.
#[derive(Debug, Clone)]
pub struct OutputFormat {
    format: Format,
}

impl OutputFormat {
    /// Create a new output formatter.
    #[must_use]
    pub const fn new(format: Format) -> Self {
        Self { format }
    }

    /// Write a serializable value to the output.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write<W, T>(&self, writer: &mut W, value: &T) -> Result<(), CliError>
    where
        W: Write,
        T: Serialize + TableDisplay,
    {
        match self.format {
            Format::Json => {
                serde_json::to_writer_pretty(&mut *writer, value)
                    .map_err(|e| CliError::Format(format!("JSON serialization failed: {e}")))?;
                writeln!(writer)?;
            }
            Format::Table => {
                value.write_table(writer)?;
            }
        }
        Ok(())
    }

    /// Write a serializable value to a string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_string<T>(&self, value: &T) -> Result<String, CliError>
    where
        T: Serialize + TableDisplay,
    {
        let mut buf = Vec::new();
        self.write(&mut buf, value)?;
        String::from_utf8(buf).map_err(|e| CliError::Format(format!("UTF-8 error: {e}")))
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::new(Format::Table)
    }
}

/// Trait for types that can be displayed as a table.
pub trait TableDisplay {
    /// Write the value as a human-readable table.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError>;
}

/// One registered test case.
#[derive(Debug, Clone, Serialize)]
pub struct CaseSummary {
    /// Case name.
    pub name: String,
    /// What the case checks.
    pub description: String,
    /// Rule group the case loads.
    pub group: String,
    /// How long a run of the case polls, as a duration string.
    pub duration: String,
}

/// Registered test cases.
#[derive(Debug, Clone, Serialize)]
pub struct CaseList {
    /// Cases, sorted by name.
    pub cases: Vec<CaseSummary>,
}

impl TableDisplay for CaseList {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.cases.is_empty() {
            writeln!(writer, "No test cases registered")?;
            return Ok(());
        }

        let width = self
            .cases
            .iter()
            .map(|c| c.name.len())
            .max()
            .unwrap_or(0)
            .max("NAME".len());

        writeln!(writer, "{:<width$}  {:>8}  DESCRIPTION", "NAME", "DURATION")?;
        writeln!(writer, "{}", "─".repeat(width + 24))?;
        for case in &self.cases {
            writeln!(
                writer,
                "{:<width$}  {:>8}  {}",
                case.name, case.duration, case.description
            )?;
        }

        writeln!(writer)?;
        writeln!(writer, "Total: {} case(s)", self.cases.len())?;
        Ok(())
    }
}

/// Result of writing a rule file to disk.
#[derive(Debug, Clone, Serialize)]
pub struct RulesWritten {
    /// Destination path.
    pub path: String,
    /// Number of rule groups written.
    pub groups: usize,
    /// Number of alerting rules written.
    pub rules: usize,
}

impl TableDisplay for RulesWritten {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(
            writer,
            "Wrote {} rule(s) in {} group(s) to {}",
            self.rules, self.groups, self.path
        )?;
        Ok(())
    }
}

fn write_case_detail<W: Write>(writer: &mut W, case: &CaseReport) -> Result<(), CliError> {
    writeln!(writer)?;
    writeln!(writer, "{}", case.name)?;
    if let Some(fatal) = &case.fatal {
        writeln!(writer, "  Stopped: {fatal}")?;
    }
    for mismatch in case.mismatches.iter().take(MISMATCH_PREVIEW) {
        writeln!(
            writer,
            "  {} mismatch at {:.1}s ({})",
            mismatch.kind,
            mismatch.elapsed_millis as f64 / 1000.0,
            mismatch.region
        )?;
        for expected in &mismatch.expected {
            writeln!(writer, "    expected: {expected}")?;
        }
        writeln!(writer, "    actual:   {}", mismatch.actual)?;
    }
    if case.mismatches.len() > MISMATCH_PREVIEW {
        writeln!(
            writer,
            "  ... and {} more",
            case.mismatches.len() - MISMATCH_PREVIEW
        )?;
    }
    Ok(())
}

impl TableDisplay for SuiteReport {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.cases.is_empty() {
            writeln!(writer, "No test cases ran")?;
            return Ok(());
        }

        let width = self
            .cases
            .iter()
            .map(|c| c.name.len())
            .max()
            .unwrap_or(0)
            .max("NAME".len());

        writeln!(
            writer,
            "{:<width$}  {:<7}  {:>5}  {:>10}",
            "NAME", "VERDICT", "POLLS", "MISMATCHES"
        )?;
        writeln!(writer, "{}", "─".repeat(width + 28))?;
        for case in &self.cases {
            writeln!(
                writer,
                "{:<width$}  {:<7}  {:>5}  {:>10}",
                case.name,
                case.verdict(),
                case.polls,
                case.mismatches.len()
            )?;
        }

        for case in self.cases.iter().filter(|c| !c.passed()) {
            write_case_detail(writer, case)?;
        }

        writeln!(writer)?;
        writeln!(
            writer,
            "Total: {} case(s), {} failed",
            self.cases.len(),
            self.failed_count()
        )?;
        Ok(())
    }
}
