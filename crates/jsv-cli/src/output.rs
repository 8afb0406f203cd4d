//! # Report Output
//!
//! Renders diagnostics and summaries to a writer, as plain text in the
//! traditional `... at line N | Path: P | Reason: R` shape or as one JSON
//! object per line.

use std::io::{self, Write};

use clap::ValueEnum;
use serde_json::{json, Value};

use jsv_schema::{Diagnostic, DiagnosticSink, RunSummary};

/// Output format of the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Sink writing a report for one data source at a time.
///
/// Write errors do not interrupt validation; the first one is kept and
/// returned by [`ReportSink::finish`].
pub struct ReportSink<W: Write> {
    out: W,
    format: OutputFormat,
    source: String,
    error: Option<io::Error>,
}

impl<W: Write> ReportSink<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self {
            out,
            format,
            source: String::new(),
            error: None,
        }
    }

    /// Label subsequent diagnostics and summaries with `source`.
    pub fn set_source(&mut self, source: impl Into<String>) {
        self.source = source.into();
    }

    /// Write the grand total across several data sources.
    pub fn total(&mut self, files: usize, total: &RunSummary) {
        let result = match self.format {
            OutputFormat::Text => writeln!(
                self.out,
                "========== TOTAL ({files} files) ==========\n\
                 Valid records   : {}\n\
                 Invalid records : {}",
                total.valid, total.invalid
            ),
            OutputFormat::Json => self.write_json(json!({
                "kind": "total",
                "files": files,
                "valid": total.valid,
                "invalid": total.invalid,
            })),
        };
        self.record(result);
    }

    /// Flush the writer and surface the first write error, if any.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.out.flush()?;
        Ok(self.out)
    }

    fn record(&mut self, result: io::Result<()>) {
        if let Err(e) = result {
            self.error.get_or_insert(e);
        }
    }

    fn write_json(&mut self, value: Value) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, &value)?;
        writeln!(self.out)
    }

    fn write_text_diagnostic(&mut self, diagnostic: &Diagnostic) -> io::Result<()> {
        writeln!(self.out, "{diagnostic}")?;
        if let Diagnostic::Violation(v) = diagnostic {
            if let Some(expected) = &v.violation.expected {
                writeln!(self.out, "    Expected : {expected}")?;
            }
        }
        Ok(())
    }

    fn write_json_diagnostic(&mut self, diagnostic: &Diagnostic) -> io::Result<()> {
        let mut value = serde_json::to_value(diagnostic)?;
        if let Value::Object(map) = &mut value {
            map.insert("source".to_string(), Value::String(self.source.clone()));
        }
        self.write_json(value)
    }
}

impl<W: Write> DiagnosticSink for ReportSink<W> {
    fn diagnostic(&mut self, diagnostic: &Diagnostic) {
        let result = match self.format {
            OutputFormat::Text => self.write_text_diagnostic(diagnostic),
            OutputFormat::Json => self.write_json_diagnostic(diagnostic),
        };
        self.record(result);
    }

    fn summary(&mut self, summary: &RunSummary) {
        let result = match self.format {
            OutputFormat::Text => writeln!(
                self.out,
                "========== VALIDATION SUMMARY ==========\n\
                 Data            : {}\n\
                 Valid records   : {}\n\
                 Invalid records : {}",
                self.source, summary.valid, summary.invalid
            ),
            OutputFormat::Json => {
                let value = json!({
                    "kind": "summary",
                    "source": self.source,
                    "valid": summary.valid,
                    "invalid": summary.invalid,
                });
                self.write_json(value)
            }
        };
        self.record(result);
    }
}
