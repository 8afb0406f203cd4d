//! # Diagnostics and Sinks
//!
//! A validation run reports through an explicit [`DiagnosticSink`] handed to
//! it by the caller. Two sinks ship with the crate:
//!
//! - [`TracingSink`] — structured `tracing` events (`error` per diagnostic,
//!   `info` for the summary).
//! - [`CollectingSink`] — keeps everything in memory for programmatic use.

use serde::Serialize;

use crate::error::{RecordParseError, RecordSchemaViolation};

/// One per-record problem found during a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// The line is not valid JSON.
    Parse(RecordParseError),
    /// The record violates one schema constraint.
    Violation(RecordSchemaViolation),
}

impl Diagnostic {
    /// 1-indexed line the diagnostic refers to.
    pub fn line(&self) -> usize {
        match self {
            Diagnostic::Parse(e) => e.line,
            Diagnostic::Violation(v) => v.line,
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::Parse(e) => write!(f, "{e}"),
            Diagnostic::Violation(v) => write!(f, "{v}"),
        }
    }
}

/// Valid and invalid record counts of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Records that parsed and satisfied the schema.
    pub valid: usize,
    /// Records that failed to parse or violated the schema.
    pub invalid: usize,
}

impl RunSummary {
    /// Number of non-blank lines processed.
    pub fn total(&self) -> usize {
        self.valid + self.invalid
    }

    pub fn is_clean(&self) -> bool {
        self.invalid == 0
    }

    pub fn as_pair(&self) -> (usize, usize) {
        (self.valid, self.invalid)
    }
}

impl std::ops::AddAssign for RunSummary {
    fn add_assign(&mut self, rhs: Self) {
        self.valid += rhs.valid;
        self.invalid += rhs.invalid;
    }
}

/// Receiver of diagnostics and the final summary of a run.
pub trait DiagnosticSink {
    /// Called once per parse failure and once per schema violation, in
    /// line order and, within a record, in path order.
    fn diagnostic(&mut self, diagnostic: &Diagnostic);

    /// Called once after the data source is exhausted.
    fn summary(&mut self, summary: &RunSummary);
}

/// Sink that emits `tracing` events.
#[derive(Debug, Clone, Default)]
pub struct TracingSink {
    source: Option<String>,
}

impl TracingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a data source label to every event.
    pub fn for_source(source: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
        }
    }
}

impl DiagnosticSink for TracingSink {
    fn diagnostic(&mut self, diagnostic: &Diagnostic) {
        let source = self.source.as_deref().unwrap_or("-");
        match diagnostic {
            Diagnostic::Parse(e) => {
                tracing::error!(
                    source,
                    line = e.line,
                    reason = %e.message,
                    "JSON decode error at line {} | {}",
                    e.line,
                    e.message
                );
            }
            Diagnostic::Violation(v) => {
                tracing::error!(
                    source,
                    line = v.line,
                    path = %v.violation.path,
                    reason = %v.violation.message,
                    "Schema validation error at line {} | Path: {} | Reason: {}",
                    v.line,
                    v.violation.path,
                    v.violation.message
                );
            }
        }
    }

    fn summary(&mut self, summary: &RunSummary) {
        let source = self.source.as_deref().unwrap_or("-");
        tracing::info!(source, "========== VALIDATION SUMMARY ==========");
        tracing::info!(source, valid = summary.valid, "Valid records   : {}", summary.valid);
        tracing::info!(
            source,
            invalid = summary.invalid,
            "Invalid records : {}",
            summary.invalid
        );
    }
}

/// Sink that records diagnostics and the summary in memory.
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    diagnostics: Vec<Diagnostic>,
    summary: Option<RunSummary>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Diagnostics reported for one line.
    pub fn for_line(&self, line: usize) -> Vec<&Diagnostic> {
        self.diagnostics.iter().filter(|d| d.line() == line).collect()
    }

    /// The summary, once the run has finished.
    pub fn summary_seen(&self) -> Option<RunSummary> {
        self.summary
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl DiagnosticSink for CollectingSink {
    fn diagnostic(&mut self, diagnostic: &Diagnostic) {
        self.diagnostics.push(diagnostic.clone());
    }

    fn summary(&mut self, summary: &RunSummary) {
        self.summary = Some(*summary);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::{InstancePath, Violation};
    use serde_json::json;

    fn violation(line: usize) -> Diagnostic {
        Diagnostic::Violation(RecordSchemaViolation {
            line,
            violation: Violation {
                path: InstancePath::root(),
                schema_path: "/required".to_string(),
                message: r#""name" is a required property"#.to_string(),
                expected: None,
            },
        })
    }

    #[test]
    fn collecting_sink_keeps_order_and_summary() {
        let mut sink = CollectingSink::new();
        sink.diagnostic(&violation(2));
        sink.diagnostic(&Diagnostic::Parse(RecordParseError {
            line: 4,
            message: "EOF while parsing".to_string(),
        }));
        assert!(sink.summary_seen().is_none());
        sink.summary(&RunSummary { valid: 1, invalid: 2 });

        assert_eq!(sink.diagnostics().len(), 2);
        assert_eq!(sink.for_line(4).len(), 1);
        assert_eq!(sink.summary_seen(), Some(RunSummary { valid: 1, invalid: 2 }));
    }

    #[test]
    fn diagnostic_serializes_with_kind_tag() {
        let value = serde_json::to_value(violation(3)).unwrap();
        assert_eq!(
            value,
            json!({
                "kind": "violation",
                "line": 3,
                "path": [],
                "schema_path": "/required",
                "message": "\"name\" is a required property"
            })
        );
    }

    #[test]
    fn root_violation_display_uses_marker() {
        assert_eq!(
            violation(9).to_string(),
            r#"Schema validation error at line 9 | Path: ROOT | Reason: "name" is a required property"#
        );
    }

    #[test]
    fn summaries_add_up() {
        let mut total = RunSummary::default();
        total += RunSummary { valid: 2, invalid: 1 };
        total += RunSummary { valid: 0, invalid: 3 };
        assert_eq!(total.as_pair(), (2, 4));
        assert_eq!(total.total(), 6);
        assert!(!total.is_clean());
    }
}
