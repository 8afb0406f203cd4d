//! # Line Validation
//!
//! Streams a JSON-Lines source through a compiled schema.
//!
//! Every non-blank line is parsed on its own. A line that is not JSON is
//! counted invalid and reported with the parser's message; a parsed record
//! is checked against the schema collecting *all* violations, sorted by
//! instance path, and counted invalid once however many it carries. Blank
//! lines count toward neither tally, so `valid + invalid` always equals the
//! number of non-blank lines read.

use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::Path;

use jsonschema::Validator;
use serde_json::Value;

use crate::config::ValidatorOptions;
use crate::error::{LineValidationError, RecordParseError, RecordSchemaViolation};
use crate::path::{InstancePath, Violation};
use crate::report::{Diagnostic, DiagnosticSink, RunSummary, TracingSink};
use crate::schema::SchemaDocument;

/// Result of checking one parsed record.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    Valid,
    /// Violations sorted by instance path; never empty.
    Invalid(Vec<Violation>),
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid)
    }

    pub fn violations(&self) -> &[Violation] {
        match self {
            ValidationOutcome::Valid => &[],
            ValidationOutcome::Invalid(violations) => violations,
        }
    }
}

/// A schema compiled once and reused for every record of a run.
pub struct LineValidator {
    schema: SchemaDocument,
    validator: Validator,
    options: ValidatorOptions,
}

impl std::fmt::Debug for LineValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineValidator")
            .field("schema", &self.schema.source())
            .field("options", &self.options)
            .finish()
    }
}

impl LineValidator {
    /// Compile an already loaded schema document.
    ///
    /// # Errors
    ///
    /// Returns `LineValidationError::Configuration` if the document is not a
    /// valid JSON Schema.
    pub fn new(
        schema: SchemaDocument,
        options: &ValidatorOptions,
    ) -> Result<Self, LineValidationError> {
        let validator = schema.compile(options)?;
        tracing::debug!(
            schema = %schema.source().display(),
            draft = ?options.draft,
            "compiled schema"
        );
        Ok(Self {
            schema,
            validator,
            options: *options,
        })
    }

    /// Load a schema file and compile it.
    ///
    /// # Errors
    ///
    /// Returns `LineValidationError::Configuration` if the schema is missing,
    /// unreadable, unparseable, or not a valid JSON Schema.
    pub fn from_schema_file(
        path: impl AsRef<Path>,
        options: &ValidatorOptions,
    ) -> Result<Self, LineValidationError> {
        Self::new(SchemaDocument::load(path)?, options)
    }

    /// Compile an in-memory schema value.
    pub fn from_schema_value(
        value: Value,
        options: &ValidatorOptions,
    ) -> Result<Self, LineValidationError> {
        Self::new(SchemaDocument::from_value(value), options)
    }

    pub fn schema(&self) -> &SchemaDocument {
        &self.schema
    }

    pub fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    /// Check one record, collecting every violation.
    ///
    /// Violations are sorted by instance path. The sort is stable, so
    /// violations at the same path keep the engine's order.
    pub fn validate_record(&self, record: &Value) -> ValidationOutcome {
        let mut violations: Vec<Violation> = self
            .validator
            .iter_errors(record)
            .map(|e| {
                let schema_path = e.schema_path.to_string();
                let expected = if self.options.include_expected {
                    self.schema.subschema_for(&schema_path).cloned()
                } else {
                    None
                };
                Violation {
                    path: InstancePath::from_pointer(&e.instance_path.to_string(), record),
                    schema_path,
                    message: e.to_string(),
                    expected,
                }
            })
            .collect();

        if violations.is_empty() {
            return ValidationOutcome::Valid;
        }
        violations.sort_by(|a, b| a.path.cmp(&b.path));
        ValidationOutcome::Invalid(violations)
    }

    /// Validate every line of `reader`, reporting through `sink`.
    ///
    /// A line that is not valid UTF-8 is reported like a JSON decode error.
    ///
    /// # Errors
    ///
    /// Returns `LineValidationError::Io` if reading the stream fails. The
    /// summary is not emitted in that case.
    pub fn validate_reader<R: BufRead>(
        &self,
        mut reader: R,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<RunSummary, LineValidationError> {
        let mut summary = RunSummary::default();
        let mut buf = Vec::new();
        let mut line_number = 0usize;

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            line_number += 1;

            let line = match std::str::from_utf8(&buf) {
                Ok(line) => line,
                Err(e) => {
                    summary.invalid += 1;
                    sink.diagnostic(&Diagnostic::Parse(RecordParseError {
                        line: line_number,
                        message: format!("invalid UTF-8: {e}"),
                    }));
                    continue;
                }
            };

            if line.trim().is_empty() {
                continue;
            }

            let record: Value = match serde_json::from_str(line) {
                Ok(record) => record,
                Err(e) => {
                    summary.invalid += 1;
                    sink.diagnostic(&Diagnostic::Parse(RecordParseError {
                        line: line_number,
                        message: e.to_string(),
                    }));
                    continue;
                }
            };

            match self.validate_record(&record) {
                ValidationOutcome::Valid => summary.valid += 1,
                ValidationOutcome::Invalid(violations) => {
                    summary.invalid += 1;
                    for violation in violations {
                        sink.diagnostic(&Diagnostic::Violation(RecordSchemaViolation {
                            line: line_number,
                            violation,
                        }));
                    }
                }
            }
        }

        tracing::debug!(
            lines = line_number,
            valid = summary.valid,
            invalid = summary.invalid,
            "data stream exhausted"
        );
        sink.summary(&summary);
        Ok(summary)
    }

    /// Validate a JSON-Lines file.
    ///
    /// # Errors
    ///
    /// Returns `LineValidationError::ResourceNotFound` if the file does not
    /// exist, before any line is read.
    pub fn validate_file(
        &self,
        path: impl AsRef<Path>,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<RunSummary, LineValidationError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => LineValidationError::ResourceNotFound {
                path: path.to_path_buf(),
            },
            _ => LineValidationError::Io(e),
        })?;
        if file.metadata()?.is_dir() {
            return Err(LineValidationError::ResourceNotFound {
                path: path.to_path_buf(),
            });
        }
        tracing::debug!(data = %path.display(), "validating data file");
        self.validate_reader(BufReader::new(file), sink)
    }
}

/// Validate a JSON-Lines file against a schema file with default options,
/// logging diagnostics through `tracing`.
///
/// Returns `(valid_count, invalid_count)`.
///
/// # Errors
///
/// - `LineValidationError::Configuration` — schema missing or malformed.
/// - `LineValidationError::ResourceNotFound` — data file missing.
pub fn validate_schema(
    schema_path: impl AsRef<Path>,
    data_path: impl AsRef<Path>,
) -> Result<(usize, usize), LineValidationError> {
    let data_path = data_path.as_ref();
    let mut sink = TracingSink::for_source(data_path.display().to_string());
    let summary = validate_schema_with(
        schema_path,
        data_path,
        &ValidatorOptions::default(),
        &mut sink,
    )?;
    Ok(summary.as_pair())
}

/// Check that the schema and every data path name existing files.
///
/// The schema is checked first, then the data paths in order; nothing is
/// opened or compiled. Callers run this before any output is produced.
///
/// # Errors
///
/// - `LineValidationError::Configuration` — the schema file is missing.
/// - `LineValidationError::ResourceNotFound` — the first missing data file.
pub fn check_sources<P: AsRef<Path>>(
    schema_path: impl AsRef<Path>,
    data_paths: &[P],
) -> Result<(), LineValidationError> {
    let schema_path = schema_path.as_ref();
    if !schema_path.is_file() {
        return Err(LineValidationError::Configuration {
            path: schema_path.to_path_buf(),
            reason: "schema file not found".to_string(),
        });
    }
    for data_path in data_paths {
        let data_path = data_path.as_ref();
        if !data_path.is_file() {
            return Err(LineValidationError::ResourceNotFound {
                path: data_path.to_path_buf(),
            });
        }
    }
    Ok(())
}

/// Validate a JSON-Lines file against a schema file with explicit options
/// and sink.
///
/// Both paths go through [`check_sources`] before the schema is compiled, so
/// a missing data file is reported even when the schema is also malformed.
pub fn validate_schema_with(
    schema_path: impl AsRef<Path>,
    data_path: impl AsRef<Path>,
    options: &ValidatorOptions,
    sink: &mut dyn DiagnosticSink,
) -> Result<RunSummary, LineValidationError> {
    let schema_path = schema_path.as_ref();
    let data_path = data_path.as_ref();
    check_sources(schema_path, &[data_path])?;

    let validator = LineValidator::from_schema_file(schema_path, options)?;
    validator.validate_file(data_path, sink)
}
