//! # jsv-schema — JSON-Lines Schema Validation
//!
//! Validates JSON-Lines data against a JSON Schema document and reports
//! line-level errors.
//!
//! ## Line Validation (`validate`)
//!
//! [`LineValidator`] compiles a schema once and streams a data source line
//! by line. Each non-blank line is parsed on its own and checked against the
//! schema, collecting every violation sorted by instance path. Key entry
//! points:
//!
//! - [`validate_schema`] — `(valid, invalid)` counts for a schema file and a
//!   data file, diagnostics logged through `tracing`.
//! - [`LineValidator::validate_reader`] — the streaming loop over any
//!   `BufRead`, reporting through an explicit [`DiagnosticSink`].
//!
//! ## Error Tiers
//!
//! - Setup failures (missing or malformed schema, missing data file) are
//!   fatal: [`LineValidationError`].
//! - Per-record failures are recovered: [`RecordParseError`] for lines that
//!   are not JSON, [`RecordSchemaViolation`] for each constraint violated.
//!   A record is counted invalid once, however many violations it carries.
//!
//! ## Crate Policy
//!
//! - No process-global logging setup. Callers pass a sink per run; only
//!   binaries install a `tracing` subscriber.
//! - Schema `$ref`s resolve from local files only, never the network.

pub mod config;
pub mod error;
pub mod path;
pub mod report;
pub mod schema;
pub mod validate;

pub use config::{ConfigError, ValidatorOptions};
pub use error::{LineValidationError, RecordParseError, RecordSchemaViolation};
pub use path::{InstancePath, PathSegment, Violation};
pub use report::{CollectingSink, Diagnostic, DiagnosticSink, RunSummary, TracingSink};
pub use schema::SchemaDocument;
pub use validate::{
    check_sources, validate_schema, validate_schema_with, LineValidator, ValidationOutcome,
};

/// Re-exported so callers can select a draft without depending on
/// `jsonschema` directly.
pub use jsonschema::Draft;
