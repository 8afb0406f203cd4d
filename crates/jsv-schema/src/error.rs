//! # Error Types
//!
//! Two tiers of failure:
//!
//! - [`LineValidationError`] — fatal setup or stream errors. The run is
//!   aborted and no counts are produced.
//! - [`RecordParseError`] / [`RecordSchemaViolation`] — per-record failures.
//!   They are recovered locally: the record is counted invalid, a diagnostic
//!   is emitted, and the stream continues.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::path::Violation;

/// Fatal error of a validation run.
#[derive(Error, Debug)]
pub enum LineValidationError {
    /// The schema could not be loaded, parsed, or compiled.
    #[error("configuration error for schema '{}': {reason}", .path.display())]
    Configuration {
        /// Path of the schema source.
        path: PathBuf,
        /// Reason the schema is unusable.
        reason: String,
    },

    /// The data source does not exist.
    #[error("data file not found: {}", .path.display())]
    ResourceNotFound {
        /// Path of the missing data file.
        path: PathBuf,
    },

    /// IO error while streaming the data source.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A line that is not valid JSON.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("JSON decode error at line {line} | {message}")]
pub struct RecordParseError {
    /// 1-indexed line number.
    pub line: usize,
    /// Message reported by the JSON parser.
    pub message: String,
}

/// One constraint violation of a parsed record.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[error(
    "Schema validation error at line {line} | Path: {} | Reason: {}",
    .violation.path,
    .violation.message
)]
pub struct RecordSchemaViolation {
    /// 1-indexed line number.
    pub line: usize,
    /// The violation itself.
    #[serde(flatten)]
    pub violation: Violation,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::{InstancePath, PathSegment};

    #[test]
    fn parse_error_display_carries_line_and_message() {
        let err = RecordParseError {
            line: 3,
            message: "expected value at line 1 column 1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "JSON decode error at line 3 | expected value at line 1 column 1"
        );
    }

    #[test]
    fn schema_violation_display_joins_path() {
        let err = RecordSchemaViolation {
            line: 7,
            violation: Violation {
                path: InstancePath::from_segments(vec![
                    PathSegment::Key("tags".to_string()),
                    PathSegment::Index(1),
                ]),
                schema_path: "/properties/tags/items/type".to_string(),
                message: r#"5 is not of type "string""#.to_string(),
                expected: None,
            },
        };
        assert_eq!(
            err.to_string(),
            r#"Schema validation error at line 7 | Path: tags -> 1 | Reason: 5 is not of type "string""#
        );
    }

    #[test]
    fn missing_data_display() {
        let err = LineValidationError::ResourceNotFound {
            path: PathBuf::from("data/jobs.jsonl"),
        };
        assert_eq!(err.to_string(), "data file not found: data/jobs.jsonl");
    }
}
