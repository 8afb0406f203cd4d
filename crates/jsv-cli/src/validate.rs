//! # Validate Subcommand
//!
//! Validates one or more JSON-Lines files against a single schema.
//!
//! The schema path and then every data path are checked before anything is
//! compiled or read, in the same order as the library's
//! `validate_schema_with`, so a missing file aborts the run before any
//! output. Each file then gets its
//! own summary, followed by a grand total when more than one file was given.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use jsv_schema::{
    check_sources, config::parse_draft, Draft, LineValidator, RunSummary, ValidatorOptions,
};

use crate::output::{OutputFormat, ReportSink};

/// Exit code when every record is valid.
pub const EXIT_OK: u8 = 0;
/// Exit code when at least one record is invalid.
pub const EXIT_INVALID: u8 = 1;

/// Arguments for the `jsv validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// JSON Schema file (JSON, or YAML with a .yaml/.yml extension).
    #[arg(long, short = 's', value_name = "SCHEMA")]
    pub schema: PathBuf,

    /// JSON-Lines files to validate.
    #[arg(value_name = "DATA", required = true)]
    pub data: Vec<PathBuf>,

    /// Schema draft: 4, 6, 7, 2019-09 or 2020-12. Overrides JSV_DRAFT.
    #[arg(long, value_parser = parse_draft_arg)]
    pub draft: Option<Draft>,

    /// Print the violated subschema under each violation.
    #[arg(long)]
    pub show_expected: bool,

    /// Report format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

fn parse_draft_arg(raw: &str) -> Result<Draft, String> {
    parse_draft(raw).ok_or_else(|| format!("unknown draft '{raw}'"))
}

impl ValidateArgs {
    /// Merge flags over options read from the environment.
    pub fn options(&self, base: ValidatorOptions) -> ValidatorOptions {
        let mut options = base;
        if let Some(draft) = self.draft {
            options.draft = draft;
        }
        if self.show_expected {
            options.include_expected = true;
        }
        options
    }
}

/// Execute the validate subcommand, writing the report to `out`.
///
/// Returns [`EXIT_OK`] when every record is valid and [`EXIT_INVALID`]
/// otherwise. Setup failures are returned as errors.
pub fn run_validate<W: Write>(args: &ValidateArgs, out: W) -> Result<u8> {
    let base = ValidatorOptions::from_env().context("invalid environment configuration")?;
    let options = args.options(base);

    check_sources(&args.schema, &args.data)?;

    let validator = LineValidator::from_schema_file(&args.schema, &options)
        .with_context(|| format!("failed to load schema {}", args.schema.display()))?;

    tracing::info!(
        schema = %args.schema.display(),
        files = args.data.len(),
        draft = ?options.draft,
        "validating data files"
    );

    let mut sink = ReportSink::new(out, args.format);
    let mut total = RunSummary::default();

    for path in &args.data {
        sink.set_source(path.display().to_string());
        let summary = validator
            .validate_file(path, &mut sink)
            .with_context(|| format!("failed to validate {}", path.display()))?;
        tracing::info!(
            data = %path.display(),
            valid = summary.valid,
            invalid = summary.invalid,
            "file validated"
        );
        total += summary;
    }

    if args.data.len() > 1 {
        sink.total(args.data.len(), &total);
    }
    sink.finish().context("failed to write report")?;

    Ok(if total.is_clean() { EXIT_OK } else { EXIT_INVALID })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    use jsv_schema::LineValidationError;

    const NAME_SCHEMA: &str =
        r#"{"type": "object", "required": ["name"], "properties": {"name": {"type": "string"}}}"#;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn args(schema: PathBuf, data: Vec<PathBuf>) -> ValidateArgs {
        ValidateArgs {
            schema,
            data,
            draft: None,
            show_expected: false,
            format: OutputFormat::Text,
        }
    }

    fn run(args: &ValidateArgs) -> (Result<u8>, String) {
        let mut out = Vec::new();
        let code = run_validate(args, &mut out);
        (code, String::from_utf8(out).unwrap())
    }

    #[test]
    fn all_valid_returns_zero() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write(dir.path(), "schema.json", NAME_SCHEMA);
        let data = write(dir.path(), "a.jsonl", "{\"name\": \"Alice\"}\n\n");

        let (code, out) = run(&args(schema, vec![data]));
        assert_eq!(code.unwrap(), EXIT_OK);
        assert!(out.contains("Valid records   : 1"), "{out}");
        assert!(out.contains("Invalid records : 0"), "{out}");
    }

    #[test]
    fn invalid_record_returns_one() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write(dir.path(), "schema.json", NAME_SCHEMA);
        let data = write(dir.path(), "a.jsonl", "{\"name\": \"Alice\"}\n{\"name\": 5}\n");

        let (code, out) = run(&args(schema, vec![data]));
        assert_eq!(code.unwrap(), EXIT_INVALID);
        assert!(out.contains("Schema validation error at line 2 | Path: name"), "{out}");
    }

    #[test]
    fn several_files_get_a_total() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write(dir.path(), "schema.json", NAME_SCHEMA);
        let a = write(dir.path(), "a.jsonl", "{\"name\": \"a\"}\n");
        let b = write(dir.path(), "b.jsonl", "{}\n{\"name\": \"b\"}\n");

        let (code, out) = run(&args(schema, vec![a, b]));
        assert_eq!(code.unwrap(), EXIT_INVALID);
        assert_eq!(out.matches("VALIDATION SUMMARY").count(), 2);
        assert!(out.contains("========== TOTAL (2 files) =========="), "{out}");
        assert!(out.contains("Valid records   : 2"), "{out}");
    }

    #[test]
    fn missing_data_file_fails_before_any_output() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write(dir.path(), "schema.json", NAME_SCHEMA);
        let a = write(dir.path(), "a.jsonl", "{\"name\": \"a\"}\n");

        let (code, out) = run(&args(schema, vec![a, dir.path().join("missing.jsonl")]));
        let err = code.unwrap_err();
        assert!(
            matches!(
                err.downcast_ref::<LineValidationError>(),
                Some(LineValidationError::ResourceNotFound { .. })
            ),
            "got: {err:#}"
        );
        assert!(out.is_empty());
    }

    #[test]
    fn missing_schema_is_reported_before_missing_data() {
        let dir = tempfile::tempdir().unwrap();
        let (code, out) = run(&args(
            dir.path().join("schema.json"),
            vec![dir.path().join("missing.jsonl")],
        ));
        let err = code.unwrap_err();
        assert!(
            matches!(
                err.downcast_ref::<LineValidationError>(),
                Some(LineValidationError::Configuration { .. })
            ),
            "got: {err:#}"
        );
        assert!(out.is_empty());
    }

    #[test]
    fn malformed_schema_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write(dir.path(), "schema.json", "{\"type\": [");
        let data = write(dir.path(), "a.jsonl", "{}\n");

        let (code, _) = run(&args(schema, vec![data]));
        let err = code.unwrap_err();
        assert!(format!("{err:#}").contains("failed to load schema"), "{err:#}");
    }

    #[test]
    fn flags_override_base_options() {
        let mut a = args(PathBuf::from("s.json"), vec![PathBuf::from("d.jsonl")]);
        let base = ValidatorOptions::default();
        assert_eq!(a.options(base), base);

        a.draft = Some(Draft::Draft202012);
        a.show_expected = true;
        let merged = a.options(base);
        assert_eq!(merged.draft, Draft::Draft202012);
        assert!(merged.include_expected);
    }

    #[test]
    fn draft_argument_parsing() {
        assert_eq!(parse_draft_arg("2019-09"), Ok(Draft::Draft201909));
        assert!(parse_draft_arg("5").unwrap_err().contains("unknown draft"));
    }
}
