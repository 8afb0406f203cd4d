//! # jsv-cli — JSON-Lines Validator Command Line
//!
//! Provides the `jsv` binary, a thin caller over [`jsv_schema`]:
//!
//! ```bash
//! jsv validate --schema data/job_schema.json data/jobs.jsonl
//! jsv validate --schema schema.yaml --format json a.jsonl b.jsonl
//! ```
//!
//! ## Exit Codes
//!
//! - `0` — every record is valid.
//! - `1` — at least one record failed to parse or violated the schema.
//! - `2` — setup error: missing or malformed schema, missing data file,
//!   invalid configuration.
//!
//! ## Crate Policy
//!
//! - Argument parsing and report rendering live here; validation logic lives
//!   in `jsv-schema`.
//! - Only the binary installs a `tracing` subscriber.

pub mod output;
pub mod validate;
