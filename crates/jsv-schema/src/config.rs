//! Validator configuration.
//!
//! Options are built explicitly or read from the environment. Nothing here
//! touches process-global state: every run receives its own options.

use jsonschema::Draft;

/// Environment variable selecting the JSON Schema draft.
pub const DRAFT_ENV: &str = "JSV_DRAFT";
/// Environment variable enabling the violated subschema in diagnostics.
pub const SHOW_EXPECTED_ENV: &str = "JSV_SHOW_EXPECTED";

/// Options applied when compiling a schema and reporting violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorOptions {
    /// Draft used to interpret the schema. Default: Draft 7.
    pub draft: Draft,
    /// Attach the violated subschema to each violation.
    pub include_expected: bool,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            draft: Draft::Draft7,
            include_expected: false,
        }
    }
}

impl ValidatorOptions {
    /// Load options from environment variables.
    ///
    /// Variables:
    /// - `JSV_DRAFT` (default: `7`; accepts `4`, `6`, `7`, `2019-09`, `2020-12`)
    /// - `JSV_SHOW_EXPECTED` (default: `false`; accepts `1`/`0`, `true`/`false`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut options = Self::default();
        if let Some(raw) = lookup(DRAFT_ENV) {
            options.draft = parse_draft(&raw).ok_or_else(|| ConfigError::InvalidValue {
                var: DRAFT_ENV.to_string(),
                value: raw.clone(),
            })?;
        }
        if let Some(raw) = lookup(SHOW_EXPECTED_ENV) {
            options.include_expected =
                parse_flag(&raw).ok_or_else(|| ConfigError::InvalidValue {
                    var: SHOW_EXPECTED_ENV.to_string(),
                    value: raw.clone(),
                })?;
        }
        Ok(options)
    }

    /// Override the draft.
    pub fn with_draft(mut self, draft: Draft) -> Self {
        self.draft = draft;
        self
    }

    /// Override whether violated subschemas are attached to violations.
    pub fn with_expected(mut self, include_expected: bool) -> Self {
        self.include_expected = include_expected;
        self
    }
}

/// Parse a draft name such as `7`, `draft7` or `2020-12`.
pub fn parse_draft(raw: &str) -> Option<Draft> {
    let normalized = raw.trim().to_ascii_lowercase();
    let normalized = normalized
        .strip_prefix("draft")
        .unwrap_or(&normalized)
        .trim_start_matches(['-', '_']);
    match normalized {
        "4" | "04" => Some(Draft::Draft4),
        "6" | "06" => Some(Draft::Draft6),
        "7" | "07" => Some(Draft::Draft7),
        "2019-09" | "201909" => Some(Draft::Draft201909),
        "2020-12" | "202012" => Some(Draft::Draft202012),
        _ => None,
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: String, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_to_draft7_without_expected() {
        let options = ValidatorOptions::from_vars(vars(&[])).unwrap();
        assert_eq!(options, ValidatorOptions::default());
        assert_eq!(options.draft, Draft::Draft7);
        assert!(!options.include_expected);
    }

    #[test]
    fn reads_draft_and_flag() {
        let options =
            ValidatorOptions::from_vars(vars(&[(DRAFT_ENV, "2020-12"), (SHOW_EXPECTED_ENV, "1")]))
                .unwrap();
        assert_eq!(options.draft, Draft::Draft202012);
        assert!(options.include_expected);
    }

    #[test]
    fn rejects_unknown_draft() {
        let err = ValidatorOptions::from_vars(vars(&[(DRAFT_ENV, "draft99")])).unwrap_err();
        assert!(err.to_string().contains(DRAFT_ENV));
    }

    #[test]
    fn rejects_garbage_flag() {
        assert!(ValidatorOptions::from_vars(vars(&[(SHOW_EXPECTED_ENV, "maybe")])).is_err());
    }

    #[test]
    fn parse_draft_accepts_aliases() {
        assert_eq!(parse_draft("draft7"), Some(Draft::Draft7));
        assert_eq!(parse_draft("Draft-04"), Some(Draft::Draft4));
        assert_eq!(parse_draft(" 6 "), Some(Draft::Draft6));
        assert_eq!(parse_draft("2019-09"), Some(Draft::Draft201909));
        assert_eq!(parse_draft("3"), None);
    }
}
