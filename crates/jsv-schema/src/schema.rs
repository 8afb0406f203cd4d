//! # Schema Loading
//!
//! Loads a JSON Schema document from disk (JSON, or YAML by extension) and
//! compiles it into a reusable [`jsonschema::Validator`].
//!
//! ## Reference Resolution
//!
//! `$ref`s to other documents are resolved against files next to the schema,
//! by file name. The validator never makes network requests: a reference
//! that cannot be resolved locally fails compilation, which surfaces as a
//! configuration error before any record is read.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use jsonschema::{Retrieve, Uri, ValidationOptions, Validator};
use serde_json::Value;

use crate::config::ValidatorOptions;
use crate::error::LineValidationError;
use crate::path::unescape_token;

/// Label used as the source of schemas built from in-memory values.
pub const INLINE_SOURCE: &str = "<inline>";

/// Local retriever that resolves `$ref` URIs to sibling schema files.
struct LocalSchemaRetriever {
    /// Directory the referencing schema was loaded from, if any.
    base_dir: Option<PathBuf>,
    /// Documents registered in memory, keyed by URI and by file name.
    documents: HashMap<String, Value>,
}

impl LocalSchemaRetriever {
    fn lookup_file(&self, filename: &str) -> Result<Value, String> {
        let Some(dir) = &self.base_dir else {
            return Err(format!("no schema directory to resolve '{filename}' against"));
        };
        let candidate = dir.join(filename);
        if !candidate.is_file() {
            return Err(format!("referenced schema not found: {}", candidate.display()));
        }
        read_document(&candidate)
    }
}

impl Retrieve for LocalSchemaRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();

        if let Some(value) = self.documents.get(uri_str) {
            return Ok(value.clone());
        }

        let filename = uri_str
            .split(['#', '?'])
            .next()
            .unwrap_or(uri_str)
            .rsplit('/')
            .next()
            .unwrap_or(uri_str);

        if let Some(value) = self.documents.get(filename) {
            return Ok(value.clone());
        }

        tracing::debug!(uri = uri_str, filename, "resolving schema reference from disk");
        self.lookup_file(filename).map_err(Into::into)
    }
}

/// A loaded, immutable JSON Schema document.
#[derive(Debug, Clone)]
pub struct SchemaDocument {
    source: PathBuf,
    value: Value,
}

impl SchemaDocument {
    /// Load a schema from a file.
    ///
    /// `.yaml`/`.yml` files are parsed as YAML and converted to JSON; every
    /// other extension is parsed as JSON.
    ///
    /// # Errors
    ///
    /// Returns `LineValidationError::Configuration` if the file does not
    /// exist, cannot be read, or does not parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LineValidationError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(LineValidationError::Configuration {
                path: path.to_path_buf(),
                reason: "schema file not found".to_string(),
            });
        }
        let value = read_document(path).map_err(|reason| LineValidationError::Configuration {
            path: path.to_path_buf(),
            reason,
        })?;
        Ok(Self {
            source: path.to_path_buf(),
            value,
        })
    }

    /// Wrap an in-memory schema value.
    pub fn from_value(value: Value) -> Self {
        Self {
            source: PathBuf::from(INLINE_SOURCE),
            value,
        }
    }

    /// Path the schema was loaded from, or `<inline>`.
    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    fn base_dir(&self) -> Option<PathBuf> {
        if self.source == Path::new(INLINE_SOURCE) {
            return None;
        }
        let dir = self.source.parent()?;
        if dir.as_os_str().is_empty() {
            Some(PathBuf::from("."))
        } else {
            Some(dir.to_path_buf())
        }
    }

    fn build_options(&self, options: &ValidatorOptions) -> ValidationOptions {
        let mut opts = jsonschema::options();
        opts.with_draft(options.draft);

        let mut documents = HashMap::new();
        if let Some(id) = self.value.get("$id").and_then(Value::as_str) {
            documents.insert(id.to_string(), self.value.clone());
        }
        if let Some(name) = self.source.file_name().and_then(|n| n.to_str()) {
            documents.insert(name.to_string(), self.value.clone());
        }

        opts.with_retriever(LocalSchemaRetriever {
            base_dir: self.base_dir(),
            documents,
        });
        opts
    }

    /// Compile the document into a reusable validator.
    ///
    /// # Errors
    ///
    /// Returns `LineValidationError::Configuration` if the document is not a
    /// valid schema for the configured draft or a `$ref` cannot be resolved.
    pub fn compile(&self, options: &ValidatorOptions) -> Result<Validator, LineValidationError> {
        self.build_options(options)
            .build(&self.value)
            .map_err(|e| LineValidationError::Configuration {
                path: self.source.clone(),
                reason: format!("invalid JSON Schema: {e}"),
            })
    }

    /// Look up the subschema containing the keyword at `schema_path`.
    ///
    /// `schema_path` is the JSON Pointer of the failing keyword (for example
    /// `/properties/name/type`); the result is the object holding that
    /// keyword. A `$ref` token on the way is followed when it names a
    /// fragment of this document (`#/definitions/name`). Returns `None` for
    /// references into other documents and for pointers that do not
    /// resolve.
    pub fn subschema_for(&self, schema_path: &str) -> Option<&Value> {
        let tokens: Vec<String> = schema_path.split('/').skip(1).map(unescape_token).collect();
        let Some((_keyword, parents)) = tokens.split_last() else {
            return Some(&self.value);
        };

        let mut current = &self.value;
        for token in parents {
            current = match current.get("$ref").and_then(Value::as_str) {
                Some(reference) if token == "$ref" => {
                    let fragment = reference.strip_prefix('#')?;
                    self.value.pointer(fragment)?
                }
                _ => match current {
                    Value::Object(members) => members.get(token)?,
                    Value::Array(items) => items.get(token.parse::<usize>().ok()?)?,
                    _ => return None,
                },
            };
        }
        Some(current)
    }
}

fn read_document(path: &Path) -> Result<Value, String> {
    let content =
        std::fs::read_to_string(path).map_err(|e| format!("cannot read file: {e}"))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    match ext {
        "yaml" | "yml" => {
            let yaml_value: serde_yaml::Value =
                serde_yaml::from_str(&content).map_err(|e| format!("invalid YAML: {e}"))?;
            yaml_schema_to_json(&yaml_value, "")
                .map_err(|e| format!("unsupported YAML in schema: {e}"))
        }
        _ => serde_json::from_str(&content).map_err(|e| format!("invalid JSON: {e}")),
    }
}

/// Convert a YAML schema into its JSON form.
///
/// A schema is plain JSON data, so only the JSON-compatible subset of YAML
/// is accepted: no tags, no `.nan`/`.inf`, and mapping keys that are strings
/// or numbers. Errors name the offending location as a JSON Pointer.
fn yaml_schema_to_json(yaml: &serde_yaml::Value, at: &str) -> Result<Value, String> {
    use serde_yaml::Value as Yaml;

    let location = if at.is_empty() { "/" } else { at };
    match yaml {
        Yaml::Null => Ok(Value::Null),
        Yaml::Bool(b) => Ok(Value::Bool(*b)),
        Yaml::String(s) => Ok(Value::String(s.clone())),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::from(i))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::from(u))
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .ok_or_else(|| format!("non-finite number {n} at {location}"))
            }
        }
        Yaml::Sequence(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| yaml_schema_to_json(item, &format!("{at}/{i}")))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Yaml::Mapping(members) => {
            let mut object = serde_json::Map::with_capacity(members.len());
            for (key, value) in members {
                let key = match key {
                    Yaml::String(s) => s.clone(),
                    Yaml::Number(n) => n.to_string(),
                    other => {
                        return Err(format!(
                            "mapping key at {location} must be a string, found {}",
                            yaml_kind(other)
                        ))
                    }
                };
                let escaped = key.replace('~', "~0").replace('/', "~1");
                let converted = yaml_schema_to_json(value, &format!("{at}/{escaped}"))?;
                object.insert(key, converted);
            }
            Ok(Value::Object(object))
        }
        Yaml::Tagged(tagged) => Err(format!("YAML tag {} at {location} is not allowed", tagged.tag)),
    }
}

fn yaml_kind(value: &serde_yaml::Value) -> &'static str {
    match value {
        serde_yaml::Value::Null => "null",
        serde_yaml::Value::Bool(_) => "a boolean",
        serde_yaml::Value::Number(_) => "a number",
        serde_yaml::Value::String(_) => "a string",
        serde_yaml::Value::Sequence(_) => "a sequence",
        serde_yaml::Value::Mapping(_) => "a mapping",
        serde_yaml::Value::Tagged(_) => "a tagged value",
    }
}
