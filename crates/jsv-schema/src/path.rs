//! # Instance Paths
//!
//! The schema engine reports the location of a violation as a JSON Pointer
//! (`/tags/1`). Diagnostics need typed segments instead: object keys and
//! array indices order differently, and a key that merely looks numeric
//! (`{"1": ...}`) must stay a key. [`InstancePath::from_pointer`] recovers
//! the segment kinds by walking the pointer through the record itself.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// Marker printed for a violation at the top level of a record.
pub const ROOT_MARKER: &str = "ROOT";

/// Separator placed between segments when a path is displayed.
pub const PATH_SEPARATOR: &str = " -> ";

/// One step from a JSON value into one of its children.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Position within an array.
    Index(usize),
    /// Member name within an object.
    Key(String),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Index(i) => write!(f, "{i}"),
            PathSegment::Key(k) => f.write_str(k),
        }
    }
}

/// Location of a sub-value within a record, from the document root.
///
/// Paths order lexicographically by segment; the root (empty) path sorts
/// before every other path.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct InstancePath {
    segments: Vec<PathSegment>,
}

impl InstancePath {
    /// The empty path, addressing the record itself.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    /// Convert an RFC 6901 JSON Pointer into typed segments.
    ///
    /// A reference token becomes [`PathSegment::Index`] when the value it
    /// indexes into is an array and the token parses as an index; otherwise
    /// it becomes [`PathSegment::Key`]. Once the pointer leaves the instance
    /// (a missing member, for example) the remaining tokens are keys.
    pub fn from_pointer(pointer: &str, instance: &Value) -> Self {
        let mut segments = Vec::new();
        let mut current = Some(instance);

        for raw in pointer.split('/').skip(1) {
            let token = unescape_token(raw);
            let segment = match current {
                Some(Value::Array(items)) => match token.parse::<usize>() {
                    Ok(index) => {
                        current = items.get(index);
                        PathSegment::Index(index)
                    }
                    Err(_) => {
                        current = None;
                        PathSegment::Key(token)
                    }
                },
                Some(Value::Object(members)) => {
                    current = members.get(&token);
                    PathSegment::Key(token)
                }
                _ => {
                    current = None;
                    PathSegment::Key(token)
                }
            };
            segments.push(segment);
        }

        Self { segments }
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for InstancePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str(ROOT_MARKER);
        }
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(PATH_SEPARATOR)?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

pub(crate) fn unescape_token(raw: &str) -> String {
    raw.replace("~1", "/").replace("~0", "~")
}

/// A single schema violation with structured context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    /// Location of the offending sub-value within the record.
    pub path: InstancePath,
    /// JSON Pointer to the schema keyword that failed.
    pub schema_path: String,
    /// Human-readable description of the violation.
    pub message: String,
    /// The subschema the value was checked against, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<Value>,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}
