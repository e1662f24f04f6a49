//! Object normalizer
//!
//! Turns a [`SourceObject`] into a JSON value shaped by a table schema:
//! records become objects, dynamic maps become key-sorted lists of
//! `{key, value}` entries and timestamps become RFC 3339 strings.

use super::types::{FieldSchema, FieldType};
use super::value::{SourceObject, SourceValue};
use crate::types::{JsonObject, JsonValue};
use bytes::Bytes;
use chrono::SecondsFormat;
use std::fmt;
use std::sync::Arc;

// ============================================================================
// Errors
// ============================================================================

/// One step of the path to a failing field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Field(String),
    Index(usize),
    Key(String),
}

/// A source value that does not fit its column.
///
/// This points at a mismatch between the source types and the schema, the
/// path says which value was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializeError {
    // Innermost segment first, parents push as the error bubbles up
    path: Vec<PathSegment>,
    reason: String,
}

impl SerializeError {
    pub(crate) fn new(reason: impl Into<String>) -> Self {
        Self {
            path: Vec::new(),
            reason: reason.into(),
        }
    }

    /// Prefix the path with a named field
    #[must_use]
    pub fn at_field(mut self, name: impl Into<String>) -> Self {
        self.path.push(PathSegment::Field(name.into()));
        self
    }

    /// Prefix the path with a list index
    #[must_use]
    pub fn at_index(mut self, index: usize) -> Self {
        self.path.push(PathSegment::Index(index));
        self
    }

    /// Prefix the path with a map key
    #[must_use]
    pub fn at_key(mut self, key: impl Into<String>) -> Self {
        self.path.push(PathSegment::Key(key.into()));
        self
    }

    /// Path to the failing value, e.g. `asset.labels["k"]`
    pub fn path(&self) -> String {
        let mut out = String::new();
        for segment in self.path.iter().rev() {
            match segment {
                PathSegment::Field(name) if out.is_empty() => out.push_str(name),
                PathSegment::Field(name) => {
                    out.push('.');
                    out.push_str(name);
                }
                PathSegment::Index(i) => out.push_str(&format!("[{i}]")),
                PathSegment::Key(k) => out.push_str(&format!("[{k:?}]")),
            }
        }
        out
    }

    /// Why the value was rejected
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Display for SerializeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "error serializing field {}: {}",
            self.path(),
            self.reason
        )
    }
}

impl std::error::Error for SerializeError {}

type NormalizeResult<T> = std::result::Result<T, SerializeError>;

// ============================================================================
// Normalization
// ============================================================================

/// Normalize a single value against its column.
///
/// Returns `None` for null values, which the caller leaves out of the
/// enclosing object.
pub fn normalize(value: &SourceValue<'_>, field: &FieldSchema) -> NormalizeResult<Option<JsonValue>> {
    if field.is_repeated() {
        return match value {
            SourceValue::Null => Ok(None),
            SourceValue::List(items) => normalize_list(items, field).map(Some),
            SourceValue::Map(entries) => normalize_map(entries, field).map(Some),
            other => Err(SerializeError::new(format!(
                "schema does not match object: repeated field holds a {}",
                other.kind()
            ))),
        };
    }

    normalize_single(value, field)
}

/// Normalize an object against a table schema.
///
/// `root` names the object in error paths.
pub fn normalize_record(
    object: &dyn SourceObject,
    root: &str,
    schema: &[FieldSchema],
) -> NormalizeResult<JsonValue> {
    normalize_object(object, schema).map_err(|e| e.at_field(root))
}

/// Normalize an object and render it as one line of JSON
pub fn serialize_record(
    object: &dyn SourceObject,
    root: &str,
    schema: &[FieldSchema],
) -> NormalizeResult<Vec<u8>> {
    let value = normalize_record(object, root, schema)?;
    let mut line =
        serde_json::to_vec(&value).map_err(|e| SerializeError::new(e.to_string()).at_field(root))?;
    line.push(b'\n');
    Ok(line)
}

fn normalize_single(value: &SourceValue<'_>, field: &FieldSchema) -> NormalizeResult<Option<JsonValue>> {
    let json = match (field.field_type, value) {
        (_, SourceValue::Null) => return Ok(None),
        (FieldType::String, SourceValue::String(s)) => JsonValue::from(*s),
        (FieldType::String, SourceValue::Enum(name)) => JsonValue::from(*name),
        (FieldType::Integer, SourceValue::Int(i)) => JsonValue::from(*i),
        (FieldType::Integer, SourceValue::UInt(u)) => JsonValue::from(*u),
        (FieldType::Float, SourceValue::Float(f)) => serde_json::Number::from_f64(*f)
            .map(JsonValue::Number)
            .ok_or_else(|| SerializeError::new(format!("convert non-finite value {f} to float")))?,
        (FieldType::Boolean, SourceValue::Bool(b)) => JsonValue::from(*b),
        (FieldType::Timestamp, SourceValue::Timestamp(ts)) => {
            let dt = ts.to_datetime().ok_or_else(|| {
                SerializeError::new(format!(
                    "timestamp {}s {}ns is out of range",
                    ts.seconds, ts.nanos
                ))
            })?;
            JsonValue::from(dt.to_rfc3339_opts(SecondsFormat::Secs, true))
        }
        (FieldType::Record, SourceValue::Record(obj)) => normalize_object(*obj, &field.fields)?,
        (field_type, other) => {
            return Err(SerializeError::new(format!(
                "convert field of type {} to {field_type}",
                other.kind()
            )))
        }
    };

    Ok(Some(json))
}

fn normalize_object(object: &dyn SourceObject, fields: &[FieldSchema]) -> NormalizeResult<JsonValue> {
    let mut result = JsonObject::new();

    for column in fields {
        // Columns newer than the source type are left out
        let Some(value) = object.field(&column.name) else {
            continue;
        };

        if let Some(json) = normalize(&value, column).map_err(|e| e.at_field(&column.name))? {
            result.insert(column.name.clone(), json);
        }
    }

    Ok(JsonValue::Object(result))
}

fn normalize_list(items: &[SourceValue<'_>], field: &FieldSchema) -> NormalizeResult<JsonValue> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            normalize_single(item, field)
                .map(|v| v.unwrap_or(JsonValue::Null))
                .map_err(|e| e.at_index(i))
        })
        .collect::<NormalizeResult<Vec<_>>>()
        .map(JsonValue::Array)
}

fn normalize_map(entries: &[(&str, SourceValue<'_>)], field: &FieldSchema) -> NormalizeResult<JsonValue> {
    let value_field = match field.fields.as_slice() {
        [key, value] if key.name == "key" && value.name == "value" => value,
        _ => return Err(SerializeError::new("schema for dynamic map is invalid")),
    };

    let mut items = Vec::with_capacity(entries.len());
    for (key, value) in entries {
        let mut item = JsonObject::new();
        item.insert("key".to_string(), JsonValue::from(*key));
        if let Some(json) = normalize(value, value_field).map_err(|e| e.at_key(*key))? {
            item.insert("value".to_string(), json);
        }
        items.push((*key, JsonValue::Object(item)));
    }

    items.sort_by(|a, b| a.0.cmp(b.0));
    Ok(JsonValue::Array(items.into_iter().map(|(_, item)| item).collect()))
}

// ============================================================================
// Record Serializer
// ============================================================================

/// Serializes objects of one table with a fixed root name and schema
#[derive(Debug, Clone)]
pub struct RecordSerializer {
    root: String,
    schema: Arc<Vec<FieldSchema>>,
}

impl RecordSerializer {
    /// Create a serializer for the table described by `schema`
    pub fn new(root: impl Into<String>, schema: Vec<FieldSchema>) -> Self {
        Self {
            root: root.into(),
            schema: Arc::new(schema),
        }
    }

    /// Root name used in error paths
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Table schema
    pub fn schema(&self) -> &[FieldSchema] {
        &self.schema
    }

    /// Render `object` as one newline terminated JSON line
    pub fn serialize(&self, object: &dyn SourceObject) -> NormalizeResult<Bytes> {
        serialize_record(object, &self.root, &self.schema).map(Bytes::from)
    }
}
