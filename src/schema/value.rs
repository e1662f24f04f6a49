//! Source values seen by the normalizer
//!
//! Source types expose their columns through [`SourceObject::field`], which
//! maps a schema column name to a borrowed [`SourceValue`]. Nothing is
//! looked up by reflection: every column a type can produce is spelled out
//! in its accessor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// An object whose columns can be normalized against a schema
pub trait SourceObject: Send + Sync {
    /// Value of the column named `column`.
    ///
    /// Returns `None` when the type has no such column, in which case the
    /// column is skipped. An unset column is `Some(SourceValue::Null)`.
    fn field(&self, column: &str) -> Option<SourceValue<'_>>;
}

/// A closed enumeration with symbolic names
pub trait ProtoEnum {
    /// Symbolic name, e.g. `POWER_STATE_UNSPECIFIED`
    fn name(&self) -> &'static str;
}

/// A borrowed value of a source object column
#[derive(Clone)]
pub enum SourceValue<'a> {
    Null,
    String(&'a str),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    Enum(&'static str),
    Timestamp(Timestamp),
    Record(&'a dyn SourceObject),
    List(Vec<SourceValue<'a>>),
    Map(Vec<(&'a str, SourceValue<'a>)>),
}

impl<'a> SourceValue<'a> {
    /// Kind name used in conversion errors
    pub fn kind(&self) -> &'static str {
        match self {
            SourceValue::Null => "null",
            SourceValue::String(_) => "string",
            SourceValue::Int(_) => "int64",
            SourceValue::UInt(_) => "uint64",
            SourceValue::Float(_) => "float64",
            SourceValue::Bool(_) => "bool",
            SourceValue::Enum(_) => "enum",
            SourceValue::Timestamp(_) => "timestamp",
            SourceValue::Record(_) => "record",
            SourceValue::List(_) => "list",
            SourceValue::Map(_) => "map",
        }
    }

    /// A nested object, or null when absent
    pub fn optional_record<T: SourceObject>(value: Option<&'a T>) -> Self {
        match value {
            Some(obj) => SourceValue::Record(obj),
            None => SourceValue::Null,
        }
    }

    /// A list of nested objects
    pub fn records<T: SourceObject>(items: &'a [T]) -> Self {
        SourceValue::List(items.iter().map(|i| SourceValue::Record(i)).collect())
    }

    /// A list of scalars
    pub fn list<T>(items: &'a [T]) -> Self
    where
        &'a T: Into<SourceValue<'a>>,
    {
        SourceValue::List(items.iter().map(Into::into).collect())
    }

    /// A dynamic map. Entry order does not matter, the normalizer sorts it.
    pub fn map<V>(entries: &'a HashMap<String, V>) -> Self
    where
        &'a V: Into<SourceValue<'a>>,
    {
        SourceValue::Map(entries.iter().map(|(k, v)| (k.as_str(), v.into())).collect())
    }

    /// A symbolic enum value
    pub fn enumeration<E: ProtoEnum>(value: &E) -> Self {
        SourceValue::Enum(value.name())
    }
}

impl fmt::Debug for SourceValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceValue::Null => f.write_str("Null"),
            SourceValue::String(s) => f.debug_tuple("String").field(s).finish(),
            SourceValue::Int(v) => f.debug_tuple("Int").field(v).finish(),
            SourceValue::UInt(v) => f.debug_tuple("UInt").field(v).finish(),
            SourceValue::Float(v) => f.debug_tuple("Float").field(v).finish(),
            SourceValue::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            SourceValue::Enum(v) => f.debug_tuple("Enum").field(v).finish(),
            SourceValue::Timestamp(v) => f.debug_tuple("Timestamp").field(v).finish(),
            SourceValue::Record(_) => f.write_str("Record(..)"),
            SourceValue::List(v) => f.debug_tuple("List").field(v).finish(),
            SourceValue::Map(v) => f.debug_tuple("Map").field(v).finish(),
        }
    }
}

impl<'a> From<&'a str> for SourceValue<'a> {
    fn from(value: &'a str) -> Self {
        SourceValue::String(value)
    }
}

impl<'a> From<&'a String> for SourceValue<'a> {
    fn from(value: &'a String) -> Self {
        SourceValue::String(value)
    }
}

impl<'a> From<&'a Option<String>> for SourceValue<'a> {
    fn from(value: &'a Option<String>) -> Self {
        value.as_deref().map_or(SourceValue::Null, SourceValue::String)
    }
}

impl From<i64> for SourceValue<'_> {
    fn from(value: i64) -> Self {
        SourceValue::Int(value)
    }
}

impl From<&i64> for SourceValue<'_> {
    fn from(value: &i64) -> Self {
        SourceValue::Int(*value)
    }
}

impl From<i32> for SourceValue<'_> {
    fn from(value: i32) -> Self {
        SourceValue::Int(i64::from(value))
    }
}

impl From<u64> for SourceValue<'_> {
    fn from(value: u64) -> Self {
        SourceValue::UInt(value)
    }
}

impl From<f64> for SourceValue<'_> {
    fn from(value: f64) -> Self {
        SourceValue::Float(value)
    }
}

impl From<&f64> for SourceValue<'_> {
    fn from(value: &f64) -> Self {
        SourceValue::Float(*value)
    }
}

impl From<bool> for SourceValue<'_> {
    fn from(value: bool) -> Self {
        SourceValue::Bool(value)
    }
}

impl From<Timestamp> for SourceValue<'_> {
    fn from(value: Timestamp) -> Self {
        SourceValue::Timestamp(value)
    }
}

impl From<Option<Timestamp>> for SourceValue<'_> {
    fn from(value: Option<Timestamp>) -> Self {
        value.map_or(SourceValue::Null, SourceValue::Timestamp)
    }
}

impl From<Option<i64>> for SourceValue<'_> {
    fn from(value: Option<i64>) -> Self {
        value.map_or(SourceValue::Null, SourceValue::Int)
    }
}

impl From<Option<f64>> for SourceValue<'_> {
    fn from(value: Option<f64>) -> Self {
        value.map_or(SourceValue::Null, SourceValue::Float)
    }
}

impl From<Option<bool>> for SourceValue<'_> {
    fn from(value: Option<bool>) -> Self {
        value.map_or(SourceValue::Null, SourceValue::Bool)
    }
}

// ============================================================================
// Timestamp
// ============================================================================

/// A point in time as seconds and nanoseconds since the Unix epoch.
///
/// Deserialized from and serialized to RFC 3339 strings, the encoding the
/// REST API uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp {
    pub seconds: i64,
    pub nanos: i32,
}

impl Timestamp {
    /// Create a timestamp
    pub fn new(seconds: i64, nanos: i32) -> Self {
        Self { seconds, nanos }
    }

    /// Convert to a chrono date, `None` when out of range
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        let nanos = u32::try_from(self.nanos).ok()?;
        DateTime::from_timestamp(self.seconds, nanos)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self {
            seconds: value.timestamp(),
            nanos: value.timestamp_subsec_nanos() as i32,
        }
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.to_datetime() {
            Some(dt) => serializer.serialize_str(&dt.to_rfc3339()),
            None => Err(serde::ser::Error::custom("timestamp out of range")),
        }
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| Timestamp::from(dt.with_timezone(&Utc)))
            .map_err(serde::de::Error::custom)
    }
}
