//! Schema types
//!
//! Table schemas use the BigQuery table-schema JSON encoding, so a schema
//! file can be handed to `bq mk` unchanged.

use crate::error::{Error, Result};
use crate::types::TableKind;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Column type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldType {
    String,
    #[serde(alias = "INT64")]
    Integer,
    #[serde(alias = "FLOAT64")]
    Float,
    #[serde(alias = "BOOL")]
    Boolean,
    Timestamp,
    #[serde(alias = "STRUCT")]
    Record,
}

impl FieldType {
    /// Lowercase name used in conversion errors
    pub fn name(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Boolean => "bool",
            FieldType::Timestamp => "timestamp",
            FieldType::Record => "record",
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Column mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldMode {
    #[default]
    Nullable,
    Required,
    Repeated,
}

impl FieldMode {
    fn is_nullable(&self) -> bool {
        *self == FieldMode::Nullable
    }
}

/// A single column of a table schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    /// Column name, in snake case
    pub name: String,

    /// Column type
    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Column mode
    #[serde(default, skip_serializing_if = "FieldMode::is_nullable")]
    pub mode: FieldMode,

    /// Human readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Nested columns of a RECORD
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldSchema>,
}

/// An ordered list of columns
pub type Schema = Vec<FieldSchema>;

impl FieldSchema {
    /// Create a nullable scalar column
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            mode: FieldMode::Nullable,
            description: None,
            fields: Vec::new(),
        }
    }

    /// Create a nullable RECORD column
    pub fn record(name: impl Into<String>, fields: Schema) -> Self {
        Self {
            fields,
            ..Self::new(name, FieldType::Record)
        }
    }

    /// Create a dynamic map column holding values described by `value`
    pub fn map(name: impl Into<String>, value: FieldSchema) -> Self {
        let value = FieldSchema {
            name: "value".to_string(),
            ..value
        };
        Self::record(name, vec![FieldSchema::new("key", FieldType::String), value]).repeated()
    }

    /// Mark the column as REPEATED
    #[must_use]
    pub fn repeated(mut self) -> Self {
        self.mode = FieldMode::Repeated;
        self
    }

    /// Mark the column as REQUIRED
    #[must_use]
    pub fn required(mut self) -> Self {
        self.mode = FieldMode::Required;
        self
    }

    /// Set the description
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Check if this column is REPEATED
    pub fn is_repeated(&self) -> bool {
        self.mode == FieldMode::Repeated
    }

    /// Find a nested column by name
    pub fn get_field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    fn validate(&self, path: &str) -> std::result::Result<(), String> {
        let path = if path.is_empty() {
            self.name.clone()
        } else {
            format!("{path}.{}", self.name)
        };

        match self.field_type {
            FieldType::Record if self.fields.is_empty() => {
                Err(format!("record field `{path}` has no nested fields"))
            }
            FieldType::Record => self.fields.iter().try_for_each(|f| f.validate(&path)),
            other if !self.fields.is_empty() => Err(format!(
                "field `{path}` of type {} cannot have nested fields",
                other.name()
            )),
            _ => Ok(()),
        }
    }
}

// ============================================================================
// Exporter Schema
// ============================================================================

const EMBEDDED_SCHEMA: &str = include_str!("embedded.schema.json");

#[derive(Deserialize)]
struct RawExporterSchema {
    #[serde(default)]
    asset_table: Schema,
    #[serde(default)]
    group_table: Schema,
    #[serde(default)]
    preference_set_table: Schema,
}

/// The table schemas used by one export.
///
/// Only `asset_table` is mandatory. Definitions older than a record kind
/// simply leave its table out, and the export skips that kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawExporterSchema")]
pub struct ExporterSchema {
    pub asset_table: Schema,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub group_table: Schema,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub preference_set_table: Schema,
}

impl TryFrom<RawExporterSchema> for ExporterSchema {
    type Error = String;

    fn try_from(raw: RawExporterSchema) -> std::result::Result<Self, Self::Error> {
        if raw.asset_table.is_empty() {
            return Err("missing required key `asset_table` in schema".to_string());
        }

        for (key, table) in [
            ("asset_table", &raw.asset_table),
            ("group_table", &raw.group_table),
            ("preference_set_table", &raw.preference_set_table),
        ] {
            for field in table {
                field.validate("").map_err(|e| format!("{key}: {e}"))?;
            }
        }

        Ok(Self {
            asset_table: raw.asset_table,
            group_table: raw.group_table,
            preference_set_table: raw.preference_set_table,
        })
    }
}

impl ExporterSchema {
    /// The schema distributed with mc2bq
    pub fn embedded() -> Result<Self> {
        Self::from_json_str(EMBEDDED_SCHEMA)
    }

    /// Raw JSON of the embedded schema
    pub fn embedded_json() -> &'static str {
        EMBEDDED_SCHEMA
    }

    /// Parse a schema definition
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::invalid_schema(e.to_string()))
    }

    /// Load a schema definition from a file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::invalid_schema(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&content)
    }

    /// Schema of the table holding `kind`
    pub fn table(&self, kind: TableKind) -> &Schema {
        match kind {
            TableKind::Assets => &self.asset_table,
            TableKind::Groups => &self.group_table,
            TableKind::PreferenceSets => &self.preference_set_table,
        }
    }
}
