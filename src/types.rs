//! Common types used throughout mc2bq
//!
//! This module contains shared type definitions, type aliases,
//! and utility types used across multiple modules.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

// ============================================================================
// Record Kinds
// ============================================================================

/// The independently exported categories of Migration Center objects.
///
/// Each kind is read from its own listing endpoint and written to its own
/// destination table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Assets,
    Groups,
    PreferenceSets,
}

impl TableKind {
    /// All kinds, in export order
    pub const ALL: [TableKind; 3] = [
        TableKind::Assets,
        TableKind::Groups,
        TableKind::PreferenceSets,
    ];

    /// Destination table name, before the user supplied prefix
    pub fn table_suffix(self) -> &'static str {
        match self {
            TableKind::Assets => "assets",
            TableKind::Groups => "groups",
            TableKind::PreferenceSets => "preference_sets",
        }
    }

    /// Key of the table schema in the schema definition file
    pub fn schema_key(self) -> &'static str {
        match self {
            TableKind::Assets => "asset_table",
            TableKind::Groups => "group_table",
            TableKind::PreferenceSets => "preference_set_table",
        }
    }

    /// Root name used in serialization error paths
    pub fn root_name(self) -> &'static str {
        match self {
            TableKind::Assets => "asset",
            TableKind::Groups => "group",
            TableKind::PreferenceSets => "preference_set",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_suffix())
    }
}

// ============================================================================
// Write Disposition
// ============================================================================

/// How a load treats data already present in the destination table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WriteDisposition {
    /// Replace existing rows
    #[default]
    WriteTruncate,
    /// Fail if the destination already holds data
    WriteEmpty,
}

// ============================================================================
// Utilities
// ============================================================================

/// Extension trait for Option<String> to handle empty strings
pub trait OptionStringExt {
    /// Returns None if the string is empty
    fn none_if_empty(self) -> Option<String>;
}

impl OptionStringExt for Option<String> {
    fn none_if_empty(self) -> Option<String> {
        self.filter(|s| !s.is_empty())
    }
}

impl OptionStringExt for String {
    fn none_if_empty(self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}
