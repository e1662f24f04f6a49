//! Group resource

use crate::schema::{SourceObject, SourceValue, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A user defined collection of assets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Group {
    pub name: String,
    pub create_time: Option<Timestamp>,
    pub update_time: Option<Timestamp>,
    pub display_name: String,
    pub description: String,
    pub labels: HashMap<String, String>,
}

impl SourceObject for Group {
    fn field(&self, column: &str) -> Option<SourceValue<'_>> {
        Some(match column {
            "name" => SourceValue::from(&self.name),
            "create_time" => self.create_time.into(),
            "update_time" => self.update_time.into(),
            "display_name" => SourceValue::from(&self.display_name),
            "description" => SourceValue::from(&self.description),
            "labels" => SourceValue::map(&self.labels),
            _ => return None,
        })
    }
}
