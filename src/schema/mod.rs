//! Schema module
//!
//! Declarative table schemas and the normalizer that shapes source objects
//! into bulk-load ready JSON lines.
//!
//! # Features
//!
//! - **Table Schemas**: BigQuery table-schema JSON, with an embedded default
//! - **Explicit Accessors**: source types expose columns through [`SourceObject`]
//! - **Dynamic Maps**: open-ended maps become key-sorted `{key, value}` lists
//! - **Field Paths**: conversion errors name the exact field that failed

mod normalize;
mod types;
mod value;

pub use normalize::{
    normalize, normalize_record, serialize_record, PathSegment, RecordSerializer, SerializeError,
};
pub use types::{ExporterSchema, FieldMode, FieldSchema, FieldType, Schema};
pub use value::{ProtoEnum, SourceObject, SourceValue, Timestamp};

#[cfg(test)]
mod tests;
