//! Schema and normalizer tests

use super::*;
use crate::types::TableKind;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::HashMap;

// ============================================================================
// Test Fixtures
// ============================================================================

#[derive(Default)]
struct Tagged {
    name: String,
    tags: HashMap<String, String>,
    secret: String,
}

impl SourceObject for Tagged {
    fn field(&self, column: &str) -> Option<SourceValue<'_>> {
        Some(match column {
            "name" => SourceValue::from(&self.name),
            "tags" => SourceValue::map(&self.tags),
            "secret" => SourceValue::from(&self.secret),
            _ => return None,
        })
    }
}

fn tagged_schema() -> Schema {
    vec![
        FieldSchema::new("name", FieldType::String),
        FieldSchema::map("tags", FieldSchema::new("value", FieldType::String)),
    ]
}

fn tagged(name: &str, tags: &[(&str, &str)]) -> Tagged {
    Tagged {
        name: name.to_string(),
        tags: tags
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect(),
        secret: "hidden".to_string(),
    }
}

struct Everything<'a> {
    values: Vec<(&'static str, SourceValue<'a>)>,
}

impl SourceObject for Everything<'_> {
    fn field(&self, column: &str) -> Option<SourceValue<'_>> {
        self.values
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, value)| value.clone())
    }
}

fn normalize_one(value: SourceValue<'_>, field: &FieldSchema) -> Result<Option<serde_json::Value>, SerializeError> {
    normalize(&value, field)
}

// ============================================================================
// Schema Definition Tests
// ============================================================================

#[test]
fn test_embedded_schema_loads() {
    let schema = ExporterSchema::embedded().unwrap();
    assert!(!schema.asset_table.is_empty());
    assert!(!schema.group_table.is_empty());
    assert!(!schema.preference_set_table.is_empty());

    let labels = schema
        .asset_table
        .iter()
        .find(|f| f.name == "labels")
        .unwrap();
    assert!(labels.is_repeated());
    assert_eq!(labels.fields[0].name, "key");
    assert_eq!(labels.fields[1].name, "value");
}

#[test]
fn test_table_lookup_by_kind() {
    let schema = ExporterSchema::embedded().unwrap();
    assert_eq!(schema.table(TableKind::Assets), &schema.asset_table);
    assert_eq!(schema.table(TableKind::Groups), &schema.group_table);
    assert_eq!(
        schema.table(TableKind::PreferenceSets),
        &schema.preference_set_table
    );
}

#[test]
fn test_minimal_schema() {
    let schema =
        ExporterSchema::from_json_str(r#"{"asset_table":[{"name": "Foo", "type":"INTEGER"}]}"#)
            .unwrap();

    assert_eq!(
        schema.asset_table,
        vec![FieldSchema::new("Foo", FieldType::Integer)]
    );
    assert!(schema.group_table.is_empty());
    assert!(schema.preference_set_table.is_empty());
}

#[test]
fn test_empty_schema_rejected() {
    let err = ExporterSchema::from_json_str("{}").unwrap_err();
    assert!(err
        .to_string()
        .contains("missing required key `asset_table` in schema"));

    let err = ExporterSchema::from_json_str(r#"{"asset_table": []}"#).unwrap_err();
    assert!(err.to_string().contains("asset_table"));
}

#[test]
fn test_record_without_children_rejected() {
    let err = ExporterSchema::from_json_str(
        r#"{"asset_table":[{"name": "details", "type": "RECORD"}]}"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("details"));
}

#[test]
fn test_scalar_with_children_rejected() {
    let err = ExporterSchema::from_json_str(
        r#"{"asset_table":[{"name": "n", "type": "STRING", "fields": [{"name": "x", "type": "STRING"}]}]}"#,
    )
    .unwrap_err();
    assert!(matches!(err, crate::Error::InvalidSchema { .. }));
}

#[test]
fn test_type_aliases() {
    let schema = ExporterSchema::from_json_str(
        r#"{"asset_table":[
            {"name": "a", "type": "INT64"},
            {"name": "b", "type": "FLOAT64"},
            {"name": "c", "type": "BOOL", "mode": "REQUIRED"},
            {"name": "d", "type": "STRUCT", "fields": [{"name": "e", "type": "STRING"}]}
        ]}"#,
    )
    .unwrap();

    let types: Vec<_> = schema.asset_table.iter().map(|f| f.field_type).collect();
    assert_eq!(
        types,
        vec![
            FieldType::Integer,
            FieldType::Float,
            FieldType::Boolean,
            FieldType::Record
        ]
    );
    assert_eq!(schema.asset_table[2].mode, FieldMode::Required);
}

#[test]
fn test_schema_serializes_as_bigquery_json() {
    let schema = ExporterSchema {
        asset_table: vec![FieldSchema::new("Foo", FieldType::Integer)],
        group_table: vec![FieldSchema::new("Foo", FieldType::String).repeated()],
        preference_set_table: vec![],
    };

    assert_eq!(
        serde_json::to_value(&schema).unwrap(),
        json!({
            "asset_table": [{"name": "Foo", "type": "INTEGER"}],
            "group_table": [{"name": "Foo", "type": "STRING", "mode": "REPEATED"}]
        })
    );
}

// ============================================================================
// Normalizer Tests
// ============================================================================

#[test]
fn test_dynamic_map_sorted_by_key() {
    let object = tagged("x", &[("b", "2"), ("a", "1")]);
    let line = serialize_record(&object, "asset", &tagged_schema()).unwrap();

    assert_eq!(
        String::from_utf8(line).unwrap(),
        "{\"name\":\"x\",\"tags\":[{\"key\":\"a\",\"value\":\"1\"},{\"key\":\"b\",\"value\":\"2\"}]}\n"
    );
}

#[test]
fn test_fields_outside_schema_are_excluded() {
    let object = tagged("x", &[]);
    let value = normalize_record(&object, "asset", &tagged_schema()).unwrap();

    assert_eq!(value, json!({"name": "x", "tags": []}));
}

#[test]
fn test_columns_unknown_to_source_are_skipped() {
    let mut schema = tagged_schema();
    schema.push(FieldSchema::new("added_later", FieldType::Integer));

    let value = normalize_record(&tagged("x", &[]), "asset", &schema).unwrap();
    assert_eq!(value, json!({"name": "x", "tags": []}));
}

#[test]
fn test_normalization_is_deterministic() {
    let pairs: Vec<(String, String)> = (0..50).map(|i| (format!("k{i}"), format!("v{i}"))).collect();
    let refs: Vec<(&str, &str)> = pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    let object = tagged("x", &refs);

    let first = serialize_record(&object, "asset", &tagged_schema()).unwrap();
    let second = serialize_record(&object, "asset", &tagged_schema()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_scalars() {
    let object = Everything {
        values: vec![
            ("s", SourceValue::String("text")),
            ("e", SourceValue::Enum("ACTIVE")),
            ("i", SourceValue::Int(-3)),
            ("u", SourceValue::UInt(u64::MAX)),
            ("f", SourceValue::Float(1.5)),
            ("b", SourceValue::Bool(true)),
            ("t", SourceValue::Timestamp(Timestamp::new(10, 10))),
            ("n", SourceValue::Null),
        ],
    };
    let schema = vec![
        FieldSchema::new("s", FieldType::String),
        FieldSchema::new("e", FieldType::String),
        FieldSchema::new("i", FieldType::Integer),
        FieldSchema::new("u", FieldType::Integer),
        FieldSchema::new("f", FieldType::Float),
        FieldSchema::new("b", FieldType::Boolean),
        FieldSchema::new("t", FieldType::Timestamp),
        FieldSchema::new("n", FieldType::String),
    ];

    let value = normalize_record(&object, "obj", &schema).unwrap();
    assert_eq!(
        value,
        json!({
            "s": "text",
            "e": "ACTIVE",
            "i": -3,
            "u": u64::MAX,
            "f": 1.5,
            "b": true,
            "t": "1970-01-01T00:00:10Z",
        })
    );
}

#[test]
fn test_repeated_scalars_keep_order() {
    let field = FieldSchema::new("groups", FieldType::String).repeated();
    let value = normalize_one(
        SourceValue::List(vec![
            SourceValue::String("z"),
            SourceValue::String("a"),
            SourceValue::Null,
        ]),
        &field,
    )
    .unwrap();

    assert_eq!(value, Some(json!(["z", "a", null])));
}

#[test]
fn test_nested_records() {
    let inner = Everything {
        values: vec![("level", SourceValue::Enum("FIT"))],
    };
    let outer = Everything {
        values: vec![
            ("fit", SourceValue::Record(&inner)),
            ("missing", SourceValue::Null),
        ],
    };
    let schema = vec![
        FieldSchema::record("fit", vec![FieldSchema::new("level", FieldType::String)]),
        FieldSchema::record("missing", vec![FieldSchema::new("x", FieldType::String)]),
    ];

    let value = normalize_record(&outer, "insight", &schema).unwrap();
    assert_eq!(value, json!({"fit": {"level": "FIT"}}));
}

#[test]
fn test_type_mismatch_names_path() {
    let object = Everything {
        values: vec![("count", SourceValue::String("ten"))],
    };
    let schema = vec![FieldSchema::new("count", FieldType::Integer)];

    let err = normalize_record(&object, "asset", &schema).unwrap_err();
    assert_eq!(err.path(), "asset.count");
    assert_eq!(
        err.to_string(),
        "error serializing field asset.count: convert field of type string to integer"
    );
}

#[test]
fn test_map_value_error_names_key() {
    let object = Everything {
        values: vec![(
            "labels",
            SourceValue::Map(vec![("k", SourceValue::Bool(true))]),
        )],
    };
    let schema = vec![FieldSchema::map(
        "labels",
        FieldSchema::new("value", FieldType::String),
    )];

    let err = normalize_record(&object, "asset", &schema).unwrap_err();
    assert_eq!(err.path(), r#"asset.labels["k"]"#);
    assert!(err.to_string().starts_with(r#"error serializing field asset.labels["k"]: "#));
}

#[test]
fn test_list_element_error_names_index() {
    let object = Everything {
        values: vec![(
            "sizes",
            SourceValue::List(vec![SourceValue::Int(1), SourceValue::String("two")]),
        )],
    };
    let schema = vec![FieldSchema::new("sizes", FieldType::Integer).repeated()];

    let err = normalize_record(&object, "asset", &schema).unwrap_err();
    assert_eq!(err.path(), "asset.sizes[1]");
}

#[test]
fn test_invalid_map_schema() {
    let field = FieldSchema::record(
        "labels",
        vec![
            FieldSchema::new("name", FieldType::String),
            FieldSchema::new("value", FieldType::String),
        ],
    )
    .repeated();

    let err = normalize_one(SourceValue::Map(vec![]), &field).unwrap_err();
    assert_eq!(err.reason(), "schema for dynamic map is invalid");
}

#[test]
fn test_repeated_field_rejects_scalar() {
    let field = FieldSchema::new("tags", FieldType::String).repeated();
    let err = normalize_one(SourceValue::String("x"), &field).unwrap_err();
    assert!(err.reason().starts_with("schema does not match object"));
}

#[test]
fn test_non_finite_float_rejected() {
    let field = FieldSchema::new("peak", FieldType::Float);
    assert!(normalize_one(SourceValue::Float(f64::NAN), &field).is_err());
    assert!(normalize_one(SourceValue::Float(f64::INFINITY), &field).is_err());
}

#[test]
fn test_timestamp_requires_timestamp() {
    let field = FieldSchema::new("create_time", FieldType::Timestamp);
    let err = normalize_one(SourceValue::Int(10), &field).unwrap_err();
    assert_eq!(err.reason(), "convert field of type int64 to timestamp");

    let err = normalize_one(SourceValue::Timestamp(Timestamp::new(i64::MAX, 0)), &field)
        .unwrap_err();
    assert!(err.reason().contains("out of range"));
}

#[test]
fn test_record_serializer() {
    let serializer = RecordSerializer::new("group", tagged_schema());
    let line = serializer.serialize(&tagged("g", &[("k", "v")])).unwrap();

    assert_eq!(
        &line[..],
        b"{\"name\":\"g\",\"tags\":[{\"key\":\"k\",\"value\":\"v\"}]}\n"
    );
    assert_eq!(serializer.root(), "group");
}

#[test]
fn test_timestamp_serde() {
    let ts: Timestamp = serde_json::from_str("\"2023-05-01T10:00:00.5Z\"").unwrap();
    assert_eq!(ts.nanos, 500_000_000);
    assert_eq!(
        serde_json::to_string(&Timestamp::new(10, 0)).unwrap(),
        "\"1970-01-01T00:00:10+00:00\""
    );
}
