//! Lenient projection of `appwrite.config.json` text into a [`SchemaDocument`].
//!
//! Only malformed JSON is an error. Missing arrays, missing fields and
//! values of the wrong shape fall back to empty or default values so a
//! document that is mid-edit still produces a diagram.

use serde_json::{Map, Value};

use super::types::{
    Column, ColumnKind, Database, OnDelete, RelationSide, RelationType, Relationship,
    SchemaDocument, Table,
};
use crate::compiler::CompileError;

/// Parse raw JSON text into a schema document.
///
/// # Errors
///
/// Returns [`CompileError::InvalidDocument`] if `raw` is not valid JSON.
pub fn parse(raw: &str) -> Result<SchemaDocument, CompileError> {
    let value: Value = serde_json::from_str(raw).map_err(CompileError::from)?;
    Ok(from_value(&value))
}

/// Project an already-parsed JSON value.
pub fn from_value(value: &Value) -> SchemaDocument {
    let databases = array_field(value, &["tablesDB", "databases"])
        .iter()
        .filter_map(Value::as_object)
        .map(database_from)
        .collect();

    let tables = array_field(value, &["tables"])
        .iter()
        .filter_map(|entry| {
            let table = entry.as_object();
            if table.is_none() {
                tracing::warn!("skipping non-object entry in tables");
            }
            table
        })
        .map(table_from)
        .collect();

    SchemaDocument { databases, tables }
}

/// Re-indent JSON text with two spaces, keeping key order.
///
/// # Errors
///
/// Returns [`CompileError::InvalidDocument`] if `raw` is not valid JSON.
pub fn format_source(raw: &str) -> Result<String, CompileError> {
    let value: Value = serde_json::from_str(raw).map_err(CompileError::from)?;
    serde_json::to_string_pretty(&value).map_err(CompileError::from)
}

fn database_from(obj: &Map<String, Value>) -> Database {
    Database {
        id: id_of(obj),
        name: string_field(obj, "name"),
        enabled: truthy(obj.get("enabled")),
    }
}

fn table_from(obj: &Map<String, Value>) -> Table {
    let columns = obj
        .get("columns")
        .and_then(Value::as_array)
        .map(|columns| {
            columns
                .iter()
                .filter_map(Value::as_object)
                .map(column_from)
                .collect()
        })
        .unwrap_or_default();

    Table {
        id: id_of(obj),
        database_id: string_field(obj, "databaseId"),
        name: string_field(obj, "name"),
        columns,
    }
}

/// Stand-in for a missing column type or key, keeping the attribute line valid.
const PLACEHOLDER: &str = "unknown";

fn column_from(obj: &Map<String, Value>) -> Column {
    let type_name = obj.get("type").and_then(Value::as_str).unwrap_or(PLACEHOLDER);
    let kind = if type_name == "relationship" {
        ColumnKind::Relationship(relationship_from(obj))
    } else {
        ColumnKind::scalar(type_name)
    };

    Column {
        key: obj
            .get("key")
            .and_then(Value::as_str)
            .filter(|key| !key.trim().is_empty())
            .unwrap_or(PLACEHOLDER)
            .to_string(),
        kind,
        required: truthy(obj.get("required")),
        array: truthy(obj.get("array")),
        encrypt: truthy(obj.get("encrypt")),
    }
}

fn relationship_from(obj: &Map<String, Value>) -> Relationship {
    let text = |key: &str| obj.get(key).and_then(Value::as_str);
    Relationship {
        related_table: obj.get("relatedTable").and_then(scalar_text),
        relation_type: text("relationType").map_or_else(RelationType::default, RelationType::parse),
        two_way: truthy(obj.get("twoWay")),
        two_way_key: text("twoWayKey").map(ToOwned::to_owned),
        on_delete: text("onDelete").map_or_else(OnDelete::default, OnDelete::parse),
        side: text("side").map_or_else(RelationSide::default, RelationSide::parse),
    }
}

/// First key in `keys` holding an array, or an empty slice.
fn array_field<'a>(value: &'a Value, keys: &[&str]) -> &'a [Value] {
    keys.iter()
        .find_map(|key| value.get(key).and_then(Value::as_array))
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Appwrite writes ids as `$id`; plain `id` is accepted too.
fn id_of(obj: &Map<String, Value>) -> String {
    ["$id", "id"]
        .iter()
        .find_map(|key| obj.get(*key).and_then(Value::as_str))
        .unwrap_or_default()
        .to_string()
}

fn string_field(obj: &Map<String, Value>, key: &str) -> String {
    obj.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// A truthy scalar as text; numbers and `true` are written as JSON.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(_) | Value::Bool(true) if truthy(Some(value)) => Some(value.to_string()),
        _ => None,
    }
}

/// JSON truthiness: absent, `null`, `false`, `0` and `""` are false.
fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}
