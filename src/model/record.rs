//! The `Record` trait: static table layout of one entity kind plus key access.

use crate::case::{fold_identifier, rename_keys, to_pascal_case, to_snake_case};
use crate::error::AppError;
use crate::model::SortField;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

/// One storage column. `pg_type` is used both for DDL and for parameter casts.
#[derive(Clone, Copy, Debug)]
pub struct Column {
    pub name: &'static str,
    pub pg_type: &'static str,
    pub nullable: bool,
}

impl Column {
    pub const fn new(name: &'static str, pg_type: &'static str) -> Self {
        Column {
            name,
            pg_type,
            nullable: false,
        }
    }

    pub const fn nullable(name: &'static str, pg_type: &'static str) -> Self {
        Column {
            name,
            pg_type,
            nullable: true,
        }
    }
}

/// A persisted entity with a single integer key.
///
/// `COLUMNS` lists the key first. Serialized field names fold to their column names (case and
/// underscores aside); [`Record::field_name`] gives the reverse mapping for decoded rows.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    type Sort: SortField;

    /// Human-readable kind, used in errors and logs.
    const KIND: &'static str;
    const TABLE: &'static str;
    const KEY: &'static str;
    const COLUMNS: &'static [Column];
    const UNIQUE: &'static [&'static str];
    /// Integer columns a list may be filtered on by equality.
    const FILTERS: &'static [&'static str] = &[];

    fn key(&self) -> i64;
    fn set_key(&mut self, key: i64);

    fn column(name: &str) -> Option<&'static Column> {
        Self::COLUMNS.iter().find(|c| c.name == name)
    }

    /// JSON field name of a column; PascalCase unless the record overrides it.
    fn field_name(column: &str) -> String {
        to_pascal_case(column)
    }
}

/// Column for a serialized field name, matched without regard to case or underscores.
fn column_name<R: Record>(field: &str) -> String {
    let folded = fold_identifier(field);
    R::COLUMNS
        .iter()
        .find(|c| fold_identifier(c.name) == folded)
        .map(|c| c.name.to_string())
        .unwrap_or_else(|| to_snake_case(field))
}

/// Serialize a record into a column-name keyed map.
pub fn to_columns<R: Record>(record: &R) -> Result<Map<String, Value>, AppError> {
    match serde_json::to_value(record)? {
        Value::Object(mut map) => {
            rename_keys(&mut map, column_name::<R>);
            Ok(map)
        }
        other => Err(AppError::Internal(format!(
            "{} did not serialize to an object: {}",
            R::KIND,
            other
        ))),
    }
}

/// Build a record from a column-name keyed map (a decoded row).
pub fn from_columns<R: Record>(mut map: Map<String, Value>) -> Result<R, AppError> {
    rename_keys(&mut map, R::field_name);
    Ok(serde_json::from_value(Value::Object(map))?)
}
