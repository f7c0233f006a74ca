//! In-process store: a key-ordered map behind an async RwLock.

use crate::accessor::{check_bulk_limit, Accessor, Filter};
use crate::error::AppError;
use crate::model::{to_columns, Column, Record, SortDirection, SortField, SortSpec};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

struct Inner<R> {
    rows: BTreeMap<i64, R>,
    /// Keys are handed out once; deleted keys are never reissued.
    next_key: i64,
}

pub struct MemoryStore<R: Record> {
    inner: RwLock<Inner<R>>,
}

impl<R: Record> Default for MemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> MemoryStore<R> {
    pub fn new() -> Self {
        MemoryStore {
            inner: RwLock::new(Inner {
                rows: BTreeMap::new(),
                next_key: 1,
            }),
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.rows.is_empty()
    }
}

/// Ordering key for one cell. Variant order puts NULL last, as PostgreSQL does for ASC.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum SortValue {
    Int(i64),
    Time(DateTime<Utc>),
    Text(String),
    Null,
}

fn sort_value(v: Option<&Value>, column: &Column) -> SortValue {
    match v {
        None | Some(Value::Null) => SortValue::Null,
        Some(Value::Number(n)) => SortValue::Int(n.as_i64().unwrap_or_default()),
        Some(Value::String(s)) if column.pg_type == "timestamptz" => DateTime::parse_from_rfc3339(s)
            .map(|d| SortValue::Time(d.with_timezone(&Utc)))
            .unwrap_or_else(|_| SortValue::Text(s.clone())),
        Some(Value::String(s)) => SortValue::Text(s.clone()),
        Some(other) => SortValue::Text(other.to_string()),
    }
}

fn unique_conflict<R: Record>(
    rows: &BTreeMap<i64, R>,
    candidate: &Map<String, Value>,
    skip_key: Option<i64>,
) -> Result<(), AppError> {
    for column in R::UNIQUE {
        let Some(value) = candidate.get(*column) else { continue };
        for (key, existing) in rows {
            if Some(*key) == skip_key {
                continue;
            }
            let existing = to_columns(existing)?;
            if existing.get(*column) == Some(value) {
                return Err(AppError::ConstraintViolation(format!(
                    "duplicate {}.{}: {}",
                    R::TABLE,
                    column,
                    value
                )));
            }
        }
    }
    Ok(())
}

#[async_trait]
impl<R: Record> Accessor<R> for MemoryStore<R> {
    async fn fetch_by_key(&self, key: i64) -> Result<R, AppError> {
        let inner = self.inner.read().await;
        inner
            .rows
            .get(&key)
            .cloned()
            .ok_or_else(|| AppError::not_found(R::KIND, key))
    }

    async fn fetch_filtered(&self, filters: &[Filter], sort: SortSpec<R::Sort>) -> Result<Vec<R>, AppError> {
        let filters: Vec<&Filter> = filters
            .iter()
            .filter(|(col, _)| R::FILTERS.contains(col))
            .collect();
        let column = R::column(sort.field.column())
            .ok_or_else(|| AppError::Internal(format!("{} has no column {}", R::KIND, sort.field.column())))?;

        let inner = self.inner.read().await;
        let mut keyed = Vec::with_capacity(inner.rows.len());
        for (key, record) in &inner.rows {
            let cols = to_columns(record)?;
            let matches = filters
                .iter()
                .all(|(col, val)| cols.get(*col) == Some(&Value::from(*val)));
            if matches {
                keyed.push((sort_value(cols.get(column.name), column), *key, record.clone()));
            }
        }
        drop(inner);

        keyed.sort_by(|a, b| {
            let by_field = match sort.direction {
                SortDirection::Asc => a.0.cmp(&b.0),
                SortDirection::Desc => b.0.cmp(&a.0),
            };
            match by_field {
                Ordering::Equal => a.1.cmp(&b.1),
                other => other,
            }
        });
        Ok(keyed.into_iter().map(|(_, _, r)| r).collect())
    }

    async fn insert(&self, record: &R) -> Result<i64, AppError> {
        let mut inner = self.inner.write().await;
        unique_conflict(&inner.rows, &to_columns(record)?, None)?;
        let key = inner.next_key;
        inner.next_key += 1;
        let mut stored = record.clone();
        stored.set_key(key);
        inner.rows.insert(key, stored);
        Ok(key)
    }

    async fn update(&self, key: i64, record: &R) -> Result<R, AppError> {
        let mut inner = self.inner.write().await;
        if !inner.rows.contains_key(&key) {
            return Err(AppError::not_found(R::KIND, key));
        }
        unique_conflict(&inner.rows, &to_columns(record)?, Some(key))?;
        let mut stored = record.clone();
        stored.set_key(key);
        inner.rows.insert(key, stored.clone());
        Ok(stored)
    }

    async fn delete(&self, key: i64) -> Result<R, AppError> {
        let mut inner = self.inner.write().await;
        inner
            .rows
            .remove(&key)
            .ok_or_else(|| AppError::not_found(R::KIND, key))
    }

    /// All-or-nothing: every key and uniqueness constraint is checked before anything is written.
    async fn update_many(&self, records: &[R]) -> Result<Vec<R>, AppError> {
        check_bulk_limit(records.len())?;
        let mut inner = self.inner.write().await;
        let mut staged = inner.rows.clone();
        let mut out = Vec::with_capacity(records.len());
        for record in records {
            let key = record.key();
            if !staged.contains_key(&key) {
                return Err(AppError::not_found(R::KIND, key));
            }
            unique_conflict(&staged, &to_columns(record)?, Some(key))?;
            staged.insert(key, record.clone());
            out.push(record.clone());
        }
        inner.rows = staged;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_sorts_after_values() {
        let col = Column::nullable("cid", "bigint");
        assert!(sort_value(Some(&Value::from(5)), &col) < sort_value(None, &col));
        assert!(sort_value(Some(&Value::from(5)), &col) < sort_value(Some(&Value::Null), &col));
    }

    #[test]
    fn timestamps_compare_chronologically() {
        let col = Column::new("ottime", "timestamptz");
        let whole = sort_value(Some(&Value::from("2024-03-01T10:00:00Z")), &col);
        let fractional = sort_value(Some(&Value::from("2024-03-01T10:00:00.500Z")), &col);
        assert!(whole < fractional);
    }
}
