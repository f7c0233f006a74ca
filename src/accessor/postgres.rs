//! PostgreSQL store: statements from the SQL builder, rows decoded through JSON into records.

use crate::accessor::{check_bulk_limit, Accessor, Filter};
use crate::error::AppError;
use crate::model::{from_columns, to_columns, Record, SortSpec};
use crate::sql::{self, PgBindValue, QueryBuf};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::{PgPool, Postgres};
use std::marker::PhantomData;

pub struct PgStore<R> {
    pool: PgPool,
    schema: String,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for PgStore<R> {
    fn clone(&self) -> Self {
        PgStore {
            pool: self.pool.clone(),
            schema: self.schema.clone(),
            _record: PhantomData,
        }
    }
}

impl<R: Record> PgStore<R> {
    pub fn new(pool: PgPool, schema: impl Into<String>) -> Self {
        PgStore {
            pool,
            schema: schema.into(),
            _record: PhantomData,
        }
    }

    fn bind(q: &QueryBuf) -> sqlx::query::Query<'_, Postgres, PgArguments> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        query
    }

    async fn fetch_optional(&self, q: &QueryBuf) -> Result<Option<R>, AppError> {
        let row = Self::bind(q)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from_db)?;
        row.map(|r| from_columns(row_to_json(&r))).transpose()
    }
}

#[async_trait]
impl<R: Record> Accessor<R> for PgStore<R> {
    async fn fetch_by_key(&self, key: i64) -> Result<R, AppError> {
        let q = sql::select_by_key::<R>(&self.schema, key);
        self.fetch_optional(&q)
            .await?
            .ok_or_else(|| AppError::not_found(R::KIND, key))
    }

    async fn fetch_filtered(&self, filters: &[Filter], sort: SortSpec<R::Sort>) -> Result<Vec<R>, AppError> {
        let q = sql::select_list::<R>(&self.schema, filters, &sort);
        let rows = Self::bind(&q)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::from_db)?;
        rows.iter().map(|r| from_columns(row_to_json(r))).collect()
    }

    async fn insert(&self, record: &R) -> Result<i64, AppError> {
        let q = sql::insert::<R>(&self.schema, &to_columns(record)?);
        let row = Self::bind(&q)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::from_db)?;
        use sqlx::Row;
        row.try_get::<i64, _>(R::KEY).map_err(AppError::from_db)
    }

    async fn update(&self, key: i64, record: &R) -> Result<R, AppError> {
        let q = sql::update::<R>(&self.schema, key, &to_columns(record)?);
        self.fetch_optional(&q)
            .await?
            .ok_or_else(|| AppError::not_found(R::KIND, key))
    }

    async fn delete(&self, key: i64) -> Result<R, AppError> {
        let q = sql::delete::<R>(&self.schema, key);
        self.fetch_optional(&q)
            .await?
            .ok_or_else(|| AppError::not_found(R::KIND, key))
    }

    /// Bulk update in a transaction; any failure rolls every row back.
    async fn update_many(&self, records: &[R]) -> Result<Vec<R>, AppError> {
        check_bulk_limit(records.len())?;
        let mut out = Vec::with_capacity(records.len());
        let mut tx = self.pool.begin().await.map_err(AppError::from_db)?;
        for record in records {
            let key = record.key();
            let q = sql::update::<R>(&self.schema, key, &to_columns(record)?);
            let row = Self::bind(&q)
                .fetch_optional(&mut *tx)
                .await
                .map_err(AppError::from_db)?
                .ok_or_else(|| AppError::not_found(R::KIND, key))?;
            out.push(from_columns(row_to_json(&row))?);
        }
        tx.commit().await.map_err(AppError::from_db)?;
        Ok(out)
    }
}

fn row_to_json(row: &PgRow) -> serde_json::Map<String, Value> {
    use sqlx::Column;
    use sqlx::Row;
    let mut map = serde_json::Map::new();
    for col in row.columns() {
        let name = col.name();
        map.insert(name.to_string(), cell_to_value(row, name));
    }
    map
}

/// Record columns are integer, bigint, timestamptz or text; anything else decodes as null.
fn cell_to_value(row: &PgRow, name: &str) -> Value {
    use sqlx::Row;
    if let Ok(Some(n)) = row.try_get::<Option<i32>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(d)) = row.try_get::<Option<DateTime<Utc>>, _>(name) {
        return timestamp_value(d);
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        return Value::String(s);
    }
    Value::Null
}

fn timestamp_value(d: DateTime<Utc>) -> Value {
    Value::String(d.to_rfc3339())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AskQuestion, Student};
    use chrono::TimeZone;
    use serde_json::json;

    fn row(value: Value) -> serde_json::Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn decoded_timestamp_row_builds_a_record() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap();
        let q: AskQuestion = from_columns(row(json!({
            "aqid": 4,
            "sid": 1,
            "tid": 2,
            "eid": 3,
            "aqtime": timestamp_value(at),
            "aqremark": "help",
        })))
        .unwrap();
        assert_eq!(q.aqid, 4);
        assert_eq!(q.aqtime, at);
        assert_eq!(q.aqremark, "help");
    }

    #[test]
    fn decoded_integer_and_nullable_bigint_build_a_record() {
        let base = json!({
            "sid": 7,
            "sname": "amy",
            "snickname": "Amy",
            "sgrade": 8,
            "sgrade_name": "初二",
            "sicon": "a.png",
            "sphone": "",
            "cid": null,
        });
        let s: Student = from_columns(row(base.clone())).unwrap();
        assert_eq!(s.sgrade, 8);
        assert_eq!(s.sgrade_name, "初二");
        assert_eq!(s.cid, None);

        let mut with_campus = row(base);
        with_campus.insert("cid".into(), json!(3));
        let s: Student = from_columns(with_campus).unwrap();
        assert_eq!(s.cid, Some(3));
    }

    #[test]
    fn encoded_record_decodes_to_itself() {
        let q = AskQuestion {
            aqid: 2,
            sid: 1,
            tid: 1,
            eid: 1,
            aqtime: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
            aqremark: "why".into(),
        };
        let back: AskQuestion = from_columns(to_columns(&q).unwrap()).unwrap();
        assert_eq!(back, q);
    }
}
