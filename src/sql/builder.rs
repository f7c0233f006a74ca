//! Builds parameterized INSERT, SELECT, UPDATE, DELETE from a record's static layout.

use crate::model::{Record, SortField, SortSpec};
use serde_json::{Map, Value};

/// Quote identifier for PostgreSQL (safe: only from record definitions).
pub fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Full qualified table name.
pub fn qualified_table(schema: &str, table: &str) -> String {
    format!("{}.{}", quoted(schema), quoted(table))
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: Value) -> u32 {
        let n = self.params.len() as u32 + 1;
        self.params.push(v);
        n
    }
}

fn select_column_list<R: Record>() -> String {
    R::COLUMNS
        .iter()
        .map(|c| quoted(c.name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// ORDER BY the requested column, ties broken by the key ascending.
fn order_clause<R: Record>(sort: &SortSpec<R::Sort>) -> String {
    let column = sort.field.column();
    if column == R::KEY {
        format!(" ORDER BY {} {}", quoted(column), sort.direction.as_sql())
    } else {
        format!(
            " ORDER BY {} {}, {} ASC",
            quoted(column),
            sort.direction.as_sql(),
            quoted(R::KEY)
        )
    }
}

/// SELECT by primary key.
pub fn select_by_key<R: Record>(schema: &str, key: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = qualified_table(schema, R::TABLE);
    let n = q.push_param(Value::from(key));
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = ${}",
        select_column_list::<R>(),
        table,
        quoted(R::KEY),
        n
    );
    q
}

/// SELECT list with optional equality filters and ORDER BY from the sort spec.
/// Filters on columns outside `R::FILTERS` are skipped.
pub fn select_list<R: Record>(schema: &str, filters: &[(&str, i64)], sort: &SortSpec<R::Sort>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = qualified_table(schema, R::TABLE);

    let mut where_parts = Vec::new();
    for (col, val) in filters {
        if !R::FILTERS.iter().any(|f| *f == *col) {
            continue;
        }
        let param_num = q.push_param(Value::from(*val));
        where_parts.push(format!("{} = ${}::bigint", quoted(col), param_num));
    }
    let where_clause = if where_parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", where_parts.join(" AND "))
    };

    q.sql = format!(
        "SELECT {} FROM {}{}{}",
        select_column_list::<R>(),
        table,
        where_clause,
        order_clause::<R>(sort)
    );
    q
}

/// INSERT every non-key column from `body` (missing values bind NULL); RETURNING the new key.
pub fn insert<R: Record>(schema: &str, body: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = qualified_table(schema, R::TABLE);
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for c in R::COLUMNS.iter().filter(|c| c.name != R::KEY) {
        let val = body.get(c.name).cloned().unwrap_or(Value::Null);
        let param_num = q.push_param(val);
        cols.push(quoted(c.name));
        placeholders.push(format!("${}::{}", param_num, c.pg_type));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        table,
        cols.join(", "),
        placeholders.join(", "),
        quoted(R::KEY)
    );
    q
}

/// UPDATE by key, replacing every non-key column.
pub fn update<R: Record>(schema: &str, key: i64, body: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = qualified_table(schema, R::TABLE);
    let mut sets = Vec::new();
    for c in R::COLUMNS.iter().filter(|c| c.name != R::KEY) {
        let val = body.get(c.name).cloned().unwrap_or(Value::Null);
        let param_num = q.push_param(val);
        sets.push(format!("{} = ${}::{}", quoted(c.name), param_num, c.pg_type));
    }
    let id_param = q.push_param(Value::from(key));
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = ${} RETURNING {}",
        table,
        sets.join(", "),
        quoted(R::KEY),
        id_param,
        select_column_list::<R>()
    );
    q
}

/// DELETE by key, returning the removed row.
pub fn delete<R: Record>(schema: &str, key: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = qualified_table(schema, R::TABLE);
    let n = q.push_param(Value::from(key));
    q.sql = format!(
        "DELETE FROM {} WHERE {} = ${} RETURNING {}",
        table,
        quoted(R::KEY),
        n,
        select_column_list::<R>()
    );
    q
}
