//! Create the schema and one table per entity kind. Idempotent (IF NOT EXISTS).
//! No foreign key constraints: references are checked on write by the service layer, and a
//! delete may leave one dangling.

use crate::error::AppError;
use crate::model::{AskQuestion, Admin, Campus, Exercise, OrderTeacher, Record, Student, Teacher};
use crate::sql::{qualified_table, quoted};
use sqlx::PgPool;

/// CREATE TABLE for one record kind. The key column is BIGSERIAL so keys are never reused.
pub fn table_ddl<R: Record>(schema: &str) -> String {
    let mut defs: Vec<String> = Vec::with_capacity(R::COLUMNS.len() + R::UNIQUE.len());
    for c in R::COLUMNS {
        if c.name == R::KEY {
            defs.push(format!("{} BIGSERIAL PRIMARY KEY", quoted(c.name)));
            continue;
        }
        let mut def = format!("{} {}", quoted(c.name), c.pg_type.to_uppercase());
        if !c.nullable {
            def.push_str(" NOT NULL");
        }
        defs.push(def);
    }
    for u in R::UNIQUE {
        defs.push(format!(
            "CONSTRAINT {} UNIQUE ({})",
            quoted(&format!("{}_{}_key", R::TABLE, u)),
            quoted(u)
        ));
    }
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
        qualified_table(schema, R::TABLE),
        defs.join(",\n    ")
    )
}

/// Equality filters are all foreign keys; index them.
fn filter_index_ddl<R: Record>(schema: &str) -> Vec<String> {
    R::FILTERS
        .iter()
        .map(|col| {
            format!(
                "CREATE INDEX IF NOT EXISTS {} ON {} ({})",
                quoted(&format!("{}_{}_idx", R::TABLE, col)),
                qualified_table(schema, R::TABLE),
                quoted(col)
            )
        })
        .collect()
}

async fn create<R: Record>(pool: &PgPool, schema: &str) -> Result<(), AppError> {
    sqlx::query(&table_ddl::<R>(schema)).execute(pool).await?;
    for ddl in filter_index_ddl::<R>(schema) {
        sqlx::query(&ddl).execute(pool).await?;
    }
    Ok(())
}

pub async fn apply_migrations(pool: &PgPool, schema: &str) -> Result<(), AppError> {
    sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", quoted(schema)))
        .execute(pool)
        .await?;
    create::<Campus>(pool, schema).await?;
    create::<Student>(pool, schema).await?;
    create::<Teacher>(pool, schema).await?;
    create::<Admin>(pool, schema).await?;
    create::<Exercise>(pool, schema).await?;
    create::<OrderTeacher>(pool, schema).await?;
    create::<AskQuestion>(pool, schema).await?;
    tracing::info!(schema = %schema, "migrations applied");
    Ok(())
}
