//! Record Store Accessor: single-entity persistence, one implementation per backend.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::error::AppError;
use crate::model::{Record, SortSpec};
use async_trait::async_trait;

/// Equality filter on an integer column from `Record::FILTERS`.
pub type Filter = (&'static str, i64);

/// Upper bound on records per `update_many` call.
pub const BULK_LIMIT: usize = 100;

pub(crate) fn check_bulk_limit(n: usize) -> Result<(), AppError> {
    if n > BULK_LIMIT {
        return Err(AppError::BadRequest(format!(
            "bulk update limited to {} items",
            BULK_LIMIT
        )));
    }
    Ok(())
}

/// CRUD over one entity kind. Errors are returned untouched; nothing is recovered here.
#[async_trait]
pub trait Accessor<R: Record>: Send + Sync {
    /// `NotFound` when no record has `key`.
    async fn fetch_by_key(&self, key: i64) -> Result<R, AppError>;

    /// Records matching every filter, in `sort` order (ties by key ascending).
    async fn fetch_filtered(&self, filters: &[Filter], sort: SortSpec<R::Sort>) -> Result<Vec<R>, AppError>;

    async fn fetch_all(&self, sort: SortSpec<R::Sort>) -> Result<Vec<R>, AppError> {
        self.fetch_filtered(&[], sort).await
    }

    /// Stores `record` under a freshly assigned key (the input key is ignored) and returns it.
    async fn insert(&self, record: &R) -> Result<i64, AppError>;

    /// Replaces every non-key field of `key`.
    async fn update(&self, key: i64, record: &R) -> Result<R, AppError>;

    /// Removes `key`, returning the record as it was.
    async fn delete(&self, key: i64) -> Result<R, AppError>;

    /// Updates each record under its own key. Not atomic unless the backend overrides it.
    async fn update_many(&self, records: &[R]) -> Result<Vec<R>, AppError> {
        check_bulk_limit(records.len())?;
        let mut out = Vec::with_capacity(records.len());
        for record in records {
            out.push(self.update(record.key(), record).await?);
        }
        Ok(out)
    }
}
