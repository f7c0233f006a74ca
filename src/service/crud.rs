//! Write paths: business rules, then reference checks, then the entity's accessor.

use crate::error::AppError;
use crate::model::Record;
use crate::rules::{Defaults, Prepare};
use crate::service::entity::AdminEntity;
use crate::state::Stores;

pub struct CrudService;

impl CrudService {
    /// Insert one record; returns the assigned key.
    pub async fn create<E: AdminEntity>(stores: &Stores, defaults: &Defaults, mut record: E) -> Result<i64, AppError> {
        record.prepare(defaults)?;
        record.check_references(stores).await?;
        let key = E::accessor(stores).insert(&record).await?;
        tracing::info!(kind = E::KIND, key, "created");
        Ok(key)
    }

    /// Full replace of one record's fields. Returns the stored record.
    pub async fn update<E: AdminEntity>(
        stores: &Stores,
        defaults: &Defaults,
        key: i64,
        mut record: E,
    ) -> Result<E, AppError> {
        record.prepare(defaults)?;
        record.set_key(key);
        record.check_references(stores).await?;
        E::accessor(stores).update(key, &record).await
    }

    /// Delete one record. Returns the deleted key as the receipt. Records that reference it
    /// are left in place.
    pub async fn delete<E: AdminEntity>(stores: &Stores, key: i64) -> Result<i64, AppError> {
        let removed = E::accessor(stores).delete(key).await?;
        tracing::info!(kind = E::KIND, key, "deleted");
        Ok(removed.key())
    }

    /// Update every record under its own key (all or nothing where the backend supports it).
    pub async fn bulk_update<E: AdminEntity>(
        stores: &Stores,
        defaults: &Defaults,
        mut records: Vec<E>,
    ) -> Result<Vec<E>, AppError> {
        for record in &mut records {
            record.prepare(defaults)?;
            record.check_references(stores).await?;
        }
        E::accessor(stores).update_many(&records).await
    }
}
