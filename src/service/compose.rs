//! View Composer: one primary fetch, then per-record lookups that copy display fields from
//! referenced records onto each view.
//!
//! Records are enriched independently (in parallel up to the configured limit) but views come
//! back in primary fetch order. The first failed lookup aborts the whole composition; a partial
//! list is never returned.

use crate::accessor::{Accessor, Filter};
use crate::error::AppError;
use crate::model::{Record, SortSpec};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// A record plus denormalized fields derived from the records it references.
/// The derived fields are copies; changing them does not touch any stored record.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct View<R> {
    #[serde(flatten)]
    pub record: R,
    #[serde(flatten)]
    pub derived: Map<String, Value>,
}

impl<R> View<R> {
    pub fn derived_str(&self, name: &str) -> Option<&str> {
        self.derived.get(name).and_then(Value::as_str)
    }
}

/// One enrichment rule: follow a foreign key of `R` and add display fields to the view.
#[async_trait]
pub trait Enrichment<R: Record>: Send + Sync {
    /// Foreign key column the rule follows (for error context).
    fn field(&self) -> &'static str;

    async fn enrich(&self, record: &R, derived: &mut Map<String, Value>) -> Result<(), AppError>;
}

/// Resolve a foreign key through an accessor and copy named fields of the target.
/// An unset key (`None`) is skipped; a key with no target record is an error.
pub struct Lookup<R, T: Record> {
    field: &'static str,
    foreign_key: fn(&R) -> Option<i64>,
    accessor: Arc<dyn Accessor<T>>,
    copy: &'static [&'static str],
}

impl<R, T: Record> Lookup<R, T> {
    pub fn new(
        field: &'static str,
        foreign_key: fn(&R) -> Option<i64>,
        accessor: Arc<dyn Accessor<T>>,
        copy: &'static [&'static str],
    ) -> Self {
        Lookup {
            field,
            foreign_key,
            accessor,
            copy,
        }
    }
}

#[async_trait]
impl<R: Record, T: Record> Enrichment<R> for Lookup<R, T> {
    fn field(&self) -> &'static str {
        self.field
    }

    async fn enrich(&self, record: &R, derived: &mut Map<String, Value>) -> Result<(), AppError> {
        let Some(key) = (self.foreign_key)(record) else {
            return Ok(());
        };
        let target = self.accessor.fetch_by_key(key).await?;
        let Value::Object(fields) = serde_json::to_value(&target)? else {
            return Err(AppError::Internal(format!("{} is not an object", T::KIND)));
        };
        for name in self.copy {
            let value = fields
                .get(*name)
                .cloned()
                .ok_or_else(|| AppError::Internal(format!("{} has no field {}", T::KIND, name)))?;
            derived.insert((*name).to_string(), value);
        }
        Ok(())
    }
}

pub struct Composer<R: Record> {
    accessor: Arc<dyn Accessor<R>>,
    rules: Vec<Arc<dyn Enrichment<R>>>,
    concurrency: usize,
}

impl<R: Record> Composer<R> {
    pub fn new(accessor: Arc<dyn Accessor<R>>) -> Self {
        Composer {
            accessor,
            rules: Vec::new(),
            concurrency: 1,
        }
    }

    pub fn with_rule(mut self, rule: impl Enrichment<R> + 'static) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Max records enriched at once; 1 enriches sequentially.
    pub fn concurrency(mut self, limit: usize) -> Self {
        self.concurrency = limit.max(1);
        self
    }

    pub fn accessor(&self) -> &Arc<dyn Accessor<R>> {
        &self.accessor
    }

    pub async fn compose_list(&self, filters: &[Filter], sort: SortSpec<R::Sort>) -> Result<Vec<View<R>>, AppError> {
        let records = self.accessor.fetch_filtered(filters, sort).await?;
        self.compose_records(records).await
    }

    /// `NotFound` for a missing primary key; lookup failures come back as `Enrichment`.
    pub async fn compose_one(&self, key: i64) -> Result<View<R>, AppError> {
        let record = self.accessor.fetch_by_key(key).await?;
        enrich_one(&self.rules, record).await
    }

    pub async fn compose_records(&self, records: Vec<R>) -> Result<Vec<View<R>>, AppError> {
        if self.rules.is_empty() {
            return Ok(records
                .into_iter()
                .map(|record| View {
                    record,
                    derived: Map::new(),
                })
                .collect());
        }
        if self.concurrency <= 1 || records.len() <= 1 {
            let mut views = Vec::with_capacity(records.len());
            for record in records {
                views.push(enrich_one(&self.rules, record).await?);
            }
            return Ok(views);
        }

        let limit = Arc::new(Semaphore::new(self.concurrency));
        let rules = Arc::new(self.rules.clone());
        let mut joins = JoinSet::new();
        let n = records.len();
        for (idx, record) in records.into_iter().enumerate() {
            let rules = Arc::clone(&rules);
            let limit = Arc::clone(&limit);
            joins.spawn(async move {
                let _permit = limit
                    .acquire_owned()
                    .await
                    .map_err(|e| AppError::Internal(format!("enrichment limiter: {}", e)))?;
                enrich_one(&rules, record).await.map(|view| (idx, view))
            });
        }

        let mut slots: Vec<Option<View<R>>> = (0..n).map(|_| None).collect();
        while let Some(joined) = joins.join_next().await {
            let outcome = joined
                .map_err(|e| AppError::Internal(format!("enrichment task: {}", e)))
                .and_then(|r| r);
            match outcome {
                Ok((idx, view)) => slots[idx] = Some(view),
                Err(e) => {
                    joins.abort_all();
                    return Err(e);
                }
            }
        }
        slots
            .into_iter()
            .map(|slot| slot.ok_or_else(|| AppError::Internal("enrichment result missing".into())))
            .collect()
    }
}

async fn enrich_one<R: Record>(rules: &[Arc<dyn Enrichment<R>>], record: R) -> Result<View<R>, AppError> {
    let mut derived = Map::new();
    for rule in rules {
        if let Err(e) = rule.enrich(&record, &mut derived).await {
            tracing::warn!(
                kind = R::KIND,
                key = record.key(),
                field = rule.field(),
                error = %e,
                "enrichment failed"
            );
            return Err(AppError::Enrichment {
                kind: R::KIND,
                key: record.key(),
                field: rule.field(),
                source: Box::new(e),
            });
        }
    }
    Ok(View { record, derived })
}
