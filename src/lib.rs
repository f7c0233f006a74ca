//! Tutor admin: REST backend for a tutoring school's records, with sortable listings and
//! views enriched from referenced records.

pub mod accessor;
pub mod case;
pub mod config;
pub mod docs;
pub mod error;
pub mod handlers;
pub mod migration;
pub mod model;
pub mod response;
pub mod routes;
pub mod rules;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;
pub mod telemetry;

pub use accessor::{Accessor, MemoryStore, PgStore};
pub use config::{AppConfig, StoreBackend};
pub use error::{AppError, ConfigError};
pub use migration::apply_migrations;
pub use model::{Record, SortDirection, SortSpec};
pub use response::{success, success_many, Envelope};
pub use routes::{admin_routes, app, common_routes};
pub use service::{Composer, CrudService, View};
pub use state::AppState;
pub use store::ensure_database_exists;
pub use telemetry::init_tracing;
