//! Services: write paths with business rules, and view composition for reads.

pub mod compose;
mod crud;
mod entity;
pub use compose::{Composer, Enrichment, Lookup, View};
pub use crud::CrudService;
pub use entity::AdminEntity;
