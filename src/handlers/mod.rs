//! HTTP handlers for entity CRUD and composed views.

pub mod entity;
pub use entity::*;
