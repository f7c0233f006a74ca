//! Entity records, their table layout, and their sortable columns.

#[macro_use]
mod sort;
mod entities;
mod record;

pub use entities::*;
pub use record::{from_columns, to_columns, Column, Record};
pub use sort::{SortDirection, SortField, SortSpec};
