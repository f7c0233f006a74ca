//! Caller-chosen ordering. Sort fields are per-entity enums; raw names never reach storage.

use crate::case::fold_identifier;
use std::fmt::Debug;

/// Allow-list of sortable columns for one entity kind.
pub trait SortField: Copy + Debug + PartialEq + Send + Sync + 'static {
    const ALL: &'static [Self];
    /// The identifying key; used when no (or an unknown) field is requested.
    const NATURAL: Self;

    fn column(self) -> &'static str;

    /// Accepts the API name (`Sname`, `AQtime`) or the column name (`sname`, `aqtime`).
    fn parse(name: &str) -> Option<Self> {
        let wanted = fold_identifier(name.trim());
        Self::ALL.iter().copied().find(|f| fold_identifier(f.column()) == wanted)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Only the literal `desc` is descending.
    pub fn parse(s: &str) -> Self {
        if s == "desc" {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SortSpec<F: SortField> {
    pub field: F,
    pub direction: SortDirection,
}

impl<F: SortField> Default for SortSpec<F> {
    fn default() -> Self {
        SortSpec {
            field: F::NATURAL,
            direction: SortDirection::Asc,
        }
    }
}

impl<F: SortField> SortSpec<F> {
    pub fn new(field: F, direction: SortDirection) -> Self {
        SortSpec { field, direction }
    }

    /// Build from query-string values. An unknown field falls back to the natural key.
    pub fn parse(field: Option<&str>, direction: Option<&str>) -> Self {
        let field = match field.filter(|f| !f.is_empty()) {
            None => F::NATURAL,
            Some(name) => F::parse(name).unwrap_or_else(|| {
                tracing::debug!(sort_name = %name, "unknown sort field, using natural key");
                F::NATURAL
            }),
        };
        SortSpec {
            field,
            direction: direction.map(SortDirection::parse).unwrap_or_default(),
        }
    }
}

/// Declares a sort-field enum and its `SortField` impl.
macro_rules! sort_fields {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $column:literal),+ $(,)? }
        natural = $natural:ident
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq)]
        pub enum $name {
            $($variant),+
        }

        impl $crate::model::SortField for $name {
            const ALL: &'static [Self] = &[$($name::$variant),+];
            const NATURAL: Self = $name::$natural;

            fn column(self) -> &'static str {
                match self {
                    $($name::$variant => $column),+
                }
            }
        }
    };
}
