//! The query builders.
//!
//! - [`ContentQuery`] lists content rows with key/value attribute filters,
//!   a count, and paging.
//! - [`SelectQuery`], [`InsertQuery`], [`UpdateQuery`] and [`DeleteQuery`]
//!   are single-table builders used to load and persist entities.
//!
//! Every builder renders SQL with `?` placeholders plus an ordered
//! parameter list, which a [`crate::Store`] validates and runs.

pub mod clause;
pub mod content;
pub mod delete;
pub mod insert;
pub mod select;
pub mod update;

pub use clause::{CompareOp, ParamCategory, SortDirection};
pub use content::{ContentQuery, ExecutedStatements, QueryOptions, BASE_ALIAS};
pub use delete::DeleteQuery;
pub use insert::InsertQuery;
pub use select::SelectQuery;
pub use update::UpdateQuery;
