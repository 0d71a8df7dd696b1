//! Core traits shared by the builders.

use rusqlite::types::Value;

use crate::{
    error::Result,
    expr::ops::{BinaryOp, LogicalOp},
    store::Row,
};

/// Something that renders to a SQL fragment with `?` placeholders.
///
/// `to_sql` appends the bound parameters, in placeholder order, to `params`.
///
/// ```rust
/// use folio_db::{expr::Col, traits::Expression as _};
///
/// let col = Col::<String>::new("meta_key");
/// let mut params = vec![];
/// let sql = col.eq("price".to_string()).to_sql(&mut params);
/// assert_eq!(sql, "meta_key = ?");
/// assert_eq!(params.len(), 1);
/// ```
pub trait Expression: Sized {
    fn to_sql(&self, params: &mut Vec<Value>) -> String;

    /// Creates a SQL `=` condition.
    fn eq<T: Into<Value>>(self, value: T) -> BinaryOp<Self> {
        BinaryOp::new(self, "=", value.into())
    }

    /// Creates a SQL `!=` condition.
    fn ne<T: Into<Value>>(self, value: T) -> BinaryOp<Self> {
        BinaryOp::new(self, "!=", value.into())
    }

    /// Combines two expressions with `AND`.
    fn and<E: Expression>(self, other: E) -> LogicalOp<Self, E> {
        LogicalOp::new(self, other, "AND")
    }
}

/// Conversion from a fetched [`Row`].
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> Result<Self>;
}

impl FromRow for Row {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(row.clone())
    }
}
