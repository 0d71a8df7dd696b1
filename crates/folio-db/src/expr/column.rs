//! Represents a typed database column.
//!
//! `Col<T>` ties a column name to a Rust type `T`. It implements
//! [`Expression`], so it can be used directly in filters.

use std::marker::PhantomData;

use rusqlite::types::Value;

use crate::traits::Expression;

/// A typed reference to a database column.
///
/// The type parameter is documentation only; it is not enforced when reading
/// rows back.
///
/// ```rust
/// use folio_db::expr::Col;
/// const TITLE: Col<String> = Col::new("post_title");
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Col<T> {
    pub name: &'static str,
    _type: PhantomData<T>,
}

impl<T> Col<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _type: PhantomData,
        }
    }
}

impl<T> Expression for Col<T> {
    fn to_sql(&self, _params: &mut Vec<Value>) -> String {
        self.name.to_string()
    }
}
