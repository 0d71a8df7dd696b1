//! Single-table SELECT builder, used for loading entities by id.

use rusqlite::types::Value;
use tracing::debug;

use crate::{
    error::Result,
    expr::column::Col,
    query::clause::{OrderClause, SortDirection, WhereClause},
    store::{Row, Store},
    traits::{Expression, FromRow},
};

/// ```rust
/// use folio_config::TableNames;
/// use folio_db::{schema::{create_schema, postmeta}, traits::Expression as _, SelectQuery, SqliteStore, Store};
///
/// let store = SqliteStore::open_in_memory(TableNames::default()).unwrap();
/// create_schema(&store).unwrap();
///
/// let rows = SelectQuery::from(&store, &store.tables().postmeta)
///     .filter(postmeta::POST_ID.eq(1))
///     .fetch()
///     .unwrap();
/// assert!(rows.is_empty());
/// ```
pub struct SelectQuery<'s> {
    store: &'s dyn Store,
    table: String,
    columns: Vec<String>,
    wheres: Vec<WhereClause>,
    orders: Vec<OrderClause>,
    limit: Option<u64>,
}

impl<'s> SelectQuery<'s> {
    pub fn from(store: &'s dyn Store, table: &str) -> Self {
        Self {
            store,
            table: table.to_string(),
            columns: vec![],
            wheres: vec![],
            orders: vec![],
            limit: None,
        }
    }

    /// Select specific columns from the table.
    pub fn select<T>(mut self, cols: &[Col<T>]) -> Self {
        self.columns.extend(cols.iter().map(|c| c.name.to_string()));
        self
    }

    /// Applies the WHERE condition.
    pub fn filter<Expr: Expression + Send + Sync + 'static>(mut self, expr: Expr) -> Self {
        self.wheres.push(WhereClause {
            sql_fn: Box::new(move |params| expr.to_sql(params)),
        });
        self
    }

    pub fn order_by<T>(mut self, col: Col<T>, direction: SortDirection) -> Self {
        self.orders.push(OrderClause {
            column: col.name.to_string(),
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn fetch(self) -> Result<Vec<Row>> {
        let (sql, params) = self.build_sql();
        debug!("select: {sql}");
        let statement = self.store.prepare(&sql, params)?;
        self.store.execute_query(&statement)
    }

    pub fn fetch_as<E: FromRow>(self) -> Result<Vec<E>> {
        self.fetch()?.iter().map(E::from_row).collect()
    }

    pub fn fetch_one(self) -> Result<Option<Row>> {
        let mut rows = self.limit(1).fetch()?;
        Ok(rows.pop())
    }

    pub(crate) fn build_sql(&self) -> (String, Vec<Value>) {
        let mut params = vec![];

        let select = if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns.join(", ")
        };

        let mut sql = format!("SELECT {} FROM {}", select, self.table);

        if !self.wheres.is_empty() {
            let conditions: Vec<String> =
                self.wheres.iter().map(|w| (w.sql_fn)(&mut params)).collect();
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }

        if !self.orders.is_empty() {
            let orders: Vec<String> = self
                .orders
                .iter()
                .map(|o| format!("{} {}", o.column, o.direction.as_sql()))
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&orders.join(", "));
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        (sql, params)
    }
}
