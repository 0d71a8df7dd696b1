use rusqlite::types::Value;
use tracing::debug;

use crate::{error::Result, query::clause::WhereClause, store::Store, traits::Expression};

pub struct DeleteQuery<'s> {
    store: &'s dyn Store,
    table: String,
    wheres: Vec<WhereClause>,
}

impl<'s> DeleteQuery<'s> {
    pub fn from(store: &'s dyn Store, table: &str) -> Self {
        Self {
            store,
            table: table.to_string(),
            wheres: Vec::new(),
        }
    }

    pub fn filter<Expr: Expression + Send + Sync + 'static>(mut self, expr: Expr) -> Self {
        self.wheres.push(WhereClause {
            sql_fn: Box::new(move |params| expr.to_sql(params)),
        });
        self
    }

    /// Runs the delete and returns the number of removed rows.
    pub fn execute(self) -> Result<usize> {
        let (sql, params) = self.build_sql();
        debug!("delete: {sql}");
        let statement = self.store.prepare(&sql, params)?;
        self.store.execute(&statement)
    }

    pub(crate) fn build_sql(&self) -> (String, Vec<Value>) {
        let mut params = Vec::new();
        let mut sql = format!("DELETE FROM {}", self.table);

        if !self.wheres.is_empty() {
            sql.push_str(" WHERE ");
            let conditions: Vec<String> =
                self.wheres.iter().map(|w| (w.sql_fn)(&mut params)).collect();
            sql.push_str(&conditions.join(" AND "));
        }

        (sql, params)
    }
}
