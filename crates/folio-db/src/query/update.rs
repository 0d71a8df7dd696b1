use rusqlite::types::Value;
use tracing::debug;

use crate::{error::Result, expr::Col, query::clause::WhereClause, store::Store, traits::Expression};

pub struct UpdateQuery<'s> {
    store: &'s dyn Store,
    table: String,
    updates: Vec<(String, Value)>,
    wheres: Vec<WhereClause>,
}

impl<'s> UpdateQuery<'s> {
    pub fn table(store: &'s dyn Store, table: &str) -> Self {
        Self {
            store,
            table: table.to_string(),
            updates: vec![],
            wheres: vec![],
        }
    }

    pub fn set<T, V: Into<Value>>(mut self, col: Col<T>, value: V) -> Self {
        self.updates.push((col.name.to_string(), value.into()));
        self
    }

    pub fn filter<Expr: Expression + Send + Sync + 'static>(mut self, expr: Expr) -> Self {
        self.wheres.push(WhereClause {
            sql_fn: Box::new(move |params| expr.to_sql(params)),
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    /// Runs the update and returns the number of affected rows.
    pub fn execute(self) -> Result<usize> {
        if self.updates.is_empty() {
            return Ok(0);
        }
        let (sql, params) = self.build_sql();
        debug!("update: {sql}");
        let statement = self.store.prepare(&sql, params)?;
        self.store.execute(&statement)
    }

    pub(crate) fn build_sql(&self) -> (String, Vec<Value>) {
        let mut params = Vec::new();

        let sets: Vec<String> = self
            .updates
            .iter()
            .map(|(col, val)| {
                params.push(val.clone());
                format!("{} = ?", col)
            })
            .collect();

        let mut sql = format!("UPDATE {} SET {}", self.table, sets.join(", "));

        if !self.wheres.is_empty() {
            sql.push_str(" WHERE ");
            let conditions: Vec<String> =
                self.wheres.iter().map(|w| (w.sql_fn)(&mut params)).collect();
            sql.push_str(&conditions.join(" AND "));
        }

        (sql, params)
    }
}
