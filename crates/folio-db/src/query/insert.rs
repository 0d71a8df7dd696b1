use rusqlite::types::Value;
use tracing::debug;

use crate::{error::Result, expr::Col, store::Store};

pub struct InsertQuery<'s> {
    store: &'s dyn Store,
    table: String,
    columns: Vec<String>,
    values: Vec<Value>,
    on_conflict: Option<String>,
}

impl<'s> InsertQuery<'s> {
    pub fn into(store: &'s dyn Store, table: &str) -> Self {
        Self {
            store,
            table: table.to_string(),
            columns: vec![],
            values: vec![],
            on_conflict: None,
        }
    }

    pub fn set<T, V: Into<Value>>(mut self, col: Col<T>, value: V) -> Self {
        self.columns.push(col.name.to_string());
        self.values.push(value.into());
        self
    }

    pub fn on_conflict_update<T, U>(mut self, conflict_cols: &[Col<T>], update_cols: &[Col<U>]) -> Self {
        let conflict: Vec<&str> = conflict_cols.iter().map(|c| c.name).collect();
        let updates: Vec<String> = update_cols
            .iter()
            .map(|col| format!("{} = excluded.{}", col.name, col.name))
            .collect();
        self.on_conflict = Some(format!(
            "ON CONFLICT({}) DO UPDATE SET {}",
            conflict.join(", "),
            updates.join(", ")
        ));
        self
    }

    /// Runs the insert and returns the new row id.
    pub fn execute(self) -> Result<i64> {
        let (sql, params) = self.build_sql();
        debug!("insert: {sql}");
        let statement = self.store.prepare(&sql, params)?;
        self.store.insert(&statement)
    }

    pub(crate) fn build_sql(&self) -> (String, Vec<Value>) {
        let columns = self.columns.join(", ");
        let placeholders = vec!["?"; self.values.len()].join(", ");

        let mut sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table, columns, placeholders
        );

        if let Some(conflict) = &self.on_conflict {
            sql.push(' ');
            sql.push_str(conflict);
        }

        (sql, self.values.clone())
    }
}
