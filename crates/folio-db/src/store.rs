//! The storage interface consumed by the query builders.
//!
//! Builders render SQL text plus an ordered parameter list; a [`Store`]
//! validates the pair into a [`Statement`] and runs it.

use std::sync::Arc;

use folio_config::TableNames;
use rusqlite::types::Value;
use tracing::warn;

use crate::{
    error::{DbError, Result},
    value::value_to_json,
};

/// A validated statement: every `?` placeholder has exactly one parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    sql: String,
    params: Vec<Value>,
}

impl Statement {
    /// Pairs SQL text with its parameters, rejecting a count mismatch.
    pub fn checked(sql: impl Into<String>, params: Vec<Value>) -> Result<Self> {
        let sql = sql.into();
        let placeholders = count_placeholders(&sql);
        if placeholders != params.len() {
            return Err(DbError::ParameterMismatch {
                placeholders,
                parameters: params.len(),
            });
        }
        Ok(Self {
            sql,
            params,
        })
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }
}

/// Counts positional `?` placeholders outside quoted literals and identifiers.
pub fn count_placeholders(sql: &str) -> usize {
    let mut count = 0;
    let mut quote: Option<char> = None;

    for c in sql.chars() {
        match quote {
            // A doubled quote closes and reopens, which nets out the same.
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '\'' | '"' | '`' => quote = Some(c),
                '?' => count += 1,
                _ => {}
            },
        }
    }
    count
}

/// One result row: column names paired with values, in select order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            columns: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, name: impl Into<String>, value: Value) {
        self.columns.push((name.into(), value));
    }

    /// Returns the first column with the given name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, value)| value)
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            Value::Integer(i) => Some(*i),
            Value::Text(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Map<String, serde_json::Value> {
        self.iter()
            .map(|(name, value)| (name.to_string(), value_to_json(value)))
            .collect()
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().collect(),
        }
    }
}

/// Executes prepared statements against the content tables.
pub trait Store: Send + Sync {
    /// Resolved table names for this deployment.
    fn tables(&self) -> &TableNames;

    /// Validates SQL text against its parameters.
    fn prepare(&self, sql: &str, params: Vec<Value>) -> Result<Statement> {
        Statement::checked(sql, params)
    }

    /// Runs a row-returning statement.
    fn execute_query(&self, statement: &Statement) -> Result<Vec<Row>>;

    /// Runs a statement and returns the first column of the first row.
    fn execute_scalar(&self, statement: &Statement) -> Result<Value>;

    /// Runs a statement and returns the number of affected rows.
    fn execute(&self, statement: &Statement) -> Result<usize>;

    /// Runs an insert and returns the new row id.
    fn insert(&self, statement: &Statement) -> Result<i64>;

    /// Runs `work` inside `BEGIN IMMEDIATE` / `COMMIT`, rolling back when it
    /// fails. Transactions do not nest.
    fn transaction(&self, work: &mut dyn FnMut() -> Result<()>) -> Result<()> {
        self.execute(&self.prepare("BEGIN IMMEDIATE", Vec::new())?)?;
        match work() {
            Ok(()) => {
                self.execute(&self.prepare("COMMIT", Vec::new())?)?;
                Ok(())
            }
            Err(err) => {
                let rollback = self
                    .prepare("ROLLBACK", Vec::new())
                    .and_then(|statement| self.execute(&statement));
                if let Err(rollback_err) = rollback {
                    warn!("rollback failed: {rollback_err}");
                }
                Err(err)
            }
        }
    }
}

pub type StoreHandle = Arc<dyn Store>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_placeholders() {
        assert_eq!(count_placeholders("SELECT 1"), 0);
        assert_eq!(count_placeholders("a = ? AND b = ?"), 2);
        assert_eq!(count_placeholders("a = '?' AND b = ?"), 1);
        assert_eq!(count_placeholders("a = 'it''s ?' AND \"c?\" = ?"), 1);
    }

    #[test]
    fn test_statement_rejects_mismatch() {
        let result = Statement::checked("a = ? AND b = ?", vec![Value::Integer(1)]);
        assert!(matches!(
            result,
            Err(DbError::ParameterMismatch {
                placeholders: 2,
                parameters: 1
            })
        ));

        let statement = Statement::checked("a = ?", vec![Value::Integer(1)]).unwrap();
        assert_eq!(statement.sql(), "a = ?");
        assert_eq!(statement.params(), &[Value::Integer(1)]);
    }

    #[test]
    fn test_row_accessors() {
        let mut row = Row::new();
        row.push("ID", Value::Integer(7));
        row.push("post_title", Value::Text("Hello".into()));
        row.push("post_parent", Value::Text("3".into()));

        assert_eq!(row.len(), 3);
        assert_eq!(row.get_i64("ID"), Some(7));
        assert_eq!(row.get_i64("post_parent"), Some(3));
        assert_eq!(row.get_str("post_title"), Some("Hello"));
        assert_eq!(row.get("missing"), None);
        assert_eq!(
            row.columns().collect::<Vec<_>>(),
            vec!["ID", "post_title", "post_parent"]
        );

        let json = row.to_json();
        assert_eq!(json["ID"], serde_json::json!(7));
        assert_eq!(json.keys().next().map(String::as_str), Some("ID"));
    }
}
