//! Clause building blocks shared by the builders.

use std::{fmt, str::FromStr};

use rusqlite::types::Value;

use crate::{
    error::{ConfigurationError, Result},
    value::FilterValue,
};

/// A WHERE clause represented as a closure that renders SQL and binds parameters.
pub(crate) struct WhereClause {
    pub sql_fn: Box<dyn Fn(&mut Vec<Value>) -> String + Send + Sync>,
}

/// An ORDER BY clause.
pub(crate) struct OrderClause {
    pub column: String,
    pub direction: SortDirection,
}

/// Comparison operator applied between a column and each filter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompareOp {
    #[default]
    Eq,
    NotEq,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    NotLike,
}

impl CompareOp {
    pub fn as_sql(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::NotEq => "!=",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
            CompareOp::Like => "LIKE",
            CompareOp::NotLike => "NOT LIKE",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for CompareOp {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "=" | "==" => Ok(CompareOp::Eq),
            "!=" | "<>" => Ok(CompareOp::NotEq),
            ">" => Ok(CompareOp::Gt),
            ">=" => Ok(CompareOp::Gte),
            "<" => Ok(CompareOp::Lt),
            "<=" => Ok(CompareOp::Lte),
            "LIKE" => Ok(CompareOp::Like),
            "NOT LIKE" => Ok(CompareOp::NotLike),
            _ => Err(ConfigurationError::UnknownOperator(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(ConfigurationError::UnknownOperator(s.to_string())),
        }
    }
}

/// Which clause a bound parameter belongs to.
///
/// Variants are declared in rendering order; parameters are emitted
/// category by category in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ParamCategory {
    Joins,
    Conditions,
    Having,
}

/// Renders `lhs op ?` for a scalar, or a parenthesised OR-group for a
/// collection, returning the fragment and its parameters in order.
pub(crate) fn comparison(
    lhs: &str,
    value: FilterValue,
    op: CompareOp,
    target: &str,
) -> Result<(String, Vec<Value>)> {
    match value {
        FilterValue::Scalar(value) => Ok((format!("{lhs} {op} ?"), vec![value])),
        FilterValue::Collection(values) if values.is_empty() => {
            Err(ConfigurationError::EmptyCollection(target.to_string()).into())
        }
        FilterValue::Collection(values) => {
            let parts: Vec<String> = values.iter().map(|_| format!("{lhs} {op} ?")).collect();
            Ok((format!("({})", parts.join(" OR ")), values))
        }
    }
}
