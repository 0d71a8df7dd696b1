//! The content listing query.
//!
//! [`ContentQuery`] accumulates filters over the base content table and its
//! key/value attribute table, then renders two statements that share one
//! FROM..HAVING body: a paged search and an unpaged count.
//!
//! Every value is bound through a `?` placeholder. Parameters are kept per
//! [`ParamCategory`] and emitted joins first, then conditions, then having,
//! which is the order their placeholders appear in the rendered SQL.

use std::{collections::BTreeMap, fmt};

use folio_config::QueryConfig;
use rusqlite::types::Value;
use tracing::{debug, trace};

use crate::{
    alias::{AliasGenerator, DEFAULT_ALIAS_LENGTH},
    error::{ConfigurationError, DbError, Result},
    query::clause::{comparison, CompareOp, ParamCategory, SortDirection},
    schema::{postmeta, PostColumn},
    store::{count_placeholders, Row, Statement, Store, StoreHandle},
    value::FilterValue,
};

/// Alias of the base content table in every rendered statement.
pub const BASE_ALIAS: &str = "p";

/// Seed state for a new [`ContentQuery`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    /// Status condition seeded into every query. `None` lists every status.
    pub status: Option<String>,
    pub offset: u64,
    pub limit: u64,
    pub alias_length: usize,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            status: Some("publish".to_string()),
            offset: 0,
            limit: 15,
            alias_length: DEFAULT_ALIAS_LENGTH,
        }
    }
}

impl QueryOptions {
    pub fn from_config(config: &QueryConfig) -> Self {
        Self {
            status: Some(config.published_status.clone()),
            offset: 0,
            limit: config.per_page,
            alias_length: config.alias_length,
        }
    }

    /// Drops the seeded status condition.
    pub fn any_status(mut self) -> Self {
        self.status = None;
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

/// Statements issued by the most recent execution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutedStatements {
    pub count: Option<Statement>,
    pub search: Option<Statement>,
}

pub struct ContentQuery {
    store: StoreHandle,
    selects: Vec<String>,
    joins: Vec<String>,
    conditions: Vec<String>,
    having: Vec<String>,
    orderbys: Vec<String>,
    limits: (u64, u64),
    parameters: BTreeMap<ParamCategory, Vec<Value>>,
    aliases: AliasGenerator,
    results: Vec<Row>,
    total_count: u64,
    statements: ExecutedStatements,
}

impl fmt::Debug for ContentQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentQuery")
            .field("selects", &self.selects)
            .field("joins", &self.joins)
            .field("conditions", &self.conditions)
            .field("having", &self.having)
            .field("orderbys", &self.orderbys)
            .field("limits", &self.limits)
            .field("parameters", &self.parameters)
            .field("total_count", &self.total_count)
            .field("statements", &self.statements)
            .finish_non_exhaustive()
    }
}

impl ContentQuery {
    pub fn new(store: StoreHandle) -> Self {
        Self::with_options(store, QueryOptions::default())
    }

    pub fn with_options(store: StoreHandle, options: QueryOptions) -> Self {
        let aliases = AliasGenerator::new(options.alias_length);
        Self::build(store, options, aliases)
    }

    /// Like [`ContentQuery::with_options`], with reproducible join aliases.
    pub fn seeded(store: StoreHandle, options: QueryOptions, seed: u64) -> Self {
        let aliases = AliasGenerator::seeded(options.alias_length, seed);
        Self::build(store, options, aliases)
    }

    fn build(store: StoreHandle, options: QueryOptions, aliases: AliasGenerator) -> Self {
        let mut query = Self {
            store,
            selects: vec![format!("{BASE_ALIAS}.*")],
            joins: vec![],
            conditions: vec![],
            having: vec![],
            orderbys: vec![],
            limits: (options.offset, options.limit),
            parameters: BTreeMap::new(),
            aliases,
            results: vec![],
            total_count: 0,
            statements: ExecutedStatements::default(),
        };

        if let Some(status) = options.status {
            query
                .conditions
                .push(format!("{BASE_ALIAS}.{} = ?", PostColumn::Status));
            query.bind(ParamCategory::Conditions, vec![Value::Text(status)]);
        }
        query
    }

    pub fn store(&self) -> &StoreHandle {
        &self.store
    }

    /// Restricts the content type.
    pub fn filter_by_type(&mut self, values: impl Into<FilterValue>) -> Result<&mut Self> {
        self.filter_by_type_with(values, CompareOp::Eq)
    }

    pub fn filter_by_type_with(
        &mut self,
        values: impl Into<FilterValue>,
        op: CompareOp,
    ) -> Result<&mut Self> {
        self.filter_by_attribute_with(PostColumn::Type, values, op)
    }

    /// Filters on a base table column.
    pub fn filter_by_attribute(
        &mut self,
        column: PostColumn,
        values: impl Into<FilterValue>,
    ) -> Result<&mut Self> {
        self.filter_by_attribute_with(column, values, CompareOp::Eq)
    }

    pub fn filter_by_attribute_with(
        &mut self,
        column: PostColumn,
        values: impl Into<FilterValue>,
        op: CompareOp,
    ) -> Result<&mut Self> {
        let lhs = format!("{BASE_ALIAS}.{column}");
        let (fragment, params) = comparison(&lhs, values.into(), op, column.as_str())?;
        self.add_condition(fragment, params);
        Ok(self)
    }

    /// Filters on a key/value attribute. Each call adds its own join, so
    /// filtering the same key twice constrains two independent rows.
    ///
    /// A `%` in `key` matches keys by pattern instead of equality. Integer
    /// and real values compare numerically; text compares as text.
    pub fn filter_by_field(
        &mut self,
        key: &str,
        values: impl Into<FilterValue>,
    ) -> Result<&mut Self> {
        self.filter_by_field_with(key, values, CompareOp::Eq)
    }

    pub fn filter_by_field_with(
        &mut self,
        key: &str,
        values: impl Into<FilterValue>,
        op: CompareOp,
    ) -> Result<&mut Self> {
        let values = values.into();
        let alias = self.aliases.next_alias();
        // meta_value is TEXT; numbers compare numerically only after a cast
        let lhs = if values.is_numeric() {
            format!("CAST({alias}.{} AS REAL)", postmeta::META_VALUE.name)
        } else {
            format!("{alias}.{}", postmeta::META_VALUE.name)
        };
        let (fragment, params) = comparison(&lhs, values, op, key)?;

        self.add_field_join(&alias, key);
        self.add_condition(fragment, params);
        Ok(self)
    }

    /// Replaces the selected columns. An empty list selects every base column.
    pub fn select_columns(&mut self, columns: &[PostColumn]) -> &mut Self {
        self.selects = if columns.is_empty() {
            vec![format!("{BASE_ALIAS}.*")]
        } else {
            columns
                .iter()
                .map(|column| format!("{BASE_ALIAS}.{column}"))
                .collect()
        };
        self
    }

    /// Adds a HAVING fragment. Its `?` placeholders must match `params`.
    pub fn having(&mut self, fragment: &str, params: Vec<Value>) -> Result<&mut Self> {
        let placeholders = count_placeholders(fragment);
        if placeholders != params.len() {
            return Err(ConfigurationError::InvalidFragment {
                fragment: fragment.to_string(),
                placeholders,
                parameters: params.len(),
            }
            .into());
        }
        self.having.push(fragment.to_string());
        self.bind(ParamCategory::Having, params);
        Ok(self)
    }

    pub fn order_by(&mut self, column: PostColumn, direction: SortDirection) -> &mut Self {
        self.orderbys.push(format!(
            "{BASE_ALIAS}.{column} {}",
            direction.as_sql()
        ));
        self
    }

    /// Sorts on a key/value attribute, compared as text.
    pub fn order_by_field(&mut self, key: &str, direction: SortDirection) -> &mut Self {
        let alias = self.aliases.next_alias();
        self.add_field_join(&alias, key);
        self.orderbys.push(format!(
            "{alias}.{} {}",
            postmeta::META_VALUE.name,
            direction.as_sql()
        ));
        self
    }

    /// Sorts on a key/value attribute, compared as a number.
    pub fn order_by_field_numeric(&mut self, key: &str, direction: SortDirection) -> &mut Self {
        let alias = self.aliases.next_alias();
        self.add_field_join(&alias, key);
        self.orderbys.push(format!(
            "CAST({alias}.{} AS REAL) {}",
            postmeta::META_VALUE.name,
            direction.as_sql()
        ));
        self
    }

    /// Sets the result window for the search statement.
    pub fn limit(&mut self, offset: u64, count: u64) -> &mut Self {
        self.limits = (offset, count);
        self
    }

    /// Sets the window to a one-based page.
    pub fn page(&mut self, page: u64, per_page: u64) -> &mut Self {
        let offset = page.saturating_sub(1).saturating_mul(per_page);
        self.limit(offset, per_page)
    }

    pub fn window(&self) -> (u64, u64) {
        self.limits
    }

    /// All bound parameters, in placeholder order.
    pub fn parameters(&self) -> Vec<Value> {
        self.parameters.values().flatten().cloned().collect()
    }

    /// The paged search statement.
    pub fn search_sql(&self) -> (String, Vec<Value>) {
        let mut sql = format!("SELECT {} {}", self.selects.join(", "), self.body());
        if !self.orderbys.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.orderbys.join(", "));
        }
        sql.push_str(&format!(" LIMIT {},{}", self.limits.0, self.limits.1));
        (sql, self.parameters())
    }

    /// The count statement. It wraps the same body as [`Self::search_sql`]
    /// without ordering or window, so it counts every matching row.
    pub fn count_sql(&self) -> (String, Vec<Value>) {
        let sql = format!(
            "SELECT COUNT(*) FROM (SELECT {} {}) AS subquery",
            self.selects.join(", "),
            self.body()
        );
        (sql, self.parameters())
    }

    /// Runs the count, then the search.
    pub fn execute(&mut self) -> Result<&mut Self> {
        self.count()?;
        self.search()
    }

    pub fn count(&mut self) -> Result<&mut Self> {
        let (sql, params) = self.count_sql();
        let statement = self.store.prepare(&sql, params)?;
        debug!("count: {}", statement.sql());

        let total = match self.store.execute_scalar(&statement)? {
            Value::Integer(n) if n >= 0 => n as u64,
            other => return Err(DbError::UnexpectedScalar(format!("{other:?}"))),
        };
        trace!("count matched {total} rows");

        self.total_count = total;
        self.statements.count = Some(statement);
        Ok(self)
    }

    pub fn search(&mut self) -> Result<&mut Self> {
        let (sql, params) = self.search_sql();
        let statement = self.store.prepare(&sql, params)?;
        debug!("search: {}", statement.sql());

        self.results = self.store.execute_query(&statement)?;
        trace!("search returned {} rows", self.results.len());

        self.statements.search = Some(statement);
        Ok(self)
    }

    pub fn results(&self) -> &[Row] {
        &self.results
    }

    pub fn into_results(self) -> Vec<Row> {
        self.results
    }

    pub fn first(&self) -> Option<&Row> {
        self.results.first()
    }

    pub fn last(&self) -> Option<&Row> {
        self.results.last()
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    /// Number of pages of the current window size.
    pub fn total_pages(&self) -> u64 {
        match self.limits.1 {
            0 => 0,
            per_page => self.total_count.div_ceil(per_page),
        }
    }

    pub fn last_statements(&self) -> &ExecutedStatements {
        &self.statements
    }

    fn body(&self) -> String {
        let mut sql = format!("FROM {} AS {BASE_ALIAS}", self.store.tables().posts);
        for join in &self.joins {
            sql.push(' ');
            sql.push_str(join);
        }
        if !self.conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.conditions.join(" AND "));
        }
        sql.push_str(&format!(" GROUP BY {BASE_ALIAS}.{}", PostColumn::Id));
        if !self.having.is_empty() {
            sql.push_str(" HAVING ");
            sql.push_str(&self.having.join(" AND "));
        }
        sql
    }

    fn add_field_join(&mut self, alias: &str, key: &str) {
        let key_op = if key.contains('%') {
            CompareOp::Like
        } else {
            CompareOp::Eq
        };
        self.joins.push(format!(
            "LEFT JOIN {meta} AS {alias} ON ({alias}.{post_id} = {BASE_ALIAS}.{id} AND {alias}.{meta_key} {key_op} ?)",
            meta = self.store.tables().postmeta,
            post_id = postmeta::POST_ID.name,
            id = PostColumn::Id,
            meta_key = postmeta::META_KEY.name,
        ));
        self.bind(ParamCategory::Joins, vec![Value::Text(key.to_string())]);
    }

    fn add_condition(&mut self, fragment: String, params: Vec<Value>) {
        self.conditions.push(fragment);
        self.bind(ParamCategory::Conditions, params);
    }

    fn bind(&mut self, category: ParamCategory, params: Vec<Value>) {
        self.parameters.entry(category).or_default().extend(params);
    }
}
