//! SQLite-backed [`Store`].

use std::{
    fs,
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};

use folio_config::TableNames;
use rusqlite::{params_from_iter, types::Value, Connection};
use tracing::{debug, trace};

use crate::{
    error::{DbError, Result},
    store::{Row, Statement, Store},
};

pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    tables: TableNames,
}

impl SqliteStore {
    /// Opens (or creates) the database file at `path`.
    pub fn open<P: AsRef<Path>>(path: P, tables: TableNames) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        debug!("opening database at {}", path.display());
        let conn = Connection::open(path)?;
        Ok(Self::from_connection(Arc::new(Mutex::new(conn)), tables))
    }

    pub fn open_in_memory(tables: TableNames) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self::from_connection(Arc::new(Mutex::new(conn)), tables))
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>, tables: TableNames) -> Self {
        Self {
            conn,
            tables,
        }
    }

    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        self.conn.clone()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| DbError::PoisonError)
    }
}

impl Store for SqliteStore {
    fn tables(&self) -> &TableNames {
        &self.tables
    }

    fn execute_query(&self, statement: &Statement) -> Result<Vec<Row>> {
        trace!(sql = statement.sql(), "query");
        let conn = self.lock()?;
        let mut stmt = conn.prepare(statement.sql())?;
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let mut rows = stmt.query(params_from_iter(statement.params()))?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = Row::with_capacity(names.len());
            for (idx, name) in names.iter().enumerate() {
                record.push(name.clone(), row.get::<_, Value>(idx)?);
            }
            records.push(record);
        }
        Ok(records)
    }

    fn execute_scalar(&self, statement: &Statement) -> Result<Value> {
        trace!(sql = statement.sql(), "scalar");
        let conn = self.lock()?;
        let value = conn.query_row(
            statement.sql(),
            params_from_iter(statement.params()),
            |row| row.get::<_, Value>(0),
        )?;
        Ok(value)
    }

    fn execute(&self, statement: &Statement) -> Result<usize> {
        trace!(sql = statement.sql(), "execute");
        let conn = self.lock()?;
        Ok(conn.execute(statement.sql(), params_from_iter(statement.params()))?)
    }

    fn insert(&self, statement: &Statement) -> Result<i64> {
        trace!(sql = statement.sql(), "insert");
        let conn = self.lock()?;
        conn.execute(statement.sql(), params_from_iter(statement.params()))?;
        Ok(conn.last_insert_rowid())
    }
}
