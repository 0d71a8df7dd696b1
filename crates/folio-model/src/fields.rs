//! Custom field storage.
//!
//! Field values live in a key/value table next to their entity: post meta,
//! term meta, or the options table for site-wide values. A
//! [`FieldManager`] holds one entity's fields as JSON. Strings are stored
//! as-is unless they would parse as JSON; every other value is stored as
//! JSON text and decoded on load.

use folio_db::{
    schema::{options, postmeta, termmeta},
    traits::Expression as _,
    value::value_to_json,
    DeleteQuery, InsertQuery, Result as DbResult, Row, SelectQuery, Store, Value as SqlValue,
};
use serde_json::{Map, Value};
use tracing::debug;

use crate::{error::Result, path};

/// Option names carry this prefix so fields don't collide with other options.
pub const OPTION_PREFIX: &str = "options_";

/// Where a field set is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldTarget {
    PostMeta(i64),
    TermMeta(i64),
    Options,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldManager {
    target: FieldTarget,
    values: Map<String, Value>,
}

impl FieldManager {
    pub fn new(target: FieldTarget) -> Self {
        Self {
            target,
            values: Map::new(),
        }
    }

    /// Reads every stored field for `target`.
    pub fn load(store: &dyn Store, target: FieldTarget) -> Result<Self> {
        let tables = store.tables();
        let rows = match target {
            FieldTarget::PostMeta(id) => SelectQuery::from(store, &tables.postmeta)
                .select(&[postmeta::META_KEY, postmeta::META_VALUE])
                .filter(postmeta::POST_ID.eq(id))
                .order_by(postmeta::META_ID, Default::default())
                .fetch()?,
            FieldTarget::TermMeta(id) => SelectQuery::from(store, &tables.termmeta)
                .select(&[termmeta::META_KEY, termmeta::META_VALUE])
                .filter(termmeta::TERM_ID.eq(id))
                .order_by(termmeta::META_ID, Default::default())
                .fetch()?,
            FieldTarget::Options => SelectQuery::from(store, &tables.options)
                .select(&[options::OPTION_NAME, options::OPTION_VALUE])
                .order_by(options::OPTION_ID, Default::default())
                .fetch()?,
        };

        let mut values = Map::new();
        for row in &rows {
            if let Some((key, value)) = decode_row(target, row) {
                values.insert(key, value);
            }
        }
        debug!("loaded {} field(s) for {:?}", values.len(), target);

        Ok(Self {
            target,
            values,
        })
    }

    /// Replaces the held values without touching the store.
    pub fn inject(mut self, values: Map<String, Value>) -> Self {
        self.values = values;
        self
    }

    pub fn target(&self) -> FieldTarget {
        self.target
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        path::get(&self.values, path).filter(|value| !value.is_null())
    }

    /// Sets a value by dot path. A null at the top level removes the field
    /// on the next [`FieldManager::save`].
    pub fn set(&mut self, path: &str, value: Value) -> Result<()> {
        path::set(&mut self.values, path, value)
    }

    /// Current non-null values.
    pub fn dump(&self) -> Map<String, Value> {
        self.values
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(key, _)| key.as_str())
    }

    /// Writes every held field in one transaction. Null fields are deleted
    /// from the store and dropped from the manager.
    pub fn save(&mut self, store: &dyn Store) -> Result<()> {
        store.transaction(&mut || {
            for (key, value) in &self.values {
                self.delete_key(store, key)?;
                if !value.is_null() {
                    self.insert_key(store, key, encode(value))?;
                }
            }
            Ok(())
        })?;
        self.values.retain(|_, value| !value.is_null());
        debug!("saved {} field(s) for {:?}", self.values.len(), self.target);
        Ok(())
    }

    fn delete_key(&self, store: &dyn Store, key: &str) -> DbResult<()> {
        let tables = store.tables();
        match self.target {
            FieldTarget::PostMeta(id) => DeleteQuery::from(store, &tables.postmeta)
                .filter(postmeta::POST_ID.eq(id).and(postmeta::META_KEY.eq(key.to_string())))
                .execute()?,
            FieldTarget::TermMeta(id) => DeleteQuery::from(store, &tables.termmeta)
                .filter(termmeta::TERM_ID.eq(id).and(termmeta::META_KEY.eq(key.to_string())))
                .execute()?,
            FieldTarget::Options => DeleteQuery::from(store, &tables.options)
                .filter(options::OPTION_NAME.eq(format!("{OPTION_PREFIX}{key}")))
                .execute()?,
        };
        Ok(())
    }

    fn insert_key(&self, store: &dyn Store, key: &str, value: String) -> DbResult<()> {
        let tables = store.tables();
        match self.target {
            FieldTarget::PostMeta(id) => InsertQuery::into(store, &tables.postmeta)
                .set(postmeta::POST_ID, id)
                .set(postmeta::META_KEY, key.to_string())
                .set(postmeta::META_VALUE, value)
                .execute()?,
            FieldTarget::TermMeta(id) => InsertQuery::into(store, &tables.termmeta)
                .set(termmeta::TERM_ID, id)
                .set(termmeta::META_KEY, key.to_string())
                .set(termmeta::META_VALUE, value)
                .execute()?,
            FieldTarget::Options => InsertQuery::into(store, &tables.options)
                .set(options::OPTION_NAME, format!("{OPTION_PREFIX}{key}"))
                .set(options::OPTION_VALUE, value)
                .execute()?,
        };
        Ok(())
    }
}

fn decode_row(target: FieldTarget, row: &Row) -> Option<(String, Value)> {
    let (key_column, value_column) = match target {
        FieldTarget::PostMeta(_) => (postmeta::META_KEY.name, postmeta::META_VALUE.name),
        FieldTarget::TermMeta(_) => (termmeta::META_KEY.name, termmeta::META_VALUE.name),
        FieldTarget::Options => (options::OPTION_NAME.name, options::OPTION_VALUE.name),
    };

    let key = row.get_str(key_column)?;
    let key = match target {
        FieldTarget::Options => key.strip_prefix(OPTION_PREFIX)?,
        _ => key,
    };
    let value = match row.get(value_column)? {
        SqlValue::Text(text) => decode(text),
        other => value_to_json(other),
    };
    Some((key.to_string(), value))
}

/// Stored text is JSON when it parses as JSON, otherwise a plain string.
pub fn decode(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Inverse of [`decode`]. A string that would parse as JSON is stored
/// quoted so it loads back as a string.
pub fn encode(value: &Value) -> String {
    match value {
        Value::String(s) if serde_json::from_str::<Value>(s).is_err() => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use folio_config::TableNames;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use folio_db::{create_schema, DbError, SqliteStore, Statement};
    use serde_json::json;

    use super::*;

    fn store() -> SqliteStore {
        let store = SqliteStore::open_in_memory(TableNames::default()).unwrap();
        create_schema(&store).unwrap();
        store
    }

    #[test]
    fn test_encode_decode() {
        assert_eq!(encode(&json!("plain")), "plain");
        assert_eq!(encode(&json!(12)), "12");
        assert_eq!(encode(&json!({"a": [1, 2]})), r#"{"a":[1,2]}"#);

        assert_eq!(decode("plain"), json!("plain"));
        assert_eq!(decode("12"), json!(12));
        assert_eq!(decode(r#"{"a":[1,2]}"#), json!({"a": [1, 2]}));
        assert_eq!(decode(""), json!(""));
    }

    const SAMPLES: [(&str, &str); 6] = [
        ("number", "42"),
        ("flag", "true"),
        ("nothing", "null"),
        ("list", "[1]"),
        ("quoted", "\"quoted\""),
        ("plain", "plain"),
    ];

    #[test]
    fn test_json_looking_strings_stay_strings() {
        assert_eq!(encode(&json!("42")), r#""42""#);
        assert_eq!(encode(&json!("null")), r#""null""#);

        let store = store();
        let mut fields = FieldManager::new(FieldTarget::PostMeta(9));
        for (key, text) in SAMPLES {
            fields.set(key, json!(text)).unwrap();
        }
        fields.save(&store).unwrap();

        let loaded = FieldManager::load(&store, FieldTarget::PostMeta(9)).unwrap();
        for (key, text) in SAMPLES {
            assert_eq!(loaded.get(key), Some(&json!(text)), "{key}");
        }
    }

    /// Refuses inserts once its budget runs out.
    struct FlakyStore {
        inner: SqliteStore,
        inserts_left: AtomicUsize,
    }

    impl Store for FlakyStore {
        fn tables(&self) -> &TableNames {
            self.inner.tables()
        }

        fn execute_query(&self, statement: &Statement) -> DbResult<Vec<Row>> {
            self.inner.execute_query(statement)
        }

        fn execute_scalar(&self, statement: &Statement) -> DbResult<SqlValue> {
            self.inner.execute_scalar(statement)
        }

        fn execute(&self, statement: &Statement) -> DbResult<usize> {
            self.inner.execute(statement)
        }

        fn insert(&self, statement: &Statement) -> DbResult<i64> {
            self.inserts_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .map_err(|_| DbError::UnexpectedScalar("insert refused".into()))?;
            self.inner.insert(statement)
        }
    }

    #[test]
    fn test_failed_save_keeps_previous_values() {
        let store = FlakyStore {
            inner: store(),
            inserts_left: AtomicUsize::new(usize::MAX),
        };
        let mut fields = FieldManager::new(FieldTarget::PostMeta(3));
        fields.set("color", json!("red")).unwrap();
        fields.set("size", json!("small")).unwrap();
        fields.save(&store).unwrap();

        store.inserts_left.store(1, Ordering::SeqCst);
        fields.set("color", json!("blue")).unwrap();
        fields.set("size", json!("large")).unwrap();
        assert!(fields.save(&store).is_err());

        let loaded = FieldManager::load(&store.inner, FieldTarget::PostMeta(3)).unwrap();
        assert_eq!(loaded.get("color"), Some(&json!("red")));
        assert_eq!(loaded.get("size"), Some(&json!("small")));
    }

    #[test]
    fn test_save_and_load_post_meta() {
        let store = store();
        let mut fields = FieldManager::new(FieldTarget::PostMeta(4));
        fields.set("meta_title", json!("Welcome")).unwrap();
        fields.set("seo.keywords", json!(["cms", "rust"])).unwrap();
        fields.save(&store).unwrap();

        let loaded = FieldManager::load(&store, FieldTarget::PostMeta(4)).unwrap();
        assert_eq!(loaded.get("meta_title"), Some(&json!("Welcome")));
        assert_eq!(loaded.get("seo.keywords.1"), Some(&json!("rust")));
        assert_eq!(loaded.keys().collect::<Vec<_>>(), vec!["meta_title", "seo"]);

        let other = FieldManager::load(&store, FieldTarget::PostMeta(5)).unwrap();
        assert!(other.dump().is_empty());
    }

    #[test]
    fn test_save_overwrites_and_null_deletes() {
        let store = store();
        let mut fields = FieldManager::new(FieldTarget::TermMeta(2));
        fields.set("color", json!("red")).unwrap();
        fields.set("size", json!(3)).unwrap();
        fields.save(&store).unwrap();

        fields.set("color", json!("blue")).unwrap();
        fields.set("size", Value::Null).unwrap();
        assert_eq!(fields.get("size"), None);
        fields.save(&store).unwrap();
        assert_eq!(fields.dump().len(), 1);

        let loaded = FieldManager::load(&store, FieldTarget::TermMeta(2)).unwrap();
        assert_eq!(loaded.dump(), fields.dump());
        assert_eq!(loaded.get("color"), Some(&json!("blue")));
    }

    #[test]
    fn test_options_are_prefixed() {
        let store = store();
        let stmt = store
            .prepare(
                "INSERT INTO wp_options (option_name, option_value) VALUES ('blogname', 'Folio')",
                vec![],
            )
            .unwrap();
        store.execute(&stmt).unwrap();

        let mut fields = FieldManager::new(FieldTarget::Options);
        fields.set("footer_text", json!("(c) Folio")).unwrap();
        fields.save(&store).unwrap();

        let loaded = FieldManager::load(&store, FieldTarget::Options).unwrap();
        assert_eq!(loaded.dump().len(), 1);
        assert_eq!(loaded.get("footer_text"), Some(&json!("(c) Folio")));

        let rows = SelectQuery::from(&store, "wp_options")
            .filter(options::OPTION_NAME.eq("options_footer_text".to_string()))
            .fetch()
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_inject_does_not_touch_store() {
        let store = store();
        let mut values = Map::new();
        values.insert("a".into(), json!(1));
        let fields = FieldManager::new(FieldTarget::PostMeta(1)).inject(values);
        assert_eq!(fields.get("a"), Some(&json!(1)));

        let loaded = FieldManager::load(&store, FieldTarget::PostMeta(1)).unwrap();
        assert!(loaded.dump().is_empty());
    }
}
