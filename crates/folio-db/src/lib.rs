//! Storage and query building for folio content.

pub mod alias;
pub mod error;
pub mod expr;
pub mod macros;
pub mod query;
pub mod schema;
pub mod sqlite;
pub mod store;
pub mod traits;
pub mod value;

pub use error::{ConfigurationError, DbError, Result};
pub use query::*;
pub use rusqlite::types::Value;
pub use schema::{create_schema, PostColumn};
pub use sqlite::SqliteStore;
pub use store::{Row, Statement, Store, StoreHandle};
pub use traits::{Expression, FromRow};
pub use value::FilterValue;

#[cfg(test)]
mod tests {
    use folio_config::TableNames;

    use super::*;
    use crate::schema::{options, posts};

    fn setup_store() -> SqliteStore {
        let store = SqliteStore::open_in_memory(TableNames::default()).unwrap();
        create_schema(&store).unwrap();
        store
    }

    #[test]
    fn test_insert_select_update_delete() {
        let store = setup_store();
        let table = store.tables().posts.clone();

        let id = InsertQuery::into(&store, &table)
            .set(posts::POST_TITLE, "Hello".to_string())
            .set(posts::POST_TYPE, "page".to_string())
            .execute()
            .unwrap();
        assert!(id > 0);

        let row = SelectQuery::from(&store, &table)
            .filter(posts::ID.eq(id))
            .fetch_one()
            .unwrap()
            .unwrap();
        assert_eq!(row.get_str("post_title"), Some("Hello"));
        assert_eq!(row.get_str("post_status"), Some("publish"));

        let updated = UpdateQuery::table(&store, &table)
            .set(posts::POST_TITLE, "Hello again".to_string())
            .filter(posts::ID.eq(id))
            .execute()
            .unwrap();
        assert_eq!(updated, 1);

        let titles: Vec<Row> = SelectQuery::from(&store, &table)
            .select(&[posts::POST_TITLE])
            .fetch_as()
            .unwrap();
        assert_eq!(titles[0].get_str("post_title"), Some("Hello again"));
        assert_eq!(titles[0].len(), 1);

        let deleted = DeleteQuery::from(&store, &table)
            .filter(posts::ID.eq(id).and(posts::POST_TYPE.eq("page".to_string())))
            .execute()
            .unwrap();
        assert_eq!(deleted, 1);
        assert!(SelectQuery::from(&store, &table)
            .fetch_one()
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_upsert() {
        let store = setup_store();
        let table = store.tables().options.clone();

        for value in ["1", "2"] {
            InsertQuery::into(&store, &table)
                .set(options::OPTION_NAME, "options_theme".to_string())
                .set(options::OPTION_VALUE, value.to_string())
                .on_conflict_update(&[options::OPTION_NAME], &[options::OPTION_VALUE])
                .execute()
                .unwrap();
        }

        let rows = SelectQuery::from(&store, &table).fetch().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_str("option_value"), Some("2"));
    }

    #[test]
    fn test_update_without_sets_is_noop() {
        let store = setup_store();
        let table = store.tables().posts.clone();
        let update = UpdateQuery::table(&store, &table).filter(posts::ID.eq(1));
        assert!(update.is_empty());
        assert_eq!(update.execute().unwrap(), 0);
    }

    #[test]
    fn test_builder_sql() {
        let store = setup_store();
        let (sql, params) = SelectQuery::from(&store, "wp_posts")
            .filter(posts::POST_TYPE.eq("page".to_string()).and(posts::POST_STATUS.ne("trash".to_string())))
            .order_by(posts::POST_TITLE, SortDirection::Desc)
            .limit(3)
            .build_sql();
        assert_eq!(
            sql,
            "SELECT * FROM wp_posts WHERE (post_type = ? AND post_status != ?) ORDER BY post_title DESC LIMIT 3"
        );
        assert_eq!(params.len(), 2);
    }
}
