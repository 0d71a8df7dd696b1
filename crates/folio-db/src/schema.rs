//! Content table layout.

use std::{fmt, str::FromStr};

use tracing::debug;

use rusqlite::types::Value;

use crate::{
    define_entity,
    error::{ConfigurationError, Result},
    expr::Col,
    store::Store,
};

define_entity!(
    posts {
        ID: i64 => "ID",
        POST_AUTHOR: i64 => "post_author",
        POST_DATE: String => "post_date",
        POST_DATE_GMT: String => "post_date_gmt",
        POST_CONTENT: String => "post_content",
        POST_TITLE: String => "post_title",
        POST_EXCERPT: String => "post_excerpt",
        POST_STATUS: String => "post_status",
        COMMENT_STATUS: String => "comment_status",
        POST_NAME: String => "post_name",
        POST_MODIFIED: String => "post_modified",
        POST_MODIFIED_GMT: String => "post_modified_gmt",
        POST_PARENT: i64 => "post_parent",
        GUID: String => "guid",
        MENU_ORDER: i64 => "menu_order",
        POST_TYPE: String => "post_type",
        POST_MIME_TYPE: String => "post_mime_type",
        COMMENT_COUNT: i64 => "comment_count",
    }
);

define_entity!(
    postmeta {
        META_ID: i64 => "meta_id",
        POST_ID: i64 => "post_id",
        META_KEY: String => "meta_key",
        META_VALUE: String => "meta_value",
    }
);

define_entity!(
    terms {
        TERM_ID: i64 => "term_id",
        NAME: String => "name",
        SLUG: String => "slug",
        TERM_GROUP: i64 => "term_group",
    }
);

define_entity!(
    term_taxonomy {
        TERM_TAXONOMY_ID: i64 => "term_taxonomy_id",
        TERM_ID: i64 => "term_id",
        TAXONOMY: String => "taxonomy",
        DESCRIPTION: String => "description",
        PARENT: i64 => "parent",
        COUNT: i64 => "count",
    }
);

define_entity!(
    termmeta {
        META_ID: i64 => "meta_id",
        TERM_ID: i64 => "term_id",
        META_KEY: String => "meta_key",
        META_VALUE: String => "meta_value",
    }
);

define_entity!(
    options {
        OPTION_ID: i64 => "option_id",
        OPTION_NAME: String => "option_name",
        OPTION_VALUE: String => "option_value",
        AUTOLOAD: String => "autoload",
    }
);

/// A column of the base content table.
///
/// Filters and sort keys on base columns are restricted to this set, so
/// no caller-supplied text is ever spliced into SQL as a column name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostColumn {
    Id,
    Author,
    Date,
    DateGmt,
    Content,
    Title,
    Excerpt,
    Status,
    CommentStatus,
    Name,
    Modified,
    ModifiedGmt,
    Parent,
    Guid,
    MenuOrder,
    Type,
    MimeType,
    CommentCount,
}

impl PostColumn {
    pub const ALL: [PostColumn; 18] = [
        PostColumn::Id,
        PostColumn::Author,
        PostColumn::Date,
        PostColumn::DateGmt,
        PostColumn::Content,
        PostColumn::Title,
        PostColumn::Excerpt,
        PostColumn::Status,
        PostColumn::CommentStatus,
        PostColumn::Name,
        PostColumn::Modified,
        PostColumn::ModifiedGmt,
        PostColumn::Parent,
        PostColumn::Guid,
        PostColumn::MenuOrder,
        PostColumn::Type,
        PostColumn::MimeType,
        PostColumn::CommentCount,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PostColumn::Id => posts::ID.name,
            PostColumn::Author => posts::POST_AUTHOR.name,
            PostColumn::Date => posts::POST_DATE.name,
            PostColumn::DateGmt => posts::POST_DATE_GMT.name,
            PostColumn::Content => posts::POST_CONTENT.name,
            PostColumn::Title => posts::POST_TITLE.name,
            PostColumn::Excerpt => posts::POST_EXCERPT.name,
            PostColumn::Status => posts::POST_STATUS.name,
            PostColumn::CommentStatus => posts::COMMENT_STATUS.name,
            PostColumn::Name => posts::POST_NAME.name,
            PostColumn::Modified => posts::POST_MODIFIED.name,
            PostColumn::ModifiedGmt => posts::POST_MODIFIED_GMT.name,
            PostColumn::Parent => posts::POST_PARENT.name,
            PostColumn::Guid => posts::GUID.name,
            PostColumn::MenuOrder => posts::MENU_ORDER.name,
            PostColumn::Type => posts::POST_TYPE.name,
            PostColumn::MimeType => posts::POST_MIME_TYPE.name,
            PostColumn::CommentCount => posts::COMMENT_COUNT.name,
        }
    }

    /// Untyped column handle for builders fed from dynamic attribute maps.
    pub fn col(&self) -> Col<Value> {
        Col::new(self.as_str())
    }
}

impl fmt::Display for PostColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostColumn {
    type Err = ConfigurationError;

    /// Accepts the exact column name, or the name without its `post_` prefix.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        PostColumn::ALL
            .into_iter()
            .find(|column| {
                let name = column.as_str();
                name == s || name.strip_prefix("post_") == Some(s)
            })
            .ok_or_else(|| ConfigurationError::UnknownColumn(s.to_string()))
    }
}

/// Creates the content tables if they do not exist yet.
pub fn create_schema(store: &dyn Store) -> Result<()> {
    let tables = store.tables().clone();

    let statements = [
        format!(
            "CREATE TABLE IF NOT EXISTS {} (
                ID INTEGER PRIMARY KEY AUTOINCREMENT,
                post_author INTEGER NOT NULL DEFAULT 0,
                post_date TEXT NOT NULL DEFAULT '',
                post_date_gmt TEXT NOT NULL DEFAULT '',
                post_content TEXT NOT NULL DEFAULT '',
                post_title TEXT NOT NULL DEFAULT '',
                post_excerpt TEXT NOT NULL DEFAULT '',
                post_status TEXT NOT NULL DEFAULT 'publish',
                comment_status TEXT NOT NULL DEFAULT 'open',
                post_name TEXT NOT NULL DEFAULT '',
                post_modified TEXT NOT NULL DEFAULT '',
                post_modified_gmt TEXT NOT NULL DEFAULT '',
                post_parent INTEGER NOT NULL DEFAULT 0,
                guid TEXT NOT NULL DEFAULT '',
                menu_order INTEGER NOT NULL DEFAULT 0,
                post_type TEXT NOT NULL DEFAULT 'post',
                post_mime_type TEXT NOT NULL DEFAULT '',
                comment_count INTEGER NOT NULL DEFAULT 0
            )",
            tables.posts
        ),
        format!(
            "CREATE INDEX IF NOT EXISTS {0}_type_status ON {0} (post_type, post_status)",
            tables.posts
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {} (
                meta_id INTEGER PRIMARY KEY AUTOINCREMENT,
                post_id INTEGER NOT NULL DEFAULT 0,
                meta_key TEXT,
                meta_value TEXT
            )",
            tables.postmeta
        ),
        format!(
            "CREATE INDEX IF NOT EXISTS {0}_post_key ON {0} (post_id, meta_key)",
            tables.postmeta
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {} (
                term_id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL DEFAULT '',
                slug TEXT NOT NULL DEFAULT '',
                term_group INTEGER NOT NULL DEFAULT 0
            )",
            tables.terms
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {} (
                term_taxonomy_id INTEGER PRIMARY KEY AUTOINCREMENT,
                term_id INTEGER NOT NULL DEFAULT 0,
                taxonomy TEXT NOT NULL DEFAULT '',
                description TEXT NOT NULL DEFAULT '',
                parent INTEGER NOT NULL DEFAULT 0,
                count INTEGER NOT NULL DEFAULT 0,
                UNIQUE (term_id, taxonomy)
            )",
            tables.term_taxonomy
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {} (
                meta_id INTEGER PRIMARY KEY AUTOINCREMENT,
                term_id INTEGER NOT NULL DEFAULT 0,
                meta_key TEXT,
                meta_value TEXT
            )",
            tables.termmeta
        ),
        format!(
            "CREATE INDEX IF NOT EXISTS {0}_term_key ON {0} (term_id, meta_key)",
            tables.termmeta
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {} (
                option_id INTEGER PRIMARY KEY AUTOINCREMENT,
                option_name TEXT NOT NULL UNIQUE,
                option_value TEXT NOT NULL DEFAULT '',
                autoload TEXT NOT NULL DEFAULT 'yes'
            )",
            tables.options
        ),
    ];

    for sql in &statements {
        let statement = store.prepare(sql, vec![])?;
        store.execute(&statement)?;
    }
    debug!("content schema ready");
    Ok(())
}
