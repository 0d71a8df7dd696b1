//! Entity kinds: what an entity's attributes are and where they live.

use std::fmt;

use chrono::{Local, Utc};
use folio_db::{
    schema::{posts, term_taxonomy, terms},
    traits::Expression as _,
    value::{json_to_value, value_to_json},
    InsertQuery, PostColumn, Row, SelectQuery, Store, UpdateQuery,
};
use serde_json::{json, Map, Value};

use crate::{error::Result, fields::FieldTarget};

pub type Attributes = Map<String, Value>;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityId {
    Row(i64),
    /// The single site-wide options entity.
    Options,
}

impl EntityId {
    pub fn as_row(&self) -> Option<i64> {
        match self {
            EntityId::Row(id) => Some(*id),
            EntityId::Options => None,
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Row(id) => write!(f, "{id}"),
            EntityId::Options => f.write_str("option"),
        }
    }
}

impl From<i64> for EntityId {
    fn from(id: i64) -> Self {
        EntityId::Row(id)
    }
}

pub trait EntityKind: Clone + Send + Sync {
    /// Name used in events and errors.
    fn label(&self) -> &str;

    /// Attribute holding the entity id.
    fn id_attribute(&self) -> &'static str;

    /// Attributes merged under the caller's values on first save.
    fn attribute_defaults(&self) -> Attributes;

    fn id(&self, attributes: &Attributes) -> Option<EntityId> {
        attributes
            .get(self.id_attribute())
            .and_then(parse_id)
            .map(EntityId::Row)
    }

    fn field_target(&self, id: EntityId) -> FieldTarget;

    /// Identifier the field layer knows this entity by.
    fn field_id(&self, id: EntityId) -> String {
        id.to_string()
    }

    /// Whether the entity has a base record at all.
    fn has_attributes(&self) -> bool {
        true
    }

    fn load_attributes(&self, store: &dyn Store, id: EntityId) -> Result<Option<Attributes>>;

    /// Inserts a new base record and returns its id.
    fn insert_attributes(&self, store: &dyn Store, attributes: &Attributes) -> Result<i64>;

    fn update_attributes(
        &self,
        store: &dyn Store,
        id: EntityId,
        attributes: &Attributes,
    ) -> Result<()>;
}

fn parse_id(value: &Value) -> Option<i64> {
    let id = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    };
    id.filter(|id| *id > 0)
}

fn object(value: Value) -> Attributes {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn present<'a>(attributes: &'a Attributes, key: &str) -> Option<&'a Value> {
    attributes.get(key).filter(|value| !value.is_null())
}

/// Documents, pages, media and any custom content type: rows of the base
/// content table.
#[derive(Debug, Clone, PartialEq)]
pub struct PostKind {
    post_type: String,
    defaults: Attributes,
}

impl PostKind {
    pub fn post() -> Self {
        Self::with_defaults(
            "post",
            json!({
                "post_title": "Post",
                "post_content": "Post Details",
                "post_excerpt": "Post Details",
                "post_type": "post",
                "post_status": "publish",
            }),
        )
    }

    pub fn page() -> Self {
        Self::with_defaults(
            "page",
            json!({
                "post_title": "Page",
                "post_content": "Page Details",
                "post_excerpt": "Page Details",
                "post_type": "page",
                "post_status": "publish",
            }),
        )
    }

    /// Attachments. They are stored with status `inherit`.
    pub fn media() -> Self {
        Self::with_defaults(
            "attachment",
            json!({
                "post_title": "Attachment",
                "post_content": "",
                "post_excerpt": "",
                "post_type": "attachment",
                "post_status": "inherit",
                "guid": "",
                "post_mime_type": "",
                "post_parent": 0,
            }),
        )
    }

    pub fn custom(post_type: &str) -> Self {
        Self::with_defaults(
            post_type,
            json!({
                "post_title": "",
                "post_type": post_type,
                "post_status": "publish",
            }),
        )
    }

    /// Maps a type name to its kind; `media` is accepted for attachments.
    pub fn from_name(name: &str) -> Self {
        match name {
            "post" => Self::post(),
            "page" => Self::page(),
            "attachment" | "media" => Self::media(),
            other => Self::custom(other),
        }
    }

    fn with_defaults(post_type: &str, defaults: Value) -> Self {
        Self {
            post_type: post_type.to_string(),
            defaults: object(defaults),
        }
    }

    pub fn post_type(&self) -> &str {
        &self.post_type
    }

    pub fn is_media(&self) -> bool {
        self.post_type == "attachment"
    }

    /// Status new records of this kind get.
    pub fn default_status(&self) -> Option<&str> {
        self.defaults.get("post_status").and_then(Value::as_str)
    }
}

impl EntityKind for PostKind {
    fn label(&self) -> &str {
        &self.post_type
    }

    fn id_attribute(&self) -> &'static str {
        posts::ID.name
    }

    fn attribute_defaults(&self) -> Attributes {
        self.defaults.clone()
    }

    fn field_target(&self, id: EntityId) -> FieldTarget {
        FieldTarget::PostMeta(id.as_row().unwrap_or_default())
    }

    fn load_attributes(&self, store: &dyn Store, id: EntityId) -> Result<Option<Attributes>> {
        let Some(id) = id.as_row() else {
            return Ok(None);
        };
        let row = SelectQuery::from(store, &store.tables().posts)
            .filter(posts::ID.eq(id))
            .fetch_one()?;
        Ok(row.map(|row| row.to_json()))
    }

    fn insert_attributes(&self, store: &dyn Store, attributes: &Attributes) -> Result<i64> {
        let local = Local::now().format(DATE_FORMAT).to_string();
        let gmt = Utc::now().format(DATE_FORMAT).to_string();

        let mut query = InsertQuery::into(store, &store.tables().posts);
        for column in PostColumn::ALL {
            let value = match (column, present(attributes, column.as_str())) {
                (PostColumn::Id, _) => continue,
                (_, Some(value)) => json_to_value(value),
                (PostColumn::Date | PostColumn::Modified, None) => local.clone().into(),
                (PostColumn::DateGmt | PostColumn::ModifiedGmt, None) => gmt.clone().into(),
                (_, None) => continue,
            };
            query = query.set(column.col(), value);
        }
        Ok(query.execute()?)
    }

    fn update_attributes(
        &self,
        store: &dyn Store,
        id: EntityId,
        attributes: &Attributes,
    ) -> Result<()> {
        let Some(id) = id.as_row() else {
            return Ok(());
        };

        let mut query = UpdateQuery::table(store, &store.tables().posts);
        for column in PostColumn::ALL {
            if matches!(
                column,
                PostColumn::Id | PostColumn::Modified | PostColumn::ModifiedGmt
            ) {
                continue;
            }
            if let Some(value) = present(attributes, column.as_str()) {
                query = query.set(column.col(), json_to_value(value));
            }
        }
        query
            .set(posts::POST_MODIFIED, Local::now().format(DATE_FORMAT).to_string())
            .set(posts::POST_MODIFIED_GMT, Utc::now().format(DATE_FORMAT).to_string())
            .filter(posts::ID.eq(id))
            .execute()?;
        Ok(())
    }
}

/// Taxonomy terms. A term's attributes span the term row and its taxonomy
/// row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermKind {
    taxonomy: String,
}

impl TermKind {
    pub fn new(taxonomy: impl Into<String>) -> Self {
        Self {
            taxonomy: taxonomy.into(),
        }
    }

    pub fn category() -> Self {
        Self::new("category")
    }

    pub fn taxonomy(&self) -> &str {
        &self.taxonomy
    }

    fn taxonomy_row(&self, store: &dyn Store, id: i64) -> Result<Option<Row>> {
        Ok(SelectQuery::from(store, &store.tables().term_taxonomy)
            .filter(
                term_taxonomy::TERM_ID
                    .eq(id)
                    .and(term_taxonomy::TAXONOMY.eq(self.taxonomy.clone())),
            )
            .fetch_one()?)
    }
}

impl Default for TermKind {
    fn default() -> Self {
        Self::category()
    }
}

impl EntityKind for TermKind {
    fn label(&self) -> &str {
        &self.taxonomy
    }

    fn id_attribute(&self) -> &'static str {
        terms::TERM_ID.name
    }

    /// The slug is left out so it can be derived from the name.
    fn attribute_defaults(&self) -> Attributes {
        object(json!({
            "name": "Default Term",
            "description": "Default Term Description",
        }))
    }

    fn field_target(&self, id: EntityId) -> FieldTarget {
        FieldTarget::TermMeta(id.as_row().unwrap_or_default())
    }

    fn field_id(&self, id: EntityId) -> String {
        format!("{}_{}", self.taxonomy, id)
    }

    fn load_attributes(&self, store: &dyn Store, id: EntityId) -> Result<Option<Attributes>> {
        let Some(id) = id.as_row() else {
            return Ok(None);
        };
        let Some(term) = SelectQuery::from(store, &store.tables().terms)
            .filter(terms::TERM_ID.eq(id))
            .fetch_one()?
        else {
            return Ok(None);
        };
        let taxonomy = self.taxonomy_row(store, id)?;

        let mut record = Attributes::new();
        let mut copy = |row: &Row, column: &str| {
            if let Some(value) = row.get(column) {
                record.insert(column.to_string(), value_to_json(value));
            }
        };
        for column in [
            terms::TERM_ID.name,
            terms::NAME.name,
            terms::SLUG.name,
            terms::TERM_GROUP.name,
        ] {
            copy(&term, column);
        }
        if let Some(taxonomy) = &taxonomy {
            for column in [
                term_taxonomy::DESCRIPTION.name,
                term_taxonomy::TERM_TAXONOMY_ID.name,
                term_taxonomy::PARENT.name,
                term_taxonomy::COUNT.name,
            ] {
                copy(taxonomy, column);
            }
        }
        Ok(Some(record))
    }

    fn insert_attributes(&self, store: &dyn Store, attributes: &Attributes) -> Result<i64> {
        let name = present(attributes, terms::NAME.name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let slug = present(attributes, terms::SLUG.name)
            .and_then(Value::as_str)
            .map(String::from)
            .unwrap_or_else(|| slugify(&name));
        let group = present(attributes, terms::TERM_GROUP.name)
            .and_then(Value::as_i64)
            .unwrap_or_default();

        let tables = store.tables();
        let term_id = InsertQuery::into(store, &tables.terms)
            .set(terms::NAME, name)
            .set(terms::SLUG, slug)
            .set(terms::TERM_GROUP, group)
            .execute()?;

        let description = present(attributes, term_taxonomy::DESCRIPTION.name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let parent = present(attributes, term_taxonomy::PARENT.name)
            .and_then(Value::as_i64)
            .unwrap_or_default();
        InsertQuery::into(store, &tables.term_taxonomy)
            .set(term_taxonomy::TERM_ID, term_id)
            .set(term_taxonomy::TAXONOMY, self.taxonomy.clone())
            .set(term_taxonomy::DESCRIPTION, description)
            .set(term_taxonomy::PARENT, parent)
            .execute()?;

        Ok(term_id)
    }

    fn update_attributes(
        &self,
        store: &dyn Store,
        id: EntityId,
        attributes: &Attributes,
    ) -> Result<()> {
        let Some(id) = id.as_row() else {
            return Ok(());
        };
        let tables = store.tables();

        let mut term = UpdateQuery::table(store, &tables.terms);
        for column in [terms::NAME, terms::SLUG] {
            if let Some(value) = present(attributes, column.name) {
                term = term.set(column, json_to_value(value));
            }
        }
        term.filter(terms::TERM_ID.eq(id)).execute()?;

        if let Some(description) = present(attributes, term_taxonomy::DESCRIPTION.name) {
            UpdateQuery::table(store, &tables.term_taxonomy)
                .set(term_taxonomy::DESCRIPTION, json_to_value(description))
                .filter(
                    term_taxonomy::TERM_ID
                        .eq(id)
                        .and(term_taxonomy::TAXONOMY.eq(self.taxonomy.clone())),
                )
                .execute()?;
        }
        Ok(())
    }
}

/// Site-wide options: no base record, fields only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptionKind;

impl EntityKind for OptionKind {
    fn label(&self) -> &str {
        "option"
    }

    fn id_attribute(&self) -> &'static str {
        "option"
    }

    fn attribute_defaults(&self) -> Attributes {
        Attributes::new()
    }

    fn id(&self, _attributes: &Attributes) -> Option<EntityId> {
        Some(EntityId::Options)
    }

    fn field_target(&self, _id: EntityId) -> FieldTarget {
        FieldTarget::Options
    }

    fn has_attributes(&self) -> bool {
        false
    }

    fn load_attributes(&self, _store: &dyn Store, _id: EntityId) -> Result<Option<Attributes>> {
        Ok(Some(Attributes::new()))
    }

    fn insert_attributes(&self, _store: &dyn Store, _attributes: &Attributes) -> Result<i64> {
        Ok(0)
    }

    fn update_attributes(
        &self,
        _store: &dyn Store,
        _id: EntityId,
        _attributes: &Attributes,
    ) -> Result<()> {
        Ok(())
    }
}

/// Lowercase alphanumerics separated by single dashes.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Red Things"), "red-things");
        assert_eq!(slugify("  Hello, World!  "), "hello-world");
        assert_eq!(slugify("Crème brûlée"), "crème-brûlée");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn test_post_kind_from_name() {
        assert_eq!(PostKind::from_name("media"), PostKind::media());
        assert_eq!(PostKind::from_name("page").post_type(), "page");
        assert_eq!(PostKind::from_name("product").post_type(), "product");
        assert!(PostKind::media().is_media());
        assert_eq!(PostKind::media().default_status(), Some("inherit"));
    }

    #[test]
    fn test_parse_id() {
        let kind = PostKind::post();
        let attrs = object(json!({"ID": 5}));
        assert_eq!(kind.id(&attrs), Some(EntityId::Row(5)));
        let attrs = object(json!({"ID": "12"}));
        assert_eq!(kind.id(&attrs), Some(EntityId::Row(12)));
        let attrs = object(json!({"ID": 0}));
        assert_eq!(kind.id(&attrs), None);
        assert_eq!(OptionKind.id(&Attributes::new()), Some(EntityId::Options));
    }

    #[test]
    fn test_field_ids() {
        assert_eq!(PostKind::post().field_id(EntityId::Row(3)), "3");
        assert_eq!(TermKind::new("genre").field_id(EntityId::Row(3)), "genre_3");
        assert_eq!(OptionKind.field_id(EntityId::Options), "option");
    }
}
