use std::{path::PathBuf, str::FromStr, sync::Arc};

use folio_config::Config;
use folio_db::{create_schema, ContentQuery, PostColumn, QueryOptions, SqliteStore};
use folio_events::EventSinkHandle;
use folio_model::{
    Attributes, EntityId, EntityKind, Model, ModelContext, OptionKind, PostKind, TermKind,
};
use nu_ansi_term::Color::{Cyan, Green, LightRed};
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::{
    args::{field_value, parse_assignment, parse_filter, parse_order},
    error::CliResult,
    utils::{display_value, print_json, Colored},
};

/// Opens the configured database, creating missing tables.
pub fn open_context(
    config: &Config,
    db: Option<PathBuf>,
    events: EventSinkHandle,
) -> CliResult<ModelContext> {
    let path = db.unwrap_or_else(|| config.get_db_path());
    debug!("opening {}", path.display());

    let store = SqliteStore::open(&path, config.tables()?)?;
    create_schema(&store)?;

    Ok(ModelContext::new(Arc::new(store))
        .with_events(events)
        .with_query_options(QueryOptions::from_config(&config.query)))
}

#[derive(Debug, Default)]
pub struct ListRequest {
    pub kind: String,
    pub status: Option<String>,
    pub any_status: bool,
    pub fields: Vec<String>,
    pub attrs: Vec<String>,
    pub order: Option<String>,
    pub order_field: Option<String>,
    pub numeric: bool,
    pub page: u64,
    pub per_page: Option<u64>,
}

pub struct Listing {
    pub entries: Vec<Value>,
    pub total: u64,
    pub page: u64,
    pub pages: u64,
}

/// Turns a list request into a content query without running it.
pub fn build_query(ctx: &ModelContext, request: &ListRequest) -> CliResult<ContentQuery> {
    let kind = PostKind::from_name(&request.kind);

    let mut query = if request.any_status {
        let ctx = ctx
            .clone()
            .with_query_options(ctx.query_options().clone().any_status());
        ctx.query_for(&kind)?
    } else if let Some(status) = &request.status {
        let ctx = ctx
            .clone()
            .with_query_options(ctx.query_options().clone().status(status));
        let mut query = ctx.query();
        query.filter_by_type(kind.post_type())?;
        query
    } else {
        ctx.query_for(&kind)?
    };

    for raw in &request.attrs {
        let filter = parse_filter(raw)?;
        let column = PostColumn::from_str(&filter.key).map_err(folio_db::DbError::from)?;
        query.filter_by_attribute_with(column, filter.typed_values(), filter.op)?;
    }
    for raw in &request.fields {
        let filter = parse_filter(raw)?;
        query.filter_by_field_with(&filter.key, filter.typed_values(), filter.op)?;
    }

    if let Some(order) = &request.order {
        let (name, direction) = parse_order(order)?;
        let column = PostColumn::from_str(&name).map_err(folio_db::DbError::from)?;
        query.order_by(column, direction);
    }
    if let Some(order) = &request.order_field {
        let (key, direction) = parse_order(order)?;
        if request.numeric {
            query.order_by_field_numeric(&key, direction);
        } else {
            query.order_by_field(&key, direction);
        }
    }

    let per_page = request
        .per_page
        .unwrap_or_else(|| ctx.query_options().limit);
    query.page(request.page.max(1), per_page);
    Ok(query)
}

pub fn list_entries(ctx: &ModelContext, request: &ListRequest) -> CliResult<Listing> {
    let kind = PostKind::from_name(&request.kind);
    let mut query = build_query(ctx, request)?;
    let models = ctx.list(&kind, &mut query)?;

    let entries = models
        .iter()
        .map(entry_json)
        .collect::<CliResult<Vec<_>>>()?;
    Ok(Listing {
        entries,
        total: query.total_count(),
        page: request.page.max(1),
        pages: query.total_pages(),
    })
}

pub fn print_sql(query: &ContentQuery) {
    let (search, params) = query.search_sql();
    let (count, _) = query.count_sql();
    info!("{search}");
    info!("{count}");
    info!("-- {} parameter(s): {params:?}", params.len());
}

pub fn print_listing(listing: &Listing, as_json: bool) {
    if as_json {
        print_json(&json!({
            "total": listing.total,
            "page": listing.page,
            "pages": listing.pages,
            "entries": listing.entries,
        }));
        return;
    }

    for entry in &listing.entries {
        let attrs = &entry["attributes"];
        info!(
            "{} {} [{}] {}",
            Colored(Cyan, display_value(&attrs["ID"])),
            display_value(&attrs["post_type"]),
            Colored(Green, display_value(&attrs["post_status"])),
            display_value(&attrs["post_title"]),
        );
    }
    info!(
        "{} of {} entries (page {}/{})",
        listing.entries.len(),
        listing.total,
        listing.page,
        listing.pages.max(1)
    );
}

pub fn show_entry(
    ctx: &ModelContext,
    id: i64,
    kind: &str,
    taxonomy: Option<&str>,
) -> CliResult<Value> {
    match taxonomy {
        Some(taxonomy) => entry_json(&ctx.load(TermKind::new(taxonomy), EntityId::Row(id))?),
        None => entry_json(&ctx.load(PostKind::from_name(kind), EntityId::Row(id))?),
    }
}

pub fn create_entry(
    ctx: &ModelContext,
    kind: &str,
    title: Option<&str>,
    attrs: &[String],
    fields: &[String],
) -> CliResult<Value> {
    let mut attributes = Attributes::new();
    if let Some(title) = title {
        attributes.insert(PostColumn::Title.to_string(), json!(title));
    }
    for raw in attrs {
        let (name, value) = parse_assignment(raw)?;
        let column = PostColumn::from_str(&name).map_err(folio_db::DbError::from)?;
        attributes.insert(column.to_string(), field_value(&value));
    }

    let mut model = ctx.create(PostKind::from_name(kind), attributes)?;
    apply_fields(&mut model, fields, &[])?;
    info!(
        "Created {} {}",
        model.kind().label(),
        Colored(Cyan, model.id().map(|id| id.to_string()).unwrap_or_default())
    );
    entry_json(&model)
}

pub fn create_term(
    ctx: &ModelContext,
    name: &str,
    taxonomy: &str,
    description: Option<&str>,
) -> CliResult<Value> {
    let mut attributes = Attributes::new();
    attributes.insert("name".into(), json!(name));
    if let Some(description) = description {
        attributes.insert("description".into(), json!(description));
    }

    let model = ctx.create(TermKind::new(taxonomy), attributes)?;
    info!(
        "Created {taxonomy} {}",
        Colored(Cyan, model.id().map(|id| id.to_string()).unwrap_or_default())
    );
    entry_json(&model)
}

/// Sets and removes site options, returning every option afterwards.
pub fn update_options(
    ctx: &ModelContext,
    pairs: &[String],
    unset: &[String],
) -> CliResult<Map<String, Value>> {
    let mut model = ctx.load(OptionKind, EntityId::Options)?;
    apply_fields(&mut model, pairs, unset)?;
    Ok(model.field_values()?)
}

fn apply_fields<K: EntityKind>(
    model: &mut Model<K>,
    pairs: &[String],
    unset: &[String],
) -> CliResult<()> {
    if pairs.is_empty() && unset.is_empty() {
        return Ok(());
    }
    for raw in pairs {
        let (key, value) = parse_assignment(raw)?;
        model.set_field(&key, field_value(&value))?;
    }
    for key in unset {
        model.remove_field(key)?;
    }
    model.save_fields()?;
    Ok(())
}

fn entry_json<K: EntityKind>(model: &Model<K>) -> CliResult<Value> {
    Ok(json!({
        "attributes": model.attributes(),
        "fields": model.field_values()?,
    }))
}

pub fn print_entry(entry: &Value, as_json: bool) {
    if as_json {
        print_json(entry);
        return;
    }
    for section in ["attributes", "fields"] {
        if let Some(values) = entry[section].as_object() {
            print_map(section, values);
        }
    }
}

pub fn print_map(title: &str, values: &Map<String, Value>) {
    info!("{}", Colored(Green, title));
    if values.is_empty() {
        info!("  {}", Colored(LightRed, "(none)"));
    }
    for (key, value) in values {
        info!("  {}: {}", Colored(Cyan, key), display_value(value));
    }
}

#[cfg(test)]
mod tests {
    use folio_config::TableNames;
    use folio_events::NullSink;
    use tempfile::TempDir;

    use super::*;
    use crate::error::CliError;

    fn context() -> ModelContext {
        let store = SqliteStore::open_in_memory(TableNames::default()).unwrap();
        create_schema(&store).unwrap();
        ModelContext::new(Arc::new(store))
    }

    fn request(kind: &str) -> ListRequest {
        ListRequest {
            kind: kind.to_string(),
            page: 1,
            ..Default::default()
        }
    }

    fn seed(ctx: &ModelContext) {
        for (title, price, status) in [
            ("Anvil", "40", "publish"),
            ("Bucket", "9", "publish"),
            ("Crate", "120", "publish"),
            ("Drum", "15", "draft"),
        ] {
            create_entry(
                ctx,
                "post",
                Some(title),
                &[format!("post_status={status}")],
                &[format!("price={price}"), "featured=yes".to_string()],
            )
            .unwrap();
        }
    }

    #[test]
    fn test_open_context_creates_database() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("folio.db");
        let ctx = open_context(&Config::default(), Some(path.clone()), Arc::new(NullSink)).unwrap();

        create_entry(&ctx, "page", Some("About"), &[], &[]).unwrap();
        assert!(path.exists());

        let listing = list_entries(&ctx, &request("page")).unwrap();
        assert_eq!(listing.total, 1);
    }

    #[test]
    fn test_list_orders_by_field_value() {
        let ctx = context();
        seed(&ctx);

        let titles = |listing: Listing| -> Vec<String> {
            listing
                .entries
                .iter()
                .filter_map(|entry| entry["attributes"]["post_title"].as_str().map(String::from))
                .collect()
        };

        let mut req = request("post");
        req.fields = vec!["featured=yes".to_string()];
        req.order_field = Some("price:desc".to_string());
        req.numeric = true;
        assert_eq!(
            titles(list_entries(&ctx, &req).unwrap()),
            vec!["Crate", "Anvil", "Bucket"]
        );

        req.numeric = false;
        assert_eq!(
            titles(list_entries(&ctx, &req).unwrap()),
            vec!["Bucket", "Anvil", "Crate"]
        );
    }

    #[test]
    fn test_list_status_options() {
        let ctx = context();
        seed(&ctx);

        assert_eq!(list_entries(&ctx, &request("post")).unwrap().total, 3);

        let mut req = request("post");
        req.status = Some("draft".into());
        assert_eq!(list_entries(&ctx, &req).unwrap().total, 1);

        let mut req = request("post");
        req.any_status = true;
        assert_eq!(list_entries(&ctx, &req).unwrap().total, 4);
    }

    #[test]
    fn test_list_paging() {
        let ctx = context();
        seed(&ctx);

        let mut req = request("post");
        req.order = Some("title:asc".into());
        req.per_page = Some(2);
        req.page = 2;
        let listing = list_entries(&ctx, &req).unwrap();
        assert_eq!(listing.total, 3);
        assert_eq!(listing.pages, 2);
        assert_eq!(listing.entries.len(), 1);
        assert_eq!(listing.entries[0]["attributes"]["post_title"], json!("Crate"));
        assert_eq!(listing.entries[0]["fields"]["price"], json!(120));
    }

    #[test]
    fn test_list_attribute_collection_filter() {
        let ctx = context();
        seed(&ctx);

        let mut req = request("post");
        req.attrs = vec!["title=Anvil,Crate".into()];
        assert_eq!(list_entries(&ctx, &req).unwrap().total, 2);

        let mut req = request("post");
        req.attrs = vec!["no_such_column=1".into()];
        assert!(matches!(
            list_entries(&ctx, &req),
            Err(CliError::Db(ref err)) if err.is_configuration()
        ));
    }

    #[test]
    fn test_list_numeric_field_range() {
        let ctx = context();
        seed(&ctx);

        let mut req = request("post");
        req.fields = vec!["price>=10".into(), "price<=100".into()];
        let listing = list_entries(&ctx, &req).unwrap();
        assert_eq!(listing.total, 1);
        assert_eq!(listing.entries[0]["attributes"]["post_title"], json!("Anvil"));
    }

    #[test]
    fn test_build_query_binds_field_keys() {
        let ctx = context();
        let mut req = request("post");
        req.fields = vec!["color=red,blue".into()];
        let query = build_query(&ctx, &req).unwrap();

        let (sql, params) = query.search_sql();
        assert!(!sql.contains("'color'"));
        assert!(!sql.contains("'red'"));
        assert_eq!(params.len(), 5);
    }

    #[test]
    fn test_show_and_options() {
        let ctx = context();
        let created = create_entry(&ctx, "post", Some("Hello"), &[], &["seo.title=Hi".into()]).unwrap();
        let id = created["attributes"]["ID"].as_i64().unwrap();

        let shown = show_entry(&ctx, id, "post", None).unwrap();
        assert_eq!(shown["fields"]["seo"]["title"], json!("Hi"));

        let term = create_term(&ctx, "Hand Tools", "category", None).unwrap();
        let term_id = term["attributes"]["term_id"].as_i64().unwrap();
        let shown = show_entry(&ctx, term_id, "post", Some("category")).unwrap();
        assert_eq!(shown["attributes"]["slug"], json!("hand-tools"));

        let options = update_options(&ctx, &["footer=Folio".into(), "count=3".into()], &[]).unwrap();
        assert_eq!(options.len(), 2);
        let options = update_options(&ctx, &[], &["count".into()]).unwrap();
        assert_eq!(options.get("footer"), Some(&json!("Folio")));
        assert_eq!(options.get("count"), None);
    }

    #[test]
    fn test_show_missing_entry() {
        let ctx = context();
        assert!(matches!(
            show_entry(&ctx, 99, "post", None),
            Err(CliError::Model(folio_model::ModelError::NotFound { .. }))
        ));
    }
}
