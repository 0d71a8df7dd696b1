//! Shared handles for models and content listings.

use std::sync::Arc;

use folio_db::{ContentQuery, QueryOptions, StoreHandle};
use folio_events::{EventSinkHandle, ModelEvent, NullSink, QueryStage};
use serde_json::{Map, Value};
use tracing::warn;

use crate::{
    error::Result,
    kind::{Attributes, EntityId, EntityKind, PostKind},
    model::Model,
};

/// The store and event sink every model operation runs against, plus the
/// defaults new listings start from.
#[derive(Clone)]
pub struct ModelContext {
    store: StoreHandle,
    events: EventSinkHandle,
    options: QueryOptions,
}

impl ModelContext {
    pub fn new(store: StoreHandle) -> Self {
        Self {
            store,
            events: Arc::new(NullSink),
            options: QueryOptions::default(),
        }
    }

    pub fn with_events(mut self, events: EventSinkHandle) -> Self {
        self.events = events;
        self
    }

    pub fn with_query_options(mut self, options: QueryOptions) -> Self {
        self.options = options;
        self
    }

    pub fn store(&self) -> &StoreHandle {
        &self.store
    }

    pub fn events(&self) -> &EventSinkHandle {
        &self.events
    }

    pub fn query_options(&self) -> &QueryOptions {
        &self.options
    }

    /// A fresh listing query with the context defaults.
    pub fn query(&self) -> ContentQuery {
        ContentQuery::with_options(self.store.clone(), self.options.clone())
    }

    /// A listing query restricted to one content type. Media is listed
    /// under its own status unless the defaults list every status.
    pub fn query_for(&self, kind: &PostKind) -> Result<ContentQuery> {
        let mut options = self.options.clone();
        if kind.is_media() && options.status.is_some() {
            options.status = kind.default_status().map(String::from);
        }
        let mut query = ContentQuery::with_options(self.store.clone(), options);
        query.filter_by_type(kind.post_type())?;
        Ok(query)
    }

    /// Runs `query` and turns every row into a model with its fields loaded.
    pub fn list(&self, kind: &PostKind, query: &mut ContentQuery) -> Result<Vec<Model<PostKind>>> {
        let entity = kind.post_type().to_string();
        self.emit_query(&entity, QueryStage::Started);

        if let Err(err) = query.execute() {
            warn!("listing {entity} failed: {err}");
            self.emit_query(&entity, QueryStage::Failed(err.to_string()));
            return Err(err.into());
        }
        self.emit_query(
            &entity,
            QueryStage::Counted {
                total: query.total_count(),
            },
        );
        self.emit_query(
            &entity,
            QueryStage::Searched {
                rows: query.results().len(),
            },
        );

        query
            .results()
            .iter()
            .map(|row| Model::hydrate(self, kind.clone(), row.to_json()))
            .collect()
    }

    pub fn load<K: EntityKind>(&self, kind: K, id: impl Into<EntityId>) -> Result<Model<K>> {
        Model::load(self, kind, id)
    }

    pub fn create<K: EntityKind>(&self, kind: K, inject: Attributes) -> Result<Model<K>> {
        Model::create(self, kind, inject)
    }

    pub fn ghost<K: EntityKind>(
        &self,
        kind: K,
        attributes: Attributes,
        fields: Map<String, Value>,
    ) -> Result<Model<K>> {
        Model::ghost(self, kind, attributes, fields)
    }

    fn emit_query(&self, entity: &str, stage: QueryStage) {
        self.events.emit(ModelEvent::Query {
            entity: entity.to_string(),
            stage,
        });
    }
}
