//! Entity lifecycle: load, create, ghost, and the attribute/field steps
//! that make up a save.
//!
//! Every step emits a pre and post [`LifecycleStage`] through the
//! context's event sink.

use folio_events::{LifecycleStage, ModelEvent};
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use crate::{
    context::ModelContext,
    error::{ModelError, Result},
    fields::FieldManager,
    kind::{Attributes, EntityId, EntityKind},
    path,
};

pub struct Model<K: EntityKind> {
    kind: K,
    ctx: ModelContext,
    attributes: Attributes,
    fields: Option<FieldManager>,
    ghost: bool,
}

impl<K: EntityKind> Model<K> {
    fn blank(ctx: &ModelContext, kind: K, attributes: Attributes, ghost: bool) -> Self {
        Self {
            kind,
            ctx: ctx.clone(),
            attributes,
            fields: None,
            ghost,
        }
    }

    /// Loads attributes and fields of an existing entity.
    pub fn load(ctx: &ModelContext, kind: K, id: impl Into<EntityId>) -> Result<Self> {
        let mut attributes = Attributes::new();
        if let EntityId::Row(id) = id.into() {
            attributes.insert(kind.id_attribute().to_string(), Value::from(id));
        }

        let mut model = Self::blank(ctx, kind, attributes, false);
        model.emit(LifecycleStage::PreLoad);
        model.load_attributes()?.load_fields()?;
        model.emit(LifecycleStage::Load);
        Ok(model)
    }

    /// Creates and saves a new entity from `inject`, filled up with the
    /// kind's defaults.
    pub fn create(ctx: &ModelContext, kind: K, inject: Attributes) -> Result<Self> {
        let mut model = Self::blank(ctx, kind, inject, false);
        model.emit(LifecycleStage::PreCreate);
        model.save()?;
        model.emit(LifecycleStage::Create);
        Ok(model)
    }

    /// Materializes an entity from values already in hand, without reading
    /// the store. `attributes` must carry the id.
    pub fn ghost(
        ctx: &ModelContext,
        kind: K,
        attributes: Attributes,
        fields: Map<String, Value>,
    ) -> Result<Self> {
        let mut model = Self::blank(ctx, kind, Attributes::new(), true);
        model.emit(LifecycleStage::PreGhost);

        model.attributes = attributes;
        let id = model.require_id()?;
        model.fields = Some(FieldManager::new(model.kind.field_target(id)).inject(fields));

        model.emit(LifecycleStage::Ghost);
        Ok(model)
    }

    /// Builds a model from an already fetched base row and loads its fields.
    pub(crate) fn hydrate(ctx: &ModelContext, kind: K, attributes: Attributes) -> Result<Self> {
        let mut model = Self::blank(ctx, kind, attributes, false);
        model.emit(LifecycleStage::PreLoad);
        model.load_fields()?;
        model.emit(LifecycleStage::Load);
        Ok(model)
    }

    pub fn kind(&self) -> &K {
        &self.kind
    }

    pub fn id(&self) -> Option<EntityId> {
        self.kind.id(&self.attributes)
    }

    pub fn is_ghost(&self) -> bool {
        self.ghost
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attribute(&self, path: &str) -> Option<&Value> {
        path::get(&self.attributes, path).filter(|value| !value.is_null())
    }

    pub fn attribute_or(&self, path: &str, default: Value) -> Value {
        self.attribute(path).cloned().unwrap_or(default)
    }

    pub fn set_attribute(&mut self, path: &str, value: Value) -> Result<&mut Self> {
        path::set(&mut self.attributes, path, value)?;
        Ok(self)
    }

    /// Identifier the field layer knows this entity by.
    pub fn field_id(&self) -> Result<String> {
        let id = self.require_id()?;
        Ok(self.kind.field_id(id))
    }

    pub fn field_manager(&self) -> Option<&FieldManager> {
        self.fields.as_ref()
    }

    pub fn field(&self, path: &str) -> Result<Option<&Value>> {
        self.require_id()?;
        Ok(self.fields.as_ref().and_then(|fields| fields.get(path)))
    }

    pub fn field_or(&self, path: &str, default: Value) -> Result<Value> {
        Ok(self.field(path)?.cloned().unwrap_or(default))
    }

    pub fn set_field(&mut self, path: &str, value: Value) -> Result<&mut Self> {
        let target = self.kind.field_target(self.require_id()?);
        self.fields
            .get_or_insert_with(|| FieldManager::new(target))
            .set(path, value)?;
        Ok(self)
    }

    /// Clears a field; it is deleted from the store on the next save.
    pub fn remove_field(&mut self, path: &str) -> Result<&mut Self> {
        self.set_field(path, Value::Null)
    }

    pub fn field_values(&self) -> Result<Map<String, Value>> {
        self.require_id()?;
        Ok(self
            .fields
            .as_ref()
            .map(FieldManager::dump)
            .unwrap_or_default())
    }

    pub fn load_fields(&mut self) -> Result<&mut Self> {
        let target = self.kind.field_target(self.require_id()?);
        self.emit(LifecycleStage::PreLoadFields);
        self.fields = Some(FieldManager::load(self.ctx.store().as_ref(), target)?);
        self.emit(LifecycleStage::LoadFields);
        Ok(self)
    }

    pub fn save_fields(&mut self) -> Result<&mut Self> {
        let target = self.kind.field_target(self.require_id()?);
        self.emit(LifecycleStage::PreSaveFields);
        self.fields
            .get_or_insert_with(|| FieldManager::new(target))
            .save(self.ctx.store().as_ref())?;
        self.emit(LifecycleStage::SaveFields);
        Ok(self)
    }

    /// Replaces the attributes with the stored record.
    pub fn load_attributes(&mut self) -> Result<&mut Self> {
        if !self.kind.has_attributes() {
            return Ok(self);
        }
        let id = self.require_id()?;
        self.emit(LifecycleStage::PreLoadAttributes);

        let record = self
            .kind
            .load_attributes(self.ctx.store().as_ref(), id)?
            .ok_or_else(|| ModelError::NotFound {
                entity: self.kind.label().to_string(),
                id: id.to_string(),
            })?;
        self.attributes = record;

        self.emit(LifecycleStage::LoadAttributes);
        Ok(self)
    }

    /// Inserts the base record when the entity has no id yet, updates it
    /// otherwise.
    pub fn save_attributes(&mut self) -> Result<&mut Self> {
        if !self.kind.has_attributes() {
            return Ok(self);
        }
        self.emit(LifecycleStage::PreSaveAttributes);
        let store = self.ctx.store().clone();

        match self.id() {
            Some(id) => {
                self.kind
                    .update_attributes(store.as_ref(), id, &self.attributes)?;
            }
            None => {
                let mut merged = self.kind.attribute_defaults();
                merged.extend(std::mem::take(&mut self.attributes));
                let new_id = self.kind.insert_attributes(store.as_ref(), &merged)?;
                debug!("inserted {} {new_id}", self.kind.label());

                merged.insert(self.kind.id_attribute().to_string(), Value::from(new_id));
                self.attributes = merged;
                self.load_attributes()?;
            }
        }

        self.emit(LifecycleStage::SaveAttributes);
        Ok(self)
    }

    pub fn save(&mut self) -> Result<&mut Self> {
        self.emit(LifecycleStage::PreSave);
        self.save_attributes()?.save_fields()?;
        self.ghost = false;
        self.emit(LifecycleStage::Save);
        Ok(self)
    }

    fn require_id(&self) -> Result<EntityId> {
        self.id().ok_or_else(|| ModelError::NotLoaded {
            entity: self.kind.label().to_string(),
        })
    }

    fn emit(&self, stage: LifecycleStage) {
        self.ctx.events().emit(ModelEvent::Lifecycle {
            entity: self.kind.label().to_string(),
            id: self.id().map(|id| id.to_string()),
            stage,
        });
    }
}

/// A random (v4) record UUID in uppercase.
pub fn uuid() -> String {
    Uuid::new_v4().to_string().to_uppercase()
}
