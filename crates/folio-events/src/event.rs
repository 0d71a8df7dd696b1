/// All event types emitted by folio models and listings.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelEvent {
    /// A lifecycle step on one entity.
    Lifecycle {
        /// Entity kind label, e.g. `post`, `category`, `option`.
        entity: String,
        /// Entity id, when one is known at this stage.
        id: Option<String>,
        stage: LifecycleStage,
    },
    /// A listing query ran against the store.
    Query {
        entity: String,
        stage: QueryStage,
    },
}

/// Lifecycle stages, each emitted before (`Pre*`) and after the step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleStage {
    PreLoad,
    Load,
    PreCreate,
    Create,
    PreGhost,
    Ghost,
    PreLoadAttributes,
    LoadAttributes,
    PreSaveAttributes,
    SaveAttributes,
    PreLoadFields,
    LoadFields,
    PreSaveFields,
    SaveFields,
    PreSave,
    Save,
}

/// Query stages.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryStage {
    Started,
    Counted { total: u64 },
    Searched { rows: usize },
    Failed(String),
}

impl LifecycleStage {
    pub fn is_pre(&self) -> bool {
        matches!(
            self,
            LifecycleStage::PreLoad
                | LifecycleStage::PreCreate
                | LifecycleStage::PreGhost
                | LifecycleStage::PreLoadAttributes
                | LifecycleStage::PreSaveAttributes
                | LifecycleStage::PreLoadFields
                | LifecycleStage::PreSaveFields
                | LifecycleStage::PreSave
        )
    }
}
