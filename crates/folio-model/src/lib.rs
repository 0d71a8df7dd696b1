//! Content entities on top of folio-db: posts, pages, media, taxonomy
//! terms and site options, each with a custom field set.

pub mod context;
pub mod error;
pub mod fields;
pub mod kind;
pub mod model;
pub mod path;

pub use context::ModelContext;
pub use error::{ModelError, Result};
pub use fields::{FieldManager, FieldTarget};
pub use kind::{Attributes, EntityId, EntityKind, OptionKind, PostKind, TermKind};
pub use model::{uuid, Model};
