use folio_db::DbError;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ModelError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Db(#[from] DbError),

    #[error("No {entity} is loaded")]
    #[diagnostic(
        code(folio_model::not_loaded),
        help("Load, create or ghost the entity with an id before touching its fields")
    )]
    NotLoaded { entity: String },

    #[error("{entity} {id} not found")]
    #[diagnostic(code(folio_model::not_found))]
    NotFound { entity: String, id: String },

    #[error("Invalid path `{0}`")]
    #[diagnostic(
        code(folio_model::invalid_path),
        help("Paths are dot separated keys or indices, e.g. `gallery.0.caption`")
    )]
    InvalidPath(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
