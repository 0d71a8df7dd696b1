//! Error types for folio-db.

use miette::Diagnostic;
use thiserror::Error;

/// Invalid filter or clause input, rejected before anything reaches the store.
#[derive(Error, Diagnostic, Debug, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Empty value collection for `{0}`")]
    #[diagnostic(
        code(folio_db::empty_collection),
        help("Pass at least one value, or drop the filter")
    )]
    EmptyCollection(String),

    #[error("Unknown column `{0}`")]
    #[diagnostic(
        code(folio_db::unknown_column),
        help("Only base table columns known to folio can be filtered or sorted on")
    )]
    UnknownColumn(String),

    #[error("Unknown comparison operator `{0}`")]
    #[diagnostic(
        code(folio_db::unknown_operator),
        help("Use one of =, !=, >, >=, <, <=, LIKE, NOT LIKE")
    )]
    UnknownOperator(String),

    #[error("Fragment `{fragment}` has {placeholders} placeholder(s) but {parameters} parameter(s)")]
    #[diagnostic(code(folio_db::invalid_fragment))]
    InvalidFragment {
        fragment: String,
        placeholders: usize,
        parameters: usize,
    },
}

/// Database error type for folio-db operations.
#[derive(Error, Diagnostic, Debug)]
pub enum DbError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("Statement has {placeholders} placeholder(s) but {parameters} parameter(s)")]
    #[diagnostic(
        code(folio_db::parameter_mismatch),
        help("This is an internal error, please report it")
    )]
    ParameterMismatch {
        placeholders: usize,
        parameters: usize,
    },

    #[error("Statement execution failed: {0}")]
    #[diagnostic(
        code(folio_db::execution),
        help("Check that the database schema exists; run 'folio init' to create it")
    )]
    Execution(#[from] rusqlite::Error),

    #[error("Expected a non-negative integer scalar, got {0}")]
    #[diagnostic(code(folio_db::unexpected_scalar))]
    UnexpectedScalar(String),

    #[error("Thread lock poison error")]
    #[diagnostic(
        code(folio_db::poison),
        help("This is an internal error, please report it")
    )]
    PoisonError,

    #[error("IO error: {0}")]
    #[diagnostic(
        code(folio_db::io),
        help("Check file permissions and disk space")
    )]
    IoError(#[from] std::io::Error),
}

impl DbError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, DbError::Configuration(_))
    }

    pub fn is_execution(&self) -> bool {
        matches!(self, DbError::Execution(_))
    }
}

/// Result type alias for folio-db operations.
pub type Result<T> = std::result::Result<T, DbError>;
