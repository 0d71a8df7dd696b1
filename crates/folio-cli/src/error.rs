use folio_config::ConfigError;
use folio_db::DbError;
use folio_model::ModelError;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum CliError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Model(#[from] ModelError),

    #[error("Invalid filter `{0}`")]
    #[diagnostic(
        code(folio_cli::invalid_filter),
        help("Filters look like KEY=VALUE, KEY>=10, KEY~%draft% or KEY=a,b,c")
    )]
    InvalidFilter(String),

    #[error("Invalid assignment `{0}`")]
    #[diagnostic(code(folio_cli::invalid_assignment), help("Use KEY=VALUE"))]
    InvalidAssignment(String),

    #[error("Invalid order `{0}`")]
    #[diagnostic(code(folio_cli::invalid_order), help("Use NAME, NAME:asc or NAME:desc"))]
    InvalidOrder(String),

    #[error("Failed to set up logging: {0}")]
    #[diagnostic(code(folio_cli::logging))]
    Logging(String),

    #[error("IO error: {0}")]
    #[diagnostic(code(folio_cli::io))]
    IoError(#[from] std::io::Error),
}

pub type CliResult<T> = std::result::Result<T, CliError>;
