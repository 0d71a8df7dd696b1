use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("TOML serialization error: {0}")]
    #[diagnostic(
        code(folio_config::toml_serialize),
        help("Check your configuration structure for invalid values")
    )]
    TomlSerError(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    #[diagnostic(
        code(folio_config::toml_deserialize),
        help("Check your config.toml syntax and structure")
    )]
    TomlDeError(#[from] toml::de::Error),

    #[error("Configuration file already exists")]
    #[diagnostic(
        code(folio_config::already_exists),
        help("Remove the existing config file or use a different location")
    )]
    ConfigAlreadyExists,

    #[error("Invalid table name `{0}`")]
    #[diagnostic(
        code(folio_config::invalid_table_name),
        help("Table names may only contain ASCII letters, digits and underscores, and cannot start with a digit")
    )]
    InvalidTableName(String),

    #[error("Invalid value for `{key}`: {reason}")]
    #[diagnostic(code(folio_config::invalid_value))]
    InvalidValue { key: &'static str, reason: String },

    #[error("IO error: {0}")]
    #[diagnostic(code(folio_config::io))]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
