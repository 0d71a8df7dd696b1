use std::{
    fs,
    path::{Path, PathBuf},
    sync::{LazyLock, RwLock},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    error::{ConfigError, Result},
    paths::{xdg_config_home, xdg_data_home},
    tables::{TableNames, TableOverrides},
};

/// Application's configuration
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Path to the SQLite content database.
    /// Default: $XDG_DATA_HOME/folio/folio.db
    pub db_path: Option<String>,

    /// Prefix applied to every table name.
    /// Default: "wp_"
    pub table_prefix: String,

    /// Explicit table names, overriding the prefixed defaults.
    pub tables: TableOverrides,

    /// Listing query defaults.
    pub query: QueryConfig,
}

/// Defaults applied to every content query.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct QueryConfig {
    /// Status a row must have to be listed.
    /// Default: "publish"
    pub published_status: String,

    /// Page window size.
    /// Default: 15
    pub per_page: u64,

    /// Number of random letters in a key/value join alias.
    /// Default: 8
    pub alias_length: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            published_status: "publish".to_string(),
            per_page: 15,
            alias_length: 8,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: None,
            table_prefix: "wp_".to_string(),
            tables: TableOverrides::default(),
            query: QueryConfig::default(),
        }
    }
}

pub static CONFIG_PATH: LazyLock<RwLock<PathBuf>> = LazyLock::new(|| {
    RwLock::new(match std::env::var("FOLIO_CONFIG") {
        Ok(path_str) => PathBuf::from(path_str),
        Err(_) => xdg_config_home().join("folio").join("config.toml"),
    })
});

/// Overrides the location [`Config::new`] reads from.
pub fn set_config_path<P: AsRef<Path>>(path: P) {
    let mut config_path = CONFIG_PATH.write().unwrap();
    *config_path = path.as_ref().to_path_buf();
}

pub fn config_path() -> PathBuf {
    CONFIG_PATH.read().unwrap().to_path_buf()
}

impl Config {
    /// Loads the configuration from [`CONFIG_PATH`].
    /// If the configuration file is not found, it uses the default configuration.
    pub fn new() -> Result<Self> {
        Self::load(config_path())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config: Config = match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no config at {}, using defaults", path.display());
                Self::default()
            }
            Err(err) => return Err(ConfigError::IoError(err)),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.tables()?;

        if self.query.per_page == 0 {
            return Err(ConfigError::InvalidValue {
                key: "query.per_page",
                reason: "must be greater than zero".into(),
            });
        }
        if self.query.alias_length < 3 {
            return Err(ConfigError::InvalidValue {
                key: "query.alias_length",
                reason: "must be at least 3".into(),
            });
        }
        if self.query.published_status.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "query.published_status",
                reason: "cannot be empty".into(),
            });
        }
        Ok(())
    }

    pub fn tables(&self) -> Result<TableNames> {
        TableNames::resolve(&self.table_prefix, &self.tables)
    }

    pub fn get_db_path(&self) -> PathBuf {
        if let Ok(env_path) = std::env::var("FOLIO_DB") {
            return PathBuf::from(env_path);
        }
        match &self.db_path {
            Some(path) => PathBuf::from(path),
            None => xdg_data_home().join("folio").join("folio.db"),
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Writes the default configuration to [`CONFIG_PATH`].
pub fn generate_default_config() -> Result<PathBuf> {
    let config_path = config_path();

    if config_path.exists() {
        return Err(ConfigError::ConfigAlreadyExists);
    }

    let serialized = Config::default().to_toml()?;
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&config_path, serialized)?;
    info!(
        "Default configuration file generated at: {}",
        config_path.display()
    );
    Ok(config_path)
}
