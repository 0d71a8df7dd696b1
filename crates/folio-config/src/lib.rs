pub mod config;
pub mod error;
pub mod paths;
pub mod tables;

pub use config::{Config, QueryConfig};
pub use error::{ConfigError, Result};
pub use tables::TableNames;

#[cfg(test)]
pub mod test_utils;
