//! Deployment-specific table names.
//!
//! Every name here is interpolated into SQL text by the query builders, so
//! [`TableNames::validate`] rejects anything that is not a plain identifier.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Per-table overrides. Any table left unset is derived from the prefix.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct TableOverrides {
    pub posts: Option<String>,
    pub postmeta: Option<String>,
    pub terms: Option<String>,
    pub term_taxonomy: Option<String>,
    pub termmeta: Option<String>,
    pub options: Option<String>,
}

/// Fully resolved table names handed to the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableNames {
    /// Base entity table (documents, pages, media).
    pub posts: String,
    /// Key/value attribute table joined by the content query.
    pub postmeta: String,
    pub terms: String,
    pub term_taxonomy: String,
    pub termmeta: String,
    pub options: String,
}

impl TableNames {
    /// Builds the standard table set for a prefix such as `wp_`.
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            posts: format!("{prefix}posts"),
            postmeta: format!("{prefix}postmeta"),
            terms: format!("{prefix}terms"),
            term_taxonomy: format!("{prefix}term_taxonomy"),
            termmeta: format!("{prefix}termmeta"),
            options: format!("{prefix}options"),
        }
    }

    /// Applies the configured overrides on top of the prefixed defaults.
    pub fn resolve(prefix: &str, overrides: &TableOverrides) -> Result<Self> {
        let defaults = Self::with_prefix(prefix);
        let pick = |value: &Option<String>, default: String| value.clone().unwrap_or(default);

        let tables = Self {
            posts: pick(&overrides.posts, defaults.posts),
            postmeta: pick(&overrides.postmeta, defaults.postmeta),
            terms: pick(&overrides.terms, defaults.terms),
            term_taxonomy: pick(&overrides.term_taxonomy, defaults.term_taxonomy),
            termmeta: pick(&overrides.termmeta, defaults.termmeta),
            options: pick(&overrides.options, defaults.options),
        };
        tables.validate()?;
        Ok(tables)
    }

    pub fn validate(&self) -> Result<()> {
        for name in [
            &self.posts,
            &self.postmeta,
            &self.terms,
            &self.term_taxonomy,
            &self.termmeta,
            &self.options,
        ] {
            if !is_identifier(name) {
                return Err(ConfigError::InvalidTableName(name.clone()));
            }
        }
        Ok(())
    }
}

impl Default for TableNames {
    fn default() -> Self {
        Self::with_prefix("wp_")
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_prefix() {
        let tables = TableNames::with_prefix("cms_");
        assert_eq!(tables.posts, "cms_posts");
        assert_eq!(tables.postmeta, "cms_postmeta");
        assert_eq!(tables.options, "cms_options");
    }

    #[test]
    fn test_resolve_applies_overrides() {
        let overrides = TableOverrides {
            postmeta: Some("custom_meta".into()),
            ..Default::default()
        };
        let tables = TableNames::resolve("wp_", &overrides).unwrap();
        assert_eq!(tables.posts, "wp_posts");
        assert_eq!(tables.postmeta, "custom_meta");
    }

    #[test]
    fn test_resolve_rejects_injection() {
        let overrides = TableOverrides {
            posts: Some("posts; DROP TABLE users".into()),
            ..Default::default()
        };
        let result = TableNames::resolve("wp_", &overrides);
        assert!(matches!(result, Err(ConfigError::InvalidTableName(_))));
    }

    #[test]
    fn test_resolve_rejects_leading_digit() {
        let result = TableNames::resolve("1wp_", &TableOverrides::default());
        assert!(matches!(result, Err(ConfigError::InvalidTableName(_))));
    }
}
