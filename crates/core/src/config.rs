//! Browse configuration
//!
//! Typed view of the TOML configuration file. Every section is optional;
//! missing values fall back to the defaults of a stock catalog install.

use crate::access::{AccessRule, PermissionTable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Error type for configuration loading
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(msg) => write!(f, "IO error: {}", msg),
            ConfigError::ParseError(msg) => write!(f, "Invalid configuration file: {}", msg),
            ConfigError::InvalidValue(msg) => write!(f, "Invalid configuration value: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err.to_string())
    }
}

/// Complete configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub backend: BackendConfig,
    pub alphabrowse: AlphaBrowseConfig,
    pub nearby: NearbyConfig,
    pub access: AccessConfig,
}

/// Location of the Solr core hosting the browse handler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackendConfig {
    pub url: String,
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8983/solr/biblio".to_string(),
            timeout_secs: 30,
        }
    }
}

/// A browse index offered to users, in display order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowseType {
    pub source: String,
    pub label: String,
}

impl BrowseType {
    fn new(source: &str, label: &str) -> Self {
        Self {
            source: source.to_string(),
            label: label.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlphaBrowseConfig {
    pub page_size: i64,
    pub rows_before: i64,
    pub highlighting: bool,
    pub types: Vec<BrowseType>,
    /// Source name to colon-separated extra fields (e.g. `author:format`)
    pub extras: BTreeMap<String, String>,
}

impl Default for AlphaBrowseConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            rows_before: 0,
            highlighting: false,
            types: vec![
                BrowseType::new("topic", "By Topic"),
                BrowseType::new("author", "By Author"),
                BrowseType::new("title", "By Title"),
                BrowseType::new("lcc", "By Call Number"),
            ],
            extras: BTreeMap::from([
                ("title".to_string(), "author:format:publishDate".to_string()),
                ("lcc".to_string(), "title".to_string()),
                ("dewey".to_string(), "title".to_string()),
            ]),
        }
    }
}

impl AlphaBrowseConfig {
    /// Extra backend parameters for a browse source
    pub fn extra_params(&self, source: &str) -> BTreeMap<String, String> {
        self.extras
            .get(source)
            .filter(|fields| !fields.is_empty())
            .map(|fields| BTreeMap::from([("extras".to_string(), fields.clone())]))
            .unwrap_or_default()
    }

    /// Whether `source` is one of the configured browse types
    pub fn has_type(&self, source: &str) -> bool {
        self.types.iter().any(|t| t.source == source)
    }
}

/// "Nearby items" lookups around a single anchor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NearbyConfig {
    pub source: String,
    pub size: i64,
    pub rows_before: i64,
}

impl Default for NearbyConfig {
    fn default() -> Self {
        Self {
            source: "lcc".to_string(),
            size: 20,
            rows_before: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AccessConfig {
    /// Checked in order; the first matching tag wins
    pub rules: Vec<AccessRule>,
    pub default: Option<String>,
    /// Permissions held by callers of this deployment
    pub granted: Vec<String>,
}

impl AccessConfig {
    pub fn permission_table(&self) -> PermissionTable {
        PermissionTable::new(self.rules.clone(), self.default.clone())
    }
}

impl Config {
    /// Reject values the browse calculator cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.url.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "backend.url must not be empty".to_string(),
            ));
        }

        if self.alphabrowse.page_size <= 0 {
            return Err(ConfigError::InvalidValue(format!(
                "alphabrowse.page_size must be positive, got {}",
                self.alphabrowse.page_size
            )));
        }

        if self.alphabrowse.rows_before < 0 {
            return Err(ConfigError::InvalidValue(format!(
                "alphabrowse.rows_before must not be negative, got {}",
                self.alphabrowse.rows_before
            )));
        }

        if self.nearby.size <= 0 || self.nearby.rows_before < 0 {
            return Err(ConfigError::InvalidValue(
                "nearby.size must be positive and nearby.rows_before not negative".to_string(),
            ));
        }

        if let Some(empty) = self.alphabrowse.types.iter().find(|t| t.source.is_empty()) {
            return Err(ConfigError::InvalidValue(format!(
                "browse type '{}' has an empty source",
                empty.label
            )));
        }

        Ok(())
    }
}

/// Parse and validate configuration text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// A missing file is not an error: the defaults are returned instead.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path)?;
    parse_config(&content)
}
