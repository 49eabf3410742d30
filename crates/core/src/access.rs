//! Permission lookup by type tag
//!
//! A [`PermissionTable`] is an ordered list of `(tag, permission)` rules plus
//! an optional default. Callers describe what they are with a list of tags,
//! most specific first; the first tag with a rule decides the permission.

use serde::{Deserialize, Serialize};

/// Tag that matches any caller
pub const WILDCARD_TAG: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccessRule {
    pub tag: String,
    pub permission: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    #[error("Permission denied: {permission} is required for {tag}")]
    PermissionDenied { tag: String, permission: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionTable {
    rules: Vec<AccessRule>,
    default: Option<String>,
}

impl PermissionTable {
    pub fn new(rules: Vec<AccessRule>, default: Option<String>) -> Self {
        Self { rules, default }
    }

    /// Permission required for the given tags, most specific first
    ///
    /// Every tag is tried against the exact rules before the wildcard rule,
    /// then the default applies.
    pub fn resolve(&self, tags: &[&str]) -> Option<&str> {
        tags.iter()
            .find_map(|tag| self.rule_for(tag))
            .or_else(|| self.rule_for(WILDCARD_TAG))
            .or(self.default.as_deref())
    }

    fn rule_for(&self, tag: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| rule.tag == tag)
            .map(|rule| rule.permission.as_str())
    }

    /// Check the tags against a set of granted permissions
    pub fn check(&self, tags: &[&str], granted: &[String]) -> Result<(), AccessError> {
        match self.resolve(tags) {
            Some(permission) if !granted.iter().any(|g| g == permission) => {
                Err(AccessError::PermissionDenied {
                    tag: tags.first().copied().unwrap_or(WILDCARD_TAG).to_string(),
                    permission: permission.to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}

/// Tags for a browse source, most specific first
pub fn browse_tags(source: &str) -> [String; 2] {
    [format!("alphabrowse:{source}"), "alphabrowse".to_string()]
}
