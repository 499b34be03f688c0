//! Manifest type definitions
//!
//! Typed records for `marketplace.json` and `plugin.json`. Values of these
//! types are only produced by the validator, so every instance satisfies the
//! schema rules.

use serde::{Deserialize, Serialize};

/// Marketplace manifest (`.claude-plugin/marketplace.json`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketplaceManifest {
    /// Marketplace display name
    pub name: String,
    /// Owner information
    pub owner: MarketplaceOwner,
    /// Plugins offered by this marketplace, in file order
    pub plugins: Vec<PluginReference>,
}

/// Marketplace owner information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketplaceOwner {
    pub name: String,
}

/// Plugin entry in marketplace.json
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginReference {
    /// Plugin name
    pub name: String,
    /// Relative path to the plugin directory (e.g. "./plugins/my-plugin")
    pub source: String,
    pub description: String,
}

/// Plugin manifest (plugin.json)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginManifest {
    /// Kebab-case plugin name
    pub name: String,
    pub description: String,
    /// MAJOR.MINOR.PATCH
    pub version: String,
    pub author: PluginAuthor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
}

/// Plugin author information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginAuthor {
    pub name: String,
}

/// Which schema a document is checked against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    Marketplace,
    Plugin,
}

impl std::fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Marketplace => write!(f, "marketplace"),
            Self::Plugin => write!(f, "plugin"),
        }
    }
}

impl MarketplaceManifest {
    /// Plugin names that appear more than once, in order of first repeat.
    ///
    /// Duplicates are not a schema violation; callers decide whether to warn.
    pub fn duplicate_plugin_names(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut duplicates = Vec::new();

        for plugin in &self.plugins {
            if !seen.insert(plugin.name.as_str()) && !duplicates.contains(&plugin.name) {
                duplicates.push(plugin.name.clone());
            }
        }

        duplicates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(name: &str) -> PluginReference {
        PluginReference {
            name: name.to_string(),
            source: format!("./plugins/{}", name),
            description: "test".to_string(),
        }
    }

    #[test]
    fn duplicate_names_reported_once() {
        let marketplace = MarketplaceManifest {
            name: "core".to_string(),
            owner: MarketplaceOwner {
                name: "Owner".to_string(),
            },
            plugins: vec![
                reference("a"),
                reference("b"),
                reference("a"),
                reference("a"),
            ],
        };

        assert_eq!(marketplace.duplicate_plugin_names(), vec!["a"]);
    }

    #[test]
    fn plugin_manifest_omits_absent_optionals() {
        let manifest = PluginManifest {
            name: "x".to_string(),
            description: "d".to_string(),
            version: "0.1.0".to_string(),
            author: PluginAuthor {
                name: "A".to_string(),
            },
            keywords: None,
            license: None,
        };

        let value = serde_json::to_value(&manifest).unwrap();
        assert!(value.get("keywords").is_none());
        assert!(value.get("license").is_none());
    }
}
