use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PlugkitError, Result};
use crate::manifest::{is_kebab_case, is_semver};

const CONFIG_FILE: &str = "config.toml";

/// Default config template with rich comments
const DEFAULT_CONFIG_TEMPLATE: &str = r#"# plugkit configuration file
# Location: ~/.plugkit/config.toml

[generator]
# Placeholder owner written to marketplace.json
owner_name = "Plugin Owner"

# Placeholder author written to the sample plugin.json
author_name = "Plugin Author"

# Directory and manifest name of the scaffolded plugin (kebab-case)
plugin_name = "sample-plugin"

# Initial version of the scaffolded plugin (MAJOR.MINOR.PATCH)
version = "0.1.0"

[analyzer]
# Glob patterns (relative to the scanned root) that are never descended into
exclude = [".git", "node_modules"]

[audit]
# Agents longer than this many body lines get a warning
max_agent_lines = 300
"#;

pub const DEFAULT_ANALYZER_EXCLUDES: &[&str] = &[".git", "node_modules"];

/// Global configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
    #[serde(default)]
    pub audit: AuditConfig,
}

/// Defaults used when scaffolding a marketplace
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub owner_name: String,
    pub author_name: String,
    pub plugin_name: String,
    pub version: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            owner_name: "Plugin Owner".to_string(),
            author_name: "Plugin Author".to_string(),
            plugin_name: "sample-plugin".to_string(),
            version: "0.1.0".to_string(),
        }
    }
}

/// Directory analyzer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
}

fn default_exclude() -> Vec<String> {
    DEFAULT_ANALYZER_EXCLUDES
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            exclude: default_exclude(),
        }
    }
}

/// Plugin audit settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    #[serde(default = "default_max_agent_lines")]
    pub max_agent_lines: usize,
}

fn default_max_agent_lines() -> usize {
    300
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            max_agent_lines: default_max_agent_lines(),
        }
    }
}

impl Config {
    /// Load config from base directory
    pub fn load(base_dir: &Path) -> Result<Self> {
        let path = base_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content).map_err(|e| PlugkitError::ConfigParse {
            path: path.clone(),
            message: e.to_string(),
        })?;

        Ok(config)
    }

    /// Save config to base directory
    pub fn save(&self, base_dir: &Path) -> Result<()> {
        let path = base_dir.join(CONFIG_FILE);
        fs::create_dir_all(base_dir)?;

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Get config file path
    pub fn path(base_dir: &Path) -> PathBuf {
        base_dir.join(CONFIG_FILE)
    }

    /// Initialize config with default template (rich comments)
    pub fn init(base_dir: &Path) -> Result<PathBuf> {
        let path = base_dir.join(CONFIG_FILE);
        fs::create_dir_all(base_dir)?;

        if !path.exists() {
            fs::write(&path, DEFAULT_CONFIG_TEMPLATE)?;
        }

        Ok(path)
    }

    /// Get a config value by dot-notation key
    pub fn get(&self, key: &str) -> Option<String> {
        self.list()
            .into_iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Set a config value by dot-notation key
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "generator.owner_name" => self.generator.owner_name = value.to_string(),
            "generator.author_name" => self.generator.author_name = value.to_string(),
            "generator.plugin_name" => {
                if !is_kebab_case(value) {
                    return Err(PlugkitError::ConfigValue {
                        key: key.to_string(),
                        message: format!("'{}' is not kebab-case", value),
                    });
                }
                self.generator.plugin_name = value.to_string();
            }
            "generator.version" => {
                if !is_semver(value) {
                    return Err(PlugkitError::ConfigValue {
                        key: key.to_string(),
                        message: format!("'{}' is not MAJOR.MINOR.PATCH", value),
                    });
                }
                self.generator.version = value.to_string();
            }
            "analyzer.exclude" => self.analyzer.exclude = parse_string_list(value),
            "audit.max_agent_lines" => {
                self.audit.max_agent_lines =
                    value.trim().parse().map_err(|_| PlugkitError::ConfigValue {
                        key: key.to_string(),
                        message: format!("'{}' is not a number", value),
                    })?;
            }
            _ => {
                return Err(PlugkitError::ConfigKeyNotFound {
                    key: key.to_string(),
                })
            }
        }
        Ok(())
    }

    /// List all config keys with their current values
    pub fn list(&self) -> Vec<(String, String)> {
        vec![
            (
                "generator.owner_name".to_string(),
                self.generator.owner_name.clone(),
            ),
            (
                "generator.author_name".to_string(),
                self.generator.author_name.clone(),
            ),
            (
                "generator.plugin_name".to_string(),
                self.generator.plugin_name.clone(),
            ),
            (
                "generator.version".to_string(),
                self.generator.version.clone(),
            ),
            (
                "analyzer.exclude".to_string(),
                format!("{:?}", self.analyzer.exclude),
            ),
            (
                "audit.max_agent_lines".to_string(),
                self.audit.max_agent_lines.to_string(),
            ),
        ]
    }
}

/// Parse a comma-separated or JSON-like list string
fn parse_string_list(value: &str) -> Vec<String> {
    let trimmed = value.trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(trimmed);

    inner
        .split(',')
        .map(|s| s.trim().trim_matches('"').trim_matches('\'').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
