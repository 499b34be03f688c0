//! Marketplace scaffolding
//!
//! Creates `.claude-plugin/marketplace.json` and one sample plugin under
//! `plugins/`. Existing scaffolding is never overwritten: all conflicts are
//! detected before the first write.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::GeneratorConfig;
use crate::error::{PlugkitError, Result};
use crate::manifest::{
    self, MarketplaceManifest, MarketplaceOwner, PluginAuthor, PluginManifest, PluginReference,
    MARKETPLACE_JSON, PLUGIN_DIR, PLUGIN_JSON,
};

const PLUGINS_DIR: &str = "plugins";
const SAMPLE_DESCRIPTION: &str = "A sample plugin to demonstrate structure";

/// What a generation run produced
#[derive(Debug, Clone)]
pub struct GeneratedMarketplace {
    pub root: PathBuf,
    pub marketplace: MarketplaceManifest,
    pub plugin: PluginManifest,
    pub marketplace_path: PathBuf,
    pub plugin_path: PathBuf,
    /// Files written, in write order
    pub written: Vec<PathBuf>,
}

/// Scaffolds new marketplaces
///
/// Do not run two generations against the same root concurrently.
pub struct Generator {
    defaults: GeneratorConfig,
}

impl Generator {
    pub fn new(defaults: GeneratorConfig) -> Self {
        Self { defaults }
    }

    /// Paths that would be clobbered by generating into `root`, or that
    /// block a directory the layout needs
    pub fn conflicts(&self, root: &Path) -> Vec<PathBuf> {
        let plugins_dir = root.join(PLUGINS_DIR);
        let mut conflicts: Vec<PathBuf> = [root.to_path_buf(), plugins_dir.clone()]
            .into_iter()
            .filter(|p| p.exists() && !p.is_dir())
            .collect();
        conflicts.extend(
            [root.join(PLUGIN_DIR), plugins_dir.join(&self.defaults.plugin_name)]
                .into_iter()
                .filter(|p| p.exists()),
        );
        conflicts
    }

    /// Build the manifests in memory without touching the filesystem
    pub fn build(&self, marketplace_name: &str) -> Result<(MarketplaceManifest, PluginManifest)> {
        let plugin_name = &self.defaults.plugin_name;

        let marketplace = MarketplaceManifest {
            name: marketplace_name.to_string(),
            owner: MarketplaceOwner {
                name: self.defaults.owner_name.clone(),
            },
            plugins: vec![PluginReference {
                name: plugin_name.clone(),
                source: format!("./{}/{}", PLUGINS_DIR, plugin_name),
                description: SAMPLE_DESCRIPTION.to_string(),
            }],
        };

        let plugin = PluginManifest {
            name: plugin_name.clone(),
            description: SAMPLE_DESCRIPTION.to_string(),
            version: self.defaults.version.clone(),
            author: PluginAuthor {
                name: self.defaults.author_name.clone(),
            },
            keywords: None,
            license: None,
        };

        let marketplace_doc = serde_json::to_value(&marketplace)?;
        check_generated(
            MARKETPLACE_JSON,
            manifest::validate_marketplace(&marketplace_doc).messages(),
        )?;
        let plugin_doc = serde_json::to_value(&plugin)?;
        check_generated(PLUGIN_JSON, manifest::validate_plugin(&plugin_doc).messages())?;

        Ok((marketplace, plugin))
    }

    /// Create the marketplace layout under `root`
    pub fn generate(&self, root: &Path, marketplace_name: &str) -> Result<GeneratedMarketplace> {
        let conflicts = self.conflicts(root);
        if !conflicts.is_empty() {
            return Err(PlugkitError::Conflict { paths: conflicts });
        }

        let (marketplace, plugin) = self.build(marketplace_name)?;

        let marketplace_path = root.join(PLUGIN_DIR).join(MARKETPLACE_JSON);
        let plugin_dir = root.join(PLUGINS_DIR).join(&plugin.name);
        let plugin_path = plugin_dir.join(PLUGIN_JSON);

        let files = [
            (marketplace_path.clone(), manifest::to_pretty_json(&marketplace)?),
            (plugin_path.clone(), manifest::to_pretty_json(&plugin)?),
        ];

        let mut written = Vec::with_capacity(files.len());
        for (path, content) in &files {
            if let Err(source) = write_new(path, content) {
                return Err(if written.is_empty() {
                    PlugkitError::Io(source)
                } else {
                    PlugkitError::GenerationIncomplete { written, source }
                });
            }
            debug!(path = %path.display(), "wrote manifest");
            written.push(path.clone());
        }

        info!(root = %root.display(), name = marketplace_name, "generated marketplace");

        Ok(GeneratedMarketplace {
            root: root.to_path_buf(),
            marketplace,
            plugin,
            marketplace_path,
            plugin_path,
            written,
        })
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::new(GeneratorConfig::default())
    }
}

fn check_generated(file: &'static str, violations: Vec<String>) -> Result<()> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(PlugkitError::InvalidGenerated { file, violations })
    }
}

/// Create parent directories and write a file that must not exist yet
fn write_new(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)?;
    fill_new(path, file, content)
}

/// Write `content` into the freshly created `path`, removing it again on failure
fn fill_new(path: &Path, mut file: impl Write, content: &str) -> io::Result<()> {
    let result = file.write_all(content.as_bytes()).and_then(|()| file.flush());
    if let Err(e) = result {
        drop(file);
        if let Err(cleanup) = fs::remove_file(path) {
            warn!(path = %path.display(), error = %cleanup, "cannot remove partial file");
        }
        return Err(e);
    }
    Ok(())
}
