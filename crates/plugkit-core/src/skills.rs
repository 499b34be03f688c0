//! Skills array maintenance
//!
//! Keeps the `skills` array of `.claude-plugin/plugin.json` in step with the
//! `skills/<name>/SKILL.md` directories that actually exist.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info};

use crate::error::{PlugkitError, Result};
use crate::manifest::{self, PLUGIN_DIR, PLUGIN_JSON};

pub const SKILLS_DIR: &str = "skills";
pub const SKILL_MD: &str = "SKILL.md";
const SKILLS_KEY: &str = "skills";

/// Sync state of one plugin
#[derive(Debug, Clone)]
pub struct SkillSync {
    pub plugin: String,
    pub manifest_path: PathBuf,
    pub declared: Vec<String>,
    pub actual: Vec<String>,
    /// On disk but not declared
    pub missing: Vec<String>,
    /// Declared but not on disk
    pub extra: Vec<String>,
    /// plugin.json was (or in dry-run mode, would be) rewritten
    pub updated: bool,
}

impl SkillSync {
    pub fn is_up_to_date(&self) -> bool {
        self.missing.is_empty() && self.extra.is_empty()
    }
}

/// Immediate subdirectories of `base_dir` that contain `.claude-plugin/`, sorted
pub fn find_plugin_dirs(base_dir: &Path) -> Result<Vec<PathBuf>> {
    if !base_dir.is_dir() {
        return Err(PlugkitError::NoPlugins {
            path: base_dir.to_path_buf(),
        });
    }

    let mut plugins: Vec<PathBuf> = fs::read_dir(base_dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir() && p.join(PLUGIN_DIR).is_dir())
        .collect();
    plugins.sort();
    Ok(plugins)
}

/// `./skills/<name>` for every skill directory holding a SKILL.md, sorted
pub fn discover_skills(plugin_dir: &Path) -> Result<Vec<String>> {
    let skills_dir = plugin_dir.join(SKILLS_DIR);
    if !skills_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut skills: Vec<String> = fs::read_dir(&skills_dir)?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().join(SKILL_MD).is_file())
        .map(|e| format!("./{}/{}", SKILLS_DIR, e.file_name().to_string_lossy()))
        .collect();
    skills.sort();
    Ok(skills)
}

/// Skills declared in a plugin.json document (string or array form)
pub fn declared_skills(config: &Value) -> Vec<String> {
    match config.get(SKILLS_KEY) {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(|s| s.to_string()))
            .collect(),
        _ => Vec::new(),
    }
}

/// Compare declared and actual skills and rewrite plugin.json when they differ
pub fn sync_skills(plugin_dir: &Path, dry_run: bool) -> Result<SkillSync> {
    let manifest_path = plugin_dir.join(PLUGIN_DIR).join(PLUGIN_JSON);
    let mut config = manifest::load_json(&manifest_path)?;

    let actual = discover_skills(plugin_dir)?;
    let declared = declared_skills(&config);

    let actual_set: BTreeSet<&String> = actual.iter().collect();
    let declared_set: BTreeSet<&String> = declared.iter().collect();
    let missing: Vec<String> = actual_set
        .difference(&declared_set)
        .map(|s| s.to_string())
        .collect();
    let extra: Vec<String> = declared_set
        .difference(&actual_set)
        .map(|s| s.to_string())
        .collect();

    let plugin = plugin_dir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let updated = !missing.is_empty() || !extra.is_empty();
    if updated {
        if let Some(map) = config.as_object_mut() {
            if actual.is_empty() {
                map.retain(|k, _| k != SKILLS_KEY);
            } else {
                let skills: Vec<Value> = actual.iter().map(|s| Value::from(s.as_str())).collect();
                map.insert(SKILLS_KEY.to_string(), Value::from(skills));
            }
        }

        if dry_run {
            debug!(plugin = %plugin, "dry run, plugin.json left unchanged");
        } else {
            fs::write(&manifest_path, manifest::to_pretty_json(&config)?)?;
            info!(plugin = %plugin, skills = actual.len(), "updated skills array");
        }
    }

    Ok(SkillSync {
        plugin,
        manifest_path,
        declared,
        actual,
        missing,
        extra,
        updated,
    })
}

/// Sync every plugin under `base_dir` that has a plugin.json
pub fn sync_all(base_dir: &Path, dry_run: bool) -> Result<Vec<SkillSync>> {
    let plugins: Vec<PathBuf> = find_plugin_dirs(base_dir)?
        .into_iter()
        .filter(|p| p.join(PLUGIN_DIR).join(PLUGIN_JSON).is_file())
        .collect();

    if plugins.is_empty() {
        return Err(PlugkitError::NoPlugins {
            path: base_dir.to_path_buf(),
        });
    }

    plugins.iter().map(|p| sync_skills(p, dry_run)).collect()
}
