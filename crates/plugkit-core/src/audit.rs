//! Plugin best-practice audit
//!
//! Walks a directory of plugins and grades each one. Findings are data:
//! errors, warnings and passed checks are collected per plugin and folded
//! into a 0-100 score.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::config::AuditConfig;
use crate::error::{PlugkitError, Result};
use crate::frontmatter::Frontmatter;
use crate::manifest::{self, is_kebab_case, PLUGIN_DIR, PLUGIN_JSON};
use crate::skills::{self, SKILLS_DIR, SKILL_MD};

const AGENTS_DIR: &str = "agents";
const COMMANDS_DIR: &str = "commands";
const MAX_SKILL_NAME: usize = 64;
const MAX_SKILL_DESCRIPTION: usize = 1024;

static VERSION_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+\.[0-9]+\.[0-9]+").expect("valid regex"));

static AGENT_TRIGGERS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"use\s+(when|after|before|proactively)",
        r"must\s+be\s+used",
        r"automatically\s+invoked",
        r"use\s+for",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

const SKILL_TRIGGERS: &[&str] = &[
    "use when",
    "when user",
    "when working",
    "when mentioned",
    "mentions",
];

/// How deep the audit goes
#[derive(Debug, Clone)]
pub struct AuditOptions {
    /// Inspect every agent and skill file instead of only counting them
    pub verbose: bool,
    pub max_agent_lines: usize,
}

impl AuditOptions {
    pub fn new(config: &AuditConfig, verbose: bool) -> Self {
        Self {
            verbose,
            max_agent_lines: config.max_agent_lines,
        }
    }
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self::new(&AuditConfig::default(), false)
    }
}

/// Findings for one plugin
#[derive(Debug, Clone, Default)]
pub struct PluginAudit {
    pub plugin: String,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub passed: Vec<String>,
}

impl PluginAudit {
    fn new(plugin: String) -> Self {
        Self {
            plugin,
            ..Default::default()
        }
    }

    fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    fn pass(&mut self, message: impl Into<String>) {
        self.passed.push(message.into());
    }

    /// 0 (worst) to 100 (perfect); errors weigh double
    pub fn score(&self) -> u8 {
        let total = self.errors.len() + self.warnings.len() + self.passed.len();
        if total == 0 {
            return 0;
        }
        let points =
            self.passed.len() as f64 - 2.0 * self.errors.len() as f64 - self.warnings.len() as f64;
        ((points / total as f64) * 100.0).trunc().clamp(0.0, 100.0) as u8
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Totals across audited plugins
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditSummary {
    pub plugins: usize,
    pub errors: usize,
    pub warnings: usize,
    pub average_score: f64,
}

impl AuditSummary {
    pub fn from_audits(audits: &[PluginAudit]) -> Self {
        if audits.is_empty() {
            return Self::default();
        }
        let score_sum: f64 = audits.iter().map(|a| a.score() as f64).sum();
        Self {
            plugins: audits.len(),
            errors: audits.iter().map(|a| a.errors.len()).sum(),
            warnings: audits.iter().map(|a| a.warnings.len()).sum(),
            average_score: score_sum / audits.len() as f64,
        }
    }
}

/// Audit every plugin under `base_dir`, or only `only` when given
pub fn audit_plugins(
    base_dir: &Path,
    only: Option<&str>,
    options: &AuditOptions,
) -> Result<Vec<PluginAudit>> {
    let plugins = match only {
        Some(name) => {
            let dir = base_dir.join(name);
            if !dir.is_dir() {
                return Err(PlugkitError::PluginNotFound {
                    name: name.to_string(),
                });
            }
            vec![dir]
        }
        None => skills::find_plugin_dirs(base_dir)?,
    };

    if plugins.is_empty() {
        return Err(PlugkitError::NoPlugins {
            path: base_dir.to_path_buf(),
        });
    }

    Ok(plugins
        .iter()
        .map(|dir| audit_plugin(dir, options))
        .collect())
}

/// Run every check against one plugin directory
pub fn audit_plugin(plugin_dir: &Path, options: &AuditOptions) -> PluginAudit {
    let name = plugin_dir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| plugin_dir.display().to_string());
    let mut audit = PluginAudit::new(name);

    let Some(config) = check_manifest(plugin_dir, &mut audit) else {
        return audit;
    };
    check_skills_array(plugin_dir, &config, &mut audit);
    check_agents(plugin_dir, options, &mut audit);
    check_skills(plugin_dir, options, &mut audit);
    check_commands(plugin_dir, &mut audit);

    debug!(
        plugin = %audit.plugin,
        errors = audit.errors.len(),
        warnings = audit.warnings.len(),
        score = audit.score(),
        "audited plugin"
    );
    audit
}

fn check_manifest(plugin_dir: &Path, audit: &mut PluginAudit) -> Option<Value> {
    let manifest_dir = plugin_dir.join(PLUGIN_DIR);
    if !manifest_dir.is_dir() {
        audit.error(".claude-plugin directory missing");
        return None;
    }
    audit.pass(".claude-plugin directory exists");

    let manifest_path = manifest_dir.join(PLUGIN_JSON);
    if !manifest_path.is_file() {
        audit.error("plugin.json missing");
        return None;
    }
    audit.pass("plugin.json exists");

    let config = match manifest::load_json(&manifest_path) {
        Ok(config) => config,
        Err(PlugkitError::JsonParse { message, .. }) => {
            audit.error(format!("plugin.json is invalid JSON: {}", message));
            return None;
        }
        Err(e) => {
            audit.error(format!("plugin.json could not be read: {}", e));
            return None;
        }
    };
    audit.pass("plugin.json is valid JSON");

    match config.get("name") {
        None => audit.error("plugin.json missing 'name' field"),
        Some(Value::String(name)) if is_kebab_case(name) => {
            audit.pass(format!("plugin.json name '{}' is kebab-case", name))
        }
        Some(Value::String(name)) => {
            audit.error(format!("plugin.json name '{}' should be kebab-case", name))
        }
        Some(_) => audit.error("plugin.json 'name' must be a string"),
    }

    if config.get("description").is_none() {
        audit.warn("plugin.json missing 'description' field");
    } else {
        audit.pass("plugin.json has description");
    }

    match config.get("version") {
        None => audit.warn("plugin.json missing 'version' field"),
        Some(Value::String(v)) if VERSION_PREFIX.is_match(v) => {
            audit.pass(format!("version '{}' follows semver", v))
        }
        Some(v) => audit.warn(format!(
            "version '{}' should follow semver (e.g., 1.0.0)",
            v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string())
        )),
    }

    Some(config)
}

fn check_skills_array(plugin_dir: &Path, config: &Value, audit: &mut PluginAudit) {
    let actual = match skills::discover_skills(plugin_dir) {
        Ok(actual) => actual,
        Err(e) => {
            audit.error(format!("skills/ could not be read: {}", e));
            return;
        }
    };
    let declared = skills::declared_skills(config);

    match (actual.is_empty(), declared.is_empty()) {
        (true, true) => audit.pass("No skills (intentional)"),
        (true, false) => audit.error(format!(
            "plugin.json declares {} skills but skills/ directory is empty or missing",
            declared.len()
        )),
        (false, true) => audit.error(format!(
            "Found {} skills in skills/ but none declared in plugin.json",
            actual.len()
        )),
        (false, false) => {
            let mut missing: Vec<&String> =
                actual.iter().filter(|s| !declared.contains(s)).collect();
            let mut extra: Vec<&String> =
                declared.iter().filter(|s| !actual.contains(s)).collect();
            missing.sort();
            missing.dedup();
            extra.sort();
            extra.dedup();

            if !missing.is_empty() {
                audit.error(format!(
                    "Skills missing from plugin.json: {}",
                    join(&missing)
                ));
            }
            if !extra.is_empty() {
                audit.error(format!(
                    "Skills in plugin.json but not found: {}",
                    join(&extra)
                ));
            }
            if missing.is_empty() && extra.is_empty() {
                audit.pass(format!("All {} skills properly declared", actual.len()));
            }
        }
    }
}

fn check_agents(plugin_dir: &Path, options: &AuditOptions, audit: &mut PluginAudit) {
    let agents_dir = plugin_dir.join(AGENTS_DIR);
    if !agents_dir.is_dir() {
        audit.pass("No agents directory (optional)");
        return;
    }

    let agent_files = match markdown_files(&agents_dir) {
        Ok(files) => files,
        Err(e) => {
            audit.error(format!("agents/ could not be read: {}", e));
            return;
        }
    };
    if agent_files.is_empty() {
        audit.warn("agents/ directory exists but is empty");
        return;
    }

    let (old, active): (Vec<&PathBuf>, Vec<&PathBuf>) =
        agent_files.iter().partition(|p| stem(p).contains("-old"));
    if !old.is_empty() {
        let names: Vec<String> = old.iter().map(|p| file_name(p)).collect();
        audit.warn(format!(
            "Found {} old agent files: {}",
            old.len(),
            names.join(", ")
        ));
    }

    if options.verbose {
        for agent in active {
            check_agent(agent, options, audit);
        }
    } else {
        audit.pass(format!("Found {} agent(s)", active.len()));
    }
}

fn check_agent(path: &Path, options: &AuditOptions, audit: &mut PluginAudit) {
    let name = file_name(path);
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            audit.error(format!("Agent {} could not be read: {}", name, e));
            return;
        }
    };

    let Some(fm) = Frontmatter::parse(&content) else {
        audit.warn(format!("Agent {} missing frontmatter", name));
        return;
    };

    if fm.has("name") {
        audit.pass(format!("Agent {} has name", name));
    } else {
        audit.error(format!("Agent {} missing 'name' field", name));
    }

    match fm.get_str("description") {
        None if !fm.has("description") => {
            audit.error(format!("Agent {} missing 'description' field", name))
        }
        description => {
            let description = description.unwrap_or_default().to_lowercase();
            if AGENT_TRIGGERS.iter().any(|re| re.is_match(&description)) {
                audit.pass(format!("Agent {} has trigger phrases", name));
            } else {
                audit.warn(format!(
                    "Agent {} description lacks clear trigger phrases (e.g., 'Use when...', 'Use PROACTIVELY...')",
                    name
                ));
            }
        }
    }

    let lines = fm.body_lines();
    if lines > options.max_agent_lines {
        audit.warn(format!(
            "Agent {} is {} lines (consider splitting if > {})",
            name, lines, options.max_agent_lines
        ));
    }

    if !fm.has("model") {
        audit.warn(format!(
            "Agent {} missing 'model' field (consider adding opus/haiku)",
            name
        ));
    }
}

fn check_skills(plugin_dir: &Path, options: &AuditOptions, audit: &mut PluginAudit) {
    let skills_dir = plugin_dir.join(SKILLS_DIR);
    if !skills_dir.is_dir() {
        audit.pass("No skills directory (optional)");
        return;
    }

    let skill_dirs = match subdirectories(&skills_dir) {
        Ok(dirs) => dirs,
        Err(e) => {
            audit.error(format!("skills/ could not be read: {}", e));
            return;
        }
    };
    if skill_dirs.is_empty() {
        audit.warn("skills/ directory exists but is empty");
        return;
    }

    if options.verbose {
        for dir in &skill_dirs {
            check_skill(dir, audit);
        }
    } else {
        audit.pass(format!("Found {} skill(s)", skill_dirs.len()));
    }
}

fn check_skill(skill_dir: &Path, audit: &mut PluginAudit) {
    let skill = file_name(skill_dir);
    let skill_md = skill_dir.join(SKILL_MD);
    if !skill_md.is_file() {
        audit.error(format!("Skill {} missing SKILL.md", skill));
        return;
    }

    let content = match fs::read_to_string(&skill_md) {
        Ok(content) => content,
        Err(e) => {
            audit.error(format!("Skill {} could not be read: {}", skill, e));
            return;
        }
    };

    let Some(fm) = Frontmatter::parse(&content) else {
        audit.error(format!("Skill {} missing frontmatter", skill));
        return;
    };

    match fm.get_str("name") {
        None => audit.error(format!("Skill {} missing 'name' field", skill)),
        Some(name) => {
            if name.chars().count() > MAX_SKILL_NAME {
                audit.error(format!(
                    "Skill {} name too long (>{} chars)",
                    skill, MAX_SKILL_NAME
                ));
            }
            if !is_kebab_case(&name) {
                audit.warn(format!(
                    "Skill {} name should be lowercase kebab-case",
                    skill
                ));
            }
        }
    }

    match fm.get_str("description") {
        None => audit.error(format!("Skill {} missing 'description' field", skill)),
        Some(description) => {
            if description.chars().count() > MAX_SKILL_DESCRIPTION {
                audit.error(format!(
                    "Skill {} description too long (>{} chars)",
                    skill, MAX_SKILL_DESCRIPTION
                ));
            }
            let lower = description.to_lowercase();
            if !SKILL_TRIGGERS.iter().any(|t| lower.contains(t)) {
                audit.warn(format!(
                    "Skill {} description should include activation triggers",
                    skill
                ));
            }
        }
    }
}

fn check_commands(plugin_dir: &Path, audit: &mut PluginAudit) {
    let commands_dir = plugin_dir.join(COMMANDS_DIR);
    if !commands_dir.is_dir() {
        audit.pass("No commands directory (optional)");
        return;
    }

    let listed = markdown_files(&commands_dir).and_then(|files| {
        let nested = subdirectories(&commands_dir)?
            .into_iter()
            .map(|dir| dir.join(format!("{}.md", file_name(&dir))))
            .filter(|main| main.is_file());
        Ok(files.len() + nested.count())
    });

    match listed {
        Ok(0) => audit.warn("commands/ directory exists but no command files found"),
        Ok(count) => audit.pass(format!("Found {} command(s)", count)),
        Err(e) => audit.error(format!("commands/ could not be read: {}", e)),
    }
}

fn markdown_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "md"))
        .collect();
    files.sort();
    Ok(files)
}

fn subdirectories(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut dirs: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();
    Ok(dirs)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn join(items: &[&String]) -> String {
    items
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
