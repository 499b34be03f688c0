//! Directory analyzer
//!
//! Read-only scan of a `.claude/` tree that counts commands, agents and
//! hooks per category. `commands/`, `agents/` and `hooks/` directories are
//! recognised at any depth, so per-plugin layouts such as
//! `plugins/core/commands/*.md` are counted too.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Component, Path, PathBuf};

use glob::Pattern;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::config::AnalyzerConfig;
use crate::error::Result;

const CLAUDE_DIR: &str = ".claude";
const ROOT_CATEGORY: &str = "root";
const SCRIPT_EXTENSIONS: &[&str] = &[
    "sh", "bash", "zsh", "py", "js", "mjs", "cjs", "ts", "rb", "pl",
];

/// Kind of recognised artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtifactKind {
    Command,
    Agent,
    Hook,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 3] = [Self::Command, Self::Agent, Self::Hook];

    /// Directory name that marks this kind
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Command => "commands",
            Self::Agent => "agents",
            Self::Hook => "hooks",
        }
    }

    fn from_dir_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.dir_name() == name)
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command => write!(f, "command"),
            Self::Agent => write!(f, "agent"),
            Self::Hook => write!(f, "hook"),
        }
    }
}

/// Artifact counts for one category (or the whole tree)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArtifactCounts {
    pub commands: usize,
    pub agents: usize,
    pub hooks: usize,
}

impl ArtifactCounts {
    pub fn total(&self) -> usize {
        self.commands + self.agents + self.hooks
    }

    pub fn get(&self, kind: ArtifactKind) -> usize {
        match kind {
            ArtifactKind::Command => self.commands,
            ArtifactKind::Agent => self.agents,
            ArtifactKind::Hook => self.hooks,
        }
    }

    fn record(&mut self, kind: ArtifactKind) {
        match kind {
            ArtifactKind::Command => self.commands += 1,
            ArtifactKind::Agent => self.agents += 1,
            ArtifactKind::Hook => self.hooks += 1,
        }
    }
}

/// A single recognised file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// File name
    pub name: String,
    pub kind: ArtifactKind,
    /// Path relative to the scanned root
    pub path: PathBuf,
    pub category: String,
    /// Size in bytes
    pub size: u64,
}

/// Summary of a scanned tree
#[derive(Debug, Clone, Default)]
pub struct DirectoryAnalysis {
    /// Directory that was actually scanned
    pub root: PathBuf,
    /// False when the root did not exist (all counts are zero)
    pub exists: bool,
    pub categories: BTreeMap<String, ArtifactCounts>,
    pub total: ArtifactCounts,
    /// Recognised files in walk order (sorted by path)
    pub artifacts: Vec<Artifact>,
}

impl DirectoryAnalysis {
    pub fn artifacts_of(&self, kind: ArtifactKind) -> impl Iterator<Item = &Artifact> {
        self.artifacts.iter().filter(move |a| a.kind == kind)
    }

    /// Artifacts of one kind grouped by category
    pub fn grouped(&self, kind: ArtifactKind) -> BTreeMap<&str, Vec<&Artifact>> {
        let mut grouped: BTreeMap<&str, Vec<&Artifact>> = BTreeMap::new();
        for artifact in self.artifacts_of(kind) {
            grouped
                .entry(artifact.category.as_str())
                .or_default()
                .push(artifact);
        }
        grouped
    }
}

/// Scans `.claude/` trees
pub struct Analyzer {
    excludes: Vec<Pattern>,
}

impl Analyzer {
    pub fn new(config: &AnalyzerConfig) -> Result<Self> {
        let excludes = config
            .exclude
            .iter()
            .map(|p| Pattern::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { excludes })
    }

    /// `<path>/.claude` when present, otherwise `path` itself
    pub fn resolve_root(path: &Path) -> PathBuf {
        let claude = path.join(CLAUDE_DIR);
        if claude.is_dir() {
            claude
        } else {
            path.to_path_buf()
        }
    }

    /// Scan `path`; a missing root yields an empty analysis
    pub fn analyze(&self, path: &Path) -> Result<DirectoryAnalysis> {
        let root = Self::resolve_root(path);
        let mut analysis = DirectoryAnalysis {
            root: root.clone(),
            exists: root.is_dir(),
            ..Default::default()
        };

        if !analysis.exists {
            debug!(root = %root.display(), "nothing to analyze");
            return Ok(analysis);
        }

        let walker = WalkDir::new(&root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !self.is_excluded(&root, e));
        let mut category_dirs = Vec::new();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            let Ok(relative) = entry.path().strip_prefix(&root) else {
                continue;
            };
            let parts = components(relative);
            let Some((kind_index, kind)) = locate_kind(&parts) else {
                continue;
            };

            if entry.file_type().is_dir() {
                if kind_index + 2 == parts.len() {
                    category_dirs.push(parts[kind_index + 1].clone());
                }
                continue;
            }

            if !entry.file_type().is_file() {
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(m) => m,
                Err(e) => {
                    warn!(path = %entry.path().display(), error = %e, "cannot read metadata");
                    continue;
                }
            };

            if !is_artifact(kind, &entry, &metadata) {
                debug!(path = %relative.display(), %kind, "not counted");
                continue;
            }

            let category = category_for(&parts, kind_index);
            analysis
                .categories
                .entry(category.clone())
                .or_default()
                .record(kind);
            analysis.total.record(kind);
            analysis.artifacts.push(Artifact {
                name: entry.file_name().to_string_lossy().to_string(),
                kind,
                path: relative.to_path_buf(),
                category,
                size: metadata.len(),
            });
        }

        // Folders directly below a kind directory show up even when empty
        for dir in category_dirs {
            let nested = format!("{dir}/");
            if !analysis.categories.keys().any(|c| c.starts_with(&nested)) {
                analysis.categories.entry(dir).or_default();
            }
        }

        info!(
            root = %root.display(),
            commands = analysis.total.commands,
            agents = analysis.total.agents,
            hooks = analysis.total.hooks,
            "analysis complete"
        );

        Ok(analysis)
    }

    fn is_excluded(&self, root: &Path, entry: &DirEntry) -> bool {
        let relative = match entry.path().strip_prefix(root) {
            Ok(r) if !r.as_os_str().is_empty() => r,
            _ => return false,
        };
        let name = entry.file_name().to_string_lossy();
        self.excludes
            .iter()
            .any(|p| p.matches_path(relative) || p.matches(&name))
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self {
            excludes: crate::config::DEFAULT_ANALYZER_EXCLUDES
                .iter()
                .filter_map(|p| Pattern::new(p).ok())
                .collect(),
        }
    }
}

fn components(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().to_string()),
            _ => None,
        })
        .collect()
}

/// Outermost ancestor directory that names an artifact kind
fn locate_kind(parts: &[String]) -> Option<(usize, ArtifactKind)> {
    let ancestors = parts.len().checked_sub(1)?;
    parts[..ancestors]
        .iter()
        .enumerate()
        .find_map(|(i, name)| ArtifactKind::from_dir_name(name).map(|k| (i, k)))
}

/// Folder path below the kind directory, else the folder holding it, else `root`
fn category_for(parts: &[String], kind_index: usize) -> String {
    let file_index = parts.len() - 1;
    if kind_index + 1 < file_index {
        parts[kind_index + 1..file_index].join("/")
    } else if kind_index > 0 {
        parts[kind_index - 1].clone()
    } else {
        ROOT_CATEGORY.to_string()
    }
}

fn is_artifact(kind: ArtifactKind, entry: &DirEntry, metadata: &std::fs::Metadata) -> bool {
    let extension = entry
        .path()
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase());

    match kind {
        ArtifactKind::Command | ArtifactKind::Agent => extension.as_deref() == Some("md"),
        ArtifactKind::Hook => {
            extension
                .as_deref()
                .is_some_and(|e| SCRIPT_EXTENSIONS.contains(&e))
                || is_executable(metadata)
        }
    }
}

#[cfg(unix)]
fn is_executable(metadata: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &std::fs::Metadata) -> bool {
    false
}
