pub mod analyzer;
pub mod audit;
pub mod config;
pub mod error;
pub mod frontmatter;
pub mod generator;
pub mod manifest;
pub mod skills;

pub use analyzer::{Analyzer, Artifact, ArtifactCounts, ArtifactKind, DirectoryAnalysis};
pub use audit::{audit_plugin, audit_plugins, AuditOptions, AuditSummary, PluginAudit};
pub use config::{AnalyzerConfig, AuditConfig, Config, GeneratorConfig};
pub use error::{PlugkitError, Result};
pub use frontmatter::Frontmatter;
pub use generator::{GeneratedMarketplace, Generator};
pub use manifest::{
    is_kebab_case, is_semver, load_json, validate, validate_file, validate_marketplace,
    validate_plugin, MarketplaceManifest, MarketplaceOwner, PluginAuthor, PluginManifest,
    PluginReference, SchemaKind, Validation, ValidationReport, Violation,
};
pub use skills::{discover_skills, find_plugin_dirs, sync_all, sync_skills, SkillSync};
