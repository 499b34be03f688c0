//! Manifest Module
//!
//! - `types`: typed marketplace and plugin records
//! - `validator`: schema checks over parsed JSON
//!
//! File helpers here keep "could not read/parse" separate from "parsed but
//! violates the schema". The former is an error, the latter is data.

pub mod types;
pub mod validator;

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{PlugkitError, Result};

pub use types::{
    MarketplaceManifest, MarketplaceOwner, PluginAuthor, PluginManifest, PluginReference,
    SchemaKind,
};
pub use validator::{
    is_kebab_case, is_semver, validate, validate_marketplace, validate_plugin, Validation,
    Violation,
};

pub const PLUGIN_DIR: &str = ".claude-plugin";
pub const MARKETPLACE_JSON: &str = "marketplace.json";
pub const PLUGIN_JSON: &str = "plugin.json";

/// Result of validating a manifest file
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub path: PathBuf,
    pub kind: SchemaKind,
    pub violations: Vec<Violation>,
    /// Plugin names listed more than once (marketplace only, not violations)
    pub duplicate_plugins: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Read and parse a JSON file
///
/// Malformed JSON is reported as [`PlugkitError::JsonParse`] with the
/// location, never as an empty violation list.
pub fn load_json(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| PlugkitError::JsonParse {
        path: path.to_path_buf(),
        line: e.line(),
        column: e.column(),
        message: e.to_string(),
    })
}

/// Load a manifest file and validate it against `kind`
pub fn validate_file(path: &Path, kind: SchemaKind) -> Result<ValidationReport> {
    let doc = load_json(path)?;

    let (violations, duplicate_plugins) = match kind {
        SchemaKind::Marketplace => {
            let result = validate_marketplace(&doc);
            let duplicates = result
                .manifest
                .as_ref()
                .map(MarketplaceManifest::duplicate_plugin_names)
                .unwrap_or_default();
            (result.violations, duplicates)
        }
        SchemaKind::Plugin => (validate_plugin(&doc).violations, Vec::new()),
    };

    debug!(
        path = %path.display(),
        %kind,
        violations = violations.len(),
        "validated manifest"
    );

    Ok(ValidationReport {
        path: path.to_path_buf(),
        kind,
        violations,
        duplicate_plugins,
    })
}

/// Serialize with four-space indentation and a trailing newline
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    buf.push(b'\n');
    // serde_json only emits UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn load_json_reports_parse_location() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("plugin.json");
        fs::write(&path, "{\n  \"name\": \"x\",\n  oops\n}").unwrap();

        match load_json(&path) {
            Err(PlugkitError::JsonParse { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn load_json_missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let err = load_json(&tmp.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, PlugkitError::Io(_)));
    }

    #[test]
    fn validate_file_collects_duplicates() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("marketplace.json");
        fs::write(
            &path,
            r#"{
                "name": "core",
                "owner": {"name": "Owner"},
                "plugins": [
                    {"name": "a", "source": "./a", "description": "A"},
                    {"name": "a", "source": "./a2", "description": "A again"}
                ]
            }"#,
        )
        .unwrap();

        let report = validate_file(&path, SchemaKind::Marketplace).unwrap();
        assert!(report.is_valid());
        assert_eq!(report.duplicate_plugins, vec!["a"]);
    }

    #[test]
    fn pretty_json_uses_four_spaces() {
        let text = to_pretty_json(&serde_json::json!({"a": {"b": 1}})).unwrap();
        assert!(text.contains("\n    \"a\""));
        assert!(text.ends_with("}\n"));
    }
}
