use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use plugkit_core::{
    validate, validate_file, Analyzer, ArtifactCounts, Generator, SchemaKind,
};
use serde_json::json;
use sha2::{Digest, Sha256};
use tempfile::TempDir;
use walkdir::WalkDir;

fn fingerprint(root: &Path) -> BTreeMap<PathBuf, (String, SystemTime)> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| {
            let path = e.path().to_path_buf();
            let meta = e.metadata().unwrap();
            let hash = if meta.is_file() {
                hex::encode(Sha256::digest(fs::read(&path).unwrap()))
            } else {
                String::from("dir")
            };
            (path, (hash, meta.modified().unwrap()))
        })
        .collect()
}

#[test]
fn empty_plugins_array_is_valid() {
    let doc = json!({"name": "core", "owner": {"name": "Grey Haven"}, "plugins": []});
    assert!(validate(&doc, SchemaKind::Marketplace).is_empty());
}

#[test]
fn missing_owner_name_and_plugins() {
    let doc = json!({"name": "core", "owner": {}});
    let messages: Vec<String> = validate(&doc, SchemaKind::Marketplace)
        .iter()
        .map(|v| v.to_string())
        .collect();

    assert_eq!(messages, vec!["owner.name: is required", "plugins: is required"]);
}

#[test]
fn bad_plugin_name_and_version() {
    let doc = json!({
        "name": "My_Plugin",
        "description": "x",
        "version": "1.0",
        "author": {"name": "A"}
    });
    let violations = validate(&doc, SchemaKind::Plugin);

    assert_eq!(violations.len(), 2);
    assert_eq!(violations[0].path, "name");
    assert_eq!(violations[1].path, "version");
}

#[test]
fn generated_marketplace_validates() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("mp");

    let generated = Generator::default().generate(&root, "Test Market").unwrap();

    let marketplace = validate_file(
        &root.join(".claude-plugin/marketplace.json"),
        SchemaKind::Marketplace,
    )
    .unwrap();
    assert!(marketplace.is_valid(), "{:?}", marketplace.violations);

    let plugin = validate_file(&generated.plugin_path, SchemaKind::Plugin).unwrap();
    assert!(plugin.is_valid(), "{:?}", plugin.violations);
}

#[test]
fn analyze_empty_directory() {
    let tmp = TempDir::new().unwrap();
    let analysis = Analyzer::default().analyze(tmp.path()).unwrap();

    assert_eq!(analysis.total, ArtifactCounts::default());
    assert!(analysis
        .categories
        .values()
        .all(|c| *c == ArtifactCounts::default()));
}

#[test]
fn validation_is_pure_and_repeatable() {
    let doc = json!({"name": "", "owner": [], "plugins": [{"name": 1}]});
    let first = validate(&doc, SchemaKind::Marketplace);
    let second = validate(&doc, SchemaKind::Marketplace);

    assert_eq!(first, second);
    assert_eq!(doc, json!({"name": "", "owner": [], "plugins": [{"name": 1}]}));
}

#[test]
fn independent_breakages_each_reported() {
    let doc = json!({"owner": {"name": "x"}});
    let violations = validate(&doc, SchemaKind::Marketplace);

    let name_hits = violations.iter().filter(|v| v.path == "name").count();
    let plugins_hits = violations.iter().filter(|v| v.path == "plugins").count();
    assert_eq!(name_hits, 1);
    assert_eq!(plugins_hits, 1);
}

#[test]
fn optional_fields_leniency() {
    let base = json!({
        "name": "sample-plugin",
        "description": "d",
        "version": "0.1.0",
        "author": {"name": "A"}
    });
    assert!(validate(&base, SchemaKind::Plugin).is_empty());

    let mut bad = base.clone();
    bad["keywords"] = json!("not-an-array");
    let violations = validate(&bad, SchemaKind::Plugin);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].path, "keywords");
}

#[test]
fn analyzer_leaves_tree_untouched() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    for (path, content) in [
        (".claude/commands/git/commit.md", "# commit"),
        (".claude/agents/reviewer.md", "---\nname: reviewer\n---\n"),
        (".claude/hooks/pre.sh", "#!/bin/sh\n"),
        (".claude/plugins/core/commands/help.md", "# help"),
    ] {
        let full = root.join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }

    let before = fingerprint(root);
    let analysis = Analyzer::default().analyze(root).unwrap();
    let after = fingerprint(root);

    assert_eq!(before, after);
    assert_eq!(analysis.total.commands, 2);
    assert_eq!(analysis.total.agents, 1);
    assert_eq!(analysis.total.hooks, 1);
}

#[test]
fn analyzer_missing_root_is_zero() {
    let analysis = Analyzer::default()
        .analyze(Path::new("/path/does/not/exist"))
        .unwrap();

    assert!(!analysis.exists);
    assert_eq!(analysis.total.total(), 0);
}
