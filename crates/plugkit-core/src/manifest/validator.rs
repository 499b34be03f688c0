//! Manifest validator
//!
//! Checks an already-parsed JSON document against the marketplace or plugin
//! schema. Every broken field produces exactly one [`Violation`]; checking
//! never stops at the first problem. When a document is clean it is projected
//! into its typed record.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use super::types::{
    MarketplaceManifest, MarketplaceOwner, PluginAuthor, PluginManifest, PluginReference,
    SchemaKind,
};

static KEBAB_CASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9](?:[a-z0-9-]*[a-z0-9])?$").expect("valid regex"));

static SEMVER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+\.[0-9]+\.[0-9]+$").expect("valid regex"));

const ROOT_PATH: &str = "$";

/// A single schema rule failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Field path such as `owner.name` or `plugins[2].source`
    pub path: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Outcome of validating one document
#[derive(Debug, Clone)]
pub struct Validation<T> {
    /// Typed manifest, present only when there are no violations
    pub manifest: Option<T>,
    pub violations: Vec<Violation>,
}

impl<T> Validation<T> {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Violations rendered as `path: message`
    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(|v| v.to_string()).collect()
    }

    fn finish(violations: Vec<Violation>, build: impl FnOnce() -> Option<T>) -> Self {
        let manifest = if violations.is_empty() { build() } else { None };
        Self {
            manifest,
            violations,
        }
    }
}

/// Check a document against the given schema
pub fn validate(doc: &Value, kind: SchemaKind) -> Vec<Violation> {
    match kind {
        SchemaKind::Marketplace => validate_marketplace(doc).violations,
        SchemaKind::Plugin => validate_plugin(doc).violations,
    }
}

/// Lowercase letters, digits and hyphens, no leading or trailing hyphen
pub fn is_kebab_case(name: &str) -> bool {
    KEBAB_CASE.is_match(name)
}

/// Exactly `MAJOR.MINOR.PATCH`
pub fn is_semver(version: &str) -> bool {
    SEMVER.is_match(version)
}

/// Validate a marketplace.json document
pub fn validate_marketplace(doc: &Value) -> Validation<MarketplaceManifest> {
    let mut c = Collector::default();

    let Some(root) = doc.as_object() else {
        c.push(ROOT_PATH, "must be a JSON object");
        return Validation::finish(c.violations, || None);
    };

    let name = c.required_string(root, "", "name");

    let owner_name = c
        .required_object(root, "", "owner")
        .and_then(|owner| c.required_string(owner, "owner", "name"));

    let mut plugins = Vec::new();
    if let Some(entries) = c.required_array(root, "", "plugins") {
        for (index, entry) in entries.iter().enumerate() {
            let path = format!("plugins[{}]", index);
            let Some(entry) = entry.as_object() else {
                c.push(&path, "must be an object");
                continue;
            };

            let name = c.required_string(entry, &path, "name");
            let source = c.required_string(entry, &path, "source");
            let description = c.required_string(entry, &path, "description");

            if let (Some(name), Some(source), Some(description)) = (name, source, description) {
                plugins.push(PluginReference {
                    name: name.to_string(),
                    source: source.to_string(),
                    description: description.to_string(),
                });
            }
        }
    }

    Validation::finish(c.violations, || {
        Some(MarketplaceManifest {
            name: name?.to_string(),
            owner: MarketplaceOwner {
                name: owner_name?.to_string(),
            },
            plugins,
        })
    })
}

/// Validate a plugin.json document
pub fn validate_plugin(doc: &Value) -> Validation<PluginManifest> {
    let mut c = Collector::default();

    let Some(root) = doc.as_object() else {
        c.push(ROOT_PATH, "must be a JSON object");
        return Validation::finish(c.violations, || None);
    };

    let name = c.required_string(root, "", "name").filter(|name| {
        let ok = is_kebab_case(name);
        if !ok {
            c.push(
                "name",
                "must be kebab-case (lowercase letters, digits and hyphens, no leading or trailing hyphen)",
            );
        }
        ok
    });

    let description = c.required_string(root, "", "description");

    let version = c.required_string(root, "", "version").filter(|version| {
        let ok = is_semver(version);
        if !ok {
            c.push(
                "version",
                "must follow semantic versioning MAJOR.MINOR.PATCH (e.g. '1.0.0')",
            );
        }
        ok
    });

    let author_name = c
        .required_object(root, "", "author")
        .and_then(|author| c.required_string(author, "author", "name"));

    let keywords = root.get("keywords").and_then(|value| match value.as_array() {
        Some(items) => {
            let mut keywords = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                match item.as_str() {
                    Some(s) => keywords.push(s.to_string()),
                    None => c.push(&format!("keywords[{}]", index), "must be a string"),
                }
            }
            Some(keywords)
        }
        None => {
            c.push("keywords", "must be an array of strings");
            None
        }
    });

    let license = root.get("license").and_then(|value| match value.as_str() {
        Some(s) => Some(s.to_string()),
        None => {
            c.push("license", "must be a string");
            None
        }
    });

    Validation::finish(c.violations, || {
        Some(PluginManifest {
            name: name?.to_string(),
            description: description?.to_string(),
            version: version?.to_string(),
            author: PluginAuthor {
                name: author_name?.to_string(),
            },
            keywords,
            license,
        })
    })
}

#[derive(Default)]
struct Collector {
    violations: Vec<Violation>,
}

impl Collector {
    fn push(&mut self, path: &str, message: &str) {
        self.violations.push(Violation {
            path: path.to_string(),
            message: message.to_string(),
        });
    }

    fn required<'a>(&mut self, obj: &'a Map<String, Value>, parent: &str, key: &str) -> Option<&'a Value> {
        let value = obj.get(key);
        if value.is_none() {
            self.push(&join(parent, key), "is required");
        }
        value
    }

    fn required_string<'a>(
        &mut self,
        obj: &'a Map<String, Value>,
        parent: &str,
        key: &str,
    ) -> Option<&'a str> {
        let value = self.required(obj, parent, key)?;
        match value.as_str() {
            Some(s) if s.trim().is_empty() => {
                self.push(&join(parent, key), "must not be empty");
                None
            }
            Some(s) => Some(s),
            None => {
                self.push(&join(parent, key), "must be a string");
                None
            }
        }
    }

    fn required_object<'a>(
        &mut self,
        obj: &'a Map<String, Value>,
        parent: &str,
        key: &str,
    ) -> Option<&'a Map<String, Value>> {
        let value = self.required(obj, parent, key)?;
        let object = value.as_object();
        if object.is_none() {
            self.push(&join(parent, key), "must be an object");
        }
        object
    }

    fn required_array<'a>(
        &mut self,
        obj: &'a Map<String, Value>,
        parent: &str,
        key: &str,
    ) -> Option<&'a Vec<Value>> {
        let value = self.required(obj, parent, key)?;
        let array = value.as_array();
        if array.is_none() {
            self.push(&join(parent, key), "must be an array");
        }
        array
    }
}

fn join(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn paths(violations: &[Violation]) -> Vec<&str> {
        violations.iter().map(|v| v.path.as_str()).collect()
    }

    fn valid_plugin() -> Value {
        json!({
            "name": "code-quality",
            "description": "Linting and review helpers",
            "version": "1.2.3",
            "author": { "name": "Grey Haven" }
        })
    }

    #[test]
    fn marketplace_with_empty_plugins_is_valid() {
        let doc = json!({"name": "core", "owner": {"name": "Grey Haven"}, "plugins": []});
        let result = validate_marketplace(&doc);

        assert!(result.is_valid());
        let manifest = result.manifest.unwrap();
        assert_eq!(manifest.name, "core");
        assert_eq!(manifest.owner.name, "Grey Haven");
        assert!(manifest.plugins.is_empty());
    }

    #[test]
    fn marketplace_reports_every_missing_field() {
        let doc = json!({"name": "core", "owner": {}});
        let result = validate_marketplace(&doc);

        assert!(result.manifest.is_none());
        assert_eq!(
            result.messages(),
            vec!["owner.name: is required", "plugins: is required"]
        );
    }

    #[test]
    fn marketplace_missing_owner_reports_parent_only() {
        let doc = json!({"name": "core", "plugins": []});
        assert_eq!(
            paths(&validate(&doc, SchemaKind::Marketplace)),
            vec!["owner"]
        );
    }

    #[test]
    fn marketplace_plugin_entries_use_indexed_paths() {
        let doc = json!({
            "name": "core",
            "owner": {"name": "Owner"},
            "plugins": [
                {"name": "a", "source": "./a", "description": "A"},
                {"name": "b", "description": ""},
                {"name": "c", "source": "./c", "description": "C"},
                "not-an-object"
            ]
        });
        let violations = validate(&doc, SchemaKind::Marketplace);

        assert_eq!(
            violations.iter().map(|v| v.to_string()).collect::<Vec<_>>(),
            vec![
                "plugins[1].source: is required",
                "plugins[1].description: must not be empty",
                "plugins[3]: must be an object",
            ]
        );
    }

    #[test]
    fn marketplace_wrong_types() {
        let doc = json!({"name": 7, "owner": "someone", "plugins": {}});
        assert_eq!(
            validate(&doc, SchemaKind::Marketplace)
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>(),
            vec![
                "name: must be a string",
                "owner: must be an object",
                "plugins: must be an array",
            ]
        );
    }

    #[test]
    fn non_object_document() {
        let violations = validate(&json!([1, 2]), SchemaKind::Plugin);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "$");
    }

    #[test]
    fn plugin_valid_projects_typed_record() {
        let mut doc = valid_plugin();
        doc["keywords"] = json!(["lint", "review"]);
        doc["license"] = json!("MIT");

        let result = validate_plugin(&doc);
        assert!(result.is_valid());
        let manifest = result.manifest.unwrap();
        assert_eq!(manifest.version, "1.2.3");
        assert_eq!(manifest.keywords, Some(vec!["lint".into(), "review".into()]));
        assert_eq!(manifest.license.as_deref(), Some("MIT"));
    }

    #[test]
    fn plugin_bad_name_and_short_version() {
        let doc = json!({
            "name": "My_Plugin",
            "description": "x",
            "version": "1.0",
            "author": {"name": "A"}
        });
        let violations = validate(&doc, SchemaKind::Plugin);

        assert_eq!(paths(&violations), vec!["name", "version"]);
        assert!(violations[0].message.contains("kebab-case"));
        assert!(violations[1].message.contains("MAJOR.MINOR.PATCH"));
    }

    #[test]
    fn plugin_optional_fields_absent_is_fine() {
        assert!(validate(&valid_plugin(), SchemaKind::Plugin).is_empty());
    }

    #[test]
    fn plugin_keywords_not_array_is_one_violation() {
        let mut doc = valid_plugin();
        doc["keywords"] = json!("not-an-array");

        let violations = validate(&doc, SchemaKind::Plugin);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "keywords");
    }

    #[test]
    fn plugin_keyword_elements_checked() {
        let mut doc = valid_plugin();
        doc["keywords"] = json!(["ok", 3, "fine", null]);

        assert_eq!(
            paths(&validate(&doc, SchemaKind::Plugin)),
            vec!["keywords[1]", "keywords[3]"]
        );
    }

    #[test]
    fn plugin_license_must_be_string() {
        let mut doc = valid_plugin();
        doc["license"] = json!(["MIT"]);

        let violations = validate(&doc, SchemaKind::Plugin);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].to_string(), "license: must be a string");
    }

    #[test]
    fn plugin_empty_document_lists_required_fields_in_order() {
        assert_eq!(
            paths(&validate(&json!({}), SchemaKind::Plugin)),
            vec!["name", "description", "version", "author"]
        );
    }

    #[test]
    fn plugin_author_without_name() {
        let mut doc = valid_plugin();
        doc["author"] = json!({"email": "a@example.com"});

        assert_eq!(paths(&validate(&doc, SchemaKind::Plugin)), vec!["author.name"]);
    }

    #[test]
    fn validation_is_deterministic() {
        let doc = json!({"name": "-bad-", "version": "v1", "keywords": 1});
        let first = validate(&doc, SchemaKind::Plugin);
        for _ in 0..5 {
            assert_eq!(validate(&doc, SchemaKind::Plugin), first);
        }
    }

    #[test]
    fn kebab_case_rules() {
        assert!(is_kebab_case("sample-plugin"));
        assert!(is_kebab_case("a1"));
        assert!(is_kebab_case("x"));
        assert!(!is_kebab_case("-leading"));
        assert!(!is_kebab_case("trailing-"));
        assert!(!is_kebab_case("Upper"));
        assert!(!is_kebab_case("snake_case"));
        assert!(!is_kebab_case(""));
    }

    #[test]
    fn semver_rules() {
        assert!(is_semver("0.1.0"));
        assert!(is_semver("10.20.30"));
        assert!(!is_semver("1.0"));
        assert!(!is_semver("1.0.0-beta"));
        assert!(!is_semver("v1.0.0"));
    }
}
