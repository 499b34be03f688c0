use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlugkitError {
    #[error("Invalid JSON in {path} at line {line}, column {column}: {message}")]
    JsonParse {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Validation failed with {count} violation(s)")]
    ValidationFailed { count: usize },

    #[error("Refusing to overwrite existing paths: {paths:?}")]
    Conflict { paths: Vec<PathBuf> },

    #[error("Generation stopped after writing {written:?}: {source}")]
    GenerationIncomplete {
        written: Vec<PathBuf>,
        #[source]
        source: std::io::Error,
    },

    #[error("Generated {file} is not valid: {violations:?}")]
    InvalidGenerated {
        file: &'static str,
        violations: Vec<String>,
    },

    #[error("Plugin not found: {name}")]
    PluginNotFound { name: String },

    #[error("No plugins found in {path}")]
    NoPlugins { path: PathBuf },

    #[error("Failed to parse config file {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("Unknown config key: {key}")]
    ConfigKeyNotFound { key: String },

    #[error("Invalid value for {key}: {message}")]
    ConfigValue { key: String, message: String },

    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, PlugkitError>;

impl PlugkitError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ValidationFailed { .. } => 1,
            Self::Io(_) | Self::GenerationIncomplete { .. } => 2,
            Self::JsonParse { .. } => 3,
            Self::Conflict { .. } => 4,
            Self::PluginNotFound { .. } | Self::NoPlugins { .. } => 5,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_distinguish_kinds() {
        let validation = PlugkitError::ValidationFailed { count: 2 };
        let io = PlugkitError::Io(std::io::Error::other("boom"));
        let conflict = PlugkitError::Conflict { paths: vec![] };

        assert_eq!(validation.exit_code(), 1);
        assert_eq!(io.exit_code(), 2);
        assert_eq!(conflict.exit_code(), 4);
        assert_ne!(validation.exit_code(), io.exit_code());
    }

    #[test]
    fn exit_codes_for_parse_lookup_and_partial_writes() {
        let parse = PlugkitError::JsonParse {
            path: PathBuf::from("marketplace.json"),
            line: 1,
            column: 2,
            message: "trailing comma".to_string(),
        };
        let missing = PlugkitError::PluginNotFound {
            name: "core".to_string(),
        };
        let none = PlugkitError::NoPlugins {
            path: PathBuf::from("plugins"),
        };
        let partial = PlugkitError::GenerationIncomplete {
            written: vec![PathBuf::from(".claude-plugin/marketplace.json")],
            source: std::io::Error::other("disk full"),
        };
        let config = PlugkitError::ConfigKeyNotFound {
            key: "nope".to_string(),
        };

        assert_eq!(parse.exit_code(), 3);
        assert_eq!(missing.exit_code(), 5);
        assert_eq!(none.exit_code(), 5);
        assert_eq!(partial.exit_code(), 2);
        assert_eq!(config.exit_code(), 1);
    }

    #[test]
    fn json_parse_message_names_location() {
        let err = PlugkitError::JsonParse {
            path: PathBuf::from("plugin.json"),
            line: 3,
            column: 7,
            message: "expected value".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("plugin.json"));
        assert!(text.contains("line 3"));
    }
}
