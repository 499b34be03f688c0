//! YAML frontmatter for agent and skill markdown files

use serde_yaml::{Mapping, Value};

/// Parsed `---` fenced header plus the remaining body
#[derive(Debug, Clone)]
pub struct Frontmatter {
    pub fields: Mapping,
    pub body: String,
}

impl Frontmatter {
    /// Split and parse; `None` when there is no fenced header or it is not a YAML mapping
    pub fn parse(content: &str) -> Option<Self> {
        let mut lines = content.lines();
        if lines.next()?.trim() != "---" {
            return None;
        }

        let mut yaml_lines = Vec::new();
        let mut closed = false;
        for line in lines.by_ref() {
            if line.trim() == "---" {
                closed = true;
                break;
            }
            yaml_lines.push(line);
        }
        if !closed {
            return None;
        }

        let fields = match serde_yaml::from_str::<Value>(&yaml_lines.join("\n")).ok()? {
            Value::Mapping(m) => m,
            Value::Null => Mapping::new(),
            _ => return None,
        };
        let body = lines.collect::<Vec<_>>().join("\n").trim().to_string();

        Some(Self { fields, body })
    }

    pub fn has(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// String value of a field; scalars other than strings are rendered
    pub fn get_str(&self, key: &str) -> Option<String> {
        match self.fields.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn body_lines(&self) -> usize {
        self.body.lines().count()
    }
}
