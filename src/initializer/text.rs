use super::{ensure_parent, ConfigInitializer, SchemaReference};
use crate::error::Result;
use crate::producer::Producer;
use serde_json::Value;
use std::borrow::Cow;
use std::fs;
use std::path::Path;

/// Declaration understood by yaml-language-server
pub const YAML_SCHEMA_DECLARATION: &str = "# yaml-language-server: $schema=";

/// Declaration understood by taplo and other TOML tooling
pub const TOML_SCHEMA_DECLARATION: &str = "#:schema ";

/// Initializer for plain text config files
///
/// Plain text has no schema syntax, so the default is written untouched.
#[derive(Debug, Clone)]
pub struct TextInitializer {
    default: Producer<String>,
    schema: Producer<Value>,
}

impl TextInitializer {
    pub fn new(default: impl Into<Producer<String>>) -> Self {
        Self {
            default: default.into(),
            schema: Producer::none(),
        }
    }

    /// Set the schema, or a function producing it
    #[must_use]
    pub fn with_schema(mut self, schema: impl Into<Producer<Value>>) -> Self {
        self.schema = schema.into();
        self
    }
}

impl ConfigInitializer for TextInitializer {
    type Raw = String;

    fn default_producer(&self) -> &Producer<String> {
        &self.default
    }

    fn schema_producer(&self) -> &Producer<Value> {
        &self.schema
    }

    fn with_default(&self, default: Producer<String>) -> Self {
        Self {
            default,
            schema: self.schema.clone(),
        }
    }

    fn write(&self, raw: &String, path: &Path) -> Result<()> {
        write_text(raw, path)
    }

    fn read(&self, path: &Path) -> Result<String> {
        Ok(fs::read_to_string(path)?)
    }
}

/// Initializer for YAML (or other `#`-commented text) config files
///
/// The schema reference is a declaration comment on the first line.
#[derive(Debug, Clone)]
pub struct YamlInitializer {
    default: Producer<String>,
    schema: Producer<Value>,
    declaration: CommentDeclaration,
}

impl YamlInitializer {
    pub fn new(default: impl Into<Producer<String>>) -> Self {
        Self {
            default: default.into(),
            schema: Producer::none(),
            declaration: CommentDeclaration {
                prefix: YAML_SCHEMA_DECLARATION.to_string(),
            },
        }
    }

    /// Set the schema, or a function producing it
    #[must_use]
    pub fn with_schema(mut self, schema: impl Into<Producer<Value>>) -> Self {
        self.schema = schema.into();
        self
    }

    /// Use a different declaration prefix, e.g. [`TOML_SCHEMA_DECLARATION`]
    #[must_use]
    pub fn with_declaration_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.declaration.prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn declaration_prefix(&self) -> &str {
        &self.declaration.prefix
    }
}

impl ConfigInitializer for YamlInitializer {
    type Raw = String;

    fn default_producer(&self) -> &Producer<String> {
        &self.default
    }

    fn schema_producer(&self) -> &Producer<Value> {
        &self.schema
    }

    fn with_default(&self, default: Producer<String>) -> Self {
        Self {
            default,
            schema: self.schema.clone(),
            declaration: self.declaration.clone(),
        }
    }

    fn schema_reference(&self) -> Option<&dyn SchemaReference<String>> {
        Some(&self.declaration)
    }

    fn write(&self, raw: &String, path: &Path) -> Result<()> {
        write_text(raw, path)
    }

    fn read(&self, path: &Path) -> Result<String> {
        Ok(fs::read_to_string(path)?)
    }
}

/// Leading `<prefix><path>` comment line
#[derive(Debug, Clone)]
struct CommentDeclaration {
    prefix: String,
}

impl CommentDeclaration {
    fn line(&self, schema_path: &Path) -> String {
        format!("{}{}\n", self.prefix, schema_path.display())
    }
}

/// Split keeping line endings; empty input is a single empty line
///
/// Breaks on `\n`, `\r\n`, a lone `\r` and the other Unicode line separators.
fn split_lines(config: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = config.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        let end = match c {
            '\r' => match chars.peek() {
                Some(&(j, '\n')) => {
                    chars.next();
                    j + 1
                }
                _ => i + 1,
            },
            '\n' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}'
            | '\u{2029}' => i + c.len_utf8(),
            _ => continue,
        };
        lines.push(&config[start..end]);
        start = end;
    }

    if start < config.len() || lines.is_empty() {
        lines.push(&config[start..]);
    }
    lines
}

impl SchemaReference<String> for CommentDeclaration {
    fn inject_schema_path(&self, config: &String, schema_path: &Path) -> String {
        let lines = split_lines(config);
        let declaration = self.line(schema_path);

        let rest = if lines[0].trim().starts_with(&self.prefix) {
            &lines[1..]
        } else {
            &lines[..]
        };

        let mut injected = declaration;
        injected.extend(rest.iter().copied());
        injected
    }

    fn strip_schema_path<'a>(&self, config: &'a String) -> Cow<'a, String> {
        let lines = split_lines(config);

        if lines[0].starts_with(&self.prefix) {
            Cow::Owned(lines[1..].concat())
        } else {
            Cow::Borrowed(config)
        }
    }
}

fn write_text(raw: &str, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    fs::write(path, raw)?;
    Ok(())
}
