use super::{ensure_parent, ConfigInitializer, SchemaReference};
use crate::error::{ConfigInitError, Result};
use crate::producer::Producer;
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::fs;
use std::path::Path;

/// Top-level key editors read the schema location from
pub const JSON_SCHEMA_PROPERTY: &str = "$schema";

/// Initializer for JSON config files
///
/// The schema reference is a reserved top-level property.
#[derive(Debug, Clone)]
pub struct JsonInitializer {
    default: Producer<Map<String, Value>>,
    schema: Producer<Value>,
    property: SchemaProperty,
}

impl JsonInitializer {
    pub fn new(default: impl Into<Producer<Map<String, Value>>>) -> Self {
        Self {
            default: default.into(),
            schema: Producer::none(),
            property: SchemaProperty {
                key: JSON_SCHEMA_PROPERTY.to_string(),
            },
        }
    }

    /// Set the schema, or a function producing it
    #[must_use]
    pub fn with_schema(mut self, schema: impl Into<Producer<Value>>) -> Self {
        self.schema = schema.into();
        self
    }

    /// Store the schema reference under `key` instead of `$schema`
    #[must_use]
    pub fn with_schema_property(mut self, key: impl Into<String>) -> Self {
        self.property.key = key.into();
        self
    }

    #[must_use]
    pub fn schema_property(&self) -> &str {
        &self.property.key
    }
}

impl ConfigInitializer for JsonInitializer {
    type Raw = Map<String, Value>;

    fn default_producer(&self) -> &Producer<Map<String, Value>> {
        &self.default
    }

    fn schema_producer(&self) -> &Producer<Value> {
        &self.schema
    }

    fn with_default(&self, default: Producer<Map<String, Value>>) -> Self {
        Self {
            default,
            schema: self.schema.clone(),
            property: self.property.clone(),
        }
    }

    fn schema_reference(&self) -> Option<&dyn SchemaReference<Map<String, Value>>> {
        Some(&self.property)
    }

    fn write(&self, raw: &Map<String, Value>, path: &Path) -> Result<()> {
        let mut content = serde_json::to_string_pretty(raw)?;
        content.push('\n');

        ensure_parent(path)?;
        fs::write(path, content)?;
        Ok(())
    }

    fn read(&self, path: &Path) -> Result<Map<String, Value>> {
        let content = fs::read_to_string(path)?;

        match serde_json::from_str::<Value>(&content)? {
            Value::Object(config) => Ok(config),
            other => Err(ConfigInitError::Config(format!(
                "Expected a JSON object in {}, found {}",
                path.display(),
                json_kind(&other)
            ))),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[derive(Debug, Clone)]
struct SchemaProperty {
    key: String,
}

impl SchemaReference<Map<String, Value>> for SchemaProperty {
    fn inject_schema_path(
        &self,
        config: &Map<String, Value>,
        schema_path: &Path,
    ) -> Map<String, Value> {
        let mut injected = config.clone();
        injected.insert(
            self.key.clone(),
            Value::String(schema_path.display().to_string()),
        );
        injected
    }

    fn strip_schema_path<'a>(
        &self,
        config: &'a Map<String, Value>,
    ) -> Cow<'a, Map<String, Value>> {
        if !config.contains_key(&self.key) {
            return Cow::Borrowed(config);
        }

        let mut stripped = config.clone();
        stripped.shift_remove(&self.key);
        Cow::Owned(stripped)
    }
}
