use super::{ensure_parent, ConfigInitializer};
use crate::error::Result;
use crate::producer::Producer;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Initializer for binary config files
///
/// Bytes are written as given; no schema reference is embedded.
#[derive(Debug, Clone)]
pub struct BinaryInitializer {
    default: Producer<Vec<u8>>,
    schema: Producer<Value>,
}

impl BinaryInitializer {
    pub fn new(default: impl Into<Producer<Vec<u8>>>) -> Self {
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

impl ConfigInitializer for BinaryInitializer {
    type Raw = Vec<u8>;

    fn default_producer(&self) -> &Producer<Vec<u8>> {
        &self.default
    }

    fn schema_producer(&self) -> &Producer<Value> {
        &self.schema
    }

    fn with_default(&self, default: Producer<Vec<u8>>) -> Self {
        Self {
            default,
            schema: self.schema.clone(),
        }
    }

    fn write(&self, raw: &Vec<u8>, path: &Path) -> Result<()> {
        ensure_parent(path)?;
        fs::write(path, raw)?;
        Ok(())
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        Ok(fs::read(path)?)
    }
}
