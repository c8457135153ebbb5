//! Format-specific config initializers
//!
//! An initializer owns a default producer and a schema producer. On `init` it
//! computes the default, keeps the schema file current, embeds (or removes) a
//! schema reference when the format supports one, and writes the result.
//!
//! # Example
//!
//! ```no_run
//! use config_init::initializer::{ConfigInitializer, YamlInitializer};
//! use config_init::InitArgs;
//! use serde_json::json;
//! use std::path::Path;
//!
//! let initializer = YamlInitializer::new("name: Test\n")
//!     .with_schema(json!({"$id": "app/1"}));
//!
//! initializer
//!     .init(
//!         Path::new("config/app.yml"),
//!         Some(Path::new("schema/app.json")),
//!         true,
//!         &InitArgs::new(),
//!     )
//!     .expect("Failed to initialize config");
//! ```

pub mod binary;
pub mod json;
pub mod text;

pub use binary::BinaryInitializer;
pub use json::JsonInitializer;
pub use text::{TextInitializer, YamlInitializer};

use crate::error::Result;
use crate::paths::schema_reference_path;
use crate::producer::{InitArgs, Producer};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::fs;
use std::path::Path;

/// Schema key compared by [`ConfigInitializer::check_schema`]
pub const SCHEMA_ID_KEY: &str = "$id";

/// In-band schema reference syntax for a config format
pub trait SchemaReference<R: Clone> {
    /// Return a copy of `config` that points at `schema_path`
    fn inject_schema_path(&self, config: &R, schema_path: &Path) -> R;

    /// Return `config` without its schema reference
    ///
    /// Borrows `config` unchanged when there is nothing to remove.
    fn strip_schema_path<'a>(&self, config: &'a R) -> Cow<'a, R>;
}

/// Produces and writes a default config file in one format
pub trait ConfigInitializer: Sized {
    /// In-memory and on-disk representation of the config
    type Raw: Clone + Send + Sync + 'static;

    fn default_producer(&self) -> &Producer<Self::Raw>;

    fn schema_producer(&self) -> &Producer<Value>;

    /// Same initializer (settings and schema) with a different default
    #[must_use]
    fn with_default(&self, default: Producer<Self::Raw>) -> Self;

    /// Schema reference support, if the format has one
    fn schema_reference(&self) -> Option<&dyn SchemaReference<Self::Raw>> {
        None
    }

    /// Convert a processed config into what gets written to disk
    fn serialize(&self, processed: Self::Raw) -> Self::Raw {
        processed
    }

    /// Write `raw` to `path`, replacing any existing file
    fn write(&self, raw: &Self::Raw, path: &Path) -> Result<()>;

    /// Read a config file of this format from disk
    fn read(&self, path: &Path) -> Result<Self::Raw>;

    /// Current schema; not cached
    fn schema(&self) -> Option<Value> {
        self.schema_producer().produce(&InitArgs::new())
    }

    /// Initialize a default config and schema on disk
    ///
    /// # Arguments
    /// * `path` - config file to create
    /// * `schema_path` - where to place the schema, if any
    /// * `inject_schema` - embed a reference to the schema in the config; when
    ///   false (or no schema path is given) existing references are removed
    /// * `args` - forwarded to the default producer
    ///
    /// When the default producer yields nothing, neither file is touched.
    /// Keeping the schema current in that case is left to
    /// [`ConfigManager::init`](crate::manager::ConfigManager::init).
    ///
    /// # Returns
    /// `true` if a config file was written, `false` when the default producer
    /// yielded nothing
    fn init(
        &self,
        path: &Path,
        schema_path: Option<&Path>,
        inject_schema: bool,
        args: &InitArgs,
    ) -> Result<bool> {
        let Some(default) = self.default_producer().produce(args) else {
            tracing::debug!("No default config for {}, skipping", path.display());
            return Ok(false);
        };

        self.update_schema(schema_path)?;

        let processed = match (self.schema_reference(), schema_path) {
            (Some(reference), Some(schema_path)) if inject_schema => {
                let relative = schema_reference_path(path, schema_path)?;
                self.serialize(reference.inject_schema_path(&default, &relative))
            }
            (Some(reference), _) => {
                let stripped = reference.strip_schema_path(&default).into_owned();
                self.serialize(stripped)
            }
            (None, _) => default,
        };

        self.write(&processed, path)?;
        tracing::debug!("Wrote config file at {}", path.display());

        Ok(true)
    }

    /// Rewrite the schema file at `schema_path` from the current schema
    ///
    /// Does nothing without a path or without a schema.
    fn update_schema(&self, schema_path: Option<&Path>) -> Result<()> {
        let Some(schema_path) = schema_path else {
            return Ok(());
        };

        let Some(schema) = self.schema() else {
            return Ok(());
        };

        let mut content = serde_json::to_string_pretty(&schema)?;
        content.push('\n');
        ensure_parent(schema_path)?;
        fs::write(schema_path, content)?;
        tracing::debug!("Updated schema file at {}", schema_path.display());

        Ok(())
    }

    /// Check whether the schema on disk has the same `$id` as the current one
    ///
    /// Always true when there is no schema to check against. A missing or
    /// empty schema file counts as an empty object.
    fn check_schema(&self, schema_path: &Path) -> Result<bool> {
        let Some(schema) = self.schema() else {
            return Ok(true);
        };

        let local = read_schema_file(schema_path)?;

        Ok(local.get(SCHEMA_ID_KEY) == schema.get(SCHEMA_ID_KEY))
    }
}

fn read_schema_file(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Ok(Value::Object(Map::new()));
    }

    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }

    Ok(serde_json::from_str(&content)?)
}

/// Create the parent directory of `path` if it is missing
pub(crate) fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    Ok(())
}
