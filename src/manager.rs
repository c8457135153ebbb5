//! Config manager
//!
//! Ties a config path (and optional schema path), relative to a caller-chosen
//! root, to an initializer and a config type. Handles first-run scaffolding,
//! template seeding and memoized loading.
//!
//! # Example
//!
//! ```no_run
//! use config_init::initializer::JsonInitializer;
//! use config_init::loader::Json;
//! use config_init::manager::{ConfigManager, InitOptions};
//! use serde_json::{Map, Value};
//! use std::path::Path;
//!
//! let mut manager: ConfigManager<Json<Value>, _> =
//!     ConfigManager::new("config.json", JsonInitializer::new(Map::new()))
//!         .with_schema_path("schema/config.json");
//!
//! let root = Path::new("/tmp/app");
//! manager
//!     .init(&InitOptions::new().with_root(root))
//!     .expect("Failed to initialize config");
//! let config = manager.config(Some(root)).expect("Failed to load config");
//! ```

use crate::error::Result;
use crate::initializer::ConfigInitializer;
use crate::loader::FromConfigFile;
use crate::paths::absolutize;
use crate::producer::{InitArgs, Producer};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Options for [`ConfigManager::init`]
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Directory the config is created under; current directory when `None`
    pub root: Option<PathBuf>,
    /// Directory holding an existing config to copy instead of the default
    pub template: Option<PathBuf>,
    /// Replace a config that already exists
    pub overwrite: bool,
    /// Embed a schema reference in the new config
    pub inject_schema: bool,
    /// Forwarded to the initializer's default producer
    pub args: InitArgs,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            root: None,
            template: None,
            overwrite: false,
            inject_schema: true,
            args: InitArgs::new(),
        }
    }
}

impl InitOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    #[must_use]
    pub fn with_template(mut self, template: impl Into<PathBuf>) -> Self {
        self.template = Some(template.into());
        self
    }

    #[must_use]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    #[must_use]
    pub fn with_inject_schema(mut self, inject_schema: bool) -> Self {
        self.inject_schema = inject_schema;
        self
    }

    /// Add one argument for the default producer
    #[must_use]
    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }
}

/// Memoized config and the resolved path it was loaded from
#[derive(Debug)]
struct CachedConfig<T> {
    path: PathBuf,
    config: Option<Arc<T>>,
}

/// Manages one config file (and its schema) relative to a root directory
#[derive(Debug)]
pub struct ConfigManager<T, I> {
    path: PathBuf,
    schema_path: Option<PathBuf>,
    initializer: I,
    cache: Option<CachedConfig<T>>,
}

impl<T, I> ConfigManager<T, I>
where
    T: FromConfigFile,
    I: ConfigInitializer,
{
    /// Create a manager for the config at `path` (relative to a root)
    pub fn new(path: impl Into<PathBuf>, initializer: I) -> Self {
        Self {
            path: path.into(),
            schema_path: None,
            initializer,
            cache: None,
        }
    }

    /// Keep a schema file at `schema_path` (relative to a root)
    #[must_use]
    pub fn with_schema_path(mut self, schema_path: impl Into<PathBuf>) -> Self {
        self.schema_path = Some(schema_path.into());
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Change the relative config path; cached configs for the old path are
    /// reloaded on the next [`config`](Self::config) call
    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = path.into();
    }

    #[must_use]
    pub fn schema_path(&self) -> Option<&Path> {
        self.schema_path.as_deref()
    }

    pub fn set_schema_path(&mut self, schema_path: Option<PathBuf>) {
        self.schema_path = schema_path;
    }

    #[must_use]
    pub fn initializer(&self) -> &I {
        &self.initializer
    }

    fn resolve(&self, root: Option<&Path>) -> (PathBuf, Option<PathBuf>) {
        let root = root.unwrap_or_else(|| Path::new(""));
        let path = root.join(&self.path);
        let schema_path = self.schema_path.as_ref().map(|p| root.join(p));
        (path, schema_path)
    }

    /// Initialize the config relative to `options.root`
    ///
    /// The schema file is written whenever a schema path and a schema exist,
    /// even if the config itself is skipped.
    ///
    /// # Returns
    /// `true` if a config file was written
    pub fn init(&self, options: &InitOptions) -> Result<bool> {
        let (path, schema_path) = self.resolve(options.root.as_deref());

        let mut should_init = true;
        let mut template_initializer = None;

        if let Some(template) = &options.template {
            let source = template.join(&self.path);
            if source.exists() {
                let content = self.initializer.read(&source)?;
                template_initializer = Some(self.initializer.with_default(Producer::value(content)));
            } else {
                tracing::error!("No config file found in template at {}", source.display());
                should_init = false;
            }
        }

        if should_init && path.exists() {
            if options.overwrite {
                tracing::warn!("Overwriting existing config file at {}", path.display());
            } else {
                tracing::warn!("Ignoring existing config file at {}", path.display());
                should_init = false;
            }
        }

        if !should_init {
            self.initializer.update_schema(schema_path.as_deref())?;
            return Ok(false);
        }

        let initializer = template_initializer.as_ref().unwrap_or(&self.initializer);
        let written = initializer.init(
            &path,
            schema_path.as_deref(),
            options.inject_schema,
            &options.args,
        )?;

        if !written {
            self.initializer.update_schema(schema_path.as_deref())?;
        }

        Ok(written)
    }

    /// Rewrite the schema file relative to `root` from the current schema
    pub fn update_schema(&self, root: Option<&Path>) -> Result<()> {
        let (_, schema_path) = self.resolve(root);
        self.initializer.update_schema(schema_path.as_deref())
    }

    /// Check the schema file relative to `root` against the current schema
    ///
    /// Reports a match when no schema path is configured.
    pub fn check_schema(&self, root: Option<&Path>) -> Result<bool> {
        match self.resolve(root) {
            (_, Some(schema_path)) => self.initializer.check_schema(&schema_path),
            (_, None) => Ok(true),
        }
    }

    /// Clear the config memoization cache
    pub fn clear_cache(&mut self) {
        self.cache = None;
    }

    /// Get the config relative to `root`, memoized on the resolved path
    ///
    /// A loaded config is reused until the resolved path changes or the cache
    /// is cleared; edits on disk are not picked up in between. A missing file
    /// is checked again on every call.
    pub fn config(&mut self, root: Option<&Path>) -> Result<Option<Arc<T>>> {
        let (path, _) = self.resolve(root);
        let path = absolutize(&path)?;

        let fresh = matches!(
            &self.cache,
            Some(CachedConfig { path: cached, config: Some(_) }) if *cached == path
        );

        if !fresh {
            let config = Self::load(&path)?;
            self.cache = Some(CachedConfig { path, config });
        }

        Ok(self.cache.as_ref().and_then(|cached| cached.config.clone()))
    }

    fn load(path: &Path) -> Result<Option<Arc<T>>> {
        if !path.exists() {
            tracing::debug!("No config file at {}", path.display());
            return Ok(None);
        }

        tracing::debug!("Loading config from {}", path.display());
        let file = File::open(path)?;
        let config = T::from_file(BufReader::new(file))?;

        Ok(Some(Arc::new(config)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::initializer::{JsonInitializer, YamlInitializer};
    use serde_json::{json, Map, Value};
    use tempfile::TempDir;

    #[derive(Debug)]
    struct Config;

    impl FromConfigFile for Config {
        fn from_file<R: std::io::Read>(_reader: R) -> Result<Self> {
            Ok(Self)
        }
    }

    fn manager() -> ConfigManager<Config, JsonInitializer> {
        ConfigManager::new("config.json", JsonInitializer::new(Map::new()))
    }

    #[test]
    fn test_resolve_joins_root() {
        let manager = manager().with_schema_path("schema/schema.json");
        let (path, schema_path) = manager.resolve(Some(Path::new("root")));

        assert_eq!(path, PathBuf::from("root/config.json"));
        assert_eq!(schema_path, Some(PathBuf::from("root/schema/schema.json")));
    }

    #[test]
    fn test_resolve_without_root() {
        let (path, schema_path) = manager().resolve(None);

        assert_eq!(path, PathBuf::from("config.json"));
        assert!(schema_path.is_none());
    }

    #[test]
    fn test_init_options_defaults() {
        let options = InitOptions::new();

        assert!(options.root.is_none());
        assert!(options.template.is_none());
        assert!(!options.overwrite);
        assert!(options.inject_schema);
        assert!(options.args.is_empty());
    }

    #[test]
    fn test_init_options_args() {
        let options = InitOptions::new().with_arg("name", "test2").with_arg("port", 8080);

        assert_eq!(options.args.get("name"), Some(&json!("test2")));
        assert_eq!(options.args.get("port"), Some(&json!(8080)));
    }

    #[test]
    fn test_absent_default_still_updates_schema() {
        let temp_dir = TempDir::new().unwrap();
        let initializer = JsonInitializer::new(Producer::<Map<String, Value>>::none())
            .with_schema(json!({"$id": "0"}));
        let manager: ConfigManager<Config, _> =
            ConfigManager::new("config.json", initializer).with_schema_path("schema.json");

        let written = manager
            .init(&InitOptions::new().with_root(temp_dir.path()))
            .unwrap();

        assert!(!written);
        assert!(!temp_dir.path().join("config.json").exists());
        assert!(temp_dir.path().join("schema.json").exists());
    }

    #[test]
    fn test_check_schema_without_schema_path() {
        let temp_dir = TempDir::new().unwrap();
        let initializer = YamlInitializer::new("a: 1\n").with_schema(json!({"$id": "0"}));
        let manager: ConfigManager<String, _> = ConfigManager::new("config.yml", initializer);

        assert!(manager.check_schema(Some(temp_dir.path())).unwrap());
    }

    #[test]
    fn test_update_and_check_schema() {
        let temp_dir = TempDir::new().unwrap();
        let initializer = YamlInitializer::new("a: 1\n").with_schema(json!({"$id": "0"}));
        let manager: ConfigManager<String, _> =
            ConfigManager::new("config.yml", initializer).with_schema_path("schema.json");

        assert!(!manager.check_schema(Some(temp_dir.path())).unwrap());
        manager.update_schema(Some(temp_dir.path())).unwrap();
        assert!(manager.check_schema(Some(temp_dir.path())).unwrap());
    }

    #[test]
    fn test_config_absent_is_not_cached() {
        let temp_dir = TempDir::new().unwrap();
        let mut manager = manager();

        assert!(manager.config(Some(temp_dir.path())).unwrap().is_none());

        manager
            .init(&InitOptions::new().with_root(temp_dir.path()))
            .unwrap();

        assert!(manager.config(Some(temp_dir.path())).unwrap().is_some());
    }
}
