//! Scaffold default config files and keep their JSON Schema references current
//!
//! Initializers write a default config (plain text, YAML, JSON or binary) and a
//! schema file, embedding a schema reference editors understand. A
//! [`ConfigManager`] resolves paths against a root, honours existing files and
//! templates, and memoizes the parsed config.

pub mod error;
pub mod initializer;
pub mod loader;
pub mod manager;
pub mod paths;
pub mod producer;

pub use error::{ConfigInitError, Result};
pub use initializer::{
    BinaryInitializer, ConfigInitializer, JsonInitializer, SchemaReference, TextInitializer,
    YamlInitializer,
};
pub use loader::FromConfigFile;
pub use manager::{ConfigManager, InitOptions};
pub use producer::{InitArgs, Placeholders, Producer};
