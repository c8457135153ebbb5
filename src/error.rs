use thiserror::Error;

/// Main error type for config-init
#[derive(Error, Debug)]
pub enum ConfigInitError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Config error: {0}\n\nTroubleshooting:\n- JSON configs must hold an object at the top level\n- Check the template or default file for stray content\n- Run with RUST_LOG=debug for more details")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ConfigInitError>;
