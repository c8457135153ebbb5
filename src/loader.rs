//! Parsing config files into caller types
//!
//! [`ConfigManager::config`](crate::manager::ConfigManager::config) builds its
//! config object through [`FromConfigFile`]. Raw contents are available as
//! `String` or `Vec<u8>`; serde types go through the [`Json`], [`Yaml`] and
//! [`Toml`] wrappers.

use crate::error::Result;
use serde::de::DeserializeOwned;
use std::io::Read;
use std::ops::Deref;

/// Constructs a config object from an open config file
pub trait FromConfigFile: Sized {
    /// Parse from a reader positioned at the start of the file
    fn from_file<R: Read>(reader: R) -> Result<Self>;
}

impl FromConfigFile for String {
    fn from_file<R: Read>(mut reader: R) -> Result<Self> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        Ok(content)
    }
}

impl FromConfigFile for Vec<u8> {
    fn from_file<R: Read>(mut reader: R) -> Result<Self> {
        let mut content = Vec::new();
        reader.read_to_end(&mut content)?;
        Ok(content)
    }
}

macro_rules! serde_wrapper {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name<T>(pub T);

        impl<T> $name<T> {
            pub fn into_inner(self) -> T {
                self.0
            }
        }

        impl<T> Deref for $name<T> {
            type Target = T;

            fn deref(&self) -> &T {
                &self.0
            }
        }
    };
}

serde_wrapper!(
    /// Config parsed from JSON
    Json
);

serde_wrapper!(
    /// Config parsed from YAML
    Yaml
);

serde_wrapper!(
    /// Config parsed from TOML
    Toml
);

impl<T: DeserializeOwned> FromConfigFile for Json<T> {
    fn from_file<R: Read>(reader: R) -> Result<Self> {
        Ok(Self(serde_json::from_reader(reader)?))
    }
}

impl<T: DeserializeOwned> FromConfigFile for Yaml<T> {
    fn from_file<R: Read>(reader: R) -> Result<Self> {
        Ok(Self(serde_yaml::from_reader(reader)?))
    }
}

impl<T: DeserializeOwned> FromConfigFile for Toml<T> {
    fn from_file<R: Read>(reader: R) -> Result<Self> {
        let content = String::from_file(reader)?;
        Ok(Self(toml::from_str(&content)?))
    }
}
