//! Config file formats

use crate::error::{Error, Result};
use camino::Utf8Path;
use serde_json::Value;
use std::fmt;

/// Serialization format of a config file, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigFormat {
    Json,
    Toml,
    Yaml,
}

impl ConfigFormat {
    /// All formats in discovery order
    pub const ALL: [ConfigFormat; 3] = [ConfigFormat::Json, ConfigFormat::Toml, ConfigFormat::Yaml];

    /// Resolve a format from a file extension (`yml` is accepted for YAML)
    pub fn from_extension(extension: &str) -> Result<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "toml" => Ok(Self::Toml),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(Error::unsupported_format(other)),
        }
    }

    /// Resolve a format from a path's extension
    pub fn from_path(path: &Utf8Path) -> Result<Self> {
        let extension = path
            .extension()
            .ok_or_else(|| Error::unsupported_format(path.as_str()))?;
        Self::from_extension(extension)
    }

    /// Canonical file extension
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Toml => "toml",
            Self::Yaml => "yaml",
        }
    }

    /// Parse document text into a generic value tree
    pub fn parse(&self, content: &str) -> Result<Value> {
        let value = match self {
            Self::Json => serde_json::from_str(content)?,
            Self::Toml => toml::from_str(content)?,
            Self::Yaml => {
                // An empty YAML document parses to null; treat it as an empty table
                let value: Value = serde_yaml_ng::from_str(content)?;
                if value.is_null() {
                    Value::Object(Default::default())
                } else {
                    value
                }
            }
        };

        if !value.is_object() {
            return Err(Error::invalid_config(format!(
                "{} config must be a table at the top level",
                self
            )));
        }

        Ok(value)
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
