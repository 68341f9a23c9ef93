//! Configuration file loading and merging

use super::format::ConfigFormat;
use crate::error::{Error, Result};
use crate::paths::{ToolDirs, TOOL_NAME};
use crate::utils::recursive_merge;
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fs;
use tracing::debug;

/// Default permission mask applied to created files and directories
pub const DEFAULT_UMASK: u32 = 0o022;

/// Default external git command
pub const DEFAULT_GIT_COMMAND: &str = "git";

/// Whether the built-in (libgit2) backend is used instead of the git executable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UseBuiltinGit {
    /// Built-in only when the git command cannot be found on PATH
    #[default]
    Auto,
    /// Always use the built-in backend
    Always,
    /// Always use the external git command
    Never,
}

impl Serialize for UseBuiltinGit {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Auto => serializer.serialize_str("auto"),
            Self::Always => serializer.serialize_bool(true),
            Self::Never => serializer.serialize_bool(false),
        }
    }
}

impl<'de> Deserialize<'de> for UseBuiltinGit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Bool(bool),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Bool(true) => Ok(Self::Always),
            Raw::Bool(false) => Ok(Self::Never),
            Raw::Text(text) => match text.to_ascii_lowercase().as_str() {
                "auto" => Ok(Self::Auto),
                "true" | "on" | "yes" => Ok(Self::Always),
                "false" | "off" | "no" => Ok(Self::Never),
                other => Err(serde::de::Error::custom(format!(
                    "invalid use_builtin_git value: {other} (expected auto, true or false)"
                ))),
            },
        }
    }
}

/// External git settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitConfig {
    /// Git executable used by the external backend
    pub command: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            command: DEFAULT_GIT_COMMAND.to_string(),
        }
    }
}

/// Resolved dotkeep configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Local working copy of the managed repository
    pub source_dir: Utf8PathBuf,

    /// Root of the destination tree
    pub dest_dir: Utf8PathBuf,

    /// Permission mask for created entries
    pub umask: u32,

    /// Git backend selection policy
    pub use_builtin_git: UseBuiltinGit,

    /// External git settings
    pub git: GitConfig,

    /// User-declared template data
    pub data: Map<String, Value>,

    /// File this configuration was read from, if any
    #[serde(skip)]
    pub config_file: Option<Utf8PathBuf>,
}

impl Config {
    /// Built-in defaults for the given directories
    pub fn defaults(dirs: &ToolDirs) -> Self {
        Self {
            source_dir: dirs.default_source_dir(),
            dest_dir: dirs.home_dir.clone(),
            umask: DEFAULT_UMASK,
            use_builtin_git: UseBuiltinGit::default(),
            git: GitConfig::default(),
            data: Map::new(),
            config_file: None,
        }
    }

    /// Load configuration from the specified path or search the config directory.
    ///
    /// A missing config file is not an error when searching; defaults are used.
    /// An explicitly requested file must exist.
    pub fn load(path: Option<&Utf8Path>, dirs: &ToolDirs) -> Result<Self> {
        let base = Self::defaults(dirs);

        let config_path = match path {
            Some(p) => p.to_owned(),
            None => match Self::find_config(dirs) {
                Some(p) => p,
                None => {
                    debug!("No config file in {}, using defaults", dirs.config_dir);
                    return Ok(base);
                }
            },
        };

        let content = fs::read_to_string(&config_path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::config_not_found(config_path.as_str())
            } else {
                Error::Io(e)
            }
        })?;

        let format = ConfigFormat::from_path(&config_path)?;
        debug!("Loading {} config from {}", format, config_path);

        let mut config = base.merge_overlay(format.parse(&content)?)?;
        config.config_file = Some(config_path);
        Ok(config)
    }

    /// Find the first existing config file in the config directory
    pub fn find_config(dirs: &ToolDirs) -> Option<Utf8PathBuf> {
        ["toml", "yaml", "yml", "json"]
            .iter()
            .map(|ext| dirs.config_dir.join(format!("{}.{}", TOOL_NAME, ext)))
            .find(|path| path.is_file())
    }

    /// Produce a new configuration with `overlay` recursively merged on top.
    ///
    /// The overlay wins on every key it sets; keys it omits keep their
    /// current values. `self` is left untouched.
    pub fn merge_overlay(&self, overlay: Value) -> Result<Self> {
        let Value::Object(overlay) = overlay else {
            return Err(Error::invalid_config("config overlay must be a table"));
        };

        let mut merged = match serde_json::to_value(self)? {
            Value::Object(map) => map,
            _ => return Err(Error::invalid_config("config did not serialize to a table")),
        };
        recursive_merge(&mut merged, &overlay);

        let mut config: Config = serde_json::from_value(Value::Object(merged))
            .map_err(|e| Error::invalid_config(e.to_string()))?;
        config.config_file = self.config_file.clone();
        Ok(config)
    }

    /// Apply command-line directory overrides
    pub fn with_overrides(
        mut self,
        source_dir: Option<Utf8PathBuf>,
        dest_dir: Option<Utf8PathBuf>,
    ) -> Self {
        if let Some(source_dir) = source_dir {
            self.source_dir = source_dir;
        }
        if let Some(dest_dir) = dest_dir {
            self.dest_dir = dest_dir;
        }
        self
    }
}
