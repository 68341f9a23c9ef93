//! Configuration management
//!
//! The config file lives in the tool's config directory as `dotkeep.toml`,
//! `dotkeep.yaml` or `dotkeep.json`. Loading always starts from built-in
//! defaults and merges the file on top, so a partial file is valid.

mod format;
mod loader;

pub use format::ConfigFormat;
pub use loader::{Config, GitConfig, UseBuiltinGit, DEFAULT_GIT_COMMAND, DEFAULT_UMASK};
