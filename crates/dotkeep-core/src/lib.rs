//! # dotkeep-core
//!
//! Core library for dotkeep providing:
//! - Configuration file loading and merging (`dotkeep.toml` / `.yaml` / `.json`)
//! - Per-user tool directories
//! - Bucketed persistent state
//! - Shared helpers such as recursive map merging

pub mod config;
pub mod error;
pub mod paths;
pub mod state;
pub mod utils;

pub use config::{Config, ConfigFormat, UseBuiltinGit};
pub use error::{Error, Result};
pub use paths::ToolDirs;
pub use state::{JsonFileState, PersistentState};
pub use utils::{get_home_dir, recursive_merge};
