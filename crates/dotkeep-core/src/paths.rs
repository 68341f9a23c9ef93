//! Well-known directories used by dotkeep
//!
//! Follows the XDG base directory layout on every platform:
//! 1. `$XDG_CONFIG_HOME/dotkeep` (else `~/.config/dotkeep`) for the config file and state
//! 2. `$XDG_DATA_HOME/dotkeep` (else `~/.local/share/dotkeep`) for the default source directory

use crate::error::Result;
use crate::utils::get_home_dir;
use camino::{Utf8Path, Utf8PathBuf};

/// Name used for every per-tool directory
pub const TOOL_NAME: &str = "dotkeep";

/// File name of the persistent state document inside the config directory
pub const STATE_FILE_NAME: &str = "dotkeepstate.json";

/// Resolved per-user directories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDirs {
    /// User home directory (default destination)
    pub home_dir: Utf8PathBuf,
    /// Directory holding the config file and the persistent state
    pub config_dir: Utf8PathBuf,
    /// Directory holding the default source directory
    pub data_dir: Utf8PathBuf,
}

impl ToolDirs {
    /// Discover directories from the environment
    pub fn discover() -> Result<Self> {
        let home_dir = get_home_dir()?;
        let config_home = xdg_dir("XDG_CONFIG_HOME").unwrap_or_else(|| home_dir.join(".config"));
        let data_home =
            xdg_dir("XDG_DATA_HOME").unwrap_or_else(|| home_dir.join(".local").join("share"));

        Ok(Self::from_parts(home_dir, &config_home, &data_home))
    }

    /// Build directories from explicit base directories
    pub fn from_parts(home_dir: Utf8PathBuf, config_home: &Utf8Path, data_home: &Utf8Path) -> Self {
        Self {
            home_dir,
            config_dir: config_home.join(TOOL_NAME),
            data_dir: data_home.join(TOOL_NAME),
        }
    }

    /// Default source directory
    pub fn default_source_dir(&self) -> Utf8PathBuf {
        self.data_dir.clone()
    }

    /// Path of the persistent state file
    pub fn state_file(&self) -> Utf8PathBuf {
        self.config_dir.join(STATE_FILE_NAME)
    }
}

/// Read an absolute XDG base directory from the environment.
///
/// Relative values are ignored as the XDG specification requires.
fn xdg_dir(var: &str) -> Option<Utf8PathBuf> {
    let value = std::env::var(var).ok()?;
    let path = Utf8PathBuf::from(value);
    path.is_absolute().then_some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_from_parts() {
        let dirs = ToolDirs::from_parts(
            Utf8PathBuf::from("/home/alice"),
            Utf8Path::new("/home/alice/.config"),
            Utf8Path::new("/home/alice/.local/share"),
        );

        assert_eq!(dirs.config_dir, "/home/alice/.config/dotkeep");
        assert_eq!(dirs.data_dir, "/home/alice/.local/share/dotkeep");
        assert_eq!(dirs.default_source_dir(), "/home/alice/.local/share/dotkeep");
        assert_eq!(
            dirs.state_file(),
            "/home/alice/.config/dotkeep/dotkeepstate.json"
        );
    }

    #[test]
    #[serial]
    fn test_discover_honors_xdg() {
        let temp = tempfile::TempDir::new().unwrap();
        let base = Utf8PathBuf::try_from(temp.path().to_path_buf()).unwrap();
        let old_config = std::env::var_os("XDG_CONFIG_HOME");
        let old_data = std::env::var_os("XDG_DATA_HOME");

        std::env::set_var("XDG_CONFIG_HOME", base.join("cfg"));
        std::env::set_var("XDG_DATA_HOME", "relative/ignored");
        let dirs = ToolDirs::discover().unwrap();

        match old_config {
            Some(v) => std::env::set_var("XDG_CONFIG_HOME", v),
            None => std::env::remove_var("XDG_CONFIG_HOME"),
        }
        match old_data {
            Some(v) => std::env::set_var("XDG_DATA_HOME", v),
            None => std::env::remove_var("XDG_DATA_HOME"),
        }

        assert_eq!(dirs.config_dir, base.join("cfg").join("dotkeep"));
        assert_eq!(
            dirs.data_dir,
            dirs.home_dir.join(".local").join("share").join("dotkeep")
        );
    }
}
