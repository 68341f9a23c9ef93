//! Temporary directory layout for bootstrap tests

#![allow(dead_code)]

use camino::{Utf8Path, Utf8PathBuf};
use dotkeep_core::state::{PersistentState, CONFIG_STATE_BUCKET, CONFIG_STATE_KEY};
use dotkeep_core::{Config, ToolDirs};
use dotkeep_init::templates::FINGERPRINT_FIELD;
use dotkeep_init::Prompter;
use std::io::{self, Cursor};
use std::sync::Arc;
use tempfile::TempDir;

/// Home, config and data directories under one temporary root
pub struct TestEnv {
    _temp: TempDir,
    pub root: Utf8PathBuf,
    pub dirs: ToolDirs,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("temp path is UTF-8");
        let home = root.join("home");
        std::fs::create_dir_all(&home).unwrap();
        let dirs = ToolDirs::from_parts(
            home.clone(),
            &home.join(".config"),
            &home.join(".local/share"),
        );

        Self {
            _temp: temp,
            root,
            dirs,
        }
    }

    pub fn config(&self) -> Config {
        Config::defaults(&self.dirs)
    }

    pub fn source_dir(&self) -> Utf8PathBuf {
        self.dirs.default_source_dir()
    }

    pub fn config_dir(&self) -> &Utf8Path {
        &self.dirs.config_dir
    }

    /// Create the source directory as an existing repository
    pub fn init_source(&self) -> Utf8PathBuf {
        let source = self.source_dir();
        std::fs::create_dir_all(source.join(".git")).unwrap();
        source
    }

    /// Write a file into the source directory
    pub fn write_source(&self, relative: &str, contents: &str) {
        let path = self.source_dir().join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }
}

/// Non-interactive prompter answering from `input`
pub fn scripted_prompter(input: &str) -> Arc<Prompter> {
    Arc::new(Prompter::new(Cursor::new(input.to_string()), io::sink(), false))
}

/// Stored config template fingerprint, if any
pub fn stored_fingerprint(state: &dyn PersistentState) -> Option<String> {
    state
        .get(CONFIG_STATE_BUCKET, CONFIG_STATE_KEY)
        .unwrap()
        .and_then(|value| value[FINGERPRINT_FIELD].as_str().map(str::to_string))
}
