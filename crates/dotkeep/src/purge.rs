//! Filesystem purger

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use dotkeep_init::{Prompter, PurgeRequest, Purger};
use std::fs;
use std::sync::Arc;
use tracing::{debug, info};

/// Removes dotkeep's config directory, state file and source directory
#[derive(Clone)]
pub struct FsPurger {
    paths: Vec<Utf8PathBuf>,
    binary: Option<Utf8PathBuf>,
    prompter: Arc<Prompter>,
    force: bool,
}

impl FsPurger {
    pub fn new(
        config_dir: impl Into<Utf8PathBuf>,
        state_file: impl Into<Utf8PathBuf>,
        source_dir: impl Into<Utf8PathBuf>,
        prompter: Arc<Prompter>,
        force: bool,
    ) -> Self {
        Self {
            paths: vec![config_dir.into(), state_file.into(), source_dir.into()],
            binary: None,
            prompter,
            force,
        }
    }

    /// Path removed when a purge request includes the binary
    pub fn with_binary(mut self, binary: impl Into<Utf8PathBuf>) -> Self {
        self.binary = Some(binary.into());
        self
    }

    /// The running executable, if its path is valid UTF-8
    pub fn current_binary() -> Result<Utf8PathBuf> {
        let exe = std::env::current_exe().context("Failed to locate the dotkeep binary")?;
        Utf8PathBuf::try_from(exe).context("dotkeep binary path is not valid UTF-8")
    }

    /// Paths a purge would consider, in removal order
    pub fn targets(&self, request: &PurgeRequest) -> Vec<&Utf8Path> {
        let mut targets: Vec<&Utf8Path> = self.paths.iter().map(Utf8PathBuf::as_path).collect();
        if request.remove_binary {
            if let Some(binary) = &self.binary {
                targets.push(binary);
            }
        }
        targets
    }

    fn confirm(&self, path: &Utf8Path) -> Result<bool> {
        if self.force {
            return Ok(true);
        }
        let confirmed = self.prompter.prompt_bool(&format!("Remove {}", path))?;
        Ok(confirmed)
    }
}

fn remove(path: &Utf8Path) -> Result<()> {
    let metadata =
        fs::symlink_metadata(path).with_context(|| format!("Failed to inspect {}", path))?;
    let result = if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    result.with_context(|| format!("Failed to remove {}", path))
}

impl Purger for FsPurger {
    fn purge(&self, request: &PurgeRequest) -> anyhow::Result<()> {
        for path in self.targets(request) {
            if fs::symlink_metadata(path).is_err() {
                debug!("{} does not exist, skipping", path);
                continue;
            }
            if !self.confirm(path)? {
                debug!("Keeping {}", path);
                continue;
            }
            info!("Removing {}", path);
            remove(path)?;
        }
        Ok(())
    }
}
