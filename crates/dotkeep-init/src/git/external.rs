//! Git backend that runs the `git` executable

use super::GitBackend;
use crate::error::{Error, Result};
use async_trait::async_trait;
use camino::Utf8Path;
use std::io::ErrorKind;
use std::process::Output;
use tokio::process::Command;
use tracing::debug;

/// Runs git subcommands through the configured executable
#[derive(Debug, Clone)]
pub struct ExternalGit {
    command: String,
}

impl ExternalGit {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// Arguments for a clone of `url` into `path`
    pub fn clone_args(path: &Utf8Path, url: &str, depth: u32, recurse_submodules: bool) -> Vec<String> {
        let mut args = vec!["clone".to_string()];
        if recurse_submodules {
            args.push("--recurse-submodules".to_string());
        }
        if depth > 0 {
            args.push("--depth".to_string());
            args.push(depth.to_string());
        }
        args.push(url.to_string());
        args.push(path.to_string());
        args
    }

    async fn run(&self, cmd: &mut Command) -> Result<Output> {
        cmd.output().await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                Error::git_not_found(&self.command)
            } else {
                Error::Io(e)
            }
        })
    }
}

#[async_trait]
impl GitBackend for ExternalGit {
    fn name(&self) -> &'static str {
        "external"
    }

    async fn init_repository(&self, path: &Utf8Path) -> Result<()> {
        debug!("Running: {} init in {}", self.command, path);
        let output = self
            .run(Command::new(&self.command).current_dir(path).arg("init"))
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::git_operation(format!(
                "git init failed: {}",
                stderr.trim()
            )));
        }

        Ok(())
    }

    async fn clone_repository(
        &self,
        path: &Utf8Path,
        url: &str,
        depth: u32,
        recurse_submodules: bool,
    ) -> Result<()> {
        let args = Self::clone_args(path, url, depth, recurse_submodules);
        debug!("Running: {} {}", self.command, args.join(" "));
        let output = self.run(Command::new(&self.command).args(&args)).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::clone_failed(url, stderr.trim()));
        }

        Ok(())
    }
}
