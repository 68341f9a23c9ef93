//! Source repository acquisition
//!
//! Getting a source directory that is a git working tree either finds one
//! already there, initializes an empty repository, or clones the repository a
//! user referred to. Two interchangeable backends do the git work:
//!
//! - [`ExternalGit`] runs the configured `git` executable
//! - [`BuiltinGit`] uses libgit2 through `git2`
//!
//! # Example
//!
//! ```no_run
//! use camino::Utf8Path;
//! use dotkeep_init::git::{ensure_repository, ExternalGit};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = ExternalGit::new("git");
//! let acquisition = ensure_repository(
//!     Utf8Path::new("/home/alice/.local/share/dotkeep"),
//!     Some("alice"),
//!     1,
//!     &backend,
//! )
//! .await?;
//! println!("{acquisition}");
//! # Ok(())
//! # }
//! ```

mod builtin;
mod external;

pub use builtin::BuiltinGit;
pub use external::ExternalGit;

use crate::error::Result;
use crate::guess::guess_repo_url;
use async_trait::async_trait;
use camino::Utf8Path;
use dotkeep_core::{Config, UseBuiltinGit};
use std::fmt;
use std::io::ErrorKind;
use tracing::{debug, info};

/// Git operations needed to acquire a source repository
#[async_trait]
pub trait GitBackend: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Initialize an empty non-bare repository in the existing directory `path`
    async fn init_repository(&self, path: &Utf8Path) -> Result<()>;

    /// Clone `url` into `path`.
    ///
    /// A `depth` of zero fetches full history; any other value fetches that
    /// many commits.
    async fn clone_repository(
        &self,
        path: &Utf8Path,
        url: &str,
        depth: u32,
        recurse_submodules: bool,
    ) -> Result<()>;
}

/// How the source repository came to exist
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acquisition {
    /// `.git` was already there; nothing was done
    AlreadyPresent,
    /// A new empty repository was created
    Initialized,
    /// The repository was cloned from `url`
    Cloned { url: String },
}

impl fmt::Display for Acquisition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyPresent => f.write_str("source repository already present"),
            Self::Initialized => f.write_str("initialized empty source repository"),
            Self::Cloned { url } => write!(f, "cloned {url}"),
        }
    }
}

/// Make sure `source_dir` holds a git repository.
///
/// An existing `.git` entry wins over `repo_ref`. Otherwise, with no
/// reference an empty repository is initialized; with one, the reference is
/// expanded with [`guess_repo_url`] and cloned, submodules included.
pub async fn ensure_repository(
    source_dir: &Utf8Path,
    repo_ref: Option<&str>,
    depth: u32,
    backend: &dyn GitBackend,
) -> Result<Acquisition> {
    let git_dir = source_dir.join(".git");
    match tokio::fs::symlink_metadata(&git_dir).await {
        Ok(_) => {
            debug!("{} exists, skipping repository acquisition", git_dir);
            return Ok(Acquisition::AlreadyPresent);
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    match repo_ref {
        None => {
            info!("Initializing empty repository in {}", source_dir);
            tokio::fs::create_dir_all(source_dir).await?;
            backend.init_repository(source_dir).await?;
            Ok(Acquisition::Initialized)
        }
        Some(repo_ref) => {
            let url = guess_repo_url(repo_ref);
            info!("Cloning {} into {}", url, source_dir);
            backend
                .clone_repository(source_dir, &url, depth, true)
                .await?;
            Ok(Acquisition::Cloned { url })
        }
    }
}

/// Whether the built-in backend should be used for `setting`
pub fn use_builtin_git(setting: UseBuiltinGit, git_command: &str) -> bool {
    match setting {
        UseBuiltinGit::Always => true,
        UseBuiltinGit::Never => false,
        UseBuiltinGit::Auto => which::which(git_command).is_err(),
    }
}

/// Pick the git backend for this run from configuration
pub fn select_backend(config: &Config) -> Box<dyn GitBackend> {
    let backend: Box<dyn GitBackend> = if use_builtin_git(config.use_builtin_git, &config.git.command)
    {
        Box::new(BuiltinGit::new())
    } else {
        Box::new(ExternalGit::new(&config.git.command))
    };
    debug!("Using {} git backend", backend.name());
    backend
}
