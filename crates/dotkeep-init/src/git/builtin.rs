//! Git backend built on libgit2

use super::GitBackend;
use crate::error::{Error, Result};
use async_trait::async_trait;
use camino::Utf8Path;
use git2::build::RepoBuilder;
use git2::{Cred, CredentialType, FetchOptions, RemoteCallbacks, Repository};
use tracing::debug;

/// Runs git operations in-process with `git2`
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinGit;

impl BuiltinGit {
    pub fn new() -> Self {
        Self
    }
}

/// Credential attempts before libgit2 is told to give up
const MAX_CREDENTIAL_ATTEMPTS: usize = 3;

/// Credentials from the ssh agent, then from git's credential helpers
fn remote_callbacks<'cb>() -> RemoteCallbacks<'cb> {
    let config = git2::Config::open_default().ok();
    let mut attempts = 0;

    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(move |url, username_from_url, allowed| {
        attempts += 1;
        if attempts > MAX_CREDENTIAL_ATTEMPTS {
            return Err(git2::Error::from_str("authentication failed"));
        }

        if allowed.contains(CredentialType::SSH_KEY) {
            return Cred::ssh_key_from_agent(username_from_url.unwrap_or("git"));
        }
        if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) {
            if let Some(config) = &config {
                return Cred::credential_helper(config, url, username_from_url);
            }
        }
        if allowed.contains(CredentialType::USERNAME) {
            return Cred::username(username_from_url.unwrap_or("git"));
        }
        Cred::default()
    });
    callbacks
}

/// Initialize and check out every submodule of `repo`, recursively
fn update_submodules(repo: &Repository) -> std::result::Result<(), git2::Error> {
    for mut submodule in repo.submodules()? {
        debug!("Updating submodule {}", submodule.path().display());
        submodule.update(true, None)?;
        let nested = submodule.open()?;
        update_submodules(&nested)?;
    }
    Ok(())
}

#[async_trait]
impl GitBackend for BuiltinGit {
    fn name(&self) -> &'static str {
        "builtin"
    }

    async fn init_repository(&self, path: &Utf8Path) -> Result<()> {
        let path = path.to_owned();
        tokio::task::spawn_blocking(move || Repository::init(&path).map(|_| ())).await??;
        Ok(())
    }

    async fn clone_repository(
        &self,
        path: &Utf8Path,
        url: &str,
        depth: u32,
        recurse_submodules: bool,
    ) -> Result<()> {
        let path = path.to_owned();
        let url = url.to_string();

        tokio::task::spawn_blocking(move || {
            let mut fetch_options = FetchOptions::new();
            fetch_options.remote_callbacks(remote_callbacks());
            if depth > 0 {
                let depth = i32::try_from(depth).unwrap_or(i32::MAX);
                fetch_options.depth(depth);
            }

            let repo = RepoBuilder::new()
                .fetch_options(fetch_options)
                .clone(&url, path.as_std_path())
                .map_err(|e| Error::clone_failed(&url, e.message()))?;

            if recurse_submodules {
                update_submodules(&repo)?;
            }
            Ok::<_, Error>(())
        })
        .await?
    }
}
