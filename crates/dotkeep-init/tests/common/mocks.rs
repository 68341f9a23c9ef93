//! Mock collaborators that record what they were asked to do

#![allow(dead_code)]

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use dotkeep_core::{Config, PersistentState};
use dotkeep_init::{Applier, ApplyRequest, GitBackend, PreApplyHook, PurgeRequest, Purger};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A recorded git backend call
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GitCall {
    Init {
        path: Utf8PathBuf,
    },
    Clone {
        path: Utf8PathBuf,
        url: String,
        depth: u32,
        recurse_submodules: bool,
    },
}

/// Git backend that creates `.git` plus seeded files instead of running git
#[derive(Default)]
pub struct MockGitBackend {
    calls: Arc<Mutex<Vec<GitCall>>>,
    /// Files written into the working tree on clone, relative path -> contents
    clone_files: Vec<(String, String)>,
    fail_with: Option<String>,
}

impl MockGitBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file that appears in the working tree after a clone
    pub fn with_clone_file(mut self, path: &str, contents: &str) -> Self {
        self.clone_files
            .push((path.to_string(), contents.to_string()));
        self
    }

    /// Make every operation fail with `message`
    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<GitCall> {
        self.calls.lock().unwrap().clone()
    }

    fn check_failure(&self) -> dotkeep_init::Result<()> {
        match &self.fail_with {
            Some(message) => Err(dotkeep_init::Error::git_operation(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl GitBackend for MockGitBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn init_repository(&self, path: &Utf8Path) -> dotkeep_init::Result<()> {
        self.calls.lock().unwrap().push(GitCall::Init {
            path: path.to_owned(),
        });
        self.check_failure()?;
        std::fs::create_dir_all(path.join(".git"))?;
        Ok(())
    }

    async fn clone_repository(
        &self,
        path: &Utf8Path,
        url: &str,
        depth: u32,
        recurse_submodules: bool,
    ) -> dotkeep_init::Result<()> {
        self.calls.lock().unwrap().push(GitCall::Clone {
            path: path.to_owned(),
            url: url.to_string(),
            depth,
            recurse_submodules,
        });
        self.check_failure()?;
        std::fs::create_dir_all(path.join(".git"))?;
        for (relative, contents) in &self.clone_files {
            std::fs::write(path.join(relative), contents)?;
        }
        Ok(())
    }
}

/// A recorded apply call
#[derive(Clone, Debug)]
pub struct ApplyCall {
    pub config: Config,
    pub request: ApplyRequest,
    /// Result of calling the pre-apply hook once with a probe path
    pub hook_result: Option<bool>,
}

/// Applier that records calls and optionally fails
#[derive(Default)]
pub struct MockApplier {
    calls: Mutex<Vec<ApplyCall>>,
    probe_hook: bool,
    fail_with: Option<String>,
}

impl MockApplier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call the pre-apply hook once per apply and record its answer
    pub fn probing_hook() -> Self {
        Self {
            probe_hook: true,
            ..Self::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<ApplyCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl Applier for MockApplier {
    fn apply(
        &self,
        config: &Config,
        request: &ApplyRequest,
        pre_apply: &PreApplyHook<'_>,
    ) -> anyhow::Result<()> {
        let hook_result = if self.probe_hook {
            Some(pre_apply(Utf8Path::new(".bashrc"))?)
        } else {
            None
        };
        self.calls.lock().unwrap().push(ApplyCall {
            config: config.clone(),
            request: request.clone(),
            hook_result,
        });
        match &self.fail_with {
            Some(message) => Err(anyhow::anyhow!("{}", message)),
            None => Ok(()),
        }
    }
}

/// Purger that records requests
#[derive(Default)]
pub struct MockPurger {
    calls: Mutex<Vec<PurgeRequest>>,
    fail_with: Option<String>,
}

impl MockPurger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<PurgeRequest> {
        self.calls.lock().unwrap().clone()
    }
}

impl Purger for MockPurger {
    fn purge(&self, request: &PurgeRequest) -> anyhow::Result<()> {
        self.calls.lock().unwrap().push(*request);
        match &self.fail_with {
            Some(message) => Err(anyhow::anyhow!("{}", message)),
            None => Ok(()),
        }
    }
}

/// In-memory persistent state
#[derive(Default)]
pub struct MemoryState {
    values: Mutex<HashMap<(String, String), Value>>,
}

impl MemoryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(self, bucket: &str, key: &str, value: Value) -> Self {
        self.values
            .lock()
            .unwrap()
            .insert((bucket.to_string(), key.to_string()), value);
        self
    }
}

impl PersistentState for MemoryState {
    fn get(&self, bucket: &str, key: &str) -> dotkeep_core::Result<Option<Value>> {
        Ok(self
            .values
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned())
    }

    fn set(&self, bucket: &str, key: &str, value: Value) -> dotkeep_core::Result<()> {
        self.values
            .lock()
            .unwrap()
            .insert((bucket.to_string(), key.to_string()), value);
        Ok(())
    }

    fn delete(&self, bucket: &str, key: &str) -> dotkeep_core::Result<()> {
        self.values
            .lock()
            .unwrap()
            .remove(&(bucket.to_string(), key.to_string()));
        Ok(())
    }
}
