//! The `init` workflow
//!
//! ```text
//! InitOptions --normalize--> InitPlan
//!   -> acquire repository
//!   -> bootstrap config template
//!   -> reload config        (only if a config was rendered)
//!   -> apply                (only if plan.apply)
//!   -> purge                (only if plan.purge)
//! ```
//!
//! Every step runs to completion before the next one starts and the first
//! failure ends the run. Nothing is rolled back.

use crate::error::{Error, Result};
use crate::git::{ensure_repository, Acquisition, GitBackend};
use crate::prompt::Prompter;
use crate::templates::{template_data, ConfigBootstrapper, RenderedConfig, TemplateFunctions};
use camino::{Utf8Path, Utf8PathBuf};
use dotkeep_core::{Config, PersistentState};
use std::sync::Arc;
use tracing::{debug, info};

/// Options as given on the command line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InitOptions {
    pub apply: bool,
    /// Clone depth, zero for full history
    pub depth: u32,
    /// Shorthand for `apply`, `purge`, `force` and a depth of one
    pub one_shot: bool,
    pub purge: bool,
    pub purge_binary: bool,
}

impl InitOptions {
    /// Resolve the options into the plan a run executes
    pub fn normalize(self, force: bool) -> InitPlan {
        if self.one_shot {
            InitPlan {
                apply: true,
                depth: 1,
                purge: true,
                purge_binary: self.purge_binary,
                force: true,
            }
        } else {
            InitPlan {
                apply: self.apply,
                depth: self.depth,
                purge: self.purge,
                purge_binary: self.purge_binary,
                force,
            }
        }
    }
}

/// Resolved, read-only parameters of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitPlan {
    apply: bool,
    depth: u32,
    purge: bool,
    purge_binary: bool,
    force: bool,
}

impl InitPlan {
    pub fn apply(&self) -> bool {
        self.apply
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn purge(&self) -> bool {
        self.purge
    }

    pub fn purge_binary(&self) -> bool {
        self.purge_binary
    }

    pub fn force(&self) -> bool {
        self.force
    }
}

/// Kinds of entries an apply may touch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryTypeSet {
    pub dirs: bool,
    pub files: bool,
    pub symlinks: bool,
}

impl EntryTypeSet {
    pub const fn all() -> Self {
        Self {
            dirs: true,
            files: true,
            symlinks: true,
        }
    }
}

impl Default for EntryTypeSet {
    fn default() -> Self {
        Self::all()
    }
}

/// What an apply should do
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyRequest {
    pub dest_root: Utf8PathBuf,
    /// Target paths relative to `dest_root`; empty means everything
    pub targets: Vec<Utf8PathBuf>,
    pub include: EntryTypeSet,
    pub recursive: bool,
    pub umask: u32,
}

impl ApplyRequest {
    /// Apply everything under the configured destination
    pub fn everything(config: &Config) -> Self {
        Self {
            dest_root: config.dest_dir.clone(),
            targets: Vec::new(),
            include: EntryTypeSet::all(),
            recursive: false,
            umask: config.umask,
        }
    }
}

/// Called with a target path before its existing contents are replaced.
/// `Ok(false)` skips the target.
pub type PreApplyHook<'a> = dyn Fn(&Utf8Path) -> anyhow::Result<bool> + Send + Sync + 'a;

/// Hook that proceeds when `force` is set and otherwise asks the user
pub fn default_pre_apply_hook(force: bool, prompter: Arc<Prompter>) -> Box<PreApplyHook<'static>> {
    Box::new(move |path: &Utf8Path| {
        if force {
            return Ok(true);
        }
        let overwrite = prompter.prompt_bool(&format!("{path} has changed, overwrite"))?;
        Ok(overwrite)
    })
}

/// Brings the destination in line with the source directory
pub trait Applier: Send + Sync {
    fn apply(
        &self,
        config: &Config,
        request: &ApplyRequest,
        pre_apply: &PreApplyHook<'_>,
    ) -> anyhow::Result<()>;
}

/// What a purge should remove besides the tool's own directories
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeRequest {
    pub remove_binary: bool,
}

/// Removes the tool's configuration, state and source directory
pub trait Purger: Send + Sync {
    fn purge(&self, request: &PurgeRequest) -> anyhow::Result<()>;
}

/// Collaborators an [`InitWorkflow`] delegates to
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub backend: &'a dyn GitBackend,
    pub state: &'a dyn PersistentState,
    pub applier: &'a dyn Applier,
    pub purger: &'a dyn Purger,
}

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitReport {
    pub acquisition: Acquisition,
    pub rendered_config: Option<RenderedConfig>,
    pub applied: bool,
    pub purged: bool,
}

/// Drives one `init` run
pub struct InitWorkflow<'a> {
    config: Config,
    config_dir: Utf8PathBuf,
    version: String,
    prompter: Arc<Prompter>,
    collaborators: Collaborators<'a>,
}

impl<'a> InitWorkflow<'a> {
    pub fn new(
        config: Config,
        config_dir: impl Into<Utf8PathBuf>,
        prompter: Arc<Prompter>,
        collaborators: Collaborators<'a>,
    ) -> Self {
        Self {
            config,
            config_dir: config_dir.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            prompter,
            collaborators,
        }
    }

    /// Version string exposed to templates as `dotkeep.version`
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Configuration the run starts from
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Execute `plan`, cloning `repo_ref` when there is no repository yet
    pub async fn run(&self, repo_ref: Option<&str>, plan: &InitPlan) -> Result<InitReport> {
        debug!("Running init with {:?}", plan);
        let source_dir = &self.config.source_dir;

        let acquisition = ensure_repository(
            source_dir,
            repo_ref,
            plan.depth(),
            self.collaborators.backend,
        )
        .await?;
        info!("{}", acquisition);

        let rendered_config = self.bootstrap_config()?;

        let config = match &rendered_config {
            Some(rendered) => {
                debug!("Reloading configuration from {}", rendered.path);
                let overlay = rendered.format.parse(&rendered.contents)?;
                let mut config = self.config.merge_overlay(overlay)?;
                config.config_file = Some(rendered.path.clone());
                config
            }
            None => self.config.clone(),
        };

        if plan.apply() {
            info!("Applying {} to {}", config.source_dir, config.dest_dir);
            let request = ApplyRequest::everything(&config);
            let hook = default_pre_apply_hook(plan.force(), Arc::clone(&self.prompter));
            self.collaborators
                .applier
                .apply(&config, &request, &*hook)
                .map_err(Error::Apply)?;
        }

        if plan.purge() {
            let request = PurgeRequest {
                remove_binary: plan.purge_binary() && !cfg!(windows),
            };
            info!("Purging (remove binary: {})", request.remove_binary);
            self.collaborators
                .purger
                .purge(&request)
                .map_err(Error::Purge)?;
        }

        Ok(InitReport {
            acquisition,
            rendered_config,
            applied: plan.apply(),
            purged: plan.purge(),
        })
    }

    fn bootstrap_config(&self) -> Result<Option<RenderedConfig>> {
        let source_dir = &self.config.source_dir;
        let functions = TemplateFunctions::standard(source_dir, Arc::clone(&self.prompter));
        let data = template_data(&self.config, &self.config_dir, &self.version);

        ConfigBootstrapper::new(
            self.config_dir.clone(),
            self.collaborators.state,
            functions,
            data,
        )
        .bootstrap(source_dir)
    }
}
