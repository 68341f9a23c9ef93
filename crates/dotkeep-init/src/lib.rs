//! # dotkeep-init
//!
//! First-run bootstrap for dotkeep:
//! - Repository shorthand expansion (`alice` -> `https://github.com/alice/dotfiles.git`)
//! - Source repository acquisition with an external or built-in git backend
//! - Config file rendering from `.dotkeep.<ext>.tmpl` with interactive prompts
//! - The `init` workflow tying these to apply and purge
//!
//! # Example
//!
//! ```no_run
//! use dotkeep_init::{guess_repo_url, InitOptions};
//!
//! assert_eq!(guess_repo_url("alice/dots"), "https://github.com/alice/dots.git");
//!
//! let plan = InitOptions { one_shot: true, ..Default::default() }.normalize(false);
//! assert!(plan.apply() && plan.purge() && plan.force());
//! assert_eq!(plan.depth(), 1);
//! ```

pub mod error;
pub mod git;
pub mod guess;
pub mod prompt;
pub mod templates;
pub mod workflow;

pub use error::{Error, Result};
pub use git::{ensure_repository, select_backend, Acquisition, BuiltinGit, ExternalGit, GitBackend};
pub use guess::guess_repo_url;
pub use prompt::{PromptError, Prompter};
pub use templates::{ConfigBootstrapper, RenderedConfig, TemplateFunctions};
pub use workflow::{
    Applier, ApplyRequest, Collaborators, EntryTypeSet, InitOptions, InitPlan, InitReport,
    InitWorkflow, PreApplyHook, PurgeRequest, Purger,
};
