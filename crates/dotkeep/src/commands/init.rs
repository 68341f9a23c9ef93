//! Init command

use anyhow::{Context, Result};
use dotkeep_core::{Config, JsonFileState, ToolDirs};
use dotkeep_init::{
    select_backend, Acquisition, Collaborators, InitOptions, InitReport, InitWorkflow, Prompter,
};
use std::sync::Arc;

use crate::apply::MirrorApplier;
use crate::cli::{Cli, InitArgs};
use crate::output;
use crate::purge::FsPurger;
use crate::version::VersionInfo;

impl From<&InitArgs> for InitOptions {
    fn from(args: &InitArgs) -> Self {
        Self {
            apply: args.apply,
            depth: args.depth,
            one_shot: args.one_shot,
            purge: args.purge,
            purge_binary: args.purge_binary,
        }
    }
}

pub async fn run(args: &InitArgs, cli: &Cli) -> Result<()> {
    let plan = InitOptions::from(args).normalize(cli.force);

    let dirs = ToolDirs::discover()?;
    let config = Config::load(cli.config.as_deref(), &dirs)
        .context("Failed to load configuration")?
        .with_overrides(cli.source.clone(), cli.destination.clone());

    let backend = select_backend(&config);
    let state = JsonFileState::new(dirs.state_file());
    let applier = MirrorApplier::new();
    let prompter = Arc::new(Prompter::stdio());
    let mut purger = FsPurger::new(
        &dirs.config_dir,
        dirs.state_file(),
        &config.source_dir,
        Arc::clone(&prompter),
        plan.force(),
    );
    if plan.purge_binary() {
        purger = purger.with_binary(FsPurger::current_binary()?);
    }

    let collaborators = Collaborators {
        backend: backend.as_ref(),
        state: &state,
        applier: &applier,
        purger: &purger,
    };
    let workflow = InitWorkflow::new(
        config,
        &dirs.config_dir,
        prompter,
        collaborators,
    )
    .with_version(VersionInfo::current().template_version());

    let report = workflow.run(args.repo.as_deref(), &plan).await?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &InitReport) {
    match &report.acquisition {
        Acquisition::AlreadyPresent => output::info("Source directory already initialized"),
        Acquisition::Initialized => output::success("Initialized source directory"),
        Acquisition::Cloned { url } => output::success(&format!("Cloned {}", url)),
    }

    if let Some(rendered) = &report.rendered_config {
        output::success("Created config file");
        output::kv("path", rendered.path.as_str());
        output::kv("format", &rendered.format.to_string());
    }

    if report.applied {
        output::success("Applied source state to destination");
    }
    if report.purged {
        output::success("Purged config and source directories");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_from_args() {
        let args = InitArgs {
            repo: Some("alice".into()),
            apply: true,
            depth: 4,
            one_shot: false,
            purge: true,
            purge_binary: false,
        };

        assert_eq!(
            InitOptions::from(&args),
            InitOptions {
                apply: true,
                depth: 4,
                one_shot: false,
                purge: true,
                purge_binary: false,
            }
        );
    }
}
