//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// dotkeep - keep your dotfiles in one source directory
#[derive(Parser, Debug)]
#[command(name = "dotkeep")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the dotkeep config file
    #[arg(short, long, global = true)]
    pub config: Option<Utf8PathBuf>,

    /// Source directory
    #[arg(short = 'S', long = "source", global = true)]
    pub source: Option<Utf8PathBuf>,

    /// Destination directory
    #[arg(short = 'D', long = "destination", global = true)]
    pub destination: Option<Utf8PathBuf>,

    /// Make all changes without asking
    #[arg(long, global = true)]
    pub force: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Set up the source directory and update the destination directory to match
    Init(InitArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Repository to clone, e.g. `alice`, `alice/dots` or a full URL
    pub repo: Option<String>,

    /// Update the destination directory
    #[arg(short, long)]
    pub apply: bool,

    /// Create a shallow clone with this many commits (0 = full history)
    #[arg(short, long, default_value_t = 0)]
    pub depth: u32,

    /// Clone shallowly, apply, then purge config and source directories
    #[arg(long)]
    pub one_shot: bool,

    /// Purge config and source directories after running
    #[arg(short, long)]
    pub purge: bool,

    /// Also purge the dotkeep binary
    #[arg(short = 'P', long)]
    pub purge_binary: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
