use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "filefactory")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Create and verify declarative filesystem fixtures", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Materialize a manifest under a root directory
    Create(TreeArgs),

    /// Check a directory tree against a manifest
    Verify(TreeArgs),

    /// Print the declarations a manifest resolves to
    Show(ShowArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
pub struct TreeArgs {
    /// Path to the TOML manifest
    pub manifest: PathBuf,

    /// Directory the manifest paths are relative to
    #[arg(short, long, env = "FILEFACTORY_ROOT")]
    pub root: String,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Path to the TOML manifest
    pub manifest: PathBuf,

    /// Show the declarations as `verify` would build them
    #[arg(long)]
    pub expected: bool,
}
