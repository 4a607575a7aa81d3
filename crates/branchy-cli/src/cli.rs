use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "branchy")]
#[command(about = "Browse and manage the branches of a git repository", long_about = None)]
#[command(
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BRANCHY_COMMIT_HASH"), ")")
)]
pub struct Cli {
    /// Repository to operate on (defaults to the current directory)
    #[arg(long, value_name = "PATH", env = "BRANCHY_REPO", global = true)]
    pub repo: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(flatten)]
    Branch(BranchAction),
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum BranchAction {
    /// List local branches
    List,
    /// Create a branch
    Create {
        #[arg(long)]
        name: String,
        /// Start point (defaults to `default_base` from the config, then HEAD)
        #[arg(long)]
        base: Option<String>,
    },
    /// Delete a branch
    Delete {
        #[arg(long)]
        name: String,
        /// Delete even if not fully merged
        #[arg(long)]
        force: bool,
    },
    /// Rename a branch
    Rename {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },
    /// Check out a branch
    Checkout {
        #[arg(long)]
        name: String,
    },
}
