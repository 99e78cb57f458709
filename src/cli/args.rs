//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

use crate::domain::IdPolicy;

/// Inspect gate trees described in TOML: render, list ids, export
#[derive(Parser, Debug)]
#[command(name = "gatetree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d, -d -d, -d -d -d)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Extra config file, applied after the global one
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Path separator (overrides config)
    #[arg(long, global = true)]
    pub separator: Option<String>,

    /// Id assignment policy: scan or counter (overrides config)
    #[arg(long, global = true)]
    pub id_policy: Option<IdPolicy>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render a tree description
    Render {
        /// Tree description (TOML)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Show node names only
        #[arg(short, long)]
        names: bool,
    },

    /// List node ids with their paths, pre-order
    Ids {
        /// Tree description (TOML)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Import and re-export as normalised TOML with ids
    Export {
        /// Tree description (TOML)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective settings
    Show,
    /// Show global config file location
    Path,
}
