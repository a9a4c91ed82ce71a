use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::config::Overrides;

/// Command-line client for the Asana REST API
///
/// Every command prints JSON to stdout. Failures print an error envelope
/// and exit with a code that identifies the error class.
#[derive(Parser, Debug)]
#[command(name = "asana")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the JSON config file (default: ~/.config/asana-cli/config.json)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Workspace GID (overrides the config file and `ASANA_WORKSPACE`)
    #[arg(short, long, global = true, value_name = "GID")]
    pub workspace: Option<String>,

    /// Trace HTTP traffic to stderr with the token redacted
    #[arg(long, global = true)]
    pub debug: bool,

    /// Per-request timeout, e.g. 10s or 1m
    #[arg(long, global = true, value_name = "DURATION", value_parser = humantime::parse_duration)]
    pub timeout: Option<Duration>,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    #[must_use]
    pub fn overrides(&self) -> Overrides {
        Overrides {
            config_path: self.config.clone(),
            workspace: self.workspace.clone(),
            debug: self.debug,
            timeout: self.timeout,
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the authenticated user
    Me,
    /// Workspace operations
    Workspace {
        #[command(subcommand)]
        command: WorkspaceCommand,
    },
    /// Task operations
    Task {
        #[command(subcommand)]
        command: TaskCommand,
    },
    /// Inspect the CLI configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Print the CLI version
    Version,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceCommand {
    /// List workspaces visible to the token
    List {
        /// Max results to return (1-100)
        #[arg(long, default_value_t = 50)]
        limit: u32,
    },
    /// Show one workspace
    Get {
        /// Workspace GID
        gid: String,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum TaskCommand {
    /// Show one task
    Get {
        /// Task GID
        gid: String,
    },
    /// Delete a task
    Delete {
        /// Task GID
        gid: String,
    },
    /// Add a comment to a task
    Comment {
        /// Task GID
        gid: String,
        /// Comment text
        text: String,
    },
    /// List comments on a task
    Comments {
        /// Task GID
        gid: String,
        /// Max results to return (1-100)
        #[arg(long, default_value_t = 50)]
        limit: u32,
        /// Pagination offset from a previous page
        #[arg(long)]
        offset: Option<String>,
    },
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Print the effective configuration with the token masked
    Show,
}
