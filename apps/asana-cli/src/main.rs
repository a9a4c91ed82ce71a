//! `asana` - command-line client for the Asana REST API
//!
//! # Usage
//!
//! ```bash
//! export ASANA_ACCESS_TOKEN=...
//! asana me
//! asana workspace list --limit 10
//! asana task comment 1200000000000001 "ship it" --debug
//! ```
//!
//! Successful output is pretty JSON on stdout. Failures print
//! `{"error": {"message", "code", "exit_code"}}` on stdout and exit with
//! `exit_code`.

// CLI tools are expected to print to stdout/stderr
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;
mod commands;
mod config;
mod output;

use std::process::ExitCode;

use anyhow::Context;
use asana_errors::{CliError, EXIT_SUCCESS, ErrorKind};
use clap::Parser;
use clap::error::ErrorKind as ClapErrorKind;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::cli::Cli;
use crate::config::CliConfig;

/// Install a stderr subscriber. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) -> anyhow::Result<()> {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init()
        .context("failed to install tracing subscriber")
}

/// First line of a clap error without its `error: ` prefix.
fn usage_message(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let first = rendered.lines().next().unwrap_or_default();
    first.strip_prefix("error: ").unwrap_or(first).to_owned()
}

/// Cancel `token` on the first Ctrl-C.
fn cancel_on_interrupt(token: &CancellationToken) {
    let token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::debug!("interrupt received, cancelling in-flight request");
            token.cancel();
        }
    });
}

async fn run(cli: &Cli) -> Result<(), CliError> {
    let config = CliConfig::load(&cli.overrides())?;
    let cancel = CancellationToken::new();
    cancel_on_interrupt(&cancel);

    let mut stdout = std::io::stdout();
    commands::execute(&cli.command, &config, &cancel, &mut stdout).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err)
            if matches!(
                err.kind(),
                ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion
            ) =>
        {
            err.print().ok();
            return ExitCode::from(EXIT_SUCCESS);
        }
        Err(err) if err.kind() == ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
            err.print().ok();
            return ExitCode::from(ErrorKind::InvalidArgs.exit_code());
        }
        Err(err) => {
            let err = CliError::invalid_args(usage_message(&err));
            output::write_error(&mut std::io::stdout(), &err);
            return ExitCode::from(err.exit_code());
        }
    };

    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("warning: {e:#}");
    }

    match run(&cli).await {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(err) => {
            tracing::debug!(code = err.code(), error = %err, "command failed");
            output::write_error(&mut std::io::stdout(), &err);
            ExitCode::from(err.exit_code())
        }
    }
}
