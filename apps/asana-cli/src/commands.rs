//! Command handlers. Each one prints a single JSON document on success.

use std::io::Write;

use asana_errors::CliError;
use asana_http::models::Story;
use asana_http::{AsanaClient, ListResponse};
use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::cli::{Command, ConfigCommand, TaskCommand, WorkspaceCommand};
use crate::config::CliConfig;
use crate::output::write_json;

const MAX_LIMIT: u32 = 100;

/// Run `command`, building an API client only when the command needs one.
///
/// # Errors
///
/// Whatever the command fails with, already classified.
pub async fn execute(
    command: &Command,
    config: &CliConfig,
    cancel: &CancellationToken,
    out: &mut impl Write,
) -> Result<(), CliError> {
    match command {
        Command::Version => write_json(out, &json!({ "version": env!("CARGO_PKG_VERSION") })),
        Command::Config {
            command: ConfigCommand::Show,
        } => write_json(out, &config.view()),
        Command::Me => {
            let me = connect(config)?.get_me(cancel).await?;
            write_json(out, &me)
        }
        Command::Workspace { command } => workspace(command, &connect(config)?, cancel, out).await,
        Command::Task { command } => task(command, &connect(config)?, cancel, out).await,
    }
}

fn connect(config: &CliConfig) -> Result<AsanaClient, CliError> {
    let mut builder = AsanaClient::builder(config.client_config()?);
    if config.debug {
        builder = builder.debug_sink(std::io::stderr());
    }
    builder.build()
}

fn check_limit(limit: u32) -> Result<u32, CliError> {
    if (1..=MAX_LIMIT).contains(&limit) {
        Ok(limit)
    } else {
        Err(CliError::invalid_args(format!(
            "limit must be between 1 and {MAX_LIMIT}, got {limit}"
        )))
    }
}

pub async fn workspace(
    command: &WorkspaceCommand,
    client: &AsanaClient,
    cancel: &CancellationToken,
    out: &mut impl Write,
) -> Result<(), CliError> {
    match command {
        WorkspaceCommand::List { limit } => {
            let limit = check_limit(*limit)?;
            let page = client.list_workspaces(Some(limit), cancel).await?;
            write_json(out, &page)
        }
        WorkspaceCommand::Get { gid } => {
            let ws = client.get_workspace(gid, cancel).await?;
            write_json(out, &ws)
        }
    }
}

pub async fn task(
    command: &TaskCommand,
    client: &AsanaClient,
    cancel: &CancellationToken,
    out: &mut impl Write,
) -> Result<(), CliError> {
    match command {
        TaskCommand::Get { gid } => {
            let task = client.get_task(gid, cancel).await?;
            write_json(out, &task)
        }
        TaskCommand::Delete { gid } => {
            client.delete_task(gid, cancel).await?;
            write_json(out, &json!({ "deleted": true, "gid": gid }))
        }
        TaskCommand::Comment { gid, text } => {
            if text.trim().is_empty() {
                return Err(CliError::invalid_args("comment text must not be empty"));
            }
            let story = client.add_comment(gid, text, cancel).await?;
            write_json(out, &story)
        }
        TaskCommand::Comments { gid, limit, offset } => {
            let limit = check_limit(*limit)?;
            let page = client
                .list_stories(gid, Some(limit), offset.as_deref(), cancel)
                .await?;
            write_json(out, &only_comments(page))
        }
    }
}

/// Drop system stories (assignments, moves, ...) and keep user comments.
fn only_comments(page: ListResponse<Story>) -> ListResponse<Story> {
    ListResponse {
        data: page
            .data
            .into_iter()
            .filter(|s| s.story_type.as_deref() == Some("comment"))
            .collect(),
        next_page: page.next_page,
    }
}
