//! Session inspection commands: history, memory, reset.

use anyhow::{Result, anyhow};
use console::style;

use helpdesk_types::chat::TurnRole;
use helpdesk_types::session::SessionId;

use crate::state::AppState;

fn parse_session(session: &str) -> Result<SessionId> {
    session.parse().map_err(|e: String| anyhow!(e))
}

pub async fn history(state: &AppState, session: &str, json: bool) -> Result<()> {
    let session_id = parse_session(session)?;
    let turns = state.controller.history(&session_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&turns)?);
        return Ok(());
    }

    if turns.is_empty() {
        println!("  {} No history for session '{session_id}'.", style("i").blue().bold());
        return Ok(());
    }

    for turn in &turns {
        let label = match turn.role {
            TurnRole::User => style("user").cyan().bold(),
            TurnRole::Assistant => style("assistant").green().bold(),
        };
        println!("{label}: {}", turn.content);
    }
    Ok(())
}

pub async fn memory(state: &AppState, session: &str, json: bool) -> Result<()> {
    let session_id = parse_session(session)?;
    let entries = state.controller.memory(&session_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("  {} No memory for session '{session_id}'.", style("i").blue().bold());
        return Ok(());
    }

    for entry in &entries {
        println!(
            "{} = {}  {}",
            style(&entry.key).bold(),
            entry.value,
            style(entry.updated_at.format("%Y-%m-%d %H:%M")).dim()
        );
    }
    Ok(())
}

pub async fn reset(state: &AppState, session: &str, quiet: bool) -> Result<()> {
    let session_id = parse_session(session)?;
    state.controller.reset(&session_id).await?;
    if !quiet {
        println!("  {} Session '{session_id}' reset.", style("✓").green());
    }
    Ok(())
}
