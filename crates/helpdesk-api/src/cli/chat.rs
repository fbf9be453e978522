//! `helpdesk chat`: one exchange from the command line.

use anyhow::{Result, anyhow};
use console::style;
use futures_util::StreamExt;

use helpdesk_types::exchange::ExchangeEvent;
use helpdesk_types::session::SessionId;

use crate::state::AppState;

/// Run one exchange and print the buffered result, or every stream frame
/// when `stream` is set.
pub async fn chat(
    state: &AppState,
    session: &str,
    message: String,
    model: Option<String>,
    stream: bool,
    json: bool,
) -> Result<()> {
    let session_id: SessionId = session.parse().map_err(|e: String| anyhow!(e))?;

    if stream {
        let mut events = state
            .controller
            .handle_streaming(session_id, message, model);
        let mut failed = None;
        while let Some(event) = events.next().await {
            if json {
                println!("data: {}", event.to_json());
                continue;
            }
            match event {
                ExchangeEvent::Token(token) => print!("{token}"),
                ExchangeEvent::Done { tools_used, .. } => {
                    println!();
                    if !tools_used.is_empty() {
                        println!("  {} {}", style("tools:").dim(), tools_used.join(", "));
                    }
                }
                ExchangeEvent::Error(error) => failed = Some(error),
            }
        }
        return match failed {
            Some(error) => Err(anyhow!(error)),
            None => Ok(()),
        };
    }

    let result = state
        .controller
        .handle(&session_id, &message, model.as_deref())
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("{}", result.reply);
    if !result.tools_used.is_empty() {
        println!();
        println!("  {} {}", style("tools:").dim(), result.tools_used.join(", "));
    }
    for (key, value) in &result.memory_delta {
        println!("  {} {key} = {value}", style("remembered:").dim());
    }
    Ok(())
}
