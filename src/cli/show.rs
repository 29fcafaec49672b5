//! Draft inspection command

use hermes_core::error::{RelayError, Result};

use super::helpers::{build_relay, parse_id, require};

/// Handle the show command
///
/// Prints a draft's stage, routing, audit history, and content: the view an
/// operator reads when tracing how a prompt moved through the relay.
pub async fn handle(
    id: Option<String>,
    format: String,
    config_path: Option<String>,
    root: Option<String>,
) -> Result<()> {
    let relay = build_relay(config_path, root)?;
    let id = parse_id(&require(id, "--id")?)?;

    let stage = relay
        .store()
        .stage_of(id)
        .await?
        .ok_or_else(|| RelayError::NotFound(format!("{} in any stage", id)))?;
    let draft = relay.store().load(id, stage).await?;

    if format == "json" {
        let history: Vec<_> = draft
            .meta
            .history
            .iter()
            .map(|event| {
                serde_json::json!({
                    "actor": event.actor,
                    "action": event.action,
                    "at": event.at.to_rfc3339(),
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::json!({
                "id": draft.id.to_string(),
                "state": draft.stage.as_str(),
                "name": draft.name,
                "from": draft.from_agent(),
                "to": draft.to_agent(),
                "history": history,
                "content": draft.content,
            })
        );
    } else {
        println!("ID:     {}", draft.id);
        println!("State:  {}", draft.stage);
        println!("Name:   {}", draft.name);
        println!("From:   {}", draft.from_agent().unwrap_or("-"));
        println!("To:     {}", draft.to_agent().unwrap_or("-"));
        if !draft.meta.history.is_empty() {
            println!("History:");
            for event in &draft.meta.history {
                println!(
                    "  {:<9} {:<10} {}",
                    event.action,
                    event.actor,
                    event.at.to_rfc3339()
                );
            }
        }
        println!();
        println!("{}", draft.content);
    }

    Ok(())
}
