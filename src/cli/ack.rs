//! Draft acknowledgment command

use hermes_core::error::Result;
use tracing::debug;

use super::helpers::{build_relay, parse_id, print_outcome, require};

/// Handle the ack command
///
/// Without an explicit `--id`, the agent's newest sent draft addressed to it
/// is acknowledged; drafts routed to other agents are never considered.
pub async fn handle(
    agent: Option<String>,
    id: Option<String>,
    format: String,
    config_path: Option<String>,
    root: Option<String>,
) -> Result<()> {
    let relay = build_relay(config_path, root)?;
    let agent = require(agent, "--agent")?;

    let id = match id {
        Some(raw) => parse_id(&raw)?,
        None => {
            let latest = relay.store().latest_sent_to(&agent).await?;
            debug!("Resolved latest sent draft for {}: {}", agent, latest);
            latest
        }
    };

    let outcome = relay.ack(id, &agent).await?;
    print_outcome(&outcome, &format);
    Ok(())
}
