//! Draft approval command

use hermes_core::error::Result;
use hermes_core::types::Stage;
use tracing::debug;

use super::helpers::{build_relay, parse_id, print_outcome, require};

/// Handle the approve command
///
/// Without an explicit `--id`, the latest pending draft is approved; the
/// resolution fails rather than guesses when the newest draft is ambiguous.
pub async fn handle(
    from: Option<String>,
    to: Option<String>,
    id: Option<String>,
    send: bool,
    format: String,
    config_path: Option<String>,
    root: Option<String>,
) -> Result<()> {
    let relay = build_relay(config_path, root)?;
    let from = require(from, "--from")?;
    let to = require(to, "--to")?;

    let id = match id {
        Some(raw) => parse_id(&raw)?,
        None => {
            let latest = relay.store().latest(Stage::Pending).await?;
            debug!("Resolved latest pending draft: {}", latest);
            latest
        }
    };

    let outcome = relay.approve(id, &from, &to, send).await?;
    print_outcome(&outcome, &format);
    Ok(())
}
