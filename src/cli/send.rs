//! Draft dispatch command

use hermes_core::error::Result;

use super::helpers::{build_relay, parse_id, print_outcome, require};

/// Handle the send command
pub async fn handle(
    id: Option<String>,
    format: String,
    config_path: Option<String>,
    root: Option<String>,
) -> Result<()> {
    let relay = build_relay(config_path, root)?;
    let id = parse_id(&require(id, "--id")?)?;

    let outcome = relay.send(id).await?;
    print_outcome(&outcome, &format);
    Ok(())
}
