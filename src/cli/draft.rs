//! Draft creation command

use std::io::Read;

use hermes_core::error::Result;
use hermes_core::relay::Outcome;
use hermes_core::types::Stage;

use super::helpers::{build_relay, print_outcome, require};

/// Handle the draft command
///
/// Writes a new pending draft. The prompt text comes from `--content`, or
/// from stdin when the flag is absent so launchers can pipe prompts in.
pub async fn handle(
    slug: Option<String>,
    content: Option<String>,
    format: String,
    config_path: Option<String>,
    root: Option<String>,
) -> Result<()> {
    let relay = build_relay(config_path, root)?;
    let slug = require(slug, "--slug")?;

    let content = match content {
        Some(text) => text,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let draft = relay.store().create(&slug, &content).await?;
    print_outcome(
        &Outcome {
            id: draft.id,
            state: Stage::Pending,
        },
        &format,
    );
    Ok(())
}
