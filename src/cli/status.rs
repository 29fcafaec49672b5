//! Relay queue status command

use hermes_core::error::Result;
use hermes_core::types::Stage;

use super::helpers::build_relay;

/// Handle the status command
pub async fn handle(
    format: String,
    config_path: Option<String>,
    root: Option<String>,
) -> Result<()> {
    let relay = build_relay(config_path, root)?;
    let store = relay.store();

    if format == "json" {
        let mut stages = serde_json::Map::new();
        for stage in Stage::ALL {
            let names = store.list(stage).await?;
            stages.insert(
                stage.as_str().to_string(),
                serde_json::json!({
                    "count": names.len(),
                    "newest": names.last(),
                }),
            );
        }
        println!(
            "{}",
            serde_json::json!({
                "root": store.root().display().to_string(),
                "stages": stages,
            })
        );
    } else {
        println!("Relay root: {}", store.root().display());
        for stage in Stage::ALL {
            let names = store.list(stage).await?;
            let newest = names.last().map(|s| s.as_str()).unwrap_or("-");
            println!("{:<9} {:>4}  {}", stage.as_str(), names.len(), newest);
        }
    }

    Ok(())
}
