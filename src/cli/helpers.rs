//! Shared helper functions for CLI commands
//!
//! This module contains utility functions used across the command handlers:
//! building the relay stack from configuration and printing results.

use std::path::PathBuf;

use hermes_core::config::RelayConfig;
use hermes_core::error::{RelayError, Result};
use hermes_core::relay::{Outcome, Relay};
use hermes_core::store::DraftStore;
use hermes_core::types::DraftId;

/// Build the relay stack for one command invocation
///
/// Root resolution order: the `--root` flag (clap also fills it from the
/// `HERMES_ROOT` environment variable), then the config file, then the
/// built-in default. Nothing is cached across invocations; every command
/// derives current state fresh from the filesystem.
pub fn build_relay(config_path: Option<String>, root_override: Option<String>) -> Result<Relay> {
    let config_path = config_path
        .map(PathBuf::from)
        .unwrap_or_else(RelayConfig::default_path);
    let mut config = RelayConfig::load(&config_path)?;
    if let Some(root) = root_override {
        config.root = root;
    }

    let store = DraftStore::new(config.root.clone(), config.lock.clone());
    Ok(Relay::new(store, config))
}

/// Parse an explicit `--id` argument
pub fn parse_id(raw: &str) -> Result<DraftId> {
    Ok(DraftId::from_string(raw)?)
}

/// Require a flag the command cannot run without
pub fn require(value: Option<String>, flag: &str) -> Result<String> {
    value.ok_or_else(|| RelayError::MissingArgument(flag.to_string()))
}

/// Print a transition outcome: `<id> <state>` for scripting, or JSON
pub fn print_outcome(outcome: &Outcome, format: &str) {
    if format == "json" {
        println!(
            "{}",
            serde_json::json!({
                "id": outcome.id.to_string(),
                "state": outcome.state.as_str(),
            })
        );
    } else {
        println!("{} {}", outcome.id, outcome.state);
    }
}
