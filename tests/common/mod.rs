//! Common test utilities and helpers

use hermes_core::{DraftId, DraftStore, LockSettings, Relay, RelayConfig, Stage};
use tempfile::TempDir;

/// Create a relay over a fresh temporary root
pub fn setup_relay() -> (TempDir, Relay) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut config = RelayConfig::default();
    config.root = temp_dir
        .path()
        .join("prompts")
        .to_string_lossy()
        .into_owned();
    let store = DraftStore::new(config.root.clone(), config.lock.clone());
    let relay = Relay::new(store, config);
    (temp_dir, relay)
}

/// Create a relay that serializes stage moves through advisory locks
pub fn setup_locked_relay() -> (TempDir, Relay) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut config = RelayConfig::default();
    config.root = temp_dir
        .path()
        .join("prompts")
        .to_string_lossy()
        .into_owned();
    config.lock = LockSettings {
        enabled: true,
        timeout_ms: 5000,
        poll_ms: 10,
    };
    let store = DraftStore::new(config.root.clone(), config.lock.clone());
    let relay = Relay::new(store, config);
    (temp_dir, relay)
}

/// Seed a pending artifact with an explicit sequence key
///
/// Bypasses `DraftStore::create` so tests control the chronological order
/// exactly, the way an external producing agent writing its own files would.
pub async fn seed_pending(relay: &Relay, sequence_key: &str, slug: &str, content: &str) -> DraftId {
    let id = DraftId::new();
    let name = format!("{}_{}_{}.md", sequence_key, id, slug);
    let dir = relay.store().stage_dir(Stage::Pending);
    tokio::fs::create_dir_all(&dir)
        .await
        .expect("Failed to create drafts dir");
    tokio::fs::write(dir.join(&name), content)
        .await
        .expect("Failed to seed draft");
    id
}
