//! Hermes - Filesystem-Backed Prompt Relay
//!
//! A small Rust relay that moves prompt artifacts between named autonomous
//! agents through an auditable pipeline:
//! - Human-readable, sortable artifact names carrying a stable draft ID
//! - A strictly linear lifecycle: pending, approved, sent, acked
//! - Routing and append-only history recorded in YAML frontmatter
//! - Atomic stage transitions so concurrent relays never duplicate a draft
//!
//! # Architecture
//!
//! The system is organized into several layers:
//! - **Types**: Core data structures (DraftId, Stage, Draft, etc.)
//! - **Codec**: Artifact name encoding and decoding
//! - **Store**: Directory-per-stage persistence and atomic transfer
//! - **Relay**: Lifecycle transitions (approve, send, ack)
//!
//! # Example
//!
//! ```ignore
//! use hermes_core::{DraftStore, Relay, RelayConfig, Stage};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = RelayConfig::load("hermes.toml")?;
//!     let store = DraftStore::new(config.root.clone(), config.lock.clone());
//!     let relay = Relay::new(store, config);
//!
//!     // Approve the most recent pending draft and dispatch it
//!     let draft = relay.store().latest(Stage::Pending).await?;
//!     let outcome = relay.approve(draft.id, "claude", "gemini", true).await?;
//!     println!("{} {}", outcome.id, outcome.state);
//!
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod relay;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use config::{LockSettings, RelayConfig};
pub use error::{RelayError, Result};
pub use relay::{Outcome, Relay};
pub use store::DraftStore;
pub use types::{Draft, DraftId, DraftMeta, HistoryAction, HistoryEvent, Stage};
