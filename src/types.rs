//! Core data types for the Hermes prompt relay
//!
//! This module defines the fundamental data structures used throughout hermes,
//! including draft identifiers, lifecycle stages, and audit history. These types
//! form the foundation of the filesystem-backed relay protocol.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for drafts
///
/// Wraps a UUID to provide type safety and prevent mixing draft IDs with
/// other identifiers. Rendered everywhere (filenames, frontmatter, CLI
/// output) in the simple format: 32 lowercase hex characters, no hyphens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DraftId(#[serde(with = "uuid::serde::simple")] pub Uuid);

impl DraftId {
    /// Create a new random draft ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a draft ID from a string
    ///
    /// Accepts both the simple and the hyphenated rendering; the value is
    /// normalized to simple form on display.
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for DraftId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DraftId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.as_simple())
    }
}

/// Lifecycle stage of a draft: pending → approved → sent → acked
///
/// Strictly linear; no branches, no stage is revisited. The stage is not
/// stored inside the artifact; the directory the artifact resides in is the
/// single source of truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Drafted by a producing agent, awaiting approval
    Pending,

    /// Approved by the source agent, routing recorded
    Approved,

    /// Dispatched to the destination agent
    Sent,

    /// Acknowledged by the destination agent (terminal)
    Acked,
}

impl Stage {
    /// All stages in lifecycle order
    pub const ALL: [Stage; 4] = [Stage::Pending, Stage::Approved, Stage::Sent, Stage::Acked];

    /// Subdirectory holding artifacts in this stage
    ///
    /// Note the pending stage lives under `drafts/`, matching where
    /// producing agents drop new files.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Stage::Pending => "drafts",
            Stage::Approved => "approved",
            Stage::Sent => "sent",
            Stage::Acked => "acked",
        }
    }

    /// Stage name as used in output and serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Pending => "pending",
            Stage::Approved => "approved",
            Stage::Sent => "sent",
            Stage::Acked => "acked",
        }
    }

    /// The stage a successful transition leads to, if any
    pub fn next(&self) -> Option<Stage> {
        match self {
            Stage::Pending => Some(Stage::Approved),
            Stage::Approved => Some(Stage::Sent),
            Stage::Sent => Some(Stage::Acked),
            Stage::Acked => None,
        }
    }

    /// Whether this stage ends the lifecycle
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Acked)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Audit action recorded in a draft's history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    /// Draft approved and routed by the source agent
    Approved,

    /// Draft dispatched to the destination agent
    Sent,

    /// Draft acknowledged by the destination agent
    Acked,
}

impl std::fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HistoryAction::Approved => "approved",
            HistoryAction::Sent => "sent",
            HistoryAction::Acked => "acked",
        };
        write!(f, "{}", s)
    }
}

/// Single append-only audit event: who did what, when
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEvent {
    /// Agent that performed the action
    pub actor: String,

    /// The recorded action
    pub action: HistoryAction,

    /// When the action was recorded
    pub at: DateTime<Utc>,
}

impl HistoryEvent {
    /// Record an event happening now
    pub fn now(actor: impl Into<String>, action: HistoryAction) -> Self {
        Self {
            actor: actor.into(),
            action,
            at: Utc::now(),
        }
    }
}

/// Metadata carried in an artifact's YAML frontmatter
///
/// Pending artifacts dropped by producing agents may have no frontmatter at
/// all; the first relay transition introduces it. The `id` duplicates the
/// filename-encoded identifier and is cross-checked on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftMeta {
    /// Draft identifier, must agree with the filename
    pub id: DraftId,

    /// Source agent, set at approval time and immutable after
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,

    /// Destination agent, set at approval time and immutable after
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,

    /// Append-only audit trail
    #[serde(default)]
    pub history: Vec<HistoryEvent>,
}

impl DraftMeta {
    /// Fresh metadata for a draft that has not been through any transition
    pub fn new(id: DraftId) -> Self {
        Self {
            id,
            from: None,
            to: None,
            history: Vec::new(),
        }
    }
}

/// A draft loaded from the store, ready for inspection or transition
#[derive(Debug, Clone)]
pub struct Draft {
    // === Identity ===
    /// On-disk artifact file name, preserved exactly as found
    pub name: String,

    /// Decoded draft identifier
    pub id: DraftId,

    /// Stage the artifact was loaded from
    pub stage: Stage,

    // === Routing and audit ===
    /// Frontmatter metadata (routing + history)
    pub meta: DraftMeta,

    // === Content ===
    /// Opaque prompt text; never inspected or transformed by the relay
    pub content: String,
}

impl Draft {
    /// Sortable sequence-key prefix of the artifact name
    pub fn sequence_key(&self) -> &str {
        crate::codec::sequence_key_of(&self.name)
    }

    /// Agent recorded as the draft's recipient, if routing is set
    pub fn to_agent(&self) -> Option<&str> {
        self.meta.to.as_deref()
    }

    /// Agent recorded as the draft's sender, if routing is set
    pub fn from_agent(&self) -> Option<&str> {
        self.meta.from.as_deref()
    }
}
