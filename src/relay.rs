//! Relay state machine
//!
//! Drafts move through a strictly linear lifecycle: pending → approved →
//! sent → acked. Each transition validates the draft's current stage, records
//! an audit event, and hands the rewritten draft to the store for the atomic
//! move. The machine holds no state of its own: every invocation derives the
//! draft's position fresh from the filesystem, so retries from external
//! orchestrators are always safe.

use tracing::info;

use crate::config::RelayConfig;
use crate::error::{RelayError, Result};
use crate::store::DraftStore;
use crate::types::{Draft, DraftId, HistoryAction, HistoryEvent, Stage};

/// What a completed transition left behind, for the command boundary to print
#[derive(Debug, Clone, Copy)]
pub struct Outcome {
    /// The draft operated on
    pub id: DraftId,

    /// Stage the draft is in after the operation
    pub state: Stage,
}

/// The approve/send/ack transition logic over a draft store
pub struct Relay {
    store: DraftStore,
    config: RelayConfig,
}

impl Relay {
    /// Build a relay over the given store and agent registry
    pub fn new(store: DraftStore, config: RelayConfig) -> Self {
        Self { store, config }
    }

    /// The underlying store, for id resolution at the command boundary
    pub fn store(&self) -> &DraftStore {
        &self.store
    }

    /// Approve a pending draft and record its routing
    ///
    /// Sets `from_agent`/`to_agent`, appends the `approved` event, and moves
    /// the draft to `approved`. With `also_send`, immediately chains the
    /// `send` transition as one logical operation; if the send fails after
    /// the approval succeeded, the draft stays `approved` and the error says
    /// so rather than rolling anything back.
    pub async fn approve(
        &self,
        id: DraftId,
        from_agent: &str,
        to_agent: &str,
        also_send: bool,
    ) -> Result<Outcome> {
        if !self.config.is_known_agent(from_agent) {
            return Err(RelayError::UnknownAgent(from_agent.to_string()));
        }
        if !self.config.is_known_agent(to_agent) {
            return Err(RelayError::UnknownAgent(to_agent.to_string()));
        }

        let mut draft = self.load_in_stage(id, Stage::Pending).await?;
        draft.meta.from = Some(from_agent.to_string());
        draft.meta.to = Some(to_agent.to_string());
        draft
            .meta
            .history
            .push(HistoryEvent::now(from_agent, HistoryAction::Approved));
        self.store.transfer(&draft, Stage::Approved).await?;
        info!("Draft {} approved: {} -> {}", id, from_agent, to_agent);

        if !also_send {
            return Ok(Outcome {
                id,
                state: Stage::Approved,
            });
        }

        match self.send(id).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => Err(RelayError::Other(format!(
                "draft {} approved but not sent: {}",
                id, e
            ))),
        }
    }

    /// Dispatch an approved draft to its recorded recipient
    pub async fn send(&self, id: DraftId) -> Result<Outcome> {
        let mut draft = self.load_in_stage(id, Stage::Approved).await?;
        let actor = match draft.from_agent() {
            Some(a) => a.to_string(),
            None => {
                return Err(RelayError::InvalidState(format!(
                    "draft {} is approved but has no recorded sender",
                    id
                )));
            }
        };

        draft
            .meta
            .history
            .push(HistoryEvent::now(actor, HistoryAction::Sent));
        self.store.transfer(&draft, Stage::Sent).await?;
        info!("Draft {} sent to {}", id, draft.to_agent().unwrap_or("?"));

        Ok(Outcome {
            id,
            state: Stage::Sent,
        })
    }

    /// Acknowledge a sent draft as its recorded recipient
    ///
    /// Idempotent: acknowledging an already-acked draft with the same agent
    /// succeeds without appending a duplicate event, so crashed callers can
    /// retry freely.
    pub async fn ack(&self, id: DraftId, agent: &str) -> Result<Outcome> {
        match self.store.load(id, Stage::Acked).await {
            Ok(done) => {
                return if done.to_agent() == Some(agent) {
                    info!("Draft {} already acked by {}", id, agent);
                    Ok(Outcome {
                        id,
                        state: Stage::Acked,
                    })
                } else {
                    Err(RelayError::WrongAgent(format!(
                        "draft {} is addressed to '{}', not '{}'",
                        id,
                        done.to_agent().unwrap_or("?"),
                        agent
                    )))
                };
            }
            Err(RelayError::NotFound(_)) => {}
            Err(e) => return Err(e),
        }

        let mut draft = self.load_in_stage(id, Stage::Sent).await?;
        match draft.to_agent() {
            Some(to) if to == agent => {}
            Some(to) => {
                return Err(RelayError::WrongAgent(format!(
                    "draft {} is addressed to '{}', not '{}'",
                    id, to, agent
                )));
            }
            None => {
                return Err(RelayError::InvalidState(format!(
                    "draft {} is sent but has no recorded recipient",
                    id
                )));
            }
        }

        draft
            .meta
            .history
            .push(HistoryEvent::now(agent, HistoryAction::Acked));
        self.store.transfer(&draft, Stage::Acked).await?;
        info!("Draft {} acked by {}", id, agent);

        Ok(Outcome {
            id,
            state: Stage::Acked,
        })
    }

    /// Load a draft that must currently be in the given stage
    ///
    /// Distinguishes a draft parked in another stage (`InvalidState`) from
    /// one that exists nowhere (`NotFound`).
    async fn load_in_stage(&self, id: DraftId, stage: Stage) -> Result<Draft> {
        match self.store.load(id, stage).await {
            Ok(draft) => Ok(draft),
            Err(RelayError::NotFound(_)) => match self.store.stage_of(id).await? {
                Some(actual) => Err(RelayError::InvalidState(format!(
                    "draft {} is {}, expected {}",
                    id, actual, stage
                ))),
                None => Err(RelayError::NotFound(format!("{} in any stage", id))),
            },
            Err(e) => Err(e),
        }
    }
}
