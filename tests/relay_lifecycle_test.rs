//! Integration tests for the relay lifecycle
//!
//! Tests complete approve/send/ack conversations over a real directory tree,
//! including implicit draft resolution and misrouted acknowledgements.

mod common;

use common::{seed_pending, setup_relay};
use hermes_core::{HistoryAction, RelayError, Stage};

#[tokio::test]
async fn test_full_relay_conversation() {
    let (_temp_dir, relay) = setup_relay();

    // 1. A producing agent drops a draft
    let draft = relay
        .store()
        .create("retry-budget", "Please add a retry budget to the fetcher")
        .await
        .unwrap();

    // 2. Approval records the routing
    let outcome = relay
        .approve(draft.id, "gemini", "claude", false)
        .await
        .unwrap();
    assert_eq!(outcome.state, Stage::Approved);

    // 3. Dispatch
    let outcome = relay.send(draft.id).await.unwrap();
    assert_eq!(outcome.state, Stage::Sent);

    // 4. The recipient acknowledges
    let outcome = relay.ack(draft.id, "claude").await.unwrap();
    assert_eq!(outcome.state, Stage::Acked);

    // Exactly one artifact remains, in the terminal stage, content intact,
    // carrying the full audit trail in order
    for stage in [Stage::Pending, Stage::Approved, Stage::Sent] {
        assert!(relay.store().list(stage).await.unwrap().is_empty());
    }
    let acked = relay.store().load(draft.id, Stage::Acked).await.unwrap();
    assert_eq!(acked.content, "Please add a retry budget to the fetcher");
    assert_eq!(acked.from_agent(), Some("gemini"));
    assert_eq!(acked.to_agent(), Some("claude"));
    let actions: Vec<_> = acked.meta.history.iter().map(|e| e.action).collect();
    assert_eq!(
        actions,
        vec![
            HistoryAction::Approved,
            HistoryAction::Sent,
            HistoryAction::Acked
        ]
    );
    assert_eq!(acked.meta.history[0].actor, "gemini");
    assert_eq!(acked.meta.history[2].actor, "claude");
}

#[tokio::test]
async fn test_approve_latest_pending_moves_only_newest() {
    let (_temp_dir, relay) = setup_relay();

    let older = seed_pending(&relay, "20260101T090000.000Z", "first", "older prompt").await;
    let newer = seed_pending(&relay, "20260101T100000.000Z", "second", "newer prompt").await;

    // Implicit resolution picks the newest pending draft
    let id = relay.store().latest(Stage::Pending).await.unwrap();
    assert_eq!(id, newer);

    let outcome = relay.approve(id, "gemini", "claude", true).await.unwrap();
    assert_eq!(outcome.id, newer);
    assert_eq!(outcome.state, Stage::Sent);

    // The older draft has not moved
    assert!(relay
        .store()
        .find(older, Stage::Pending)
        .await
        .unwrap()
        .is_some());
    assert!(relay
        .store()
        .find(newer, Stage::Sent)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_ack_resolves_latest_sent_for_agent() {
    let (_temp_dir, relay) = setup_relay();

    let to_claude = seed_pending(&relay, "20260101T090000.000Z", "for-claude", "a").await;
    let to_gemini = seed_pending(&relay, "20260101T100000.000Z", "for-gemini", "b").await;
    relay
        .approve(to_claude, "gemini", "claude", true)
        .await
        .unwrap();
    relay
        .approve(to_gemini, "claude", "gemini", true)
        .await
        .unwrap();

    // The newest sent draft overall is addressed to gemini; claude still
    // resolves its own
    let id = relay.store().latest_sent_to("claude").await.unwrap();
    assert_eq!(id, to_claude);
    relay.ack(id, "claude").await.unwrap();

    // gemini's draft is still waiting for gemini
    assert!(relay
        .store()
        .find(to_gemini, Stage::Sent)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_wrong_agent_cannot_ack() {
    let (_temp_dir, relay) = setup_relay();
    let draft = relay.store().create("handoff", "body").await.unwrap();
    relay
        .approve(draft.id, "gemini", "claude", true)
        .await
        .unwrap();

    let err = relay.ack(draft.id, "gemini").await.unwrap_err();
    assert!(matches!(err, RelayError::WrongAgent(_)));

    // Still deliverable to the intended recipient
    let outcome = relay.ack(draft.id, "claude").await.unwrap();
    assert_eq!(outcome.state, Stage::Acked);
}

#[tokio::test]
async fn test_out_of_order_transitions_rejected() {
    let (_temp_dir, relay) = setup_relay();
    let draft = relay.store().create("order", "body").await.unwrap();

    // Stages cannot be skipped
    let err = relay.send(draft.id).await.unwrap_err();
    assert!(matches!(err, RelayError::InvalidState(_)));
    let err = relay.ack(draft.id, "claude").await.unwrap_err();
    assert!(matches!(err, RelayError::InvalidState(_)));

    // Stages cannot be revisited
    relay
        .approve(draft.id, "gemini", "claude", false)
        .await
        .unwrap();
    let err = relay
        .approve(draft.id, "gemini", "claude", false)
        .await
        .unwrap_err();
    assert!(matches!(err, RelayError::InvalidState(_)));
}

#[tokio::test]
async fn test_ambiguous_latest_refuses_resolution() {
    let (_temp_dir, relay) = setup_relay();
    seed_pending(&relay, "20260101T120000.000Z", "one", "1").await;
    seed_pending(&relay, "20260101T120000.000Z", "two", "2").await;

    let err = relay.store().latest(Stage::Pending).await.unwrap_err();
    assert!(matches!(err, RelayError::AmbiguousLatest(_)));
}
