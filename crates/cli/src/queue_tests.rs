// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::test_helpers::MockSink;
use serde_json::json;
use std::time::Duration;
use tether_core::ManualClock;
use tether_store::MemoryStore;

fn queue(clock: &ManualClock) -> PendingActionQueue<ManualClock> {
    PendingActionQueue::with_clock(RetryPolicy::new(1_000, 30_000, 3).unwrap(), clock.clone())
}

#[tokio::test]
async fn drain_delivers_in_order_and_empties() {
    let clock = ManualClock::new(0);
    let mut queue = queue(&clock);
    let sink = MockSink::new();
    let first = queue.enqueue("save_note", json!({"text": "a"}));
    let second = queue.enqueue("bookmark", json!({"id": 7}));

    let report = queue.drain(&sink).await;

    assert_eq!(report.succeeded, vec![first, second]);
    assert!(report.still_pending.is_empty());
    assert!(report.failed.is_empty());
    assert!(queue.is_empty());
    assert_eq!(queue.retry_count(), 0);
    assert_eq!(sink.delivered_kinds(), vec!["save_note", "bookmark"]);
}

#[tokio::test]
async fn failure_schedules_backoff() {
    let clock = ManualClock::new(10_000);
    let mut queue = queue(&clock);
    let sink = MockSink::new();
    sink.set_failing(true);
    let id = queue.enqueue("save_note", json!(null));

    let report = queue.drain(&sink).await;

    assert_eq!(report.still_pending, vec![id]);
    let action = &queue.pending()[0];
    assert_eq!(action.attempts, 1);
    assert_eq!(action.last_attempt_at, Some(10_000));
    assert_eq!(action.next_retry_at, Some(12_000));
    assert_eq!(queue.retry_count(), 1);
    assert_eq!(queue.next_retry_in_secs(), Some(2));
}

#[tokio::test]
async fn actions_not_yet_due_are_skipped() {
    let clock = ManualClock::new(0);
    let mut queue = queue(&clock);
    let sink = MockSink::new();
    sink.set_failing(true);
    queue.enqueue("save_note", json!(null));
    queue.drain(&sink).await;
    sink.set_failing(false);

    clock.advance(Duration::from_millis(1_999));
    let early = queue.drain(&sink).await;

    assert_eq!(early.succeeded.len(), 0);
    assert_eq!(early.still_pending.len(), 1);
    assert_eq!(sink.attempts(), 1);

    clock.advance(Duration::from_millis(1));
    let due = queue.drain(&sink).await;

    assert_eq!(due.succeeded.len(), 1);
    assert!(queue.is_empty());
}

#[tokio::test]
async fn exhausted_action_is_reported_failed() {
    let clock = ManualClock::new(0);
    let mut queue = queue(&clock);
    let sink = MockSink::new();
    sink.set_failing(true);
    let id = queue.enqueue("save_note", json!({"n": 1}));

    for _ in 0..2 {
        queue.drain(&sink).await;
        clock.advance(Duration::from_secs(60));
    }
    let report = queue.drain(&sink).await;

    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].action.id, id);
    assert_eq!(report.failed[0].action.attempts, 3);
    assert!(report.failed[0].error.contains("mock rejection"));
    assert!(queue.is_empty());
    assert_eq!(queue.retry_count(), 0);
}

#[tokio::test]
async fn one_failure_does_not_block_later_actions() {
    let clock = ManualClock::new(0);
    let mut queue = queue(&clock);
    let sink = MockSink::new();
    sink.fail_kind("flaky");
    let flaky = queue.enqueue("flaky", json!(null));
    let fine = queue.enqueue("fine", json!(null));

    let report = queue.drain(&sink).await;

    assert_eq!(report.succeeded, vec![fine]);
    assert_eq!(report.still_pending, vec![flaky.clone()]);
    assert_eq!(queue.pending()[0].id, flaky);
}

#[test]
fn backoff_is_capped() {
    let clock = ManualClock::new(0);
    let policy = RetryPolicy::new(1_000, 30_000, 10).unwrap();
    let mut queue = PendingActionQueue::with_clock(policy, clock.clone());
    queue.enqueue("x", json!(null));

    let delays: Vec<u64> = (1..=6).map(|n| policy.next_retry_at(0, n)).collect();

    assert_eq!(delays, vec![2_000, 4_000, 8_000, 16_000, 30_000, 30_000]);
    assert_eq!(queue.next_retry_in_secs(), None);
}

#[test]
fn next_retry_rounds_up() {
    let clock = ManualClock::new(0);
    let mut queue = queue(&clock);
    queue.enqueue("x", json!(null));
    queue.actions[0].next_retry_at = Some(2_001);

    assert_eq!(queue.next_retry_in_secs(), Some(3));
    clock.set(5_000);
    assert_eq!(queue.next_retry_in_secs(), Some(0));
}

#[test]
fn progress_summarizes_queue() {
    let clock = ManualClock::new(0);
    let mut queue = queue(&clock);
    assert_eq!(queue.progress(), QueueProgress::default());

    queue.enqueue("x", json!(null));
    queue.enqueue("y", json!(null));
    queue.actions[1].attempts = 2;
    queue.actions[1].next_retry_at = Some(4_000);

    assert_eq!(
        queue.progress(),
        QueueProgress { len: 2, next_retry_in_secs: Some(4), retry_count: 2 }
    );
}

#[tokio::test]
async fn store_persists_and_restores() {
    let clock = ManualClock::new(0);
    let store = MemoryStore::new();

    let mut original = queue(&clock);
    original.attach_store(Arc::new(store.clone()));
    let id = original.enqueue("save_note", json!({"text": "offline"}));
    drop(original);

    let mut restored = queue(&clock);
    let queued_first = restored.enqueue("later", json!(null));
    assert_eq!(restored.attach_store(Arc::new(store.clone())), 1);

    let ids: Vec<_> = restored.pending().iter().map(|a| a.id.clone()).collect();
    assert_eq!(ids, vec![id, queued_first]);

    restored.drain(&MockSink::new()).await;
    let persisted: Vec<PendingAction> = tether_store::read_json(&store, PENDING_ACTIONS_KEY)
        .unwrap()
        .unwrap();
    assert!(persisted.is_empty());
}

#[test]
fn corrupt_store_is_treated_as_empty() {
    let clock = ManualClock::new(0);
    let store = MemoryStore::new();
    store.set(PENDING_ACTIONS_KEY, "{not a list").unwrap();

    let mut queue = queue(&clock);

    assert_eq!(queue.attach_store(Arc::new(store)), 0);
    assert!(queue.is_empty());
}

#[test]
fn persisted_shape_uses_plain_field_names() {
    let action = PendingAction {
        id: ActionId::from("a-1"),
        kind: "save_note".to_string(),
        payload: json!({"text": "x"}),
        created_at: 5,
        attempts: 0,
        last_attempt_at: None,
        next_retry_at: None,
    };

    assert_eq!(
        serde_json::to_value(&action).unwrap(),
        json!({"id": "a-1", "kind": "save_note", "payload": {"text": "x"}, "created_at": 5, "attempts": 0})
    );
}

#[tokio::test(start_paused = true)]
async fn slow_delivery_times_out_as_failed_attempt() {
    let clock = ManualClock::new(0);
    let mut queue = queue(&clock);
    queue.set_delivery_timeout(Duration::from_secs(1));
    let sink = MockSink::new();
    sink.set_delay(Duration::from_secs(3600));
    let id = queue.enqueue("save_note", json!(null));

    let started = tokio::time::Instant::now();
    let report = queue.drain(&sink).await;

    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(report.still_pending, vec![id]);
    assert_eq!(queue.pending()[0].attempts, 1);
    assert_eq!(queue.pending()[0].next_retry_at, Some(2_000));
    assert!(sink.delivered().is_empty());
}

#[test]
fn next_due_skips_tried_and_waiting_actions() {
    let clock = ManualClock::new(0);
    let mut queue = queue(&clock);
    let first = queue.enqueue("a", json!(null));
    let second = queue.enqueue("b", json!(null));
    let third = queue.enqueue("c", json!(null));
    queue.actions[1].next_retry_at = Some(5_000);

    let tried = HashSet::from([first]);

    assert_eq!(queue.next_due(&tried).map(|a| a.id.clone()), Some(third));
    clock.set(5_000);
    assert_eq!(queue.next_due(&tried).map(|a| a.id.clone()), Some(second));
}

#[test]
fn record_attempt_reports_each_outcome() {
    let clock = ManualClock::new(1_000);
    let mut queue = PendingActionQueue::with_clock(
        RetryPolicy::new(1_000, 30_000, 2).unwrap(),
        clock.clone(),
    );
    let ok = queue.enqueue("ok", json!(null));
    let flaky = queue.enqueue("flaky", json!(null));
    let rejected = || Err(DeliveryError("rejected".to_string()));

    assert_eq!(queue.record_attempt(&ok, Ok(())), Some(AttemptOutcome::Delivered));
    assert_eq!(
        queue.record_attempt(&flaky, rejected()),
        Some(AttemptOutcome::Retrying { next_retry_at: 3_000 })
    );
    match queue.record_attempt(&flaky, rejected()) {
        Some(AttemptOutcome::Failed(failed)) => {
            assert_eq!(failed.action.id, flaky);
            assert_eq!(failed.action.attempts, 2);
            assert_eq!(failed.error, "delivery failed: rejected");
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(queue.is_empty());
    assert_eq!(queue.record_attempt(&ok, Ok(())), None);
}
