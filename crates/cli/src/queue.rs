// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Queue of user actions awaiting delivery.
//!
//! Actions are delivered in FIFO order. A failed delivery schedules the next
//! attempt with exponential backoff; once the retry policy is exhausted the
//! action leaves the queue and is reported as failed, never dropped silently.
//!
//! When a store is attached the pending list is written under
//! `pending_actions` after every change and restored on attach.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tether_core::{ClockSource, RetryPolicy, SystemClock};
use tether_store::{load_or_default, write_json, KeyValueStore};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::delivery::{deliver_within, ActionSink, DeliveryError};

/// Storage key holding the pending list.
pub const PENDING_ACTIONS_KEY: &str = "pending_actions";

/// Bound on a single delivery attempt unless configured otherwise.
pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Unique action identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(String);

impl ActionId {
    pub fn generate() -> Self {
        ActionId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActionId {
    fn from(s: &str) -> Self {
        ActionId(s.to_string())
    }
}

/// A user action that has not been delivered yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingAction {
    pub id: ActionId,
    pub kind: String,
    pub payload: Value,
    pub created_at: u64,
    #[serde(default)]
    pub attempts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_attempt_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_retry_at: Option<u64>,
}

impl PendingAction {
    /// True when the action may be attempted at `now_ms`.
    pub fn is_due(&self, now_ms: u64) -> bool {
        self.next_retry_at.map_or(true, |at| at <= now_ms)
    }
}

/// An action removed after exhausting its retries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedAction {
    pub action: PendingAction,
    pub error: String,
}

/// What one delivery attempt did to its action.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    Delivered,
    /// Still queued, next attempt at this wall time.
    Retrying { next_retry_at: u64 },
    /// Retries exhausted; the action left the queue.
    Failed(FailedAction),
}

/// Result of one drain pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrainReport {
    pub succeeded: Vec<ActionId>,
    pub still_pending: Vec<ActionId>,
    pub failed: Vec<FailedAction>,
}

impl DrainReport {
    pub fn is_empty(&self) -> bool {
        self.succeeded.is_empty() && self.still_pending.is_empty() && self.failed.is_empty()
    }

    /// Adds a finished attempt. Retries show up in `still_pending` once the
    /// pass closes.
    pub fn record(&mut self, id: ActionId, outcome: AttemptOutcome) {
        match outcome {
            AttemptOutcome::Delivered => self.succeeded.push(id),
            AttemptOutcome::Retrying { .. } => {}
            AttemptOutcome::Failed(failed) => self.failed.push(failed),
        }
    }
}

/// Queue summary for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueueProgress {
    pub len: usize,
    /// Seconds until the earliest scheduled retry, rounded up.
    pub next_retry_in_secs: Option<u64>,
    /// Highest attempt count among pending actions.
    pub retry_count: u32,
}

pub struct PendingActionQueue<C = SystemClock> {
    actions: Vec<PendingAction>,
    policy: RetryPolicy,
    clock: C,
    delivery_timeout: Duration,
    store: Option<Arc<dyn KeyValueStore>>,
}

impl PendingActionQueue<SystemClock> {
    pub fn new(policy: RetryPolicy) -> Self {
        Self::with_clock(policy, SystemClock)
    }
}

impl<C: ClockSource> PendingActionQueue<C> {
    pub fn with_clock(policy: RetryPolicy, clock: C) -> Self {
        PendingActionQueue {
            actions: Vec::new(),
            policy,
            clock,
            delivery_timeout: DEFAULT_DELIVERY_TIMEOUT,
            store: None,
        }
    }

    /// Persists the queue in `store`, first restoring whatever it holds.
    ///
    /// Restored actions go ahead of anything already queued. Unreadable data
    /// is logged and treated as an empty list. Returns the number restored.
    pub fn attach_store(&mut self, store: Arc<dyn KeyValueStore>) -> usize {
        let restored: Vec<PendingAction> = load_or_default(&*store, PENDING_ACTIONS_KEY);
        let count = restored.len();
        if count > 0 {
            info!(count, "restored pending actions");
        }
        let queued = std::mem::replace(&mut self.actions, restored);
        self.actions.extend(queued);
        self.store = Some(store);
        self.persist();
        count
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn delivery_timeout(&self) -> Duration {
        self.delivery_timeout
    }

    /// Bounds each delivery attempt made by [`drain`](Self::drain).
    pub fn set_delivery_timeout(&mut self, timeout: Duration) {
        self.delivery_timeout = timeout;
    }

    /// Adds an action to the back of the queue.
    pub fn enqueue(&mut self, kind: impl Into<String>, payload: Value) -> ActionId {
        let action = PendingAction {
            id: ActionId::generate(),
            kind: kind.into(),
            payload,
            created_at: self.clock.now_ms(),
            attempts: 0,
            last_attempt_at: None,
            next_retry_at: None,
        };
        let id = action.id.clone();
        debug!(id = %id, kind = %action.kind, "queued action");
        self.actions.push(action);
        self.persist();
        id
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn pending(&self) -> &[PendingAction] {
        &self.actions
    }

    pub fn pending_ids(&self) -> Vec<ActionId> {
        self.actions.iter().map(|a| a.id.clone()).collect()
    }

    /// First action, in queue order, that is due now and not in `tried`.
    pub fn next_due(&self, tried: &HashSet<ActionId>) -> Option<&PendingAction> {
        let now = self.clock.now_ms();
        self.actions.iter().find(|a| a.is_due(now) && !tried.contains(&a.id))
    }

    /// Earliest scheduled retry, in wall milliseconds.
    pub fn next_retry_at(&self) -> Option<u64> {
        self.actions.iter().filter_map(|a| a.next_retry_at).min()
    }

    /// Seconds until the earliest scheduled retry, rounded up.
    pub fn next_retry_in_secs(&self) -> Option<u64> {
        let at = self.next_retry_at()?;
        let remaining_ms = at.saturating_sub(self.clock.now_ms());
        Some(remaining_ms.div_ceil(1000))
    }

    pub fn retry_count(&self) -> u32 {
        self.actions.iter().map(|a| a.attempts).max().unwrap_or(0)
    }

    pub fn progress(&self) -> QueueProgress {
        QueueProgress {
            len: self.len(),
            next_retry_in_secs: self.next_retry_in_secs(),
            retry_count: self.retry_count(),
        }
    }

    /// Attempts every due action once, in order, each bounded by the
    /// delivery timeout.
    ///
    /// Actions that are not yet due are left alone and reported as still
    /// pending. State is persisted after each attempt, so abandoning the
    /// returned future part way loses nothing.
    pub async fn drain<K: ActionSink + ?Sized>(&mut self, sink: &K) -> DrainReport {
        let mut report = DrainReport::default();
        let mut tried = HashSet::new();

        while let Some(action) = self.next_due(&tried).cloned() {
            tried.insert(action.id.clone());
            let result = deliver_within(sink, &action, self.delivery_timeout).await;
            if let Some(outcome) = self.record_attempt(&action.id, result) {
                report.record(action.id, outcome);
            }
        }

        report.still_pending = self.pending_ids();
        report
    }

    /// Applies the result of one delivery attempt.
    ///
    /// Returns `None` if the action is no longer queued.
    pub fn record_attempt(
        &mut self,
        id: &ActionId,
        result: Result<(), DeliveryError>,
    ) -> Option<AttemptOutcome> {
        let index = self.actions.iter().position(|a| &a.id == id)?;
        let now = self.clock.now_ms();

        let outcome = match result {
            Ok(()) => {
                self.actions.remove(index);
                debug!(id = %id, "delivered action");
                AttemptOutcome::Delivered
            }
            Err(e) => {
                let policy = self.policy;
                let action = &mut self.actions[index];
                action.attempts = action.attempts.saturating_add(1);
                action.last_attempt_at = Some(now);

                if policy.is_exhausted(action.attempts) {
                    let action = self.actions.remove(index);
                    warn!(
                        id = %action.id,
                        kind = %action.kind,
                        attempts = action.attempts,
                        error = %e,
                        "giving up on action"
                    );
                    AttemptOutcome::Failed(FailedAction { action, error: e.to_string() })
                } else {
                    let next_retry_at = policy.next_retry_at(now, action.attempts);
                    action.next_retry_at = Some(next_retry_at);
                    debug!(
                        id = %action.id,
                        attempts = action.attempts,
                        error = %e,
                        "delivery failed, will retry"
                    );
                    AttemptOutcome::Retrying { next_retry_at }
                }
            }
        };
        self.persist();
        Some(outcome)
    }

    fn persist(&self) {
        if let Some(store) = &self.store {
            if let Err(e) = write_json(&**store, PENDING_ACTIONS_KEY, &self.actions) {
                warn!(error = %e, "failed to persist pending actions");
            }
        }
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
