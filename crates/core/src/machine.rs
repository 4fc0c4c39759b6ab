// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connection state machine.
//!
//! Combines platform connectivity signals and liveness probe outcomes into a
//! single authoritative [`ConnectionState`]:
//!
//! ```text
//! signal            from            to
//! ─────────────────────────────────────────────────────────────
//! offline           any             Disconnected (failures = threshold)
//! online            Disconnected    Reconnecting (probe immediately)
//! probe ok          any             Connected    (failures = 0)
//! probe failed      any             Reconnecting, or Disconnected once
//!                                   failures reach the threshold
//! ```
//!
//! A single failed probe never takes a connected client straight to
//! `Disconnected`; only reaching the failure threshold without an intervening
//! success does.

use tracing::{debug, info};

use crate::clock::{ClockSource, SystemClock};
use crate::listeners::{Listeners, SubscriptionId};
use crate::quality::classify;
use crate::status::{ConnectionQuality, ConnectionState, LinkMetadata, NetworkStatus, ProbeOutcome};

/// Consecutive probe failures that move the machine to `Disconnected`.
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 3;

/// A state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    pub from: ConnectionState,
    pub to: ConnectionState,
}

/// What a signal did to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Update {
    /// Set when the signal changed the connection state.
    pub change: Option<StateChange>,
    /// Set when the caller should issue a liveness probe right away.
    pub probe_now: bool,
}

impl Update {
    /// True when the signal brought the connection back to `Connected`.
    pub fn restored(&self) -> bool {
        matches!(
            self.change,
            Some(StateChange { to: ConnectionState::Connected, .. })
        )
    }
}

/// The single owner of connection state.
pub struct ConnectionStateMachine<C: ClockSource = SystemClock> {
    clock: C,
    failure_threshold: u32,
    raw_online: bool,
    state: ConnectionState,
    consecutive_failures: u32,
    last_health_check_at: Option<u64>,
    last_transition_at: u64,
    last_latency_ms: Option<u32>,
    link: Option<LinkMetadata>,
    listeners: Listeners<NetworkStatus>,
}

impl ConnectionStateMachine<SystemClock> {
    /// Creates a machine using the system clock.
    pub fn new(raw_online: bool, link: Option<LinkMetadata>, failure_threshold: u32) -> Self {
        Self::with_clock(SystemClock, raw_online, link, failure_threshold)
    }
}

impl<C: ClockSource> ConnectionStateMachine<C> {
    /// Creates a machine with a custom clock source.
    ///
    /// Starts `Connected` when the platform reports online, else
    /// `Disconnected`. A zero threshold is treated as 1.
    pub fn with_clock(
        clock: C,
        raw_online: bool,
        link: Option<LinkMetadata>,
        failure_threshold: u32,
    ) -> Self {
        let failure_threshold = failure_threshold.max(1);
        let (state, consecutive_failures) = if raw_online {
            (ConnectionState::Connected, 0)
        } else {
            (ConnectionState::Disconnected, failure_threshold)
        };
        let now = clock.now_ms();

        ConnectionStateMachine {
            clock,
            failure_threshold,
            raw_online,
            state,
            consecutive_failures,
            last_health_check_at: None,
            last_transition_at: now,
            last_latency_ms: None,
            link,
            listeners: Listeners::new(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    pub fn raw_online(&self) -> bool {
        self.raw_online
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn failure_threshold(&self) -> u32 {
        self.failure_threshold
    }

    /// Current quality tier.
    pub fn quality(&self) -> ConnectionQuality {
        match self.state {
            ConnectionState::Disconnected => ConnectionQuality::Offline,
            ConnectionState::Reconnecting => ConnectionQuality::Poor,
            ConnectionState::Connected => {
                classify(self.raw_online, self.link.as_ref(), self.last_latency_ms)
            }
        }
    }

    /// Current snapshot.
    pub fn status(&self) -> NetworkStatus {
        self.snapshot(false)
    }

    /// Registers a callback invoked with every published snapshot.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&NetworkStatus) + Send + 'static,
    {
        self.listeners.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Platform reported the device offline.
    pub fn on_offline(&mut self) -> Update {
        self.raw_online = false;
        self.consecutive_failures = self.failure_threshold;
        let change = self.transition(ConnectionState::Disconnected);
        self.publish(false);
        Update { change, probe_now: false }
    }

    /// Platform reported the device online.
    ///
    /// From `Disconnected` this moves to `Reconnecting` and asks for an
    /// immediate probe; reachability is never assumed from the link alone.
    pub fn on_online(&mut self) -> Update {
        self.raw_online = true;
        let change = if self.state == ConnectionState::Disconnected {
            self.transition(ConnectionState::Reconnecting)
        } else {
            None
        };
        let probe_now = self.state != ConnectionState::Connected;
        self.publish(false);
        Update { change, probe_now }
    }

    /// Platform link metadata changed (or became unavailable).
    pub fn on_link_change(&mut self, link: Option<LinkMetadata>) -> Update {
        self.link = link;
        self.publish(false);
        Update::default()
    }

    /// Records a liveness probe outcome.
    ///
    /// Outcomes that land after the platform went offline are stale and
    /// ignored; the offline signal already decided the state.
    pub fn on_probe(&mut self, outcome: ProbeOutcome) -> Update {
        if !self.raw_online {
            debug!(?outcome, "discarding probe outcome received while offline");
            return Update::default();
        }

        self.last_health_check_at = Some(self.clock.now_ms());

        if outcome.reachable {
            self.consecutive_failures = 0;
            self.last_latency_ms = outcome.latency_ms;
            let change = self.transition(ConnectionState::Connected);
            let restored = change.is_some();
            self.publish(restored);
            return Update { change, probe_now: false };
        }

        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        let next = if self.consecutive_failures >= self.failure_threshold {
            ConnectionState::Disconnected
        } else {
            ConnectionState::Reconnecting
        };
        debug!(
            failures = self.consecutive_failures,
            threshold = self.failure_threshold,
            "liveness probe failed"
        );
        let change = self.transition(next);
        self.publish(false);
        Update { change, probe_now: false }
    }

    fn transition(&mut self, next: ConnectionState) -> Option<StateChange> {
        if self.state == next {
            return None;
        }
        let from = self.state;
        self.state = next;
        self.last_transition_at = self.clock.now_ms();
        info!(%from, to = %next, failures = self.consecutive_failures, "connection state changed");
        Some(StateChange { from, to: next })
    }

    fn publish(&mut self, was_offline: bool) {
        let status = self.snapshot(was_offline);
        self.listeners.notify(&status);
    }

    fn snapshot(&self, was_offline: bool) -> NetworkStatus {
        NetworkStatus {
            raw_online: self.raw_online,
            state: self.state,
            quality: self.quality(),
            consecutive_failures: self.consecutive_failures,
            last_health_check_at: self.last_health_check_at,
            last_transition_at: self.last_transition_at,
            link: self.link.clone(),
            was_offline,
        }
    }
}

#[cfg(test)]
#[path = "machine_tests.rs"]
mod tests;
