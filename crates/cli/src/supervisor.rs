// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The connectivity supervisor.
//!
//! One task owns the state machine and the pending queue. Everything else
//! talks to it through channels:
//!
//! ```text
//! ┌──────────────┐ events  ┌──────────────┐ spawn ┌──────────────┐
//! │   Monitor    │────────►│  Supervisor  │──────►│ HealthProber │
//! └──────────────┘         │ (run loop)   │◄──────│   (tasks)    │
//! ┌──────────────┐ command │              │outcome└──────────────┘
//! │    Handle    │────────►│ machine      │ drain ┌──────────────┐
//! └──────────────┘◄────────│ queue        │──────►│  ActionSink  │
//!       status / events    └──────────────┘       └──────────────┘
//! ```
//!
//! Probes and deliveries run as spawned tasks so platform events and handle
//! commands keep flowing while a request is outstanding. The queue drains
//! one action at a time when the machine enters `Connected` and again
//! whenever a scheduled retry comes due. Leaving `Connected` ends the pass
//! and abandons the delivery in flight without charging it an attempt.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tether_core::{ClockSource, ConnectionStateMachine, NetworkStatus, ProbeOutcome};
use tether_store::KeyValueStore;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinSet;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::clock::RuntimeClock;
use crate::config::Config;
use crate::delivery::{deliver_within, ActionSink, DeliveryError};
use crate::error::{Error, Result};
use crate::monitor::{ConnectivityEvent, ConnectivityMonitor};
use crate::probe::{HealthProber, Transport};
use crate::queue::{
    ActionId, AttemptOutcome, DrainReport, PendingAction, PendingActionQueue, QueueProgress,
};

const COMMAND_CAPACITY: usize = 32;
const EVENT_CAPACITY: usize = 64;

/// Notifications published to the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SupervisorEvent {
    /// A new status snapshot was published.
    StatusChanged(NetworkStatus),
    /// Connectivity came back after an outage.
    Restored(NetworkStatus),
    /// A drain pass finished.
    Drained { succeeded: usize, still_pending: usize, failed: usize },
    /// An action exhausted its retries and was removed from the queue.
    ActionFailed { action: PendingAction, error: String },
}

/// What happened to a submitted action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Delivered(ActionId),
    Queued(ActionId),
    Failed(ActionId),
}

enum Command {
    Submit { kind: String, payload: Value, reply: oneshot::Sender<SubmitOutcome> },
    ProbeNow,
    Progress { reply: oneshot::Sender<QueueProgress> },
}

/// Cloneable handle for talking to a running supervisor.
#[derive(Clone)]
pub struct SupervisorHandle {
    commands: mpsc::Sender<Command>,
    status: watch::Receiver<NetworkStatus>,
    events: broadcast::Sender<SupervisorEvent>,
}

impl SupervisorHandle {
    /// Queues an action and delivers it right away if connected.
    pub async fn submit(&self, kind: impl Into<String>, payload: Value) -> Result<SubmitOutcome> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Submit { kind: kind.into(), payload, reply }).await?;
        rx.await.map_err(|_| Error::SupervisorClosed)
    }

    /// Requests an immediate liveness probe. Ignored while offline.
    pub async fn probe_now(&self) -> Result<()> {
        self.send(Command::ProbeNow).await
    }

    pub async fn progress(&self) -> Result<QueueProgress> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Progress { reply }).await?;
        rx.await.map_err(|_| Error::SupervisorClosed)
    }

    /// Latest published status.
    pub fn status(&self) -> NetworkStatus {
        self.status.borrow().clone()
    }

    pub fn watch_status(&self) -> watch::Receiver<NetworkStatus> {
        self.status.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SupervisorEvent> {
        self.events.subscribe()
    }

    async fn send(&self, command: Command) -> Result<()> {
        self.commands.send(command).await.map_err(|_| Error::SupervisorClosed)
    }
}

type Probes = JoinSet<Option<ProbeOutcome>>;
type Deliveries = JoinSet<(ActionId, std::result::Result<(), DeliveryError>)>;

/// Bookkeeping for the drain pass in progress.
#[derive(Default)]
struct DrainPass {
    report: DrainReport,
    tried: HashSet<ActionId>,
    waiters: HashMap<ActionId, oneshot::Sender<SubmitOutcome>>,
}

pub struct Supervisor<T, K, C: ClockSource = RuntimeClock> {
    machine: ConnectionStateMachine<C>,
    queue: PendingActionQueue<C>,
    pass: Option<DrainPass>,
    clock: C,
    prober: Arc<HealthProber<T>>,
    sink: Arc<K>,
    monitor: ConnectivityMonitor,
    connectivity: mpsc::UnboundedReceiver<ConnectivityEvent>,
    commands: mpsc::Receiver<Command>,
    events: broadcast::Sender<SupervisorEvent>,
    interval: Duration,
}

impl<T, K, C> Supervisor<T, K, C>
where
    T: Transport + 'static,
    K: ActionSink + 'static,
    C: ClockSource + Clone + 'static,
{
    /// Builds a supervisor seeded from the monitor's current readings.
    ///
    /// Returns the supervisor, a handle, and an event receiver subscribed
    /// before anything can be published.
    pub fn new(
        config: &Config,
        monitor: ConnectivityMonitor,
        transport: T,
        sink: K,
        clock: C,
    ) -> Result<(Self, SupervisorHandle, broadcast::Receiver<SupervisorEvent>)> {
        let policy = config.retry.policy()?;
        let mut machine = ConnectionStateMachine::with_clock(
            clock.clone(),
            monitor.is_online(),
            monitor.link(),
            config.probe.failure_threshold,
        );
        let mut queue = PendingActionQueue::with_clock(policy, clock.clone());
        queue.set_delivery_timeout(config.probe.timeout());
        let prober = HealthProber::new(transport, config.probe.health_url(), config.probe.timeout());

        let (status_tx, status_rx) = watch::channel(machine.status());
        let (events, events_rx) = broadcast::channel(EVENT_CAPACITY);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CAPACITY);
        let (connectivity_tx, connectivity_rx) = mpsc::unbounded_channel();

        let publisher = events.clone();
        machine.subscribe(move |status| {
            status_tx.send_replace(status.clone());
            let _ = publisher.send(SupervisorEvent::StatusChanged(status.clone()));
            if status.was_offline {
                let _ = publisher.send(SupervisorEvent::Restored(status.clone()));
            }
        });
        monitor.subscribe(move |event| {
            let _ = connectivity_tx.send(event.clone());
        });

        let supervisor = Supervisor {
            machine,
            queue,
            pass: None,
            clock,
            prober: Arc::new(prober),
            sink: Arc::new(sink),
            monitor,
            connectivity: connectivity_rx,
            commands: command_rx,
            events: events.clone(),
            interval: config.probe.interval(),
        };
        let handle = SupervisorHandle { commands: command_tx, status: status_rx, events };
        Ok((supervisor, handle, events_rx))
    }

    /// Persists the pending queue in `store`, restoring what it holds.
    pub fn with_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.queue.attach_store(store);
        self
    }

    /// Runs until `cancel` fires, then aborts in-flight probes and
    /// deliveries and shuts the monitor down.
    pub async fn run(mut self, cancel: CancellationToken) {
        let mut probes = Probes::new();
        let mut deliveries = Deliveries::new();
        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            state = %self.machine.state(),
            pending = self.queue.len(),
            url = %self.prober.url(),
            "supervisor started"
        );
        self.start_drain(&mut deliveries);

        loop {
            let online = self.machine.raw_online();
            let retry_at = if self.machine.is_connected() && self.pass.is_none() {
                self.retry_deadline()
            } else {
                None
            };

            tokio::select! {
                _ = cancel.cancelled() => break,

                Some(event) = self.connectivity.recv() => {
                    self.on_connectivity(event, &mut probes, &mut ticker);
                    self.sync_drain(&mut deliveries);
                }

                Some(joined) = probes.join_next(), if !probes.is_empty() => {
                    match joined {
                        Ok(Some(outcome)) => {
                            self.machine.on_probe(outcome);
                            self.sync_drain(&mut deliveries);
                        }
                        Ok(None) => {}
                        Err(e) if e.is_cancelled() => {}
                        Err(e) => warn!(error = %e, "probe task failed"),
                    }
                }

                Some(joined) = deliveries.join_next(), if !deliveries.is_empty() => {
                    match joined {
                        Ok((id, result)) => self.on_delivered(id, result),
                        Err(e) if e.is_cancelled() => {}
                        Err(e) => warn!(error = %e, "delivery task failed"),
                    }
                    self.advance_drain(&mut deliveries);
                }

                Some(command) = self.commands.recv() => {
                    self.on_command(command, &mut probes, &mut deliveries);
                }

                _ = ticker.tick(), if online => {
                    debug!("health check tick");
                    self.spawn_probe(&mut probes);
                }

                _ = async {
                    match retry_at {
                        Some(deadline) => tokio::time::sleep_until(deadline).await,
                        None => std::future::pending().await,
                    }
                }, if retry_at.is_some() => {
                    self.start_drain(&mut deliveries);
                }
            }
        }

        probes.abort_all();
        deliveries.abort_all();
        self.monitor.shutdown();
        info!("supervisor stopped");
    }

    fn on_connectivity(
        &mut self,
        event: ConnectivityEvent,
        probes: &mut Probes,
        ticker: &mut tokio::time::Interval,
    ) {
        match event {
            ConnectivityEvent::Online => {
                let update = self.machine.on_online();
                ticker.reset();
                if update.probe_now {
                    self.spawn_probe(probes);
                }
            }
            ConnectivityEvent::Offline => {
                probes.abort_all();
                self.machine.on_offline();
            }
            ConnectivityEvent::LinkChanged(link) => {
                self.machine.on_link_change(link);
            }
        }
    }

    fn on_command(&mut self, command: Command, probes: &mut Probes, deliveries: &mut Deliveries) {
        match command {
            Command::Submit { kind, payload, reply } => {
                let id = self.queue.enqueue(kind, payload);
                if !self.machine.is_connected() {
                    let _ = reply.send(SubmitOutcome::Queued(id));
                    return;
                }
                self.pass.get_or_insert_with(DrainPass::default).waiters.insert(id, reply);
                self.advance_drain(deliveries);
            }
            Command::ProbeNow => {
                if self.machine.raw_online() {
                    self.spawn_probe(probes);
                } else {
                    debug!("ignoring probe request while offline");
                }
            }
            Command::Progress { reply } => {
                let _ = reply.send(self.queue.progress());
            }
        }
    }

    fn spawn_probe(&self, probes: &mut Probes) {
        let prober = Arc::clone(&self.prober);
        probes.spawn(async move { prober.probe().await });
    }

    /// Tokio deadline of the earliest scheduled retry.
    fn retry_deadline(&self) -> Option<Instant> {
        let at = self.queue.next_retry_at()?;
        let wait = at.saturating_sub(self.clock.now_ms());
        Some(Instant::now() + Duration::from_millis(wait))
    }

    /// Starts a pass if connected, or ends the current one if not.
    fn sync_drain(&mut self, deliveries: &mut Deliveries) {
        if self.machine.is_connected() {
            self.start_drain(deliveries);
        } else if self.pass.is_some() {
            info!(pending = self.queue.len(), "connection lost, pausing drain");
            self.finish_drain(deliveries);
        }
    }

    fn start_drain(&mut self, deliveries: &mut Deliveries) {
        if self.pass.is_some() || !self.machine.is_connected() {
            return;
        }
        if self.queue.next_due(&HashSet::new()).is_none() {
            return;
        }
        self.pass = Some(DrainPass::default());
        self.advance_drain(deliveries);
    }

    /// Spawns the next due delivery, or closes the pass when none is left.
    fn advance_drain(&mut self, deliveries: &mut Deliveries) {
        if !deliveries.is_empty() {
            return;
        }
        let Some(pass) = self.pass.as_mut() else {
            return;
        };
        let Some(action) = self.queue.next_due(&pass.tried).cloned() else {
            self.finish_drain(deliveries);
            return;
        };

        pass.tried.insert(action.id.clone());
        let sink = Arc::clone(&self.sink);
        let timeout = self.queue.delivery_timeout();
        deliveries.spawn(async move {
            let result = deliver_within(&*sink, &action, timeout).await;
            (action.id, result)
        });
    }

    fn on_delivered(&mut self, id: ActionId, result: std::result::Result<(), DeliveryError>) {
        let Some(outcome) = self.queue.record_attempt(&id, result) else {
            return;
        };
        if let AttemptOutcome::Failed(failed) = &outcome {
            let _ = self.events.send(SupervisorEvent::ActionFailed {
                action: failed.action.clone(),
                error: failed.error.clone(),
            });
        }
        let Some(pass) = self.pass.as_mut() else {
            return;
        };
        if let Some(reply) = pass.waiters.remove(&id) {
            let _ = reply.send(match &outcome {
                AttemptOutcome::Delivered => SubmitOutcome::Delivered(id.clone()),
                AttemptOutcome::Retrying { .. } => SubmitOutcome::Queued(id.clone()),
                AttemptOutcome::Failed(_) => SubmitOutcome::Failed(id.clone()),
            });
        }
        pass.report.record(id, outcome);
    }

    /// Ends the pass: abandons any delivery in flight and publishes the report.
    fn finish_drain(&mut self, deliveries: &mut Deliveries) {
        deliveries.abort_all();
        let Some(pass) = self.pass.take() else {
            return;
        };
        let mut report = pass.report;
        report.still_pending = self.queue.pending_ids();

        for (id, reply) in pass.waiters {
            let _ = reply.send(SubmitOutcome::Queued(id));
        }
        if report.is_empty() {
            return;
        }
        info!(
            succeeded = report.succeeded.len(),
            still_pending = report.still_pending.len(),
            failed = report.failed.len(),
            "drained pending actions"
        );
        let _ = self.events.send(SupervisorEvent::Drained {
            succeeded: report.succeeded.len(),
            still_pending: report.still_pending.len(),
            failed: report.failed.len(),
        });
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
