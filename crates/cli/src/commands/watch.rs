// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `tether watch`: run the supervisor in the foreground.
//!
//! Status changes and drain results go to stdout as JSON lines. Actions
//! arrive on stdin, one `{"kind": ..., "payload": ...}` object per line.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tether_store::KeyValueStore;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::clock::RuntimeClock;
use crate::config::Config;
use crate::delivery::HttpSink;
use crate::error::Result;
use crate::monitor::ConnectivityMonitor;
use crate::probe::{HttpTransport, TransportError};
use crate::sensor::LinkSensor;
use crate::supervisor::{Supervisor, SupervisorEvent, SupervisorHandle};

use super::{open_store, print_json, runtime};

/// One action line read from stdin.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ActionInput {
    pub kind: String,
    #[serde(default)]
    pub payload: Value,
}

pub fn run(config: Config) -> Result<()> {
    let rt = runtime()?;
    let result = rt.block_on(watch(config));
    // The stdin reader blocks a worker thread; don't wait for it.
    rt.shutdown_background();
    result
}

async fn watch(config: Config) -> Result<()> {
    let store: Arc<dyn KeyValueStore> = Arc::new(open_store()?);

    let sensor = LinkSensor::new(&config.sensor.sysfs_root, config.sensor.poll_interval());
    let reading = sensor.read();
    let monitor = ConnectivityMonitor::new(reading.online, reading.link);

    let client = reqwest::Client::builder()
        .build()
        .map_err(|e| TransportError::Setup(e.to_string()))?;
    let transport = HttpTransport::with_client(client.clone());
    let sink = HttpSink::new(client, &config.probe.base_url, config.probe.timeout());

    let (supervisor, handle, mut events) =
        Supervisor::new(&config, monitor.clone(), transport, sink, RuntimeClock::new())?;
    let supervisor = supervisor.with_store(store);

    let cancel = CancellationToken::new();
    let sensor_task = tokio::spawn(sensor.run(monitor, cancel.clone()));
    let supervisor_task = tokio::spawn(supervisor.run(cancel.clone()));
    let input_task = tokio::spawn(read_actions(handle.clone()));

    print_json(&SupervisorEvent::StatusChanged(handle.status()))?;

    let result = loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                info!("interrupted, shutting down");
                break signal.map_err(Into::into);
            }
            event = events.recv() => match event {
                Ok(event) => {
                    if let Err(e) = print_json(&event) {
                        break Err(e);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "event output fell behind");
                }
                Err(broadcast::error::RecvError::Closed) => break Ok(()),
            },
        }
    };

    cancel.cancel();
    input_task.abort();
    let _ = sensor_task.await;
    let _ = supervisor_task.await;
    result
}

async fn read_actions(handle: SupervisorHandle) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                debug!("stdin closed");
                return;
            }
            Err(e) => {
                warn!(error = %e, "failed to read stdin");
                return;
            }
        };
        let input = match parse_action(&line) {
            Some(Ok(input)) => input,
            Some(Err(e)) => {
                warn!(error = %e, "ignoring malformed action line");
                continue;
            }
            None => continue,
        };
        match handle.submit(input.kind, input.payload).await {
            Ok(outcome) => info!(?outcome, "action submitted"),
            Err(e) => {
                warn!(error = %e, "supervisor stopped accepting actions");
                return;
            }
        }
    }
}

/// Parses one stdin line. Blank lines yield `None`.
pub(crate) fn parse_action(line: &str) -> Option<serde_json::Result<ActionInput>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    Some(serde_json::from_str(line))
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
