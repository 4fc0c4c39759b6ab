// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Linux link sensor.
//!
//! Polls the kernel's network interface table under `/sys/class/net` and
//! feeds the result into a [`ConnectivityMonitor`]. A host without that
//! table is treated as always online with no link metadata.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tether_core::LinkMetadata;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::monitor::ConnectivityMonitor;

const LOOPBACK: &str = "lo";

/// One reading of the interface table.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkReading {
    pub online: bool,
    pub link: Option<LinkMetadata>,
}

pub struct LinkSensor {
    root: PathBuf,
    poll_interval: Duration,
}

impl LinkSensor {
    pub fn new(root: impl Into<PathBuf>, poll_interval: Duration) -> Self {
        LinkSensor { root: root.into(), poll_interval }
    }

    /// Reads the interface table once.
    ///
    /// Any non-loopback interface whose `operstate` is `up` and whose
    /// `carrier` is not `0` means online; the first such interface by name
    /// describes the link. A missing `carrier` file does not count against it.
    pub fn read(&self) -> LinkReading {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(root = %self.root.display(), error = %e, "interface table unavailable");
                return LinkReading { online: true, link: None };
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| name != LOOPBACK)
            .collect();
        names.sort();

        let up = names.into_iter().find(|name| is_up(&self.root.join(name)));
        match up {
            Some(name) => {
                LinkReading { online: true, link: Some(describe(&self.root.join(&name), &name)) }
            }
            None => LinkReading { online: false, link: None },
        }
    }

    /// Polls until cancelled, pushing each reading into `monitor`.
    pub async fn run(self, monitor: ConnectivityMonitor, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let reading = self.read();
                    monitor.set_link(reading.link);
                    monitor.set_online(reading.online);
                }
            }
        }
    }
}

fn is_up(iface: &Path) -> bool {
    let operstate_up =
        fs::read_to_string(iface.join("operstate")).is_ok_and(|state| state.trim() == "up");
    // carrier 0 means no link even when operstate reads up.
    let carrier_lost =
        fs::read_to_string(iface.join("carrier")).is_ok_and(|carrier| carrier.trim() == "0");
    operstate_up && !carrier_lost
}

fn describe(iface: &Path, name: &str) -> LinkMetadata {
    let wireless = iface.join("wireless").is_dir() || name.starts_with("wl");
    // `speed` is in Mb/s; virtual and disconnected links report -1 or fail to read.
    let downlink_mbps = fs::read_to_string(iface.join("speed"))
        .ok()
        .and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|speed| *speed > 0)
        .map(|speed| speed as f64);

    LinkMetadata {
        link_type: Some(if wireless { "wifi" } else { "ethernet" }.to_string()),
        effective_type: None,
        downlink_mbps,
        rtt_ms: None,
    }
}

#[cfg(test)]
#[path = "sensor_tests.rs"]
mod tests;
