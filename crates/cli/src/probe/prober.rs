// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Single-flight liveness prober.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tether_core::ProbeOutcome;
use tokio::time::Instant;
use tracing::debug;

use super::transport::Transport;

/// Issues one liveness request at a time against a health endpoint.
pub struct HealthProber<T> {
    transport: T,
    url: String,
    timeout: Duration,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when the probe future finishes or is dropped.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<T: Transport> HealthProber<T> {
    pub fn new(transport: T, url: impl Into<String>, timeout: Duration) -> Self {
        HealthProber { transport, url: url.into(), timeout, in_flight: AtomicBool::new(false) }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Checks the endpoint once.
    ///
    /// Returns `None` without touching the network if another probe is still
    /// running. Only a 2xx status within the timeout counts as reachable.
    pub async fn probe(&self) -> Option<ProbeOutcome> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("probe already in flight, skipping");
            return None;
        }
        let _guard = InFlight(&self.in_flight);

        let started = Instant::now();
        let result =
            tokio::time::timeout(self.timeout, self.transport.head(&self.url, self.timeout)).await;

        let outcome = match result {
            Ok(Ok(status)) if (200..300).contains(&status) => {
                let latency = u32::try_from(started.elapsed().as_millis()).unwrap_or(u32::MAX);
                ProbeOutcome::reachable(latency)
            }
            Ok(Ok(status)) => {
                debug!(status, url = %self.url, "health endpoint returned non-success status");
                ProbeOutcome::unreachable()
            }
            Ok(Err(e)) => {
                debug!(error = %e, url = %self.url, "health request failed");
                ProbeOutcome::unreachable()
            }
            Err(_) => {
                debug!(timeout_ms = self.timeout.as_millis() as u64, "health request timed out");
                ProbeOutcome::unreachable()
            }
        };
        Some(outcome)
    }
}

#[cfg(test)]
#[path = "prober_tests.rs"]
mod tests;
