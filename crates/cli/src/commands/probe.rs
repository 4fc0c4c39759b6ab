// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use serde::Serialize;
use tether_core::ProbeOutcome;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::probe::{HealthProber, HttpTransport, Transport};

use super::{print_json, runtime};

/// One probe result as printed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeReport {
    pub url: String,
    pub reachable: bool,
    pub latency_ms: Option<u32>,
}

pub fn run(config: &Config, timeout_ms: Option<u64>) -> Result<()> {
    let config = with_timeout(config, timeout_ms)?;
    let prober = HealthProber::new(
        HttpTransport::new()?,
        config.probe.health_url(),
        config.probe.timeout(),
    );

    let rt = runtime()?;
    let report = rt.block_on(run_impl(&prober));
    print_json(&report)?;

    if !report.reachable {
        return Err(Error::Unreachable(report.url));
    }
    Ok(())
}

/// Applies a `--timeout-ms` override, holding it to the same rules as the
/// config file.
pub(crate) fn with_timeout(config: &Config, timeout_ms: Option<u64>) -> Result<Config> {
    let Some(timeout_ms) = timeout_ms else {
        return Ok(config.clone());
    };
    let mut config = config.clone();
    config.probe.timeout_ms = timeout_ms;
    config.validate()?;
    Ok(config)
}

pub(crate) async fn run_impl<T: Transport>(prober: &HealthProber<T>) -> ProbeReport {
    let outcome = prober.probe().await.unwrap_or_else(ProbeOutcome::unreachable);
    ProbeReport {
        url: prober.url().to_string(),
        reachable: outcome.reachable,
        latency_ms: outcome.latency_ms,
    }
}

#[cfg(test)]
#[path = "probe_tests.rs"]
mod tests;
