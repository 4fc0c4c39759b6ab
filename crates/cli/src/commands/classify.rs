// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use tether_core::{classify, ConnectionQuality, EffectiveType, LinkMetadata};

use crate::error::Result;

/// Link readings supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct Readings {
    pub offline: bool,
    pub effective_type: Option<EffectiveType>,
    pub rtt_ms: Option<u32>,
    pub downlink: Option<f64>,
    pub latency_ms: Option<u32>,
}

pub fn run(readings: Readings) -> Result<()> {
    println!("{}", run_impl(&readings));
    Ok(())
}

pub(crate) fn run_impl(readings: &Readings) -> ConnectionQuality {
    let link = LinkMetadata {
        link_type: None,
        effective_type: readings.effective_type,
        downlink_mbps: readings.downlink,
        rtt_ms: readings.rtt_ms,
    };
    let link = (!link.is_empty()).then_some(link);
    classify(!readings.offline, link.as_ref(), readings.latency_ms)
}

#[cfg(test)]
#[path = "classify_tests.rs"]
mod tests;
