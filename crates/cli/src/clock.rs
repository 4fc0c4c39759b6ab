// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Wall clock driven by the tokio timer.

use tether_core::{ClockSource, SystemClock};
use tokio::time::Instant;

/// Wall clock anchored at construction and advanced by tokio time.
///
/// Timestamps stay consistent with `tokio::time` deadlines, including when
/// the runtime clock is paused and advanced manually.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeClock {
    anchor_wall_ms: u64,
    anchor: Instant,
}

impl RuntimeClock {
    pub fn new() -> Self {
        Self::starting_at(SystemClock.now_ms())
    }

    /// Anchors the clock at a fixed wall time.
    pub fn starting_at(wall_ms: u64) -> Self {
        RuntimeClock { anchor_wall_ms: wall_ms, anchor: Instant::now() }
    }
}

impl Default for RuntimeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockSource for RuntimeClock {
    fn now_ms(&self) -> u64 {
        let elapsed = self.anchor.elapsed().as_millis() as u64;
        self.anchor_wall_ms.saturating_add(elapsed)
    }
}
