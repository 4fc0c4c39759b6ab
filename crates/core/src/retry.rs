// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Exponential backoff policy for pending action retries.

use std::time::Duration;

use crate::error::{Error, Result};

/// Exponential backoff with a delay cap and an attempt limit.
///
/// After the `n`th failed attempt the next retry is scheduled
/// `min(base_delay * 2^n, max_delay)` later. Once `max_attempts` attempts have
/// failed the work is considered permanently failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    base_delay_ms: u64,
    max_delay_ms: u64,
    max_attempts: u32,
}

impl RetryPolicy {
    pub fn new(base_delay_ms: u64, max_delay_ms: u64, max_attempts: u32) -> Result<Self> {
        if max_attempts == 0 {
            return Err(Error::InvalidRetryPolicy("max_attempts must be at least 1".to_string()));
        }
        if base_delay_ms > max_delay_ms {
            return Err(Error::InvalidRetryPolicy(format!(
                "base delay {base_delay_ms}ms exceeds max delay {max_delay_ms}ms"
            )));
        }
        Ok(RetryPolicy { base_delay_ms, max_delay_ms, max_attempts })
    }

    pub fn base_delay_ms(&self) -> u64 {
        self.base_delay_ms
    }

    pub fn max_delay_ms(&self) -> u64 {
        self.max_delay_ms
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay to wait after `attempts` failed attempts.
    pub fn delay_for_attempt(&self, attempts: u32) -> Duration {
        let shift = attempts.min(20);
        let multiplier = 1_u64 << shift;
        let calculated = self.base_delay_ms.saturating_mul(multiplier);
        Duration::from_millis(calculated.min(self.max_delay_ms))
    }

    /// Absolute retry deadline for work that has failed `attempts` times.
    pub fn next_retry_at(&self, now_ms: u64, attempts: u32) -> u64 {
        now_ms.saturating_add(self.delay_for_attempt(attempts).as_millis() as u64)
    }

    /// Returns true once no further attempt is allowed.
    pub fn is_exhausted(&self, attempts: u32) -> bool {
        attempts >= self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy { base_delay_ms: 1_000, max_delay_ms: 30_000, max_attempts: 5 }
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
