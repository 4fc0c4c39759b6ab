// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for tether-core operations.

use thiserror::Error;

/// All possible errors that can occur in tether-core operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid effective type: '{0}'\n  hint: valid types are: slow-2g, 2g, 3g, 4g")]
    InvalidEffectiveType(String),

    #[error("invalid connection quality: '{0}'\n  hint: valid values are: excellent, good, fair, poor, offline")]
    InvalidQuality(String),

    #[error("invalid connection state: '{0}'\n  hint: valid states are: connected, reconnecting, disconnected")]
    InvalidState(String),

    #[error("invalid retry policy: {0}")]
    InvalidRetryPolicy(String),
}

/// A specialized Result type for tether-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
