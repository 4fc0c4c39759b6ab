// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::probe::TransportError;

/// All possible errors that can occur in the tether runtime.
///
/// Connectivity failures never show up here; they are absorbed into
/// connection state. These are configuration, setup and I/O problems.
#[derive(Debug, Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("invalid config value for {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] tether_core::Error),

    #[error(transparent)]
    Storage(#[from] tether_store::StorageError),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("health endpoint unreachable: {0}\n  hint: check probe.base_url in the config file or pass --base-url")]
    Unreachable(String),

    #[error("supervisor is no longer running")]
    SupervisorClosed,
}

/// A specialized Result type for tether runtime operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
