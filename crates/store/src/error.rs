// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for persistence backends.

use thiserror::Error;

/// Errors raised by a [`KeyValueStore`](crate::KeyValueStore) backend.
///
/// Policy layers (backups, preference records, the pending queue) collapse
/// these into defaults; only the raw store surfaces them.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed stored value: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid storage key: '{0}'\n  hint: keys may only contain letters, digits, '_' and '-'")]
    InvalidKey(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// A specialized Result type for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;
