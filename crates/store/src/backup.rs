// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Versioned session backups.
//!
//! A backup is the host's session object with `version` and `timestamp`
//! fields added at the top level:
//!
//! ```json
//! {"version": 1, "timestamp": 1760000000000, "step": 4, "answers": []}
//! ```
//!
//! The store never interprets the session fields. A record written by a
//! different schema version, older than the maximum age, or that fails to
//! parse is deleted on read and reported as absent.

use std::marker::PhantomData;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tether_core::{ClockSource, SystemClock};
use tracing::{debug, info, warn};

use crate::kv::{write_json, KeyValueStore};

/// Storage key holding the session backup.
pub const SESSION_BACKUP_KEY: &str = "session_backup";

/// Implemented by session types that can tell whether any work was done.
pub trait SessionProgress {
    /// Progress indicator; zero means nothing worth restoring.
    fn progress(&self) -> u64;
}

/// A session snapshot plus its backup header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionBackup<T> {
    pub version: u32,
    /// Milliseconds since the Unix epoch at save time.
    pub timestamp: u64,
    #[serde(flatten)]
    pub session: T,
}

#[derive(Deserialize)]
struct Header {
    version: u32,
    timestamp: u64,
}

/// Schema version and maximum age accepted on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackupPolicy {
    pub version: u32,
    pub max_age: Duration,
}

impl Default for BackupPolicy {
    fn default() -> Self {
        BackupPolicy { version: 1, max_age: Duration::from_secs(24 * 60 * 60) }
    }
}

/// What is stored, without interpreting the session fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupInfo {
    pub version: u32,
    pub expected_version: u32,
    pub timestamp: u64,
    pub age_ms: u64,
    pub version_matches: bool,
    pub expired: bool,
}

impl BackupInfo {
    /// True when `load` would return the record.
    pub fn is_valid(&self) -> bool {
        self.version_matches && !self.expired
    }
}

/// Best-effort persistence of one session snapshot.
pub struct SessionBackupStore<S, T, C = SystemClock> {
    store: S,
    policy: BackupPolicy,
    clock: C,
    _session: PhantomData<fn() -> T>,
}

impl<S: KeyValueStore, T> SessionBackupStore<S, T, SystemClock> {
    pub fn new(store: S, policy: BackupPolicy) -> Self {
        Self::with_clock(store, policy, SystemClock)
    }
}

impl<S: KeyValueStore, T, C: ClockSource> SessionBackupStore<S, T, C> {
    pub fn with_clock(store: S, policy: BackupPolicy, clock: C) -> Self {
        SessionBackupStore { store, policy, clock, _session: PhantomData }
    }

    pub fn policy(&self) -> BackupPolicy {
        self.policy
    }

    /// Deletes the stored backup. Failures are logged.
    pub fn clear(&self) {
        if let Err(e) = self.store.remove(SESSION_BACKUP_KEY) {
            warn!(error = %e, "failed to clear session backup");
        }
    }

    /// Reads the backup header without validating or clearing anything.
    pub fn inspect(&self) -> Option<BackupInfo> {
        let raw = self.read_raw()?;
        let header: Header = match serde_json::from_str(&raw) {
            Ok(header) => header,
            Err(e) => {
                debug!(error = %e, "session backup header unreadable");
                return None;
            }
        };
        let age_ms = self.clock.now_ms().saturating_sub(header.timestamp);
        Some(BackupInfo {
            version: header.version,
            expected_version: self.policy.version,
            timestamp: header.timestamp,
            age_ms,
            version_matches: header.version == self.policy.version,
            expired: self.is_expired(age_ms),
        })
    }

    fn is_expired(&self, age_ms: u64) -> bool {
        u128::from(age_ms) > self.policy.max_age.as_millis()
    }

    fn read_raw(&self) -> Option<String> {
        match self.store.get(SESSION_BACKUP_KEY) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "failed to read session backup");
                None
            }
        }
    }
}

impl<S: KeyValueStore, T: Serialize, C: ClockSource> SessionBackupStore<S, T, C> {
    /// Stores `session` stamped with the current version and time.
    ///
    /// Failures are logged and otherwise ignored.
    pub fn save(&self, session: &T) {
        let backup = SessionBackup {
            version: self.policy.version,
            timestamp: self.clock.now_ms(),
            session,
        };
        if let Err(e) = write_json(&self.store, SESSION_BACKUP_KEY, &backup) {
            warn!(error = %e, "failed to save session backup");
        }
    }
}

impl<S: KeyValueStore, T: DeserializeOwned, C: ClockSource> SessionBackupStore<S, T, C> {
    /// Returns the stored backup if it is current.
    ///
    /// Version is checked before age. A rejected or malformed record is
    /// removed from storage.
    pub fn load(&self) -> Option<SessionBackup<T>> {
        let raw = self.read_raw()?;

        let header: Header = match serde_json::from_str(&raw) {
            Ok(header) => header,
            Err(e) => {
                warn!(error = %e, "discarding malformed session backup");
                self.clear();
                return None;
            }
        };

        if header.version != self.policy.version {
            info!(
                found = header.version,
                expected = self.policy.version,
                "discarding session backup from another version"
            );
            self.clear();
            return None;
        }

        let age_ms = self.clock.now_ms().saturating_sub(header.timestamp);
        if self.is_expired(age_ms) {
            info!(age_ms, "discarding expired session backup");
            self.clear();
            return None;
        }

        match serde_json::from_str(&raw) {
            Ok(backup) => Some(backup),
            Err(e) => {
                warn!(error = %e, "discarding session backup with unreadable fields");
                self.clear();
                None
            }
        }
    }
}

impl<S, T, C> SessionBackupStore<S, T, C>
where
    S: KeyValueStore,
    T: DeserializeOwned + SessionProgress,
    C: ClockSource,
{
    /// True when a current backup exists and records some progress.
    pub fn has_valid_backup(&self) -> bool {
        self.load().is_some_and(|b| b.session.progress() > 0)
    }
}

#[cfg(test)]
#[path = "backup_tests.rs"]
mod tests;
