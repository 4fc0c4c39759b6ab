// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use serde::Serialize;
use serde_json::Value;
use tether_core::ClockSource;
use tether_store::{BackupInfo, KeyValueStore, SessionBackupStore};

use crate::config::Config;
use crate::error::Result;

use super::{open_store, print_json};

/// Stored backup summary as printed by `backup status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupStatus {
    pub present: bool,
    pub valid: bool,
    #[serde(flatten)]
    pub info: Option<BackupInfo>,
}

pub fn status(config: &Config) -> Result<()> {
    let backups: SessionBackupStore<_, Value> =
        SessionBackupStore::new(open_store()?, config.backup.policy());
    print_json(&status_impl(&backups))
}

pub fn clear(config: &Config) -> Result<()> {
    let backups: SessionBackupStore<_, Value> =
        SessionBackupStore::new(open_store()?, config.backup.policy());
    backups.clear();
    println!("Cleared session backup");
    Ok(())
}

pub(crate) fn status_impl<S, C>(backups: &SessionBackupStore<S, Value, C>) -> BackupStatus
where
    S: KeyValueStore,
    C: ClockSource,
{
    match backups.inspect() {
        Some(info) => BackupStatus { present: true, valid: info.is_valid(), info: Some(info) },
        None => BackupStatus { present: false, valid: false, info: None },
    }
}

#[cfg(test)]
#[path = "backup_tests.rs"]
mod tests;
