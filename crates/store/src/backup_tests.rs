// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::kv::MemoryStore;
use tether_core::ManualClock;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Lesson {
    step: u64,
    answers: Vec<String>,
}

impl SessionProgress for Lesson {
    fn progress(&self) -> u64 {
        self.step
    }
}

const DAY_MS: u64 = 24 * 60 * 60 * 1000;

fn backup_store(
    store: &MemoryStore,
    clock: &ManualClock,
) -> SessionBackupStore<MemoryStore, Lesson, ManualClock> {
    SessionBackupStore::with_clock(store.clone(), BackupPolicy::default(), clock.clone())
}

fn lesson(step: u64) -> Lesson {
    Lesson { step, answers: vec!["a".to_string()] }
}

#[test]
fn save_then_load_adds_header() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(5_000);
    let backups = backup_store(&store, &clock);

    backups.save(&lesson(3));
    let loaded = backups.load().unwrap();

    assert_eq!(loaded, SessionBackup { version: 1, timestamp: 5_000, session: lesson(3) });
}

#[test]
fn session_fields_are_flattened() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(7);
    backup_store(&store, &clock).save(&lesson(2));

    let raw: serde_json::Value =
        serde_json::from_str(&store.get(SESSION_BACKUP_KEY).unwrap().unwrap()).unwrap();

    assert_eq!(
        raw,
        serde_json::json!({"version": 1, "timestamp": 7, "step": 2, "answers": ["a"]})
    );
}

#[test]
fn expired_backup_is_cleared() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(0);
    let backups = backup_store(&store, &clock);
    backups.save(&lesson(1));

    clock.set(DAY_MS + 1);

    assert_eq!(backups.load(), None);
    assert!(store.is_empty());
}

#[test]
fn backup_exactly_max_age_old_is_kept() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(0);
    let backups = backup_store(&store, &clock);
    backups.save(&lesson(1));

    clock.set(DAY_MS);

    assert!(backups.load().is_some());
}

#[test]
fn version_mismatch_is_cleared() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(0);
    let old = SessionBackupStore::<_, Lesson, _>::with_clock(
        store.clone(),
        BackupPolicy { version: 1, ..BackupPolicy::default() },
        clock.clone(),
    );
    old.save(&lesson(4));

    let new = SessionBackupStore::<_, Lesson, _>::with_clock(
        store.clone(),
        BackupPolicy { version: 2, ..BackupPolicy::default() },
        clock.clone(),
    );

    assert_eq!(new.load(), None);
    assert!(store.is_empty());
}

#[test]
fn version_is_checked_before_age() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(10 * DAY_MS);
    store
        .set(SESSION_BACKUP_KEY, r#"{"version": 9, "timestamp": 0, "step": 1, "answers": []}"#)
        .unwrap();
    let backups = backup_store(&store, &clock);

    let info = backups.inspect().unwrap();
    assert!(!info.version_matches);
    assert!(info.expired);
    assert!(!info.is_valid());

    assert_eq!(backups.load(), None);
    assert!(store.is_empty());
}

#[test]
fn malformed_backup_is_cleared() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(0);
    store.set(SESSION_BACKUP_KEY, "{broken").unwrap();

    assert_eq!(backup_store(&store, &clock).load(), None);
    assert!(store.is_empty());
}

#[test]
fn header_ok_but_session_unreadable_is_cleared() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(0);
    store.set(SESSION_BACKUP_KEY, r#"{"version": 1, "timestamp": 0, "step": "x"}"#).unwrap();

    assert_eq!(backup_store(&store, &clock).load(), None);
    assert!(store.is_empty());
}

#[test]
fn valid_backup_requires_progress() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(0);
    let backups = backup_store(&store, &clock);

    assert!(!backups.has_valid_backup());

    backups.save(&lesson(0));
    assert!(!backups.has_valid_backup());

    backups.save(&lesson(1));
    assert!(backups.has_valid_backup());
}

#[test]
fn inspect_does_not_clear() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(0);
    let backups = backup_store(&store, &clock);
    backups.save(&lesson(1));
    clock.set(2 * DAY_MS);

    let info = backups.inspect().unwrap();

    assert_eq!(info.age_ms, 2 * DAY_MS);
    assert!(info.expired);
    assert!(!store.is_empty());
}

#[test]
fn clear_removes_backup() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(0);
    let backups = backup_store(&store, &clock);
    backups.save(&lesson(1));

    backups.clear();

    assert!(backups.inspect().is_none());
    backups.clear();
}
