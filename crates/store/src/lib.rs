// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! tether-store: persistence for the tether connectivity layer.
//!
//! A [`KeyValueStore`] backend (in memory or one file per key) carries
//! JSON records; [`SessionBackupStore`] and the preference accessors layer
//! best-effort, default-on-error policies on top of it.

pub mod backup;
pub mod error;
pub mod kv;
pub mod prefs;

pub use backup::{
    BackupInfo, BackupPolicy, SessionBackup, SessionBackupStore, SessionProgress,
    SESSION_BACKUP_KEY,
};
pub use error::{StorageError, StorageResult};
pub use kv::{load_or_default, read_json, write_json, FileStore, KeyValueStore, MemoryStore};
pub use prefs::{
    Bookmark, Bookmarks, StreakRecord, StreakTracker, VoicePreference, BOOKMARKS_KEY, STREAK_KEY,
    VOICE_PREFERENCE_KEY,
};
