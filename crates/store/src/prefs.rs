// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Typed accessors for small persisted preference records.
//!
//! Reads never fail: absent or unreadable records yield defaults. Writes are
//! best-effort and only logged on failure.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::kv::{load_or_default, write_json, KeyValueStore};

pub const STREAK_KEY: &str = "streak";
pub const BOOKMARKS_KEY: &str = "bookmarks";
pub const VOICE_PREFERENCE_KEY: &str = "voice_preference";

fn save<T: Serialize + ?Sized>(store: &impl KeyValueStore, key: &str, value: &T) {
    if let Err(e) = write_json(store, key, value) {
        warn!(key, error = %e, "failed to persist record");
    }
}

/// Daily practice streak counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StreakRecord {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_practice_date: Option<NaiveDate>,
    pub total_sessions: u32,
}

impl StreakRecord {
    /// Counts a session held on `today`.
    pub fn record(&mut self, today: NaiveDate) {
        self.total_sessions = self.total_sessions.saturating_add(1);

        match self.last_practice_date {
            Some(last) if last >= today => return,
            Some(last) if today.pred_opt() == Some(last) => {
                self.current_streak = self.current_streak.saturating_add(1);
            }
            _ => self.current_streak = 1,
        }

        self.last_practice_date = Some(today);
        self.longest_streak = self.longest_streak.max(self.current_streak);
    }

    /// Streak as seen on `today`: zero once a whole day has been missed.
    pub fn current(&self, today: NaiveDate) -> u32 {
        match self.last_practice_date {
            Some(last) if last >= today || today.pred_opt() == Some(last) => self.current_streak,
            _ => 0,
        }
    }
}

/// Persists a [`StreakRecord`] under the `streak` key.
pub struct StreakTracker<S> {
    store: S,
}

impl<S: KeyValueStore> StreakTracker<S> {
    pub fn new(store: S) -> Self {
        StreakTracker { store }
    }

    pub fn load(&self) -> StreakRecord {
        load_or_default(&self.store, STREAK_KEY)
    }

    /// Records a session and returns the updated counters.
    pub fn record_session(&self, today: NaiveDate) -> StreakRecord {
        let mut record = self.load();
        record.record(today);
        save(&self.store, STREAK_KEY, &record);
        record
    }

    pub fn current_streak(&self, today: NaiveDate) -> u32 {
        self.load().current(today)
    }
}

/// A saved item. Everything beyond `id` is kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Bookmark {
    pub fn new(id: impl Into<String>) -> Self {
        Bookmark { id: id.into(), fields: Map::new() }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }
}

/// Ordered bookmark list under the `bookmarks` key.
pub struct Bookmarks<S> {
    store: S,
}

impl<S: KeyValueStore> Bookmarks<S> {
    pub fn new(store: S) -> Self {
        Bookmarks { store }
    }

    pub fn list(&self) -> Vec<Bookmark> {
        load_or_default(&self.store, BOOKMARKS_KEY)
    }

    /// Appends `bookmark`, or replaces the entry with the same id in place.
    pub fn add(&self, bookmark: Bookmark) {
        let mut list = self.list();
        match list.iter_mut().find(|b| b.id == bookmark.id) {
            Some(existing) => *existing = bookmark,
            None => list.push(bookmark),
        }
        save(&self.store, BOOKMARKS_KEY, &list);
    }

    /// Returns true if a bookmark was removed.
    pub fn remove(&self, id: &str) -> bool {
        let mut list = self.list();
        let before = list.len();
        list.retain(|b| b.id != id);
        if list.len() == before {
            return false;
        }
        save(&self.store, BOOKMARKS_KEY, &list);
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.list().iter().any(|b| b.id == id)
    }
}

/// Selected voice id under the `voice_preference` key.
pub struct VoicePreference<S> {
    store: S,
}

impl<S: KeyValueStore> VoicePreference<S> {
    pub fn new(store: S) -> Self {
        VoicePreference { store }
    }

    pub fn get(&self) -> Option<String> {
        load_or_default(&self.store, VOICE_PREFERENCE_KEY)
    }

    pub fn set(&self, voice_id: &str) {
        save(&self.store, VOICE_PREFERENCE_KEY, voice_id);
    }

    pub fn clear(&self) {
        if let Err(e) = self.store.remove(VOICE_PREFERENCE_KEY) {
            warn!(error = %e, "failed to clear voice preference");
        }
    }
}

#[cfg(test)]
#[path = "prefs_tests.rs"]
mod tests;
