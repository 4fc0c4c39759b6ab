// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Platform connectivity signals.
//!
//! [`ConnectivityMonitor`] holds the raw online flag and link metadata
//! reported by the platform. Sensors write into it; the supervisor
//! subscribes to it. Writes of an unchanged value are dropped, so
//! subscribers only ever see real changes.

use std::sync::{Arc, Mutex, MutexGuard};

use tether_core::{LinkMetadata, Listeners, SubscriptionId};
use tracing::debug;

/// A change reported by the platform.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectivityEvent {
    Online,
    Offline,
    /// New link metadata; `None` when the platform stopped reporting it.
    LinkChanged(Option<LinkMetadata>),
}

struct Inner {
    online: bool,
    link: Option<LinkMetadata>,
    listeners: Listeners<ConnectivityEvent>,
    shut_down: bool,
}

/// Shared handle to the platform connectivity state.
///
/// Callbacks run synchronously on the writer's thread while the monitor is
/// locked; they must not call back into the monitor.
#[derive(Clone)]
pub struct ConnectivityMonitor {
    inner: Arc<Mutex<Inner>>,
}

impl ConnectivityMonitor {
    pub fn new(online: bool, link: Option<LinkMetadata>) -> Self {
        ConnectivityMonitor {
            inner: Arc::new(Mutex::new(Inner {
                online,
                link,
                listeners: Listeners::new(),
                shut_down: false,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_online(&self) -> bool {
        self.lock().online
    }

    pub fn link(&self) -> Option<LinkMetadata> {
        self.lock().link.clone()
    }

    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    pub fn is_shut_down(&self) -> bool {
        self.lock().shut_down
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: FnMut(&ConnectivityEvent) + Send + 'static,
    {
        self.lock().listeners.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.lock().listeners.unsubscribe(id)
    }

    /// Records the platform online flag.
    pub fn set_online(&self, online: bool) {
        let mut inner = self.lock();
        if inner.shut_down || inner.online == online {
            return;
        }
        inner.online = online;
        debug!(online, "platform connectivity changed");
        let event = if online { ConnectivityEvent::Online } else { ConnectivityEvent::Offline };
        inner.listeners.notify(&event);
    }

    /// Records platform link metadata.
    pub fn set_link(&self, link: Option<LinkMetadata>) {
        let mut inner = self.lock();
        if inner.shut_down || inner.link == link {
            return;
        }
        inner.link = link.clone();
        inner.listeners.notify(&ConnectivityEvent::LinkChanged(link));
    }

    /// Drops every subscriber and ignores later updates.
    pub fn shutdown(&self) {
        let mut inner = self.lock();
        inner.shut_down = true;
        inner.listeners.clear();
    }
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
