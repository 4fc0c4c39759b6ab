// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test doubles for the runtime modules.

#![allow(clippy::unwrap_used)]

use std::collections::{HashSet, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::delivery::{ActionSink, DeliveryError};
use crate::probe::{Transport, TransportError, TransportResult};
use crate::queue::PendingAction;

/// Scripted reply for [`MockTransport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockResponse {
    Status(u16),
    Fail,
    /// Never completes; only a timeout ends the request.
    Hang,
}

/// Transport returning scripted responses. Clones share the script.
#[derive(Clone)]
pub struct MockTransport {
    script: Arc<Mutex<VecDeque<MockResponse>>>,
    fallback: Arc<Mutex<MockResponse>>,
    delay: Arc<Mutex<Duration>>,
    calls: Arc<AtomicUsize>,
}

impl MockTransport {
    /// Answers 200 unless scripted otherwise.
    pub fn new() -> Self {
        Self::answering(MockResponse::Status(200))
    }

    pub fn answering(fallback: MockResponse) -> Self {
        MockTransport {
            script: Arc::new(Mutex::new(VecDeque::new())),
            fallback: Arc::new(Mutex::new(fallback)),
            delay: Arc::new(Mutex::new(Duration::ZERO)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Queues a one-off response ahead of the fallback.
    pub fn push(&self, response: MockResponse) {
        self.script.lock().unwrap().push_back(response);
    }

    pub fn set_fallback(&self, response: MockResponse) {
        *self.fallback.lock().unwrap() = response;
    }

    /// Delays every response by `delay`.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Transport for MockTransport {
    fn head(
        &self,
        _url: &str,
        _timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = TransportResult<u16>> + Send + '_>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let response = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| *self.fallback.lock().unwrap());
        let delay = *self.delay.lock().unwrap();
        Box::pin(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            match response {
                MockResponse::Status(status) => Ok(status),
                MockResponse::Fail => Err(TransportError::RequestFailed("mock failure".into())),
                MockResponse::Hang => std::future::pending().await,
            }
        })
    }
}

/// Sink recording deliveries. Clones share state.
#[derive(Clone, Default)]
pub struct MockSink {
    delivered: Arc<Mutex<Vec<PendingAction>>>,
    attempts: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
    failing_kinds: Arc<Mutex<HashSet<String>>>,
    delay: Arc<Mutex<Duration>>,
}

impl MockSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every delivery fail until reset.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Makes deliveries of one action kind fail.
    pub fn fail_kind(&self, kind: &str) {
        self.failing_kinds.lock().unwrap().insert(kind.to_string());
    }

    /// Holds every delivery for `delay` before answering.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }

    pub fn delivered(&self) -> Vec<PendingAction> {
        self.delivered.lock().unwrap().clone()
    }

    pub fn delivered_kinds(&self) -> Vec<String> {
        self.delivered().into_iter().map(|a| a.kind).collect()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl ActionSink for MockSink {
    fn deliver<'a>(
        &'a self,
        action: &'a PendingAction,
    ) -> Pin<Box<dyn Future<Output = Result<(), DeliveryError>> + Send + 'a>> {
        let delay = *self.delay.lock().unwrap();
        Box::pin(async move {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let failing = self.failing.load(Ordering::SeqCst)
                || self.failing_kinds.lock().unwrap().contains(&action.kind);
            if failing {
                return Err(DeliveryError("mock rejection".to_string()));
            }
            self.delivered.lock().unwrap().push(action.clone());
            Ok(())
        })
    }
}
