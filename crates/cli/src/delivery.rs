// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Delivery of queued actions to the service.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::queue::PendingAction;

/// A delivery attempt failed; the action stays queued for retry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("delivery failed: {0}")]
pub struct DeliveryError(pub String);

/// Destination for pending actions.
pub trait ActionSink: Send + Sync {
    fn deliver<'a>(
        &'a self,
        action: &'a PendingAction,
    ) -> Pin<Box<dyn Future<Output = Result<(), DeliveryError>> + Send + 'a>>;
}

/// Runs one delivery attempt, failing it if `timeout` elapses first.
pub async fn deliver_within<K: ActionSink + ?Sized>(
    sink: &K,
    action: &PendingAction,
    timeout: Duration,
) -> Result<(), DeliveryError> {
    match tokio::time::timeout(timeout, sink.deliver(action)).await {
        Ok(result) => result,
        Err(_) => Err(DeliveryError(format!("timed out after {}ms", timeout.as_millis()))),
    }
}

/// POSTs each action as JSON to `<base_url>/actions`.
#[derive(Debug, Clone)]
pub struct HttpSink {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl HttpSink {
    pub fn new(client: reqwest::Client, base_url: &str, timeout: Duration) -> Self {
        let url = format!("{}/actions", base_url.trim_end_matches('/'));
        HttpSink { client, url, timeout }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ActionSink for HttpSink {
    fn deliver<'a>(
        &'a self,
        action: &'a PendingAction,
    ) -> Pin<Box<dyn Future<Output = Result<(), DeliveryError>> + Send + 'a>> {
        Box::pin(async move {
            self.client
                .post(&self.url)
                .json(action)
                .timeout(self.timeout)
                .send()
                .await
                .and_then(|r| r.error_for_status())
                .map_err(|e| DeliveryError(e.to_string()))?;
            Ok(())
        })
    }
}
