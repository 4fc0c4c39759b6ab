// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transport abstraction for liveness requests.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::header::{CACHE_CONTROL, PRAGMA};

/// Error type for transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Client could not be constructed.
    #[error("client setup failed: {0}")]
    Setup(String),

    /// Request could not be completed.
    #[error("request failed: {0}")]
    RequestFailed(String),

    /// Request did not complete in time.
    #[error("request timed out")]
    Timeout,
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Issues bodiless liveness requests.
///
/// Implementations return the HTTP status code; interpreting it is the
/// prober's job.
pub trait Transport: Send + Sync {
    fn head(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = TransportResult<u16>> + Send + '_>>;
}

/// HTTP transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> TransportResult<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| TransportError::Setup(e.to_string()))?;
        Ok(HttpTransport { client })
    }

    /// Wraps an existing client so connection pools can be shared.
    pub fn with_client(client: reqwest::Client) -> Self {
        HttpTransport { client }
    }
}

impl Transport for HttpTransport {
    fn head(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = TransportResult<u16>> + Send + '_>> {
        let request = self
            .client
            .head(url)
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .timeout(timeout);
        Box::pin(async move {
            let response = request.send().await.map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout
                } else {
                    TransportError::RequestFailed(e.to_string())
                }
            })?;
            Ok(response.status().as_u16())
        })
    }
}
