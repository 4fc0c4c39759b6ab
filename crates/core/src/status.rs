// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Network status model published to consumers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Authoritative connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// Backend reachable; the last probe succeeded or none has failed yet.
    Connected,
    /// Link is up but the backend has not answered a probe yet.
    Reconnecting,
    /// No link, or the failure threshold has been reached.
    Disconnected,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Connected => "connected",
            ConnectionState::Reconnecting => "reconnecting",
            ConnectionState::Disconnected => "disconnected",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectionState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "connected" => Ok(ConnectionState::Connected),
            "reconnecting" => Ok(ConnectionState::Reconnecting),
            "disconnected" => Ok(ConnectionState::Disconnected),
            _ => Err(Error::InvalidState(s.to_string())),
        }
    }
}

/// Discrete connection quality tier.
///
/// Variants are declared worst-first so the derived ordering reads naturally:
/// `Offline < Poor < Fair < Good < Excellent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionQuality {
    Offline,
    Poor,
    Fair,
    Good,
    Excellent,
}

impl ConnectionQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionQuality::Offline => "offline",
            ConnectionQuality::Poor => "poor",
            ConnectionQuality::Fair => "fair",
            ConnectionQuality::Good => "good",
            ConnectionQuality::Excellent => "excellent",
        }
    }
}

impl fmt::Display for ConnectionQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectionQuality {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "offline" => Ok(ConnectionQuality::Offline),
            "poor" => Ok(ConnectionQuality::Poor),
            "fair" => Ok(ConnectionQuality::Fair),
            "good" => Ok(ConnectionQuality::Good),
            "excellent" => Ok(ConnectionQuality::Excellent),
            _ => Err(Error::InvalidQuality(s.to_string())),
        }
    }
}

/// Effective connection type as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectiveType {
    #[serde(rename = "slow-2g")]
    Slow2g,
    #[serde(rename = "2g")]
    TwoG,
    #[serde(rename = "3g")]
    ThreeG,
    #[serde(rename = "4g")]
    FourG,
}

impl EffectiveType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EffectiveType::Slow2g => "slow-2g",
            EffectiveType::TwoG => "2g",
            EffectiveType::ThreeG => "3g",
            EffectiveType::FourG => "4g",
        }
    }
}

impl fmt::Display for EffectiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EffectiveType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "slow-2g" => Ok(EffectiveType::Slow2g),
            "2g" => Ok(EffectiveType::TwoG),
            "3g" => Ok(EffectiveType::ThreeG),
            "4g" => Ok(EffectiveType::FourG),
            _ => Err(Error::InvalidEffectiveType(s.to_string())),
        }
    }
}

/// Optional link information supplied by the platform.
///
/// Every field is optional; platforms without a link-information API simply
/// never produce one of these.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkMetadata {
    /// Physical link type (for example `wifi` or `ethernet`).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub link_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_type: Option<EffectiveType>,
    /// Estimated downlink bandwidth in megabits per second.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downlink_mbps: Option<f64>,
    /// Estimated round-trip time in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rtt_ms: Option<u32>,
}

impl LinkMetadata {
    /// Returns true if no field carries information.
    pub fn is_empty(&self) -> bool {
        self.link_type.is_none()
            && self.effective_type.is_none()
            && self.downlink_mbps.is_none()
            && self.rtt_ms.is_none()
    }
}

/// Result of one liveness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    pub reachable: bool,
    /// Round-trip latency; only present for reachable probes.
    pub latency_ms: Option<u32>,
}

impl ProbeOutcome {
    pub fn reachable(latency_ms: u32) -> Self {
        ProbeOutcome { reachable: true, latency_ms: Some(latency_ms) }
    }

    pub fn unreachable() -> Self {
        ProbeOutcome { reachable: false, latency_ms: None }
    }
}

/// Snapshot of connectivity published on every signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkStatus {
    /// Platform-level online flag, before any reachability check.
    pub raw_online: bool,
    pub state: ConnectionState,
    pub quality: ConnectionQuality,
    pub consecutive_failures: u32,
    pub last_health_check_at: Option<u64>,
    pub last_transition_at: u64,
    pub link: Option<LinkMetadata>,
    /// True only on the snapshot that reports recovery into `Connected`.
    #[serde(default)]
    pub was_offline: bool,
}

impl NetworkStatus {
    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
