// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! tether-core: connectivity state primitives shared by the tether runtime.
//!
//! This crate holds everything that is pure or synchronous: the network status
//! model, the quality classifier, the connection state machine, the retry
//! policy and the clock abstraction. Nothing here performs I/O; the runtime
//! crate feeds signals in and publishes the resulting snapshots.

pub mod clock;
pub mod error;
pub mod listeners;
pub mod machine;
pub mod quality;
pub mod retry;
pub mod status;

pub use clock::{ClockSource, ManualClock, SystemClock};
pub use error::{Error, Result};
pub use listeners::{Listeners, SubscriptionId};
pub use machine::{ConnectionStateMachine, StateChange, Update, DEFAULT_FAILURE_THRESHOLD};
pub use quality::classify;
pub use retry::RetryPolicy;
pub use status::{
    ConnectionQuality, ConnectionState, EffectiveType, LinkMetadata, NetworkStatus, ProbeOutcome,
};
