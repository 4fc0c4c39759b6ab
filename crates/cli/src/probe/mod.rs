// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Liveness probing.
//!
//! A platform "online" flag only says a link exists. The prober checks that
//! the service is actually reachable by issuing a bounded, bodiless request
//! to its health endpoint through an injectable [`Transport`].

mod prober;
mod transport;

pub use prober::HealthProber;
pub use transport::{HttpTransport, Transport, TransportError, TransportResult};
