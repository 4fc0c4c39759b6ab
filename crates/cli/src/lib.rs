// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! tether - connectivity resilience runtime.
//!
//! This crate drives the pure state machine in `tether-core` with real
//! signals: a Linux link sensor, an HTTP liveness prober, and a supervisor
//! that owns the pending action queue and delivers it once the service is
//! reachable again.
//!
//! # Main Components
//!
//! - [`ConnectivityMonitor`] - platform online/offline and link metadata events
//! - [`HealthProber`] - single-flight liveness probe over a [`Transport`]
//! - [`PendingActionQueue`] - durable FIFO of actions awaiting delivery
//! - [`Supervisor`] - the task tying them together
//! - [`Config`] - TOML configuration
//!
//! # Embedding
//!
//! ```rust,ignore
//! use tether::{Config, ConnectivityMonitor, HttpTransport, Supervisor, RuntimeClock};
//!
//! let config = Config::load(&tether::config::config_path(None))?;
//! let monitor = ConnectivityMonitor::new(true, None);
//! let (supervisor, handle, events) =
//!     Supervisor::new(&config, monitor.clone(), HttpTransport::new()?, sink, RuntimeClock::new())?;
//! tokio::spawn(supervisor.run(cancel.clone()));
//! handle.submit("save_note", serde_json::json!({"text": "hi"})).await?;
//! ```

mod cli;
mod commands;

pub mod clock;
pub mod config;
pub mod delivery;
pub mod env;
pub mod error;
pub mod monitor;
pub mod probe;
pub mod queue;
pub mod sensor;
pub mod supervisor;

#[cfg(test)]
mod test_helpers;

pub use cli::{BackupCommand, Cli, Command};
pub use clock::RuntimeClock;
pub use config::Config;
pub use delivery::{ActionSink, DeliveryError, HttpSink};
pub use error::{Error, Result};
pub use monitor::{ConnectivityEvent, ConnectivityMonitor};
pub use probe::{HealthProber, HttpTransport, Transport, TransportError};
pub use queue::{ActionId, DrainReport, PendingAction, PendingActionQueue, QueueProgress};
pub use sensor::{LinkReading, LinkSensor};
pub use supervisor::{SubmitOutcome, Supervisor, SupervisorEvent, SupervisorHandle};

use commands::classify::Readings;

/// Runs one parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    let explicit = cli.config.as_deref();
    match cli.command {
        Command::Watch { base_url } => {
            commands::watch::run(commands::load_config(explicit, base_url)?)
        }
        Command::Probe { base_url, timeout_ms } => {
            let config = commands::load_config(explicit, base_url)?;
            commands::probe::run(&config, timeout_ms)
        }
        Command::Classify { offline, effective_type, rtt_ms, downlink, latency_ms } => {
            let readings = Readings { offline, effective_type, rtt_ms, downlink, latency_ms };
            commands::classify::run(readings)
        }
        Command::Backup { command } => {
            let config = commands::load_config(explicit, None)?;
            match command {
                BackupCommand::Status => commands::backup::status(&config),
                BackupCommand::Clear => commands::backup::clear(&config),
            }
        }
    }
}
