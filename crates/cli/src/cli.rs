// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tether_core::EffectiveType;

#[derive(Parser, Debug)]
#[command(name = "tether")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Connectivity monitoring, liveness probing and offline action queueing")]
pub struct Cli {
    /// Config file (default: $TETHER_CONFIG or <state dir>/config.toml)
    #[arg(long, global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    /// Append logs to this file instead of stderr
    #[arg(long, global = true, value_name = "path")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Watch connectivity and deliver actions read from stdin
    #[command(after_help = "\
Examples:
  tether watch                                  Print status changes as JSON lines
  echo '{\"kind\":\"save\",\"payload\":{}}' | tether watch   Queue an action")]
    Watch {
        /// Service base URL (overrides probe.base_url)
        #[arg(long, value_name = "url")]
        base_url: Option<String>,
    },

    /// Probe the health endpoint once
    Probe {
        /// Service base URL (overrides probe.base_url)
        #[arg(long, value_name = "url")]
        base_url: Option<String>,

        /// Request timeout in milliseconds (overrides probe.timeout_ms)
        #[arg(long, value_name = "ms")]
        timeout_ms: Option<u64>,
    },

    /// Classify connection quality from link metadata
    #[command(after_help = "\
Examples:
  tether classify --effective-type 4g --rtt-ms 40    excellent
  tether classify --downlink 2.5                     fair
  tether classify --offline                          offline")]
    Classify {
        /// Treat the platform as offline
        #[arg(long)]
        offline: bool,

        /// Effective connection type (slow-2g, 2g, 3g, 4g)
        #[arg(long, value_name = "type")]
        effective_type: Option<EffectiveType>,

        /// Round-trip time in milliseconds
        #[arg(long, value_name = "ms")]
        rtt_ms: Option<u32>,

        /// Downlink bandwidth in Mb/s
        #[arg(long, value_name = "mbps")]
        downlink: Option<f64>,

        /// Latest probe latency, used when no rtt is given
        #[arg(long, value_name = "ms")]
        latency_ms: Option<u32>,
    },

    /// Inspect or discard the stored session backup
    Backup {
        #[command(subcommand)]
        command: BackupCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum BackupCommand {
    /// Show version, age and validity of the stored backup
    Status,
    /// Delete the stored backup
    Clear,
}
