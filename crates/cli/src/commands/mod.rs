// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod backup;
pub mod classify;
pub mod probe;
pub mod watch;

use serde::Serialize;
use tether_store::FileStore;

use crate::config::{self, Config};
use crate::error::{Error, Result};

/// Loads the config file, applying a command-line base URL override.
pub(crate) fn load_config(
    explicit: Option<&std::path::Path>,
    base_url: Option<String>,
) -> Result<Config> {
    let mut config = Config::load(&config::config_path(explicit))?;
    if let Some(url) = base_url {
        config.probe.base_url = url;
    }
    Ok(config)
}

pub(crate) fn open_store() -> Result<FileStore> {
    Ok(FileStore::open(config::state_dir())?)
}

pub(crate) fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Error::Io(std::io::Error::other(format!("tokio: {}", e))))
}

/// Prints one JSON document per line on stdout.
pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}
