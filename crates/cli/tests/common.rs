// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

pub fn tether() -> Command {
    cargo_bin_cmd!("tether")
}

/// `tether` with its state and config confined to `state`.
pub fn tether_in(state: &Path) -> Command {
    let mut cmd = tether();
    cmd.env("TETHER_STATE_DIR", state)
        .env_remove("TETHER_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}
