// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup and shutdown of the Unix-socket
//! transport and the orchestration core behind it.

mod startup;
pub use startup::startup;

use std::fs::File;
use std::path::PathBuf;

use amcore::ActivityManager;
use thiserror::Error;
use tokio::net::UnixListener;
use tracing::{info, warn};

use crate::config::{Config, ConfigError};

/// Everything startup hands to the binary entry point: the bound listener
/// ready to `accept()`, and the orchestration core seeded with installed
/// packages and persisted run-mode/LMK configuration.
pub struct StartupResult {
    pub config: Config,
    pub listener: UnixListener,
    pub manager: ActivityManager,
    // Held to maintain the exclusive lock; released on drop.
    #[allow(dead_code)]
    lock_file: File,
}

impl StartupResult {
    /// Remove the socket and lock files. Called on graceful shutdown; a
    /// daemon that crashes leaves these behind for the next startup's lock
    /// attempt to detect (or clean up, once the lock is released by the
    /// dead process exiting).
    pub fn shutdown(self) {
        info!("shutting down");
        if self.config.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.socket_path) {
                warn!(error = %e, "failed to remove socket file");
            }
        }
        if self.config.lock_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.lock_path) {
                warn!(error = %e, "failed to remove lock file");
            }
        }
        info!("shutdown complete");
    }
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("could not determine state directory")]
    NoStateDir,

    #[error("failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("failed to bind socket at {0}: {1}")]
    BindFailed(PathBuf, std::io::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
