// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon startup: lock acquisition, socket binding, and seeding the
//! orchestration core from persisted configuration.

use std::io::Write;

use amcore::ActivityManager;
use fs2::FileExt;
use tokio::net::UnixListener;
use tracing::info;

use crate::config::{self, Config};

use super::{LifecycleError, StartupResult};

pub async fn startup(config: &Config) -> Result<StartupResult, LifecycleError> {
    match startup_inner(config).await {
        Ok(result) => Ok(result),
        Err(e) => {
            // Don't clean up if we failed to acquire the lock — those files
            // belong to the already-running daemon.
            if !matches!(e, LifecycleError::LockFailed(_)) {
                cleanup_on_failure(config);
            }
            Err(e)
        }
    }
}

async fn startup_inner(config: &Config) -> Result<StartupResult, LifecycleError> {
    if let Some(parent) = config.socket_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Acquire the lock first so a concurrent startup loses the race before
    // touching the socket or state.
    let lock_file = std::fs::OpenOptions::new().write(true).create(true).truncate(false).open(&config.lock_path)?;
    lock_file.try_lock_exclusive().map_err(LifecycleError::LockFailed)?;

    let mut lock_file = lock_file;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    let lock_file = lock_file;

    let run_mode = config::load_run_mode(&config.run_mode_path);
    let lmk_thresholds = config::load_lmk_thresholds(&config.lmk_config_path, config.total_heap_bytes);
    let (boot_config, packages) = config::load_packages(&config.packages_path)?;

    info!(run_mode = %run_mode, thresholds = lmk_thresholds.len(), packages = packages.len(), "loaded configuration");

    let mut manager = ActivityManager::new(run_mode, boot_config, lmk_thresholds);
    for package in packages {
        info!(package_name = %package.package_name, "installing package");
        manager.install_package(package);
    }

    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }
    let listener = UnixListener::bind(&config.socket_path).map_err(|e| LifecycleError::BindFailed(config.socket_path.clone(), e))?;

    info!("daemon started");

    Ok(StartupResult { config: config.clone(), listener, manager, lock_file })
}

fn cleanup_on_failure(config: &Config) {
    if config.socket_path.exists() {
        let _ = std::fs::remove_file(&config.socket_path);
    }
    if config.lock_path.exists() {
        let _ = std::fs::remove_file(&config.lock_path);
    }
}

#[cfg(test)]
#[path = "startup_tests.rs"]
mod tests;
