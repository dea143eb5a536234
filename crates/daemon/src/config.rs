// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration: paths, and the loaders for the two persisted
//! config files (run-mode, LMK thresholds) plus the package manifest the
//! package manager would otherwise serve over IPC.

use std::path::PathBuf;

use amcore::priority;
use amcore::{BootConfig, LmkThreshold, PackageInfo, RunMode};
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::lifecycle::LifecycleError;

/// Daemon configuration: every path the lifecycle needs to start up.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root state directory (e.g. ~/.local/state/activitymanager)
    pub state_dir: PathBuf,
    /// Unix socket the transport shim listens on.
    pub socket_path: PathBuf,
    /// Exclusive lock / PID file preventing a second daemon instance.
    pub lock_path: PathBuf,
    /// Single-integer run-mode file (persisted across restarts).
    pub run_mode_path: PathBuf,
    /// `<freeMemBytes> <oomScore>` lines, up to 5 rows.
    pub lmk_config_path: PathBuf,
    /// Package manifest (installed packages + boot configuration).
    pub packages_path: PathBuf,
    /// Total heap size used to compute the default LMK thresholds when the
    /// config file is absent or empty.
    pub total_heap_bytes: u64,
}

impl Config {
    /// Load configuration for the user-level daemon. Uses fixed paths under
    /// `~/.local/state/activitymanager/` (or `$XDG_STATE_HOME/activitymanager`).
    pub fn load() -> Result<Self, LifecycleError> {
        let state_dir = crate::env::state_dir()?;
        Ok(Config {
            socket_path: state_dir.join("activitymanager.sock"),
            lock_path: state_dir.join("activitymanager.pid"),
            run_mode_path: state_dir.join("run_mode"),
            lmk_config_path: state_dir.join("lmk.conf"),
            packages_path: state_dir.join("packages.toml"),
            total_heap_bytes: read_total_heap_bytes(),
            state_dir,
        })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error reading {path}: {source}")]
    Io { path: PathBuf, #[source] source: std::io::Error },
    #[error("malformed package manifest at {path}: {source}")]
    Toml { path: PathBuf, #[source] source: toml::de::Error },
}

/// Reads the single-integer run-mode file (0 normal, 1 silence, 2 debug).
/// Missing file defaults to `RunMode::Normal`, matching a freshly-installed
/// image that has never written one.
pub fn load_run_mode(path: &std::path::Path) -> RunMode {
    match std::fs::read_to_string(path) {
        Ok(contents) => match contents.trim().parse::<i64>() {
            Ok(code) => RunMode::from_code(code),
            Err(_) => {
                warn!(path = %path.display(), "run-mode file does not contain an integer, defaulting to normal");
                RunMode::Normal
            }
        },
        Err(_) => RunMode::Normal,
    }
}

/// Reads up to [`amcore::LmkThreshold`]-worth `<freeMemBytes> <oomScore>`
/// lines. Falls back to [`amcore::default_lmk_thresholds`] when the file is
/// absent or empty.
pub fn load_lmk_thresholds(path: &std::path::Path, total_heap_bytes: u64) -> Vec<LmkThreshold> {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return priority::default_lmk_thresholds(total_heap_bytes),
    };

    let mut thresholds = Vec::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut parts = line.split_whitespace();
        let (Some(free), Some(score)) = (parts.next(), parts.next()) else {
            warn!(path = %path.display(), line, "malformed lmk config line, skipping");
            continue;
        };
        match (free.parse::<u64>(), score.parse::<i32>()) {
            (Ok(free_mem_bytes), Ok(oom_score)) => thresholds.push(LmkThreshold { free_mem_bytes, oom_score }),
            _ => warn!(path = %path.display(), line, "malformed lmk config line, skipping"),
        }
        if thresholds.len() >= priority::LMK_MAX_THRESHOLDS {
            break;
        }
    }

    if thresholds.is_empty() {
        priority::default_lmk_thresholds(total_heap_bytes)
    } else {
        thresholds
    }
}

/// On-disk shape of the package manifest: boot configuration plus the set of
/// installed packages the package manager would otherwise serve over IPC.
#[derive(Debug, Deserialize)]
struct PackageManifest {
    boot: BootManifest,
    #[serde(default)]
    packages: Vec<PackageInfo>,
}

#[derive(Debug, Deserialize)]
struct BootManifest {
    home_package: String,
    #[serde(default)]
    boot_guide_package: Option<String>,
    #[serde(default)]
    usersetup_complete: bool,
}

/// Loads the boot configuration and the list of installed packages.
pub fn load_packages(path: &std::path::Path) -> Result<(BootConfig, Vec<PackageInfo>), ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
    let manifest: PackageManifest = toml::from_str(&contents).map_err(|source| ConfigError::Toml { path: path.to_path_buf(), source })?;
    let boot = BootConfig {
        home_package: manifest.boot.home_package,
        boot_guide_package: manifest.boot.boot_guide_package,
        usersetup_complete: manifest.boot.usersetup_complete,
    };
    Ok((boot, manifest.packages))
}

/// Used only to size the default LMK thresholds when no config file is
/// present; reads `MemTotal` from `/proc/meminfo`, falling back to 1 GiB on
/// non-Linux targets or parse failure.
fn read_total_heap_bytes() -> u64 {
    read_meminfo_field("MemTotal:").unwrap_or(1024 * 1024 * 1024)
}

/// Reads a `/proc/meminfo` field (reported in kB) and returns bytes.
pub(crate) fn read_meminfo_field(label: &str) -> Option<u64> {
    let contents = std::fs::read_to_string("/proc/meminfo").ok()?;
    for line in contents.lines() {
        if let Some(rest) = line.strip_prefix(label) {
            let kb: u64 = rest.trim().trim_end_matches(" kB").trim().parse().ok()?;
            return Some(kb * 1024);
        }
    }
    None
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
