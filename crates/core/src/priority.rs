// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process priority levels, OOM-score constants, and the pure score
//! assignment function. The mutable, ordered process list itself (with its
//! `background_pos` pivot) lives in the daemon's engine, which calls
//! [`level_adj`] per background node in list order.

use serde::{Deserialize, Serialize};

/// Declared background priority band for a process. Foreground, home, and
/// persistent processes are scored directly (see [`analyse_one`]); these
/// three only matter for background nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityLevel {
    Persistent,
    High,
    Middle,
    Low,
}

impl Default for PriorityLevel {
    fn default() -> Self {
        // New processes default to the middle band until classified.
        PriorityLevel::Middle
    }
}

pub const OS_SYSTEM_ADJ: i32 = -900;
pub const OS_PERSISTENT_PROC_ADJ: i32 = -100;
pub const OS_FOREGROUND_APP_ADJ: i32 = 0;
pub const OS_SYSTEM_HOME_APP_ADJ: i32 = 1;
pub const OS_HIGH_LEVEL_MIN_ADJ: i32 = 10;
pub const OS_HIGH_LEVEL_MAX_ADJ: i32 = 99;
pub const OS_MIDDLE_LEVEL_MIN_ADJ: i32 = 100;
pub const OS_MIDDLE_LEVEL_MAX_ADJ: i32 = 600;
pub const OS_LOW_LEVEL_MIN_ADJ: i32 = 700;
pub const OS_LOW_LEVEL_MAX_ADJ: i32 = 800;
pub const OS_CACHE_PROCESS_ADJ: i32 = 900;

/// Default oom score assigned to a newly tracked pid, before `analyse()` has
/// placed it relative to its siblings.
pub const DEFAULT_OOM_SCORE: i32 = OS_MIDDLE_LEVEL_MIN_ADJ;

/// A tracked process's place in the priority list. Owned by the daemon's
/// doubly-linked arena; this struct is the pure payload each node carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PidPriorityInfo {
    pub pid: i32,
    pub level: PriorityLevel,
    pub is_persistent: bool,
    pub oom_score: i32,
    pub last_wake_clock_ms: u64,
}

impl PidPriorityInfo {
    pub fn new(pid: i32, level: PriorityLevel) -> Self {
        PidPriorityInfo {
            pid,
            level,
            is_persistent: false,
            oom_score: DEFAULT_OOM_SCORE,
            last_wake_clock_ms: 0,
        }
    }
}

/// Score for a foreground-pinned node (persistent, active foreground, or
/// home). `is_home` only matters when not foreground and not persistent.
pub fn analyse_pinned(is_persistent: bool, is_foreground: bool, is_home: bool) -> i32 {
    if is_persistent {
        OS_PERSISTENT_PROC_ADJ
    } else if is_foreground {
        OS_FOREGROUND_APP_ADJ
    } else if is_home {
        OS_SYSTEM_HOME_APP_ADJ
    } else {
        OS_MIDDLE_LEVEL_MIN_ADJ
    }
}

/// Score for the `counter`-th background node (0-indexed, in list order)
/// at the given `level`. Clamps at the level's max so an unbounded run of
/// same-level background processes never spills into the next band.
pub fn level_adj(level: PriorityLevel, counter: u32) -> i32 {
    let (min_adj, max_adj) = match level {
        PriorityLevel::Persistent => return OS_PERSISTENT_PROC_ADJ,
        PriorityLevel::High => (OS_HIGH_LEVEL_MIN_ADJ, OS_HIGH_LEVEL_MAX_ADJ),
        PriorityLevel::Middle => (OS_MIDDLE_LEVEL_MIN_ADJ, OS_MIDDLE_LEVEL_MAX_ADJ),
        PriorityLevel::Low => (OS_LOW_LEVEL_MIN_ADJ, OS_LOW_LEVEL_MAX_ADJ),
    };
    (min_adj + counter as i32).min(max_adj)
}

/// An `(freeMemoryThreshold, oomScoreThreshold)` row from the LMK config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LmkThreshold {
    pub free_mem_bytes: u64,
    pub oom_score: i32,
}

pub const LMK_MAX_THRESHOLDS: usize = 5;

/// Default thresholds when the LMK config file is absent or empty:
/// 10%/20%/40% of total heap paired with oom thresholds 100/500/700.
pub fn default_lmk_thresholds(total_heap_bytes: u64) -> Vec<LmkThreshold> {
    vec![
        LmkThreshold { free_mem_bytes: total_heap_bytes / 10, oom_score: 100 },
        LmkThreshold { free_mem_bytes: total_heap_bytes / 5, oom_score: 500 },
        LmkThreshold { free_mem_bytes: (total_heap_bytes * 2) / 5, oom_score: 700 },
    ]
}

/// Grace period before a stubborn target gets a fallback `SIGTERM`.
pub const LMK_DELAYED_KILL_MS: u64 = 2000;

#[cfg(test)]
#[path = "priority_tests.rs"]
mod tests;
