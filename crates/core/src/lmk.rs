// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The low-memory killer policy: on a memory-pressure event or periodic
//! poll, re-score every tracked process, pick the first threshold row the
//! current free-memory reading satisfies, and request a graceful stop for
//! every pid at or above that row's oom-score cutoff.
//!
//! Pure decision logic only — [`collect_targets`] returns the pids to stop;
//! the caller (the daemon's engine) emits [`Effect::RequestStop`] and
//! arms the fallback-kill timer.

use crate::priority::LmkThreshold;
use crate::priority_list::PriorityList;

/// Re-scores the list, then returns the pids whose oom score clears the
/// first threshold row that `free_mem_bytes` satisfies (reading rows in
/// the order given, smallest free-memory threshold first is not assumed —
/// rows are tried in file/config order, first match wins).
pub fn collect_targets(list: &mut PriorityList, thresholds: &[LmkThreshold], free_mem_bytes: u64) -> Vec<i32> {
    list.analyse();
    let Some(row) = thresholds.iter().find(|row| free_mem_bytes <= row.free_mem_bytes) else {
        return Vec::new();
    };
    list.pids_at_or_above(row.oom_score)
}

#[cfg(test)]
#[path = "lmk_tests.rs"]
mod tests;
