// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::priority::PriorityLevel;

fn thresholds() -> Vec<LmkThreshold> {
    vec![
        LmkThreshold { free_mem_bytes: 100, oom_score: 100 },
        LmkThreshold { free_mem_bytes: 200, oom_score: 500 },
        LmkThreshold { free_mem_bytes: 400, oom_score: 700 },
    ]
}

#[test]
fn no_row_matches_returns_empty() {
    let mut list = PriorityList::new();
    list.add(1, false, PriorityLevel::Low);
    assert!(collect_targets(&mut list, &thresholds(), 1_000).is_empty());
}

#[test]
fn tightest_matching_row_picks_low_oom_threshold() {
    let mut list = PriorityList::new();
    list.add(1, true, PriorityLevel::Middle); // foreground: score 0
    list.add(2, false, PriorityLevel::Low); // background low: score >= 700

    let targets = collect_targets(&mut list, &thresholds(), 50);
    assert_eq!(targets, vec![2]);
}

#[test]
fn looser_row_has_a_higher_oom_cutoff_and_catches_fewer_pids() {
    let mut list = PriorityList::new();
    list.add(1, true, PriorityLevel::Middle); // foreground: score 0
    list.add(2, false, PriorityLevel::Middle); // background middle: score 100
    list.add(3, false, PriorityLevel::Low); // background low: score 700

    // free_mem=150 matches the (200, 500) row: only the low-level pid clears it.
    let targets = collect_targets(&mut list, &thresholds(), 150);
    assert_eq!(targets, vec![3]);
}
