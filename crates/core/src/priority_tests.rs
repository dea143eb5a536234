// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn persistent_outranks_everything() {
    assert_eq!(analyse_pinned(true, true, true), OS_PERSISTENT_PROC_ADJ);
    assert_eq!(analyse_pinned(true, false, false), OS_PERSISTENT_PROC_ADJ);
}

#[test]
fn foreground_beats_home() {
    assert_eq!(analyse_pinned(false, true, true), OS_FOREGROUND_APP_ADJ);
}

#[test]
fn home_alone_gets_home_adj() {
    assert_eq!(analyse_pinned(false, false, true), OS_SYSTEM_HOME_APP_ADJ);
}

#[test]
fn each_level_stays_within_its_own_band() {
    for level in [PriorityLevel::High, PriorityLevel::Middle, PriorityLevel::Low] {
        for counter in 0..2000u32 {
            let score = level_adj(level, counter);
            let (min, max) = match level {
                PriorityLevel::High => (OS_HIGH_LEVEL_MIN_ADJ, OS_HIGH_LEVEL_MAX_ADJ),
                PriorityLevel::Middle => (OS_MIDDLE_LEVEL_MIN_ADJ, OS_MIDDLE_LEVEL_MAX_ADJ),
                PriorityLevel::Low => (OS_LOW_LEVEL_MIN_ADJ, OS_LOW_LEVEL_MAX_ADJ),
                PriorityLevel::Persistent => unreachable!(),
            };
            assert!(score >= min && score <= max, "{level:?}[{counter}] = {score} out of [{min}, {max}]");
        }
    }
}

#[test]
fn scores_increase_monotonically_within_a_level_until_clamped() {
    for level in [PriorityLevel::High, PriorityLevel::Middle, PriorityLevel::Low] {
        let mut prev = level_adj(level, 0);
        for counter in 1..50 {
            let next = level_adj(level, counter);
            assert!(next >= prev);
            prev = next;
        }
    }
}

#[test]
fn default_lmk_thresholds_scale_with_heap_size() {
    let thresholds = default_lmk_thresholds(1_000_000);
    assert_eq!(thresholds.len(), 3);
    assert_eq!(thresholds[0].free_mem_bytes, 100_000);
    assert_eq!(thresholds[0].oom_score, 100);
    assert_eq!(thresholds[1].free_mem_bytes, 200_000);
    assert_eq!(thresholds[1].oom_score, 500);
    assert_eq!(thresholds[2].free_mem_bytes, 400_000);
    assert_eq!(thresholds[2].oom_score, 700);
}

#[test]
fn new_pid_info_defaults_to_middle_band_score() {
    let info = PidPriorityInfo::new(42, PriorityLevel::Middle);
    assert_eq!(info.oom_score, DEFAULT_OOM_SCORE);
    assert_eq!(info.oom_score, OS_MIDDLE_LEVEL_MIN_ADJ);
}
