// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn codes_roundtrip_through_from_code_and_code() {
    for (code, mode) in [(0, RunMode::Normal), (1, RunMode::Silence), (2, RunMode::Debug)] {
        assert_eq!(RunMode::from_code(code), mode);
        assert_eq!(mode.code(), code);
    }
}

#[test]
fn unknown_codes_fall_back_to_normal() {
    assert_eq!(RunMode::from_code(99), RunMode::Normal);
    assert_eq!(RunMode::from_code(-1), RunMode::Normal);
}

#[test]
fn only_silence_and_debug_skip_the_boot_broadcast() {
    assert!(!RunMode::Normal.skips_boot_broadcast());
    assert!(RunMode::Silence.skips_boot_broadcast());
    assert!(RunMode::Debug.skips_boot_broadcast());
}

#[test]
fn default_is_normal() {
    assert_eq!(RunMode::default(), RunMode::Normal);
}

#[test]
fn display_matches_run_mode_file_vocabulary() {
    assert_eq!(RunMode::Normal.to_string(), "normal");
    assert_eq!(RunMode::Silence.to_string(), "silence");
    assert_eq!(RunMode::Debug.to_string(), "debug");
}
