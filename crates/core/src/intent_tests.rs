// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn split_target_separates_package_and_class() {
    let intent = Intent::with_target("com.example.app/MainActivity");
    assert_eq!(intent.split_target(), ("com.example.app", "MainActivity"));
}

#[test]
fn split_target_with_no_class_returns_empty_suffix() {
    let intent = Intent::with_target("com.example.app");
    assert_eq!(intent.split_target(), ("com.example.app", ""));
}

#[test]
fn system_target_is_detected() {
    let intent = Intent::with_target(TARGET_ACTIVITY_TOP_RESUME);
    assert!(intent.is_system_target());
    assert!(!Intent::with_target("com.example.app").is_system_target());
}

#[test]
fn flags_round_trip_through_bits() {
    let intent = Intent::default().set_flags(IntentFlags::NEW_TASK | IntentFlags::CLEAR_TOP);
    let flags = intent.flags();
    assert!(flags.contains(IntentFlags::NEW_TASK));
    assert!(flags.contains(IntentFlags::CLEAR_TOP));
    assert!(!flags.contains(IntentFlags::SINGLE_TOP));
}

#[test]
fn add_flag_is_additive() {
    let mut intent = Intent::default().set_flags(IntentFlags::NEW_TASK);
    intent.add_flag(IntentFlags::SINGLE_TOP);
    assert!(intent.flags().contains(IntentFlags::NEW_TASK));
    assert!(intent.flags().contains(IntentFlags::SINGLE_TOP));
}

#[test]
fn serde_round_trip_preserves_all_fields() {
    let mut intent = Intent::with_target("pkg/cls").set_flags(IntentFlags::NEW_TASK);
    intent.action = "action.custom".to_string();
    intent.data = "payload".to_string();
    intent.extras.insert("count".to_string(), Extra::Int(3));
    let json = serde_json::to_string(&intent).expect("serialize");
    let back: Intent = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(intent, back);
}
