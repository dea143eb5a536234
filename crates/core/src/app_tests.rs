// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn new_app_is_running_and_not_system_ui() {
    let app = AppRecord::new(100, 1000, "com.example.app", EndpointToken::new());
    assert_eq!(app.status, AppStatus::Running);
    assert!(!app.is_system_ui);
}

#[test]
fn system_ui_builder_sets_flag() {
    let app = AppRecord::new(100, 1000, "com.example.shell", EndpointToken::new()).system_ui(true);
    assert!(app.is_system_ui);
}

#[test]
fn endpoint_tokens_are_unique() {
    let a = EndpointToken::new();
    let b = EndpointToken::new();
    assert_ne!(a, b);
}
