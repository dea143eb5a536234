// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn register_then_unregister_leaves_nothing() {
    let mut registry = ReceiverRegistry::new();
    let a = EndpointToken::new();
    registry.register("broadcast.system.APP_EXIT", a);
    assert_eq!(registry.receivers_for("broadcast.system.APP_EXIT"), &[a]);

    registry.unregister(a);
    assert!(registry.receivers_for("broadcast.system.APP_EXIT").is_empty());
}

#[test]
fn delivers_in_registration_order() {
    let mut registry = ReceiverRegistry::new();
    let a = EndpointToken::new();
    let b = EndpointToken::new();
    registry.register("action", a);
    registry.register("action", b);
    assert_eq!(registry.receivers_for("action"), &[a, b]);
}

#[test]
fn unregister_one_receiver_does_not_affect_others() {
    let mut registry = ReceiverRegistry::new();
    let a = EndpointToken::new();
    let b = EndpointToken::new();
    registry.register("action", a);
    registry.register("action", b);
    registry.unregister(a);
    assert_eq!(registry.receivers_for("action"), &[b]);
}

#[test]
fn unregistered_action_returns_empty_slice() {
    let registry = ReceiverRegistry::new();
    assert!(registry.receivers_for("unknown").is_empty());
}
