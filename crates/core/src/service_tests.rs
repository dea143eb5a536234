// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::caller::CallerRef;
use crate::intent::Intent;

#[test]
fn new_service_starts_creating_and_idle() {
    let service = ServiceRecord::new("pkg/svc", 1, Intent::with_target("pkg/svc"));
    assert_eq!(service.status, ServiceStatus::Creating);
    assert!(service.is_idle());
    assert!(!service.is_destroyed());
}

#[test]
fn started_service_is_not_idle() {
    let mut service = ServiceRecord::new("pkg/svc", 1, Intent::default());
    service.started = true;
    assert!(!service.is_idle());
}

#[test]
fn bound_service_is_not_idle() {
    let mut service = ServiceRecord::new("pkg/svc", 1, Intent::default());
    service.connections.push(ServiceConnection { caller: CallerRef::System });
    assert!(!service.is_idle());
}

#[test]
fn idle_again_once_unbound_and_stopped() {
    let mut service = ServiceRecord::new("pkg/svc", 1, Intent::default());
    service.started = true;
    service.connections.push(ServiceConnection { caller: CallerRef::System });
    assert!(!service.is_idle());
    service.started = false;
    service.connections.clear();
    assert!(service.is_idle());
}
