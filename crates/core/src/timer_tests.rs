// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn app_attach_round_trips() {
    let id = TimerId::app_attach(4242);
    assert_eq!(id.kind(), Some(TimerKind::AppAttach { pid: 4242 }));
}

#[test]
fn activity_status_round_trips() {
    let id = TimerId::activity_status("pkg/cls");
    assert_eq!(id.kind(), Some(TimerKind::ActivityStatus { activity: "pkg/cls".to_string() }));
}

#[test]
fn service_status_round_trips() {
    let id = TimerId::service_status("pkg/svc");
    assert_eq!(id.kind(), Some(TimerKind::ServiceStatus { service: "pkg/svc".to_string() }));
}

#[test]
fn lmk_delayed_kill_round_trips() {
    let id = TimerId::lmk_delayed_kill(99);
    assert_eq!(id.kind(), Some(TimerKind::LmkDelayedKill { pid: 99 }));
}

#[test]
fn lmk_poll_round_trips() {
    let id = TimerId::lmk_poll();
    assert_eq!(id.as_str(), "lmk-poll");
    assert_eq!(id.kind(), Some(TimerKind::LmkPoll));
}

#[test]
fn unrecognized_format_parses_to_none() {
    assert_eq!(TimerKind::parse("bogus:1"), None);
}
