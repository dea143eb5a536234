// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::activity::LaunchMode;
use crate::app::EndpointToken;
use crate::intent::Intent;

#[test]
fn insert_and_remove_app_returns_owned_tokens() {
    let mut registry = Registry::new();
    registry.insert_app(AppRecord::new(100, 1000, "com.demo", EndpointToken::new()));

    let activity = ActivityRecord::new(
        "com.demo/Main",
        100,
        "com.demo",
        Intent::with_target("com.demo/Main"),
        crate::activity::LaunchMode::Standard,
    );
    let activity_token = activity.token;
    registry.insert_activity(activity);

    let service = ServiceRecord::new("com.demo/Sync", 100, Intent::with_target("com.demo/Sync"));
    let service_token = service.token;
    registry.insert_service(service);

    let (app, activities, services) = registry.remove_app(100).unwrap();
    assert_eq!(app.pid, 100);
    assert_eq!(activities, vec![activity_token]);
    assert_eq!(services, vec![service_token]);
    assert!(registry.app(100).is_none());
}

#[test]
fn attaching_dedup_and_claim_pairs_fifo() {
    let mut registry = Registry::new();
    assert!(!registry.is_attaching("com.demo"));

    let record = ActivityRecord::new(
        "com.demo/Main",
        0,
        "com.demo",
        Intent::with_target("com.demo/Main"),
        LaunchMode::Standard,
    );
    registry.queue_launch(
        "com.demo",
        PendingLaunch::Activity { record, task_tag: "com.demo".into(), flags: IntentFlags::empty() },
    );
    assert!(registry.is_attaching("com.demo"));

    registry.claim_spawned_pid("com.demo", 200);
    assert!(registry.is_attaching("com.demo"));

    let package = registry.take_attaching_package(200);
    assert_eq!(package.as_deref(), Some("com.demo"));

    let drained = registry.drain_launches("com.demo");
    assert_eq!(drained.len(), 1);
    assert!(!registry.is_attaching("com.demo"));
}

#[test]
fn activity_lookup_by_unique_name() {
    let mut registry = Registry::new();
    let activity = ActivityRecord::new(
        "com.demo/Main",
        100,
        "com.demo",
        Intent::with_target("com.demo/Main"),
        crate::activity::LaunchMode::Standard,
    );
    registry.insert_activity(activity);
    assert!(registry.find_activity_by_unique_name("com.demo/Main").is_some());
    assert!(registry.find_activity_by_unique_name("com.demo/Missing").is_none());
}

#[test]
fn removing_activity_drops_it_from_app_backref() {
    let mut registry = Registry::new();
    registry.insert_app(AppRecord::new(100, 1000, "com.demo", EndpointToken::new()));
    let activity = ActivityRecord::new(
        "com.demo/Main",
        100,
        "com.demo",
        Intent::with_target("com.demo/Main"),
        crate::activity::LaunchMode::Standard,
    );
    let token = activity.token;
    registry.insert_activity(activity);
    assert_eq!(registry.activities_of_app(100).count(), 1);

    registry.remove_activity(token);
    assert_eq!(registry.activities_of_app(100).count(), 0);
    assert!(registry.activity(token).is_none());
}
