// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test fixtures for `amcore` consumers (`amwire`, `amdaemon`).
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`; not part of
//! the crate's runtime surface.

use crate::activity::{ActivityRecord, LaunchMode};
use crate::app::{AppRecord, EndpointToken};
use crate::intent::Intent;
use crate::package::{ComponentDecl, PackageInfo};
use crate::service::ServiceRecord;

/// An `ActivityRecord` for `"pkg/.MainActivity"` with sensible test defaults.
pub fn test_activity(pid: i32) -> ActivityRecord {
    ActivityRecord::new(
        "com.example.app/.MainActivity",
        pid,
        "com.example.app",
        Intent::with_target("com.example.app/.MainActivity"),
        LaunchMode::Standard,
    )
}

/// A `ServiceRecord` for `"pkg/.SyncService"`.
pub fn test_service(pid: i32) -> ServiceRecord {
    ServiceRecord::new(
        "com.example.app/.SyncService",
        pid,
        Intent::with_target("com.example.app/.SyncService"),
    )
}

/// An `AppRecord` for a single running, non-system-UI package.
pub fn test_app(pid: i32, uid: u32) -> AppRecord {
    AppRecord::new(pid, uid, "com.example.app", EndpointToken::new())
}

/// A `PackageInfo` declaring one entry activity and one service, matching
/// [`test_activity`] and [`test_service`].
pub fn test_package() -> PackageInfo {
    PackageInfo {
        package_name: "com.example.app".into(),
        exec_path: "/system/bin/com.example.app".into(),
        is_system_ui: false,
        is_support_multi_task: false,
        components: vec![
            ComponentDecl {
                class_name: "com.example.app/.MainActivity".into(),
                component_type: crate::intent::ComponentType::Activity,
                launch_mode: LaunchMode::Standard,
                actions: vec!["android.intent.action.MAIN".into()],
                is_entry: true,
                task_affinity: None,
            },
            ComponentDecl {
                class_name: "com.example.app/.SyncService".into(),
                component_type: crate::intent::ComponentType::Service,
                launch_mode: LaunchMode::Standard,
                actions: vec![],
                is_entry: false,
                task_affinity: None,
            },
        ],
    }
}
