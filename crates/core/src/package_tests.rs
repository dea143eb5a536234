// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::intent::ComponentType;

fn sample_package() -> PackageInfo {
    PackageInfo {
        package_name: "com.example.app".into(),
        exec_path: "/system/bin/app".into(),
        is_system_ui: false,
        is_support_multi_task: false,
        components: vec![
            ComponentDecl {
                class_name: "com.example.app/.MainActivity".into(),
                component_type: ComponentType::Activity,
                launch_mode: LaunchMode::Standard,
                actions: vec!["android.intent.action.MAIN".into()],
                is_entry: true,
                task_affinity: None,
            },
            ComponentDecl {
                class_name: "com.example.app/.SyncService".into(),
                component_type: ComponentType::Service,
                launch_mode: LaunchMode::Standard,
                actions: vec![],
                is_entry: false,
                task_affinity: None,
            },
        ],
    }
}

#[test]
fn entry_activity_finds_the_flagged_component() {
    let pkg = sample_package();
    let entry = pkg.entry_activity().expect("has entry");
    assert_eq!(entry.class_name, "com.example.app/.MainActivity");
}

#[test]
fn component_looks_up_by_class_name() {
    let pkg = sample_package();
    assert!(pkg.component("com.example.app/.SyncService").is_some());
    assert!(pkg.component("com.example.app/.Missing").is_none());
}

#[test]
fn package_with_no_entry_activity_returns_none() {
    let mut pkg = sample_package();
    pkg.components[0].is_entry = false;
    assert!(pkg.entry_activity().is_none());
}

#[test]
fn action_table_registers_and_resolves_first_target() {
    let mut table = IntentActionTable::new();
    table.register("android.intent.action.MAIN", ComponentType::Activity, "pkg/MainActivity");
    assert_eq!(
        table.first_target("android.intent.action.MAIN", ComponentType::Activity),
        Some("pkg/MainActivity")
    );
    assert_eq!(table.first_target("android.intent.action.MAIN", ComponentType::Service), None);
}

#[test]
fn action_table_accumulates_multiple_targets_for_broadcasts() {
    let mut table = IntentActionTable::new();
    table.register("pkg.BROADCAST_TOP", ComponentType::Activity, "pkg_a/Listener");
    table.register("pkg.BROADCAST_TOP", ComponentType::Activity, "pkg_b/Listener");
    assert_eq!(
        table.all_targets("pkg.BROADCAST_TOP", ComponentType::Activity),
        &["pkg_a/Listener".to_string(), "pkg_b/Listener".to_string()]
    );
}

#[test]
fn unregister_package_drops_only_its_own_targets() {
    let mut table = IntentActionTable::new();
    table.register("pkg.ACTION", ComponentType::Activity, "pkg_a/Listener");
    table.register("pkg.ACTION", ComponentType::Activity, "pkg_b/Listener");
    table.unregister_package("pkg_a");
    assert_eq!(table.all_targets("pkg.ACTION", ComponentType::Activity), &["pkg_b/Listener".to_string()]);
}

#[test]
fn unknown_action_returns_empty_slice_not_panic() {
    let table = IntentActionTable::new();
    assert!(table.all_targets("no.such.action", ComponentType::Activity).is_empty());
}

#[test]
fn package_directory_inserts_and_looks_up_by_package_name() {
    let mut dir = PackageDirectory::new();
    dir.insert(sample_package());
    assert!(dir.get("com.example.app").is_some());
    assert!(dir.get("com.missing").is_none());
}

#[test]
fn package_directory_remove_drops_the_entry() {
    let mut dir = PackageDirectory::new();
    dir.insert(sample_package());
    assert!(dir.remove("com.example.app").is_some());
    assert!(dir.get("com.example.app").is_none());
}
