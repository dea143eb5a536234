// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::activity::{ActivityStatus, StableState};
use crate::app::EndpointToken;
use crate::caller::CallerRef;
use crate::intent::{Intent, IntentFlags};
use crate::package::{ComponentDecl, PackageInfo};
use crate::runmode::RunMode;
use crate::service::ServiceStatus;

fn activity_package(package_name: &str, entry: &str, extra: &[&str]) -> PackageInfo {
    let mut components = vec![ComponentDecl {
        class_name: format!("{package_name}/{entry}"),
        component_type: ComponentType::Activity,
        launch_mode: LaunchMode::Standard,
        actions: vec![],
        is_entry: true,
        task_affinity: None,
    }];
    for name in extra {
        components.push(ComponentDecl {
            class_name: format!("{package_name}/{name}"),
            component_type: ComponentType::Activity,
            launch_mode: LaunchMode::Standard,
            actions: vec![],
            is_entry: false,
            task_affinity: None,
        });
    }
    PackageInfo {
        package_name: package_name.to_string(),
        exec_path: format!("/system/bin/{package_name}"),
        is_system_ui: false,
        is_support_multi_task: false,
        components,
    }
}

fn new_manager() -> ActivityManager {
    let boot = BootConfig { home_package: "com.demo.launcher".into(), boot_guide_package: None, usersetup_complete: true };
    ActivityManager::new(RunMode::Normal, boot, Vec::new())
}

/// Spawns `package`, attaches its process at `pid`, and returns the
/// endpoint the client was attached at.
fn spawn_and_attach(manager: &mut ActivityManager, package: &str, pid: i32) -> EndpointToken {
    manager.process_spawned(package, pid);
    let endpoint = EndpointToken::new();
    manager.attach_application(pid, 1000, endpoint, 0).unwrap();
    endpoint
}

/// Drives every activity currently mid-transition toward its stored target
/// by replaying status reports until nothing is left `*ing`.
fn settle(manager: &mut ActivityManager) {
    settle_capturing(manager);
}

/// Same as [`settle`], but returns every effect produced along the way —
/// needed when the assertion cares about what the *last* hop of a
/// multi-step transition (e.g. Resume -> Pause -> Stop -> Destroy) emits.
fn settle_capturing(manager: &mut ActivityManager) -> Vec<Effect> {
    let mut effects = Vec::new();
    loop {
        let pending: Vec<_> = manager
            .registry
            .activities()
            .filter(|a| !a.status.is_stable())
            .map(|a| (a.token, a.status.stable()))
            .collect();
        if pending.is_empty() {
            break;
        }
        for (token, stable) in pending {
            effects.extend(manager.report_activity_status(token, ActivityStatus::settled(stable), 0));
        }
    }
    effects
}

#[test]
fn s1_cold_launch_spawns_attaches_and_resumes_entry_then_detail() {
    let mut manager = new_manager();
    manager.install_package(activity_package("com.demo", "Main", &["Detail"]));

    let effects = manager.start_activity(CallerRef::System, Intent::with_target("com.demo"), -1, 0).unwrap();
    let Some(Effect::SpawnProcess { package_name, .. }) = effects.first() else {
        panic!("expected a spawn effect, got {effects:?}");
    };
    assert_eq!(package_name, "com.demo");

    spawn_and_attach(&mut manager, "com.demo", 500);
    settle(&mut manager);

    let main_token = manager.registry.find_activity_by_unique_name("com.demo/Main").unwrap().token;
    assert_eq!(manager.registry.activity(main_token).unwrap().status, ActivityStatus::Resumed);
    assert_eq!(manager.standard.get_active_task(), Some("com.demo"));

    let effects = manager.start_activity(CallerRef::Activity(main_token), Intent::with_target("com.demo/Detail"), -1, 0).unwrap();
    assert!(effects.iter().any(|e| matches!(e, Effect::ScheduleLaunchActivity { .. })));
    settle(&mut manager);

    let detail_token = manager.registry.find_activity_by_unique_name("com.demo/Detail").unwrap().token;
    assert_eq!(manager.registry.activity(detail_token).unwrap().status, ActivityStatus::Resumed);
    assert_eq!(manager.registry.activity(main_token).unwrap().status, ActivityStatus::Paused);
}

#[test]
fn s2_single_task_reuse_switches_existing_instance_without_new_instance() {
    let mut manager = new_manager();
    manager.install_package(activity_package("com.demo", "Main", &["Detail"]));
    let mut settings = activity_package("com.settings", "Settings", &[]);
    settings.components[0].launch_mode = LaunchMode::SingleTask;
    settings.components[0].is_entry = false;
    // Declared task affinity differs from the package name, per §8 S2.
    settings.components[0].task_affinity = Some("settings".into());
    settings.components.insert(
        0,
        ComponentDecl {
            class_name: "com.settings/EntryStub".into(),
            component_type: ComponentType::Activity,
            launch_mode: LaunchMode::Standard,
            actions: vec![],
            is_entry: true,
            task_affinity: None,
        },
    );
    manager.install_package(settings);

    manager.start_activity(CallerRef::System, Intent::with_target("com.demo"), -1, 0).unwrap();
    spawn_and_attach(&mut manager, "com.demo", 500);
    settle(&mut manager);
    let main_token = manager.registry.find_activity_by_unique_name("com.demo/Main").unwrap().token;

    manager
        .start_activity(CallerRef::Activity(main_token), Intent::with_target("com.settings/Settings"), -1, 0)
        .unwrap();
    spawn_and_attach(&mut manager, "com.settings", 600);
    settle(&mut manager);

    let settings_token = manager.registry.find_activity_by_unique_name("com.settings/Settings").unwrap().token;
    assert_eq!(manager.registry.activity(settings_token).unwrap().status, ActivityStatus::Resumed);
    // The task is tagged with the declared affinity ("settings"), not the
    // owning package name ("com.settings").
    assert_eq!(manager.standard.get_active_task(), Some("settings"));

    // Starting it again from anywhere switches the existing task to active
    // instead of creating a second instance.
    manager.move_activity_task_to_background(settings_token, false, 0).unwrap();
    settle(&mut manager);
    assert_ne!(manager.standard.get_active_task(), Some("settings"));

    manager.start_activity(CallerRef::System, Intent::with_target("com.settings/Settings"), -1, 0).unwrap();
    settle(&mut manager);
    let still_one_instance = manager.registry.activities().filter(|a| a.unique_name == "com.settings/Settings").count();
    assert_eq!(still_one_instance, 1);
    assert_eq!(manager.standard.get_active_task(), Some("settings"));
}

#[test]
fn single_top_redelivers_intent_in_place_when_already_caller_task_top() {
    let mut manager = new_manager();
    let mut pkg = activity_package("com.demo", "Main", &["Detail"]);
    pkg.components[1].launch_mode = LaunchMode::SingleTop;
    manager.install_package(pkg);

    manager.start_activity(CallerRef::System, Intent::with_target("com.demo"), -1, 0).unwrap();
    spawn_and_attach(&mut manager, "com.demo", 500);
    settle(&mut manager);
    let main_token = manager.registry.find_activity_by_unique_name("com.demo/Main").unwrap().token;

    manager
        .start_activity(CallerRef::Activity(main_token), Intent::with_target("com.demo/Detail"), -1, 0)
        .unwrap();
    settle(&mut manager);
    let detail_token = manager.registry.find_activity_by_unique_name("com.demo/Detail").unwrap().token;

    // Detail is now the top of the "com.demo" task; starting it again with
    // SINGLE_TOP re-delivers the intent in place rather than creating a
    // second instance.
    manager
        .start_activity(CallerRef::Activity(detail_token), Intent::with_target("com.demo/Detail"), -1, 0)
        .unwrap();
    settle(&mut manager);
    let instances = manager.registry.activities().filter(|a| a.unique_name == "com.demo/Detail").count();
    assert_eq!(instances, 1);
}

#[test]
fn single_top_creates_fresh_instance_when_existing_is_not_callers_task_top() {
    let mut manager = new_manager();
    let mut pkg = activity_package("com.demo", "Main", &["Detail", "Third"]);
    pkg.components[1].launch_mode = LaunchMode::SingleTop;
    manager.install_package(pkg);

    manager.start_activity(CallerRef::System, Intent::with_target("com.demo"), -1, 0).unwrap();
    spawn_and_attach(&mut manager, "com.demo", 500);
    settle(&mut manager);
    let main_token = manager.registry.find_activity_by_unique_name("com.demo/Main").unwrap().token;

    // Push Detail, then Third, on top of Main — Detail is no longer the
    // top of its own task.
    manager
        .start_activity(CallerRef::Activity(main_token), Intent::with_target("com.demo/Detail"), -1, 0)
        .unwrap();
    settle(&mut manager);
    let detail_token = manager.registry.find_activity_by_unique_name("com.demo/Detail").unwrap().token;
    manager
        .start_activity(CallerRef::Activity(detail_token), Intent::with_target("com.demo/Third"), -1, 0)
        .unwrap();
    settle(&mut manager);

    // Starting Detail again — the live Detail instance is buried under
    // Third, so SINGLE_TOP does not apply and a fresh instance is pushed.
    manager
        .start_activity(CallerRef::Activity(main_token), Intent::with_target("com.demo/Detail"), -1, 0)
        .unwrap();
    settle(&mut manager);
    let instances = manager.registry.activities().filter(|a| a.unique_name == "com.demo/Detail").count();
    assert_eq!(instances, 2);
}

#[test]
fn s3_finish_activity_delivers_result_and_resumes_caller() {
    let mut manager = new_manager();
    manager.install_package(activity_package("com.demo", "Main", &["Detail"]));
    manager.start_activity(CallerRef::System, Intent::with_target("com.demo"), -1, 0).unwrap();
    spawn_and_attach(&mut manager, "com.demo", 500);
    settle(&mut manager);
    let main_token = manager.registry.find_activity_by_unique_name("com.demo/Main").unwrap().token;

    manager
        .start_activity(CallerRef::Activity(main_token), Intent::with_target("com.demo/Detail"), 7, 0)
        .unwrap();
    settle(&mut manager);
    let detail_token = manager.registry.find_activity_by_unique_name("com.demo/Detail").unwrap().token;

    let effects = manager.finish_activity(detail_token, 42, None, 0).unwrap();
    assert!(effects.iter().any(|e| matches!(
        e,
        Effect::DeliverActivityResult { token, request_code: 7, result_code: 42, .. } if *token == main_token
    )));
    settle(&mut manager);
    assert!(manager.registry.activity(detail_token).is_none());
    assert_eq!(manager.registry.activity(main_token).unwrap().status, ActivityStatus::Resumed);
}

#[test]
fn s4_process_death_destroys_activities_without_client_callback_and_relaunches_home() {
    let mut manager = new_manager();
    manager.install_package(activity_package("com.demo.launcher", "Home", &[]));
    manager.install_package(activity_package("com.demo", "Main", &["Detail"]));

    manager.start_activity(CallerRef::System, Intent::with_target("com.demo.launcher"), -1, 0).unwrap();
    spawn_and_attach(&mut manager, "com.demo.launcher", 100);
    settle(&mut manager);

    manager.start_activity(CallerRef::System, Intent::with_target("com.demo"), -1, 0).unwrap();
    spawn_and_attach(&mut manager, "com.demo", 500);
    settle(&mut manager);
    let main_token = manager.registry.find_activity_by_unique_name("com.demo/Main").unwrap().token;

    manager.register_receiver(crate::intent::BROADCAST_APP_EXIT, EndpointToken::new());
    let effects = manager.proc_app_terminated(500, 0);

    assert!(!effects.iter().any(|e| matches!(e, Effect::ScheduleTransition { .. })));
    assert!(effects.iter().any(|e| matches!(e, Effect::DeliverBroadcast { intent, .. } if intent.data == "com.demo")));
    assert!(manager.registry.activity(main_token).is_none());
    assert_eq!(manager.standard.get_active_task(), Some("com.demo.launcher"));
}

#[test]
fn s6_bind_then_unbind_with_no_start_destroys_service() {
    let mut manager = new_manager();
    let mut pkg = activity_package("com.demo", "Main", &[]);
    pkg.components.push(ComponentDecl {
        class_name: "com.demo/MyService".into(),
        component_type: ComponentType::Service,
        launch_mode: LaunchMode::Standard,
        actions: vec![],
        is_entry: false,
        task_affinity: None,
    });
    manager.install_package(pkg);

    manager.start_activity(CallerRef::System, Intent::with_target("com.demo"), -1, 0).unwrap();
    spawn_and_attach(&mut manager, "com.demo", 500);
    settle(&mut manager);
    let main_token = manager.registry.find_activity_by_unique_name("com.demo/Main").unwrap().token;

    manager
        .bind_service(CallerRef::Activity(main_token), Intent::with_target("com.demo/MyService"), 0)
        .unwrap();
    let token = manager.registry.find_service_by_unique_name("com.demo/MyService").unwrap().token;
    manager.report_service_status(token, ServiceStatus::Created);
    manager.publish_service(token).unwrap();
    manager.report_service_status(token, ServiceStatus::Bound);
    assert_eq!(manager.registry.service(token).unwrap().status, ServiceStatus::Bound);

    let conn = manager.registry.service(token).unwrap().connections[0].clone();
    let effects = manager.unbind_service(&conn);
    assert!(effects.iter().any(|e| matches!(e, Effect::ScheduleUnbindService { token: t, .. } if *t == token)));
    manager.report_service_status(token, ServiceStatus::Destroyed);
    assert!(manager.registry.service(token).is_none());
}

#[test]
fn start_service_with_no_existing_instance_emits_exactly_one_schedule_call() {
    let mut manager = new_manager();
    let mut pkg = activity_package("com.demo", "Main", &[]);
    pkg.components.push(ComponentDecl {
        class_name: "com.demo/MyService".into(),
        component_type: ComponentType::Service,
        launch_mode: LaunchMode::Standard,
        actions: vec![],
        is_entry: false,
        task_affinity: None,
    });
    manager.install_package(pkg);

    manager.start_activity(CallerRef::System, Intent::with_target("com.demo"), -1, 0).unwrap();
    spawn_and_attach(&mut manager, "com.demo", 500);
    settle(&mut manager);

    let effects = manager.start_service(Intent::with_target("com.demo/MyService"), 0).unwrap();
    let start_calls = effects.iter().filter(|e| matches!(e, Effect::ScheduleStartService { .. })).count();
    assert_eq!(start_calls, 1);
    assert!(!effects.iter().any(|e| matches!(e, Effect::ScheduleBindService { .. })));
}

#[test]
fn bind_service_with_no_start_flag_never_emits_schedule_start_service() {
    let mut manager = new_manager();
    let mut pkg = activity_package("com.demo", "Main", &[]);
    pkg.components.push(ComponentDecl {
        class_name: "com.demo/MyService".into(),
        component_type: ComponentType::Service,
        launch_mode: LaunchMode::Standard,
        actions: vec![],
        is_entry: false,
        task_affinity: None,
    });
    manager.install_package(pkg);

    manager.start_activity(CallerRef::System, Intent::with_target("com.demo"), -1, 0).unwrap();
    spawn_and_attach(&mut manager, "com.demo", 500);
    settle(&mut manager);
    let main_token = manager.registry.find_activity_by_unique_name("com.demo/Main").unwrap().token;

    let effects = manager
        .bind_service(CallerRef::Activity(main_token), Intent::with_target("com.demo/MyService"), 0)
        .unwrap();
    assert!(!effects.iter().any(|e| matches!(e, Effect::ScheduleStartService { .. })));
    assert!(effects.iter().any(|e| matches!(e, Effect::ScheduleBindService { .. })));
}

#[test]
fn last_activity_destroyed_with_no_services_terminates_the_idle_app() {
    let mut manager = new_manager();
    manager.install_package(activity_package("com.demo", "Main", &[]));

    manager.start_activity(CallerRef::System, Intent::with_target("com.demo"), -1, 0).unwrap();
    spawn_and_attach(&mut manager, "com.demo", 500);
    settle(&mut manager);
    let main_token = manager.registry.find_activity_by_unique_name("com.demo/Main").unwrap().token;
    let endpoint = manager.registry.app(500).unwrap().endpoint;

    manager.finish_activity(main_token, 0, None, 0).unwrap();
    let effects = settle_capturing(&mut manager);
    assert!(effects.iter().any(|e| matches!(e, Effect::TerminateApplication { endpoint: e } if *e == endpoint)));
}

#[test]
fn app_with_a_live_service_is_not_terminated_until_the_service_is_also_gone() {
    let mut manager = new_manager();
    let mut pkg = activity_package("com.demo", "Main", &[]);
    pkg.components.push(ComponentDecl {
        class_name: "com.demo/MyService".into(),
        component_type: ComponentType::Service,
        launch_mode: LaunchMode::Standard,
        actions: vec![],
        is_entry: false,
        task_affinity: None,
    });
    manager.install_package(pkg);

    manager.start_activity(CallerRef::System, Intent::with_target("com.demo"), -1, 0).unwrap();
    spawn_and_attach(&mut manager, "com.demo", 500);
    settle(&mut manager);
    let main_token = manager.registry.find_activity_by_unique_name("com.demo/Main").unwrap().token;
    let endpoint = manager.registry.app(500).unwrap().endpoint;

    manager
        .bind_service(CallerRef::Activity(main_token), Intent::with_target("com.demo/MyService"), 0)
        .unwrap();
    let service_token = manager.registry.find_service_by_unique_name("com.demo/MyService").unwrap().token;
    manager.report_service_status(service_token, ServiceStatus::Created);
    manager.publish_service(service_token).unwrap();
    manager.report_service_status(service_token, ServiceStatus::Bound);

    manager.finish_activity(main_token, 0, None, 0).unwrap();
    let effects = settle_capturing(&mut manager);
    assert!(!effects.iter().any(|e| matches!(e, Effect::TerminateApplication { .. })));

    let conn = manager.registry.service(service_token).unwrap().connections[0].clone();
    manager.unbind_service(&conn);
    let effects = manager.report_service_status(service_token, ServiceStatus::Destroyed);
    assert!(effects.iter().any(|e| matches!(e, Effect::TerminateApplication { endpoint: e } if *e == endpoint)));
}

#[test]
fn declared_action_target_receives_broadcast_when_its_instance_is_live() {
    let mut manager = new_manager();
    let mut pkg = activity_package("com.demo", "Main", &["Listener"]);
    pkg.components[1].actions = vec!["action.demo.PING".into()];
    manager.install_package(pkg);

    manager.start_activity(CallerRef::System, Intent::with_target("com.demo"), -1, 0).unwrap();
    spawn_and_attach(&mut manager, "com.demo", 500);
    settle(&mut manager);
    manager
        .start_activity(CallerRef::System, Intent::with_target("com.demo/Listener"), -1, 0)
        .unwrap();
    settle(&mut manager);
    let listener_token = manager.registry.find_activity_by_unique_name("com.demo/Listener").unwrap().token;

    let effects = manager.send_broadcast(Intent::with_action("action.demo.PING"));
    assert!(effects.iter().any(
        |e| matches!(e, Effect::ScheduleReceiveIntent { target: Some(ActivityOrServiceRef::Activity(t)), .. } if *t == listener_token)
    ));
}

#[test]
fn declared_action_target_is_silently_skipped_when_not_live() {
    let mut manager = new_manager();
    let mut pkg = activity_package("com.demo", "Main", &["Listener"]);
    pkg.components[1].actions = vec!["action.demo.PING".into()];
    manager.install_package(pkg);

    let effects = manager.send_broadcast(Intent::with_action("action.demo.PING"));
    assert!(!effects.iter().any(|e| matches!(e, Effect::ScheduleReceiveIntent { .. })));
}

#[test]
fn lmk_sweep_requests_stop_and_arms_fallback_kill_timer() {
    let mut manager = new_manager();
    manager.lmk_thresholds = vec![LmkThreshold { free_mem_bytes: 1_000_000, oom_score: 100 }];
    manager.priority.add(10, false, PriorityLevel::Middle);
    manager.priority.add(11, false, PriorityLevel::Middle);

    let effects = manager.lmk_sweep(500_000, 0);
    assert!(effects.iter().any(|e| matches!(e, Effect::RequestStop { pid: 10 })));
    assert!(effects.iter().any(|e| matches!(e, Effect::RequestStop { pid: 11 })));
    assert!(effects.iter().any(|e| matches!(e, Effect::SetTimer { id, .. } if id.kind() == Some(crate::timer::TimerKind::LmkDelayedKill { pid: 10 }))));
}

#[test]
fn system_ready_broadcasts_and_launches_home_when_setup_complete() {
    let mut manager = new_manager();
    manager.install_package(activity_package("com.demo.launcher", "Home", &[]));

    let effects = manager.system_ready(0);
    assert!(effects.iter().any(|e| matches!(e, Effect::SpawnProcess { package_name, .. } if package_name == "com.demo.launcher")));
}

#[test]
fn system_ready_is_noop_in_silence_mode() {
    let boot = BootConfig { home_package: "com.demo.launcher".into(), boot_guide_package: None, usersetup_complete: true };
    let mut manager = ActivityManager::new(RunMode::Silence, boot, Vec::new());
    manager.install_package(activity_package("com.demo.launcher", "Home", &[]));
    assert!(manager.system_ready(0).is_empty());
}
