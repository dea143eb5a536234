// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::activity::ActivityToken;
use crate::app::EndpointToken;
use crate::intent::Intent;

#[test]
fn name_matches_variant() {
    let effect = Effect::ScheduleLaunchActivity {
        endpoint: EndpointToken::new(),
        token: ActivityToken::new(),
        intent: Intent::with_target("pkg/cls"),
    };
    assert_eq!(effect.name(), "schedule_launch_activity");
}

#[test]
fn fields_include_activity_token() {
    let token = ActivityToken::new();
    let effect = Effect::DeliverActivityResult {
        endpoint: EndpointToken::new(),
        token,
        request_code: 7,
        result_code: 0,
        result_data: None,
    };
    let fields = effect.fields();
    assert!(fields.iter().any(|(k, v)| *k == "activity" && v == &token.to_string()));
    assert!(fields.iter().any(|(k, v)| *k == "result_code" && v == "0"));
}

#[test]
fn timer_effects_are_quiet() {
    let set = Effect::SetTimer { id: crate::timer::TimerId::lmk_poll(), duration: Duration::from_millis(50) };
    assert!(!set.verbose());
    let cancel = Effect::CancelTimer { id: crate::timer::TimerId::lmk_poll() };
    assert!(!cancel.verbose());
}

#[test]
fn spawn_process_is_verbose() {
    let effect = Effect::SpawnProcess {
        package_name: "com.example.app".to_string(),
        exec_path: "/bin/app".to_string(),
        args: vec![],
    };
    assert!(effect.verbose());
}

#[test]
fn serde_round_trip() {
    let effect = Effect::KillProcess { pid: 42 };
    let json = serde_json::to_string(&effect).expect("serialize");
    let back: Effect = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(effect, back);
}
