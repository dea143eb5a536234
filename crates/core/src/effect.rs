// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effects represent side effects the runtime needs to perform: outbound
//! schedule calls to a client, process spawns, timers, and broadcasts.
//! Pure orchestration code returns a `Vec<Effect>`; the daemon's executor
//! is the only thing that actually performs them.

use crate::activity::{ActivityToken, StableState};
use crate::app::EndpointToken;
use crate::event::Event;
use crate::intent::Intent;
use crate::service::ServiceToken;
use crate::timer::TimerId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Effects that need to be executed by the runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    /// Emit an event back onto the main loop (used by effects that produce
    /// a follow-up orchestration step synchronously, e.g. after a pure
    /// computation rather than a real client round-trip).
    Emit { event: Event },

    // === Process lifecycle ===
    /// Ask the spawner to fork/exec the package's binary.
    SpawnProcess { package_name: String, exec_path: String, args: Vec<String> },
    /// Request a graceful stop of a process (used by the LMK executor).
    RequestStop { pid: i32 },
    /// Fallback hard kill, scheduled after the LMK grace period.
    KillProcess { pid: i32 },

    // === Activity schedule calls ===
    ScheduleLaunchActivity { endpoint: EndpointToken, token: ActivityToken, intent: Intent },
    ScheduleTransition { endpoint: EndpointToken, token: ActivityToken, step: StableState },
    DeliverActivityResult {
        endpoint: EndpointToken,
        token: ActivityToken,
        request_code: i32,
        result_code: i32,
        result_data: Option<Intent>,
    },
    DeliverNewIntent { endpoint: EndpointToken, token: ActivityToken, intent: Intent },

    // === Service schedule calls ===
    ScheduleStartService { endpoint: EndpointToken, token: ServiceToken, intent: Intent },
    ScheduleStopService { endpoint: EndpointToken, token: ServiceToken },
    ScheduleBindService { endpoint: EndpointToken, token: ServiceToken, intent: Intent },
    ScheduleUnbindService { endpoint: EndpointToken, token: ServiceToken },

    // === App-level schedule calls ===
    SetForegroundApplication { endpoint: EndpointToken, foreground: bool },
    TerminateApplication { endpoint: EndpointToken },
    ScheduleReceiveIntent { endpoint: EndpointToken, target: Option<ActivityOrServiceRef>, intent: Intent },

    // === Broadcast ===
    DeliverBroadcast { endpoint: EndpointToken, intent: Intent },

    // === Timers ===
    SetTimer {
        id: TimerId,
        #[serde(with = "duration_serde")]
        duration: Duration,
    },
    CancelTimer { id: TimerId },
}

/// Disambiguates which component on an endpoint a posted intent targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActivityOrServiceRef {
    Activity(ActivityToken),
    Service(ServiceToken),
}

impl Effect {
    /// Effect name for log spans (e.g. "spawn_process", "schedule_transition").
    pub fn name(&self) -> &'static str {
        match self {
            Effect::Emit { .. } => "emit",
            Effect::SpawnProcess { .. } => "spawn_process",
            Effect::RequestStop { .. } => "request_stop",
            Effect::KillProcess { .. } => "kill_process",
            Effect::ScheduleLaunchActivity { .. } => "schedule_launch_activity",
            Effect::ScheduleTransition { .. } => "schedule_transition",
            Effect::DeliverActivityResult { .. } => "deliver_activity_result",
            Effect::DeliverNewIntent { .. } => "deliver_new_intent",
            Effect::ScheduleStartService { .. } => "schedule_start_service",
            Effect::ScheduleStopService { .. } => "schedule_stop_service",
            Effect::ScheduleBindService { .. } => "schedule_bind_service",
            Effect::ScheduleUnbindService { .. } => "schedule_unbind_service",
            Effect::SetForegroundApplication { .. } => "set_foreground_application",
            Effect::TerminateApplication { .. } => "terminate_application",
            Effect::ScheduleReceiveIntent { .. } => "schedule_receive_intent",
            Effect::DeliverBroadcast { .. } => "deliver_broadcast",
            Effect::SetTimer { .. } => "set_timer",
            Effect::CancelTimer { .. } => "cancel_timer",
        }
    }

    /// Key-value pairs for structured logging.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            Effect::Emit { event } => vec![("event", format!("{event:?}"))],
            Effect::SpawnProcess { package_name, exec_path, .. } => {
                vec![("package", package_name.clone()), ("exec", exec_path.clone())]
            }
            Effect::RequestStop { pid } | Effect::KillProcess { pid } => {
                vec![("pid", pid.to_string())]
            }
            Effect::ScheduleLaunchActivity { token, intent, .. } => {
                vec![("activity", token.to_string()), ("intent", intent.to_string())]
            }
            Effect::ScheduleTransition { token, step, .. } => {
                vec![("activity", token.to_string()), ("step", step.to_string())]
            }
            Effect::DeliverActivityResult { token, result_code, .. } => {
                vec![("activity", token.to_string()), ("result_code", result_code.to_string())]
            }
            Effect::DeliverNewIntent { token, .. } => vec![("activity", token.to_string())],
            Effect::ScheduleStartService { token, .. }
            | Effect::ScheduleStopService { token }
            | Effect::ScheduleBindService { token, .. }
            | Effect::ScheduleUnbindService { token } => vec![("service", token.to_string())],
            Effect::SetForegroundApplication { endpoint, foreground } => {
                vec![("endpoint", endpoint.to_string()), ("foreground", foreground.to_string())]
            }
            Effect::TerminateApplication { endpoint } => vec![("endpoint", endpoint.to_string())],
            Effect::ScheduleReceiveIntent { endpoint, intent, .. } => {
                vec![("endpoint", endpoint.to_string()), ("intent", intent.to_string())]
            }
            Effect::DeliverBroadcast { endpoint, intent } => {
                vec![("endpoint", endpoint.to_string()), ("intent", intent.to_string())]
            }
            Effect::SetTimer { id, duration } => {
                vec![("timer_id", id.to_string()), ("duration_ms", duration.as_millis().to_string())]
            }
            Effect::CancelTimer { id } => vec![("timer_id", id.to_string())],
        }
    }

    /// Whether to log both "started" and "completed", vs just "executed",
    /// for frequent vs. infrequent effects.
    pub fn verbose(&self) -> bool {
        match self {
            Effect::SetTimer { .. } | Effect::CancelTimer { .. } | Effect::Emit { .. } => false,
            _ => true,
        }
    }
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, s: S) -> Result<S::Ok, S::Error> {
        duration.as_millis().serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let millis = u64::deserialize(d)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
#[path = "effect_tests.rs"]
mod tests;
