// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Events are what feeds the main loop: client status reports, process
//! lifecycle notifications, timer fires, and inbound requests once decoded.
//! Every event is handled on the single-threaded loop in arrival order.

use crate::activity::{ActivityStatus, ActivityToken};
use crate::app::EndpointToken;
use crate::intent::Intent;
use crate::service::{ServiceStatus, ServiceToken};
use crate::timer::TimerId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A client finished initializing and is ready to receive schedule calls.
    #[serde(rename = "app_attached")]
    AppAttached { pid: i32, uid: u32, endpoint: EndpointToken },

    /// Spawner reported the forked process actually started.
    #[serde(rename = "process_spawned")]
    ProcessSpawned { package_name: String, pid: i32 },

    /// Spawner could not fork/exec the package's binary.
    #[serde(rename = "process_spawn_failed")]
    ProcessSpawnFailed { package_name: String, reason: String },

    /// A tracked pid exited (SIGCHLD-equivalent notification).
    #[serde(rename = "process_exited")]
    ProcessExited { pid: i32 },

    /// Client reported an activity reached a new status.
    #[serde(rename = "activity_status_reported")]
    ActivityStatusReported { token: ActivityToken, status: ActivityStatus },

    /// Client reported a service reached a new status.
    #[serde(rename = "service_status_reported")]
    ServiceStatusReported { token: ServiceToken, status: ServiceStatus },

    /// `publishService` — the service handed back its binder.
    #[serde(rename = "service_published")]
    ServicePublished { token: ServiceToken },

    /// A committed timer fired.
    #[serde(rename = "timer_fired")]
    TimerFired { id: TimerId },

    /// Memory monitor observed a pressure sample; carries free memory in bytes.
    #[serde(rename = "memory_pressure")]
    MemoryPressure { free_bytes: u64 },

    /// `system_ready` was called — begins the boot sequence.
    #[serde(rename = "system_ready")]
    SystemReady,

    /// A post/broadcast intent arrived for dispatch.
    #[serde(rename = "intent_posted")]
    IntentPosted { intent: Intent },
}

impl Event {
    /// Short summary for structured log lines.
    pub fn log_summary(&self) -> String {
        match self {
            Event::AppAttached { pid, .. } => format!("app_attached pid={pid}"),
            Event::ProcessSpawned { package_name, pid } => {
                format!("process_spawned pkg={package_name} pid={pid}")
            }
            Event::ProcessSpawnFailed { package_name, reason } => {
                format!("process_spawn_failed pkg={package_name} reason={reason}")
            }
            Event::ProcessExited { pid } => format!("process_exited pid={pid}"),
            Event::ActivityStatusReported { token, status } => {
                format!("activity_status_reported activity={token} status={status}")
            }
            Event::ServiceStatusReported { token, status } => {
                format!("service_status_reported service={token} status={status}")
            }
            Event::ServicePublished { token } => format!("service_published service={token}"),
            Event::TimerFired { id } => format!("timer_fired id={id}"),
            Event::MemoryPressure { free_bytes } => format!("memory_pressure free={free_bytes}"),
            Event::SystemReady => "system_ready".to_string(),
            Event::IntentPosted { intent } => format!("intent_posted {intent}"),
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
