// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Activity identity, launch-mode policy, and the activity record.

use crate::caller::CallerRef;
use crate::intent::Intent;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a live activity instance.
    ///
    /// Minted when the activity is launched; stays stable for the instance's
    /// entire lifetime, across every state transition up to `Destroyed`.
    pub struct ActivityToken("act-");
}

/// Declared reuse policy for a launched activity, resolved against existing
/// instances before a new one is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchMode {
    /// Always creates a fresh instance on top of the caller's task.
    Standard,
    /// Reuses the top of the caller's task if it is the same component.
    SingleTop,
    /// At most one instance per task; existing instances absorb new intents.
    SingleTask,
    /// At most one instance system-wide, alone in its own task.
    SingleInstance,
}

impl Default for LaunchMode {
    fn default() -> Self {
        LaunchMode::Standard
    }
}

/// Stable lifecycle states an activity can be at rest in.
///
/// The `*ing` transient states used while waiting on a client status report
/// are represented separately by [`ActivityStatus`] — the driver only ever
/// targets a `StableState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StableState {
    Create,
    Start,
    Resume,
    Pause,
    Stop,
    Destroy,
}

crate::simple_display! {
    StableState {
        Create => "create",
        Start => "start",
        Resume => "resume",
        Pause => "pause",
        Stop => "stop",
        Destroy => "destroy",
    }
}

/// Full wire-visible activity status, including the `*ing` transients the
/// driver puts a component into while a schedule call is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    Creating,
    Created,
    Starting,
    Started,
    Resuming,
    Resumed,
    Pausing,
    Paused,
    Stopping,
    Stopped,
    Destroying,
    Destroyed,
}

impl ActivityStatus {
    /// The stable state this status is at rest in, or heading toward.
    pub fn stable(self) -> StableState {
        match self {
            ActivityStatus::Creating | ActivityStatus::Created => StableState::Create,
            ActivityStatus::Starting | ActivityStatus::Started => StableState::Start,
            ActivityStatus::Resuming | ActivityStatus::Resumed => StableState::Resume,
            ActivityStatus::Pausing | ActivityStatus::Paused => StableState::Pause,
            ActivityStatus::Stopping | ActivityStatus::Stopped => StableState::Stop,
            ActivityStatus::Destroying | ActivityStatus::Destroyed => StableState::Destroy,
        }
    }

    /// Whether this status is a stable (non-`*ing`) rest state.
    pub fn is_stable(self) -> bool {
        matches!(
            self,
            ActivityStatus::Created
                | ActivityStatus::Started
                | ActivityStatus::Resumed
                | ActivityStatus::Paused
                | ActivityStatus::Stopped
                | ActivityStatus::Destroyed
        )
    }

    /// The transient `*ing` status the driver assigns while it waits for a
    /// client report confirming `stable` was reached.
    pub fn pending(stable: StableState) -> ActivityStatus {
        match stable {
            StableState::Create => ActivityStatus::Creating,
            StableState::Start => ActivityStatus::Starting,
            StableState::Resume => ActivityStatus::Resuming,
            StableState::Pause => ActivityStatus::Pausing,
            StableState::Stop => ActivityStatus::Stopping,
            StableState::Destroy => ActivityStatus::Destroying,
        }
    }

    /// The stable status reached once the pending transition is confirmed.
    pub fn settled(stable: StableState) -> ActivityStatus {
        match stable {
            StableState::Create => ActivityStatus::Created,
            StableState::Start => ActivityStatus::Started,
            StableState::Resume => ActivityStatus::Resumed,
            StableState::Pause => ActivityStatus::Paused,
            StableState::Stop => ActivityStatus::Stopped,
            StableState::Destroy => ActivityStatus::Destroyed,
        }
    }
}

/// A live activity instance, owned strongly by the primary `activity_map` and
/// weakly referenced by its [`AppRecord`](crate::app::AppRecord) and owning
/// task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub token: ActivityToken,
    /// `pkg/cls` — stable across relaunches, used for `SINGLE_TASK`/`SINGLE_TOP` matching.
    pub unique_name: String,
    pub caller: Option<CallerRef>,
    pub request_code: i32,
    pub launch_mode: LaunchMode,
    pub status: ActivityStatus,
    /// The stable state the driver is currently steering this activity
    /// toward. Read back by `report_activity_status` to take the next step
    /// after each client confirmation, since a single `driver::advance`
    /// call only ever issues one edge of the transition table.
    pub target: StableState,
    pub intent: Intent,
    pub pid: i32,
    /// Task affinity tag; defaults to the owning package name.
    pub task_tag: String,
}

impl ActivityRecord {
    pub fn new(
        unique_name: impl Into<String>,
        pid: i32,
        task_tag: impl Into<String>,
        intent: Intent,
        launch_mode: LaunchMode,
    ) -> Self {
        ActivityRecord {
            token: ActivityToken::new(),
            unique_name: unique_name.into(),
            caller: None,
            request_code: -1,
            launch_mode,
            status: ActivityStatus::Creating,
            target: StableState::Create,
            intent,
            pid,
            task_tag: task_tag.into(),
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.status == ActivityStatus::Destroyed
    }
}

#[cfg(test)]
#[path = "activity_tests.rs"]
mod tests;
