// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The activity lifecycle driver's re-entrant engine: turns a
//! `lifecycle::next_step` decision into the actual schedule-call effect and
//! the pending-task-board bookkeeping around it.
//!
//! [`begin`] launches a freshly-created activity and aims it at a target
//! stable state; [`advance`] re-enters the driver every time a client
//! status report confirms the previous step landed, continuing one edge of
//! the transition table per call until `current == target`.
//!
//! The board entries committed here are bookkeeping/timeout markers only —
//! matching the spec's `execute()`/`timeout()` shape — but the actual state
//! mutation and next-step decision happens here, driven by the manager
//! calling [`continue_drive`] on every `ActivityStatusReported` event,
//! because a `Box<dyn PendingTask>` has no access back into the registry.
//! Each activity stores its own in-flight target
//! ([`crate::activity::ActivityRecord::target`]) so `continue_drive` can
//! recover "what am I driving this activity toward" from the registry alone.

use crate::activity::{ActivityStatus, ActivityToken, StableState};
use crate::app::EndpointToken;
use crate::effect::Effect;
use crate::lifecycle::next_step;
use crate::pending::{PendingTask, PendingTaskBoard, TaskEvent, TaskLabel};
use crate::registry::Registry;

/// No-op board entry: the board is used here purely for visibility
/// (`dump`) and timeout bookkeeping. The real continuation runs inline in
/// [`advance`], called directly by the manager on each status report.
#[derive(Debug)]
pub struct StatusWaitMarker;

impl PendingTask for StatusWaitMarker {
    fn execute(&mut self, _event: &TaskEvent) -> Vec<Effect> {
        Vec::new()
    }

    fn timeout(&mut self) -> Vec<Effect> {
        Vec::new()
    }
}

/// Launches `token` (already `Creating` in the registry) and commits the
/// wait for its `Created` report.
pub fn begin(
    registry: &mut Registry,
    board: &mut PendingTaskBoard,
    endpoint: EndpointToken,
    token: ActivityToken,
    target: StableState,
    now_ms: u64,
) -> Vec<Effect> {
    let Some(activity) = registry.activity_mut(token) else { return Vec::new() };
    activity.status = ActivityStatus::Creating;
    activity.target = target;
    let intent = activity.intent.clone();

    board.commit(
        TaskLabel::activity_status_report(token, ActivityStatus::Created),
        Box::new(StatusWaitMarker),
        None,
        now_ms,
    );

    vec![Effect::ScheduleLaunchActivity { endpoint, token, intent }]
}

/// Re-enters the driver: `current` is the just-confirmed stable status
/// (already written into the registry by the caller); computes and issues
/// the next step toward `target`, or does nothing if already there.
pub fn advance(
    registry: &mut Registry,
    board: &mut PendingTaskBoard,
    endpoint: EndpointToken,
    token: ActivityToken,
    current: StableState,
    target: StableState,
    now_ms: u64,
) -> Vec<Effect> {
    let Some(next) = next_step(current, target) else { return Vec::new() };
    if let Some(activity) = registry.activity_mut(token) {
        activity.status = ActivityStatus::pending(next);
        activity.target = target;
    }
    board.commit(
        TaskLabel::activity_status_report(token, ActivityStatus::settled(next)),
        Box::new(StatusWaitMarker),
        None,
        now_ms,
    );
    vec![Effect::ScheduleTransition { endpoint, token, step: next }]
}

/// Re-enters the driver from a client status report alone: reads the
/// just-settled status and the activity's stored target back out of the
/// registry and issues the next edge, if any remain.
pub fn continue_drive(
    registry: &mut Registry,
    board: &mut PendingTaskBoard,
    token: ActivityToken,
    now_ms: u64,
) -> Vec<Effect> {
    let Some(activity) = registry.activity(token) else { return Vec::new() };
    let Some(endpoint) = registry.app(activity.pid).map(|a| a.endpoint) else { return Vec::new() };
    let current = activity.status.stable();
    let target = activity.target;
    advance(registry, board, endpoint, token, current, target, now_ms)
}

/// Transitions an activity straight to `Destroyed` without contacting the
/// client — used on abnormal process exit. Fires any pending status-report
/// waiter for this activity so callers blocked on it don't hang until
/// their timeout.
pub fn abnormal_exit(
    registry: &mut Registry,
    board: &mut PendingTaskBoard,
    token: ActivityToken,
) -> Vec<Effect> {
    if let Some(activity) = registry.activity_mut(token) {
        activity.status = ActivityStatus::Destroyed;
    }
    let mut event = TaskEvent::activity_status_report(token, ActivityStatus::Destroyed);
    event.multi_trigger = true;
    board.trigger(&event)
}

#[cfg(test)]
#[path = "driver_tests.rs"]
mod tests;
