// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Pending-Task Board: the registry of orchestrations the server is
//! waiting on asynchronous client feedback for.
//!
//! Every call that needs a client acknowledgment commits a [`PendingTask`]
//! under a [`TaskLabel`]; the matching client status report later arrives as
//! a [`TaskEvent`] and [`PendingTaskBoard::trigger`] walks the board in
//! insertion order looking for a label match.

use crate::activity::{ActivityStatus, ActivityToken};
use crate::effect::Effect;
use crate::service::{ServiceStatus, ServiceToken};
use std::fmt;

/// Default deadline for a committed task, matching the upstream
/// `REQUEST_TIMEOUT_MS`.
pub const DEFAULT_TIMEOUT_MS: u32 = 50_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    AppAttach,
    ActivityStatusReport,
    ActivityWaitResume,
    ServiceStatusReport,
    ActivityDelayDestroy,
}

/// The label a committed task is filed under. A field left `None` is a
/// wildcard: it matches any value the corresponding [`TaskEvent`] field
/// carries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskLabel {
    pub pid: Option<i32>,
    pub activity: Option<ActivityToken>,
    pub service: Option<ServiceToken>,
    pub desired_activity_status: Option<ActivityStatus>,
    pub desired_service_status: Option<ServiceStatus>,
}

impl TaskLabel {
    pub fn app_attach(pid: i32) -> Self {
        TaskLabel { pid: Some(pid), ..Default::default() }
    }

    pub fn activity_status_report(activity: ActivityToken, desired: ActivityStatus) -> Self {
        TaskLabel {
            activity: Some(activity),
            desired_activity_status: Some(desired),
            ..Default::default()
        }
    }

    pub fn activity_wait_resume(activity: ActivityToken) -> Self {
        TaskLabel { activity: Some(activity), ..Default::default() }
    }

    pub fn service_status_report(service: ServiceToken, desired: ServiceStatus) -> Self {
        TaskLabel {
            service: Some(service),
            desired_service_status: Some(desired),
            ..Default::default()
        }
    }

    fn kind(&self) -> TaskKind {
        if self.service.is_some() {
            TaskKind::ServiceStatusReport
        } else if self.desired_activity_status.is_some() {
            TaskKind::ActivityStatusReport
        } else if self.activity.is_some() {
            TaskKind::ActivityWaitResume
        } else {
            TaskKind::AppAttach
        }
    }

    fn matches(&self, event: &TaskEvent) -> bool {
        if self.kind() != event.kind {
            return false;
        }
        field_matches(self.pid, event.pid)
            && field_matches(self.activity, event.activity)
            && field_matches(self.service, event.service)
            && field_matches(self.desired_activity_status, event.activity_status)
            && field_matches(self.desired_service_status, event.service_status)
    }
}

fn field_matches<T: PartialEq>(label: Option<T>, event: Option<T>) -> bool {
    match label {
        Some(want) => event.as_ref() == Some(&want),
        None => true,
    }
}

/// A fired event, checked against every live label on the board.
#[derive(Debug, Clone)]
pub struct TaskEvent {
    pub kind: TaskKind,
    pub pid: Option<i32>,
    pub activity: Option<ActivityToken>,
    pub service: Option<ServiceToken>,
    pub activity_status: Option<ActivityStatus>,
    pub service_status: Option<ServiceStatus>,
    /// `MULTI_TRIGGER`: keep scanning past the first match instead of
    /// stopping at the first single-shot task that consumes it.
    pub multi_trigger: bool,
}

impl TaskEvent {
    pub fn app_attach(pid: i32) -> Self {
        TaskEvent {
            kind: TaskKind::AppAttach,
            pid: Some(pid),
            activity: None,
            service: None,
            activity_status: None,
            service_status: None,
            multi_trigger: false,
        }
    }

    pub fn activity_status_report(activity: ActivityToken, status: ActivityStatus) -> Self {
        TaskEvent {
            kind: TaskKind::ActivityStatusReport,
            pid: None,
            activity: Some(activity),
            service: None,
            activity_status: Some(status),
            service_status: None,
            multi_trigger: false,
        }
    }

    pub fn service_status_report(service: ServiceToken, status: ServiceStatus) -> Self {
        TaskEvent {
            kind: TaskKind::ServiceStatusReport,
            pid: None,
            activity: None,
            service: Some(service),
            activity_status: None,
            service_status: Some(status),
            multi_trigger: false,
        }
    }
}

/// The unit of work held on the board: something to run when its label
/// matches, and something to run if its deadline elapses first.
pub trait PendingTask: fmt::Debug + Send {
    fn execute(&mut self, event: &TaskEvent) -> Vec<Effect>;
    fn timeout(&mut self) -> Vec<Effect>;
}

struct BoardEntry {
    label: TaskLabel,
    task: Box<dyn PendingTask>,
    done: bool,
    deadline_ms: Option<u64>,
}

/// The board itself: an insertion-ordered list of committed tasks.
///
/// Runs entirely on the single-threaded event loop; no internal locking.
#[derive(Default)]
pub struct PendingTaskBoard {
    entries: Vec<BoardEntry>,
    /// Debug mode (run-mode file value `2`) disables timeouts entirely.
    pub debug_no_timeout: bool,
}

impl PendingTaskBoard {
    pub fn new() -> Self {
        PendingTaskBoard { entries: Vec::new(), debug_no_timeout: false }
    }

    /// Register a task. `timeout_ms` of `None` means "use the default
    /// 50s deadline"; pass `Some(0)` for no deadline at all.
    pub fn commit(
        &mut self,
        label: TaskLabel,
        task: Box<dyn PendingTask>,
        timeout_ms: Option<u32>,
        now_ms: u64,
    ) {
        let effective_timeout = if self.debug_no_timeout {
            None
        } else {
            match timeout_ms {
                Some(0) => None,
                Some(ms) => Some(ms),
                None => Some(DEFAULT_TIMEOUT_MS),
            }
        };
        let deadline_ms = effective_timeout.map(|ms| now_ms + ms as u64);
        self.purge_done();
        self.entries.push(BoardEntry { label, task, done: false, deadline_ms });
    }

    /// Deliver `event` to the first not-yet-done matching task (in
    /// insertion order), continuing past it only if `event.multi_trigger`.
    pub fn trigger(&mut self, event: &TaskEvent) -> Vec<Effect> {
        let mut effects = Vec::new();
        for entry in self.entries.iter_mut() {
            if entry.done || !entry.label.matches(event) {
                continue;
            }
            effects.extend(entry.task.execute(event));
            entry.done = true;
            if !event.multi_trigger {
                break;
            }
        }
        self.purge_done();
        effects
    }

    /// Fire `timeout()` on every entry whose deadline has elapsed and
    /// remove it from the board.
    pub fn sweep_timeouts(&mut self, now_ms: u64) -> Vec<Effect> {
        let mut effects = Vec::new();
        for entry in self.entries.iter_mut() {
            if entry.done {
                continue;
            }
            if let Some(deadline) = entry.deadline_ms {
                if now_ms >= deadline {
                    effects.extend(entry.task.timeout());
                    entry.done = true;
                }
            }
        }
        self.purge_done();
        effects
    }

    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| !e.done).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn purge_done(&mut self) {
        self.entries.retain(|e| !e.done);
    }
}

impl fmt::Debug for PendingTaskBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingTaskBoard").field("pending", &self.len()).finish()
    }
}

#[cfg(test)]
#[path = "pending_tests.rs"]
mod tests;
