// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timer identifier type for tracking scheduled timers.
//!
//! Timers back the pending-task board's deadlines and the low-memory
//! killer's delayed-kill / poll schedule. The string encoding lets a
//! `TimerId` round-trip into a [`TimerKind`] for routing a fire back to the
//! right handler without a side-table.

crate::define_id! {
    /// Unique identifier for a timer instance.
    pub struct TimerId("tmr-");
}

impl TimerId {
    pub fn app_attach(pid: i32) -> Self {
        TimerKind::AppAttach { pid }.to_timer_id()
    }

    pub fn activity_status(activity: &str) -> Self {
        TimerKind::ActivityStatus { activity: activity.to_string() }.to_timer_id()
    }

    pub fn service_status(service: &str) -> Self {
        TimerKind::ServiceStatus { service: service.to_string() }.to_timer_id()
    }

    pub fn lmk_delayed_kill(pid: i32) -> Self {
        TimerKind::LmkDelayedKill { pid }.to_timer_id()
    }

    pub fn lmk_poll() -> Self {
        TimerKind::LmkPoll.to_timer_id()
    }

    /// Parse this timer ID into a typed `TimerKind`.
    pub fn kind(&self) -> Option<TimerKind> {
        TimerKind::parse(self.as_str())
    }
}

/// Parsed representation of a timer ID for type-safe routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerKind {
    AppAttach { pid: i32 },
    ActivityStatus { activity: String },
    ServiceStatus { service: String },
    LmkDelayedKill { pid: i32 },
    LmkPoll,
}

impl TimerKind {
    /// Parse a timer ID string into a typed `TimerKind`.
    pub fn parse(id: &str) -> Option<TimerKind> {
        if let Some(rest) = id.strip_prefix("app-attach:") {
            return Some(TimerKind::AppAttach { pid: rest.parse().ok()? });
        }
        if let Some(rest) = id.strip_prefix("activity-status:") {
            return Some(TimerKind::ActivityStatus { activity: rest.to_string() });
        }
        if let Some(rest) = id.strip_prefix("service-status:") {
            return Some(TimerKind::ServiceStatus { service: rest.to_string() });
        }
        if let Some(rest) = id.strip_prefix("lmk-delayed-kill:") {
            return Some(TimerKind::LmkDelayedKill { pid: rest.parse().ok()? });
        }
        if id == "lmk-poll" {
            return Some(TimerKind::LmkPoll);
        }
        None
    }

    /// Format this `TimerKind` back into a canonical `TimerId`.
    pub fn to_timer_id(&self) -> TimerId {
        match self {
            TimerKind::AppAttach { pid } => TimerId::new(format!("app-attach:{pid}")),
            TimerKind::ActivityStatus { activity } => {
                TimerId::new(format!("activity-status:{activity}"))
            }
            TimerKind::ServiceStatus { service } => {
                TimerId::new(format!("service-status:{service}"))
            }
            TimerKind::LmkDelayedKill { pid } => TimerId::new(format!("lmk-delayed-kill:{pid}")),
            TimerKind::LmkPoll => TimerId::new("lmk-poll"),
        }
    }
}

#[cfg(test)]
#[path = "timer_tests.rs"]
mod tests;
