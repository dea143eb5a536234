// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Service identity and record. Services have an independent start/bind
//! lifecycle decoupled from any activity task.

use crate::caller::CallerRef;
use crate::intent::Intent;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a live service instance.
    pub struct ServiceToken("svc-");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    Creating,
    Created,
    Starting,
    Started,
    Binding,
    Bound,
    Unbinding,
    Unbound,
    Destroying,
    Destroyed,
}

crate::simple_display! {
    ServiceStatus {
        Creating => "creating",
        Created => "created",
        Starting => "starting",
        Started => "started",
        Binding => "binding",
        Bound => "bound",
        Unbinding => "unbinding",
        Unbound => "unbound",
        Destroying => "destroying",
        Destroyed => "destroyed",
    }
}

/// A single bind connection held against a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConnection {
    pub caller: CallerRef,
}

/// A live service instance, owned strongly by the `service_list` and weakly
/// referenced by its owning [`AppRecord`](crate::app::AppRecord).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub token: ServiceToken,
    pub unique_name: String,
    pub status: ServiceStatus,
    pub pid: i32,
    /// Whether `startService` has an outstanding start against this instance.
    pub started: bool,
    pub connections: Vec<ServiceConnection>,
    pub last_intent: Intent,
}

impl ServiceRecord {
    pub fn new(unique_name: impl Into<String>, pid: i32, intent: Intent) -> Self {
        ServiceRecord {
            token: ServiceToken::new(),
            unique_name: unique_name.into(),
            status: ServiceStatus::Creating,
            pid,
            started: false,
            connections: Vec::new(),
            last_intent: intent,
        }
    }

    /// A service with no outstanding start and no bindings is destroyable.
    pub fn is_idle(&self) -> bool {
        !self.started && self.connections.is_empty()
    }

    pub fn is_destroyed(&self) -> bool {
        self.status == ServiceStatus::Destroyed
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
