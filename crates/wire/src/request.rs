// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inbound service methods, carried one-to-one as `Request` variants.

use amcore::{ActivityStatus, ActivityToken, CallerRef, EndpointToken, Intent, ServiceStatus, ServiceToken};
use serde::{Deserialize, Serialize};

/// Requests the daemon accepts over its Unix socket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Request {
    /// Version handshake, sent once per connection before anything else.
    Hello { version: u32 },

    /// A client process finished initializing.
    AttachApplication { pid: i32, uid: u32 },

    StartActivity { caller: CallerRef, intent: Intent, request_code: i32 },
    StopActivity { intent: Intent, result_code: i32 },
    FinishActivity { token: ActivityToken, result_code: i32, #[serde(default)] result_data: Option<Intent> },
    MoveActivityTaskToBackground { token: ActivityToken, non_root: bool },
    ReportActivityStatus { token: ActivityToken, status: ActivityStatus },

    StartService { caller: CallerRef, intent: Intent },
    StopService { intent: Intent },
    StopServiceByToken { token: ServiceToken },
    BindService { caller: CallerRef, intent: Intent },
    UnbindService { caller: CallerRef, service: ServiceToken },
    /// The service process handing back its binder once created/connected.
    PublishService { token: ServiceToken, binder_handle: String },
    ReportServiceStatus { token: ServiceToken, status: ServiceStatus },

    PostIntent { intent: Intent },
    SendBroadcast { intent: Intent },
    RegisterReceiver { action: String, endpoint: EndpointToken },
    UnregisterReceiver { action: String, endpoint: EndpointToken },

    /// Debug dump of tasks, services, and the priority list.
    Dump,
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
