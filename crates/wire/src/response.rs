// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Outbound messages on a client connection: replies to a [`crate::Request`]
//! the client just sent, and one-way schedule calls the server pushes on its
//! own initiative (the transport shim's outbound stubs). Both travel the
//! same length-prefixed frame in the server-to-client direction, so they
//! share one enum.

use amcore::{ActivityOrServiceRef, ActivityToken, Intent, ServiceError, ServiceToken, StableState};
use serde::{Deserialize, Serialize};

/// Messages the daemon sends back over its Unix socket: either a direct
/// reply to a request, or an unsolicited schedule call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    /// Handshake acknowledgement, paired with `Request::Hello`.
    Hello { version: u32 },

    /// Acknowledges a request with no payload to return.
    Ok,

    /// `finishActivity` / `moveActivityTaskToBackground`.
    Bool { value: bool },

    /// `dump`.
    Dump { text: String },

    /// Any inbound method that failed, carrying the same integer status
    /// codes the original binder-style transport used (see
    /// `ServiceError::as_code`).
    Error { code: i32, message: String },

    // === Outbound schedule calls (server push, no reply expected) ===
    ScheduleLaunchActivity { token: ActivityToken, intent: Intent },
    ScheduleTransition { token: ActivityToken, step: StableState },
    OnActivityResult { token: ActivityToken, request_code: i32, result_code: i32, result_data: Option<Intent> },
    ScheduleReceiveNewIntent { token: ActivityToken, intent: Intent },

    ScheduleStartService { token: ServiceToken, intent: Intent },
    ScheduleStopService { token: ServiceToken },
    ScheduleBindService { token: ServiceToken, intent: Intent },
    ScheduleUnbindService { token: ServiceToken },

    SetForegroundApplication { foreground: bool },
    TerminateApplication,
    ScheduleReceiveIntent { target: Option<ActivityOrServiceRef>, intent: Intent },

    DeliverBroadcast { intent: Intent },
}

impl From<&ServiceError> for Response {
    fn from(err: &ServiceError) -> Self {
        Response::Error { code: err.as_code(), message: err.to_string() }
    }
}

impl From<ServiceError> for Response {
    fn from(err: ServiceError) -> Self {
        Response::from(&err)
    }
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
