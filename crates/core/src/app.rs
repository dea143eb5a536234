// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Application process records and the transport endpoint identity they
//! attach through.

use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Opaque, comparable identity for a client's transport connection.
    ///
    /// Minted by the transport shim on connection accept; carried by the
    /// client's outbound schedule calls and by every pending-task label that
    /// is waiting on that client.
    pub struct EndpointToken("ept-");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppStatus {
    Running,
    Stopped,
}

/// A live client application process.
///
/// Strongly owned by the `pid -> AppRecord` live set; its activities and
/// services hold only a `pid` back-reference, never a strong handle to this
/// record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppRecord {
    pub pid: i32,
    pub uid: u32,
    pub package_name: String,
    pub is_system_ui: bool,
    pub endpoint: EndpointToken,
    pub status: AppStatus,
}

impl AppRecord {
    pub fn new(pid: i32, uid: u32, package_name: impl Into<String>, endpoint: EndpointToken) -> Self {
        AppRecord {
            pid,
            uid,
            package_name: package_name.into(),
            is_system_ui: false,
            endpoint,
            status: AppStatus::Running,
        }
    }

    pub fn system_ui(mut self, is_system_ui: bool) -> Self {
        self.is_system_ui = is_system_ui;
        self
    }
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod tests;
