// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Broadcast receiver registry: `action -> [endpoint]`, delivered in
//! registration order. Endpoint tokens are small and live counts are
//! expected to stay under 20, so lookups are linear scans rather than a
//! secondary index — matching the upstream receiver table's own shape.

use crate::app::EndpointToken;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct ReceiverRegistry {
    receivers: HashMap<String, Vec<EndpointToken>>,
}

impl ReceiverRegistry {
    pub fn new() -> Self {
        ReceiverRegistry::default()
    }

    /// `register_receiver(action, receiver)`: append to `receivers[action]`.
    pub fn register(&mut self, action: impl Into<String>, receiver: EndpointToken) {
        self.receivers.entry(action.into()).or_default().push(receiver);
    }

    /// `unregister_receiver(receiver)`: remove from all lists; prune empty
    /// entries.
    pub fn unregister(&mut self, receiver: EndpointToken) {
        self.receivers.retain(|_, list| {
            list.retain(|r| *r != receiver);
            !list.is_empty()
        });
    }

    /// Receivers registered for `action`, in registration order.
    pub fn receivers_for(&self, action: &str) -> &[EndpointToken] {
        self.receivers.get(action).map(|v| v.as_slice()).unwrap_or(&[])
    }
}

#[cfg(test)]
#[path = "broadcast_tests.rs"]
mod tests;
