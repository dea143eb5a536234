// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Intents: the addressed messages the router resolves into a launch,
//! a stop, or a broadcast delivery.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Whether a resolved target is an activity or a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentType {
    Activity,
    Service,
}

bitflags::bitflags! {
    /// Flags controlling how a launch interacts with existing task state.
    ///
    /// Bit values match the historical `app::Intent` header this design was
    /// distilled from (`NEW_TASK`..`CLEAR_TASK`); the three spec-added flags
    /// continue the same bit sequence.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct IntentFlags: u32 {
        const NEW_TASK = 1;
        const SINGLE_TOP = 2;
        const CLEAR_TOP = 4;
        const CLEAR_TASK = 8;
        const APP_MOVE_BACK = 16;
        const APP_SWITCH_TASK = 32;
        const MULTIPLE_TASK = 64;
    }
}

/// A single key-value extra in an intent's data bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Extra {
    Int(i64),
    Double(f64),
    Bool(bool),
    Str(String),
}

/// An addressed message: a target or action, optional data, flags, and a
/// key-value bundle of extras.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    /// `pkg[/cls]`, or a system-prefixed sink such as `@target.activity.TOP_RESUME`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub target: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub action: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub data: String,
    #[serde(default)]
    pub flags: u32,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub extras: HashMap<String, Extra>,
}

impl Intent {
    pub fn with_target(target: impl Into<String>) -> Self {
        Intent { target: target.into(), ..Default::default() }
    }

    pub fn with_action(action: impl Into<String>) -> Self {
        Intent { action: action.into(), ..Default::default() }
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = data.into();
        self
    }

    pub fn flags(&self) -> IntentFlags {
        IntentFlags::from_bits_truncate(self.flags)
    }

    pub fn set_flags(mut self, flags: IntentFlags) -> Self {
        self.flags = flags.bits();
        self
    }

    pub fn add_flag(&mut self, flag: IntentFlags) {
        self.flags |= flag.bits();
    }

    /// Split `target` into `(package_name, component_name)`. `component_name`
    /// is empty when the target names a package only.
    pub fn split_target(&self) -> (&str, &str) {
        match self.target.split_once('/') {
            Some((pkg, cls)) => (pkg, cls),
            None => (self.target.as_str(), ""),
        }
    }

    pub fn is_system_target(&self) -> bool {
        self.target.starts_with(TARGET_PREFIX)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.target.is_empty() {
            write!(f, "target={}", self.target)
        } else {
            write!(f, "action={}", self.action)
        }
    }
}

/// Prefix identifying a built-in system sink rather than a `pkg[/cls]` target.
pub const TARGET_PREFIX: &str = "@target.";
pub const TARGET_ACTIVITY_TOP_RESUME: &str = "@target.activity.TOP_RESUME";
pub const TARGET_APPLICATION_FOREGROUND: &str = "@target.application.FOREGROUND";
pub const TARGET_APPLICATION_HOME: &str = "@target.application.HOME";

pub const ACTION_BOOT_READY: &str = "action.system.BOOT_READY";
pub const ACTION_BOOT_COMPLETED: &str = "action.system.BOOT_COMPLETED";
pub const ACTION_HOME: &str = "action.system.HOME";
pub const ACTION_BOOT_GUIDE: &str = "action.system.BOOT_GUIDE";

pub const BROADCAST_APP_START: &str = "broadcast.system.APP_START";
pub const BROADCAST_APP_EXIT: &str = "broadcast.system.APP_EXIT";
pub const BROADCAST_TOP_ACTIVITY: &str = "broadcast.system.TOP_ACTIVITY";

#[cfg(test)]
#[path = "intent_tests.rs"]
mod tests;
