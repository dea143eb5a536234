// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Caller identification for intent dispatch and broadcast routing.
//!
//! A request into the manager always names who's asking: an activity, a
//! service, or the server itself (boot sequence, LMK). This tagged union
//! carries that identity across the pending-task board and into the intent
//! router's caller-context rule.

use crate::activity::ActivityToken;
use crate::service::ServiceToken;
use std::fmt;

/// Identity of the component that issued a request.
///
/// Serializes as a string using Display format:
/// - `"act-V1StGXR8_Zm5M9z3x"`
/// - `"svc-kL9mP2nQ_Az8Nk4wx"`
/// - `"system"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallerRef {
    Activity(ActivityToken),
    Service(ServiceToken),
    /// The server itself: boot sequence, LMK, process-death cleanup.
    System,
}

impl CallerRef {
    pub fn activity(token: ActivityToken) -> Self {
        CallerRef::Activity(token)
    }

    pub fn service(token: ServiceToken) -> Self {
        CallerRef::Service(token)
    }

    pub fn as_activity(&self) -> Option<&ActivityToken> {
        match self {
            CallerRef::Activity(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_service(&self) -> Option<&ServiceToken> {
        match self {
            CallerRef::Service(t) => Some(t),
            _ => None,
        }
    }

    /// Whether this caller has no navigable activity context of its own —
    /// the intent router's caller-context rule forces `NEW_TASK` for these.
    pub fn has_no_activity_context(&self) -> bool {
        !matches!(self, CallerRef::Activity(_))
    }

    pub fn parse(s: &str) -> Result<Self, InvalidCallerRef> {
        if s == "system" {
            Ok(CallerRef::System)
        } else if s.starts_with(ActivityToken::PREFIX) {
            Ok(CallerRef::Activity(ActivityToken::from_string(s)))
        } else if s.starts_with(ServiceToken::PREFIX) {
            Ok(CallerRef::Service(ServiceToken::from_string(s)))
        } else {
            Err(InvalidCallerRef(s.to_string()))
        }
    }
}

impl fmt::Display for CallerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallerRef::Activity(t) => write!(f, "{t}"),
            CallerRef::Service(t) => write!(f, "{t}"),
            CallerRef::System => write!(f, "system"),
        }
    }
}

impl serde::Serialize for CallerRef {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for CallerRef {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        CallerRef::parse(&s).map_err(serde::de::Error::custom)
    }
}

impl From<ActivityToken> for CallerRef {
    fn from(t: ActivityToken) -> Self {
        CallerRef::Activity(t)
    }
}

impl From<ServiceToken> for CallerRef {
    fn from(t: ServiceToken) -> Self {
        CallerRef::Service(t)
    }
}

/// Invalid caller reference format.
#[derive(Debug, Clone)]
pub struct InvalidCallerRef(pub String);

impl fmt::Display for InvalidCallerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid caller reference: {}", self.0)
    }
}

impl std::error::Error for InvalidCallerRef {}

#[cfg(test)]
#[path = "caller_tests.rs"]
mod tests;
