// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire-level error kinds returned to callers. These are recoverable by
//! design — every inbound method returns one of these instead of panicking
//! on bad input; only reactor-initialization failure is fatal (see
//! `amdaemon::lifecycle`).

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// Unresolvable target/action, or a stop request for an unknown target.
    #[error("bad value: {0}")]
    BadValue(String),

    /// Spawner refused, or an LMK/launch-environment check failed.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Transport-level failure.
    #[error("failed transaction: {0}")]
    FailedTransaction(String),

    /// Target no longer exists.
    #[error("dead object: {0}")]
    DeadObject(String),
}

impl ServiceError {
    /// Integer code carried across the wire, matching the historical
    /// binder-style status values this design continues.
    pub fn as_code(&self) -> i32 {
        match self {
            ServiceError::BadValue(_) => -1,
            ServiceError::InvalidOperation(_) => -2,
            ServiceError::FailedTransaction(_) => -3,
            ServiceError::DeadObject(_) => -4,
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;
