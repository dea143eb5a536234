// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire protocol for the activity/service manager's Unix-socket transport.
//!
//! Wire format: 4-byte length prefix (big-endian) + JSON payload. Every
//! inbound service method carries one-to-one as a [`Request`] variant;
//! every reply as a [`Response`] variant.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod request;
mod response;
mod wire;

pub use request::Request;
pub use response::Response;
pub use wire::{decode, encode, read_message, read_request, write_message, write_response, ProtocolError, MAX_MESSAGE_BYTES};

#[cfg(test)]
mod property_tests;
