// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use amcore::ServiceError;

#[test]
fn error_response_carries_the_service_error_code() {
    let err = ServiceError::BadValue("no such component".into());
    let response: Response = (&err).into();
    assert_eq!(response, Response::Error { code: -1, message: err.to_string() });
}

#[test]
fn bool_response_round_trips_through_json() {
    let response = Response::Bool { value: true };
    let json = serde_json::to_string(&response).unwrap();
    let back: Response = serde_json::from_str(&json).unwrap();
    assert_eq!(response, back);
}
