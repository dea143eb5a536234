// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn error_codes_match_the_binder_style_contract() {
    assert_eq!(ServiceError::BadValue("x".into()).as_code(), -1);
    assert_eq!(ServiceError::InvalidOperation("x".into()).as_code(), -2);
    assert_eq!(ServiceError::FailedTransaction("x".into()).as_code(), -3);
    assert_eq!(ServiceError::DeadObject("x".into()).as_code(), -4);
}

#[test]
fn display_messages_include_the_detail_string() {
    let err = ServiceError::BadValue("no such target".into());
    assert_eq!(err.to_string(), "bad value: no such target");
}

#[test]
fn codes_are_all_distinct() {
    let codes = [
        ServiceError::BadValue(String::new()).as_code(),
        ServiceError::InvalidOperation(String::new()).as_code(),
        ServiceError::FailedTransaction(String::new()).as_code(),
        ServiceError::DeadObject(String::new()).as_code(),
    ];
    for (i, a) in codes.iter().enumerate() {
        for (j, b) in codes.iter().enumerate() {
            if i != j {
                assert_ne!(a, b);
            }
        }
    }
}
