// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Round-trip properties: every request/response we can build must survive
//! an encode/decode cycle unchanged, and framing must recover whatever
//! payload was written regardless of size.

use crate::{decode, encode, Request, Response};
use amcore::{CallerRef, Intent};
use proptest::prelude::*;

fn arb_intent_target() -> impl Strategy<Value = String> {
    "[a-z.]{1,32}".prop_map(|s| s.trim_matches('.').to_string())
}

proptest! {
    #[test]
    fn start_activity_request_round_trips(target in arb_intent_target(), request_code in -1i32..100) {
        let request = Request::StartActivity {
            caller: CallerRef::System,
            intent: Intent::with_target(target),
            request_code,
        };
        let bytes = encode(&request).unwrap();
        let back: Request = decode(&bytes).unwrap();
        prop_assert_eq!(back, request);
    }

    #[test]
    fn bool_response_round_trips(value in any::<bool>()) {
        let response = Response::Bool { value };
        let bytes = encode(&response).unwrap();
        let back: Response = decode(&bytes).unwrap();
        prop_assert_eq!(back, response);
    }

    #[test]
    fn dump_response_preserves_arbitrary_text(text in ".{0,256}") {
        let response = Response::Dump { text: text.clone() };
        let bytes = encode(&response).unwrap();
        let back: Response = decode(&bytes).unwrap();
        prop_assert_eq!(back, Response::Dump { text });
    }
}
