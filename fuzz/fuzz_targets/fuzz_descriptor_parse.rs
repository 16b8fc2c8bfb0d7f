// Copyright (c) 2026 Amunchain
// Licensed under the Apache-2.0 License.

#![no_main]
#![forbid(unsafe_code)]

use libfuzzer_sys::fuzz_target;
use rendcore::crypto::testing::FakePublicKey;
use rendcore::rend;

fuzz_target!(|data: &[u8]| {
    // Parsing must never panic, regardless of how the bytes are malformed.
    let _ = rend::parse::<FakePublicKey>(data);
});
