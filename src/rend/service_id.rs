// Copyright (c) 2026 Amunchain
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//     http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Service-ID derivation: the short, human-comparable name of a hidden
//! service, derived from the first 10 bytes of its public key's digest,
//! base32-encoded with the lowercase `a-z2-7` alphabet.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use data_encoding::{Encoding, Specification};
use thiserror::Error;

use crate::crypto::PublicKey;

/// Length in characters of a service ID.
pub const SID_LEN: usize = 16;

const DIGEST_PREFIX_LEN: usize = 10;

/// Failures deriving a service ID from a key (§7, `IdError`).
#[derive(Debug, Error)]
pub enum IdError {
    /// The key's digest could not be computed.
    #[error("digest computation failed")]
    DigestFailed,
    /// Base32 encoding of the digest prefix failed.
    #[error("base32 encoding failed")]
    EncodeFailed,
}

/// `query` was not a syntactically well-formed service ID.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceIdParseError {
    /// The string's length is not [`SID_LEN`].
    #[error("service id must be {SID_LEN} characters")]
    WrongLength,
    /// A character outside the base32 `a-z2-7` alphabet was found.
    #[error("service id contains characters outside a-z2-7")]
    BadAlphabet,
}

fn base32_lower() -> &'static Encoding {
    static ENCODING: OnceLock<Encoding> = OnceLock::new();
    ENCODING.get_or_init(|| {
        let mut spec = Specification::new();
        spec.symbols.push_str("abcdefghijklmnopqrstuvwxyz234567");
        spec.encoding().expect("valid base32 specification")
    })
}

/// A service ID: `SID_LEN` lowercase `a-z2-7` characters.
///
/// Always stored in canonical (lowercase) form — case folding happens once,
/// at construction, rather than at every comparison.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServiceId([u8; SID_LEN]);

impl ServiceId {
    /// Derive the service ID for `public_key` (§4.2).
    pub fn for_key<P: PublicKey>(public_key: &P) -> Result<Self, IdError> {
        let digest = public_key.digest();
        let prefix = &digest[..DIGEST_PREFIX_LEN];
        let encoded = base32_lower().encode(prefix);
        if encoded.len() != SID_LEN {
            return Err(IdError::EncodeFailed);
        }
        let mut out = [0u8; SID_LEN];
        out.copy_from_slice(encoded.as_bytes());
        Ok(Self(out))
    }

    /// Borrow the canonical lowercase ASCII representation.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).expect("service id bytes are always ascii")
    }
}

impl FromStr for ServiceId {
    type Err = ServiceIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != SID_LEN {
            return Err(ServiceIdParseError::WrongLength);
        }
        if !s.is_ascii() {
            return Err(ServiceIdParseError::BadAlphabet);
        }
        let lower = s.to_ascii_lowercase();
        if !lower.bytes().all(|b| matches!(b, b'a'..=b'z' | b'2'..=b'7')) {
            return Err(ServiceIdParseError::BadAlphabet);
        }
        let mut out = [0u8; SID_LEN];
        out.copy_from_slice(lower.as_bytes());
        Ok(Self(out))
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ServiceId").field(&self.as_str()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::testing::FakePrivateKey;

    #[test]
    fn service_id_is_stable_and_well_formed() {
        let key = FakePrivateKey::generate(b"stable-service", b"mac-key");
        let id = ServiceId::for_key(&key.public_key()).expect("derive");
        assert_eq!(id.as_str().len(), SID_LEN);
        assert!(id.as_str().bytes().all(|b| matches!(b, b'a'..=b'z' | b'2'..=b'7')));

        let id_again = ServiceId::for_key(&key.public_key()).expect("derive");
        assert_eq!(id, id_again);
    }

    #[test]
    fn different_keys_yield_different_ids() {
        let a = FakePrivateKey::generate(b"service-a", b"mac-key-a");
        let b = FakePrivateKey::generate(b"service-b", b"mac-key-b");
        assert_ne!(
            ServiceId::for_key(&a.public_key()).unwrap(),
            ServiceId::for_key(&b.public_key()).unwrap()
        );
    }

    #[test]
    fn parse_is_case_insensitive() {
        let key = FakePrivateKey::generate(b"case-test", b"mac-key");
        let id = ServiceId::for_key(&key.public_key()).expect("derive");
        let upper = id.as_str().to_ascii_uppercase();
        let parsed: ServiceId = upper.parse().expect("parse uppercase");
        assert_eq!(parsed, id);
    }

    #[test]
    fn parse_rejects_wrong_length() {
        assert_eq!(
            "short".parse::<ServiceId>(),
            Err(ServiceIdParseError::WrongLength)
        );
    }

    #[test]
    fn parse_rejects_bad_alphabet() {
        // '1', '0', '8', '9' are outside the a-z2-7 alphabet.
        assert_eq!(
            "10189abcdefghijk".parse::<ServiceId>(),
            Err(ServiceIdParseError::BadAlphabet)
        );
    }
}
