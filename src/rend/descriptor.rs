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

//! Service descriptor wire codec.
//!
//! Wire format (all multi-byte integers big-endian):
//!
//! ```text
//! offset  field              size
//! 0       asn1_len           uint16
//! 2       pk_asn1_der        asn1_len bytes
//! …       timestamp          uint32  (seconds since epoch)
//! …       n_intro            uint16
//! …       intro_points       n_intro × (C-string terminated by NUL)
//! …       signature          key_modulus_len bytes
//! ```
//!
//! `timestamp` keeps the wire's 32-bit width rather than silently widening it;
//! behavior past year 2106 is unspecified, matching the original format this
//! codec preserves bit-for-bit.

use thiserror::Error;

use crate::crypto::{PrivateKey, PublicKey};

/// A parsed service descriptor.
#[derive(Clone, Debug)]
pub struct ServiceDescriptor<P: PublicKey> {
    public_key: P,
    timestamp: u32,
    introduction_points: Vec<String>,
}

/// Violations of the in-memory descriptor's invariants (§3 Data Model).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DescriptorError {
    /// More introduction points than a `u16` count can carry.
    #[error("too many introduction points for a u16 count")]
    TooManyIntroPoints,
    /// An introduction point identifier contains a NUL byte.
    #[error("introduction point identifier contains a NUL byte")]
    NulInIntroPoint,
}

impl<P: PublicKey> ServiceDescriptor<P> {
    /// Build a descriptor, checking the invariants the wire format requires.
    pub fn new(
        public_key: P,
        timestamp: u32,
        introduction_points: Vec<String>,
    ) -> Result<Self, DescriptorError> {
        if introduction_points.len() > u16::MAX as usize {
            return Err(DescriptorError::TooManyIntroPoints);
        }
        if introduction_points.iter().any(|ip| ip.as_bytes().contains(&0)) {
            return Err(DescriptorError::NulInIntroPoint);
        }
        Ok(Self {
            public_key,
            timestamp,
            introduction_points,
        })
    }

    /// Build a descriptor without checking invariants.
    ///
    /// Used internally by [`parse`], whose inputs already satisfy them
    /// (the NUL-terminated wire format cannot itself carry an embedded NUL,
    /// and the count is read from a `u16` field).
    fn from_parts_unchecked(
        public_key: P,
        timestamp: u32,
        introduction_points: Vec<String>,
    ) -> Self {
        Self {
            public_key,
            timestamp,
            introduction_points,
        }
    }

    /// The service's long-term public key.
    pub fn public_key(&self) -> &P {
        &self.public_key
    }

    /// Seconds since the epoch at which this descriptor was signed.
    pub fn timestamp(&self) -> u32 {
        self.timestamp
    }

    /// Ordered introduction-point identifiers.
    pub fn introduction_points(&self) -> &[String] {
        &self.introduction_points
    }
}

/// Wire bytes for an encoded, signed descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedDescriptor(Vec<u8>);

impl EncodedDescriptor {
    /// Borrow the encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length of the encoded bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the encoded bytes are empty (never true for a real descriptor).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume this wrapper, returning the owned bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for EncodedDescriptor {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for EncodedDescriptor {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Codec failures (§7 Error Handling Design).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// Fewer bytes remained than the field being read requires.
    #[error("truncated descriptor")]
    Truncated,
    /// The embedded key bytes did not decode.
    #[error("bad key encoding")]
    BadKey,
    /// More bytes followed the signature than its length allows.
    #[error("trailing junk after signature")]
    TrailingJunk,
    /// An introduction point identifier's bytes are not valid UTF-8. The
    /// wire format carries it as raw NUL-terminated bytes; the bytes were
    /// present (this is not a length problem), just not decodable as text.
    #[error("introduction point identifier is not valid UTF-8")]
    BadIntroPoint,
    /// Signature verification failed.
    #[error("bad signature")]
    BadSignature,
    /// The public key could not be DER-encoded.
    #[error("asn1 encode failed")]
    AsnEncode,
    /// Signing failed.
    #[error("signing failed")]
    SignFailed,
}

/// Encode `desc` and sign it with `key` (§4.1.1).
///
/// `key` must be the private half of `desc.public_key()`; like the format
/// this codec implements, that is a caller contract, not something checked
/// here.
pub fn encode<K: PrivateKey>(
    desc: &ServiceDescriptor<K::Public>,
    key: &K,
) -> Result<EncodedDescriptor, CodecError> {
    let asn1 = desc.public_key.to_der().map_err(|_| CodecError::AsnEncode)?;
    let asn1_len: u16 = asn1.len().try_into().map_err(|_| CodecError::AsnEncode)?;
    // Invariant-checked at construction time: `new` rejects more than
    // u16::MAX introduction points.
    let n_intro = desc.introduction_points.len() as u16;

    let mut body = Vec::new();
    body.extend_from_slice(&asn1_len.to_be_bytes());
    body.extend_from_slice(&asn1);
    body.extend_from_slice(&desc.timestamp.to_be_bytes());
    body.extend_from_slice(&n_intro.to_be_bytes());
    for ip in &desc.introduction_points {
        body.extend_from_slice(ip.as_bytes());
        body.push(0);
    }

    let signature = key.sign(&body).map_err(|_| CodecError::SignFailed)?;
    body.extend_from_slice(&signature);
    Ok(EncodedDescriptor(body))
}

fn read_u16(cursor: &mut &[u8]) -> Option<u16> {
    if cursor.len() < 2 {
        return None;
    }
    let (head, tail) = cursor.split_at(2);
    *cursor = tail;
    Some(u16::from_be_bytes([head[0], head[1]]))
}

fn read_u32(cursor: &mut &[u8]) -> Option<u32> {
    if cursor.len() < 4 {
        return None;
    }
    let (head, tail) = cursor.split_at(4);
    *cursor = tail;
    Some(u32::from_be_bytes([head[0], head[1], head[2], head[3]]))
}

/// Parse and verify an encoded descriptor (§4.1.2).
///
/// Every field read is bounds-checked before it is consumed; a partially
/// constructed descriptor never escapes a failed parse.
pub fn parse<P: PublicKey>(bytes: &[u8]) -> Result<ServiceDescriptor<P>, CodecError> {
    let mut cursor = bytes;

    let asn1_len = read_u16(&mut cursor).ok_or(CodecError::Truncated)? as usize;
    if cursor.len() < asn1_len {
        return Err(CodecError::Truncated);
    }
    let (asn1_bytes, rest) = cursor.split_at(asn1_len);
    cursor = rest;
    let public_key = P::from_der(asn1_bytes).map_err(|_| CodecError::BadKey)?;

    let timestamp = read_u32(&mut cursor).ok_or(CodecError::Truncated)?;

    let n_intro = read_u16(&mut cursor).ok_or(CodecError::Truncated)? as usize;
    let mut introduction_points = Vec::with_capacity(n_intro.min(1 << 16));
    for _ in 0..n_intro {
        let nul_pos = cursor
            .iter()
            .position(|&b| b == 0)
            .ok_or(CodecError::Truncated)?;
        let ip = std::str::from_utf8(&cursor[..nul_pos])
            .map_err(|_| CodecError::BadIntroPoint)?
            .to_string();
        introduction_points.push(ip);
        cursor = &cursor[nul_pos + 1..];
    }

    let signed_len = bytes.len() - cursor.len();
    let modulus_len = public_key.modulus_len();
    if cursor.len() < modulus_len {
        return Err(CodecError::Truncated);
    }
    if cursor.len() > modulus_len {
        return Err(CodecError::TrailingJunk);
    }
    let signature = cursor;

    public_key
        .verify(&bytes[..signed_len], signature)
        .map_err(|_| CodecError::BadSignature)?;

    Ok(ServiceDescriptor::from_parts_unchecked(
        public_key,
        timestamp,
        introduction_points,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::testing::FakePrivateKey;

    fn sample_key() -> FakePrivateKey {
        FakePrivateKey::generate(b"service-under-test", b"test-only-mac-key")
    }

    fn sample_descriptor(
        key: &FakePrivateKey,
        intro: &[&str],
    ) -> ServiceDescriptor<crate::crypto::testing::FakePublicKey> {
        ServiceDescriptor::new(
            key.public_key(),
            1_000_000,
            intro.iter().map(|s| s.to_string()).collect(),
        )
        .expect("valid descriptor")
    }

    #[test]
    fn round_trips_with_intro_points() {
        let key = sample_key();
        let desc = sample_descriptor(&key, &["alice", "bob"]);
        let encoded = encode(&desc, &key).expect("encode");

        let parsed = parse::<crate::crypto::testing::FakePublicKey>(encoded.as_bytes())
            .expect("parse");
        assert_eq!(parsed.timestamp(), desc.timestamp());
        assert_eq!(parsed.introduction_points(), desc.introduction_points());
        assert_eq!(parsed.public_key(), desc.public_key());
    }

    #[test]
    fn round_trips_with_no_intro_points() {
        let key = sample_key();
        let desc = sample_descriptor(&key, &[]);
        let encoded = encode(&desc, &key).expect("encode");

        let parsed = parse::<crate::crypto::testing::FakePublicKey>(encoded.as_bytes())
            .expect("parse");
        assert!(parsed.introduction_points().is_empty());
    }

    #[test]
    fn flipping_a_prefix_bit_breaks_the_signature() {
        let key = sample_key();
        let desc = sample_descriptor(&key, &["alice"]);
        let mut bytes = encode(&desc, &key).expect("encode").into_bytes();
        bytes[0] ^= 0x01;

        assert_eq!(
            parse::<crate::crypto::testing::FakePublicKey>(&bytes),
            Err(CodecError::BadSignature)
        );
    }

    #[test]
    fn flipping_a_signature_bit_breaks_verification() {
        let key = sample_key();
        let desc = sample_descriptor(&key, &["alice"]);
        let mut bytes = encode(&desc, &key).expect("encode").into_bytes();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;

        assert_eq!(
            parse::<crate::crypto::testing::FakePublicKey>(&bytes),
            Err(CodecError::BadSignature)
        );
    }

    #[test]
    fn every_proper_prefix_is_truncated() {
        let key = sample_key();
        let desc = sample_descriptor(&key, &["alice", "bob"]);
        let bytes = encode(&desc, &key).expect("encode").into_bytes();

        for cut in 0..bytes.len() {
            assert_eq!(
                parse::<crate::crypto::testing::FakePublicKey>(&bytes[..cut]),
                Err(CodecError::Truncated),
                "prefix of length {cut} should be truncated"
            );
        }
    }

    #[test]
    fn trailing_byte_is_rejected() {
        let key = sample_key();
        let desc = sample_descriptor(&key, &["alice"]);
        let mut bytes = encode(&desc, &key).expect("encode").into_bytes();
        bytes.push(0xAB);

        assert_eq!(
            parse::<crate::crypto::testing::FakePublicKey>(&bytes),
            Err(CodecError::TrailingJunk)
        );
    }

    #[test]
    fn non_utf8_intro_point_is_bad_intro_point_not_truncated() {
        use crate::crypto::PublicKey as _;

        let key = sample_key();
        let der = key.public_key().to_der().expect("der");

        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(der.len() as u16).to_be_bytes());
        bytes.extend_from_slice(&der);
        bytes.extend_from_slice(&1_000_000u32.to_be_bytes());
        bytes.extend_from_slice(&1u16.to_be_bytes());
        bytes.extend_from_slice(&[0xFF, 0xFE]); // not valid UTF-8
        bytes.push(0); // NUL terminator

        assert_eq!(
            parse::<crate::crypto::testing::FakePublicKey>(&bytes),
            Err(CodecError::BadIntroPoint)
        );
    }

    #[test]
    fn new_rejects_nul_in_intro_point() {
        let key = sample_key();
        let err = ServiceDescriptor::new(key.public_key(), 0, vec!["a\0b".to_string()])
            .unwrap_err();
        assert_eq!(err, DescriptorError::NulInIntroPoint);
    }
}
