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

//! The crypto collaborator boundary the descriptor codec is built against.
//!
//! The codec never touches RSA, ASN.1, or digest internals directly; it is
//! generic over [`PublicKey`]/[`PrivateKey`], so the wire format and cache
//! logic stay pure and testable independent of the signature scheme. `rsa`
//! is the production implementation (backed by `ring`); `testing` is a
//! deterministic stand-in used by this crate's own test suite.

pub mod rsa;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;

use thiserror::Error;

/// Failures surfaced by the crypto collaborator.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The public key could not be DER-encoded.
    #[error("asn1 encode failed")]
    Asn1Encode,
    /// The supplied bytes are not a valid DER-encoded public key.
    #[error("asn1 decode failed")]
    Asn1Decode,
    /// Signing failed (backend error, not a caller mistake).
    #[error("signing failed")]
    Sign,
    /// Signature verification failed.
    #[error("signature verification failed")]
    Verify,
}

/// A service's long-term public key, opaque to the codec beyond this contract.
pub trait PublicKey: Clone + std::fmt::Debug + Send + Sync + 'static {
    /// Length in bytes of a signature produced by the matching private key
    /// (the RSA modulus length, for the production implementation).
    fn modulus_len(&self) -> usize;

    /// Encode this key as the DER bytes embedded in the descriptor wire format.
    fn to_der(&self) -> Result<Vec<u8>, CryptoError>;

    /// Decode a key from the DER bytes embedded in the descriptor wire format.
    fn from_der(der: &[u8]) -> Result<Self, CryptoError>
    where
        Self: Sized;

    /// A fixed-width digest of this key, used both for signature verification
    /// bookkeeping and as the input to service-ID derivation.
    fn digest(&self) -> [u8; 32];

    /// Verify `signature` was produced over `data` by the matching private key.
    fn verify(&self, data: &[u8], signature: &[u8]) -> Result<(), CryptoError>;
}

/// The private half of a [`PublicKey`], able to sign descriptor bytes.
pub trait PrivateKey {
    /// The public key type this private key signs for.
    type Public: PublicKey;

    /// The public key matching this private key.
    fn public_key(&self) -> Self::Public;

    /// Sign `data`, returning a signature [`PublicKey::verify`] will accept.
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError>;
}
