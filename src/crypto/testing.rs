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

//! Deterministic crypto test double. **Not for production use.**
//!
//! Real RSA signing has no usable test vectors here (no RNG/keygen tool is
//! run as part of building this crate), so the codec/cache test suite is
//! written against this HMAC-backed stand-in instead, exercised through the
//! same [`PublicKey`]/[`PrivateKey`] traits the RSA implementation satisfies.
//! The "public" key embeds the HMAC key in its DER bytes, which would be a
//! glaring vulnerability in a real signature scheme — it is fine here
//! because nothing in the codec or cache cares how the scheme's security
//! holds up, only that it is internally consistent.

use ring::hmac;

use super::{CryptoError, PrivateKey, PublicKey};

/// A fake public key: an identifier plus the shared HMAC key used to "sign".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FakePublicKey {
    id: Vec<u8>,
    mac_key: Vec<u8>,
}

/// A fake private key; signing and verification both go through HMAC-SHA256.
#[derive(Clone, Debug)]
pub struct FakePrivateKey {
    public: FakePublicKey,
}

impl FakePrivateKey {
    /// Build a fake keypair identified by `id`, signing with `mac_key`.
    pub fn generate(id: &[u8], mac_key: &[u8]) -> Self {
        Self {
            public: FakePublicKey {
                id: id.to_vec(),
                mac_key: mac_key.to_vec(),
            },
        }
    }
}

impl PrivateKey for FakePrivateKey {
    type Public = FakePublicKey;

    fn public_key(&self) -> FakePublicKey {
        self.public.clone()
    }

    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let key = hmac::Key::new(hmac::HMAC_SHA256, &self.public.mac_key);
        Ok(hmac::sign(&key, data).as_ref().to_vec())
    }
}

impl PublicKey for FakePublicKey {
    fn modulus_len(&self) -> usize {
        32 // HMAC-SHA256 tag length, standing in for a signature length
    }

    fn to_der(&self) -> Result<Vec<u8>, CryptoError> {
        if self.id.len() > u8::MAX as usize || self.mac_key.len() > u8::MAX as usize {
            return Err(CryptoError::Asn1Encode);
        }
        let mut out = Vec::with_capacity(self.id.len() + self.mac_key.len() + 2);
        out.push(self.id.len() as u8);
        out.extend_from_slice(&self.id);
        out.push(self.mac_key.len() as u8);
        out.extend_from_slice(&self.mac_key);
        Ok(out)
    }

    fn from_der(der: &[u8]) -> Result<Self, CryptoError> {
        let id_len = *der.first().ok_or(CryptoError::Asn1Decode)? as usize;
        let id = der
            .get(1..1 + id_len)
            .ok_or(CryptoError::Asn1Decode)?
            .to_vec();
        let mac_len_pos = 1 + id_len;
        let mac_len = *der.get(mac_len_pos).ok_or(CryptoError::Asn1Decode)? as usize;
        let mac_key = der
            .get(mac_len_pos + 1..mac_len_pos + 1 + mac_len)
            .ok_or(CryptoError::Asn1Decode)?
            .to_vec();
        if mac_len_pos + 1 + mac_len != der.len() {
            return Err(CryptoError::Asn1Decode);
        }
        Ok(Self { id, mac_key })
    }

    fn digest(&self) -> [u8; 32] {
        let d = ring::digest::digest(&ring::digest::SHA256, &self.id);
        let mut out = [0u8; 32];
        out.copy_from_slice(d.as_ref());
        out
    }

    fn verify(&self, data: &[u8], signature: &[u8]) -> Result<(), CryptoError> {
        let key = hmac::Key::new(hmac::HMAC_SHA256, &self.mac_key);
        hmac::verify(&key, data, signature).map_err(|_| CryptoError::Verify)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn der_round_trips() {
        let key = FakePrivateKey::generate(b"service-a", b"super-secret-mac-key");
        let der = key.public_key().to_der().expect("encode");
        let decoded = FakePublicKey::from_der(&der).expect("decode");
        assert_eq!(decoded, key.public_key());
    }

    #[test]
    fn sign_then_verify_round_trips() {
        let key = FakePrivateKey::generate(b"service-a", b"super-secret-mac-key");
        let sig = key.sign(b"hello").expect("sign");
        key.public_key().verify(b"hello", &sig).expect("verify");
        assert!(key.public_key().verify(b"goodbye", &sig).is_err());
    }
}
