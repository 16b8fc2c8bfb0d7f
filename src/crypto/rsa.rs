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

//! Production crypto collaborator: RSA-PKCS1v1.5 over SHA-256, backed by `ring`.
//!
//! The original deployment this subsystem is modeled on signed over a raw
//! SHA-1 digest; `ring` only exposes RSA signing for SHA-256 and stronger
//! digests (see DESIGN.md), so both the signature scheme and service-ID
//! digest here are SHA-256. The embedded key material is the bare PKCS#1
//! `RSAPublicKey ::= SEQUENCE { modulus INTEGER, publicExponent INTEGER }`,
//! not a full X.509 SubjectPublicKeyInfo — this is what the wire format in
//! §6.1 actually carries.

use ring::rand::SystemRandom;
use ring::signature::{self, KeyPair, RsaKeyPair, RsaPublicKeyComponents};

use super::{CryptoError, PrivateKey, PublicKey};

/// An RSA public key, held as its raw modulus/exponent components.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RsaPublicKey {
    modulus: Vec<u8>,
    exponent: Vec<u8>,
}

impl PublicKey for RsaPublicKey {
    fn modulus_len(&self) -> usize {
        self.modulus.len()
    }

    fn to_der(&self) -> Result<Vec<u8>, CryptoError> {
        Ok(encode_rsa_public_key(&self.modulus, &self.exponent))
    }

    fn from_der(der: &[u8]) -> Result<Self, CryptoError> {
        let (modulus, exponent) = decode_rsa_public_key(der)?;
        Ok(Self { modulus, exponent })
    }

    fn digest(&self) -> [u8; 32] {
        let der = encode_rsa_public_key(&self.modulus, &self.exponent);
        let d = ring::digest::digest(&ring::digest::SHA256, &der);
        let mut out = [0u8; 32];
        out.copy_from_slice(d.as_ref());
        out
    }

    fn verify(&self, data: &[u8], signature: &[u8]) -> Result<(), CryptoError> {
        let components = RsaPublicKeyComponents {
            n: self.modulus.as_slice(),
            e: self.exponent.as_slice(),
        };
        components
            .verify(&signature::RSA_PKCS1_2048_8192_SHA256, data, signature)
            .map_err(|_| CryptoError::Verify)
    }
}

/// An RSA private key loaded from a PKCS#8 document.
pub struct RsaPrivateKey {
    keypair: RsaKeyPair,
}

impl RsaPrivateKey {
    /// Load a private key from a PKCS#8-encoded document.
    ///
    /// Key generation is out of scope for this subsystem (see spec §1); keys
    /// are produced by an external tool and loaded here.
    pub fn from_pkcs8(pkcs8: &[u8]) -> Result<Self, CryptoError> {
        let keypair = RsaKeyPair::from_pkcs8(pkcs8).map_err(|_| CryptoError::Asn1Decode)?;
        Ok(Self { keypair })
    }
}

impl PrivateKey for RsaPrivateKey {
    type Public = RsaPublicKey;

    fn public_key(&self) -> RsaPublicKey {
        let pk = self.keypair.public_key();
        RsaPublicKey {
            modulus: pk.modulus().big_endian_without_leading_zero().to_vec(),
            exponent: pk.exponent().big_endian_without_leading_zero().to_vec(),
        }
    }

    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let rng = SystemRandom::new();
        let mut signature = vec![0u8; self.keypair.public_modulus_len()];
        self.keypair
            .sign(&signature::RSA_PKCS1_SHA256, &rng, data, &mut signature)
            .map_err(|_| CryptoError::Sign)?;
        Ok(signature)
    }
}

fn der_write_len(out: &mut Vec<u8>, len: usize) {
    if len < 0x80 {
        out.push(len as u8);
        return;
    }
    let be = len.to_be_bytes();
    let trimmed = {
        let mut i = 0;
        while i < be.len() - 1 && be[i] == 0 {
            i += 1;
        }
        &be[i..]
    };
    out.push(0x80 | trimmed.len() as u8);
    out.extend_from_slice(trimmed);
}

fn der_write_integer(out: &mut Vec<u8>, value: &[u8]) {
    let mut v = value;
    while v.len() > 1 && v[0] == 0 {
        v = &v[1..];
    }
    let needs_pad = !v.is_empty() && v[0] & 0x80 != 0;
    let content_len = v.len() + usize::from(needs_pad) + usize::from(v.is_empty());
    out.push(0x02);
    der_write_len(out, content_len);
    if v.is_empty() {
        out.push(0);
    } else {
        if needs_pad {
            out.push(0);
        }
        out.extend_from_slice(v);
    }
}

fn encode_rsa_public_key(modulus: &[u8], exponent: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(modulus.len() + exponent.len() + 16);
    der_write_integer(&mut body, modulus);
    der_write_integer(&mut body, exponent);

    let mut out = Vec::with_capacity(body.len() + 4);
    out.push(0x30);
    der_write_len(&mut out, body.len());
    out.extend_from_slice(&body);
    out
}

/// Read a DER length field starting at `buf[*pos]`, advancing `*pos` past it.
fn der_read_len(buf: &[u8], pos: &mut usize) -> Result<usize, CryptoError> {
    let first = *buf.get(*pos).ok_or(CryptoError::Asn1Decode)?;
    *pos += 1;
    if first & 0x80 == 0 {
        return Ok(first as usize);
    }
    let n = (first & 0x7f) as usize;
    if n == 0 || n > std::mem::size_of::<usize>() {
        return Err(CryptoError::Asn1Decode);
    }
    let bytes = buf.get(*pos..*pos + n).ok_or(CryptoError::Asn1Decode)?;
    *pos += n;
    let mut len = 0usize;
    for &b in bytes {
        len = len.checked_shl(8).ok_or(CryptoError::Asn1Decode)?;
        len |= b as usize;
    }
    Ok(len)
}

fn der_read_integer<'a>(buf: &'a [u8], pos: &mut usize) -> Result<&'a [u8], CryptoError> {
    let tag = *buf.get(*pos).ok_or(CryptoError::Asn1Decode)?;
    if tag != 0x02 {
        return Err(CryptoError::Asn1Decode);
    }
    *pos += 1;
    let len = der_read_len(buf, pos)?;
    let content = buf.get(*pos..*pos + len).ok_or(CryptoError::Asn1Decode)?;
    *pos += len;
    Ok(content)
}

fn decode_rsa_public_key(der: &[u8]) -> Result<(Vec<u8>, Vec<u8>), CryptoError> {
    let mut pos = 0usize;
    let tag = *der.get(pos).ok_or(CryptoError::Asn1Decode)?;
    if tag != 0x30 {
        return Err(CryptoError::Asn1Decode);
    }
    pos += 1;
    let seq_len = der_read_len(der, &mut pos)?;
    let seq_end = pos.checked_add(seq_len).ok_or(CryptoError::Asn1Decode)?;
    if seq_end > der.len() {
        return Err(CryptoError::Asn1Decode);
    }

    let modulus = der_read_integer(der, &mut pos)?.to_vec();
    let exponent = der_read_integer(der, &mut pos)?.to_vec();
    if pos != seq_end {
        return Err(CryptoError::Asn1Decode);
    }
    Ok((modulus, exponent))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn der_round_trips_through_encode_decode() {
        let modulus = vec![0x80, 0x01, 0x02, 0x03]; // high bit set, needs a pad byte
        let exponent = vec![0x01, 0x00, 0x01];

        let der = encode_rsa_public_key(&modulus, &exponent);
        let (m, e) = decode_rsa_public_key(&der).expect("decode");
        assert_eq!(m, modulus);
        assert_eq!(e, exponent);
    }

    #[test]
    fn der_decode_rejects_truncated_input() {
        let der = encode_rsa_public_key(&[0x01, 0x02], &[0x01, 0x00, 0x01]);
        for cut in 0..der.len() {
            assert!(decode_rsa_public_key(&der[..cut]).is_err());
        }
    }

    #[test]
    fn der_decode_rejects_wrong_tag() {
        let mut der = encode_rsa_public_key(&[0x01, 0x02], &[0x01, 0x00, 0x01]);
        der[0] = 0x31;
        assert!(decode_rsa_public_key(&der).is_err());
    }
}
