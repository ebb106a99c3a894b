// Copyright 2025-2026 the veridns authors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Public key signature verification backed by ring

use ring::signature::{
    ECDSA_P256_SHA256_FIXED, ECDSA_P384_SHA384_FIXED, ED25519,
    RSA_PKCS1_1024_8192_SHA256_FOR_LEGACY_USE_ONLY, RSA_PKCS1_2048_8192_SHA512,
    RsaPublicKeyComponents, UnparsedPublicKey,
};

use crate::dnssec::Algorithm;
use crate::error::DnsResult;

/// A DNSKEY public key in its wire form, able to verify signatures
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PublicKey<'k> {
    key: &'k [u8],
    algorithm: Algorithm,
}

impl<'k> PublicKey<'k> {
    /// Wraps the raw DNSKEY public key field
    pub fn new(key: &'k [u8], algorithm: Algorithm) -> Self {
        Self { key, algorithm }
    }

    /// The raw key material
    pub fn public_bytes(&self) -> &[u8] {
        self.key
    }

    /// The algorithm of the key
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Verifies the signature over the message with this key
    ///
    /// Returns `Err` when the algorithm is unsupported, the key material is
    /// malformed or the signature does not verify.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> DnsResult<()> {
        match self.algorithm {
            Algorithm::RSASHA256 => self.verify_rsa(
                &RSA_PKCS1_1024_8192_SHA256_FOR_LEGACY_USE_ONLY,
                message,
                signature,
            ),
            Algorithm::RSASHA512 => {
                self.verify_rsa(&RSA_PKCS1_2048_8192_SHA512, message, signature)
            }
            Algorithm::ECDSAP256SHA256 => {
                self.verify_ec(&ECDSA_P256_SHA256_FIXED, message, signature)
            }
            Algorithm::ECDSAP384SHA384 => {
                self.verify_ec(&ECDSA_P384_SHA384_FIXED, message, signature)
            }
            Algorithm::ED25519 => UnparsedPublicKey::new(&ED25519, self.key)
                .verify(message, signature)
                .map_err(|_| "ed25519 signature verification failed".into()),
            alg => Err(format!("unsupported verification algorithm: {alg}").into()),
        }
    }

    /// RFC 3110: the public key field is an exponent length (one octet, or
    /// zero followed by two octets), the exponent, then the modulus
    fn verify_rsa(
        &self,
        params: &'static ring::signature::RsaParameters,
        message: &[u8],
        signature: &[u8],
    ) -> DnsResult<()> {
        let (e, n) = match self.key {
            [0, hi, lo, key @ ..] => {
                let e_len = usize::from(u16::from_be_bytes([*hi, *lo]));
                if key.len() < e_len {
                    return Err("invalid RSA public key in DNSKEY".into());
                }
                key.split_at(e_len)
            }
            [e_len, key @ ..] => {
                let e_len = usize::from(*e_len);
                if e_len == 0 || key.len() < e_len {
                    return Err("invalid RSA public key in DNSKEY".into());
                }
                key.split_at(e_len)
            }
            [] => return Err("empty RSA public key in DNSKEY".into()),
        };

        RsaPublicKeyComponents { n, e }
            .verify(params, message, signature)
            .map_err(|_| "RSA signature verification failed".into())
    }

    /// RFC 6605: the key is the uncompressed curve point without the 0x04
    /// marker octet ring expects
    fn verify_ec(
        &self,
        params: &'static ring::signature::EcdsaVerificationAlgorithm,
        message: &[u8],
        signature: &[u8],
    ) -> DnsResult<()> {
        let mut prefixed = Vec::with_capacity(self.key.len() + 1);
        prefixed.push(0x04);
        prefixed.extend_from_slice(self.key);

        UnparsedPublicKey::new(params, &prefixed)
            .verify(message, signature)
            .map_err(|_| "ECDSA signature verification failed".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_algorithm_is_an_error() {
        let key = PublicKey::new(&[1, 2, 3], Algorithm::RSASHA1);
        assert!(key.verify(b"message", b"signature").is_err());
    }

    #[test]
    fn malformed_rsa_key_is_an_error() {
        let key = PublicKey::new(&[], Algorithm::RSASHA256);
        assert!(key.verify(b"message", b"signature").is_err());

        // exponent length longer than the key material
        let key = PublicKey::new(&[200, 1, 2], Algorithm::RSASHA256);
        assert!(key.verify(b"message", b"signature").is_err());
    }
}
