// Copyright 2025-2026 the veridns authors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! public key record data for signing zone records

use std::fmt::{self, Display, Formatter};

use crate::dnssec::{Algorithm, DigestType};
use crate::error::{DnsErrorKind, DnsResult};
use crate::rr::Name;
use crate::serialize::binary::{BinDecoder, BinEncodable, BinEncoder};

/// [RFC 4034, DNSSEC Resource Records, March 2005](https://tools.ietf.org/html/rfc4034#section-2)
///
/// ```text
/// 2.1.  DNSKEY RDATA Wire Format
///
///    The RDATA for a DNSKEY RR consists of a 2 octet Flags Field, a 1
///    octet Protocol Field, a 1 octet Algorithm Field, and the Public Key
///    Field.
///
///                         1 1 1 1 1 1 1 1 1 1 2 2 2 2 2 2 2 2 2 2 3 3
///     0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
///    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///    |              Flags            |    Protocol   |   Algorithm   |
///    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///    /                                                               /
///    /                            Public Key                         /
///    /                                                               /
///    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct DNSKEY {
    flags: u16,
    algorithm: Algorithm,
    public_key: Vec<u8>,
}

/// bit 7 of the flags: this key may be used to sign the zone
const ZONE_KEY_FLAG: u16 = 0x0100;
/// bit 15 of the flags: secure entry point, i.e. a key-signing key
const SEP_FLAG: u16 = 0x0001;
/// RFC 5011 bit 8: the key has been revoked
const REVOKE_FLAG: u16 = 0x0080;

impl DNSKEY {
    /// Constructs new DNSKEY record data
    pub fn new(zone_key: bool, secure_entry_point: bool, algorithm: Algorithm, public_key: Vec<u8>) -> Self {
        let mut flags = 0;
        if zone_key {
            flags |= ZONE_KEY_FLAG;
        }
        if secure_entry_point {
            flags |= SEP_FLAG;
        }

        Self {
            flags,
            algorithm,
            public_key,
        }
    }

    /// RFC 4034 §2.1.1: the key may only be used to verify zone signatures
    /// when this flag is set
    pub fn zone_key(&self) -> bool {
        self.flags & ZONE_KEY_FLAG != 0
    }

    /// RFC 4034 §2.1.1: the key is a secure entry point (key-signing key)
    pub fn secure_entry_point(&self) -> bool {
        self.flags & SEP_FLAG != 0
    }

    /// RFC 5011 §3: the key has been revoked and must not be trusted
    pub fn revoke(&self) -> bool {
        self.flags & REVOKE_FLAG != 0
    }

    /// The public key algorithm
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// The raw public key material
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    /// Computes the key tag per RFC 4034 Appendix B: a 16-bit ones-complement
    /// style sum over the rdata
    pub fn calculate_key_tag(&self) -> DnsResult<u16> {
        let mut bytes = Vec::with_capacity(4 + self.public_key.len());
        {
            let mut encoder = BinEncoder::new(&mut bytes);
            self.emit(&mut encoder)?;
        }

        let mut ac: u32 = 0;
        for (i, &b) in bytes.iter().enumerate() {
            if i & 1 == 1 {
                ac += u32::from(b);
            } else {
                ac += u32::from(b) << 8;
            }
        }
        ac += (ac >> 16) & 0xFFFF;

        Ok((ac & 0xFFFF) as u16)
    }

    /// The digest of this key for comparison with a DS record: the canonical
    /// owner name concatenated with the rdata, hashed (RFC 4034 §5.1.4)
    pub fn to_digest(&self, name: &Name, digest_type: DigestType) -> DnsResult<Vec<u8>> {
        let mut buf = Vec::new();
        {
            let mut encoder = BinEncoder::new(&mut buf);
            encoder.set_canonical_names(true);
            name.to_lowercase().emit_as_canonical(&mut encoder, true)?;
            self.emit(&mut encoder)?;
        }

        digest_type.digest(&buf)
    }
}

impl BinEncodable for DNSKEY {
    fn emit(&self, encoder: &mut BinEncoder<'_>) -> DnsResult<()> {
        encoder.emit_u16(self.flags)?;
        encoder.emit_u8(3)?; // protocol is fixed at 3, RFC 4034 section 2.1.2
        self.algorithm.emit(encoder)?;
        encoder.emit_vec(&self.public_key)
    }
}

impl DNSKEY {
    /// Reads the rdata, consuming exactly `rdata_length` bytes
    pub fn read_data(decoder: &mut BinDecoder<'_>, rdata_length: u16) -> DnsResult<Self> {
        let flags = decoder.read_u16()?;
        let protocol = decoder.read_u8()?;
        if protocol != 3 {
            return Err(DnsErrorKind::DnsKeyProtocolNot3(protocol).into());
        }

        let algorithm = Algorithm::read(decoder)?;
        let key_len = rdata_length as usize - 4;
        let public_key = decoder.read_vec(key_len)?;

        Ok(Self {
            flags,
            algorithm,
            public_key,
        })
    }
}

impl Display for DNSKEY {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} 3 {} (key)",
            self.flags,
            u8::from(self.algorithm)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_tag_is_stable() {
        let key = DNSKEY::new(true, true, Algorithm::RSASHA256, vec![0xde, 0xad, 0xbe, 0xef]);
        let tag = key.calculate_key_tag().unwrap();
        assert_eq!(tag, key.calculate_key_tag().unwrap());

        let other = DNSKEY::new(true, true, Algorithm::RSASHA256, vec![0xde, 0xad, 0xbe, 0xee]);
        assert_ne!(tag, other.calculate_key_tag().unwrap());
    }

    #[test]
    fn flags() {
        let key = DNSKEY::new(true, false, Algorithm::ECDSAP256SHA256, vec![1, 2, 3]);
        assert!(key.zone_key());
        assert!(!key.secure_entry_point());
        assert!(!key.revoke());
    }

    #[test]
    fn digest_is_case_independent() {
        let key = DNSKEY::new(true, true, Algorithm::RSASHA256, vec![1, 2, 3, 4]);
        let lower = Name::from_ascii("example.com.").unwrap();
        let upper = Name::from_ascii("EXAMPLE.COM.").unwrap();
        assert_eq!(
            key.to_digest(&lower, DigestType::SHA256).unwrap(),
            key.to_digest(&upper, DigestType::SHA256).unwrap()
        );
    }
}
