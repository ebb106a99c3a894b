// Copyright 2025-2026 the veridns authors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! pointer record from parent zone to child zone for dnskey proof

use std::fmt::{self, Display, Formatter};

use data_encoding::HEXUPPER;

use crate::dnssec::rdata::DNSKEY;
use crate::dnssec::{Algorithm, DigestType};
use crate::error::DnsResult;
use crate::rr::Name;
use crate::serialize::binary::{BinDecoder, BinEncodable, BinEncoder};

/// [RFC 4034, DNSSEC Resource Records, March 2005](https://tools.ietf.org/html/rfc4034#section-5)
///
/// ```text
/// 5.1.  DS RDATA Wire Format
///
///    The RDATA for a DS RR consists of a 2 octet Key Tag field, a 1 octet
///    Algorithm field, a 1 octet Digest Type field, and a Digest field.
///
///                         1 1 1 1 1 1 1 1 1 1 2 2 2 2 2 2 2 2 2 2 3 3
///     0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
///    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///    |           Key Tag             |  Algorithm    |  Digest Type  |
///    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///    /                                                               /
///    /                            Digest                             /
///    /                                                               /
///    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct DS {
    key_tag: u16,
    algorithm: Algorithm,
    digest_type: DigestType,
    digest: Vec<u8>,
}

impl DS {
    /// Constructs a new DS RData
    pub fn new(key_tag: u16, algorithm: Algorithm, digest_type: DigestType, digest: Vec<u8>) -> Self {
        Self {
            key_tag,
            algorithm,
            digest_type,
            digest,
        }
    }

    /// The key tag of the DNSKEY this DS refers to
    pub fn key_tag(&self) -> u16 {
        self.key_tag
    }

    /// The algorithm of the referenced DNSKEY
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// The digest algorithm used to hash the DNSKEY
    pub fn digest_type(&self) -> DigestType {
        self.digest_type
    }

    /// The digest of the referenced DNSKEY
    pub fn digest(&self) -> &[u8] {
        &self.digest
    }

    /// Validates that the given DNSKEY at `name` is covered by this DS
    pub fn covers(&self, name: &Name, key: &DNSKEY) -> DnsResult<bool> {
        key.to_digest(name, self.digest_type)
            .map(|hash| hash == self.digest)
    }

    /// Reads the rdata, consuming exactly `rdata_length` bytes
    pub fn read_data(decoder: &mut BinDecoder<'_>, rdata_length: u16) -> DnsResult<Self> {
        let key_tag = decoder.read_u16()?;
        let algorithm = Algorithm::read(decoder)?;
        let digest_type = DigestType::from(decoder.read_u8()?);
        let digest = decoder.read_vec(rdata_length as usize - 4)?;

        Ok(Self {
            key_tag,
            algorithm,
            digest_type,
            digest,
        })
    }
}

impl BinEncodable for DS {
    fn emit(&self, encoder: &mut BinEncoder<'_>) -> DnsResult<()> {
        encoder.emit_u16(self.key_tag)?;
        self.algorithm.emit(encoder)?;
        encoder.emit(self.digest_type.into())?;
        encoder.emit_vec(&self.digest)
    }
}

impl Display for DS {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.key_tag,
            u8::from(self.algorithm),
            u8::from(self.digest_type),
            HEXUPPER.encode(&self.digest)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covers_matches_digest() {
        let name = Name::from_ascii("example.com.").unwrap();
        let key = DNSKEY::new(true, true, Algorithm::RSASHA256, vec![1, 2, 3, 4]);
        let digest = key.to_digest(&name, DigestType::SHA256).unwrap();
        let ds = DS::new(
            key.calculate_key_tag().unwrap(),
            Algorithm::RSASHA256,
            DigestType::SHA256,
            digest,
        );

        assert!(ds.covers(&name, &key).unwrap());

        let other = DNSKEY::new(true, true, Algorithm::RSASHA256, vec![4, 3, 2, 1]);
        assert!(!ds.covers(&name, &other).unwrap());
    }
}
