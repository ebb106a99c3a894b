// Copyright 2025-2026 the veridns authors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! DNSSEC signing and verification algorithm mnemonics
//! (RFC 4034 Appendix A.1 and the IANA registry)

use std::fmt::{self, Display, Formatter};

use crate::error::DnsResult;
use crate::serialize::binary::{BinDecoder, BinEncoder};

/// The DNSSEC algorithm of a DNSKEY, DS or RRSIG
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
#[allow(clippy::upper_case_acronyms)]
pub enum Algorithm {
    /// 5 - RSA/SHA-1, deprecated
    RSASHA1,
    /// 7 - RSA/SHA-1 for NSEC3 zones, deprecated
    RSASHA1NSEC3SHA1,
    /// 8 - RSA/SHA-256
    RSASHA256,
    /// 10 - RSA/SHA-512
    RSASHA512,
    /// 13 - ECDSA P-256 with SHA-256
    ECDSAP256SHA256,
    /// 14 - ECDSA P-384 with SHA-384
    ECDSAP384SHA384,
    /// 15 - Ed25519
    ED25519,
    /// Any other algorithm number, unsupported for verification
    Unknown(u8),
}

impl Algorithm {
    /// Whether this crate can verify signatures made with the algorithm
    ///
    /// Unsupported algorithms make a zone Insecure rather than Bogus,
    /// RFC 4035 §5.2.
    pub fn is_supported(self) -> bool {
        matches!(
            self,
            Self::RSASHA256
                | Self::RSASHA512
                | Self::ECDSAP256SHA256
                | Self::ECDSAP384SHA384
                | Self::ED25519
        )
    }

    /// Reads the algorithm from its single wire octet
    pub fn read(decoder: &mut BinDecoder<'_>) -> DnsResult<Self> {
        Ok(Self::from(decoder.read_u8()?))
    }

    /// Writes the algorithm as its single wire octet
    pub fn emit(self, encoder: &mut BinEncoder<'_>) -> DnsResult<()> {
        encoder.emit(self.into())
    }
}

impl From<u8> for Algorithm {
    fn from(value: u8) -> Self {
        match value {
            5 => Self::RSASHA1,
            7 => Self::RSASHA1NSEC3SHA1,
            8 => Self::RSASHA256,
            10 => Self::RSASHA512,
            13 => Self::ECDSAP256SHA256,
            14 => Self::ECDSAP384SHA384,
            15 => Self::ED25519,
            _ => Self::Unknown(value),
        }
    }
}

impl From<Algorithm> for u8 {
    fn from(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::RSASHA1 => 5,
            Algorithm::RSASHA1NSEC3SHA1 => 7,
            Algorithm::RSASHA256 => 8,
            Algorithm::RSASHA512 => 10,
            Algorithm::ECDSAP256SHA256 => 13,
            Algorithm::ECDSAP384SHA384 => 14,
            Algorithm::ED25519 => 15,
            Algorithm::Unknown(value) => value,
        }
    }
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::RSASHA1 => "RSASHA1",
            Self::RSASHA1NSEC3SHA1 => "RSASHA1-NSEC3-SHA1",
            Self::RSASHA256 => "RSASHA256",
            Self::RSASHA512 => "RSASHA512",
            Self::ECDSAP256SHA256 => "ECDSAP256SHA256",
            Self::ECDSAP384SHA384 => "ECDSAP384SHA384",
            Self::ED25519 => "ED25519",
            Self::Unknown(value) => return write!(f, "ALG{value}"),
        };

        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u8_round_trip() {
        for value in [5_u8, 7, 8, 10, 13, 14, 15, 200] {
            assert_eq!(u8::from(Algorithm::from(value)), value);
        }
    }

    #[test]
    fn deprecated_algorithms_unsupported() {
        assert!(!Algorithm::RSASHA1.is_supported());
        assert!(!Algorithm::RSASHA1NSEC3SHA1.is_supported());
        assert!(!Algorithm::Unknown(17).is_supported());
        assert!(Algorithm::ECDSAP256SHA256.is_supported());
    }
}
