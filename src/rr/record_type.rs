// Copyright 2025-2026 the veridns authors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! record type definitions

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::error::{DnsError, DnsErrorKind, DnsResult};
use crate::serialize::binary::{BinDecodable, BinDecoder, BinEncodable, BinEncoder};

/// The type of a resource record
///
/// Types this crate has no rdata representation for decode into
/// `RData::Unknown`, but the common query and DNSSEC types are enumerated.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
#[allow(clippy::upper_case_acronyms)]
pub enum RecordType {
    /// RFC 1035 IPv4 Address
    A,
    /// RFC 3596 IPv6 Address
    AAAA,
    /// RFC 1035 Canonical name
    CNAME,
    /// RFC 6672 Delegation name (non-terminal replacement)
    DNAME,
    /// RFC 4034 DNS Key
    DNSKEY,
    /// RFC 4034 Delegation signer
    DS,
    /// RFC 1035 Mail exchange
    MX,
    /// RFC 1035 Name server
    NS,
    /// RFC 4034 Next secure record
    NSEC,
    /// RFC 5155 Hashed next secure record
    NSEC3,
    /// RFC 5155 NSEC3 parameters
    NSEC3PARAM,
    /// RFC 6891 Option pseudo-record
    OPT,
    /// RFC 1035 Domain name pointer
    PTR,
    /// RFC 4034 Resource record signature
    RRSIG,
    /// RFC 2931 Transaction signature (SIG(0) uses type SIG)
    SIG,
    /// RFC 1035 Start of authority
    SOA,
    /// RFC 8945 Transaction signature
    TSIG,
    /// RFC 1035 Text record
    TXT,
    /// RFC 1035 Query for all record types
    ANY,
    /// RFC 1035 Zone transfer
    AXFR,
    /// Unrecognized record type, carried as the raw type code
    Unknown(u16),
    /// The zero type, used as the NXDOMAIN marker in the negative cache
    ZERO,
}

impl RecordType {
    /// Convert from the u16 wire value
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => Self::ZERO,
            1 => Self::A,
            2 => Self::NS,
            5 => Self::CNAME,
            6 => Self::SOA,
            12 => Self::PTR,
            15 => Self::MX,
            16 => Self::TXT,
            24 => Self::SIG,
            28 => Self::AAAA,
            39 => Self::DNAME,
            41 => Self::OPT,
            43 => Self::DS,
            46 => Self::RRSIG,
            47 => Self::NSEC,
            48 => Self::DNSKEY,
            50 => Self::NSEC3,
            51 => Self::NSEC3PARAM,
            250 => Self::TSIG,
            252 => Self::AXFR,
            255 => Self::ANY,
            _ => Self::Unknown(value),
        }
    }

    /// True for RRSIG and the legacy SIG
    pub fn is_rrsig(self) -> bool {
        matches!(self, Self::RRSIG | Self::SIG)
    }

    /// True for the DNSSEC record types that carry the chain of trust or
    /// denial proofs
    pub fn is_dnssec(self) -> bool {
        matches!(
            self,
            Self::DNSKEY | Self::DS | Self::NSEC | Self::NSEC3 | Self::NSEC3PARAM | Self::RRSIG | Self::SIG
        )
    }
}

impl From<RecordType> for u16 {
    fn from(rt: RecordType) -> Self {
        match rt {
            RecordType::ZERO => 0,
            RecordType::A => 1,
            RecordType::NS => 2,
            RecordType::CNAME => 5,
            RecordType::SOA => 6,
            RecordType::PTR => 12,
            RecordType::MX => 15,
            RecordType::TXT => 16,
            RecordType::SIG => 24,
            RecordType::AAAA => 28,
            RecordType::DNAME => 39,
            RecordType::OPT => 41,
            RecordType::DS => 43,
            RecordType::RRSIG => 46,
            RecordType::NSEC => 47,
            RecordType::DNSKEY => 48,
            RecordType::NSEC3 => 50,
            RecordType::NSEC3PARAM => 51,
            RecordType::TSIG => 250,
            RecordType::AXFR => 252,
            RecordType::ANY => 255,
            RecordType::Unknown(value) => value,
        }
    }
}

impl FromStr for RecordType {
    type Err = DnsError;

    fn from_str(str: &str) -> DnsResult<Self> {
        match str {
            "A" => Ok(Self::A),
            "AAAA" => Ok(Self::AAAA),
            "CNAME" => Ok(Self::CNAME),
            "DNAME" => Ok(Self::DNAME),
            "DNSKEY" => Ok(Self::DNSKEY),
            "DS" => Ok(Self::DS),
            "MX" => Ok(Self::MX),
            "NS" => Ok(Self::NS),
            "NSEC" => Ok(Self::NSEC),
            "NSEC3" => Ok(Self::NSEC3),
            "NSEC3PARAM" => Ok(Self::NSEC3PARAM),
            "OPT" => Ok(Self::OPT),
            "PTR" => Ok(Self::PTR),
            "RRSIG" => Ok(Self::RRSIG),
            "SIG" => Ok(Self::SIG),
            "SOA" => Ok(Self::SOA),
            "TSIG" => Ok(Self::TSIG),
            "TXT" => Ok(Self::TXT),
            "ANY" | "*" => Ok(Self::ANY),
            "AXFR" => Ok(Self::AXFR),
            _ => match str.strip_prefix("TYPE") {
                Some(raw) => match raw.parse::<u16>() {
                    Ok(value) => Ok(Self::from_u16(value)),
                    Err(_) => Err(DnsErrorKind::UnknownRecordTypeStr(str.to_string()).into()),
                },
                None => Err(DnsErrorKind::UnknownRecordTypeStr(str.to_string()).into()),
            },
        }
    }
}

impl BinEncodable for RecordType {
    fn emit(&self, encoder: &mut BinEncoder<'_>) -> DnsResult<()> {
        encoder.emit_u16((*self).into())
    }
}

impl<'r> BinDecodable<'r> for RecordType {
    fn read(decoder: &mut BinDecoder<'r>) -> DnsResult<Self> {
        Ok(Self::from_u16(decoder.read_u16()?))
    }
}

impl Display for RecordType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => f.write_str("A"),
            Self::AAAA => f.write_str("AAAA"),
            Self::CNAME => f.write_str("CNAME"),
            Self::DNAME => f.write_str("DNAME"),
            Self::DNSKEY => f.write_str("DNSKEY"),
            Self::DS => f.write_str("DS"),
            Self::MX => f.write_str("MX"),
            Self::NS => f.write_str("NS"),
            Self::NSEC => f.write_str("NSEC"),
            Self::NSEC3 => f.write_str("NSEC3"),
            Self::NSEC3PARAM => f.write_str("NSEC3PARAM"),
            Self::OPT => f.write_str("OPT"),
            Self::PTR => f.write_str("PTR"),
            Self::RRSIG => f.write_str("RRSIG"),
            Self::SIG => f.write_str("SIG"),
            Self::SOA => f.write_str("SOA"),
            Self::TSIG => f.write_str("TSIG"),
            Self::TXT => f.write_str("TXT"),
            Self::ANY => f.write_str("ANY"),
            Self::AXFR => f.write_str("AXFR"),
            Self::ZERO => f.write_str("TYPE0"),
            Self::Unknown(value) => write!(f, "TYPE{value}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u16_round_trip() {
        for value in [1_u16, 2, 5, 6, 28, 39, 43, 46, 47, 48, 50, 51, 255, 9999] {
            assert_eq!(u16::from(RecordType::from_u16(value)), value);
        }
    }

    #[test]
    fn str_round_trip() {
        for mnemonic in ["A", "AAAA", "NSEC3PARAM", "RRSIG", "ANY"] {
            assert_eq!(
                RecordType::from_str(mnemonic).unwrap().to_string(),
                mnemonic
            );
        }
        assert_eq!(
            RecordType::from_str("TYPE9999").unwrap(),
            RecordType::Unknown(9999)
        );
        assert!(RecordType::from_str("NOPE").is_err());
    }
}
