// Copyright 2025-2026 the veridns authors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! class of DNS operations, in general always IN for internet

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::error::{DnsError, DnsErrorKind, DnsResult};
use crate::serialize::binary::{BinDecodable, BinDecoder, BinEncodable, BinEncoder};

/// The DNS class of a record or query
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
#[allow(dead_code)]
pub enum DNSClass {
    /// Internet
    IN,
    /// Chaos
    CH,
    /// Hesiod
    HS,
    /// QCLASS NONE
    NONE,
    /// QCLASS * (ANY)
    ANY,
    /// Classes not (directly) understood, including the EDNS payload-size
    /// pseudo-class and the validation-reason class
    Unknown(u16),
}

impl DNSClass {
    /// Convert from u16 to DNSClass
    pub fn from_u16(value: u16) -> Self {
        match value {
            1 => Self::IN,
            3 => Self::CH,
            4 => Self::HS,
            254 => Self::NONE,
            255 => Self::ANY,
            _ => Self::Unknown(value),
        }
    }
}

impl FromStr for DNSClass {
    type Err = DnsError;

    fn from_str(str: &str) -> DnsResult<Self> {
        match str {
            "IN" => Ok(Self::IN),
            "CH" => Ok(Self::CH),
            "HS" => Ok(Self::HS),
            "NONE" => Ok(Self::NONE),
            "ANY" | "*" => Ok(Self::ANY),
            _ => Err(DnsErrorKind::UnknownDnsClassStr(str.to_string()).into()),
        }
    }
}

impl From<DNSClass> for u16 {
    fn from(rr_class: DNSClass) -> Self {
        match rr_class {
            DNSClass::IN => 1,
            DNSClass::CH => 3,
            DNSClass::HS => 4,
            DNSClass::NONE => 254,
            DNSClass::ANY => 255,
            DNSClass::Unknown(value) => value,
        }
    }
}

impl BinEncodable for DNSClass {
    fn emit(&self, encoder: &mut BinEncoder<'_>) -> DnsResult<()> {
        encoder.emit_u16((*self).into())
    }
}

impl<'r> BinDecodable<'r> for DNSClass {
    fn read(decoder: &mut BinDecoder<'r>) -> DnsResult<Self> {
        Ok(Self::from_u16(decoder.read_u16()?))
    }
}

impl Display for DNSClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::IN => f.write_str("IN"),
            Self::CH => f.write_str("CH"),
            Self::HS => f.write_str("HS"),
            Self::NONE => f.write_str("NONE"),
            Self::ANY => f.write_str("ANY"),
            Self::Unknown(value) => write!(f, "CLASS{value}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u16_round_trip() {
        for value in [1_u16, 3, 4, 254, 255, 65280] {
            assert_eq!(u16::from(DNSClass::from_u16(value)), value);
        }
    }

    #[test]
    fn str_round_trip() {
        for mnemonic in ["IN", "CH", "HS", "NONE", "ANY"] {
            assert_eq!(
                DNSClass::from_str(mnemonic).unwrap().to_string(),
                mnemonic
            );
        }
        assert!(DNSClass::from_str("bogus").is_err());
    }
}
