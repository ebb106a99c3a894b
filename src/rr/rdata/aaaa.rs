// Copyright 2025-2026 the veridns authors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! IPv6 address record data, RFC 3596

use std::fmt::{self, Display, Formatter};
use std::net::Ipv6Addr;
use std::ops::Deref;
use std::str::FromStr;

use crate::error::DnsResult;
use crate::serialize::binary::{BinDecodable, BinDecoder, BinEncodable, BinEncoder};

/// The AAAA record type, an IPv6 address
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct AAAA(pub Ipv6Addr);

impl BinEncodable for AAAA {
    fn emit(&self, encoder: &mut BinEncoder<'_>) -> DnsResult<()> {
        encoder.emit_vec(&self.0.octets())
    }
}

impl<'r> BinDecodable<'r> for AAAA {
    fn read(decoder: &mut BinDecoder<'r>) -> DnsResult<Self> {
        let octets = decoder.read_slice(16)?;
        let mut bytes = [0_u8; 16];
        bytes.copy_from_slice(octets);
        Ok(Self(Ipv6Addr::from(bytes)))
    }
}

impl From<Ipv6Addr> for AAAA {
    fn from(aaaa: Ipv6Addr) -> Self {
        Self(aaaa)
    }
}

impl FromStr for AAAA {
    type Err = std::net::AddrParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ipv6Addr::from_str(s).map(Self)
    }
}

impl Deref for AAAA {
    type Target = Ipv6Addr;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for AAAA {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}
