// Copyright 2025-2026 the veridns authors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! start of authority record defining ownership and defaults for the zone

use std::fmt::{self, Display, Formatter};

use crate::error::DnsResult;
use crate::rr::rdata::name as rdata_name;
use crate::rr::Name;
use crate::serialize::binary::{BinDecodable, BinDecoder, BinEncodable, BinEncoder};

/// [RFC 1035, DOMAIN NAMES - IMPLEMENTATION AND SPECIFICATION, November 1987](https://tools.ietf.org/html/rfc1035)
///
/// ```text
/// 3.3.13. SOA RDATA format
///
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     /                     MNAME                     /
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     /                     RNAME                     /
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                    SERIAL                     |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                    REFRESH                    |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                     RETRY                     |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                    EXPIRE                     |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                    MINIMUM                    |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct SOA {
    mname: Name,
    rname: Name,
    serial: u32,
    refresh: i32,
    retry: i32,
    expire: i32,
    minimum: u32,
}

impl SOA {
    /// Creates a new SOA record data
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        mname: Name,
        rname: Name,
        serial: u32,
        refresh: i32,
        retry: i32,
        expire: i32,
        minimum: u32,
    ) -> Self {
        Self {
            mname,
            rname,
            serial,
            refresh,
            retry,
            expire,
            minimum,
        }
    }

    /// The name of the primary server for the zone
    pub fn mname(&self) -> &Name {
        &self.mname
    }

    /// The mailbox of the person responsible for the zone
    pub fn rname(&self) -> &Name {
        &self.rname
    }

    /// The version number of the zone
    pub fn serial(&self) -> u32 {
        self.serial
    }

    /// The refresh interval for secondaries
    pub fn refresh(&self) -> i32 {
        self.refresh
    }

    /// The retry interval for failed refreshes
    pub fn retry(&self) -> i32 {
        self.retry
    }

    /// The upper bound on serving the zone without a refresh
    pub fn expire(&self) -> i32 {
        self.expire
    }

    /// The negative-caching TTL hint, RFC 2308
    pub fn minimum(&self) -> u32 {
        self.minimum
    }
}

impl BinEncodable for SOA {
    fn emit(&self, encoder: &mut BinEncoder<'_>) -> DnsResult<()> {
        rdata_name::emit(encoder, &self.mname, true)?;
        rdata_name::emit(encoder, &self.rname, true)?;
        encoder.emit_u32(self.serial)?;
        encoder.emit_u32(self.refresh as u32)?;
        encoder.emit_u32(self.retry as u32)?;
        encoder.emit_u32(self.expire as u32)?;
        encoder.emit_u32(self.minimum)
    }
}

impl<'r> BinDecodable<'r> for SOA {
    fn read(decoder: &mut BinDecoder<'r>) -> DnsResult<Self> {
        Ok(Self {
            mname: Name::read(decoder)?,
            rname: Name::read(decoder)?,
            serial: decoder.read_u32()?,
            refresh: decoder.read_u32()? as i32,
            retry: decoder.read_u32()? as i32,
            expire: decoder.read_u32()? as i32,
            minimum: decoder.read_u32()?,
        })
    }
}

impl Display for SOA {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {} {}",
            self.mname, self.rname, self.serial, self.refresh, self.retry, self.expire, self.minimum
        )
    }
}
