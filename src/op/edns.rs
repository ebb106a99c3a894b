// Copyright 2025-2026 the veridns authors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Extended DNS options

use std::fmt::{self, Display, Formatter};

use crate::error::{DnsErrorKind, DnsResult};
use crate::rr::rdata::{EdnsCode, EdnsOption, OPT};
use crate::rr::{DNSClass, Name, RData, Record, RecordType};

/// The DO bit in the extended flags of the OPT TTL field
const DNSSEC_OK: u32 = 0x8000_0000;

/// The default EDNS payload size the validator advertises
pub const DEFAULT_PAYLOAD_SIZE: u16 = 1232;

/// The state of the OPT pseudo-record of a message, unpacked (RFC 6891)
///
/// ```text
/// +------------+--------------+------------------------------+
/// | Field Name | Field Type   | Description                  |
/// +------------+--------------+------------------------------+
/// | NAME       | domain name  | MUST be 0 (root domain)      |
/// | TYPE       | u_int16_t    | OPT (41)                     |
/// | CLASS      | u_int16_t    | requestor's UDP payload size |
/// | TTL        | u_int32_t    | extended RCODE and flags     |
/// | RDLEN      | u_int16_t    | length of all RDATA          |
/// | RDATA      | octet stream | {attribute,value} pairs      |
/// +------------+--------------+------------------------------+
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Edns {
    rcode_high: u8,
    version: u8,
    dnssec_ok: bool,
    max_payload: u16,
    options: OPT,
}

impl Default for Edns {
    fn default() -> Self {
        Self::new()
    }
}

impl Edns {
    /// Creates a new EDNS state: version 0, no extended rcode, no DO
    pub fn new() -> Self {
        Self {
            rcode_high: 0,
            version: 0,
            dnssec_ok: false,
            max_payload: DEFAULT_PAYLOAD_SIZE,
            options: OPT::default(),
        }
    }

    /// The high 8 bits of the extended response code
    pub fn rcode_high(&self) -> u8 {
        self.rcode_high
    }

    /// Sets the high bits of the extended response code
    pub fn set_rcode_high(&mut self, rcode_high: u8) -> &mut Self {
        self.rcode_high = rcode_high;
        self
    }

    /// The EDNS version, 0 is the only defined value
    pub fn version(&self) -> u8 {
        self.version
    }

    /// The DO bit: the sender understands DNSSEC records
    pub fn dnssec_ok(&self) -> bool {
        self.dnssec_ok
    }

    /// Sets the DO bit
    pub fn set_dnssec_ok(&mut self, dnssec_ok: bool) -> &mut Self {
        self.dnssec_ok = dnssec_ok;
        self
    }

    /// The maximum UDP payload size the sender can receive
    pub fn max_payload(&self) -> u16 {
        self.max_payload
    }

    /// Sets the maximum payload size
    pub fn set_max_payload(&mut self, max_payload: u16) -> &mut Self {
        self.max_payload = max_payload;
        self
    }

    /// The options carried in the OPT rdata
    pub fn options(&self) -> &OPT {
        &self.options
    }

    /// Mutable access to the options
    pub fn options_mut(&mut self) -> &mut OPT {
        &mut self.options
    }

    /// Returns the option with the given code
    pub fn option(&self, code: EdnsCode) -> Option<&EdnsOption> {
        self.options.get(code)
    }

    /// Builds the OPT pseudo-record for the additional section
    pub fn to_record(&self) -> Record {
        let mut ttl = (u32::from(self.rcode_high) << 24) | (u32::from(self.version) << 16);
        if self.dnssec_ok {
            ttl |= DNSSEC_OK;
        }

        let mut record = Record::from_rdata(Name::root(), ttl, RData::OPT(self.options.clone()));
        record.set_dns_class(DNSClass::Unknown(self.max_payload));
        record
    }

    /// Unpacks an OPT record from the additional section
    pub fn from_record(record: &Record) -> DnsResult<Self> {
        debug_assert_eq!(record.record_type(), RecordType::OPT);
        if !record.name().is_root() {
            return Err(DnsErrorKind::EdnsNameNotRoot(record.name().clone()).into());
        }

        let ttl = record.ttl();
        let options = match record.data() {
            RData::OPT(opt) => opt.clone(),
            _ => OPT::default(),
        };

        Ok(Self {
            rcode_high: ((ttl & 0xFF00_0000) >> 24) as u8,
            version: ((ttl & 0x00FF_0000) >> 16) as u8,
            dnssec_ok: ttl & DNSSEC_OK != 0,
            max_payload: u16::from(record.dns_class()),
            options,
        })
    }
}

impl Display for Edns {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "version: {} dnssec_ok: {} max_payload: {} opts: {}",
            self.version,
            self.dnssec_ok,
            self.max_payload,
            self.options.options().len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rr::rdata::{Ede, EdeCode};

    #[test]
    fn record_round_trip() {
        let mut edns = Edns::new();
        edns.set_dnssec_ok(true).set_max_payload(4096).set_rcode_high(1);
        edns.options_mut()
            .insert(EdnsOption::Ede(Ede::new(EdeCode::DnssecBogus, None)));

        let record = edns.to_record();
        assert_eq!(record.record_type(), RecordType::OPT);
        let read = Edns::from_record(&record).unwrap();
        assert_eq!(read, edns);
    }
}
