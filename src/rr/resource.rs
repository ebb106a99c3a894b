// Copyright 2025-2026 the veridns authors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! resource record implementation

use std::fmt::{self, Display, Formatter};

use crate::error::DnsResult;
use crate::rr::{DNSClass, Name, RData, RecordType};
use crate::serialize::binary::{BinDecodable, BinDecoder, BinEncodable, BinEncoder};

/// A DNS resource record
///
/// ```text
/// 4.1.3. Resource record format
///
///                                     1  1  1  1  1  1
///       0  1  2  3  4  5  6  7  8  9  0  1  2  3  4  5
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     /                                               /
///     /                      NAME                     /
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                      TYPE                     |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                     CLASS                     |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                      TTL                      |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                   RDLENGTH                    |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--|
///     /                     RDATA                     /
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Record {
    name: Name,
    rr_type: RecordType,
    dns_class: DNSClass,
    ttl: u32,
    rdata: RData,
}

impl Record {
    /// Creates an empty meta record, the form used in question sections and
    /// as a placeholder where no rdata exists
    pub fn new(name: Name, rr_type: RecordType, dns_class: DNSClass, ttl: u32) -> Self {
        Self {
            name,
            rr_type,
            dns_class,
            ttl,
            rdata: RData::Empty,
        }
    }

    /// Creates a record with the given data; the record type is taken from
    /// the data
    pub fn from_rdata(name: Name, ttl: u32, rdata: RData) -> Self {
        Self {
            name,
            rr_type: rdata.record_type(),
            dns_class: DNSClass::IN,
            ttl,
            rdata,
        }
    }

    /// The owner name of the record
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// The type of the record
    pub fn record_type(&self) -> RecordType {
        self.rr_type
    }

    /// The class of the record
    pub fn dns_class(&self) -> DNSClass {
        self.dns_class
    }

    /// Sets the class, e.g. for the validation-reason pseudo-class
    pub fn set_dns_class(&mut self, dns_class: DNSClass) -> &mut Self {
        self.dns_class = dns_class;
        self
    }

    /// The time to live, in seconds
    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    /// Sets the time to live
    pub fn set_ttl(&mut self, ttl: u32) -> &mut Self {
        self.ttl = ttl;
        self
    }

    /// The record data
    pub fn data(&self) -> &RData {
        &self.rdata
    }

    /// Mutable access to the record data, used by tests to corrupt rdata
    #[cfg(any(test, feature = "testing"))]
    pub fn data_mut(&mut self) -> &mut RData {
        &mut self.rdata
    }

    /// Replaces the owner name, used for wildcard synthesis
    pub fn set_name(&mut self, name: Name) -> &mut Self {
        self.name = name;
        self
    }

    /// Equality modulo the TTL, the RFC 2181 §5.2 notion of set membership
    pub fn eq_ignore_ttl(&self, other: &Self) -> bool {
        self.name == other.name
            && self.rr_type == other.rr_type
            && self.dns_class == other.dns_class
            && self.rdata == other.rdata
    }
}

impl BinEncodable for Record {
    fn emit(&self, encoder: &mut BinEncoder<'_>) -> DnsResult<()> {
        // in the canonical form the owner name is lowercased, RFC 4034 §6.2
        let lowercase = encoder.is_canonical_names();
        self.name.emit_with_lowercase(encoder, lowercase)?;
        self.rr_type.emit(encoder)?;
        self.dns_class.emit(encoder)?;
        encoder.emit_u32(self.ttl)?;

        let place = encoder.place_u16()?;
        self.rdata.emit(encoder)?;
        let len = encoder.len_since_place(&place);
        encoder.emit_u16_at(place, len as u16);

        Ok(())
    }
}

impl<'r> BinDecodable<'r> for Record {
    fn read(decoder: &mut BinDecoder<'r>) -> DnsResult<Self> {
        let name = Name::read(decoder)?;
        let rr_type = RecordType::read(decoder)?;
        let dns_class = DNSClass::read(decoder)?;
        let ttl = decoder.read_u32()?;
        let rdata_length = decoder.read_u16()?;

        let rdata = if rdata_length == 0 {
            RData::Empty
        } else {
            RData::read(decoder, rr_type, rdata_length)?
        };

        Ok(Self {
            name,
            rr_type,
            dns_class,
            ttl,
            rdata,
        })
    }
}

impl Display for Record {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.name, self.ttl, self.dns_class, self.rr_type, self.rdata
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rr::rdata::A;
    use std::str::FromStr;

    fn a_record() -> Record {
        Record::from_rdata(
            Name::from_ascii("foo.example.com.").unwrap(),
            3600,
            RData::A(A::from_str("192.0.2.1").unwrap()),
        )
    }

    #[test]
    fn wire_round_trip() {
        let record = a_record();
        let bytes = record.to_bytes().unwrap();
        let mut decoder = BinDecoder::new(&bytes);
        assert_eq!(Record::read(&mut decoder).unwrap(), record);
    }

    #[test]
    fn eq_ignores_only_ttl() {
        let record = a_record();
        let mut other = record.clone();
        other.set_ttl(60);
        assert_ne!(record, other);
        assert!(record.eq_ignore_ttl(&other));
    }
}
