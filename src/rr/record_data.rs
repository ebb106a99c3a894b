// Copyright 2025-2026 the veridns authors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! record data enum variants

use std::fmt::{self, Display, Formatter};

use enum_as_inner::EnumAsInner;
use tracing::trace;

use crate::dnssec::rdata::DNSSECRData;
use crate::error::DnsResult;
use crate::rr::rdata::name as rdata_name;
use crate::rr::rdata::{A, AAAA, MX, OPT, SOA, TXT};
use crate::rr::{Name, RecordType};
use crate::serialize::binary::{BinDecodable, BinDecoder, BinEncodable, BinEncoder};

/// Record data of a resource record, tagged by the record type
///
/// Types without a structured representation here decode into `Unknown`
/// and re-encode byte for byte (RFC 3597).
#[derive(Clone, Debug, EnumAsInner, Eq, Hash, PartialEq)]
#[allow(clippy::upper_case_acronyms)]
pub enum RData {
    /// IPv4 address
    A(A),
    /// IPv6 address
    AAAA(AAAA),
    /// Alias to the canonical name
    CNAME(Name),
    /// Subtree redirection, RFC 6672
    DNAME(Name),
    /// Mail exchange
    MX(MX),
    /// Authoritative name server
    NS(Name),
    /// EDNS options, RFC 6891
    OPT(OPT),
    /// Reverse pointer
    PTR(Name),
    /// Start of authority
    SOA(SOA),
    /// Text data
    TXT(TXT),
    /// The DNSSEC record types
    DNSSEC(DNSSECRData),
    /// Types without a structured representation, kept as raw octets
    Unknown {
        /// The record type code
        code: u16,
        /// The raw rdata
        rdata: Vec<u8>,
    },
    /// The empty rdata of question and meta records
    Empty,
}

impl RData {
    /// The record type of this record data; `Empty` has no type of its own
    /// and reports `ZERO`
    pub fn record_type(&self) -> RecordType {
        match self {
            Self::A(_) => RecordType::A,
            Self::AAAA(_) => RecordType::AAAA,
            Self::CNAME(_) => RecordType::CNAME,
            Self::DNAME(_) => RecordType::DNAME,
            Self::MX(_) => RecordType::MX,
            Self::NS(_) => RecordType::NS,
            Self::OPT(_) => RecordType::OPT,
            Self::PTR(_) => RecordType::PTR,
            Self::SOA(_) => RecordType::SOA,
            Self::TXT(_) => RecordType::TXT,
            Self::DNSSEC(rdata) => rdata.record_type(),
            Self::Unknown { code, .. } => RecordType::from_u16(*code),
            Self::Empty => RecordType::ZERO,
        }
    }

    /// Reads the rdata for `record_type`, consuming exactly `rdata_length`
    /// bytes of the decoder
    pub fn read(
        decoder: &mut BinDecoder<'_>,
        record_type: RecordType,
        rdata_length: u16,
    ) -> DnsResult<Self> {
        let start = decoder.index();

        let rdata = match record_type {
            RecordType::A => RData::A(A::read(decoder)?),
            RecordType::AAAA => RData::AAAA(AAAA::read(decoder)?),
            RecordType::CNAME => RData::CNAME(rdata_name::read(decoder)?),
            RecordType::DNAME => RData::DNAME(rdata_name::read(decoder)?),
            RecordType::MX => RData::MX(MX::read(decoder)?),
            RecordType::NS => RData::NS(rdata_name::read(decoder)?),
            RecordType::OPT => RData::OPT(OPT::read_data(decoder, rdata_length)?),
            RecordType::PTR => RData::PTR(rdata_name::read(decoder)?),
            RecordType::SOA => RData::SOA(SOA::read(decoder)?),
            RecordType::TXT => RData::TXT(TXT::read_data(decoder, rdata_length)?),
            rt if rt.is_dnssec() => {
                RData::DNSSEC(DNSSECRData::read(decoder, record_type, rdata_length)?)
            }
            rt => {
                trace!("reading unknown rdata: {rt}");
                RData::Unknown {
                    code: rt.into(),
                    rdata: decoder.read_vec(rdata_length as usize)?,
                }
            }
        };

        decoder.verify_rdata_consumed(start, rdata_length as usize)?;
        Ok(rdata)
    }

    /// The canonical wire form of the rdata (RFC 4034 §6.2): embedded names
    /// of the RFC-defined covered types lowercased, no compression
    pub fn to_canonical_bytes(&self) -> DnsResult<Vec<u8>> {
        let mut bytes = Vec::new();
        {
            let mut encoder = BinEncoder::new(&mut bytes);
            encoder.set_canonical_names(true);
            self.emit(&mut encoder)?;
        }

        Ok(bytes)
    }
}

impl BinEncodable for RData {
    fn emit(&self, encoder: &mut BinEncoder<'_>) -> DnsResult<()> {
        match self {
            Self::A(a) => a.emit(encoder),
            Self::AAAA(aaaa) => aaaa.emit(encoder),
            Self::CNAME(name) | Self::NS(name) | Self::PTR(name) => {
                rdata_name::emit(encoder, name, true)
            }
            // DNAME rdata is not compressed, RFC 6672 section 2.5
            Self::DNAME(name) => rdata_name::emit(encoder, name, false),
            Self::MX(mx) => mx.emit(encoder),
            Self::OPT(opt) => opt.emit(encoder),
            Self::SOA(soa) => soa.emit(encoder),
            Self::TXT(txt) => txt.emit(encoder),
            Self::DNSSEC(rdata) => rdata.emit(encoder),
            Self::Unknown { rdata, .. } => encoder.emit_vec(rdata),
            Self::Empty => Ok(()),
        }
    }
}

impl Display for RData {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::A(a) => Display::fmt(a, f),
            Self::AAAA(aaaa) => Display::fmt(aaaa, f),
            Self::CNAME(name) | Self::DNAME(name) | Self::NS(name) | Self::PTR(name) => {
                Display::fmt(name, f)
            }
            Self::MX(mx) => Display::fmt(mx, f),
            Self::OPT(opt) => Display::fmt(opt, f),
            Self::SOA(soa) => Display::fmt(soa, f),
            Self::TXT(txt) => Display::fmt(txt, f),
            Self::DNSSEC(rdata) => Display::fmt(rdata, f),
            Self::Unknown { code, rdata } => write!(f, "\\# {} octets of TYPE{}", rdata.len(), code),
            Self::Empty => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn round_trip(rdata: RData) {
        let record_type = rdata.record_type();
        let bytes = rdata.to_bytes().unwrap();
        let mut decoder = BinDecoder::new(&bytes);
        let read = RData::read(&mut decoder, record_type, bytes.len() as u16).unwrap();
        assert_eq!(read, rdata);
    }

    #[test]
    fn wire_round_trips() {
        round_trip(RData::A(A::from_str("192.0.2.1").unwrap()));
        round_trip(RData::AAAA(AAAA::from_str("2001:db8::1").unwrap()));
        round_trip(RData::CNAME(Name::from_ascii("target.example.com.").unwrap()));
        round_trip(RData::MX(MX::new(
            10,
            Name::from_ascii("mail.example.com.").unwrap(),
        )));
        round_trip(RData::TXT(TXT::new(vec!["hello world".to_string()])));
        round_trip(RData::SOA(SOA::new(
            Name::from_ascii("ns1.example.com.").unwrap(),
            Name::from_ascii("admin.example.com.").unwrap(),
            2024010101,
            7200,
            3600,
            1209600,
            3600,
        )));
        round_trip(RData::Unknown {
            code: 9999,
            rdata: vec![1, 2, 3, 4],
        });
    }

    #[test]
    fn canonical_bytes_lowercase_embedded_names() {
        let upper = RData::NS(Name::from_ascii("NS1.Example.COM.").unwrap());
        let lower = RData::NS(Name::from_ascii("ns1.example.com.").unwrap());
        assert_eq!(
            upper.to_canonical_bytes().unwrap(),
            lower.to_canonical_bytes().unwrap()
        );
    }
}
