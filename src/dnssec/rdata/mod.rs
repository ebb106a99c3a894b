// Copyright 2025-2026 the veridns authors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! All record data structures for the DNSSEC record types

mod dnskey;
mod ds;
mod nsec;
mod nsec3;
mod nsec3param;
mod rrsig;
pub(crate) mod type_bit_map;

use std::fmt::{self, Display, Formatter};

use enum_as_inner::EnumAsInner;

use crate::error::DnsResult;
use crate::rr::RecordType;
use crate::serialize::binary::{BinDecoder, BinEncodable, BinEncoder};

pub use self::dnskey::DNSKEY;
pub use self::ds::DS;
pub use self::nsec::NSEC;
pub use self::nsec3::NSEC3;
pub use self::nsec3param::NSEC3PARAM;
pub use self::rrsig::RRSIG;

/// The record data of the DNSSEC record types
#[derive(Clone, Debug, EnumAsInner, Eq, Hash, PartialEq)]
#[allow(clippy::upper_case_acronyms)]
pub enum DNSSECRData {
    /// RFC 4034 public key
    DNSKEY(DNSKEY),
    /// RFC 4034 delegation signer
    DS(DS),
    /// RFC 4034 denial of existence
    NSEC(NSEC),
    /// RFC 5155 hashed denial of existence
    NSEC3(NSEC3),
    /// RFC 5155 NSEC3 parameters
    NSEC3PARAM(NSEC3PARAM),
    /// RFC 4034 RRset signature
    RRSIG(RRSIG),
}

impl DNSSECRData {
    /// The record type of this record data
    pub fn record_type(&self) -> RecordType {
        match self {
            Self::DNSKEY(_) => RecordType::DNSKEY,
            Self::DS(_) => RecordType::DS,
            Self::NSEC(_) => RecordType::NSEC,
            Self::NSEC3(_) => RecordType::NSEC3,
            Self::NSEC3PARAM(_) => RecordType::NSEC3PARAM,
            Self::RRSIG(_) => RecordType::RRSIG,
        }
    }

    pub(crate) fn read(
        decoder: &mut BinDecoder<'_>,
        record_type: RecordType,
        rdata_length: u16,
    ) -> DnsResult<Self> {
        match record_type {
            RecordType::DNSKEY => DNSKEY::read_data(decoder, rdata_length).map(Self::DNSKEY),
            RecordType::DS => DS::read_data(decoder, rdata_length).map(Self::DS),
            RecordType::NSEC => NSEC::read_data(decoder, rdata_length).map(Self::NSEC),
            RecordType::NSEC3 => NSEC3::read_data(decoder, rdata_length).map(Self::NSEC3),
            RecordType::NSEC3PARAM => NSEC3PARAM::read_data(decoder).map(Self::NSEC3PARAM),
            RecordType::RRSIG | RecordType::SIG => {
                RRSIG::read_data(decoder, rdata_length).map(Self::RRSIG)
            }
            _ => Err(format!("not a DNSSEC record type: {record_type}").into()),
        }
    }
}

impl BinEncodable for DNSSECRData {
    fn emit(&self, encoder: &mut BinEncoder<'_>) -> DnsResult<()> {
        match self {
            Self::DNSKEY(dnskey) => dnskey.emit(encoder),
            Self::DS(ds) => ds.emit(encoder),
            Self::NSEC(nsec) => nsec.emit(encoder),
            Self::NSEC3(nsec3) => nsec3.emit(encoder),
            Self::NSEC3PARAM(nsec3param) => nsec3param.emit(encoder),
            Self::RRSIG(rrsig) => rrsig.emit(encoder),
        }
    }
}

impl Display for DNSSECRData {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::DNSKEY(dnskey) => Display::fmt(dnskey, f),
            Self::DS(ds) => Display::fmt(ds, f),
            Self::NSEC(nsec) => Display::fmt(nsec, f),
            Self::NSEC3(nsec3) => Display::fmt(nsec3, f),
            Self::NSEC3PARAM(nsec3param) => Display::fmt(nsec3param, f),
            Self::RRSIG(rrsig) => Display::fmt(rrsig, f),
        }
    }
}
