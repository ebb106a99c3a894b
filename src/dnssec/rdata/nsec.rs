// Copyright 2025-2026 the veridns authors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! NSEC record types

use std::fmt::{self, Display, Formatter};

use super::type_bit_map;
use crate::error::DnsResult;
use crate::rr::{Name, RecordType};
use crate::serialize::binary::{BinDecodable, BinDecoder, BinEncodable, BinEncoder};

/// [RFC 4034, DNSSEC Resource Records, March 2005](https://tools.ietf.org/html/rfc4034#section-4)
///
/// ```text
/// 4.1.  NSEC RDATA Wire Format
///
///    The RDATA of the NSEC RR is as shown below:
///
///                         1 1 1 1 1 1 1 1 1 1 2 2 2 2 2 2 2 2 2 2 3 3
///     0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
///    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///    /                      Next Domain Name                         /
///    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///    /                       Type Bit Maps                           /
///    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct NSEC {
    next_domain_name: Name,
    type_bit_maps: Vec<RecordType>,
}

impl NSEC {
    /// Constructs new NSEC record data
    pub fn new(next_domain_name: Name, type_bit_maps: Vec<RecordType>) -> Self {
        Self {
            next_domain_name,
            type_bit_maps,
        }
    }

    /// The next owner name in canonical zone order
    pub fn next_domain_name(&self) -> &Name {
        &self.next_domain_name
    }

    /// The types present at the NSEC owner name
    pub fn type_bit_maps(&self) -> &[RecordType] {
        &self.type_bit_maps
    }

    /// Whether the owner name has an RRset of the given type
    pub fn contains_type(&self, record_type: RecordType) -> bool {
        self.type_bit_maps.contains(&record_type)
    }

    /// Reads the rdata, consuming exactly `rdata_length` bytes
    pub fn read_data(decoder: &mut BinDecoder<'_>, rdata_length: u16) -> DnsResult<Self> {
        let start = decoder.index();
        let next_domain_name = Name::read(decoder)?;
        let bit_map_len = rdata_length as usize - (decoder.index() - start);
        let type_bit_maps = type_bit_map::decode(decoder, bit_map_len)?;

        Ok(Self {
            next_domain_name,
            type_bit_maps,
        })
    }
}

impl BinEncodable for NSEC {
    fn emit(&self, encoder: &mut BinEncoder<'_>) -> DnsResult<()> {
        // the next domain name is not compressed (RFC 4034 §4.1.1) and,
        // contrary to the older RFC 4034 §6.2 text, not lowercased
        // (RFC 6840 §5.1)
        self.next_domain_name.emit_as_canonical(encoder, true)?;
        type_bit_map::encode(encoder, &self.type_bit_maps)
    }
}

impl Display for NSEC {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.next_domain_name)?;
        for rt in &self.type_bit_maps {
            write!(f, " {rt}")?;
        }

        Ok(())
    }
}
