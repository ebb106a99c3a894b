// Copyright 2025-2026 the veridns authors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! NSEC3 records, hashed authenticated denial of existence, RFC 5155

use std::fmt::{self, Display, Formatter};

use data_encoding::BASE32_DNSSEC;

use super::type_bit_map;
use crate::error::DnsResult;
use crate::rr::RecordType;
use crate::serialize::binary::{BinDecoder, BinEncodable, BinEncoder};

/// bit 0 of the NSEC3 flags: insecure delegations may exist in the span
const OPT_OUT_FLAG: u8 = 0x01;

/// [RFC 5155, NSEC3, March 2008](https://tools.ietf.org/html/rfc5155#section-3.2)
///
/// ```text
/// 3.2.  NSEC3 RDATA Wire Format
///
///    1 1 1 1 1 1 1 1 1 1 2 2 2 2 2 2 2 2 2 2 3 3
///    0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
///    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///    |   Hash Alg.   |     Flags     |          Iterations           |
///    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///    |  Salt Length  |                     Salt                      /
///    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///    |  Hash Length  |             Next Hashed Owner Name            /
///    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///    /                         Type Bit Maps                         /
///    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct NSEC3 {
    hash_algorithm: u8,
    opt_out: bool,
    iterations: u16,
    salt: Vec<u8>,
    next_hashed_owner_name: Vec<u8>,
    type_bit_maps: Vec<RecordType>,
}

impl NSEC3 {
    /// Constructs new NSEC3 record data
    pub fn new(
        hash_algorithm: u8,
        opt_out: bool,
        iterations: u16,
        salt: Vec<u8>,
        next_hashed_owner_name: Vec<u8>,
        type_bit_maps: Vec<RecordType>,
    ) -> Self {
        Self {
            hash_algorithm,
            opt_out,
            iterations,
            salt,
            next_hashed_owner_name,
            type_bit_maps,
        }
    }

    /// The hash algorithm number; 1 (SHA-1) is the only defined value
    pub fn hash_algorithm(&self) -> u8 {
        self.hash_algorithm
    }

    /// RFC 5155 §6: the span of this NSEC3 may cover unsigned delegations
    pub fn opt_out(&self) -> bool {
        self.opt_out
    }

    /// The number of additional hash iterations
    pub fn iterations(&self) -> u16 {
        self.iterations
    }

    /// The salt appended to the name at each hash iteration
    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    /// The raw hash of the next owner name in hash order
    pub fn next_hashed_owner_name(&self) -> &[u8] {
        &self.next_hashed_owner_name
    }

    /// The types present at the original owner name
    pub fn type_bit_maps(&self) -> &[RecordType] {
        &self.type_bit_maps
    }

    /// Whether the original owner name has an RRset of the given type
    pub fn contains_type(&self, record_type: RecordType) -> bool {
        self.type_bit_maps.contains(&record_type)
    }

    /// The next hashed owner in its base32 label form
    pub fn next_hashed_label(&self) -> String {
        BASE32_DNSSEC.encode(&self.next_hashed_owner_name)
    }

    /// Reads the rdata, consuming exactly `rdata_length` bytes
    pub fn read_data(decoder: &mut BinDecoder<'_>, rdata_length: u16) -> DnsResult<Self> {
        let start = decoder.index();
        let hash_algorithm = decoder.read_u8()?;
        let flags = decoder.read_u8()?;
        let opt_out = flags & OPT_OUT_FLAG != 0;
        let iterations = decoder.read_u16()?;
        let salt_len = decoder.read_u8()?;
        let salt = decoder.read_vec(salt_len as usize)?;
        let hash_len = decoder.read_u8()?;
        let next_hashed_owner_name = decoder.read_vec(hash_len as usize)?;
        let bit_map_len = rdata_length as usize - (decoder.index() - start);
        let type_bit_maps = type_bit_map::decode(decoder, bit_map_len)?;

        Ok(Self {
            hash_algorithm,
            opt_out,
            iterations,
            salt,
            next_hashed_owner_name,
            type_bit_maps,
        })
    }
}

impl BinEncodable for NSEC3 {
    fn emit(&self, encoder: &mut BinEncoder<'_>) -> DnsResult<()> {
        encoder.emit(self.hash_algorithm)?;
        encoder.emit(if self.opt_out { OPT_OUT_FLAG } else { 0 })?;
        encoder.emit_u16(self.iterations)?;
        encoder.emit(self.salt.len() as u8)?;
        encoder.emit_vec(&self.salt)?;
        encoder.emit(self.next_hashed_owner_name.len() as u8)?;
        encoder.emit_vec(&self.next_hashed_owner_name)?;
        type_bit_map::encode(encoder, &self.type_bit_maps)
    }
}

impl Display for NSEC3 {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} - {}",
            self.hash_algorithm,
            u8::from(self.opt_out),
            self.iterations,
            self.next_hashed_label(),
        )?;
        for rt in &self.type_bit_maps {
            write!(f, " {rt}")?;
        }

        Ok(())
    }
}
