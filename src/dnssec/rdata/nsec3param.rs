// Copyright 2025-2026 the veridns authors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! parameters for the NSEC3 hash, published at the zone apex, RFC 5155 §4

use std::fmt::{self, Display, Formatter};

use crate::error::DnsResult;
use crate::serialize::binary::{BinDecoder, BinEncodable, BinEncoder};

/// ```text
/// 4.2.  NSEC3PARAM RDATA Wire Format
///
///    1 1 1 1 1 1 1 1 1 1 2 2 2 2 2 2 2 2 2 2 3 3
///    0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
///    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///    |   Hash Alg.   |     Flags     |          Iterations           |
///    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///    |  Salt Length  |                     Salt                      /
///    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct NSEC3PARAM {
    hash_algorithm: u8,
    flags: u8,
    iterations: u16,
    salt: Vec<u8>,
}

impl NSEC3PARAM {
    /// Constructs new NSEC3PARAM record data
    pub fn new(hash_algorithm: u8, flags: u8, iterations: u16, salt: Vec<u8>) -> Self {
        Self {
            hash_algorithm,
            flags,
            iterations,
            salt,
        }
    }

    /// The hash algorithm number
    pub fn hash_algorithm(&self) -> u8 {
        self.hash_algorithm
    }

    /// The iteration count for the hash
    pub fn iterations(&self) -> u16 {
        self.iterations
    }

    /// The salt for the hash
    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    /// Reads the rdata
    pub fn read_data(decoder: &mut BinDecoder<'_>) -> DnsResult<Self> {
        let hash_algorithm = decoder.read_u8()?;
        let flags = decoder.read_u8()?;
        let iterations = decoder.read_u16()?;
        let salt_len = decoder.read_u8()?;
        let salt = decoder.read_vec(salt_len as usize)?;

        Ok(Self {
            hash_algorithm,
            flags,
            iterations,
            salt,
        })
    }
}

impl BinEncodable for NSEC3PARAM {
    fn emit(&self, encoder: &mut BinEncoder<'_>) -> DnsResult<()> {
        encoder.emit(self.hash_algorithm)?;
        encoder.emit(self.flags)?;
        encoder.emit_u16(self.iterations)?;
        encoder.emit(self.salt.len() as u8)?;
        encoder.emit_vec(&self.salt)
    }
}

impl Display for NSEC3PARAM {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} -",
            self.hash_algorithm, self.flags, self.iterations
        )
    }
}
