// Copyright 2025-2026 the veridns authors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Binary serialization types: the wire codec of RFC 1035 §4.1.4 with
//! pointer compression and the DNSSEC canonical form of RFC 4034 §6.

mod decoder;
mod encoder;

pub use self::decoder::BinDecoder;
pub use self::encoder::{BinEncoder, Place};

use crate::error::DnsResult;

/// A type which can be encoded into the DNS binary wire format
pub trait BinEncodable {
    /// Write the type to the encoder
    fn emit(&self, encoder: &mut BinEncoder<'_>) -> DnsResult<()>;

    /// Returns the object in binary form
    fn to_bytes(&self) -> DnsResult<Vec<u8>> {
        let mut bytes = Vec::<u8>::new();
        {
            let mut encoder = BinEncoder::new(&mut bytes);
            self.emit(&mut encoder)?;
        }

        Ok(bytes)
    }
}

/// A type which can be read from the DNS binary wire format
pub trait BinDecodable<'r>: Sized {
    /// Read the type from the decoder
    fn read(decoder: &mut BinDecoder<'r>) -> DnsResult<Self>;

    /// Returns the object parsed from the given buffer
    fn from_bytes(bytes: &'r [u8]) -> DnsResult<Self> {
        let mut decoder = BinDecoder::new(bytes);
        Self::read(&mut decoder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_u16_and_u32() {
        let bytes = [0x01_u8, 0x02, 0x03, 0x04, 0x05, 0x06];
        let mut decoder = BinDecoder::new(&bytes);
        assert_eq!(decoder.read_u16().unwrap(), 0x0102);
        assert_eq!(decoder.read_u32().unwrap(), 0x0304_0506);
        assert!(decoder.read_u8().is_err());
    }

    #[test]
    fn emit_character_data_rejects_oversize() {
        let mut bytes = Vec::new();
        let mut encoder = BinEncoder::new(&mut bytes);
        let too_long = vec![b'a'; 256];
        assert!(encoder.emit_character_data(&too_long).is_err());
        assert!(encoder.emit_character_data(b"abc").is_ok());
        assert_eq!(bytes, vec![3, b'a', b'b', b'c']);
    }
}
