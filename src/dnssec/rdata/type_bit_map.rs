// Copyright 2025-2026 the veridns authors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! The type bit map field shared by NSEC (RFC 4034 §4.1.2) and NSEC3
//! (RFC 5155 §3.1.8): window blocks of a 256-bit bitmap each.

use crate::error::DnsResult;
use crate::rr::RecordType;
use crate::serialize::binary::{BinDecoder, BinEncoder};

/// Reads the type bit maps, consuming the remainder of the rdata
pub(crate) fn decode(
    decoder: &mut BinDecoder<'_>,
    bit_map_len: usize,
) -> DnsResult<Vec<RecordType>> {
    let mut record_types = Vec::new();
    let start = decoder.index();

    while decoder.index() - start < bit_map_len {
        let window = decoder.read_u8()?;
        let len = decoder.read_u8()?;
        if len > 32 {
            return Err("invalid bitmap length in type bit map".into());
        }

        let bitmap = decoder.read_slice(len as usize)?;
        for (i, &byte) in bitmap.iter().enumerate() {
            for bit in 0..8 {
                if byte & (0x80 >> bit) != 0 {
                    let low = (i as u16) * 8 + bit as u16;
                    record_types.push(RecordType::from_u16(((window as u16) << 8) | low));
                }
            }
        }
    }

    Ok(record_types)
}

/// Writes the type bit maps; types are grouped into ascending window blocks
pub(crate) fn encode(encoder: &mut BinEncoder<'_>, record_types: &[RecordType]) -> DnsResult<()> {
    let mut values: Vec<u16> = record_types.iter().map(|rt| u16::from(*rt)).collect();
    values.sort_unstable();
    values.dedup();

    let mut idx = 0;
    while idx < values.len() {
        let window = (values[idx] >> 8) as u8;
        let mut bitmap = [0_u8; 32];
        let mut high_octet = 0_usize;

        while idx < values.len() && (values[idx] >> 8) as u8 == window {
            let low = (values[idx] & 0xFF) as usize;
            bitmap[low / 8] |= 0x80 >> (low % 8);
            high_octet = low / 8;
            idx += 1;
        }

        encoder.emit(window)?;
        encoder.emit(high_octet as u8 + 1)?;
        encoder.emit_vec(&bitmap[..=high_octet])?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialize::binary::BinDecoder;

    #[test]
    fn round_trip() {
        let types = vec![
            RecordType::A,
            RecordType::MX,
            RecordType::RRSIG,
            RecordType::NSEC,
            RecordType::Unknown(1234),
        ];

        let mut bytes = Vec::new();
        {
            let mut encoder = BinEncoder::new(&mut bytes);
            encode(&mut encoder, &types).unwrap();
        }

        let mut decoder = BinDecoder::new(&bytes);
        let read = decode(&mut decoder, bytes.len()).unwrap();

        let mut expected = types;
        expected.sort_by_key(|rt| u16::from(*rt));
        assert_eq!(read, expected);
    }
}
