// Copyright 2025-2026 the veridns authors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! text records for storing arbitrary data

use std::fmt::{self, Display, Formatter};

use crate::error::DnsResult;
use crate::serialize::binary::{BinDecoder, BinEncodable, BinEncoder};

/// [RFC 1035, DOMAIN NAMES - IMPLEMENTATION AND SPECIFICATION, November 1987](https://tools.ietf.org/html/rfc1035)
///
/// ```text
/// 3.3.14. TXT RDATA format
///
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     /                   TXT-DATA                    /
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///
/// TXT-DATA        One or more <character-string>s.
/// ```
///
/// The validator uses TXT under the root name, in the validation-reason
/// class, to carry the human-readable failure reason, each string at most
/// 255 octets.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct TXT {
    txt_data: Vec<Box<[u8]>>,
}

impl TXT {
    /// Creates a new TXT record data from the given strings
    ///
    /// Each string must fit in a `<character-string>`, i.e. 255 octets.
    pub fn new(txt_data: Vec<String>) -> Self {
        Self {
            txt_data: txt_data
                .into_iter()
                .map(|s| s.into_bytes().into_boxed_slice())
                .collect(),
        }
    }

    /// Creates a TXT from a long string, split into ≤255-octet strings
    pub fn from_reason(reason: &str) -> Self {
        let bytes = reason.as_bytes();
        let txt_data = bytes
            .chunks(255)
            .map(|chunk| chunk.to_vec().into_boxed_slice())
            .collect();

        Self { txt_data }
    }

    /// The raw character-strings of this TXT record
    pub fn txt_data(&self) -> &[Box<[u8]>] {
        &self.txt_data
    }

    /// Reads the rdata, consuming exactly `rdata_length` bytes
    pub fn read_data(decoder: &mut BinDecoder<'_>, rdata_length: u16) -> DnsResult<Self> {
        let data_len = decoder.len();
        let mut strings = Vec::with_capacity(1);

        while data_len - decoder.len() < rdata_length as usize {
            let string = decoder.read_character_data()?;
            strings.push(string.to_vec().into_boxed_slice());
        }

        Ok(Self { txt_data: strings })
    }
}

impl BinEncodable for TXT {
    fn emit(&self, encoder: &mut BinEncoder<'_>) -> DnsResult<()> {
        for string in &self.txt_data {
            encoder.emit_character_data(string)?;
        }

        Ok(())
    }
}

impl Display for TXT {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for string in &self.txt_data {
            write!(f, "\"{}\" ", String::from_utf8_lossy(string))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_splitting() {
        let long = "x".repeat(600);
        let txt = TXT::from_reason(&long);
        assert_eq!(txt.txt_data().len(), 3);
        assert_eq!(txt.txt_data()[0].len(), 255);
        assert_eq!(txt.txt_data()[2].len(), 90);
    }
}
