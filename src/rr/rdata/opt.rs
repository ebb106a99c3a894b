// Copyright 2025-2026 the veridns authors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! option record for passing protocol options between client and server,
//! RFC 6891, with the Extended DNS Error option of RFC 8914

use std::fmt::{self, Display, Formatter};

use crate::error::DnsResult;
use crate::serialize::binary::{BinDecoder, BinEncodable, BinEncoder};

/// The codes of EDNS options this crate understands
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum EdnsCode {
    /// Extended DNS Error, RFC 8914
    Ede,
    /// Every other option, carried opaquely
    Unknown(u16),
}

impl From<u16> for EdnsCode {
    fn from(value: u16) -> Self {
        match value {
            15 => Self::Ede,
            _ => Self::Unknown(value),
        }
    }
}

impl From<EdnsCode> for u16 {
    fn from(code: EdnsCode) -> Self {
        match code {
            EdnsCode::Ede => 15,
            EdnsCode::Unknown(value) => value,
        }
    }
}

/// The Extended DNS Error info codes used by the validator, RFC 8914 §4
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum EdeCode {
    /// 0 - the catch-all code
    Other,
    /// 1 - Unsupported DNSKEY Algorithm
    UnsupportedDnskeyAlgorithm,
    /// 2 - Unsupported DS Digest Type
    UnsupportedDsDigestType,
    /// 5 - DNSSEC Indeterminate
    DnssecIndeterminate,
    /// 6 - DNSSEC Bogus
    DnssecBogus,
    /// 7 - Signature Expired
    SignatureExpired,
    /// 8 - Signature Not Yet Valid
    SignatureNotYetValid,
    /// 9 - DNSKEY Missing
    DnskeyMissing,
    /// 10 - RRSIGs Missing
    RrsigsMissing,
    /// 11 - No Zone Key Bit Set
    NoZoneKeyBitSet,
    /// 12 - NSEC Missing
    NsecMissing,
    /// 23 - Network Error
    NetworkError,
    /// Any other info code
    Unknown(u16),
}

impl From<u16> for EdeCode {
    fn from(value: u16) -> Self {
        match value {
            0 => Self::Other,
            1 => Self::UnsupportedDnskeyAlgorithm,
            2 => Self::UnsupportedDsDigestType,
            5 => Self::DnssecIndeterminate,
            6 => Self::DnssecBogus,
            7 => Self::SignatureExpired,
            8 => Self::SignatureNotYetValid,
            9 => Self::DnskeyMissing,
            10 => Self::RrsigsMissing,
            11 => Self::NoZoneKeyBitSet,
            12 => Self::NsecMissing,
            23 => Self::NetworkError,
            _ => Self::Unknown(value),
        }
    }
}

impl From<EdeCode> for u16 {
    fn from(code: EdeCode) -> Self {
        match code {
            EdeCode::Other => 0,
            EdeCode::UnsupportedDnskeyAlgorithm => 1,
            EdeCode::UnsupportedDsDigestType => 2,
            EdeCode::DnssecIndeterminate => 5,
            EdeCode::DnssecBogus => 6,
            EdeCode::SignatureExpired => 7,
            EdeCode::SignatureNotYetValid => 8,
            EdeCode::DnskeyMissing => 9,
            EdeCode::RrsigsMissing => 10,
            EdeCode::NoZoneKeyBitSet => 11,
            EdeCode::NsecMissing => 12,
            EdeCode::NetworkError => 23,
            EdeCode::Unknown(value) => value,
        }
    }
}

impl Display for EdeCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Other => "Other",
            Self::UnsupportedDnskeyAlgorithm => "Unsupported DNSKEY Algorithm",
            Self::UnsupportedDsDigestType => "Unsupported DS Digest Type",
            Self::DnssecIndeterminate => "DNSSEC Indeterminate",
            Self::DnssecBogus => "DNSSEC Bogus",
            Self::SignatureExpired => "Signature Expired",
            Self::SignatureNotYetValid => "Signature Not Yet Valid",
            Self::DnskeyMissing => "DNSKEY Missing",
            Self::RrsigsMissing => "RRSIGs Missing",
            Self::NoZoneKeyBitSet => "No Zone Key Bit Set",
            Self::NsecMissing => "NSEC Missing",
            Self::NetworkError => "Network Error",
            Self::Unknown(value) => return write!(f, "EDE{value}"),
        };

        f.write_str(s)
    }
}

/// The Extended DNS Error option: an info code with optional extra text
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Ede {
    /// The numeric error code
    pub info_code: EdeCode,
    /// UTF-8 additional context, may be empty
    pub extra_text: Option<String>,
}

impl Ede {
    /// Construct a new EDE option
    pub fn new(info_code: EdeCode, extra_text: Option<String>) -> Self {
        Self {
            info_code,
            extra_text,
        }
    }
}

/// A single EDNS option, opaque unless understood
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum EdnsOption {
    /// RFC 8914 Extended DNS Error
    Ede(Ede),
    /// An option carried opaquely
    Unknown(u16, Vec<u8>),
}

impl EdnsOption {
    /// The option code of this option
    pub fn code(&self) -> EdnsCode {
        match self {
            Self::Ede(_) => EdnsCode::Ede,
            Self::Unknown(code, _) => EdnsCode::Unknown(*code),
        }
    }

    fn wire_data(&self) -> Vec<u8> {
        match self {
            Self::Ede(ede) => {
                let mut data = u16::from(ede.info_code).to_be_bytes().to_vec();
                if let Some(text) = &ede.extra_text {
                    data.extend_from_slice(text.as_bytes());
                }
                data
            }
            Self::Unknown(_, data) => data.clone(),
        }
    }

    fn from_wire(code: u16, data: &[u8]) -> Self {
        match EdnsCode::from(code) {
            EdnsCode::Ede if data.len() >= 2 => {
                let info_code = EdeCode::from(u16::from_be_bytes([data[0], data[1]]));
                let extra_text = if data.len() > 2 {
                    Some(String::from_utf8_lossy(&data[2..]).into_owned())
                } else {
                    None
                };
                Self::Ede(Ede::new(info_code, extra_text))
            }
            _ => Self::Unknown(code, data.to_vec()),
        }
    }
}

/// The rdata of the OPT pseudo-record: a sequence of options
///
/// The fixed OPT fields (payload size, extended rcode, version, DO) live in
/// the record envelope and are modeled by [`Edns`].
///
/// [`Edns`]: crate::op::Edns
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct OPT {
    options: Vec<EdnsOption>,
}

impl OPT {
    /// Creates a new OPT record data with the given options
    pub fn new(options: Vec<EdnsOption>) -> Self {
        Self { options }
    }

    /// The options of this OPT record, in wire order
    pub fn options(&self) -> &[EdnsOption] {
        &self.options
    }

    /// Returns the option with the given code, if present
    pub fn get(&self, code: EdnsCode) -> Option<&EdnsOption> {
        self.options.iter().find(|o| o.code() == code)
    }

    /// Adds an option, replacing an existing option of the same code
    pub fn insert(&mut self, option: EdnsOption) {
        self.options.retain(|o| o.code() != option.code());
        self.options.push(option);
    }

    /// Reads the rdata, consuming exactly `rdata_length` bytes
    pub fn read_data(decoder: &mut BinDecoder<'_>, rdata_length: u16) -> DnsResult<Self> {
        let mut options = Vec::new();
        let start = decoder.index();
        while decoder.index() - start < rdata_length as usize {
            let code = decoder.read_u16()?;
            let len = decoder.read_u16()?;
            let data = decoder.read_slice(len as usize)?;
            options.push(EdnsOption::from_wire(code, data));
        }

        Ok(Self { options })
    }
}

impl BinEncodable for OPT {
    fn emit(&self, encoder: &mut BinEncoder<'_>) -> DnsResult<()> {
        for option in &self.options {
            let data = option.wire_data();
            encoder.emit_u16(option.code().into())?;
            encoder.emit_u16(data.len() as u16)?;
            encoder.emit_vec(&data)?;
        }

        Ok(())
    }
}

impl Display for OPT {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for option in &self.options {
            match option {
                EdnsOption::Ede(ede) => write!(
                    f,
                    "EDE {}: {} ",
                    u16::from(ede.info_code),
                    ede.extra_text.as_deref().unwrap_or("")
                )?,
                EdnsOption::Unknown(code, data) => write!(f, "OPT{}({} octets) ", code, data.len())?,
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialize::binary::BinDecoder;

    #[test]
    fn ede_wire_round_trip() {
        let opt = OPT::new(vec![EdnsOption::Ede(Ede::new(
            EdeCode::DnssecBogus,
            Some("signature mismatch".to_string()),
        ))]);

        let bytes = opt.to_bytes().unwrap();
        let mut decoder = BinDecoder::new(&bytes);
        let read = OPT::read_data(&mut decoder, bytes.len() as u16).unwrap();
        assert_eq!(read, opt);

        match read.get(EdnsCode::Ede).unwrap() {
            EdnsOption::Ede(ede) => {
                assert_eq!(ede.info_code, EdeCode::DnssecBogus);
                assert_eq!(ede.extra_text.as_deref(), Some("signature mismatch"));
            }
            other => panic!("unexpected option: {other:?}"),
        }
    }

    #[test]
    fn insert_replaces_same_code() {
        let mut opt = OPT::default();
        opt.insert(EdnsOption::Ede(Ede::new(EdeCode::NsecMissing, None)));
        opt.insert(EdnsOption::Ede(Ede::new(EdeCode::DnssecBogus, None)));
        assert_eq!(opt.options().len(), 1);
    }
}
