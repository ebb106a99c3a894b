// Copyright 2025-2026 the veridns authors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Message metadata

use std::fmt::{self, Display, Formatter};

use crate::error::DnsResult;
use crate::serialize::binary::{BinDecodable, BinDecoder, BinEncodable, BinEncoder};

/// Operation code for queries, updates, and responses
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum OpCode {
    /// Query request [RFC 1035]
    Query,
    /// Status message [RFC 1035]
    Status,
    /// Notify of change [RFC 1996]
    Notify,
    /// Update message [RFC 2136]
    Update,
    /// Any other opcode
    Unknown(u8),
}

impl From<u8> for OpCode {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Query,
            2 => Self::Status,
            4 => Self::Notify,
            5 => Self::Update,
            _ => Self::Unknown(value),
        }
    }
}

impl From<OpCode> for u8 {
    fn from(value: OpCode) -> Self {
        match value {
            OpCode::Query => 0,
            OpCode::Status => 2,
            OpCode::Notify => 4,
            OpCode::Update => 5,
            OpCode::Unknown(value) => value,
        }
    }
}

/// The response code of a message (the 4-bit header field; the high bits of
/// the extended rcode live in the OPT record, RFC 6891 §6.1.3)
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum ResponseCode {
    /// No error
    #[default]
    NoError,
    /// Format error
    FormErr,
    /// Server failure
    ServFail,
    /// Non-existent domain
    NXDomain,
    /// Not implemented
    NotImp,
    /// Query refused
    Refused,
    /// EDNS version not implemented (extended)
    BadVers,
    /// Any other code
    Unknown(u16),
}

impl ResponseCode {
    /// The low 4 bits, the part carried in the header
    pub fn low(self) -> u8 {
        (u16::from(self) & 0x000F) as u8
    }

    /// The high 8 bits, the part carried in the OPT TTL field
    pub fn high(self) -> u8 {
        ((u16::from(self) & 0x0FF0) >> 4) as u8
    }

    /// Combines the header rcode with the extended high bits from an OPT
    pub fn from_parts(high: u8, low: u8) -> Self {
        Self::from((u16::from(high) << 4) | u16::from(low & 0x0F))
    }
}

impl From<u16> for ResponseCode {
    fn from(value: u16) -> Self {
        match value {
            0 => Self::NoError,
            1 => Self::FormErr,
            2 => Self::ServFail,
            3 => Self::NXDomain,
            4 => Self::NotImp,
            5 => Self::Refused,
            16 => Self::BadVers,
            _ => Self::Unknown(value),
        }
    }
}

impl From<ResponseCode> for u16 {
    fn from(value: ResponseCode) -> Self {
        match value {
            ResponseCode::NoError => 0,
            ResponseCode::FormErr => 1,
            ResponseCode::ServFail => 2,
            ResponseCode::NXDomain => 3,
            ResponseCode::NotImp => 4,
            ResponseCode::Refused => 5,
            ResponseCode::BadVers => 16,
            ResponseCode::Unknown(value) => value,
        }
    }
}

impl Display for ResponseCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NoError => "NOERROR",
            Self::FormErr => "FORMERR",
            Self::ServFail => "SERVFAIL",
            Self::NXDomain => "NXDOMAIN",
            Self::NotImp => "NOTIMP",
            Self::Refused => "REFUSED",
            Self::BadVers => "BADVERS",
            Self::Unknown(value) => return write!(f, "RCODE{value}"),
        };

        f.write_str(s)
    }
}

/// Message header
///
/// ```text
/// 4.1.1. Header section format
///
///                                     1  1  1  1  1  1
///       0  1  2  3  4  5  6  7  8  9  0  1  2  3  4  5
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                      ID                       |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |QR|   Opcode  |AA|TC|RD|RA| Z|AD|CD|   RCODE   |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                    QDCOUNT                    |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                    ANCOUNT                    |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                    NSCOUNT                    |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                    ARCOUNT                    |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Header {
    id: u16,
    response: bool,
    op_code: OpCode,
    authoritative: bool,
    truncated: bool,
    recursion_desired: bool,
    recursion_available: bool,
    authentic_data: bool,
    checking_disabled: bool,
    response_code: ResponseCode,
    query_count: u16,
    answer_count: u16,
    authority_count: u16,
    additional_count: u16,
}

impl Default for Header {
    fn default() -> Self {
        Self::new()
    }
}

impl Header {
    /// The wire length of a header in bytes
    pub const LENGTH: usize = 12;

    /// A new header for a query
    pub fn new() -> Self {
        Self {
            id: 0,
            response: false,
            op_code: OpCode::Query,
            authoritative: false,
            truncated: false,
            recursion_desired: false,
            recursion_available: false,
            authentic_data: false,
            checking_disabled: false,
            response_code: ResponseCode::NoError,
            query_count: 0,
            answer_count: 0,
            authority_count: 0,
            additional_count: 0,
        }
    }

    /// The transaction id
    pub fn id(&self) -> u16 {
        self.id
    }

    /// Sets the transaction id
    pub fn set_id(&mut self, id: u16) -> &mut Self {
        self.id = id;
        self
    }

    /// QR flag: true for responses
    pub fn is_response(&self) -> bool {
        self.response
    }

    /// Sets the QR flag
    pub fn set_response(&mut self, response: bool) -> &mut Self {
        self.response = response;
        self
    }

    /// The operation code of the message
    pub fn op_code(&self) -> OpCode {
        self.op_code
    }

    /// Sets the operation code
    pub fn set_op_code(&mut self, op_code: OpCode) -> &mut Self {
        self.op_code = op_code;
        self
    }

    /// AA flag
    pub fn authoritative(&self) -> bool {
        self.authoritative
    }

    /// Sets the AA flag
    pub fn set_authoritative(&mut self, authoritative: bool) -> &mut Self {
        self.authoritative = authoritative;
        self
    }

    /// TC flag
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    /// Sets the TC flag
    pub fn set_truncated(&mut self, truncated: bool) -> &mut Self {
        self.truncated = truncated;
        self
    }

    /// RD flag
    pub fn recursion_desired(&self) -> bool {
        self.recursion_desired
    }

    /// Sets the RD flag
    pub fn set_recursion_desired(&mut self, rd: bool) -> &mut Self {
        self.recursion_desired = rd;
        self
    }

    /// RA flag
    pub fn recursion_available(&self) -> bool {
        self.recursion_available
    }

    /// Sets the RA flag
    pub fn set_recursion_available(&mut self, ra: bool) -> &mut Self {
        self.recursion_available = ra;
        self
    }

    /// AD flag: the answer was authenticated by a validator
    pub fn authentic_data(&self) -> bool {
        self.authentic_data
    }

    /// Sets the AD flag
    pub fn set_authentic_data(&mut self, ad: bool) -> &mut Self {
        self.authentic_data = ad;
        self
    }

    /// CD flag: checking disabled, the upstream must not apply its own
    /// validation decision
    pub fn checking_disabled(&self) -> bool {
        self.checking_disabled
    }

    /// Sets the CD flag
    pub fn set_checking_disabled(&mut self, cd: bool) -> &mut Self {
        self.checking_disabled = cd;
        self
    }

    /// The 4-bit header response code
    pub fn response_code(&self) -> ResponseCode {
        self.response_code
    }

    /// Sets the response code (the low 4 bits are written to the header)
    pub fn set_response_code(&mut self, rcode: ResponseCode) -> &mut Self {
        self.response_code = rcode;
        self
    }

    /// Number of records in the question section
    pub fn query_count(&self) -> u16 {
        self.query_count
    }

    /// Sets the question count
    pub fn set_query_count(&mut self, count: u16) -> &mut Self {
        self.query_count = count;
        self
    }

    /// Number of records in the answer section
    pub fn answer_count(&self) -> u16 {
        self.answer_count
    }

    /// Sets the answer count
    pub fn set_answer_count(&mut self, count: u16) -> &mut Self {
        self.answer_count = count;
        self
    }

    /// Number of records in the authority section
    pub fn authority_count(&self) -> u16 {
        self.authority_count
    }

    /// Sets the authority count
    pub fn set_authority_count(&mut self, count: u16) -> &mut Self {
        self.authority_count = count;
        self
    }

    /// Number of records in the additional section
    pub fn additional_count(&self) -> u16 {
        self.additional_count
    }

    /// Sets the additional count
    pub fn set_additional_count(&mut self, count: u16) -> &mut Self {
        self.additional_count = count;
        self
    }

    /// The sixteen flag bits of the header
    pub fn flags(&self) -> u16 {
        let mut flags = 0_u16;
        if self.response {
            flags |= 0x8000;
        }
        flags |= (u16::from(u8::from(self.op_code)) & 0x0F) << 11;
        if self.authoritative {
            flags |= 0x0400;
        }
        if self.truncated {
            flags |= 0x0200;
        }
        if self.recursion_desired {
            flags |= 0x0100;
        }
        if self.recursion_available {
            flags |= 0x0080;
        }
        if self.authentic_data {
            flags |= 0x0020;
        }
        if self.checking_disabled {
            flags |= 0x0010;
        }
        flags |= u16::from(self.response_code.low());

        flags
    }

    fn set_flags(&mut self, flags: u16) {
        self.response = flags & 0x8000 != 0;
        self.op_code = OpCode::from(((flags >> 11) & 0x0F) as u8);
        self.authoritative = flags & 0x0400 != 0;
        self.truncated = flags & 0x0200 != 0;
        self.recursion_desired = flags & 0x0100 != 0;
        self.recursion_available = flags & 0x0080 != 0;
        self.authentic_data = flags & 0x0020 != 0;
        self.checking_disabled = flags & 0x0010 != 0;
        self.response_code = ResponseCode::from(flags & 0x000F);
    }
}

impl BinEncodable for Header {
    fn emit(&self, encoder: &mut BinEncoder<'_>) -> DnsResult<()> {
        encoder.emit_u16(self.id)?;
        encoder.emit_u16(self.flags())?;
        encoder.emit_u16(self.query_count)?;
        encoder.emit_u16(self.answer_count)?;
        encoder.emit_u16(self.authority_count)?;
        encoder.emit_u16(self.additional_count)
    }
}

impl<'r> BinDecodable<'r> for Header {
    fn read(decoder: &mut BinDecoder<'r>) -> DnsResult<Self> {
        let id = decoder.read_u16()?;
        let flags = decoder.read_u16()?;

        let mut header = Self::new();
        header.set_id(id);
        header.set_flags(flags);
        header.query_count = decoder.read_u16()?;
        header.answer_count = decoder.read_u16()?;
        header.authority_count = decoder.read_u16()?;
        header.additional_count = decoder.read_u16()?;

        Ok(header)
    }
}

impl Display for Header {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "id: {} qr: {} opcode: {:?} rcode: {} tc: {} ad: {} cd: {}",
            self.id,
            self.response,
            self.op_code,
            self.response_code,
            self.truncated,
            self.authentic_data,
            self.checking_disabled,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_round_trip() {
        let mut header = Header::new();
        header
            .set_id(0x1234)
            .set_response(true)
            .set_recursion_desired(true)
            .set_authentic_data(true)
            .set_response_code(ResponseCode::NXDomain);

        let bytes = header.to_bytes().unwrap();
        let mut decoder = BinDecoder::new(&bytes);
        let read = Header::read(&mut decoder).unwrap();
        assert_eq!(read, header);
        assert!(read.authentic_data());
        assert_eq!(read.response_code(), ResponseCode::NXDomain);
    }

    #[test]
    fn extended_rcode_parts() {
        let bad_vers = ResponseCode::BadVers;
        assert_eq!(bad_vers.low(), 0);
        assert_eq!(bad_vers.high(), 1);
        assert_eq!(ResponseCode::from_parts(1, 0), ResponseCode::BadVers);
    }
}
