// Copyright 2025-2026 the veridns authors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Basic protocol message for DNS

use std::fmt::{self, Display, Formatter};

use crate::error::DnsResult;
use crate::op::{Edns, Header, OpCode, Query, ResponseCode};
use crate::rr::{DNSClass, Name, RData, Record, RecordType};
use crate::serialize::binary::{BinDecodable, BinDecoder, BinEncodable, BinEncoder};

/// A DNS message: header, question, answer, authority and additional
/// sections
///
/// The OPT pseudo-record is unpacked into [`Edns`] on parse and rendered
/// back as the last additional record (before TSIG, which an external
/// authenticator appends). The byte offset of a TSIG record and of any
/// SIG(0) records is preserved for that authenticator.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Message {
    header: Header,
    queries: Vec<Query>,
    answers: Vec<Record>,
    authorities: Vec<Record>,
    additionals: Vec<Record>,
    edns: Option<Edns>,
    /// byte offset of the TSIG record in the source buffer, when parsed
    tsig_offset: Option<usize>,
}

impl Message {
    /// A new query message with a random id left to the caller
    pub fn new() -> Self {
        Self::default()
    }

    /// A new query for the given question, RD set
    pub fn new_query(query: Query) -> Self {
        let mut message = Self::new();
        message.header.set_id(rand::random());
        message.header.set_recursion_desired(true);
        message.add_query(query);
        message
    }

    /// An error response for the request: same id and question, QR set,
    /// the given response code, and nothing else
    pub fn error_from(request: &Message, rcode: ResponseCode) -> Self {
        let mut message = Self::new();
        message.header.set_id(request.id());
        message.header.set_response(true);
        message.header.set_response_code(rcode);
        message.header.set_recursion_desired(request.recursion_desired());
        if let Some(query) = request.queries.first() {
            message.add_query(query.clone());
        }

        message
    }

    /// The header of the message
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Mutable access to the header
    pub fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }

    /// see `Header::id()`
    pub fn id(&self) -> u16 {
        self.header.id()
    }

    /// see `Header::set_id()`
    pub fn set_id(&mut self, id: u16) -> &mut Self {
        self.header.set_id(id);
        self
    }

    /// see `Header::op_code()`
    pub fn op_code(&self) -> OpCode {
        self.header.op_code()
    }

    /// see `Header::recursion_desired()`
    pub fn recursion_desired(&self) -> bool {
        self.header.recursion_desired()
    }

    /// The response code, extended with the high bits from the OPT record
    pub fn response_code(&self) -> ResponseCode {
        match &self.edns {
            Some(edns) => {
                ResponseCode::from_parts(edns.rcode_high(), self.header.response_code().low())
            }
            None => self.header.response_code(),
        }
    }

    /// Sets the response code; high bits go to the OPT record when one is
    /// present
    pub fn set_response_code(&mut self, rcode: ResponseCode) -> &mut Self {
        if let Some(edns) = &mut self.edns {
            edns.set_rcode_high(rcode.high());
        }
        self.header.set_response_code(rcode);
        self
    }

    /// Adds a question to the message
    pub fn add_query(&mut self, query: Query) -> &mut Self {
        self.queries.push(query);
        self
    }

    /// The question section
    pub fn queries(&self) -> &[Query] {
        &self.queries
    }

    /// The first (and in practice only) question
    pub fn query(&self) -> Option<&Query> {
        self.queries.first()
    }

    /// The answer section
    pub fn answers(&self) -> &[Record] {
        &self.answers
    }

    /// Adds a record to the answer section
    pub fn add_answer(&mut self, record: Record) -> &mut Self {
        self.answers.push(record);
        self
    }

    /// Removes and returns the answer section
    pub fn take_answers(&mut self) -> Vec<Record> {
        std::mem::take(&mut self.answers)
    }

    /// The authority section
    pub fn authorities(&self) -> &[Record] {
        &self.authorities
    }

    /// Adds a record to the authority section
    pub fn add_authority(&mut self, record: Record) -> &mut Self {
        self.authorities.push(record);
        self
    }

    /// Removes and returns the authority section
    pub fn take_authorities(&mut self) -> Vec<Record> {
        std::mem::take(&mut self.authorities)
    }

    /// The additional section, without the OPT pseudo-record
    pub fn additionals(&self) -> &[Record] {
        &self.additionals
    }

    /// Adds a record to the additional section
    pub fn add_additional(&mut self, record: Record) -> &mut Self {
        self.additionals.push(record);
        self
    }

    /// The EDNS state of the message, when an OPT record was present or set
    pub fn edns(&self) -> Option<&Edns> {
        self.edns.as_ref()
    }

    /// The EDNS state, created on first access
    pub fn edns_mut(&mut self) -> &mut Edns {
        self.edns.get_or_insert_with(Edns::new)
    }

    /// Replaces the EDNS state
    pub fn set_edns(&mut self, edns: Edns) -> &mut Self {
        self.edns = Some(edns);
        self
    }

    /// The byte offset of the TSIG record in the parsed buffer, for an
    /// external authenticator
    pub fn tsig_offset(&self) -> Option<usize> {
        self.tsig_offset
    }

    /// The SIG(0) records: ADDITIONAL SIG records with type-covered zero
    /// (RFC 2931), for an external authenticator
    pub fn sig0(&self) -> impl Iterator<Item = &Record> + '_ {
        self.additionals.iter().filter(|r| {
            match r.data() {
                RData::DNSSEC(crate::dnssec::rdata::DNSSECRData::RRSIG(sig)) => {
                    r.record_type() == RecordType::SIG
                        && sig.type_covered() == RecordType::ZERO
                }
                _ => false,
            }
        })
    }

    /// All records of the three response sections
    pub fn all_sections(&self) -> impl Iterator<Item = &Record> + '_ {
        self.answers
            .iter()
            .chain(self.authorities.iter())
            .chain(self.additionals.iter())
    }

    /// Renders the message without a size budget
    pub fn to_wire(&self) -> DnsResult<Vec<u8>> {
        self.to_wire_with_max_size(u16::MAX)
    }

    /// Renders the message within `max_size` bytes
    ///
    /// The header and question are always rendered. Each later section is
    /// rendered greedily; when a record does not fit, the write rewinds to
    /// the last complete RRset boundary, the TC flag is set and the
    /// remaining sections are dropped. The OPT record goes last.
    pub fn to_wire_with_max_size(&self, max_size: u16) -> DnsResult<Vec<u8>> {
        let mut buffer = Vec::with_capacity(512);
        {
            let mut encoder = BinEncoder::new(&mut buffer);

            // the header and question ignore the budget: a response without
            // its question is useless to the client
            encoder.emit_u16(self.header.id())?;
            let flags_place = encoder.place_u16()?;
            encoder.emit_u16(self.queries.len() as u16)?;
            let answer_place = encoder.place_u16()?;
            let authority_place = encoder.place_u16()?;
            let additional_place = encoder.place_u16()?;

            for query in &self.queries {
                query.emit(&mut encoder)?;
            }

            encoder.set_max_size(max_size);

            let (answer_count, truncated) = emit_section(&mut encoder, &self.answers)?;
            let (authority_count, truncated) = if truncated {
                (0, true)
            } else {
                emit_section(&mut encoder, &self.authorities)?
            };
            let (mut additional_count, truncated) = if truncated {
                (0, true)
            } else {
                emit_section(&mut encoder, &self.additionals)?
            };

            // the OPT record is rendered last; when even it does not fit it
            // is dropped rather than truncating the message further
            if let Some(edns) = &self.edns {
                let offset = encoder.offset();
                match edns.to_record().emit(&mut encoder) {
                    Ok(()) => additional_count += 1,
                    Err(e) if e.kind().is_max_buffer_size_exceeded() => encoder.trim(offset),
                    Err(e) => return Err(e),
                }
            }

            let mut header = self.header;
            header.set_truncated(self.header.truncated() || truncated);
            encoder.emit_u16_at(flags_place, header.flags());
            encoder.emit_u16_at(answer_place, answer_count);
            encoder.emit_u16_at(authority_place, authority_count);
            encoder.emit_u16_at(additional_place, additional_count);
        }

        Ok(buffer)
    }

    /// Parses a message from its wire form
    pub fn from_wire(buffer: &[u8]) -> DnsResult<Self> {
        let mut decoder = BinDecoder::new(buffer);
        Self::read(&mut decoder)
    }
}

/// The rrset grouping key of a record; an RRSIG groups with the set it
/// covers so truncation never splits signatures from their records
fn rrset_key(record: &Record) -> (&Name, RecordType, DNSClass) {
    let rr_type = match record.data() {
        RData::DNSSEC(crate::dnssec::rdata::DNSSECRData::RRSIG(rrsig)) => rrsig.type_covered(),
        _ => record.record_type(),
    };

    (record.name(), rr_type, record.dns_class())
}

/// Emits the records of one section, returning the count written and
/// whether the section was truncated at an rrset boundary
fn emit_section(encoder: &mut BinEncoder<'_>, records: &[Record]) -> DnsResult<(u16, bool)> {
    let mut rollback_offset = encoder.offset();
    let mut rollback_count = 0_u16;
    let mut count = 0_u16;

    for (idx, record) in records.iter().enumerate() {
        let boundary = idx == 0 || rrset_key(record) != rrset_key(&records[idx - 1]);
        if boundary {
            rollback_offset = encoder.offset();
            rollback_count = count;
        }

        match record.emit(encoder) {
            Ok(()) => count += 1,
            Err(e) if e.kind().is_max_buffer_size_exceeded() => {
                encoder.trim(rollback_offset);
                return Ok((rollback_count, true));
            }
            Err(e) => return Err(e),
        }
    }

    Ok((count, false))
}

impl BinEncodable for Message {
    fn emit(&self, encoder: &mut BinEncoder<'_>) -> DnsResult<()> {
        // the common path goes through to_wire; this impl supports nesting a
        // message inside other encodes without a budget
        let bytes = self.to_wire()?;
        encoder.emit_vec(&bytes)
    }
}

impl<'r> BinDecodable<'r> for Message {
    fn read(decoder: &mut BinDecoder<'r>) -> DnsResult<Self> {
        let header = Header::read(decoder)?;

        let mut queries = Vec::with_capacity(header.query_count() as usize);
        for _ in 0..header.query_count() {
            queries.push(Query::read(decoder)?);
        }

        let mut message = Self {
            header,
            queries,
            ..Self::default()
        };

        for _ in 0..header.answer_count() {
            let record = Record::read(decoder)?;
            message.answers.push(record);
        }
        for _ in 0..header.authority_count() {
            let record = Record::read(decoder)?;
            message.authorities.push(record);
        }
        for _ in 0..header.additional_count() {
            let offset = decoder.index();
            let record = Record::read(decoder)?;
            match record.record_type() {
                RecordType::OPT => {
                    message.edns = Some(Edns::from_record(&record)?);
                }
                RecordType::TSIG => {
                    message.tsig_offset = Some(offset);
                    message.additionals.push(record);
                }
                _ => message.additionals.push(record),
            }
        }

        Ok(message)
    }
}

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "; {}", self.header)?;
        for query in &self.queries {
            writeln!(f, ";; {query}")?;
        }
        for record in self.all_sections() {
            writeln!(f, "{record}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rr::rdata::A;
    use std::str::FromStr;

    fn response_with_answers(count: usize) -> Message {
        let name = Name::from_ascii("foo.example.com.").unwrap();
        let mut message = Message::new();
        message.header_mut().set_id(42).set_response(true);
        message.add_query(Query::query(name.clone(), RecordType::A));
        for i in 0..count {
            message.add_answer(Record::from_rdata(
                name.clone(),
                3600,
                RData::A(A::from_str(&format!("192.0.2.{i}")).unwrap()),
            ));
        }

        message
    }

    #[test]
    fn wire_round_trip() {
        let mut message = response_with_answers(3);
        message.edns_mut().set_dnssec_ok(true);

        let bytes = message.to_wire().unwrap();
        let read = Message::from_wire(&bytes).unwrap();
        assert_eq!(read.queries(), message.queries());
        assert_eq!(read.answers(), message.answers());
        assert_eq!(read.edns(), message.edns());
        assert_eq!(read.id(), message.id());
        assert_eq!(read.header().answer_count(), 3);

        // round trip is idempotent when nothing truncates
        assert_eq!(read.to_wire().unwrap(), bytes);
    }

    #[test]
    fn minimal_budget_truncates_all_but_question() {
        let message = response_with_answers(3);
        let bytes = message
            .to_wire_with_max_size(Header::LENGTH as u16 + 1)
            .unwrap();

        let read = Message::from_wire(&bytes).unwrap();
        assert!(read.header().truncated());
        assert_eq!(read.header().query_count(), 1);
        assert_eq!(read.header().answer_count(), 0);
        assert_eq!(read.header().authority_count(), 0);
        assert_eq!(read.header().additional_count(), 0);
    }

    #[test]
    fn truncation_preserves_whole_rrsets() {
        let message = response_with_answers(10);
        let full = message.to_wire().unwrap();

        // pick a budget that cuts into the middle of the answer rrset: the
        // whole rrset must be rolled back
        let budget = (full.len() - 10) as u16;
        let bytes = message.to_wire_with_max_size(budget).unwrap();
        let read = Message::from_wire(&bytes).unwrap();
        assert!(read.header().truncated());
        assert_eq!(read.header().answer_count(), 0);
    }

    #[test]
    fn error_from_preserves_question() {
        let request = Message::new_query(Query::query(
            Name::from_ascii("foo.example.com.").unwrap(),
            RecordType::A,
        ));
        let error = Message::error_from(&request, ResponseCode::ServFail);
        assert_eq!(error.id(), request.id());
        assert_eq!(error.queries(), request.queries());
        assert_eq!(error.response_code(), ResponseCode::ServFail);
        assert!(error.header().is_response());
    }
}
