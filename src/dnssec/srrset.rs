// Copyright 2025-2026 the veridns authors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! The validator's view of RRsets and messages: record sets annotated with
//! a security status, grouped out of the flat message sections.

use std::fmt::{self, Display, Formatter};
use std::slice::Iter;

use crate::dnssec::rdata::DNSSECRData;
use crate::dnssec::SecurityStatus;
use crate::error::DnsResult;
use crate::op::{Edns, Header, Message, Query, ResponseCode};
use crate::rr::rdata::EdeCode;
use crate::rr::{DNSClass, Name, RData, Record, RecordSet, RecordType};

/// A security-extended RRset: the records, their covering RRSIGs, and the
/// status established for them so far
#[derive(Clone, Debug, PartialEq)]
pub struct SecRrset {
    rrset: RecordSet,
    status: SecurityStatus,
}

impl SecRrset {
    /// Wraps a record set in the unchecked state
    pub fn new(rrset: RecordSet) -> Self {
        Self {
            rrset,
            status: SecurityStatus::Unchecked,
        }
    }

    /// The underlying record set
    pub fn rrset(&self) -> &RecordSet {
        &self.rrset
    }

    /// The owner name of the set
    pub fn name(&self) -> &Name {
        self.rrset.name()
    }

    /// The record type of the set
    pub fn record_type(&self) -> RecordType {
        self.rrset.record_type()
    }

    /// The class of the set
    pub fn dns_class(&self) -> DNSClass {
        self.rrset.dns_class()
    }

    /// The TTL of the set
    pub fn ttl(&self) -> u32 {
        self.rrset.ttl()
    }

    /// The first record of the set; defined only when non-empty
    pub fn first(&self) -> Option<&Record> {
        self.rrset.first()
    }

    /// Iterator over the data records
    pub fn records(&self) -> Iter<'_, Record> {
        self.rrset.records()
    }

    /// The RRSIGs covering this set
    pub fn sigs(&self) -> &[Record] {
        self.rrset.sigs()
    }

    /// Caps the TTL of the set, e.g. to the RRSIG bounds after validation
    pub fn limit_ttl(&mut self, ttl: u32) {
        self.rrset.limit_ttl(ttl);
    }

    /// The security status established for this set
    pub fn status(&self) -> SecurityStatus {
        self.status
    }

    /// Updates the security status
    pub fn set_status(&mut self, status: SecurityStatus) {
        self.status = status;
    }

    /// The signer of this set: the signer name of the first RRSIG, `None`
    /// for unsigned sets
    pub fn signer_name(&self) -> Option<&Name> {
        self.rrset.sigs().first().and_then(|record| match record.data() {
            RData::DNSSEC(DNSSECRData::RRSIG(rrsig)) => Some(rrsig.signer_name()),
            _ => None,
        })
    }

    /// The wildcard this set was expanded from, when the RRSIG labels field
    /// is smaller than the owner label count (RFC 4035 §5.3.2)
    ///
    /// Returns the `*.<base>` name that must be proven to have matched.
    pub fn expanded_from_wildcard(&self) -> DnsResult<Option<Name>> {
        let Some(first_sig) = self.rrset.sigs().first() else {
            return Ok(None);
        };
        let RData::DNSSEC(DNSSECRData::RRSIG(rrsig)) = first_sig.data() else {
            return Ok(None);
        };

        let owner_labels = self.name().num_labels();
        let sig_labels = rrsig.num_labels();
        if sig_labels >= owner_labels {
            return Ok(None);
        }

        let base = self.name().trim_to(sig_labels as usize);
        let wildcard = base.prepend_label(crate::rr::Label::wildcard())?;
        Ok(Some(wildcard))
    }
}

impl Display for SecRrset {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.rrset, self.status)
    }
}

/// A response message regrouped for validation: the answer and authority
/// sections as ordered lists of [`SecRrset`], with the response-wide status
/// and failure justification
#[derive(Clone, Debug)]
pub struct SecMessage {
    header: Header,
    question: Option<Query>,
    answers: Vec<SecRrset>,
    authorities: Vec<SecRrset>,
    additionals: Vec<Record>,
    edns: Option<Edns>,
    status: SecurityStatus,
    ede: Option<EdeCode>,
    reason: Option<String>,
}

impl SecMessage {
    /// Regroups a parsed message; records of each section are gathered into
    /// RRsets in order of first appearance, RRSIGs attached to the set they
    /// cover
    pub fn from_message(message: &Message) -> Self {
        Self {
            header: *message.header(),
            question: message.query().cloned(),
            answers: group_records(message.answers()),
            authorities: group_records(message.authorities()),
            additionals: message.additionals().to_vec(),
            edns: message.edns().cloned(),
            status: SecurityStatus::Unchecked,
            ede: None,
            reason: None,
        }
    }

    /// An empty response with the given header fields, used for the
    /// SERVFAIL rewrite
    pub fn error_for(request: &Message, rcode: ResponseCode) -> Self {
        let mut header = Header::new();
        header.set_id(request.id());
        header.set_response(true);
        header.set_recursion_desired(request.recursion_desired());
        header.set_response_code(rcode);

        Self {
            header,
            question: request.query().cloned(),
            answers: Vec::new(),
            authorities: Vec::new(),
            additionals: Vec::new(),
            edns: None,
            status: SecurityStatus::Unchecked,
            ede: None,
            reason: None,
        }
    }

    /// The header of the response
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Mutable access to the header
    pub fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }

    /// The question of the response
    pub fn question(&self) -> Option<&Query> {
        self.question.as_ref()
    }

    /// The response code, extended by the OPT high bits when present
    pub fn response_code(&self) -> ResponseCode {
        match &self.edns {
            Some(edns) => {
                ResponseCode::from_parts(edns.rcode_high(), self.header.response_code().low())
            }
            None => self.header.response_code(),
        }
    }

    /// The answer section RRsets
    pub fn answers(&self) -> &[SecRrset] {
        &self.answers
    }

    /// Mutable access to the answer RRsets
    pub fn answers_mut(&mut self) -> &mut Vec<SecRrset> {
        &mut self.answers
    }

    /// The authority section RRsets
    pub fn authorities(&self) -> &[SecRrset] {
        &self.authorities
    }

    /// Mutable access to the authority RRsets
    pub fn authorities_mut(&mut self) -> &mut Vec<SecRrset> {
        &mut self.authorities
    }

    /// Authority RRsets of one type
    pub fn authorities_of_type(&self, record_type: RecordType) -> Vec<&SecRrset> {
        self.authorities
            .iter()
            .filter(|set| set.record_type() == record_type)
            .collect()
    }

    /// Finds the answer RRset with the given key
    pub fn find_answer_rrset(
        &self,
        name: &Name,
        record_type: RecordType,
        dns_class: DNSClass,
    ) -> Option<&SecRrset> {
        self.answers.iter().find(|set| {
            set.name() == name && set.record_type() == record_type && set.dns_class() == dns_class
        })
    }

    /// The overall status of the response
    pub fn status(&self) -> SecurityStatus {
        self.status
    }

    /// The EDE justification for a failed response
    pub fn ede(&self) -> Option<EdeCode> {
        self.ede
    }

    /// The human-readable justification for a failed response
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    /// Sets the overall status without a justification
    pub fn set_status(&mut self, status: SecurityStatus) {
        self.status = status;
    }

    /// Sets the overall status with its justification
    pub fn set_status_justified(
        &mut self,
        status: SecurityStatus,
        ede: Option<EdeCode>,
        reason: impl Into<String>,
    ) {
        self.status = status;
        self.ede = ede;
        self.reason = Some(reason.into());
    }

    /// Marks the response bogus with the catch-all DNSSEC EDE
    pub fn set_bogus(&mut self, reason: impl Into<String>) {
        self.set_status_justified(SecurityStatus::Bogus, Some(EdeCode::DnssecBogus), reason);
    }

    /// Marks the response bogus with a specific EDE
    pub fn set_bogus_with(&mut self, ede: EdeCode, reason: impl Into<String>) {
        self.set_status_justified(SecurityStatus::Bogus, Some(ede), reason);
    }

    /// Flattens the sections back into a plain message
    pub fn to_message(&self) -> Message {
        let mut message = Message::new();
        *message.header_mut() = self.header;
        if let Some(question) = &self.question {
            message.add_query(question.clone());
        }

        for set in &self.answers {
            for record in set.rrset().records_with_sigs() {
                message.add_answer(record.clone());
            }
        }
        for set in &self.authorities {
            for record in set.rrset().records_with_sigs() {
                message.add_authority(record.clone());
            }
        }
        for record in &self.additionals {
            message.add_additional(record.clone());
        }
        if let Some(edns) = &self.edns {
            message.set_edns(edns.clone());
        }

        // counts are fixed up at render time; keep the header consistent for
        // direct inspection
        let answer_count = message.answers().len() as u16;
        let authority_count = message.authorities().len() as u16;
        let additional_count = message.additionals().len() as u16;
        message.header_mut().set_query_count(u16::from(self.question.is_some()));
        message.header_mut().set_answer_count(answer_count);
        message.header_mut().set_authority_count(authority_count);
        message.header_mut().set_additional_count(additional_count);

        message
    }
}

/// Groups the flat records of one section into RRsets in order of first
/// appearance; RRSIGs join the set whose type they cover
fn group_records(records: &[Record]) -> Vec<SecRrset> {
    let mut sets: Vec<RecordSet> = Vec::new();

    for record in records {
        let rr_type = match record.data() {
            RData::DNSSEC(DNSSECRData::RRSIG(rrsig)) => rrsig.type_covered(),
            _ => record.record_type(),
        };

        let position = sets.iter().position(|set| {
            set.name() == record.name()
                && set.record_type() == rr_type
                && set.dns_class() == record.dns_class()
        });

        let set = match position {
            Some(position) => &mut sets[position],
            None => {
                sets.push(RecordSet::new(
                    record.name().clone(),
                    rr_type,
                    record.dns_class(),
                ));
                sets.last_mut().expect("just pushed")
            }
        };

        // grouping is lossy only for records that contradict their own set
        // key, which cannot happen for records read from the wire
        let _ = set.add(record.clone());
    }

    sets.into_iter().map(SecRrset::new).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rr::rdata::A;
    use std::str::FromStr;

    #[test]
    fn groups_rrsigs_with_covered_sets() {
        let name = Name::from_ascii("foo.example.com.").unwrap();
        let mut message = Message::new();
        message.add_query(Query::query(name.clone(), RecordType::A));
        message.add_answer(Record::from_rdata(
            name.clone(),
            3600,
            RData::A(A::from_str("192.0.2.1").unwrap()),
        ));
        message.add_answer(Record::from_rdata(
            name.clone(),
            3600,
            RData::DNSSEC(DNSSECRData::RRSIG(crate::dnssec::rdata::RRSIG::new(
                RecordType::A,
                crate::dnssec::Algorithm::ECDSAP256SHA256,
                3,
                3600,
                0xFFFF_FFFF,
                0,
                1234,
                Name::from_ascii("example.com.").unwrap(),
                vec![0; 64],
            ))),
        ));

        let sec = SecMessage::from_message(&message);
        assert_eq!(sec.answers().len(), 1);
        let set = &sec.answers()[0];
        assert_eq!(set.records().len(), 1);
        assert_eq!(set.sigs().len(), 1);
        assert_eq!(
            set.signer_name().unwrap(),
            &Name::from_ascii("example.com.").unwrap()
        );
    }

    #[test]
    fn wildcard_expansion_detected() {
        let name = Name::from_ascii("foo.example.com.").unwrap();
        let mut set = RecordSet::new(name.clone(), RecordType::A, DNSClass::IN);
        set.add(Record::from_rdata(
            name.clone(),
            3600,
            RData::A(A::from_str("192.0.2.1").unwrap()),
        ))
        .unwrap();
        // labels field of 2 < owner's 3 labels: wildcard expansion
        set.add(Record::from_rdata(
            name,
            3600,
            RData::DNSSEC(DNSSECRData::RRSIG(crate::dnssec::rdata::RRSIG::new(
                RecordType::A,
                crate::dnssec::Algorithm::ECDSAP256SHA256,
                2,
                3600,
                0xFFFF_FFFF,
                0,
                1234,
                Name::from_ascii("example.com.").unwrap(),
                vec![0; 64],
            ))),
        ))
        .unwrap();

        let sec = SecRrset::new(set);
        assert_eq!(
            sec.expanded_from_wildcard().unwrap().unwrap(),
            Name::from_ascii("*.example.com.").unwrap()
        );
    }
}
