// Copyright 2025-2026 the veridns authors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Classification of responses into the shapes RFC 4035 §5 validates
//! differently.

use std::fmt::{self, Display, Formatter};

use tracing::warn;

use crate::dnssec::srrset::SecMessage;
use crate::op::{Query, ResponseCode};
use crate::rr::{RData, RecordType};

/// The shape of a response, which decides the validation strategy
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResponseClassification {
    /// An answer to the question is present
    Positive,
    /// A CNAME chain leads away from the question without terminating here
    Cname,
    /// An answer to a qtype=ANY question
    Any,
    /// NOERROR with no answer: the name exists, the type does not
    Nodata,
    /// NXDOMAIN: the name does not exist
    NameError,
    /// A CNAME chain ends in a name with no data of the qtype
    CnameNodata,
    /// A CNAME chain ends in a non-existent name
    CnameNameError,
    /// A delegation to a child zone
    Referral,
    /// None of the recognized shapes
    Unknown,
}

impl Display for ResponseClassification {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Positive => "POSITIVE",
            Self::Cname => "CNAME",
            Self::Any => "ANY",
            Self::Nodata => "NODATA",
            Self::NameError => "NAMEERROR",
            Self::CnameNodata => "CNAME_NODATA",
            Self::CnameNameError => "CNAME_NAMEERROR",
            Self::Referral => "REFERRAL",
            Self::Unknown => "UNKNOWN",
        };

        f.write_str(s)
    }
}

/// Classifies a response against the query it answers (RFC 4035 §5,
/// following the decision procedure of validating resolvers)
pub fn classify_response(query: &Query, response: &SecMessage) -> ResponseClassification {
    let rcode = response.response_code();
    if rcode != ResponseCode::NoError && rcode != ResponseCode::NXDomain {
        warn!("unhandled rcode {rcode} while classifying");
        return ResponseClassification::Unknown;
    }

    // a delegation: no answers, NS in authority without an SOA
    if response.answers().is_empty()
        && rcode == ResponseCode::NoError
        && !response.authorities_of_type(RecordType::NS).is_empty()
        && response.authorities_of_type(RecordType::SOA).is_empty()
    {
        return ResponseClassification::Referral;
    }

    if response.answers().is_empty() {
        return match rcode {
            ResponseCode::NXDomain => ResponseClassification::NameError,
            _ => ResponseClassification::Nodata,
        };
    }

    if query.query_type() == RecordType::ANY {
        return ResponseClassification::Any;
    }

    // walk the CNAME/DNAME chain from the query name; a positive response
    // ends in an RRset of the qtype at the current name
    let mut had_cname = false;
    let mut current = query.name().clone();
    for set in response.answers() {
        match set.record_type() {
            RecordType::CNAME if set.name() == &current => {
                if query.query_type() == RecordType::CNAME {
                    return ResponseClassification::Positive;
                }
                if let Some(RData::CNAME(target)) = set.first().map(|r| r.data()) {
                    current = target.clone();
                    had_cname = true;
                }
            }
            RecordType::DNAME if set.name().zone_of(&current) && set.name() != &current => {
                if query.query_type() == RecordType::DNAME {
                    return ResponseClassification::Positive;
                }
                had_cname = true;
            }
            rt if rt == query.query_type() && set.name() == &current => {
                return match had_cname {
                    true => ResponseClassification::Cname,
                    false => ResponseClassification::Positive,
                };
            }
            _ => {}
        }
    }

    // the chain did not terminate in an answer
    match (had_cname, rcode) {
        (true, ResponseCode::NXDomain) => ResponseClassification::CnameNameError,
        (true, _) => ResponseClassification::CnameNodata,
        (false, ResponseCode::NXDomain) => ResponseClassification::NameError,
        (false, _) => ResponseClassification::Nodata,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::Message;
    use crate::rr::rdata::{A, SOA};
    use crate::rr::{Name, Record};
    use std::str::FromStr;

    fn query(name: &str, rt: RecordType) -> Query {
        Query::query(Name::from_ascii(name).unwrap(), rt)
    }

    fn sec(message: &Message) -> SecMessage {
        SecMessage::from_message(message)
    }

    fn soa_record(zone: &str) -> Record {
        Record::from_rdata(
            Name::from_ascii(zone).unwrap(),
            3600,
            RData::SOA(SOA::new(
                Name::from_ascii("ns.example.").unwrap(),
                Name::from_ascii("admin.example.").unwrap(),
                1,
                3600,
                600,
                86400,
                300,
            )),
        )
    }

    #[test]
    fn positive_and_cname() {
        let q = query("foo.example.", RecordType::A);
        let mut message = Message::new();
        message.add_query(q.clone());
        message.add_answer(Record::from_rdata(
            Name::from_ascii("foo.example.").unwrap(),
            60,
            RData::A(A::from_str("192.0.2.1").unwrap()),
        ));
        assert_eq!(
            classify_response(&q, &sec(&message)),
            ResponseClassification::Positive
        );

        let mut message = Message::new();
        message.add_query(q.clone());
        message.add_answer(Record::from_rdata(
            Name::from_ascii("foo.example.").unwrap(),
            60,
            RData::CNAME(Name::from_ascii("bar.example.").unwrap()),
        ));
        message.add_answer(Record::from_rdata(
            Name::from_ascii("bar.example.").unwrap(),
            60,
            RData::A(A::from_str("192.0.2.2").unwrap()),
        ));
        assert_eq!(
            classify_response(&q, &sec(&message)),
            ResponseClassification::Cname
        );
    }

    #[test]
    fn negative_shapes() {
        let q = query("missing.example.", RecordType::A);

        let mut message = Message::new();
        message.add_query(q.clone());
        message
            .header_mut()
            .set_response_code(ResponseCode::NXDomain);
        message.add_authority(soa_record("example."));
        assert_eq!(
            classify_response(&q, &sec(&message)),
            ResponseClassification::NameError
        );

        let mut message = Message::new();
        message.add_query(q.clone());
        message.add_authority(soa_record("example."));
        assert_eq!(
            classify_response(&q, &sec(&message)),
            ResponseClassification::Nodata
        );
    }

    #[test]
    fn cname_chain_to_nxdomain() {
        let q = query("alias.example.", RecordType::A);
        let mut message = Message::new();
        message.add_query(q.clone());
        message
            .header_mut()
            .set_response_code(ResponseCode::NXDomain);
        message.add_answer(Record::from_rdata(
            Name::from_ascii("alias.example.").unwrap(),
            60,
            RData::CNAME(Name::from_ascii("target.example.").unwrap()),
        ));
        message.add_authority(soa_record("example."));
        assert_eq!(
            classify_response(&q, &sec(&message)),
            ResponseClassification::CnameNameError
        );
    }

    #[test]
    fn referral() {
        let q = query("www.child.example.", RecordType::A);
        let mut message = Message::new();
        message.add_query(q.clone());
        message.add_authority(Record::from_rdata(
            Name::from_ascii("child.example.").unwrap(),
            3600,
            RData::NS(Name::from_ascii("ns1.child.example.").unwrap()),
        ));
        assert_eq!(
            classify_response(&q, &sec(&message)),
            ResponseClassification::Referral
        );
    }
}
