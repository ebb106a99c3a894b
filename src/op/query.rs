// Copyright 2025-2026 the veridns authors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Query struct for looking up resource records

use std::fmt::{self, Display, Formatter};

use crate::error::DnsResult;
use crate::rr::{DNSClass, Name, RecordType};
use crate::serialize::binary::{BinDecodable, BinDecoder, BinEncodable, BinEncoder};

/// Query struct for looking up resource records
///
/// ```text
/// 4.1.2. Question section format
///
///                                     1  1  1  1  1  1
///       0  1  2  3  4  5  6  7  8  9  0  1  2  3  4  5
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     /                     QNAME                     /
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                     QTYPE                     |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                     QCLASS                    |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
///
/// A question has no TTL and no rdata, so neither appears on the wire.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Query {
    name: Name,
    query_type: RecordType,
    query_class: DNSClass,
}

impl Query {
    /// Creates a query for the given name and type, class IN
    pub fn query(name: Name, query_type: RecordType) -> Self {
        Self {
            name,
            query_type,
            query_class: DNSClass::IN,
        }
    }

    /// The name being queried
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// The type of the query
    pub fn query_type(&self) -> RecordType {
        self.query_type
    }

    /// The class of the query
    pub fn query_class(&self) -> DNSClass {
        self.query_class
    }

    /// Sets the query class
    pub fn set_query_class(&mut self, query_class: DNSClass) -> &mut Self {
        self.query_class = query_class;
        self
    }
}

impl BinEncodable for Query {
    fn emit(&self, encoder: &mut BinEncoder<'_>) -> DnsResult<()> {
        self.name.emit(encoder)?;
        self.query_type.emit(encoder)?;
        self.query_class.emit(encoder)
    }
}

impl<'r> BinDecodable<'r> for Query {
    fn read(decoder: &mut BinDecoder<'r>) -> DnsResult<Self> {
        Ok(Self {
            name: Name::read(decoder)?,
            query_type: RecordType::read(decoder)?,
            query_class: DNSClass::read(decoder)?,
        })
    }
}

impl Display for Query {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.name, self.query_class, self.query_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_form_has_no_ttl_or_rdata() {
        let query = Query::query(
            Name::from_ascii("www.example.com.").unwrap(),
            RecordType::A,
        );
        let bytes = query.to_bytes().unwrap();

        // name + type + class and nothing else: no ttl, no rdata length
        assert_eq!(bytes.len(), query.name().len() + 4);

        let mut decoder = BinDecoder::new(&bytes);
        assert_eq!(Query::read(&mut decoder).unwrap(), query);
        assert!(decoder.is_empty());
    }
}
