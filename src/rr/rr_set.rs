// Copyright 2025-2026 the veridns authors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! record set: all records sharing owner, type and class, with the RRSIGs
//! that cover them

use std::fmt::{self, Display, Formatter};
use std::slice::Iter;

use crate::error::DnsResult;
use crate::rr::{DNSClass, Name, RData, Record, RecordType};

/// A set of Records with the same name, type and class
///
/// Invariants: the TTL is the minimum of the member TTLs; `sigs` holds only
/// RRSIG records whose type-covered field equals the set's type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecordSet {
    name: Name,
    record_type: RecordType,
    dns_class: DNSClass,
    ttl: u32,
    records: Vec<Record>,
    sigs: Vec<Record>,
}

impl RecordSet {
    /// Creates a new, empty record set
    pub fn new(name: Name, record_type: RecordType, dns_class: DNSClass) -> Self {
        Self {
            name,
            record_type,
            dns_class,
            ttl: 0,
            records: Vec::new(),
            sigs: Vec::new(),
        }
    }

    /// The owner name of the set
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// The record type of the set
    pub fn record_type(&self) -> RecordType {
        self.record_type
    }

    /// The class of the set
    pub fn dns_class(&self) -> DNSClass {
        self.dns_class
    }

    /// The TTL of the set: the minimum TTL over all member records
    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    /// Caps the TTL of the set and every member at `ttl`
    pub fn limit_ttl(&mut self, ttl: u32) {
        if self.ttl > ttl {
            self.ttl = ttl;
        }
        for record in self.records.iter_mut().chain(self.sigs.iter_mut()) {
            if record.ttl() > ttl {
                record.set_ttl(ttl);
            }
        }
    }

    /// True when the set contains no data records (it may still carry sigs)
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The number of data records in the set
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// The first data record; defined only for non-empty sets
    pub fn first(&self) -> Option<&Record> {
        self.records.first()
    }

    /// Iterator over the data records
    pub fn records(&self) -> Iter<'_, Record> {
        self.records.iter()
    }

    /// The RRSIG records covering this set
    pub fn sigs(&self) -> &[Record] {
        &self.sigs
    }

    /// Adds a record to the set
    ///
    /// Rejects records whose name, type or class do not match the set, and
    /// RRSIGs covering a different type. Duplicate rdata (RFC 2181 §5.2) is
    /// dropped silently. The set TTL is lowered to the minimum member TTL.
    pub fn add(&mut self, record: Record) -> DnsResult<()> {
        if record.name() != &self.name {
            return Err(format!(
                "record {} does not belong in rrset {}",
                record.name(),
                self.name
            )
            .into());
        }
        if record.dns_class() != self.dns_class {
            return Err("record class does not match rrset".into());
        }

        if let RData::DNSSEC(crate::dnssec::rdata::DNSSECRData::RRSIG(rrsig)) = record.data() {
            if rrsig.type_covered() != self.record_type {
                return Err("RRSIG does not cover this rrset's type".into());
            }

            self.track_ttl(record.ttl());
            self.sigs.push(record);
            return Ok(());
        }

        if record.record_type() != self.record_type {
            return Err(format!(
                "record type {} does not match rrset type {}",
                record.record_type(),
                self.record_type
            )
            .into());
        }

        if self.records.iter().any(|r| r.eq_ignore_ttl(&record)) {
            return Ok(());
        }

        self.track_ttl(record.ttl());
        self.records.push(record);
        Ok(())
    }

    fn track_ttl(&mut self, ttl: u32) {
        if self.records.is_empty() && self.sigs.is_empty() {
            self.ttl = ttl;
        } else if ttl < self.ttl {
            self.ttl = ttl;
        }
    }

    /// Builds a set from records that are already known to share an rrset key
    pub fn from_records(records: Vec<Record>) -> DnsResult<Self> {
        let first = records
            .first()
            .ok_or_else(|| crate::error::DnsError::from("cannot build an rrset from no records"))?;

        let record_type = match first.data() {
            RData::DNSSEC(crate::dnssec::rdata::DNSSECRData::RRSIG(rrsig)) => rrsig.type_covered(),
            _ => first.record_type(),
        };

        let mut set = Self::new(first.name().clone(), record_type, first.dns_class());
        for record in records {
            set.add(record)?;
        }

        Ok(set)
    }

    /// All records including the covering RRSIGs
    pub fn records_with_sigs(&self) -> impl Iterator<Item = &Record> + '_ {
        self.records.iter().chain(self.sigs.iter())
    }
}

impl Display for RecordSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{} ({} records, {} sigs)",
            self.name,
            self.record_type,
            self.dns_class,
            self.records.len(),
            self.sigs.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rr::rdata::A;
    use std::str::FromStr;

    fn a(owner: &str, ttl: u32, ip: &str) -> Record {
        let mut r = Record::from_rdata(
            Name::from_ascii(owner).unwrap(),
            ttl,
            RData::A(A::from_str(ip).unwrap()),
        );
        r.set_dns_class(DNSClass::IN);
        r
    }

    #[test]
    fn ttl_is_minimum_of_members() {
        let mut set = RecordSet::new(
            Name::from_ascii("foo.example.com.").unwrap(),
            RecordType::A,
            DNSClass::IN,
        );
        set.add(a("foo.example.com.", 3600, "192.0.2.1")).unwrap();
        assert_eq!(set.ttl(), 3600);
        set.add(a("foo.example.com.", 60, "192.0.2.2")).unwrap();
        assert_eq!(set.ttl(), 60);
        set.add(a("foo.example.com.", 600, "192.0.2.3")).unwrap();
        assert_eq!(set.ttl(), 60);
    }

    #[test]
    fn rejects_wrong_owner_or_type() {
        let mut set = RecordSet::new(
            Name::from_ascii("foo.example.com.").unwrap(),
            RecordType::A,
            DNSClass::IN,
        );
        assert!(set.add(a("bar.example.com.", 3600, "192.0.2.1")).is_err());

        let aaaa = Record::from_rdata(
            Name::from_ascii("foo.example.com.").unwrap(),
            3600,
            RData::AAAA(crate::rr::rdata::AAAA::from_str("2001:db8::1").unwrap()),
        );
        assert!(set.add(aaaa).is_err());
    }

    #[test]
    fn duplicate_rdata_dropped() {
        let mut set = RecordSet::new(
            Name::from_ascii("foo.example.com.").unwrap(),
            RecordType::A,
            DNSClass::IN,
        );
        set.add(a("foo.example.com.", 3600, "192.0.2.1")).unwrap();
        set.add(a("foo.example.com.", 60, "192.0.2.1")).unwrap();
        assert_eq!(set.len(), 1);
    }
}
