// Copyright 2025-2026 the veridns authors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! An in-memory zone: name-indexed typed RRsets with wildcard and DNAME
//! handling and the ordering a zone transfer requires.

use std::collections::BTreeMap;

use crate::error::{DnsError, DnsResult};
use crate::rr::{DNSClass, Name, Record, RecordSet, RecordType};

/// The result of a zone lookup
#[derive(Clone, Debug)]
pub enum ZoneLookup {
    /// The name and type matched
    Success(Vec<RecordSet>),
    /// An alias sits at the queried name
    Cname(RecordSet),
    /// A DNAME on an ancestor redirects the queried name
    Dname(RecordSet),
    /// An NS RRset below the apex delegates the queried name
    Delegation(RecordSet),
    /// The name exists, the type does not
    NxRrset,
    /// The name does not exist in the zone
    NxDomain,
}

/// An in-memory zone
///
/// Construction requires exactly one SOA record and at least one NS RRset
/// at the apex. Names outside the zone are rejected. Mutation is
/// single-writer; concurrent iteration over a snapshot is safe.
#[derive(Clone, Debug)]
pub struct Zone {
    origin: Name,
    dns_class: DNSClass,
    records: BTreeMap<Name, Vec<RecordSet>>,
    has_wild: bool,
}

impl Zone {
    /// Builds a zone from records, e.g. a parsed master file or an AXFR
    /// stream
    pub fn new(origin: Name, records: Vec<Record>) -> DnsResult<Self> {
        if !origin.is_fqdn() {
            return Err(crate::error::DnsErrorKind::RelativeName(origin).into());
        }

        let dns_class = records
            .first()
            .map(Record::dns_class)
            .unwrap_or(DNSClass::IN);

        let mut zone = Self {
            origin,
            dns_class,
            records: BTreeMap::new(),
            has_wild: false,
        };
        for record in records {
            zone.add_record(record)?;
        }

        zone.check_apex()?;
        Ok(zone)
    }

    fn check_apex(&self) -> DnsResult<()> {
        let apex = self
            .records
            .get(&self.origin)
            .ok_or_else(|| DnsError::from("zone has no records at the apex"))?;

        let soa = apex
            .iter()
            .find(|set| set.record_type() == RecordType::SOA)
            .ok_or_else(|| DnsError::from("zone has no SOA at the apex"))?;
        if soa.len() != 1 {
            return Err("zone must have exactly one SOA record".into());
        }

        if !apex.iter().any(|set| set.record_type() == RecordType::NS) {
            return Err("zone has no NS records at the apex".into());
        }

        Ok(())
    }

    /// The apex name of the zone
    pub fn origin(&self) -> &Name {
        &self.origin
    }

    /// The class of the zone
    pub fn dns_class(&self) -> DNSClass {
        self.dns_class
    }

    /// The SOA RRset at the apex
    pub fn soa(&self) -> Option<&RecordSet> {
        self.records
            .get(&self.origin)?
            .iter()
            .find(|set| set.record_type() == RecordType::SOA)
    }

    /// The NS RRset at the apex
    pub fn ns(&self) -> Option<&RecordSet> {
        self.records
            .get(&self.origin)?
            .iter()
            .find(|set| set.record_type() == RecordType::NS)
    }

    /// Adds a record; the owner must lie within the zone
    pub fn add_record(&mut self, record: Record) -> DnsResult<()> {
        if !self.origin.zone_of(record.name()) {
            return Err(format!(
                "record {} is out of zone {}",
                record.name(),
                self.origin
            )
            .into());
        }

        if record.name().iter().any(|l| l.is_wildcard()) {
            self.has_wild = true;
        }

        let rr_type = match record.data() {
            crate::rr::RData::DNSSEC(crate::dnssec::rdata::DNSSECRData::RRSIG(rrsig)) => {
                rrsig.type_covered()
            }
            _ => record.record_type(),
        };

        let sets = self.records.entry(record.name().clone()).or_default();
        let position = sets
            .iter()
            .position(|set| set.record_type() == rr_type && set.dns_class() == record.dns_class());
        match position {
            Some(position) => sets[position].add(record)?,
            None => {
                let mut set =
                    RecordSet::new(record.name().clone(), rr_type, record.dns_class());
                set.add(record)?;
                sets.push(set);
            }
        }

        Ok(())
    }

    /// Removes a record; empty RRsets and empty names are dropped
    pub fn remove_record(&mut self, record: &Record) {
        let Some(sets) = self.records.get_mut(record.name()) else {
            return;
        };

        for set in sets.iter_mut() {
            if set.record_type() == record.record_type() {
                let remaining: Vec<Record> = set
                    .records()
                    .filter(|r| !r.eq_ignore_ttl(record))
                    .cloned()
                    .collect();
                if remaining.len() != set.len() {
                    let mut rebuilt = RecordSet::new(
                        set.name().clone(),
                        set.record_type(),
                        set.dns_class(),
                    );
                    for r in remaining {
                        let _ = rebuilt.add(r);
                    }
                    for sig in set.sigs() {
                        let _ = rebuilt.add(sig.clone());
                    }
                    *set = rebuilt;
                }
            }
        }

        sets.retain(|set| !set.is_empty() || !set.sigs().is_empty());
        if sets.is_empty() {
            self.records.remove(record.name());
        }
    }

    /// Looks up a name and type in the zone
    ///
    /// The walk descends from the apex: a delegation or DNAME on the path
    /// short-circuits, an exact node answers directly, and failing
    /// everything else wildcards are expanded with the queried name as the
    /// synthesized owner.
    pub fn find(&self, name: &Name, rtype: RecordType) -> ZoneLookup {
        if !self.origin.zone_of(name) {
            return ZoneLookup::NxDomain;
        }

        let mut name_exists = false;
        for labels in self.origin.label_count()..=name.label_count() {
            let tname = name.trim_to(labels);
            let exact = labels == name.label_count();
            let at_apex = tname == self.origin;

            let Some(sets) = self.records.get(&tname) else {
                continue;
            };
            name_exists = name_exists || exact;

            // a delegation below the apex covers everything under it
            if !at_apex {
                if let Some(ns) = sets.iter().find(|s| s.record_type() == RecordType::NS) {
                    return ZoneLookup::Delegation(ns.clone());
                }
            }

            if exact {
                if rtype == RecordType::ANY {
                    return ZoneLookup::Success(sets.clone());
                }
                if let Some(found) = sets.iter().find(|s| s.record_type() == rtype) {
                    return ZoneLookup::Success(vec![found.clone()]);
                }
                if let Some(cname) = sets.iter().find(|s| s.record_type() == RecordType::CNAME)
                {
                    return ZoneLookup::Cname(cname.clone());
                }
            } else if let Some(dname) =
                sets.iter().find(|s| s.record_type() == RecordType::DNAME)
            {
                return ZoneLookup::Dname(dname.clone());
            }
        }

        if name_exists {
            return ZoneLookup::NxRrset;
        }

        if self.has_wild {
            // expand `*.<ancestor>`, closest ancestor first
            for labels in (self.origin.label_count()..name.label_count()).rev() {
                let Ok(wname) = name
                    .trim_to(labels)
                    .prepend_label(crate::rr::Label::wildcard())
                else {
                    continue;
                };

                let Some(sets) = self.records.get(&wname) else {
                    continue;
                };

                let matching: Vec<RecordSet> = sets
                    .iter()
                    .filter(|s| rtype == RecordType::ANY || s.record_type() == rtype)
                    .map(|set| synthesize(set, name))
                    .collect();
                if !matching.is_empty() {
                    return ZoneLookup::Success(matching);
                }

                if let Some(cname) = sets.iter().find(|s| s.record_type() == RecordType::CNAME)
                {
                    return ZoneLookup::Cname(synthesize(cname, name));
                }
            }
        }

        ZoneLookup::NxDomain
    }

    /// Iterates the zone in transfer order: SOA, apex NS, the other apex
    /// RRsets, every other name in map order, and the SOA once more
    pub fn iter_axfr(&self) -> impl Iterator<Item = &RecordSet> + '_ {
        let apex_sets = self.records.get(&self.origin);
        let soa = apex_sets
            .into_iter()
            .flatten()
            .filter(|set| set.record_type() == RecordType::SOA);
        let ns = apex_sets
            .into_iter()
            .flatten()
            .filter(|set| set.record_type() == RecordType::NS);
        let apex_rest = apex_sets.into_iter().flatten().filter(|set| {
            set.record_type() != RecordType::SOA && set.record_type() != RecordType::NS
        });
        let rest = self
            .records
            .iter()
            .filter(move |(name, _)| *name != &self.origin)
            .flat_map(|(_, sets)| sets.iter());

        soa.clone().chain(ns).chain(apex_rest).chain(rest).chain(soa)
    }
}

/// A copy of the wildcard RRset owned by the queried name
fn synthesize(set: &RecordSet, name: &Name) -> RecordSet {
    let mut synthesized = RecordSet::new(name.clone(), set.record_type(), set.dns_class());
    for record in set.records_with_sigs() {
        let mut record = record.clone();
        record.set_name(name.clone());
        let _ = synthesized.add(record);
    }

    synthesized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rr::rdata::{A, SOA};
    use crate::rr::RData;
    use std::str::FromStr;

    fn name(s: &str) -> Name {
        Name::from_ascii(s).unwrap()
    }

    fn base_records() -> Vec<Record> {
        vec![
            Record::from_rdata(
                name("example.com."),
                3600,
                RData::SOA(SOA::new(
                    name("ns1.example.com."),
                    name("admin.example.com."),
                    2024010101,
                    7200,
                    3600,
                    1209600,
                    300,
                )),
            ),
            Record::from_rdata(name("example.com."), 3600, RData::NS(name("ns1.example.com."))),
            Record::from_rdata(
                name("ns1.example.com."),
                3600,
                RData::A(A::from_str("192.0.2.53").unwrap()),
            ),
            Record::from_rdata(
                name("www.example.com."),
                3600,
                RData::A(A::from_str("192.0.2.80").unwrap()),
            ),
            Record::from_rdata(
                name("alias.example.com."),
                3600,
                RData::CNAME(name("www.example.com.")),
            ),
            Record::from_rdata(
                name("child.example.com."),
                3600,
                RData::NS(name("ns1.child.example.com.")),
            ),
            Record::from_rdata(
                name("*.wild.example.com."),
                3600,
                RData::A(A::from_str("192.0.2.99").unwrap()),
            ),
        ]
    }

    fn zone() -> Zone {
        Zone::new(name("example.com."), base_records()).unwrap()
    }

    #[test]
    fn apex_invariants() {
        // no SOA
        let records: Vec<Record> = base_records()
            .into_iter()
            .filter(|r| r.record_type() != RecordType::SOA)
            .collect();
        assert!(Zone::new(name("example.com."), records).is_err());

        // no apex NS
        let records: Vec<Record> = base_records()
            .into_iter()
            .filter(|r| !(r.record_type() == RecordType::NS && r.name() == &name("example.com.")))
            .collect();
        assert!(Zone::new(name("example.com."), records).is_err());
    }

    #[test]
    fn out_of_zone_rejected() {
        let mut z = zone();
        let out = Record::from_rdata(
            name("www.other.org."),
            60,
            RData::A(A::from_str("192.0.2.1").unwrap()),
        );
        assert!(z.add_record(out).is_err());
    }

    #[test]
    fn exact_and_negative_lookups() {
        let z = zone();
        assert!(matches!(
            z.find(&name("www.example.com."), RecordType::A),
            ZoneLookup::Success(_)
        ));
        assert!(matches!(
            z.find(&name("www.example.com."), RecordType::AAAA),
            ZoneLookup::NxRrset
        ));
        assert!(matches!(
            z.find(&name("nope.example.com."), RecordType::A),
            ZoneLookup::NxDomain
        ));
        assert!(matches!(
            z.find(&name("alias.example.com."), RecordType::A),
            ZoneLookup::Cname(_)
        ));
    }

    #[test]
    fn delegation_covers_subtree() {
        let z = zone();
        match z.find(&name("deep.www.child.example.com."), RecordType::A) {
            ZoneLookup::Delegation(ns) => {
                assert_eq!(ns.name(), &name("child.example.com."));
            }
            other => panic!("unexpected lookup: {other:?}"),
        }
    }

    #[test]
    fn wildcard_synthesis_renames_owner() {
        let z = zone();
        match z.find(&name("anything.wild.example.com."), RecordType::A) {
            ZoneLookup::Success(sets) => {
                assert_eq!(sets.len(), 1);
                assert_eq!(sets[0].name(), &name("anything.wild.example.com."));
                assert_eq!(
                    sets[0].first().unwrap().name(),
                    &name("anything.wild.example.com.")
                );
            }
            other => panic!("unexpected lookup: {other:?}"),
        }

        // the wildcard does not apply where a closer name exists
        assert!(matches!(
            z.find(&name("www.example.com."), RecordType::A),
            ZoneLookup::Success(_)
        ));
    }

    #[test]
    fn any_returns_all_sets() {
        let z = zone();
        match z.find(&name("example.com."), RecordType::ANY) {
            ZoneLookup::Success(sets) => assert!(sets.len() >= 2),
            other => panic!("unexpected lookup: {other:?}"),
        }
    }

    #[test]
    fn axfr_order() {
        let z = zone();
        let order: Vec<(Name, RecordType)> = z
            .iter_axfr()
            .map(|set| (set.name().clone(), set.record_type()))
            .collect();

        assert_eq!(order.first().unwrap().1, RecordType::SOA);
        assert_eq!(order.get(1).unwrap().1, RecordType::NS);
        assert_eq!(order.last().unwrap().1, RecordType::SOA);
        // the SOA appears exactly twice
        assert_eq!(
            order.iter().filter(|(_, t)| *t == RecordType::SOA).count(),
            2
        );
    }

    #[test]
    fn remove_record_drops_empty_sets() {
        let mut z = zone();
        let record = Record::from_rdata(
            name("www.example.com."),
            3600,
            RData::A(A::from_str("192.0.2.80").unwrap()),
        );
        z.remove_record(&record);
        assert!(matches!(
            z.find(&name("www.example.com."), RecordType::A),
            ZoneLookup::NxDomain
        ));
    }
}
