// Copyright 2025-2026 the veridns authors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! A credibility-aware cache of positive and negative DNS data, fed from
//! whole response messages.

use std::sync::Arc;

use lru_cache::LruCache;
use parking_lot::Mutex;
use tracing::trace;

use crate::op::{Message, ResponseCode};
use crate::rr::{Name, RData, Record, RecordSet, RecordType};
use crate::runtime::Clock;

/// The trustworthiness of cached data, ordered least to most credible
/// (RFC 2181 §5.4.1); data of lower credibility never replaces higher
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum Credibility {
    /// Data from the additional section of a response
    Additional,
    /// Data from the authority section of a non-authoritative response
    NonAuthAuthority,
    /// Data from the authority section of an authoritative response
    AuthAuthority,
    /// Data from the answer section of a non-authoritative response
    NonAuthAnswer,
    /// Data from the answer section of an authoritative response
    AuthAnswer,
    /// Glue configured alongside a delegation
    Glue,
    /// A locally configured hint, never overridden by response data
    Hint,
}

/// The result of a cache lookup, mirroring the zone lookup tags plus
/// `Unknown` for "no information cached"
#[derive(Clone, Debug)]
pub enum CacheResponse {
    /// Nothing is known about the name and type
    Unknown,
    /// The name is cached as non-existent
    NxDomain,
    /// The name exists, the type is cached as non-existent
    NxRrset,
    /// The data was found
    Success(Vec<RecordSet>),
    /// An alias sits at the queried name
    Cname(RecordSet),
    /// A DNAME redirects a suffix of the queried name
    Dname(RecordSet),
    /// The closest cached information is a delegation
    Delegation(RecordSet),
}

enum Element {
    Positive {
        rrset: RecordSet,
        credibility: Credibility,
        expires: u32,
    },
    Negative {
        /// the non-existent type; `ZERO` marks an NXDOMAIN for the whole name
        rtype: RecordType,
        credibility: Credibility,
        expires: u32,
    },
}

impl Element {
    fn rtype(&self) -> RecordType {
        match self {
            Self::Positive { rrset, .. } => rrset.record_type(),
            Self::Negative { rtype, .. } => *rtype,
        }
    }

    fn credibility(&self) -> Credibility {
        match self {
            Self::Positive { credibility, .. } | Self::Negative { credibility, .. } => *credibility,
        }
    }

    fn expired(&self, now: u32) -> bool {
        match self {
            Self::Positive { expires, .. } | Self::Negative { expires, .. } => *expires <= now,
        }
    }
}

/// Configuration of the cache bounds
#[derive(Clone, Copy, Debug)]
pub struct CacheConfig {
    /// LRU bound on distinct cached names
    pub max_entries: usize,
    /// Upper bound on positive entry lifetimes, seconds
    pub max_ttl: u32,
    /// Upper bound on negative entry lifetimes, seconds
    pub max_negative_ttl: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 50_000,
            max_ttl: 86_400,
            max_negative_ttl: 3_600,
        }
    }
}

/// A TTL-bounded, credibility-ordered cache of DNS data
///
/// The cache is internally synchronized; concurrent readers and writers
/// see whole entries only.
#[derive(Clone)]
pub struct DnsCache {
    inner: Arc<Mutex<LruCache<Name, Vec<Element>>>>,
    config: CacheConfig,
    clock: Arc<dyn Clock>,
}

impl DnsCache {
    /// Creates a cache with the given bounds and time source
    pub fn new(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(LruCache::new(config.max_entries))),
            config,
            clock,
        }
    }

    /// The number of names currently cached
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// True when nothing is cached
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Drops everything cached under the name
    pub fn flush_name(&self, name: &Name) {
        self.inner.lock().remove(name);
    }

    /// Drops one RRset of the name
    pub fn flush_set(&self, name: &Name, rtype: RecordType) {
        let mut inner = self.inner.lock();
        if let Some(elements) = inner.get_mut(name) {
            elements.retain(|e| e.rtype() != rtype);
        }
    }

    /// Looks up the best cached information for the name and type, ignoring
    /// entries below `min_credibility`
    ///
    /// The walk goes from the root towards the full name: an NXDOMAIN
    /// sentinel or matching data at the exact name wins, a DNAME or a
    /// delegation at a strict ancestor is returned otherwise.
    pub fn lookup(
        &self,
        name: &Name,
        rtype: RecordType,
        min_credibility: Credibility,
    ) -> CacheResponse {
        let now = self.clock.now();
        let mut inner = self.inner.lock();

        for labels in 0..=name.label_count() {
            let tname = name.trim_to(labels);
            let exact = labels == name.label_count();

            let Some(elements) = inner.get_mut(&tname) else {
                continue;
            };
            // expired entries are removed in passing
            elements.retain(|e| !e.expired(now));
            let usable: Vec<&Element> = elements
                .iter()
                .filter(|e| e.credibility() >= min_credibility)
                .collect();

            if exact {
                if usable
                    .iter()
                    .any(|e| matches!(e, Element::Negative { rtype, .. } if *rtype == RecordType::ZERO))
                {
                    return CacheResponse::NxDomain;
                }

                if rtype == RecordType::ANY {
                    let all: Vec<RecordSet> = usable
                        .iter()
                        .filter_map(|e| match e {
                            Element::Positive { rrset, .. } => Some(rrset.clone()),
                            Element::Negative { .. } => None,
                        })
                        .collect();
                    return match all.is_empty() {
                        true => CacheResponse::Unknown,
                        false => CacheResponse::Success(all),
                    };
                }

                for element in &usable {
                    match element {
                        Element::Positive { rrset, .. } if rrset.record_type() == rtype => {
                            return CacheResponse::Success(vec![rrset.clone()]);
                        }
                        Element::Negative {
                            rtype: cached_type, ..
                        } if *cached_type == rtype => {
                            return CacheResponse::NxRrset;
                        }
                        _ => {}
                    }
                }

                if let Some(cname) = usable.iter().find_map(|e| match e {
                    Element::Positive { rrset, .. }
                        if rrset.record_type() == RecordType::CNAME =>
                    {
                        Some(rrset.clone())
                    }
                    _ => None,
                }) {
                    return CacheResponse::Cname(cname);
                }
            } else {
                if let Some(dname) = usable.iter().find_map(|e| match e {
                    Element::Positive { rrset, .. }
                        if rrset.record_type() == RecordType::DNAME =>
                    {
                        Some(rrset.clone())
                    }
                    _ => None,
                }) {
                    return CacheResponse::Dname(dname);
                }

                if let Some(ns) = usable.iter().find_map(|e| match e {
                    Element::Positive { rrset, .. } if rrset.record_type() == RecordType::NS => {
                        Some(rrset.clone())
                    }
                    _ => None,
                }) {
                    return CacheResponse::Delegation(ns);
                }
            }
        }

        CacheResponse::Unknown
    }

    /// Caches an RRset with the given credibility
    pub fn add_rrset(&self, rrset: RecordSet, credibility: Credibility) {
        let now = self.clock.now();
        let expires = now.saturating_add(rrset.ttl().min(self.config.max_ttl));
        self.insert(
            rrset.name().clone(),
            Element::Positive {
                rrset,
                credibility,
                expires,
            },
        );
    }

    /// Caches a negative result: `RecordType::ZERO` marks the whole name
    /// non-existent, any other type an NXRRSET
    pub fn add_negative(
        &self,
        name: Name,
        rtype: RecordType,
        ttl: u32,
        credibility: Credibility,
    ) {
        let now = self.clock.now();
        let expires = now.saturating_add(ttl.min(self.config.max_negative_ttl));
        self.insert(
            name,
            Element::Negative {
                rtype,
                credibility,
                expires,
            },
        );
    }

    fn insert(&self, name: Name, element: Element) {
        let mut inner = self.inner.lock();
        let now = self.clock.now();

        if let Some(elements) = inner.get_mut(&name) {
            elements.retain(|e| !e.expired(now));
            if let Some(existing) = elements.iter_mut().find(|e| e.rtype() == element.rtype()) {
                // only data at least as credible may replace an entry
                if element.credibility() >= existing.credibility() {
                    *existing = element;
                }
                return;
            }
            elements.push(element);
            return;
        }

        inner.insert(name, vec![element]);
    }

    /// Ingests a response message: the answer chain, the negative or
    /// referral conclusion from the authority section, and the glue of the
    /// additional section for names the cached data references
    pub fn add_message(&self, message: &Message) {
        let rcode = message.response_code();
        if rcode != ResponseCode::NoError && rcode != ResponseCode::NXDomain {
            return;
        }
        let Some(question) = message.query() else {
            return;
        };

        let authoritative = message.header().authoritative();
        let qtype = question.query_type();
        let mut current = question.name().clone();
        let mut completed = false;
        let mut additional_names: Vec<Name> = Vec::new();

        let answer_sets = group_sets(message.answers());
        for rrset in answer_sets {
            let answer_cred = if authoritative && rrset.name() == question.name() {
                Credibility::AuthAnswer
            } else {
                Credibility::NonAuthAnswer
            };

            if rrset.name() != &current {
                continue;
            }

            match rrset.record_type() {
                RecordType::CNAME if qtype != RecordType::CNAME => {
                    if let Some(RData::CNAME(target)) = rrset.first().map(Record::data) {
                        current = target.clone();
                    }
                    self.add_rrset(rrset, answer_cred);
                }
                RecordType::DNAME if qtype != RecordType::DNAME => {
                    if let Some(RData::DNAME(target)) = rrset.first().map(Record::data) {
                        if let Ok(substituted) =
                            current.replace_suffix(rrset.name(), target)
                        {
                            current = substituted;
                        }
                    }
                    self.add_rrset(rrset, answer_cred);
                }
                rt if rt == qtype || qtype == RecordType::ANY => {
                    mark_additional(&rrset, &mut additional_names);
                    self.add_rrset(rrset, answer_cred);
                    completed = true;
                }
                _ => {}
            }
        }

        let authority_cred = if authoritative {
            Credibility::AuthAuthority
        } else {
            Credibility::NonAuthAuthority
        };
        let authority_sets = group_sets(message.authorities());
        let soa = authority_sets
            .iter()
            .find(|set| set.record_type() == RecordType::SOA);

        if !completed {
            if let Some(soa_set) = soa {
                // negative TTL is min(SOA minimum, SOA ttl), RFC 2308 §5
                let ttl = match soa_set.first().map(Record::data) {
                    Some(RData::SOA(soa)) => soa.minimum().min(soa_set.ttl()),
                    _ => soa_set.ttl(),
                };

                if rcode == ResponseCode::NXDomain {
                    trace!("caching NXDOMAIN for {current}");
                    self.add_negative(current.clone(), RecordType::ZERO, ttl, authority_cred);
                } else {
                    trace!("caching NXRRSET for {current}/{qtype}");
                    self.add_negative(current.clone(), qtype, ttl, authority_cred);
                }
            }
        }

        for rrset in authority_sets {
            match rrset.record_type() {
                RecordType::NS => {
                    mark_additional(&rrset, &mut additional_names);
                    self.add_rrset(rrset, authority_cred);
                }
                RecordType::SOA => {
                    self.add_rrset(rrset, authority_cred);
                }
                _ => {}
            }
        }

        // glue: only addresses of names something cached above points at
        for rrset in group_sets(message.additionals()) {
            let wanted = matches!(rrset.record_type(), RecordType::A | RecordType::AAAA)
                && additional_names.contains(rrset.name());
            if wanted {
                self.add_rrset(rrset, Credibility::Additional);
            }
        }
    }
}

/// Records the names an RRset makes interesting for glue lookup
fn mark_additional(rrset: &RecordSet, names: &mut Vec<Name>) {
    for record in rrset.records() {
        let target = match record.data() {
            RData::NS(name) => Some(name),
            RData::MX(mx) => Some(mx.exchange()),
            _ => None,
        };
        if let Some(target) = target {
            if !names.contains(target) {
                names.push(target.clone());
            }
        }
    }
}

/// Groups flat records into RRsets, preserving first-appearance order
fn group_sets(records: &[Record]) -> Vec<RecordSet> {
    let mut sets: Vec<RecordSet> = Vec::new();
    for record in records {
        if record.record_type() == RecordType::OPT {
            continue;
        }

        let rr_type = match record.data() {
            RData::DNSSEC(crate::dnssec::rdata::DNSSECRData::RRSIG(rrsig)) => rrsig.type_covered(),
            _ => record.record_type(),
        };

        let position = sets.iter().position(|set| {
            set.name() == record.name()
                && set.record_type() == rr_type
                && set.dns_class() == record.dns_class()
        });

        match position {
            Some(position) => {
                let _ = sets[position].add(record.clone());
            }
            None => {
                let mut set = RecordSet::new(record.name().clone(), rr_type, record.dns_class());
                if set.add(record.clone()).is_ok() {
                    sets.push(set);
                }
            }
        }
    }

    sets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::Query;
    use crate::rr::rdata::{A, SOA};
    use crate::runtime::FixedClock;
    use std::str::FromStr;

    fn name(s: &str) -> Name {
        Name::from_ascii(s).unwrap()
    }

    fn cache_at(now: u32) -> DnsCache {
        DnsCache::new(CacheConfig::default(), Arc::new(FixedClock(now)))
    }

    fn a_response(qname: &str, ttl: u32, authoritative: bool) -> Message {
        let mut message = Message::new();
        message.header_mut().set_response(true);
        message.header_mut().set_authoritative(authoritative);
        message.add_query(Query::query(name(qname), RecordType::A));
        message.add_answer(Record::from_rdata(
            name(qname),
            ttl,
            RData::A(A::from_str("192.0.2.1").unwrap()),
        ));
        message
    }

    #[test]
    fn positive_lookup_until_expiry() {
        let cache = cache_at(1000);
        cache.add_message(&a_response("foo.example.", 300, true));

        match cache.lookup(&name("foo.example."), RecordType::A, Credibility::AuthAnswer) {
            CacheResponse::Success(sets) => {
                assert_eq!(sets.len(), 1);
                assert_eq!(sets[0].record_type(), RecordType::A);
            }
            other => panic!("unexpected response: {other:?}"),
        }

        // same cache, clock moved past the ttl
        let expired = DnsCache {
            inner: cache.inner.clone(),
            config: cache.config,
            clock: Arc::new(FixedClock(1301)),
        };
        assert!(matches!(
            expired.lookup(&name("foo.example."), RecordType::A, Credibility::AuthAnswer),
            CacheResponse::Unknown
        ));
    }

    #[test]
    fn credibility_is_monotonic() {
        let cache = cache_at(1000);
        // authoritative answer first
        cache.add_message(&a_response("foo.example.", 300, true));
        // a non-authoritative answer must not displace it
        let mut non_auth = a_response("foo.example.", 300, false);
        non_auth.take_answers();
        non_auth.add_answer(Record::from_rdata(
            name("foo.example."),
            300,
            RData::A(A::from_str("203.0.113.99").unwrap()),
        ));
        cache.add_message(&non_auth);

        match cache.lookup(&name("foo.example."), RecordType::A, Credibility::Additional) {
            CacheResponse::Success(sets) => {
                let record = sets[0].first().unwrap();
                assert_eq!(record.data(), &RData::A(A::from_str("192.0.2.1").unwrap()));
            }
            other => panic!("unexpected response: {other:?}"),
        }

        // and entries below the requested credibility are invisible
        assert!(matches!(
            cache.lookup(&name("foo.example."), RecordType::A, Credibility::Hint),
            CacheResponse::Unknown
        ));
    }

    #[test]
    fn negative_caching() {
        let cache = cache_at(1000);

        let mut message = Message::new();
        message.header_mut().set_response(true);
        message.header_mut().set_authoritative(true);
        message
            .header_mut()
            .set_response_code(ResponseCode::NXDomain);
        message.add_query(Query::query(name("missing.example."), RecordType::A));
        message.add_authority(Record::from_rdata(
            name("example."),
            3600,
            RData::SOA(SOA::new(
                name("ns.example."),
                name("admin.example."),
                1,
                7200,
                3600,
                86400,
                120,
            )),
        ));
        cache.add_message(&message);

        assert!(matches!(
            cache.lookup(&name("missing.example."), RecordType::A, Credibility::Additional),
            CacheResponse::NxDomain
        ));
    }

    #[test]
    fn delegation_found_at_ancestor() {
        let cache = cache_at(1000);
        let mut set = RecordSet::new(name("child.example."), RecordType::NS, crate::rr::DNSClass::IN);
        set.add(Record::from_rdata(
            name("child.example."),
            3600,
            RData::NS(name("ns1.child.example.")),
        ))
        .unwrap();
        cache.add_rrset(set, Credibility::AuthAuthority);

        match cache.lookup(
            &name("deep.www.child.example."),
            RecordType::A,
            Credibility::Additional,
        ) {
            CacheResponse::Delegation(ns) => assert_eq!(ns.name(), &name("child.example.")),
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[test]
    fn glue_needs_a_reference() {
        let cache = cache_at(1000);

        let mut message = Message::new();
        message.header_mut().set_response(true);
        message.add_query(Query::query(name("www.child.example."), RecordType::A));
        message.add_authority(Record::from_rdata(
            name("child.example."),
            3600,
            RData::NS(name("ns1.child.example.")),
        ));
        message.add_additional(Record::from_rdata(
            name("ns1.child.example."),
            3600,
            RData::A(A::from_str("192.0.2.53").unwrap()),
        ));
        message.add_additional(Record::from_rdata(
            name("unrelated.example."),
            3600,
            RData::A(A::from_str("192.0.2.99").unwrap()),
        ));
        cache.add_message(&message);

        assert!(matches!(
            cache.lookup(&name("ns1.child.example."), RecordType::A, Credibility::Additional),
            CacheResponse::Success(_)
        ));
        assert!(matches!(
            cache.lookup(&name("unrelated.example."), RecordType::A, Credibility::Additional),
            CacheResponse::Unknown
        ));
    }

    #[test]
    fn lru_cap_bounds_names() {
        let config = CacheConfig {
            max_entries: 10,
            ..CacheConfig::default()
        };
        let cache = DnsCache::new(config, Arc::new(FixedClock(0)));

        for i in 0..20 {
            let mut set = RecordSet::new(
                name(&format!("host{i}.example.")),
                RecordType::A,
                crate::rr::DNSClass::IN,
            );
            set.add(Record::from_rdata(
                name(&format!("host{i}.example.")),
                300,
                RData::A(A::from_str("192.0.2.1").unwrap()),
            ))
            .unwrap();
            cache.add_rrset(set, Credibility::AuthAnswer);
        }

        assert_eq!(cache.len(), 10);
    }
}
