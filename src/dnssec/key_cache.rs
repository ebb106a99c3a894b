// Copyright 2025-2026 the veridns authors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Cache of validated DNSKEY RRsets, with the Null and Bad sentinels that
//! terminate chain-of-trust walks early.

use std::sync::Arc;

use lru_cache::LruCache;
use parking_lot::Mutex;
use tracing::debug;

use crate::dnssec::srrset::SecRrset;
use crate::dnssec::{SecurityStatus, Verdict};
use crate::rr::rdata::EdeCode;
use crate::rr::{DNSClass, Name};

/// A DNSKEY cache entry for a name, with or without actual keys
///
/// - Good: a validated DNSKEY RRset (non-empty, Secure)
/// - Null: it is proven that no keys exist, the name is insecurely
///   delegated (empty, Unchecked)
/// - Bad: the keys failed validation (empty, Bogus)
#[derive(Clone, Debug)]
pub struct KeyEntry {
    name: Name,
    dns_class: DNSClass,
    ttl: u32,
    rrset: Option<SecRrset>,
    status: SecurityStatus,
    ede: Option<EdeCode>,
    reason: Option<String>,
}

impl KeyEntry {
    /// A positive entry from a validated DNSKEY RRset
    pub fn good(rrset: SecRrset) -> Self {
        Self {
            name: rrset.name().clone(),
            dns_class: rrset.dns_class(),
            ttl: rrset.ttl(),
            status: rrset.status(),
            rrset: Some(rrset),
            ede: None,
            reason: None,
        }
    }

    /// A proven-insecure entry: there are no keys at this name
    pub fn null(name: Name, dns_class: DNSClass, ttl: u32) -> Self {
        Self {
            name,
            dns_class,
            ttl,
            rrset: None,
            status: SecurityStatus::Unchecked,
            ede: None,
            reason: None,
        }
    }

    /// A failed entry: the keys at this name did not validate
    pub fn bad(name: Name, dns_class: DNSClass, ttl: u32) -> Self {
        Self {
            name,
            dns_class,
            ttl,
            rrset: None,
            status: SecurityStatus::Bogus,
            ede: None,
            reason: None,
        }
    }

    /// The name this entry applies to
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// The class this entry applies to
    pub fn dns_class(&self) -> DNSClass {
        self.dns_class
    }

    /// The entry's time to live in seconds
    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    /// The validated keys, for a good entry
    pub fn rrset(&self) -> Option<&SecRrset> {
        self.rrset.as_ref()
    }

    /// A proven secure response without keys
    pub fn is_null(&self) -> bool {
        self.rrset.is_none() && self.status == SecurityStatus::Unchecked
    }

    /// An invalid response, the keys did not validate
    pub fn is_bad(&self) -> bool {
        self.rrset.is_none() && self.status == SecurityStatus::Bogus
    }

    /// A proven secure response with keys
    pub fn is_good(&self) -> bool {
        self.rrset.is_some() && self.status == SecurityStatus::Secure
    }

    /// Records why this entry is bad (or null), for the final EDE
    pub fn set_bad_reason(&mut self, ede: EdeCode, reason: impl Into<String>) {
        let reason = reason.into();
        debug!("{reason}");
        self.ede = Some(ede);
        self.reason = Some(reason);
    }

    /// The recorded EDE justification
    pub fn ede(&self) -> Option<EdeCode> {
        self.ede
    }

    /// The recorded human-readable justification
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    /// Decides whether this entry can validate data signed by `signer`
    ///
    /// `None` means the entry is usable; otherwise the returned verdict is
    /// the final status for the response being validated. A missing signer
    /// means the data was unsigned, which only a Null entry justifies.
    pub fn validate_key_for(&self, signer: Option<&Name>) -> Option<Verdict> {
        if signer.is_none() {
            if self.is_null() {
                let reason = self
                    .reason
                    .clone()
                    .unwrap_or_else(|| "unsigned response below insecure delegation".to_string());
                return Some(Verdict {
                    status: SecurityStatus::Insecure,
                    ede: self.ede,
                    reason: Some(reason),
                });
            }

            if self.is_good() {
                return Some(Verdict::bogus(
                    EdeCode::RrsigsMissing,
                    "unsigned response within a signed zone",
                ));
            }

            return Some(Verdict {
                status: SecurityStatus::Bogus,
                ede: self.ede,
                reason: Some(
                    self.reason
                        .clone()
                        .unwrap_or_else(|| "unsigned response with unusable key".to_string()),
                ),
            });
        }

        if self.is_bad() {
            return Some(Verdict {
                status: SecurityStatus::Bogus,
                ede: self.ede,
                reason: Some(format!(
                    "key for {} failed to validate: {}",
                    self.name,
                    self.reason.as_deref().unwrap_or("no reason recorded")
                )),
            });
        }

        if self.is_null() {
            let reason = self
                .reason
                .clone()
                .unwrap_or_else(|| format!("insecure delegation at {}", self.name));
            return Some(Verdict {
                status: SecurityStatus::Insecure,
                ede: self.ede,
                reason: Some(reason),
            });
        }

        None
    }
}

struct CachedKey {
    entry: KeyEntry,
    expires: u32,
}

/// An expiring LRU cache of [`KeyEntry`] values keyed by name and class
///
/// Writers replace whole entries; readers see either the prior or the new
/// entry, never a mixture.
#[derive(Clone)]
pub struct KeyCache {
    cache: Arc<Mutex<LruCache<(Name, DNSClass), CachedKey>>>,
    max_ttl: u32,
}

/// Default maximum number of cached key entries
const DEFAULT_CAPACITY: usize = 1000;
/// Default upper bound on how long a key entry may live, in seconds
const DEFAULT_MAX_TTL: u32 = 900;

impl Default for KeyCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_MAX_TTL)
    }
}

impl KeyCache {
    /// Creates a cache bounded to `capacity` entries, each living at most
    /// `max_ttl` seconds
    pub fn new(capacity: usize, max_ttl: u32) -> Self {
        Self {
            cache: Arc::new(Mutex::new(LruCache::new(capacity))),
            max_ttl,
        }
    }

    /// Stores the entry, bounding its lifetime by the cache maximum
    pub fn store(&self, entry: &KeyEntry, now: u32) {
        let ttl = entry.ttl().min(self.max_ttl);
        let key = (entry.name().clone(), entry.dns_class());
        let cached = CachedKey {
            entry: entry.clone(),
            expires: now.saturating_add(ttl),
        };

        self.cache.lock().insert(key, cached);
    }

    /// Finds the entry for the closest enclosing name, walking from `name`
    /// towards the root; expired entries are removed in passing
    pub fn find(&self, name: &Name, dns_class: DNSClass, now: u32) -> Option<KeyEntry> {
        let mut cache = self.cache.lock();
        let mut current = name.clone();

        loop {
            let key = (current.clone(), dns_class);
            if let Some(cached) = cache.get_mut(&key) {
                if cached.expires > now {
                    return Some(cached.entry.clone());
                }
                cache.remove(&key);
            }

            if current.is_root() {
                return None;
            }
            current = current.base_name();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> Name {
        Name::from_ascii(s).unwrap()
    }

    #[test]
    fn sentinel_states() {
        let null = KeyEntry::null(name("example.com."), DNSClass::IN, 60);
        assert!(null.is_null() && !null.is_bad() && !null.is_good());

        let bad = KeyEntry::bad(name("example.com."), DNSClass::IN, 60);
        assert!(bad.is_bad() && !bad.is_null() && !bad.is_good());
    }

    #[test]
    fn find_walks_to_closest_ancestor() {
        let cache = KeyCache::default();
        let entry = KeyEntry::null(name("example.com."), DNSClass::IN, 120);
        cache.store(&entry, 1000);

        let found = cache
            .find(&name("www.sub.example.com."), DNSClass::IN, 1010)
            .unwrap();
        assert_eq!(found.name(), &name("example.com."));

        assert!(cache.find(&name("other.org."), DNSClass::IN, 1010).is_none());
    }

    #[test]
    fn expiry_is_honored() {
        let cache = KeyCache::default();
        let entry = KeyEntry::null(name("example.com."), DNSClass::IN, 60);
        cache.store(&entry, 1000);

        assert!(cache.find(&name("example.com."), DNSClass::IN, 1030).is_some());
        assert!(cache.find(&name("example.com."), DNSClass::IN, 1061).is_none());
    }

    #[test]
    fn lru_retains_recently_used() {
        let cache = KeyCache::new(10, 900);
        for i in 0..10 {
            let entry = KeyEntry::null(name(&format!("zone{i}.test.")), DNSClass::IN, 600);
            cache.store(&entry, 0);
        }

        // touch the first entry, then overflow the capacity
        assert!(cache.find(&name("zone0.test."), DNSClass::IN, 1).is_some());
        let entry = KeyEntry::null(name("overflow.test."), DNSClass::IN, 600);
        cache.store(&entry, 1);

        // zone0 was most recently used and survives; zone1 was evicted
        assert!(cache.find(&name("zone0.test."), DNSClass::IN, 2).is_some());
        assert!(cache.find(&name("zone1.test."), DNSClass::IN, 2).is_none());
    }
}
