// Copyright 2025-2026 the veridns authors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! The trust anchor store: locally configured DNSKEY or DS RRsets from
//! which every chain of trust starts.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use data_encoding::{BASE64, HEXLOWER_PERMISSIVE};
use tracing::debug;

use crate::dnssec::rdata::{DNSSECRData, DNSKEY, DS};
use crate::dnssec::srrset::SecRrset;
use crate::dnssec::{Algorithm, DigestType, SecurityStatus};
use crate::error::{DnsError, DnsResult};
use crate::rr::{DNSClass, Name, RData, Record, RecordSet, RecordType};

/// A store of trust anchors indexed for closest-enclosing lookup
///
/// Anchors are DNSKEY or DS RRsets grouped by (owner, type, class). A
/// lookup returns the anchor at the longest suffix of the queried name,
/// the starting point for the downward chain-of-trust walk.
#[derive(Clone, Debug, Default)]
pub struct TrustAnchorStore {
    anchors: HashMap<(Name, DNSClass), SecRrset>,
}

impl TrustAnchorStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of stored anchors
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    /// True when no anchors are configured
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Stores an anchor RRset; only DNSKEY and DS sets can anchor trust
    ///
    /// The owner must be absolute. A previously stored anchor for the same
    /// name and class is replaced.
    pub fn store(&mut self, rrset: RecordSet) -> DnsResult<()> {
        if rrset.record_type() != RecordType::DNSKEY && rrset.record_type() != RecordType::DS {
            return Err(format!(
                "trust anchors must be DNSKEY or DS, not {}",
                rrset.record_type()
            )
            .into());
        }
        if !rrset.name().is_fqdn() {
            return Err(crate::error::DnsErrorKind::RelativeName(rrset.name().clone()).into());
        }

        let mut anchor = SecRrset::new(rrset);
        anchor.set_status(SecurityStatus::Secure);
        debug!("adding trust anchor {}/{}", anchor.name(), anchor.record_type());
        self.anchors
            .insert((anchor.name().clone(), anchor.dns_class()), anchor);

        Ok(())
    }

    /// Finds the anchor at the longest matching suffix of `name`
    pub fn find(&self, name: &Name, dns_class: DNSClass) -> Option<&SecRrset> {
        let mut current = name.clone();
        loop {
            if let Some(anchor) = self.anchors.get(&(current.clone(), dns_class)) {
                return Some(anchor);
            }
            if current.is_root() {
                return None;
            }
            current = current.base_name();
        }
    }

    /// Loads anchors from a master-file formatted stream of DNSKEY and DS
    /// records; records of other types are skipped
    ///
    /// Returns the number of anchor RRsets stored.
    pub fn load(&mut self, reader: impl Read) -> DnsResult<usize> {
        let mut records: Vec<Record> = Vec::new();
        for line in BufReader::new(reader).lines() {
            let line = line.map_err(DnsError::from)?;
            if let Some(record) = parse_anchor_line(&line)? {
                records.push(record);
            }
        }

        // canonical order groups records of one rrset together
        records.sort_by(|a, b| {
            a.name()
                .cmp(b.name())
                .then(u16::from(a.record_type()).cmp(&u16::from(b.record_type())))
        });

        let mut stored = 0;
        let mut current: Option<RecordSet> = None;
        for record in records {
            let same_set = current.as_ref().is_some_and(|set| {
                set.name() == record.name()
                    && set.record_type() == record.record_type()
                    && set.dns_class() == record.dns_class()
            });

            if same_set {
                current.as_mut().expect("checked above").add(record)?;
            } else {
                if let Some(set) = current.take() {
                    self.store(set)?;
                    stored += 1;
                }
                current = Some(RecordSet::from_records(vec![record])?);
            }
        }
        if let Some(set) = current.take() {
            self.store(set)?;
            stored += 1;
        }

        Ok(stored)
    }

    /// Loads anchors from a file, see [`Self::load`]
    pub fn load_file(&mut self, path: &Path) -> DnsResult<usize> {
        let file = File::open(path).map_err(DnsError::from)?;
        self.load(file)
    }
}

/// Parses one master-file line into a DNSKEY or DS record; returns `None`
/// for comments, blank lines, directives and skipped record types
fn parse_anchor_line(line: &str) -> DnsResult<Option<Record>> {
    let line = line.split(';').next().unwrap_or_default().trim();
    if line.is_empty() || line.starts_with('$') {
        return Ok(None);
    }

    let cleaned = line.replace(['(', ')'], " ");
    let mut tokens = cleaned.split_whitespace();

    let name = match tokens.next() {
        Some(token) => Name::parse(token, Some(&Name::root()))?,
        None => return Ok(None),
    };

    // [ttl] [class] type, in any master-file order
    let mut ttl = 0_u32;
    let mut dns_class = DNSClass::IN;
    let record_type = loop {
        let token = tokens
            .next()
            .ok_or_else(|| DnsError::from("missing record type in trust anchor line"))?;

        if let Ok(parsed) = token.parse::<u32>() {
            ttl = parsed;
            continue;
        }
        if let Ok(parsed) = DNSClass::from_str(token) {
            dns_class = parsed;
            continue;
        }

        break RecordType::from_str(token)?;
    };

    let rdata = match record_type {
        RecordType::DNSKEY => {
            let flags: u16 = next_field(&mut tokens, "DNSKEY flags")?;
            let protocol: u8 = next_field(&mut tokens, "DNSKEY protocol")?;
            let algorithm: u8 = next_field(&mut tokens, "DNSKEY algorithm")?;
            if protocol != 3 {
                return Err(crate::error::DnsErrorKind::DnsKeyProtocolNot3(protocol).into());
            }

            let key_b64: String = tokens.collect::<Vec<_>>().concat();
            let key = BASE64
                .decode(key_b64.as_bytes())
                .map_err(|e| DnsError::from(format!("invalid DNSKEY base64: {e}")))?;

            let dnskey = DNSKEY::new(
                flags & 0x0100 != 0,
                flags & 0x0001 != 0,
                Algorithm::from(algorithm),
                key,
            );
            RData::DNSSEC(DNSSECRData::DNSKEY(dnskey))
        }
        RecordType::DS => {
            let key_tag: u16 = next_field(&mut tokens, "DS key tag")?;
            let algorithm: u8 = next_field(&mut tokens, "DS algorithm")?;
            let digest_type: u8 = next_field(&mut tokens, "DS digest type")?;
            let digest_hex: String = tokens.collect::<Vec<_>>().concat();
            let digest = HEXLOWER_PERMISSIVE
                .decode(digest_hex.to_ascii_lowercase().as_bytes())
                .map_err(|e| DnsError::from(format!("invalid DS digest hex: {e}")))?;

            RData::DNSSEC(DNSSECRData::DS(DS::new(
                key_tag,
                Algorithm::from(algorithm),
                DigestType::from(digest_type),
                digest,
            )))
        }
        other => {
            debug!("skipping {other} record in trust anchor stream");
            return Ok(None);
        }
    };

    let mut record = Record::from_rdata(name, ttl, rdata);
    record.set_dns_class(dns_class);
    Ok(Some(record))
}

fn next_field<'a, T: FromStr>(
    tokens: &mut impl Iterator<Item = &'a str>,
    what: &str,
) -> DnsResult<T> {
    tokens
        .next()
        .and_then(|t| t.parse::<T>().ok())
        .ok_or_else(|| DnsError::from(format!("missing or invalid {what}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANCHOR_FILE: &str = r#"
; test anchors
.            86400 IN DS 20326 8 2 e06d44b80b8f1d39a95c0b0d7c65d08458e880409bbc683457104237c7f8ec8d
example.com. 3600  IN DNSKEY 257 3 8 AwEAAaGVB6Nv
example.com. 3600  IN DNSKEY 256 3 8 AwEAAcKvB6Nv
example.com. 3600  IN A 192.0.2.1
"#;

    #[test]
    fn loads_and_groups_anchors() {
        let mut store = TrustAnchorStore::new();
        let stored = store.load(ANCHOR_FILE.as_bytes()).unwrap();
        assert_eq!(stored, 2);

        let root = store.find(&Name::root(), DNSClass::IN).unwrap();
        assert_eq!(root.record_type(), RecordType::DS);
        assert!(root.status().is_secure());

        let example = store
            .find(&Name::from_ascii("www.example.com.").unwrap(), DNSClass::IN)
            .unwrap();
        assert_eq!(example.record_type(), RecordType::DNSKEY);
        assert_eq!(example.name(), &Name::from_ascii("example.com.").unwrap());
        assert_eq!(example.records().len(), 2);
    }

    #[test]
    fn closest_enclosing_anchor_wins() {
        let mut store = TrustAnchorStore::new();
        store.load(ANCHOR_FILE.as_bytes()).unwrap();

        let outside = store
            .find(&Name::from_ascii("www.example.org.").unwrap(), DNSClass::IN)
            .unwrap();
        assert_eq!(outside.name(), &Name::root());
    }

    #[test]
    fn rejects_non_anchor_types() {
        let mut store = TrustAnchorStore::new();
        let name = Name::from_ascii("example.com.").unwrap();
        let mut set = RecordSet::new(name.clone(), RecordType::A, DNSClass::IN);
        set.add(Record::from_rdata(
            name,
            60,
            RData::A("192.0.2.1".parse::<crate::rr::rdata::A>().unwrap()),
        ))
        .unwrap();
        assert!(store.store(set).is_err());
    }
}
