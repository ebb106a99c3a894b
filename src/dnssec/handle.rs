// Copyright 2025-2026 the veridns authors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! The validating resolver: wraps a `DnsHandle` and proves every response
//! Secure, Insecure or Bogus against the configured trust anchors before
//! handing it to the client.

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::FutureExt;
use tracing::{debug, trace};

use crate::dnssec::classify::{classify_response, ResponseClassification};
use crate::dnssec::key_cache::{KeyCache, KeyEntry};
use crate::dnssec::nsec::{self, NsecNodata};
use crate::dnssec::nsec3;
use crate::dnssec::rdata::{DNSSECRData, NSEC3};
use crate::dnssec::srrset::{SecMessage, SecRrset};
use crate::dnssec::trust_anchor::TrustAnchorStore;
use crate::dnssec::{verifier, SecurityStatus};
use crate::error::DnsResult;
use crate::op::{Message, OpCode, Query, ResponseCode};
use crate::rr::rdata::{Ede, EdeCode, EdnsOption, TXT};
use crate::rr::{DNSClass, Name, RData, Record, RecordType};
use crate::runtime::{Clock, SystemClock};
use crate::xfer::{DnsHandle, DnsResponseFuture};

/// The class used for the TXT record carrying the reason why the validator
/// came to the returned result
pub const VALIDATION_REASON_QCLASS: u16 = 65280;

/// TTL for Bad and Null key entries, so failed chains are retried soon
const BAD_KEY_TTL: u32 = 60;

/// Upper bound on DS/DNSKEY steps per chain walk; breaks referral loops
const MAX_CHAIN_DEPTH: usize = 16;

/// Configuration of the validating resolver
#[derive(Clone, Debug)]
pub struct ValidatorConfig {
    /// Trust anchors are loaded from this master-file formatted file
    pub trust_anchor_file: Option<PathBuf>,
    /// NSEC3 RRsets above this iteration count are ignored (RFC 9276)
    pub max_nsec3_iterations: u16,
    /// Synthesize the validation-reason TXT record on failures
    pub add_reason_to_additional: bool,
    /// The class of the synthetic TXT record
    pub validation_reason_qclass: u16,
    /// Entry bound of the validated-key cache
    pub key_cache_capacity: usize,
    /// Lifetime bound of validated-key entries, seconds
    pub key_cache_max_ttl: u32,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            trust_anchor_file: None,
            max_nsec3_iterations: nsec3::DEFAULT_MAX_ITERATIONS,
            add_reason_to_additional: true,
            validation_reason_qclass: VALIDATION_REASON_QCLASS,
            key_cache_capacity: 1000,
            key_cache_max_ttl: 900,
        }
    }
}

/// A resolver front-end that validates responses with DNSSEC
///
/// Queries are forwarded to the wrapped handle with CD set (the upstream
/// must not interfere with validation) and DO set (DNSSEC records are
/// required). The response is classified, every RRset is verified against
/// a chain of trust walked down from the closest enclosing trust anchor,
/// denial of existence is proven from NSEC or NSEC3 material, and the
/// final status decides the client-visible outcome: AD on Secure, the
/// response unchanged on Insecure, SERVFAIL with an Extended DNS Error on
/// Bogus.
#[derive(Clone)]
pub struct ValidatingResolver<H: DnsHandle> {
    handle: H,
    trust_anchors: Arc<TrustAnchorStore>,
    key_cache: KeyCache,
    clock: Arc<dyn Clock>,
    config: ValidatorConfig,
}

impl<H: DnsHandle> ValidatingResolver<H> {
    /// Creates a validator over the given transport with no anchors; load
    /// anchors before sending queries
    pub fn new(handle: H) -> Self {
        Self::with_parts(
            handle,
            TrustAnchorStore::new(),
            Arc::new(SystemClock),
            ValidatorConfig::default(),
        )
    }

    /// Creates a validator from a configuration; anchors are loaded from
    /// the configured trust-anchor file when one is set
    pub fn from_config(handle: H, config: ValidatorConfig) -> DnsResult<Self> {
        let mut anchors = TrustAnchorStore::new();
        if let Some(path) = &config.trust_anchor_file {
            debug!("reading trust anchor file: {}", path.display());
            anchors.load_file(path)?;
        }

        Ok(Self::with_parts(
            handle,
            anchors,
            Arc::new(SystemClock),
            config,
        ))
    }

    /// Creates a validator from its parts: transport, anchors, clock and
    /// configuration
    pub fn with_parts(
        handle: H,
        trust_anchors: TrustAnchorStore,
        clock: Arc<dyn Clock>,
        config: ValidatorConfig,
    ) -> Self {
        Self {
            handle,
            trust_anchors: Arc::new(trust_anchors),
            key_cache: KeyCache::new(config.key_cache_capacity, config.key_cache_max_ttl),
            clock,
            config,
        }
    }

    /// Loads trust anchors from a master-file formatted stream of DNSKEY
    /// or DS records
    pub fn load_trust_anchors(&mut self, reader: impl Read) -> DnsResult<usize> {
        let mut anchors = (*self.trust_anchors).clone();
        let stored = anchors.load(reader)?;
        self.trust_anchors = Arc::new(anchors);
        Ok(stored)
    }

    /// Loads trust anchors from a file, see [`Self::load_trust_anchors`]
    pub fn load_trust_anchor_file(&mut self, path: &Path) -> DnsResult<usize> {
        let mut anchors = (*self.trust_anchors).clone();
        let stored = anchors.load_file(path)?;
        self.trust_anchors = Arc::new(anchors);
        Ok(stored)
    }

    /// The configured trust anchors
    pub fn trust_anchors(&self) -> &TrustAnchorStore {
        &self.trust_anchors
    }

    /// Sends the query and validates the response before returning it
    pub async fn send_validated(&self, query: Message) -> DnsResult<Message> {
        // validation only applies to queries
        if query.op_code() != OpCode::Query {
            return self.handle.send(query).await;
        }

        let response = self.forward(&query).await?;
        let mut response = SecMessage::from_message(&response);

        // only this validator may assert authenticity
        response.header_mut().set_authentic_data(false);

        // a client running its own validation gets the raw response
        if query.header().checking_disabled() {
            return Ok(response.to_message());
        }

        // positive RRSIG responses cannot be validated: there are no
        // signatures on signatures
        if let Some(q) = query.query() {
            if q.query_type() == RecordType::RRSIG
                && response.response_code() == ResponseCode::NoError
                && !response.answers().is_empty()
            {
                return Ok(response.to_message());
            }
        }

        self.validate(&query, &mut response).await;
        Ok(self.finish(&query, response))
    }

    /// Forwards a client query with CD and DO forced on
    async fn forward(&self, request: &Message) -> DnsResult<Message> {
        let mut local = request.clone();
        local.header_mut().set_checking_disabled(true);
        local.edns_mut().set_dnssec_ok(true);

        if let Some(q) = local.query() {
            trace!("sending request: <{q}>");
        }
        self.handle.send(local).await
    }

    /// Issues a subordinate DS or DNSKEY query
    async fn forward_query(
        &self,
        name: Name,
        record_type: RecordType,
        dns_class: DNSClass,
    ) -> DnsResult<SecMessage> {
        let mut query = Query::query(name, record_type);
        query.set_query_class(dns_class);
        let message = Message::new_query(query);
        let response = self.forward(&message).await?;
        Ok(SecMessage::from_message(&response))
    }

    /// Classifies the response and dispatches to the shape-specific
    /// validation, leaving the final status on the response
    async fn validate(&self, request: &Message, response: &mut SecMessage) {
        let Some(query) = request.query().cloned() else {
            response.set_bogus("request carries no question");
            return;
        };

        if let Some(answered) = response.question() {
            if answered.name() != query.name() || answered.query_type() != query.query_type() {
                response.set_bogus(format!(
                    "response question <{answered}> does not match the query <{query}>"
                ));
                return;
            }
        }

        let classification = classify_response(&query, response);
        debug!("validating {query} as {classification}");

        if classification != ResponseClassification::Referral {
            remove_spurious_authority(response);
        }

        match classification {
            ResponseClassification::Positive
            | ResponseClassification::Cname
            | ResponseClassification::Any => {
                self.validate_positive(&query, response).await;
            }
            ResponseClassification::Nodata => {
                self.validate_nodata(&query, response).await;
            }
            ResponseClassification::NameError => {
                self.validate_name_error(&query, response).await;
            }
            ResponseClassification::CnameNodata => {
                self.validate_positive(&query, response).await;
                if !response.status().is_insecure() {
                    response.set_status(SecurityStatus::Unchecked);
                    self.validate_nodata(&query, response).await;
                }
            }
            ResponseClassification::CnameNameError => {
                self.validate_positive(&query, response).await;
                if !response.status().is_insecure() {
                    response.set_status(SecurityStatus::Unchecked);
                    self.validate_name_error(&query, response).await;
                }
            }
            ResponseClassification::Referral | ResponseClassification::Unknown => {
                response.set_bogus(format!(
                    "cannot validate a {classification} response to {query}"
                ));
            }
        }
    }

    // ---------------- key finding -------------------

    /// Finds the validated key entry for the RRset's signer: the trust
    /// anchor decides whether the data is inside an island of trust, the
    /// key cache short-circuits known chains, and otherwise the chain of
    /// trust is walked down with DS and DNSKEY queries
    async fn find_key_for(&self, set: &SecRrset) -> KeyEntry {
        let signer = set
            .signer_name()
            .cloned()
            .unwrap_or_else(|| set.name().clone());
        let dns_class = set.dns_class();
        let now = self.clock.now();

        let Some(anchor) = self.trust_anchors.find(&signer, dns_class) else {
            // outside any island of trust, the data cannot be validated
            let mut entry = KeyEntry::null(signer, dns_class, BAD_KEY_TTL);
            entry.set_bad_reason(
                EdeCode::Other,
                "no trust anchor covers the response",
            );
            return entry;
        };

        if let Some(entry) = self.key_cache.find(&signer, dns_class, now) {
            if entry.name() == &signer || !entry.is_good() {
                trace!("key cache hit for {} at {}", signer, entry.name());
                return entry;
            }
        }

        self.walk_chain(anchor.clone(), signer, dns_class).await
    }

    /// The FINDKEY walk: from the trust anchor down to the target signer,
    /// alternating DS and DNSKEY queries, verifying each step
    async fn walk_chain(&self, anchor: SecRrset, target: Name, dns_class: DNSClass) -> KeyEntry {
        // the trusted link set: the anchor itself, then each validated DS
        // set; a pending link still needs its DNSKEY fetched and verified
        let mut pending_link = Some(anchor);
        // the DNSKEY entry validated so far
        let mut current_keys: Option<KeyEntry> = None;
        // the deepest name already cleared (a validated zone apex or a
        // proven non-delegation)
        let mut cursor: Option<Name> = None;

        for _ in 0..MAX_CHAIN_DEPTH {
            let now = self.clock.now();

            if let Some(link) = pending_link.take() {
                let link_name = link.name().clone();
                let entry = self.fetch_and_verify_dnskeys(&link, dns_class, now).await;
                if !entry.is_good() {
                    return entry;
                }

                self.key_cache.store(&entry, now);
                if entry.name() == &target {
                    return entry;
                }

                cursor = Some(link_name);
                current_keys = Some(entry);
                continue;
            }

            let Some(keys) = current_keys.as_ref() else {
                break;
            };
            let Some(at) = cursor.as_ref() else {
                break;
            };

            if !at.zone_of(&target) || at == &target {
                break;
            }

            // descend one label towards the target and ask for a DS there
            let next = target.trim_to(at.label_count() + 1);
            let ds_response = match self
                .forward_query(next.clone(), RecordType::DS, dns_class)
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    let mut entry = KeyEntry::bad(next, dns_class, BAD_KEY_TTL);
                    entry.set_bad_reason(
                        EdeCode::NetworkError,
                        format!("DS lookup failed: {e}"),
                    );
                    return entry;
                }
            };

            match self.ds_response_to_link(&next, dns_class, ds_response, keys, now) {
                DsOutcome::Link(ds_set) => pending_link = Some(ds_set),
                DsOutcome::NotDelegation => cursor = Some(next),
                DsOutcome::Terminal(entry) => {
                    if entry.is_null() {
                        self.key_cache.store(&entry, now);
                    }
                    return entry;
                }
            }
        }

        // the walk could not reach the target; return what was established,
        // verification against an ancestor key will fail closed
        match current_keys {
            Some(entry) => entry,
            None => {
                let mut entry = KeyEntry::bad(target, dns_class, BAD_KEY_TTL);
                entry.set_bad_reason(EdeCode::DnssecBogus, "chain of trust walk exhausted");
                entry
            }
        }
    }

    /// Fetches the DNSKEY RRset at the link's owner and verifies it against
    /// the link (a DS set, or the trust anchor itself)
    async fn fetch_and_verify_dnskeys(
        &self,
        link: &SecRrset,
        dns_class: DNSClass,
        now: u32,
    ) -> KeyEntry {
        let name = link.name().clone();
        let response = match self
            .forward_query(name.clone(), RecordType::DNSKEY, dns_class)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                let mut entry = KeyEntry::bad(name, dns_class, BAD_KEY_TTL);
                entry.set_bad_reason(
                    EdeCode::NetworkError,
                    format!("DNSKEY lookup failed: {e}"),
                );
                return entry;
            }
        };

        let Some(dnskey_set) =
            response.find_answer_rrset(&name, RecordType::DNSKEY, dns_class)
        else {
            let mut entry = KeyEntry::bad(name.clone(), dns_class, BAD_KEY_TTL);
            entry.set_bad_reason(
                EdeCode::DnskeyMissing,
                format!("no DNSKEY rrset at {name}"),
            );
            return entry;
        };
        let mut dnskey_set = dnskey_set.clone();

        match link.record_type() {
            RecordType::DNSKEY => {
                // a DNSKEY trust anchor: the fetched set must verify under
                // the anchored keys themselves
                let verdict = verifier::verify_srrset(&mut dnskey_set, link, now);
                if verdict.status.is_secure() {
                    KeyEntry::good(dnskey_set)
                } else {
                    let mut entry = KeyEntry::bad(name, dns_class, BAD_KEY_TTL);
                    entry.set_bad_reason(
                        verdict.ede.unwrap_or(EdeCode::DnssecBogus),
                        verdict
                            .reason
                            .unwrap_or_else(|| "DNSKEY priming failed".to_string()),
                    );
                    entry
                }
            }
            _ => verifier::verify_new_dnskeys(dnskey_set, link, BAD_KEY_TTL, now),
        }
    }

    /// Interprets a DS response during the chain walk
    fn ds_response_to_link(
        &self,
        qname: &Name,
        dns_class: DNSClass,
        mut response: SecMessage,
        keys: &KeyEntry,
        now: u32,
    ) -> DsOutcome {
        let Some(key_rrset) = keys.rrset() else {
            let mut entry = KeyEntry::bad(qname.clone(), dns_class, BAD_KEY_TTL);
            entry.set_bad_reason(EdeCode::DnssecBogus, "no keys to verify the DS response");
            return DsOutcome::Terminal(entry);
        };

        let query = Query::query(qname.clone(), RecordType::DS);
        let classification = classify_response(&query, &response);
        let mut bogus = KeyEntry::bad(qname.clone(), dns_class, BAD_KEY_TTL);

        match classification {
            ResponseClassification::Positive => {
                let Some(ds_set) =
                    response.find_answer_rrset(qname, RecordType::DS, dns_class)
                else {
                    bogus.set_bad_reason(EdeCode::DnssecBogus, "positive DS response without DS");
                    return DsOutcome::Terminal(bogus);
                };
                let mut ds_set = ds_set.clone();

                let verdict = verifier::verify_srrset(&mut ds_set, key_rrset, now);
                if !verdict.status.is_secure() {
                    bogus.set_bad_reason(
                        verdict.ede.unwrap_or(EdeCode::DnssecBogus),
                        verdict
                            .reason
                            .unwrap_or_else(|| format!("DS rrset at {qname} failed to validate")),
                    );
                    return DsOutcome::Terminal(bogus);
                }

                if !verifier::at_least_one_supported_algorithm(&ds_set) {
                    let mut null = KeyEntry::null(qname.clone(), dns_class, ds_set.ttl());
                    null.set_bad_reason(
                        EdeCode::UnsupportedDnskeyAlgorithm,
                        format!("no supported algorithm in the DS rrset at {qname}"),
                    );
                    return DsOutcome::Terminal(null);
                }

                trace!("DS rrset at {qname} was good");
                DsOutcome::Link(ds_set)
            }

            ResponseClassification::Cname => {
                // a CNAME at the delegation name is not a zone cut; the
                // walk continues below once the CNAME itself validates
                let Some(cname_set) =
                    response.find_answer_rrset(qname, RecordType::CNAME, dns_class)
                else {
                    bogus.set_bad_reason(EdeCode::DnssecBogus, "CNAME DS response without CNAME");
                    return DsOutcome::Terminal(bogus);
                };
                let mut cname_set = cname_set.clone();

                let verdict = verifier::verify_srrset(&mut cname_set, key_rrset, now);
                if verdict.status.is_secure() {
                    DsOutcome::NotDelegation
                } else {
                    bogus.set_bad_reason(
                        EdeCode::DnssecBogus,
                        format!("CNAME in DS response for {qname} failed to validate"),
                    );
                    DsOutcome::Terminal(bogus)
                }
            }

            ResponseClassification::Nodata | ResponseClassification::NameError => {
                self.ds_denial_to_link(qname, dns_class, &mut response, key_rrset, now)
            }

            other => {
                bogus.set_bad_reason(
                    EdeCode::DnssecBogus,
                    format!("unexpected {other} response to the DS query for {qname}"),
                );
                DsOutcome::Terminal(bogus)
            }
        }
    }

    /// Interprets a negative DS response: an authenticated denial makes the
    /// child insecure, a proven non-delegation continues the walk
    fn ds_denial_to_link(
        &self,
        qname: &Name,
        dns_class: DNSClass,
        response: &mut SecMessage,
        key_rrset: &SecRrset,
        now: u32,
    ) -> DsOutcome {
        let mut bogus = KeyEntry::bad(qname.clone(), dns_class, BAD_KEY_TTL);

        let has_denial_material = response.authorities().iter().any(|set| {
            matches!(set.record_type(), RecordType::NSEC | RecordType::NSEC3)
                && !set.sigs().is_empty()
        });
        if !has_denial_material {
            bogus.set_bad_reason(
                EdeCode::RrsigsMissing,
                format!("no signed denial material in the DS response for {qname}"),
            );
            return DsOutcome::Terminal(bogus);
        }

        // NSEC first
        let mut name_error_proven = false;
        for i in 0..response.authorities().len() {
            if response.authorities()[i].record_type() != RecordType::NSEC {
                continue;
            }

            let verdict = verifier::verify_srrset(&mut response.authorities_mut()[i], key_rrset, now);
            if !verdict.status.is_secure() {
                debug!("skipping unverifiable NSEC in DS response for {qname}");
                continue;
            }

            let set = &response.authorities()[i];
            let owner = set.name().clone();
            let Some(RData::DNSSEC(DNSSECRData::NSEC(nsec_data))) =
                set.first().map(Record::data)
            else {
                continue;
            };

            if nsec::proves_nodata(&owner, nsec_data, qname, RecordType::DS).proven {
                let mut null = KeyEntry::null(qname.clone(), dns_class, set.ttl());
                null.set_bad_reason(
                    EdeCode::Other,
                    format!("NSEC proved no DS at {qname}, delegation is insecure"),
                );
                return DsOutcome::Terminal(null);
            }
            if nsec::proves_name_error(&owner, nsec_data, qname) {
                name_error_proven = true;
            }
        }
        if name_error_proven {
            // the name does not exist at the parent, so it is not a zone cut
            return DsOutcome::NotDelegation;
        }

        // then NSEC3
        let mut nsec3_pairs: Vec<(Name, NSEC3)> = Vec::new();
        let mut nsec3_ttl = u32::MAX;
        for i in 0..response.authorities().len() {
            if response.authorities()[i].record_type() != RecordType::NSEC3 {
                continue;
            }

            let verdict = verifier::verify_srrset(&mut response.authorities_mut()[i], key_rrset, now);
            if !verdict.status.is_secure() {
                debug!("skipping unverifiable NSEC3 in DS response for {qname}");
                continue;
            }

            let set = &response.authorities()[i];
            nsec3_ttl = nsec3_ttl.min(set.ttl());
            for record in set.records() {
                if let RData::DNSSEC(DNSSECRData::NSEC3(nsec3_data)) = record.data() {
                    nsec3_pairs.push((record.name().clone(), nsec3_data.clone()));
                }
            }
        }

        if !nsec3_pairs.is_empty() {
            let zone = key_rrset.name();
            let usable = nsec3::usable_nsec3s(
                nsec3_pairs.iter().map(|(n, r)| (n, r)),
                zone,
                self.config.max_nsec3_iterations,
            );

            match nsec3::prove_no_ds(&usable, qname, zone) {
                // both outcomes continue into unsigned space
                SecurityStatus::Secure | SecurityStatus::Insecure => {
                    let mut null = KeyEntry::null(qname.clone(), dns_class, nsec3_ttl);
                    null.set_bad_reason(
                        EdeCode::Other,
                        format!("NSEC3 proved no DS at {qname}, delegation is insecure"),
                    );
                    return DsOutcome::Terminal(null);
                }
                SecurityStatus::Indeterminate => {
                    debug!("NSEC3s proved no delegation at {qname}");
                    return DsOutcome::NotDelegation;
                }
                _ => {
                    bogus.set_bad_reason(
                        EdeCode::DnssecBogus,
                        format!("NSEC3s failed to prove the DS status of {qname}"),
                    );
                    return DsOutcome::Terminal(bogus);
                }
            }
        }

        bogus.set_bad_reason(
            EdeCode::DnssecBogus,
            format!("no denial material proved the DS status of {qname}"),
        );
        DsOutcome::Terminal(bogus)
    }

    // ---------------- shape validation -------------------

    /// Validates one section RRset: key lookup, key applicability, then
    /// signature verification. Returns false when validation of the whole
    /// response ends here; the final status is already on the response.
    async fn validate_set(
        &self,
        response: &mut SecMessage,
        section_answer: bool,
        index: usize,
    ) -> bool {
        let set = if section_answer {
            response.answers()[index].clone()
        } else {
            response.authorities()[index].clone()
        };

        // already proven within this response, e.g. a CNAME synthesized
        // from a validated DNAME
        if set.status().is_secure() {
            return true;
        }

        let key = self.find_key_for(&set).await;
        if let Some(verdict) = key.validate_key_for(set.signer_name()) {
            response.set_status_justified(
                verdict.status,
                verdict.ede,
                verdict.reason.unwrap_or_default(),
            );
            return false;
        }

        let keys = key.rrset().expect("validate_key_for admits only good keys");
        let now = self.clock.now();
        let target = if section_answer {
            &mut response.answers_mut()[index]
        } else {
            &mut response.authorities_mut()[index]
        };
        let verdict = verifier::verify_srrset(target, keys, now);
        if !verdict.status.is_secure() {
            let what = if section_answer { "answer" } else { "authority" };
            response.set_status_justified(
                verdict.status,
                verdict.ede,
                format!(
                    "{what} rrset {}/{} failed to validate: {}",
                    set.name(),
                    set.record_type(),
                    verdict.reason.unwrap_or_default()
                ),
            );
            return false;
        }

        true
    }

    /// Validates a positive (or ANY, or CNAME-chain) response: every answer
    /// and authority RRset must verify, and wildcard expansions must be
    /// confirmed by denial proofs
    async fn validate_positive(&self, query: &Query, response: &mut SecMessage) {
        // wildcard-expanded rrset owners and the wildcard they claim
        let mut wildcards: HashMap<Name, Name> = HashMap::new();

        // the answer section
        let mut index = 0;
        while index < response.answers().len() {
            if !self.validate_set(response, true, index).await {
                return;
            }

            let set = &response.answers()[index];
            match set.expanded_from_wildcard() {
                Ok(Some(wildcard)) => {
                    // RFC 4592 §4.4 forbids wildcarded DNAMEs
                    if set.record_type() == RecordType::DNAME {
                        response.set_bogus(format!(
                            "DNAME at {} was wildcard expanded",
                            set.name()
                        ));
                        return;
                    }
                    wildcards.insert(set.name().clone(), wildcard);
                }
                Ok(None) => {}
                Err(_) => {
                    response.set_bogus(format!(
                        "cannot reconstruct the wildcard of {}",
                        response.answers()[index].name()
                    ));
                    return;
                }
            }

            // a DNAME is followed by a CNAME the upstream synthesized; it
            // carries no signature of its own and is checked by
            // reconstruction from the validated DNAME
            let set = &response.answers()[index];
            let dname = match (set.record_type(), set.first().map(Record::data)) {
                (RecordType::DNAME, Some(RData::DNAME(target)))
                    if query.query_type() != RecordType::DNAME =>
                {
                    Some((set.name().clone(), target.clone()))
                }
                _ => None,
            };

            if let (Some((dname_owner, dname_target)), Some(next)) =
                (dname, response.answers().get(index + 1))
            {
                if next.record_type() == RecordType::CNAME {
                    if next.rrset().len() > 1 {
                        response.set_bogus("multiple CNAMEs synthesized from one DNAME");
                        return;
                    }
                    let (cname_owner, cname_target) = match next.first().map(Record::data) {
                        Some(RData::CNAME(target)) => (next.name().clone(), target.clone()),
                        _ => {
                            response.set_bogus("CNAME rrset without CNAME rdata");
                            return;
                        }
                    };

                    match cname_owner.replace_suffix(&dname_owner, &dname_target) {
                        Ok(expected) if expected == cname_target => {
                            // secure by delegation from the DNAME
                            response.answers_mut()[index + 1].set_status(SecurityStatus::Secure);
                        }
                        Ok(expected) => {
                            response.set_bogus(format!(
                                "CNAME {cname_target} does not match the DNAME synthesis {expected}"
                            ));
                            return;
                        }
                        Err(_) => {
                            response
                                .set_bogus("DNAME substitution exceeds the name length bound");
                            return;
                        }
                    }
                }
            }

            index += 1;
        }

        // the authority section
        let mut nsec_sets: Vec<SecRrset> = Vec::new();
        let mut nsec3_sets: Vec<SecRrset> = Vec::new();
        let mut index = 0;
        while index < response.authorities().len() {
            if !self.validate_set(response, false, index).await {
                return;
            }

            if !wildcards.is_empty() {
                let set = &response.authorities()[index];
                match set.record_type() {
                    RecordType::NSEC => nsec_sets.push(set.clone()),
                    RecordType::NSEC3 => nsec3_sets.push(set.clone()),
                    _ => {}
                }
            }

            index += 1;
        }

        // positive wildcard responses additionally require proof that the
        // qname itself does not exist and that this wildcard was the one
        // that applied (RFC 4035 §5.3.4)
        for (owner, wildcard) in &wildcards {
            let mut confirmed = false;

            for set in &nsec_sets {
                let Some(RData::DNSSEC(DNSSECRData::NSEC(nsec_data))) =
                    set.first().map(Record::data)
                else {
                    continue;
                };

                if nsec::proves_name_error(set.name(), nsec_data, owner) {
                    match nsec::nsec_wildcard(owner, set.name(), nsec_data) {
                        Ok(reconstructed) if &reconstructed == wildcard => {
                            confirmed = true;
                            break;
                        }
                        _ => {}
                    }
                }
            }

            if !confirmed && !nsec3_sets.is_empty() {
                let pairs = nsec3_pairs(&nsec3_sets);
                let Some(zone) = nsec3_sets[0].signer_name().cloned() else {
                    response.set_bogus("NSEC3 material without a signer");
                    return;
                };

                if nsec3::all_ignoreable(
                    pairs.iter().map(|(n, r)| (n, r)),
                    &zone,
                    self.config.max_nsec3_iterations,
                ) {
                    response.set_status_justified(
                        SecurityStatus::Insecure,
                        None,
                        "all NSEC3 records were ignored by policy",
                    );
                    return;
                }

                let usable = nsec3::usable_nsec3s(
                    pairs.iter().map(|(n, r)| (n, r)),
                    &zone,
                    self.config.max_nsec3_iterations,
                );
                match nsec3::prove_wildcard(&usable, owner, wildcard) {
                    SecurityStatus::Secure => confirmed = true,
                    SecurityStatus::Insecure => {
                        response.set_status(SecurityStatus::Insecure);
                        return;
                    }
                    _ => {}
                }
            }

            if !confirmed {
                response.set_bogus_with(
                    EdeCode::NsecMissing,
                    format!("wildcard expansion of {owner} is not proven by denial material"),
                );
                return;
            }
        }

        response.set_status(SecurityStatus::Secure);
    }

    /// Validates a NODATA response: the authority RRsets must verify and
    /// the NSEC/NSEC3 material must prove that the name exists without the
    /// queried type
    async fn validate_nodata(&self, query: &Query, response: &mut SecMessage) {
        // a CNAME chain may precede the NODATA; it was validated by the
        // positive pass, follow it to the effective qname
        let mut qname = query.name().clone();
        for set in response.answers() {
            if !set.status().is_secure() {
                response.set_bogus(format!(
                    "unvalidated {} in the answer of a NODATA response",
                    set.name()
                ));
                return;
            }
            if set.record_type() == RecordType::CNAME {
                if let Some(RData::CNAME(target)) = set.first().map(Record::data) {
                    qname = target.clone();
                }
            }
        }
        let qtype = query.query_type();

        let mut index = 0;
        while index < response.authorities().len() {
            if !self.validate_set(response, false, index).await {
                return;
            }
            index += 1;
        }

        let mut has_valid_nsec = false;
        let mut ede = EdeCode::NsecMissing;
        // the proven closest encloser, for wildcard NODATA cross-checking
        let mut closest_encloser: Option<Name> = None;
        let mut nodata = NsecNodata::default();
        let mut nsec3_sets: Vec<SecRrset> = Vec::new();
        let mut nsec3_signer: Option<Name> = None;

        for set in response.authorities() {
            match set.record_type() {
                RecordType::NSEC => {
                    let Some(RData::DNSSEC(DNSSECRData::NSEC(nsec_data))) =
                        set.first().map(Record::data)
                    else {
                        continue;
                    };

                    let proof = nsec::proves_nodata(set.name(), nsec_data, &qname, qtype);
                    if proof.proven {
                        has_valid_nsec = true;
                        if proof.wildcard_base.is_some() {
                            nodata = proof;
                        }
                    } else {
                        ede = EdeCode::DnssecBogus;
                    }

                    if nsec::proves_name_error(set.name(), nsec_data, &qname) {
                        closest_encloser = Some(nsec::closest_encloser(
                            &qname,
                            set.name(),
                            nsec_data.next_domain_name(),
                        ));
                    }
                }
                RecordType::NSEC3 => {
                    nsec3_signer = set.signer_name().cloned();
                    nsec3_sets.push(set.clone());
                }
                _ => {}
            }
        }

        // a wildcard NODATA needs both halves: the wildcard NSEC and a
        // name-error NSEC establishing the matching closest encloser
        if let Some(wildcard_base) = &nodata.wildcard_base {
            let consistent = match &closest_encloser {
                Some(ce) => ce == wildcard_base || &qname == ce,
                None => false,
            };
            if !consistent {
                ede = EdeCode::DnssecBogus;
                has_valid_nsec = false;
            }
        }

        if !has_valid_nsec && !nsec3_sets.is_empty() {
            debug!("validating NODATA with NSEC3 records");
            let pairs = nsec3_pairs(&nsec3_sets);
            let Some(zone) = nsec3_signer else {
                response.set_bogus("NSEC3 material without a signer");
                return;
            };

            if nsec3::all_ignoreable(
                pairs.iter().map(|(n, r)| (n, r)),
                &zone,
                self.config.max_nsec3_iterations,
            ) {
                response.set_bogus("all NSEC3 records were ignored by policy");
                return;
            }

            let usable = nsec3::usable_nsec3s(
                pairs.iter().map(|(n, r)| (n, r)),
                &zone,
                self.config.max_nsec3_iterations,
            );
            match nsec3::prove_nodata(&usable, &qname, qtype, &zone) {
                SecurityStatus::Secure => has_valid_nsec = true,
                SecurityStatus::Insecure => {
                    response.set_status(SecurityStatus::Insecure);
                    return;
                }
                _ => ede = EdeCode::DnssecBogus,
            }
        }

        if !has_valid_nsec {
            trace!("failed NODATA for {qname}");
            response.set_bogus_with(ede, format!("NODATA response for {qname}/{qtype} not proven"));
            return;
        }

        trace!("successfully validated NODATA response for {qname}");
        response.set_status(SecurityStatus::Secure);
    }

    /// Validates an NXDOMAIN response: the authority RRsets must verify,
    /// the qname must be proven absent and so must the covering wildcard
    async fn validate_name_error(&self, query: &Query, response: &mut SecMessage) {
        let mut qname = query.name().clone();
        for set in response.answers() {
            if !set.status().is_secure() {
                response.set_bogus(format!(
                    "unvalidated {} in the answer of an NXDOMAIN response",
                    set.name()
                ));
                return;
            }
            if set.record_type() == RecordType::CNAME {
                if let Some(RData::CNAME(target)) = set.first().map(Record::data) {
                    qname = target.clone();
                }
            }
        }

        let mut index = 0;
        while index < response.authorities().len() {
            if !self.validate_set(response, false, index).await {
                return;
            }
            index += 1;
        }

        let mut has_valid_nsec = false;
        let mut has_valid_wc_nsec = false;
        let mut nsec3_sets: Vec<SecRrset> = Vec::new();
        let mut nsec3_signer: Option<Name> = None;

        for set in response.authorities() {
            match set.record_type() {
                RecordType::NSEC => {
                    let Some(RData::DNSSEC(DNSSECRData::NSEC(nsec_data))) =
                        set.first().map(Record::data)
                    else {
                        continue;
                    };

                    if nsec::proves_name_error(set.name(), nsec_data, &qname) {
                        has_valid_nsec = true;
                    }
                    if nsec::proves_no_wildcard(set.name(), nsec_data, &qname) {
                        has_valid_wc_nsec = true;
                    }
                }
                RecordType::NSEC3 => {
                    nsec3_signer = set.signer_name().cloned();
                    nsec3_sets.push(set.clone());
                }
                _ => {}
            }
        }

        if (!has_valid_nsec || !has_valid_wc_nsec) && !nsec3_sets.is_empty() {
            debug!("validating NXDOMAIN with NSEC3 records");
            let pairs = nsec3_pairs(&nsec3_sets);
            let Some(zone) = nsec3_signer else {
                response.set_bogus("NSEC3 material without a signer");
                return;
            };

            if nsec3::all_ignoreable(
                pairs.iter().map(|(n, r)| (n, r)),
                &zone,
                self.config.max_nsec3_iterations,
            ) {
                response.set_status_justified(
                    SecurityStatus::Insecure,
                    None,
                    "all NSEC3 records were ignored by policy",
                );
                return;
            }

            let usable = nsec3::usable_nsec3s(
                pairs.iter().map(|(n, r)| (n, r)),
                &zone,
                self.config.max_nsec3_iterations,
            );
            match nsec3::prove_name_error(&usable, &qname, &zone) {
                SecurityStatus::Secure => {
                    // the NSEC3 name-error proof subsumes the wildcard part
                    has_valid_nsec = true;
                    has_valid_wc_nsec = true;
                }
                SecurityStatus::Insecure => {
                    response.set_status_justified(
                        SecurityStatus::Insecure,
                        None,
                        format!("NXDOMAIN for {qname} lies in an opt-out span"),
                    );
                    return;
                }
                _ => {
                    response.set_bogus(format!("NSEC3s failed to prove NXDOMAIN for {qname}"));
                    return;
                }
            }
        }

        if !has_valid_nsec || !has_valid_wc_nsec {
            // some servers return NXDOMAIN where the proof establishes an
            // empty non-terminal; re-validate leniently as NODATA and
            // rewrite the rcode (RFC 8020 behavior in the wild)
            let had_nsec = has_valid_nsec;
            response.set_status(SecurityStatus::Unchecked);
            Box::pin(self.validate_nodata(query, response)).await;
            if response.status().is_secure() {
                debug!("NXDOMAIN for {qname} rewritten to NODATA");
                response.header_mut().set_response_code(ResponseCode::NoError);
                return;
            }

            if !had_nsec {
                response.set_bogus(format!("NXDOMAIN for {qname} not proven"));
            } else {
                response.set_bogus(format!(
                    "NXDOMAIN for {qname} proven, but a wildcard may still cover it"
                ));
            }
            return;
        }

        trace!("successfully validated NXDOMAIN response for {qname}");
        response.set_status(SecurityStatus::Secure);
    }

    // ---------------- finalization -------------------

    /// Applies the final massaging: AD on Secure, SERVFAIL plus EDE and
    /// optionally the reason TXT on Bogus, pass-through otherwise
    fn finish(&self, request: &Message, response: SecMessage) -> Message {
        let status = response.status();
        let ede = response.ede();
        let reason = response.reason().map(str::to_string);

        let response = match status {
            SecurityStatus::Bogus => {
                let code = match response.response_code() {
                    ResponseCode::NoError | ResponseCode::NXDomain => ResponseCode::ServFail,
                    other => other,
                };
                SecMessage::error_for(request, code)
            }
            SecurityStatus::Secure => {
                let mut response = response;
                response.header_mut().set_authentic_data(true);
                response
            }
            _ => response,
        };

        let mut message = response.to_message();
        if status.is_bogus() {
            if let Some(reason) = &reason {
                message.edns_mut().options_mut().insert(EdnsOption::Ede(Ede::new(
                    ede.unwrap_or(EdeCode::DnssecBogus),
                    Some(reason.clone()),
                )));

                if self.config.add_reason_to_additional {
                    let mut txt = Record::from_rdata(
                        Name::root(),
                        0,
                        RData::TXT(TXT::from_reason(reason)),
                    );
                    txt.set_dns_class(DNSClass::Unknown(self.config.validation_reason_qclass));
                    message.add_additional(txt);
                }
            }
        }

        message
    }
}

impl<H: DnsHandle> DnsHandle for ValidatingResolver<H> {
    fn send(&self, request: Message) -> DnsResponseFuture {
        let this = self.clone();
        async move { this.send_validated(request).await }.boxed()
    }
}

/// The outcome of one DS step in the chain walk
enum DsOutcome {
    /// A validated DS set, the link to the child zone's keys
    Link(SecRrset),
    /// The name is proven to not be a delegation point; descend further
    NotDelegation,
    /// The walk ends here with this entry
    Terminal(KeyEntry),
}

/// For messages that are not referrals, a forwarder that considers the
/// zone insecure may have inserted an unsigned NS RRset into the authority
/// section from its cache. The reply does not hinge on it, so drop it,
/// unless that would leave answer and authority empty.
fn remove_spurious_authority(response: &mut SecMessage) {
    if response.answers().is_empty() && response.authorities().len() == 1 {
        return;
    }

    response.authorities_mut().retain(|set| {
        let spurious = set.record_type() == RecordType::NS && set.sigs().is_empty();
        if spurious {
            trace!(
                "removing spurious unsigned NS rrset {}/{}",
                set.name(),
                set.dns_class()
            );
        }
        !spurious
    });
}

/// Flattens NSEC3 rrsets into (owner, rdata) pairs for the proof functions
fn nsec3_pairs(sets: &[SecRrset]) -> Vec<(Name, NSEC3)> {
    let mut pairs = Vec::new();
    for set in sets {
        for record in set.records() {
            if let RData::DNSSEC(DNSSECRData::NSEC3(nsec3_data)) = record.data() {
                pairs.push((record.name().clone(), nsec3_data.clone()));
            }
        }
    }

    pairs
}
