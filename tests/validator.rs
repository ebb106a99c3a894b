// Copyright 2025-2026 the veridns authors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! End-to-end validation scenarios: a scripted upstream, real signatures,
//! a pinned clock.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use data_encoding::BASE32_DNSSEC;
use futures_executor::block_on;
use futures_util::FutureExt;
use ring::rand::SystemRandom;
use ring::signature::{EcdsaKeyPair, KeyPair, ECDSA_P256_SHA256_FIXED_SIGNING};

use veridns::dnssec::rdata::{DNSSECRData, DNSKEY, NSEC, NSEC3, RRSIG};
use veridns::dnssec::{nsec3, tbs, Algorithm, TrustAnchorStore, ValidatingResolver, ValidatorConfig};
use veridns::error::DnsError;
use veridns::op::{Message, Query, ResponseCode};
use veridns::rr::rdata::{A, EdeCode, EdnsCode, EdnsOption};
use veridns::rr::{DNSClass, Name, RData, Record, RecordSet, RecordType};
use veridns::runtime::FixedClock;
use veridns::xfer::{DnsHandle, DnsResponseFuture};

/// The validation instant every scenario is pinned to
const NOW: u32 = 1_700_000_000;

fn name(s: &str) -> Name {
    Name::from_ascii(s).unwrap()
}

/// A zone key that can produce real RRSIGs
struct Signer {
    keypair: EcdsaKeyPair,
    rng: SystemRandom,
    zone: Name,
    dnskey: DNSKEY,
    key_tag: u16,
}

impl Signer {
    fn new(zone: &str) -> Self {
        let rng = SystemRandom::new();
        let pkcs8 = EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, &rng).unwrap();
        let keypair =
            EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, pkcs8.as_ref(), &rng)
                .unwrap();

        // ring emits the uncompressed point; the DNSKEY form drops the 0x04
        let public = keypair.public_key().as_ref()[1..].to_vec();
        let dnskey = DNSKEY::new(true, true, Algorithm::ECDSAP256SHA256, public);
        let key_tag = dnskey.calculate_key_tag().unwrap();

        Self {
            keypair,
            rng,
            zone: name(zone),
            dnskey,
            key_tag,
        }
    }

    /// Signs the RRset in place, attaching one valid RRSIG
    fn sign(&self, set: &mut RecordSet) {
        let rrsig = RRSIG::new(
            set.record_type(),
            Algorithm::ECDSAP256SHA256,
            set.name().num_labels(),
            set.ttl(),
            NOW + 86_400,
            NOW - 86_400,
            self.key_tag,
            self.zone.clone(),
            Vec::new(),
        );

        let signed_data = tbs::rrset_tbs(&rrsig, set).unwrap();
        let signature = self
            .keypair
            .sign(&self.rng, &signed_data)
            .unwrap()
            .as_ref()
            .to_vec();

        let rrsig = RRSIG::new(
            set.record_type(),
            Algorithm::ECDSAP256SHA256,
            set.name().num_labels(),
            set.ttl(),
            NOW + 86_400,
            NOW - 86_400,
            self.key_tag,
            self.zone.clone(),
            signature,
        );

        let owner = set.name().clone();
        let ttl = set.ttl();
        set.add(Record::from_rdata(
            owner,
            ttl,
            RData::DNSSEC(DNSSECRData::RRSIG(rrsig)),
        ))
        .unwrap();
    }

    /// The DNSKEY RRset of the zone, unsigned
    fn dnskey_rrset(&self) -> RecordSet {
        let mut set = RecordSet::new(self.zone.clone(), RecordType::DNSKEY, DNSClass::IN);
        set.add(Record::from_rdata(
            self.zone.clone(),
            3600,
            RData::DNSSEC(DNSSECRData::DNSKEY(self.dnskey.clone())),
        ))
        .unwrap();
        set
    }

    /// The self-signed DNSKEY response for the zone
    fn dnskey_response(&self) -> Message {
        let mut set = self.dnskey_rrset();
        self.sign(&mut set);
        response_with_answer(&self.zone, RecordType::DNSKEY, set)
    }
}

/// An upstream scripted with canned responses per (name, type)
#[derive(Clone)]
struct MockHandle {
    responses: Arc<HashMap<(Name, RecordType), Message>>,
}

impl MockHandle {
    fn new(responses: HashMap<(Name, RecordType), Message>) -> Self {
        Self {
            responses: Arc::new(responses),
        }
    }
}

impl DnsHandle for MockHandle {
    fn send(&self, request: Message) -> DnsResponseFuture {
        let responses = Arc::clone(&self.responses);
        async move {
            let query = request
                .query()
                .cloned()
                .ok_or_else(|| DnsError::from("mock received a request without a question"))?;

            let mut response = responses
                .get(&(query.name().clone(), query.query_type()))
                .cloned()
                .unwrap_or_else(|| Message::error_from(&request, ResponseCode::Refused));
            response.set_id(request.id());
            response.header_mut().set_response(true);
            Ok(response)
        }
        .boxed()
    }
}

fn response_with_answer(qname: &Name, qtype: RecordType, set: RecordSet) -> Message {
    let mut message = Message::new();
    message.header_mut().set_response(true);
    message.add_query(Query::query(qname.clone(), qtype));
    for record in set.records_with_sigs() {
        message.add_answer(record.clone());
    }
    message
}

fn add_authority_set(message: &mut Message, set: &RecordSet) {
    for record in set.records_with_sigs() {
        message.add_authority(record.clone());
    }
}

fn resolver_for(
    signer_of_anchor: &Signer,
    responses: HashMap<(Name, RecordType), Message>,
) -> ValidatingResolver<MockHandle> {
    let mut anchors = TrustAnchorStore::new();
    anchors.store(signer_of_anchor.dnskey_rrset()).unwrap();

    ValidatingResolver::with_parts(
        MockHandle::new(responses),
        anchors,
        Arc::new(FixedClock(NOW)),
        ValidatorConfig::default(),
    )
}

fn query_for(qname: &str, qtype: RecordType) -> Message {
    Message::new_query(Query::query(name(qname), qtype))
}

fn ede_of(message: &Message) -> Option<EdeCode> {
    match message.edns()?.option(EdnsCode::Ede)? {
        EdnsOption::Ede(ede) => Some(ede.info_code),
        _ => None,
    }
}

fn reason_txt(message: &Message) -> Option<&Record> {
    message.additionals().iter().find(|r| {
        r.record_type() == RecordType::TXT && r.dns_class() == DNSClass::Unknown(65280)
    })
}

/// A signed A record under a trust anchor for the zone validates and gets
/// the AD bit
#[test]
fn secure_positive_answer() {
    let signer = Signer::new("example.");

    let mut a_set = RecordSet::new(name("foo.example."), RecordType::A, DNSClass::IN);
    a_set
        .add(Record::from_rdata(
            name("foo.example."),
            3600,
            RData::A(A::from_str("192.0.2.1").unwrap()),
        ))
        .unwrap();
    signer.sign(&mut a_set);

    let mut responses = HashMap::new();
    responses.insert(
        (name("foo.example."), RecordType::A),
        response_with_answer(&name("foo.example."), RecordType::A, a_set),
    );
    responses.insert((name("example."), RecordType::DNSKEY), signer.dnskey_response());

    let resolver = resolver_for(&signer, responses);
    let response = block_on(resolver.send_validated(query_for("foo.example.", RecordType::A))).unwrap();

    assert_eq!(response.response_code(), ResponseCode::NoError);
    assert!(response.header().authentic_data());
    assert!(ede_of(&response).is_none());
    assert!(response
        .answers()
        .iter()
        .any(|r| r.record_type() == RecordType::A));
}

/// Flipping one bit of the signature turns the response into SERVFAIL with
/// the DNSSEC Bogus extended error and the reason TXT record
#[test]
fn bogus_signature_servfails() {
    let signer = Signer::new("example.");

    let mut a_set = RecordSet::new(name("foo.example."), RecordType::A, DNSClass::IN);
    a_set
        .add(Record::from_rdata(
            name("foo.example."),
            3600,
            RData::A(A::from_str("192.0.2.1").unwrap()),
        ))
        .unwrap();
    signer.sign(&mut a_set);

    // corrupt the signature
    let mut message = response_with_answer(&name("foo.example."), RecordType::A, a_set);
    let answers = message.take_answers();
    for mut record in answers {
        if let RData::DNSSEC(DNSSECRData::RRSIG(rrsig)) = record.data() {
            let mut sig = rrsig.sig().to_vec();
            sig[0] ^= 0x01;
            let broken = RRSIG::new(
                rrsig.type_covered(),
                rrsig.algorithm(),
                rrsig.num_labels(),
                rrsig.original_ttl(),
                rrsig.sig_expiration(),
                rrsig.sig_inception(),
                rrsig.key_tag(),
                rrsig.signer_name().clone(),
                sig,
            );
            record = Record::from_rdata(
                record.name().clone(),
                record.ttl(),
                RData::DNSSEC(DNSSECRData::RRSIG(broken)),
            );
        }
        message.add_answer(record);
    }

    let mut responses = HashMap::new();
    responses.insert((name("foo.example."), RecordType::A), message);
    responses.insert((name("example."), RecordType::DNSKEY), signer.dnskey_response());

    let resolver = resolver_for(&signer, responses);
    let response = block_on(resolver.send_validated(query_for("foo.example.", RecordType::A))).unwrap();

    assert_eq!(response.response_code(), ResponseCode::ServFail);
    assert!(!response.header().authentic_data());
    assert_eq!(ede_of(&response), Some(EdeCode::DnssecBogus));
    assert!(reason_txt(&response).is_some());
}

/// An unsigned answer below a delegation proven DS-less is Insecure: the
/// response passes through unchanged, AD stays clear
#[test]
fn insecure_delegation_passes_through() {
    let root = Signer::new(".");

    // the unsigned answer
    let mut a_set = RecordSet::new(name("www.insecure.example."), RecordType::A, DNSClass::IN);
    a_set
        .add(Record::from_rdata(
            name("www.insecure.example."),
            3600,
            RData::A(A::from_str("192.0.2.7").unwrap()),
        ))
        .unwrap();

    // the parent's proof that example. has no DS: an NSEC at the name with
    // only NS in the bitmap
    let mut nsec_set = RecordSet::new(name("example."), RecordType::NSEC, DNSClass::IN);
    nsec_set
        .add(Record::from_rdata(
            name("example."),
            3600,
            RData::DNSSEC(DNSSECRData::NSEC(NSEC::new(
                name("zzz."),
                vec![RecordType::NS],
            ))),
        ))
        .unwrap();
    root.sign(&mut nsec_set);

    let mut ds_response = Message::new();
    ds_response.header_mut().set_response(true);
    ds_response.add_query(Query::query(name("example."), RecordType::DS));
    add_authority_set(&mut ds_response, &nsec_set);

    let mut responses = HashMap::new();
    responses.insert(
        (name("www.insecure.example."), RecordType::A),
        response_with_answer(&name("www.insecure.example."), RecordType::A, a_set),
    );
    responses.insert((name("."), RecordType::DNSKEY), root.dnskey_response());
    responses.insert((name("example."), RecordType::DS), ds_response);

    let resolver = resolver_for(&root, responses);
    let response = block_on(resolver.send_validated(query_for(
        "www.insecure.example.",
        RecordType::A,
    )))
    .unwrap();

    assert_eq!(response.response_code(), ResponseCode::NoError);
    assert!(!response.header().authentic_data());
    assert!(ede_of(&response).is_none());
    assert!(response
        .answers()
        .iter()
        .any(|r| r.record_type() == RecordType::A));
}

/// NXDOMAIN with one NSEC covering the name and one covering the wildcard
/// validates with AD
#[test]
fn nxdomain_with_nsec_proofs() {
    let signer = Signer::new("example.");

    // covers missing.example.
    let mut covering = RecordSet::new(name("lll.example."), RecordType::NSEC, DNSClass::IN);
    covering
        .add(Record::from_rdata(
            name("lll.example."),
            3600,
            RData::DNSSEC(DNSSECRData::NSEC(NSEC::new(
                name("nnn.example."),
                vec![RecordType::A],
            ))),
        ))
        .unwrap();
    signer.sign(&mut covering);

    // covers *.example.
    let mut wildcard = RecordSet::new(name("example."), RecordType::NSEC, DNSClass::IN);
    wildcard
        .add(Record::from_rdata(
            name("example."),
            3600,
            RData::DNSSEC(DNSSECRData::NSEC(NSEC::new(
                name("aaa.example."),
                vec![RecordType::SOA, RecordType::NS],
            ))),
        ))
        .unwrap();
    signer.sign(&mut wildcard);

    let mut message = Message::new();
    message.header_mut().set_response(true);
    message.header_mut().set_response_code(ResponseCode::NXDomain);
    message.add_query(Query::query(name("missing.example."), RecordType::A));
    add_authority_set(&mut message, &covering);
    add_authority_set(&mut message, &wildcard);

    let mut responses = HashMap::new();
    responses.insert((name("missing.example."), RecordType::A), message);
    responses.insert((name("example."), RecordType::DNSKEY), signer.dnskey_response());

    let resolver = resolver_for(&signer, responses);
    let response =
        block_on(resolver.send_validated(query_for("missing.example.", RecordType::A))).unwrap();

    assert_eq!(response.response_code(), ResponseCode::NXDomain);
    assert!(response.header().authentic_data());
}

/// NODATA proven by an NSEC3 whose owner hash matches the qname and whose
/// bitmap lacks the qtype validates with AD
#[test]
fn nodata_with_nsec3_proof() {
    let signer = Signer::new("example.");

    let qname = name("foo.example.");
    let hash = nsec3::hash_name(&qname, nsec3::NSEC3_HASH_SHA1, 0, &[]).unwrap();
    let owner = name(&format!("{}.example.", BASE32_DNSSEC.encode(&hash)));

    let mut nsec3_set = RecordSet::new(owner.clone(), RecordType::NSEC3, DNSClass::IN);
    nsec3_set
        .add(Record::from_rdata(
            owner,
            3600,
            RData::DNSSEC(DNSSECRData::NSEC3(NSEC3::new(
                nsec3::NSEC3_HASH_SHA1,
                false,
                0,
                Vec::new(),
                vec![0xFF; 20],
                vec![RecordType::A, RecordType::RRSIG],
            ))),
        ))
        .unwrap();
    signer.sign(&mut nsec3_set);

    let mut message = Message::new();
    message.header_mut().set_response(true);
    message.add_query(Query::query(qname.clone(), RecordType::AAAA));
    add_authority_set(&mut message, &nsec3_set);

    let mut responses = HashMap::new();
    responses.insert((qname.clone(), RecordType::AAAA), message);
    responses.insert((name("example."), RecordType::DNSKEY), signer.dnskey_response());

    let resolver = resolver_for(&signer, responses);
    let response =
        block_on(resolver.send_validated(query_for("foo.example.", RecordType::AAAA))).unwrap();

    assert_eq!(response.response_code(), ResponseCode::NoError);
    assert!(response.header().authentic_data());
}

/// A signed CNAME whose target is proven non-existent yields a validated
/// NXDOMAIN
#[test]
fn cname_chain_into_nxdomain() {
    let signer = Signer::new("example.");

    let mut cname_set = RecordSet::new(name("alias.example."), RecordType::CNAME, DNSClass::IN);
    cname_set
        .add(Record::from_rdata(
            name("alias.example."),
            3600,
            RData::CNAME(name("target.example.")),
        ))
        .unwrap();
    signer.sign(&mut cname_set);

    // covers target.example.
    let mut covering = RecordSet::new(name("sss.example."), RecordType::NSEC, DNSClass::IN);
    covering
        .add(Record::from_rdata(
            name("sss.example."),
            3600,
            RData::DNSSEC(DNSSECRData::NSEC(NSEC::new(
                name("uuu.example."),
                vec![RecordType::A],
            ))),
        ))
        .unwrap();
    signer.sign(&mut covering);

    // covers *.example.
    let mut wildcard = RecordSet::new(name("example."), RecordType::NSEC, DNSClass::IN);
    wildcard
        .add(Record::from_rdata(
            name("example."),
            3600,
            RData::DNSSEC(DNSSECRData::NSEC(NSEC::new(
                name("aaa.example."),
                vec![RecordType::SOA, RecordType::NS],
            ))),
        ))
        .unwrap();
    signer.sign(&mut wildcard);

    let mut message = Message::new();
    message.header_mut().set_response(true);
    message.header_mut().set_response_code(ResponseCode::NXDomain);
    message.add_query(Query::query(name("alias.example."), RecordType::A));
    for record in cname_set.records_with_sigs() {
        message.add_answer(record.clone());
    }
    add_authority_set(&mut message, &covering);
    add_authority_set(&mut message, &wildcard);

    let mut responses = HashMap::new();
    responses.insert((name("alias.example."), RecordType::A), message);
    responses.insert((name("example."), RecordType::DNSKEY), signer.dnskey_response());

    let resolver = resolver_for(&signer, responses);
    let response =
        block_on(resolver.send_validated(query_for("alias.example.", RecordType::A))).unwrap();

    assert_eq!(response.response_code(), ResponseCode::NXDomain);
    assert!(response.header().authentic_data());
    assert!(response
        .answers()
        .iter()
        .any(|r| r.record_type() == RecordType::CNAME));
}

/// A query arriving with CD set bypasses validation entirely
#[test]
fn checking_disabled_bypasses_validation() {
    let signer = Signer::new("example.");

    // an unsigned answer that would otherwise be insecure or bogus
    let mut a_set = RecordSet::new(name("foo.example."), RecordType::A, DNSClass::IN);
    a_set
        .add(Record::from_rdata(
            name("foo.example."),
            3600,
            RData::A(A::from_str("192.0.2.1").unwrap()),
        ))
        .unwrap();

    let mut responses = HashMap::new();
    responses.insert(
        (name("foo.example."), RecordType::A),
        response_with_answer(&name("foo.example."), RecordType::A, a_set),
    );

    let resolver = resolver_for(&signer, responses);
    let mut query = query_for("foo.example.", RecordType::A);
    query.header_mut().set_checking_disabled(true);

    let response = block_on(resolver.send_validated(query)).unwrap();
    assert_eq!(response.response_code(), ResponseCode::NoError);
    assert!(!response.header().authentic_data());
    assert_eq!(response.answers().len(), 1);
}
