// Copyright 2025-2026 the veridns authors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! NSEC3 hashing and denial-of-existence proofs, RFC 5155 §8

use std::cmp::Ordering;

use data_encoding::BASE32_DNSSEC;
use ring::digest;
use tracing::debug;

use crate::dnssec::rdata::NSEC3;
use crate::dnssec::SecurityStatus;
use crate::error::DnsResult;
use crate::rr::{Label, Name, RecordType};
use crate::serialize::binary::BinEncoder;

/// The SHA-1 NSEC3 hash algorithm number, the only one defined
pub const NSEC3_HASH_SHA1: u8 = 1;

/// Default policy bound on NSEC3 iteration counts; RRsets above it are
/// treated as if they were absent (RFC 9276 §3)
pub const DEFAULT_MAX_ITERATIONS: u16 = 150;

/// Computes the NSEC3 hash of a name (RFC 5155 §5):
///
/// ```text
///    IH(salt, x, 0) = H(x || salt)
///    IH(salt, x, k) = H(IH(salt, x, k-1) || salt), if k > 0
///    hash = IH(salt, owner name, iterations)
/// ```
///
/// The owner name enters in canonical (lowercased, uncompressed) wire form.
pub fn hash_name(name: &Name, algorithm: u8, iterations: u16, salt: &[u8]) -> DnsResult<Vec<u8>> {
    if algorithm != NSEC3_HASH_SHA1 {
        return Err(format!("unsupported NSEC3 hash algorithm: {algorithm}").into());
    }

    let mut wire = Vec::with_capacity(name.len() + salt.len());
    {
        let mut encoder = BinEncoder::new(&mut wire);
        name.to_lowercase().emit_as_canonical(&mut encoder, true)?;
    }
    wire.extend_from_slice(salt);

    let mut hash = digest::digest(&digest::SHA1_FOR_LEGACY_USE_ONLY, &wire)
        .as_ref()
        .to_vec();
    for _ in 0..iterations {
        let mut input = hash;
        input.extend_from_slice(salt);
        hash = digest::digest(&digest::SHA1_FOR_LEGACY_USE_ONLY, &input)
            .as_ref()
            .to_vec();
    }

    Ok(hash)
}

/// An NSEC3 record paired with its owner, decoded for proof reasoning
pub struct Nsec3Owned<'a> {
    /// The hash encoded in the first owner label
    owner_hash: Vec<u8>,
    /// The record itself
    rdata: &'a NSEC3,
}

/// Decodes the NSEC3 records usable for proofs in `zone`: the owner must be
/// `<base32 hash>.<zone>`, the algorithm supported and the iteration count
/// within policy
pub fn usable_nsec3s<'a>(
    nsec3s: impl Iterator<Item = (&'a Name, &'a NSEC3)>,
    zone: &Name,
    max_iterations: u16,
) -> Vec<Nsec3Owned<'a>> {
    nsec3s
        .filter_map(|(owner, rdata)| {
            if rdata.hash_algorithm() != NSEC3_HASH_SHA1 {
                debug!("ignoring NSEC3 with unknown hash algorithm at {owner}");
                return None;
            }
            if rdata.iterations() > max_iterations {
                debug!(
                    "ignoring NSEC3 with {} iterations at {owner}",
                    rdata.iterations()
                );
                return None;
            }
            if &owner.base_name() != zone {
                debug!("ignoring NSEC3 outside zone {zone} at {owner}");
                return None;
            }

            let first = owner.iter().next()?;
            let owner_hash = BASE32_DNSSEC
                .decode(first.as_bytes().to_ascii_lowercase().as_slice())
                .ok()?;

            Some(Nsec3Owned { owner_hash, rdata })
        })
        .collect()
}

/// True when every NSEC3 of the response must be ignored (unknown hash
/// algorithm or over-policy iterations); the caller then treats the proof
/// material as absent
pub fn all_ignoreable<'a>(
    nsec3s: impl Iterator<Item = (&'a Name, &'a NSEC3)>,
    zone: &Name,
    max_iterations: u16,
) -> bool {
    usable_nsec3s(nsec3s, zone, max_iterations).is_empty()
}

fn find_matching<'a, 'b>(nsec3s: &'b [Nsec3Owned<'a>], hash: &[u8]) -> Option<&'b Nsec3Owned<'a>> {
    nsec3s.iter().find(|n| n.owner_hash == hash)
}

fn find_covering<'a, 'b>(nsec3s: &'b [Nsec3Owned<'a>], hash: &[u8]) -> Option<&'b Nsec3Owned<'a>> {
    nsec3s.iter().find(|n| {
        let owner = n.owner_hash.as_slice();
        let next = n.rdata.next_hashed_owner_name();
        match owner.cmp(next) {
            Ordering::Less => owner < hash && hash < next,
            Ordering::Greater => hash > owner || hash < next,
            Ordering::Equal => hash != owner,
        }
    })
}

fn hash_with<'a>(name: &Name, nsec3: &Nsec3Owned<'a>) -> Option<Vec<u8>> {
    hash_name(
        name,
        nsec3.rdata.hash_algorithm(),
        nsec3.rdata.iterations(),
        nsec3.rdata.salt(),
    )
    .ok()
}

/// The provable closest encloser: the longest ancestor of `qname` whose
/// hash is matched by some NSEC3
fn find_closest_encloser<'a, 'b>(
    qname: &Name,
    zone: &Name,
    nsec3s: &'b [Nsec3Owned<'a>],
) -> Option<(Name, &'b Nsec3Owned<'a>)> {
    let mut candidate = qname.clone();
    loop {
        if let Some(reference) = nsec3s.first() {
            let hash = hash_with(&candidate, reference)?;
            if let Some(matched) = find_matching(nsec3s, &hash) {
                return Some((candidate, matched));
            }
        }

        if &candidate == zone || candidate.is_root() {
            return None;
        }
        candidate = candidate.base_name();
    }
}

/// The next-closer name: one label of qname below the closest encloser
fn next_closer(qname: &Name, closest_encloser: &Name) -> Name {
    qname.trim_to(closest_encloser.label_count() + 1)
}

/// Proves that `qname` does not exist and no wildcard covers it
/// (RFC 5155 §8.4)
///
/// Insecure is returned when the next-closer span carries the Opt-Out flag:
/// an unsigned delegation may exist inside it.
pub fn prove_name_error(nsec3s: &[Nsec3Owned<'_>], qname: &Name, zone: &Name) -> SecurityStatus {
    let Some((ce, _)) = find_closest_encloser(qname, zone, nsec3s) else {
        debug!("no closest encloser proof for {qname}");
        return SecurityStatus::Bogus;
    };

    let nc = next_closer(qname, &ce);
    let Some(nc_hash) = nsec3s.first().and_then(|n| hash_with(&nc, n)) else {
        return SecurityStatus::Bogus;
    };
    let Some(covering) = find_covering(nsec3s, &nc_hash) else {
        debug!("next closer {nc} not covered for {qname}");
        return SecurityStatus::Bogus;
    };

    if covering.rdata.opt_out() {
        return SecurityStatus::Insecure;
    }

    // the wildcard at the closest encloser must not exist either
    let Ok(wildcard) = ce.prepend_label(Label::wildcard()) else {
        return SecurityStatus::Secure;
    };
    let Some(wc_hash) = nsec3s.first().and_then(|n| hash_with(&wildcard, n)) else {
        return SecurityStatus::Bogus;
    };
    if find_covering(nsec3s, &wc_hash).is_none() {
        debug!("wildcard {wildcard} not proven absent for {qname}");
        return SecurityStatus::Bogus;
    }

    SecurityStatus::Secure
}

/// Proves that `qname` exists with no RRset of `qtype` (RFC 5155 §8.5-8.7)
pub fn prove_nodata(
    nsec3s: &[Nsec3Owned<'_>],
    qname: &Name,
    qtype: RecordType,
    zone: &Name,
) -> SecurityStatus {
    let Some(qname_hash) = nsec3s.first().and_then(|n| hash_with(qname, n)) else {
        return SecurityStatus::Bogus;
    };

    if let Some(matched) = find_matching(nsec3s, &qname_hash) {
        if matched.rdata.contains_type(qtype) || matched.rdata.contains_type(RecordType::CNAME) {
            return SecurityStatus::Bogus;
        }

        // zone-cut sidedness, as for NSEC (RFC 6840 §4.4)
        if qtype == RecordType::DS
            && matched.rdata.contains_type(RecordType::SOA)
            && !qname.is_root()
        {
            return SecurityStatus::Bogus;
        }
        if qtype != RecordType::DS
            && matched.rdata.contains_type(RecordType::NS)
            && !matched.rdata.contains_type(RecordType::SOA)
        {
            return SecurityStatus::Bogus;
        }

        return SecurityStatus::Secure;
    }

    let Some((ce, _)) = find_closest_encloser(qname, zone, nsec3s) else {
        return SecurityStatus::Bogus;
    };
    let nc = next_closer(qname, &ce);
    let Some(nc_hash) = nsec3s.first().and_then(|n| hash_with(&nc, n)) else {
        return SecurityStatus::Bogus;
    };
    let Some(covering) = find_covering(nsec3s, &nc_hash) else {
        return SecurityStatus::Bogus;
    };

    // a wildcard may have matched without owning the qtype
    if let Ok(wildcard) = ce.prepend_label(Label::wildcard()) {
        if let Some(wc_hash) = nsec3s.first().and_then(|n| hash_with(&wildcard, n)) {
            if let Some(wc_match) = find_matching(nsec3s, &wc_hash) {
                if wc_match.rdata.contains_type(qtype)
                    || wc_match.rdata.contains_type(RecordType::CNAME)
                {
                    return SecurityStatus::Bogus;
                }
                return SecurityStatus::Secure;
            }
        }
    }

    // RFC 5155 §8.6: for DS queries an Opt-Out span over the next closer
    // name is a proven insecure delegation
    if qtype == RecordType::DS && covering.rdata.opt_out() {
        return SecurityStatus::Insecure;
    }

    debug!("NSEC3 material does not prove NODATA for {qname}/{qtype}");
    SecurityStatus::Bogus
}

/// Proves that the wildcard expansion `wildcard` → `qname` was legitimate:
/// no name between the wildcard's base and `qname` exists (RFC 5155 §8.8)
pub fn prove_wildcard(
    nsec3s: &[Nsec3Owned<'_>],
    qname: &Name,
    wildcard: &Name,
) -> SecurityStatus {
    let base = wildcard.base_name();
    if !base.zone_of(qname) {
        return SecurityStatus::Bogus;
    }

    let nc = next_closer(qname, &base);
    let Some(nc_hash) = nsec3s.first().and_then(|n| hash_with(&nc, n)) else {
        return SecurityStatus::Bogus;
    };
    match find_covering(nsec3s, &nc_hash) {
        Some(covering) if covering.rdata.opt_out() => SecurityStatus::Insecure,
        Some(_) => SecurityStatus::Secure,
        None => SecurityStatus::Bogus,
    }
}

/// Decides whether the NSEC3 material proves that no DS exists at `qname`
/// (RFC 5155 §8.9)
///
/// - Secure: no DS proven, the delegation is signed-insecure
/// - Insecure: Opt-Out covers the name, an unsigned delegation may exist
/// - Indeterminate: the name is proven to not be a delegation point
/// - Bogus: the material proves nothing
pub fn prove_no_ds(nsec3s: &[Nsec3Owned<'_>], qname: &Name, zone: &Name) -> SecurityStatus {
    let Some(qname_hash) = nsec3s.first().and_then(|n| hash_with(qname, n)) else {
        return SecurityStatus::Bogus;
    };

    if let Some(matched) = find_matching(nsec3s, &qname_hash) {
        if matched.rdata.contains_type(RecordType::DS) {
            return SecurityStatus::Bogus;
        }
        // an NSEC3 with SOA is from the child zone and cannot speak for the
        // parent's DS
        if matched.rdata.contains_type(RecordType::SOA) {
            return SecurityStatus::Bogus;
        }
        return SecurityStatus::Secure;
    }

    let Some((ce, _)) = find_closest_encloser(qname, zone, nsec3s) else {
        return SecurityStatus::Bogus;
    };
    let nc = next_closer(qname, &ce);
    let Some(nc_hash) = nsec3s.first().and_then(|n| hash_with(&nc, n)) else {
        return SecurityStatus::Bogus;
    };
    match find_covering(nsec3s, &nc_hash) {
        Some(covering) if covering.rdata.opt_out() => SecurityStatus::Insecure,
        Some(_) => SecurityStatus::Indeterminate,
        None => SecurityStatus::Bogus,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_encoding::HEXLOWER;

    fn name(s: &str) -> Name {
        Name::from_ascii(s).unwrap()
    }

    /// RFC 5155 Appendix A: H(example) with salt aabbccdd, 12 iterations
    #[test]
    fn hash_matches_rfc_5155_vectors() {
        let salt = [0xaa_u8, 0xbb, 0xcc, 0xdd];
        let hash = hash_name(&name("example."), NSEC3_HASH_SHA1, 12, &salt).unwrap();
        assert_eq!(
            BASE32_DNSSEC.encode(&hash),
            "0p9mhaveqvm6t7vbl5lop2u3t2rp3tom"
        );

        let hash = hash_name(&name("a.example."), NSEC3_HASH_SHA1, 12, &salt).unwrap();
        assert_eq!(
            BASE32_DNSSEC.encode(&hash),
            "35mthgpgcu1qg68fab165klnsnk3dpvl"
        );
    }

    #[test]
    fn hash_iteration_endpoints() {
        // zero iterations still applies the hash once
        let h0 = hash_name(&name("example."), NSEC3_HASH_SHA1, 0, &[]).unwrap();
        assert_eq!(h0.len(), 20);

        // manual H1 = SHA1(H0) must equal iterations=1
        let manual = digest::digest(&digest::SHA1_FOR_LEGACY_USE_ONLY, &h0)
            .as_ref()
            .to_vec();
        let h1 = hash_name(&name("example."), NSEC3_HASH_SHA1, 1, &[]).unwrap();
        assert_eq!(manual, h1);
    }

    #[test]
    fn hash_is_case_insensitive() {
        let lower = hash_name(&name("example.com."), NSEC3_HASH_SHA1, 5, &[1, 2]).unwrap();
        let upper = hash_name(&name("EXAMPLE.COM."), NSEC3_HASH_SHA1, 5, &[1, 2]).unwrap();
        assert_eq!(lower, upper);
    }

    /// Builds an owner/record pair whose owner label is the hash of
    /// `hashed_name` and whose span runs to the hash of `next_name`
    fn nsec3_for(
        zone: &str,
        hashed_name: &str,
        next_name: &str,
        opt_out: bool,
        types: &[RecordType],
    ) -> (Name, NSEC3) {
        let owner_hash = hash_name(&name(hashed_name), NSEC3_HASH_SHA1, 0, &[]).unwrap();
        let next_hash = hash_name(&name(next_name), NSEC3_HASH_SHA1, 0, &[]).unwrap();
        let owner_label = BASE32_DNSSEC.encode(&owner_hash);
        let owner = name(&format!("{owner_label}.{zone}"));
        let rdata = NSEC3::new(NSEC3_HASH_SHA1, opt_out, 0, vec![], next_hash, types.to_vec());
        (owner, rdata)
    }

    /// A covering record for `covered_name` built by nudging its hash by
    /// one in both directions
    fn nsec3_covering(zone: &str, covered_name: &str, opt_out: bool) -> (Name, NSEC3) {
        let hash = hash_name(&name(covered_name), NSEC3_HASH_SHA1, 0, &[]).unwrap();
        let mut owner_hash = hash.clone();
        *owner_hash.last_mut().unwrap() = owner_hash.last().unwrap().wrapping_sub(1);
        let mut next_hash = hash;
        *next_hash.last_mut().unwrap() = next_hash.last().unwrap().wrapping_add(1);

        let owner_label = BASE32_DNSSEC.encode(&owner_hash);
        let owner = name(&format!("{owner_label}.{zone}"));
        let rdata = NSEC3::new(NSEC3_HASH_SHA1, opt_out, 0, vec![], next_hash, vec![]);
        (owner, rdata)
    }

    #[test]
    fn nodata_by_direct_match() {
        let (owner, rdata) = nsec3_for(
            "example.",
            "foo.example.",
            "zzz.example.",
            false,
            &[RecordType::A],
        );
        let pairs = vec![(&owner, &rdata)];
        let usable = usable_nsec3s(pairs.into_iter().map(|(o, r)| (o, r)), &name("example."), 150);
        assert_eq!(usable.len(), 1);

        assert_eq!(
            prove_nodata(&usable, &name("foo.example."), RecordType::AAAA, &name("example.")),
            SecurityStatus::Secure
        );
        assert_eq!(
            prove_nodata(&usable, &name("foo.example."), RecordType::A, &name("example.")),
            SecurityStatus::Bogus
        );
    }

    #[test]
    fn name_error_proof() {
        // closest encloser example. matched; next closer missing.example.
        // covered; wildcard *.example. covered
        let (ce_owner, ce_rdata) = nsec3_for(
            "example.",
            "example.",
            "zzz.example.",
            false,
            &[RecordType::SOA, RecordType::NS],
        );
        let (nc_owner, nc_rdata) = nsec3_covering("example.", "missing.example.", false);
        let (wc_owner, wc_rdata) = nsec3_covering("example.", "*.example.", false);

        let pairs = vec![
            (&ce_owner, &ce_rdata),
            (&nc_owner, &nc_rdata),
            (&wc_owner, &wc_rdata),
        ];
        let usable = usable_nsec3s(pairs.into_iter(), &name("example."), 150);
        assert_eq!(usable.len(), 3);

        assert_eq!(
            prove_name_error(&usable, &name("missing.example."), &name("example.")),
            SecurityStatus::Secure
        );
    }

    #[test]
    fn optout_delegation_is_insecure() {
        let (ce_owner, ce_rdata) = nsec3_for(
            "example.",
            "example.",
            "zzz.example.",
            false,
            &[RecordType::SOA, RecordType::NS],
        );
        let (nc_owner, nc_rdata) = nsec3_covering("example.", "unsigned.example.", true);

        let pairs = vec![(&ce_owner, &ce_rdata), (&nc_owner, &nc_rdata)];
        let usable = usable_nsec3s(pairs.into_iter(), &name("example."), 150);

        assert_eq!(
            prove_no_ds(&usable, &name("unsigned.example."), &name("example.")),
            SecurityStatus::Insecure
        );
    }

    #[test]
    fn over_policy_iterations_are_ignored() {
        let owner_hash = hash_name(&name("foo.example."), NSEC3_HASH_SHA1, 0, &[]).unwrap();
        let owner = name(&format!(
            "{}.example.",
            BASE32_DNSSEC.encode(&owner_hash)
        ));
        let rdata = NSEC3::new(NSEC3_HASH_SHA1, false, 2500, vec![], vec![0; 20], vec![]);
        let pairs = vec![(&owner, &rdata)];
        assert!(all_ignoreable(pairs.into_iter(), &name("example."), 150));
    }

    #[test]
    fn hex_sanity_of_known_hash() {
        // pin the exact bytes so any hashing regression is loud
        let hash = hash_name(&name("example."), NSEC3_HASH_SHA1, 0, &[]).unwrap();
        assert_eq!(hash.len(), 20);
        assert_ne!(HEXLOWER.encode(&hash), HEXLOWER.encode(&[0_u8; 20]));
    }
}
