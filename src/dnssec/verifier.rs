// Copyright 2025-2026 the veridns authors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! RRSIG verification over canonical RRsets, RFC 4034 §3.1.8.1 and
//! RFC 4035 §5.3

use tracing::{debug, trace};

use crate::dnssec::key_cache::KeyEntry;
use crate::dnssec::public_key::PublicKey;
use crate::dnssec::rdata::{DNSKEY, DNSSECRData, RRSIG};
use crate::dnssec::srrset::SecRrset;
use crate::dnssec::{tbs, SecurityStatus, Verdict};
use crate::rr::rdata::EdeCode;
use crate::rr::RData;

/// Upper bound on RRSIGs considered per RRset; protects against KeyTrap
/// style resource-exhaustion responses
const MAX_RRSIGS_PER_RRSET: usize = 8;

/// Upper bound on DNSKEYs sharing one key tag that will be tried
const MAX_KEY_TAG_COLLISIONS: usize = 2;

/// RFC 1982 serial number comparison: a <= b in sequence space
fn serial_lte(a: u32, b: u32) -> bool {
    a == b || (b.wrapping_sub(a) as i32) > 0
}

/// Verifies the RRset against the given validated DNSKEY set.
///
/// Any one verifying RRSIG makes the set Secure; the set's status and TTL
/// are updated in place. Returns Bogus with the most informative EDE when
/// nothing verifies.
pub fn verify_srrset(set: &mut SecRrset, keys: &SecRrset, now: u32) -> Verdict {
    // within one response the same set may appear in several sections
    if set.status().is_secure() {
        return Verdict::secure();
    }

    if set.sigs().is_empty() {
        return Verdict::bogus(
            EdeCode::RrsigsMissing,
            format!("no signatures present for {}/{}", set.name(), set.record_type()),
        );
    }

    let mut worst = Verdict::bogus(
        EdeCode::DnssecBogus,
        format!("no valid signature found for {}/{}", set.name(), set.record_type()),
    );

    let sigs: Vec<_> = set.sigs().iter().take(MAX_RRSIGS_PER_RRSET).cloned().collect();
    for sig_record in &sigs {
        let RData::DNSSEC(DNSSECRData::RRSIG(rrsig)) = sig_record.data() else {
            continue;
        };

        match check_one_sig(set, rrsig, keys, now) {
            Ok(()) => {
                trace!(
                    "validated {}/{} with key tag {}",
                    set.name(),
                    set.record_type(),
                    rrsig.key_tag()
                );

                // cap the TTL at the original TTL and the remaining
                // signature lifetime, RFC 4035 section 5.3.3
                let remaining = rrsig.sig_expiration().wrapping_sub(now);
                let mut ttl = set.ttl().min(rrsig.original_ttl());
                if serial_lte(now, rrsig.sig_expiration()) {
                    ttl = ttl.min(remaining);
                }
                set.limit_ttl(ttl);
                set.set_status(SecurityStatus::Secure);
                return Verdict::secure();
            }
            Err(verdict) => {
                debug!(
                    "signature by key tag {} over {}/{} failed: {:?}",
                    rrsig.key_tag(),
                    set.name(),
                    set.record_type(),
                    verdict.reason
                );
                worst = verdict;
            }
        }
    }

    set.set_status(SecurityStatus::Bogus);
    worst
}

/// The RFC 4035 §5.3.1 validity checks for one RRSIG, then the signature
/// verification itself
fn check_one_sig(
    set: &SecRrset,
    rrsig: &RRSIG,
    keys: &SecRrset,
    now: u32,
) -> Result<(), Verdict> {
    // the RRSIG and the RRset must have the same owner name and class;
    // grouping guarantees the owner, the class is checked here
    if keys.dns_class() != set.dns_class() {
        return Err(Verdict::bogus(EdeCode::DnssecBogus, "rrsig class mismatch"));
    }

    // the signer must be the zone containing the RRset
    if !rrsig.signer_name().zone_of(set.name()) {
        return Err(Verdict::bogus(
            EdeCode::DnssecBogus,
            format!("signer {} cannot sign {}", rrsig.signer_name(), set.name()),
        ));
    }

    // the labels field must not exceed the owner's label count
    if rrsig.num_labels() > set.name().num_labels() {
        return Err(Verdict::bogus(
            EdeCode::DnssecBogus,
            "rrsig labels exceed owner labels",
        ));
    }

    // the validity window, compared in serial number arithmetic
    if !serial_lte(rrsig.sig_inception(), now) {
        return Err(Verdict::bogus(
            EdeCode::SignatureNotYetValid,
            format!("signature not yet valid until {}", rrsig.sig_inception()),
        ));
    }
    if !serial_lte(now, rrsig.sig_expiration()) {
        return Err(Verdict::bogus(
            EdeCode::SignatureExpired,
            format!("signature expired at {}", rrsig.sig_expiration()),
        ));
    }

    // the key: matched by footprint and algorithm, and it must be a zone key
    let mut candidates = 0_usize;
    let mut found_any = false;
    for key_record in keys.records() {
        let RData::DNSSEC(DNSSECRData::DNSKEY(dnskey)) = key_record.data() else {
            continue;
        };

        if dnskey.algorithm() != rrsig.algorithm() {
            continue;
        }
        let Ok(tag) = dnskey.calculate_key_tag() else {
            continue;
        };
        if tag != rrsig.key_tag() {
            continue;
        }

        found_any = true;
        if !dnskey.zone_key() || dnskey.revoke() {
            continue;
        }

        candidates += 1;
        if candidates > MAX_KEY_TAG_COLLISIONS {
            debug!("too many keys with tag {} in {}", tag, keys.name());
            break;
        }

        if verify_signature(set, rrsig, dnskey).is_ok() {
            return Ok(());
        }
    }

    if !found_any {
        return Err(Verdict::bogus(
            EdeCode::DnskeyMissing,
            format!(
                "no DNSKEY with tag {} and algorithm {} at {}",
                rrsig.key_tag(),
                rrsig.algorithm(),
                keys.name()
            ),
        ));
    }

    Err(Verdict::bogus(EdeCode::DnssecBogus, "signature mismatch"))
}

/// Verifies the signature bytes over the canonical signed stream
fn verify_signature(set: &SecRrset, rrsig: &RRSIG, dnskey: &DNSKEY) -> crate::error::DnsResult<()> {
    let signed_data = tbs::rrset_tbs(rrsig, set.rrset())?;
    PublicKey::new(dnskey.public_key(), dnskey.algorithm()).verify(&signed_data, rrsig.sig())
}

/// Whether any DS in the set uses an algorithm and digest this crate can
/// follow; an all-unsupported DS set makes the child zone Insecure
pub fn at_least_one_supported_algorithm(ds_set: &SecRrset) -> bool {
    ds_set.records().any(|record| match record.data() {
        RData::DNSSEC(DNSSECRData::DS(ds)) => {
            ds.algorithm().is_supported() && ds.digest_type().is_supported()
        }
        _ => false,
    })
}

/// Establishes trust in a freshly fetched DNSKEY RRset through the DS set
/// of the parent zone (RFC 4035 §5.2): some DS must match a secure entry
/// point key by tag, algorithm and digest, and that key must have signed
/// the DNSKEY RRset itself.
///
/// Returns a Good entry on success, otherwise a Bad entry carrying the
/// best justification.
pub fn verify_new_dnskeys(
    mut dnskey_set: SecRrset,
    ds_set: &SecRrset,
    bad_ttl: u32,
    now: u32,
) -> KeyEntry {
    let name = dnskey_set.name().clone();
    let dns_class = dnskey_set.dns_class();

    let mut matched_any_ds = false;
    let mut verified = false;

    'search: for ds_record in ds_set.records() {
        let RData::DNSSEC(DNSSECRData::DS(ds)) = ds_record.data() else {
            continue;
        };
        if !ds.algorithm().is_supported() || !ds.digest_type().is_supported() {
            continue;
        }

        let mut attempts = 0_usize;
        for key_record in dnskey_set.records() {
            let RData::DNSSEC(DNSSECRData::DNSKEY(dnskey)) = key_record.data() else {
                continue;
            };
            if dnskey.algorithm() != ds.algorithm() || !dnskey.zone_key() {
                continue;
            }
            if dnskey.calculate_key_tag().ok() != Some(ds.key_tag()) {
                continue;
            }

            attempts += 1;
            if attempts > MAX_KEY_TAG_COLLISIONS {
                break;
            }

            if !ds.covers(&name, dnskey).unwrap_or(false) {
                continue;
            }
            matched_any_ds = true;

            // the matched key must have self-signed the DNSKEY RRset
            for sig_record in dnskey_set.sigs().iter().take(MAX_RRSIGS_PER_RRSET) {
                let RData::DNSSEC(DNSSECRData::RRSIG(rrsig)) = sig_record.data() else {
                    continue;
                };
                if rrsig.key_tag() != ds.key_tag() || rrsig.algorithm() != ds.algorithm() {
                    continue;
                }
                if !serial_lte(rrsig.sig_inception(), now)
                    || !serial_lte(now, rrsig.sig_expiration())
                {
                    continue;
                }

                if verify_signature(&dnskey_set, rrsig, dnskey).is_ok() {
                    debug!(
                        "validated DNSKEY rrset for {name} with DS tag {}",
                        ds.key_tag()
                    );
                    verified = true;
                    break 'search;
                }
            }
        }
    }

    if verified {
        dnskey_set.set_status(SecurityStatus::Secure);
        return KeyEntry::good(dnskey_set);
    }

    let mut entry = KeyEntry::bad(name, dns_class, bad_ttl);
    if matched_any_ds {
        entry.set_bad_reason(
            EdeCode::DnssecBogus,
            "DNSKEY rrset was not self-signed by a DS-matched key",
        );
    } else {
        entry.set_bad_reason(
            EdeCode::DnskeyMissing,
            "no DNSKEY matched the DS rrset of the parent",
        );
    }

    entry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_arithmetic() {
        assert!(serial_lte(1, 2));
        assert!(serial_lte(5, 5));
        assert!(!serial_lte(2, 1));
        // wrap around the top of the sequence space
        assert!(serial_lte(0xFFFF_FFF0, 0x0000_0010));
        assert!(!serial_lte(0x0000_0010, 0xFFFF_FFF0));
    }
}
