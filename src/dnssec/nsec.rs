// Copyright 2025-2026 the veridns authors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! NSEC denial-of-existence proof primitives, RFC 4035 §5.4 with the
//! clarifications of RFC 6840.

use std::cmp::Ordering;

use crate::dnssec::rdata::NSEC;
use crate::error::DnsResult;
use crate::rr::{Label, Name, RecordType};

/// The outcome of an NSEC NODATA check: whether it proves NODATA and, when
/// a wildcard NSEC was used, the wildcard owner that matched
#[derive(Clone, Debug, Default)]
pub struct NsecNodata {
    /// The NSEC proves that the qname has no RRset of the qtype
    pub proven: bool,
    /// The base of the wildcard NSEC used, i.e. the closest encloser the
    /// proof asserts; a separate name-error NSEC must confirm it
    pub wildcard_base: Option<Name>,
}

/// True when `name` falls strictly between `owner` and `next` in canonical
/// order, with wrap-around at the zone apex
fn covers(owner: &Name, next: &Name, name: &Name) -> bool {
    match owner.cmp(next) {
        // normal span
        Ordering::Less => owner < name && name < next,
        // wrap-around: next is the apex, everything after owner is covered
        Ordering::Greater => name > owner || name < next,
        // single-name zone: everything but the owner itself is covered
        Ordering::Equal => name != owner,
    }
}

/// Determines whether the NSEC at `owner` proves that `qname` does not
/// exist (RFC 4035 §5.4)
pub fn proves_name_error(owner: &Name, nsec: &NSEC, qname: &Name) -> bool {
    let next = nsec.next_domain_name();

    if owner == qname {
        return false;
    }

    if owner.zone_of(qname) {
        // an ancestor delegation or DNAME means qname may exist in a child
        // zone this NSEC knows nothing about (RFC 6840 §4.1)
        if nsec.contains_type(RecordType::DNAME) {
            return false;
        }
        if nsec.contains_type(RecordType::NS) && !nsec.contains_type(RecordType::SOA) {
            return false;
        }
    }

    // a next name below qname makes qname an existing empty non-terminal
    if qname.zone_of(next) && qname != next {
        return false;
    }

    covers(owner, next, qname)
}

/// Determines whether the NSEC at `owner` proves that `qname` exists but
/// has no RRset of type `qtype` (RFC 4035 §3.1.3.1, RFC 6840 §4.3)
pub fn proves_nodata(owner: &Name, nsec: &NSEC, qname: &Name, qtype: RecordType) -> NsecNodata {
    let mut result = NsecNodata::default();

    if owner != qname {
        // empty non-terminal: the next name is below qname, so qname exists
        // without any RRsets at all
        let next = nsec.next_domain_name();
        if qname.zone_of(next) && qname != next {
            result.proven = true;
            return result;
        }

        // wildcard NODATA: the answer was synthesized from this wildcard
        // and the wildcard has no RRset of the qtype
        if owner.is_wildcard() && owner.base_name().zone_of(qname) {
            if nsec.contains_type(qtype) || nsec.contains_type(RecordType::CNAME) {
                return result;
            }
            result.proven = true;
            result.wildcard_base = Some(owner.base_name());
            return result;
        }

        return result;
    }

    // exact match on the qname
    if nsec.contains_type(qtype) || nsec.contains_type(RecordType::CNAME) {
        return result;
    }

    // RFC 6840 §4.4: an NSEC from the child side of a zone cut (it has SOA)
    // cannot prove the absence of DS in the parent
    if qtype == RecordType::DS && nsec.contains_type(RecordType::SOA) && !qname.is_root() {
        return result;
    }

    // and for other types, an NSEC from the parent side of a cut (NS
    // without SOA) speaks only about the delegation, not the child data
    if qtype != RecordType::DS
        && nsec.contains_type(RecordType::NS)
        && !nsec.contains_type(RecordType::SOA)
    {
        return result;
    }

    result.proven = true;
    result
}

/// The closest encloser of `qname` provable from the NSEC at `owner`: the
/// longest ancestor of `qname` shared with either the owner or the next
/// name (RFC 5155 terminology, applicable to NSEC reasoning as well)
pub fn closest_encloser(qname: &Name, owner: &Name, next: &Name) -> Name {
    let a = common_ancestor(qname, owner);
    let b = common_ancestor(qname, next);
    if a.label_count() >= b.label_count() { a } else { b }
}

fn common_ancestor(a: &Name, b: &Name) -> Name {
    let mut candidate = a.clone();
    loop {
        if candidate.zone_of(b) {
            return candidate;
        }
        if candidate.is_root() {
            return Name::root();
        }
        candidate = candidate.base_name();
    }
}

/// The wildcard whose expansion the NSEC allows for `qname`:
/// `*.<closest encloser>`
///
/// Fails with `DomainNameTooLong` only when qname sits at the owner or
/// next name itself, which a prior name-error proof excludes.
pub fn nsec_wildcard(qname: &Name, owner: &Name, nsec: &NSEC) -> DnsResult<Name> {
    let ce = closest_encloser(qname, owner, nsec.next_domain_name());
    ce.prepend_label(Label::wildcard())
}

/// Determines whether the NSEC at `owner` proves that no wildcard could
/// have synthesized `qname`
pub fn proves_no_wildcard(owner: &Name, nsec: &NSEC, qname: &Name) -> bool {
    let ce = closest_encloser(qname, owner, nsec.next_domain_name());
    match ce.prepend_label(Label::wildcard()) {
        Ok(wildcard) => proves_name_error(owner, nsec, &wildcard),
        // an impossible wildcard owner cannot exist, the claim holds
        Err(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> Name {
        Name::from_ascii(s).unwrap()
    }

    fn nsec(next: &str, types: &[RecordType]) -> NSEC {
        NSEC::new(name(next), types.to_vec())
    }

    #[test]
    fn name_error_covering() {
        // alpha.example. NSEC delta.example. covers beta.example.
        let owner = name("alpha.example.");
        let rec = nsec("delta.example.", &[RecordType::A]);
        assert!(proves_name_error(&owner, &rec, &name("beta.example.")));
        assert!(!proves_name_error(&owner, &rec, &name("alpha.example.")));
        assert!(!proves_name_error(&owner, &rec, &name("zeta.example.")));
    }

    #[test]
    fn name_error_wraparound() {
        // the last NSEC of the zone points back to the apex
        let owner = name("zebra.example.");
        let rec = nsec("example.", &[RecordType::A]);
        assert!(proves_name_error(&owner, &rec, &name("zzz.example.")));
        assert!(!proves_name_error(&owner, &rec, &name("apple.example.")));
    }

    #[test]
    fn name_error_rejects_ent() {
        // next name below qname: qname is an empty non-terminal, it exists
        let owner = name("alpha.example.");
        let rec = nsec("www.ent.example.", &[RecordType::A]);
        assert!(!proves_name_error(&owner, &rec, &name("ent.example.")));
    }

    #[test]
    fn name_error_rejects_parent_delegation() {
        // an NSEC at a delegation point cannot deny names in the child zone
        let owner = name("child.example.");
        let rec = nsec("zulu.example.", &[RecordType::NS]);
        assert!(!proves_name_error(&owner, &rec, &name("www.child.example.")));
    }

    #[test]
    fn nodata_exact_match() {
        let owner = name("foo.example.");
        let rec = nsec("zzz.example.", &[RecordType::A, RecordType::MX]);
        assert!(proves_nodata(&owner, &rec, &name("foo.example."), RecordType::AAAA).proven);
        assert!(!proves_nodata(&owner, &rec, &name("foo.example."), RecordType::A).proven);
        // CNAME in the bitmap forbids any nodata conclusion
        let rec = nsec("zzz.example.", &[RecordType::CNAME]);
        assert!(!proves_nodata(&owner, &rec, &name("foo.example."), RecordType::AAAA).proven);
    }

    #[test]
    fn nodata_wildcard() {
        let owner = name("*.example.");
        let rec = nsec("zzz.example.", &[RecordType::A]);
        let result = proves_nodata(&owner, &rec, &name("foo.example."), RecordType::AAAA);
        assert!(result.proven);
        assert_eq!(result.wildcard_base.unwrap(), name("example."));
    }

    #[test]
    fn nodata_ds_needs_parent_side() {
        let owner = name("child.example.");
        // child-side NSEC (has SOA) cannot prove the parent's DS absence
        let rec = nsec("zzz.child.example.", &[RecordType::SOA, RecordType::NS]);
        assert!(!proves_nodata(&owner, &rec, &name("child.example."), RecordType::DS).proven);

        // parent-side NSEC (NS, no SOA) does
        let rec = nsec("zzz.example.", &[RecordType::NS]);
        assert!(proves_nodata(&owner, &rec, &name("child.example."), RecordType::DS).proven);
    }

    #[test]
    fn wildcard_reasoning() {
        let owner = name("alpha.example.");
        let rec = nsec("delta.example.", &[RecordType::A]);
        // closest encloser of beta.example. is example.; *.example. must be
        // covered for the name-error proof to be complete; it sorts before
        // alpha so this NSEC does not cover it
        assert!(!proves_no_wildcard(&owner, &rec, &name("beta.example.")));

        // an NSEC from the apex covering the wildcard does
        let apex_owner = name("example.");
        let apex_rec = nsec("alpha.example.", &[RecordType::SOA, RecordType::NS]);
        assert!(proves_no_wildcard(&apex_owner, &apex_rec, &name("beta.example.")));
    }

    #[test]
    fn closest_encloser_picks_longest() {
        let ce = closest_encloser(
            &name("a.b.sub.example."),
            &name("sub.example."),
            &name("zzz.example."),
        );
        assert_eq!(ce, name("sub.example."));
    }
}
