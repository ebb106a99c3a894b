// Copyright 2025-2026 the veridns authors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Domain names: sequences of labels with RFC 4034 canonical ordering,
//! wildcard derivation and RFC 6672 DNAME substitution.

use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter, Write};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::error::{DnsError, DnsErrorKind, DnsResult};
use crate::rr::domain::Label;
use crate::serialize::binary::{BinDecodable, BinDecoder, BinEncodable, BinEncoder};

/// The maximum length of a name in wire format, including the root octet
const MAX_NAME_LENGTH: usize = 255;

/// A domain name
#[derive(Clone, Default, Eq)]
pub struct Name {
    is_fqdn: bool,
    labels: Vec<Label>,
}

impl Name {
    /// Create a new, empty (relative) name
    pub fn new() -> Self {
        Self::default()
    }

    /// The root name, `.`
    pub fn root() -> Self {
        Self {
            is_fqdn: true,
            labels: Vec::new(),
        }
    }

    /// Returns true if there are no labels, i.e. the name is `.`
    pub fn is_root(&self) -> bool {
        self.labels.is_empty() && self.is_fqdn
    }

    /// Whether the name is fully qualified, i.e. it ends in the root label
    pub fn is_fqdn(&self) -> bool {
        self.is_fqdn
    }

    /// Marks the name as fully qualified (or not)
    pub fn set_fqdn(&mut self, val: bool) {
        self.is_fqdn = val;
    }

    /// Iterator over the labels, leftmost (deepest) first
    pub fn iter(&self) -> std::slice::Iter<'_, Label> {
        self.labels.iter()
    }

    /// The number of labels, counting a leading wildcard like any other
    pub fn label_count(&self) -> usize {
        self.labels.len()
    }

    /// The number of labels in the name, disregarding a leading wildcard
    ///
    /// This matches the Labels field of an RRSIG (RFC 4034 §3.1.3): the
    /// root has zero labels and `*.example.com.` has two.
    pub fn num_labels(&self) -> u8 {
        let count = self.labels.len() as u8;
        match self.labels.first() {
            Some(first) if first.is_wildcard() => count - 1,
            _ => count,
        }
    }

    /// The length of the name in uncompressed wire format, including the
    /// terminating root octet
    pub fn len(&self) -> usize {
        self.labels.iter().map(|l| l.len() + 1).sum::<usize>() + 1
    }

    /// Returns true for the empty relative name
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty() && !self.is_fqdn
    }

    /// Builds a (fully-qualified) name from a sequence of labels
    pub fn from_labels<I>(labels: I) -> DnsResult<Self>
    where
        I: IntoIterator<Item = Label>,
    {
        let mut name = Self::root();
        for label in labels {
            name = name.append_label(label)?;
        }

        Ok(name)
    }

    /// Appends a label to the end (root side) of the name
    pub fn append_label(mut self, label: Label) -> DnsResult<Self> {
        self.labels.push(label);
        if self.len() > MAX_NAME_LENGTH {
            return Err(DnsErrorKind::DomainNameTooLong(self.len()).into());
        }

        Ok(self)
    }

    /// Prepends a label, creating a new deepest label, e.g. turning
    /// `example.com.` into `*.example.com.`
    pub fn prepend_label(&self, label: Label) -> DnsResult<Self> {
        let mut name = Self {
            is_fqdn: self.is_fqdn,
            labels: Vec::with_capacity(self.labels.len() + 1),
        };
        name.labels.push(label);
        name.labels.extend(self.labels.iter().cloned());

        if name.len() > MAX_NAME_LENGTH {
            return Err(DnsErrorKind::DomainNameTooLong(name.len()).into());
        }

        Ok(name)
    }

    /// Appends `other` to this name; the result is fully qualified iff
    /// `other` is
    pub fn append_name(mut self, other: &Self) -> DnsResult<Self> {
        for label in other.iter() {
            self.labels.push(label.clone());
        }

        self.is_fqdn = other.is_fqdn;
        if self.len() > MAX_NAME_LENGTH {
            return Err(DnsErrorKind::DomainNameTooLong(self.len()).into());
        }

        Ok(self)
    }

    /// Appends `domain`, which must be fully qualified, to this name
    pub fn append_domain(self, domain: &Self) -> DnsResult<Self> {
        if !domain.is_fqdn() {
            return Err(DnsErrorKind::RelativeName(domain.clone()).into());
        }

        self.append_name(domain)
    }

    /// The parent name, with the deepest label removed; the parent of the
    /// root (and of the empty name) is the root
    pub fn base_name(&self) -> Self {
        self.trim_to(self.labels.len().saturating_sub(1))
    }

    /// Keeps only the rightmost `num_labels` labels, e.g.
    /// `www.example.com.` trimmed to 2 is `example.com.`
    pub fn trim_to(&self, num_labels: usize) -> Self {
        if num_labels >= self.labels.len() {
            return self.clone();
        }

        Self {
            is_fqdn: self.is_fqdn,
            labels: self.labels[self.labels.len() - num_labels..].to_vec(),
        }
    }

    /// Returns true if `self` is an ancestor of `name` or equal to it,
    /// compared case-insensitively
    pub fn zone_of(&self, name: &Self) -> bool {
        if self.labels.len() > name.labels.len() {
            return false;
        }

        self.labels
            .iter()
            .rev()
            .zip(name.labels.iter().rev())
            .all(|(l, r)| l.eq_ignore_ascii_case(r))
    }

    /// Returns true if the deepest label is the wildcard, `*`
    pub fn is_wildcard(&self) -> bool {
        self.labels.first().is_some_and(Label::is_wildcard)
    }

    /// Replaces the deepest label with the wildcard, e.g. `www.example.com.`
    /// becomes `*.example.com.`; the root is returned unchanged
    pub fn into_wildcard(self) -> Self {
        if self.labels.is_empty() {
            return self;
        }

        let mut labels = self.labels;
        labels[0] = Label::wildcard();
        Self {
            is_fqdn: self.is_fqdn,
            labels,
        }
    }

    /// Returns a copy of the name with all labels lowercased
    pub fn to_lowercase(&self) -> Self {
        Self {
            is_fqdn: self.is_fqdn,
            labels: self.labels.iter().map(Label::to_lowercase).collect(),
        }
    }

    /// RFC 6672 substitution: the `old` suffix of this name (which must be
    /// an ancestor) is replaced by `new`
    ///
    /// Fails with `DomainNameTooLong` when the substituted name exceeds 255
    /// octets, which callers treat as "no such name".
    pub fn replace_suffix(&self, old: &Self, new: &Self) -> DnsResult<Self> {
        if !old.zone_of(self) {
            return Err("name is not within the suffix being replaced".into());
        }

        let kept = self.labels.len() - old.labels.len();
        let mut name = Self {
            is_fqdn: false,
            labels: self.labels[..kept].to_vec(),
        };
        name = name.append_name(new)?;

        Ok(name)
    }

    /// Parses a name in master-file form; a trailing unescaped `.` makes the
    /// result fully qualified, otherwise `origin` is appended when given
    pub fn parse(local: &str, origin: Option<&Self>) -> DnsResult<Self> {
        if local == "." {
            return Ok(Self::root());
        }
        if local == "@" {
            return match origin {
                Some(origin) => Ok(origin.clone()),
                None => Ok(Self::root()),
            };
        }

        let mut name = Self::new();
        let mut label = String::new();
        let mut chars = local.chars();
        let mut trailing_dot = false;
        loop {
            let Some(ch) = chars.next() else {
                break;
            };

            trailing_dot = false;
            match ch {
                '.' => {
                    if label.is_empty() {
                        return Err("double dot or leading dot in name".into());
                    }
                    name = name.append_label(Label::from_ascii(&label)?)?;
                    label.clear();
                    trailing_dot = true;
                }
                '\\' => {
                    label.push(ch);
                    match chars.next() {
                        Some(escaped) => label.push(escaped),
                        None => return Err("unterminated escape in name".into()),
                    }
                    // the two trailing digits of a \ddd escape
                    if label.ends_with(|c: char| c.is_ascii_digit()) {
                        for _ in 0..2 {
                            match chars.next() {
                                Some(digit) if digit.is_ascii_digit() => label.push(digit),
                                _ => return Err("bad decimal escape in name".into()),
                            }
                        }
                    }
                }
                ch if !ch.is_control() && !ch.is_whitespace() => label.push(ch),
                ch => return Err(format!("unrecognized char in name: {ch}").into()),
            }
        }

        if !label.is_empty() {
            name = name.append_label(Label::from_ascii(&label)?)?;
        }

        if trailing_dot {
            name.set_fqdn(true);
        } else if let Some(origin) = origin {
            return name.append_domain(origin);
        }

        Ok(name)
    }

    /// Parses an ASCII master-file form name, e.g. `www.example.com.`
    pub fn from_ascii<S: AsRef<str>>(name: S) -> DnsResult<Self> {
        Self::parse(name.as_ref(), None)
    }

    /// The name in master-file form
    pub fn to_ascii(&self) -> String {
        self.to_string()
    }

    /// Emits the name to the encoder
    ///
    /// In canonical form there will be no pointers written (no compression)
    /// and labels are emitted unaltered; callers lowercase beforehand where
    /// RFC 4034 §6.2 requires it.
    pub fn emit_as_canonical(
        &self,
        encoder: &mut BinEncoder<'_>,
        canonical: bool,
    ) -> DnsResult<()> {
        let buf_len = encoder.len();

        // write out each label, tracking the start offsets, then try to
        // replace a written suffix with a pointer to a prior occurrence
        let mut labels_written = Vec::with_capacity(self.labels.len());
        for label in self.iter() {
            labels_written.push(encoder.offset());
            encoder.emit_character_data(label.as_bytes())?;
        }

        let last_index = encoder.offset();
        for label_idx in &labels_written {
            match encoder.get_label_pointer(*label_idx, last_index) {
                Some(_) if canonical => continue,
                Some(loc) => {
                    // rewind to the start of this label and point instead
                    encoder.trim(*label_idx);
                    encoder.emit_u16(0xC000u16 | (loc & 0x3FFFu16))?;
                    return Ok(());
                }
                None => {
                    encoder.store_label_pointer(*label_idx, last_index);
                }
            }
        }

        // no pointer written: terminate with the root label
        encoder.emit(0)?;

        let length = encoder.len() - buf_len;
        if length > MAX_NAME_LENGTH {
            return Err(DnsErrorKind::DomainNameTooLong(length).into());
        }

        Ok(())
    }

    /// Writes the labels to the encoder, optionally lowercased
    pub fn emit_with_lowercase(
        &self,
        encoder: &mut BinEncoder<'_>,
        lowercase: bool,
    ) -> DnsResult<()> {
        let canonical = encoder.is_canonical_names();
        if lowercase {
            self.to_lowercase().emit_as_canonical(encoder, canonical)
        } else {
            self.emit_as_canonical(encoder, canonical)
        }
    }

    fn cmp_labels(&self, other: &Self, fold_case: bool) -> Ordering {
        // compare from the root towards the deepest label
        let self_labels = self.labels.iter().rev();
        let other_labels = other.labels.iter().rev();

        for (l, r) in self_labels.zip(other_labels) {
            let ord = if fold_case {
                l.cmp_canonical(r)
            } else {
                l.cmp_case(r)
            };
            match ord {
                Ordering::Equal => continue,
                not_eq => return not_eq,
            }
        }

        self.labels.len().cmp(&other.labels.len())
    }

    /// Case-sensitive comparison
    pub fn cmp_case(&self, other: &Self) -> Ordering {
        self.cmp_labels(other, false)
    }

    /// Case-sensitive equality
    pub fn eq_case(&self, other: &Self) -> bool {
        self.is_fqdn == other.is_fqdn && self.cmp_case(other) == Ordering::Equal
    }
}

impl BinEncodable for Name {
    fn emit(&self, encoder: &mut BinEncoder<'_>) -> DnsResult<()> {
        let canonical = encoder.is_canonical_names();
        self.emit_as_canonical(encoder, canonical)
    }
}

impl<'r> BinDecodable<'r> for Name {
    /// Parses a name from the decoder, following backward compression
    /// pointers in the message buffer
    fn read(decoder: &mut BinDecoder<'r>) -> DnsResult<Self> {
        let name_start = decoder.index();
        let mut labels: Vec<Label> = Vec::new();
        // the terminating root octet counts towards the limit
        let mut run_len = 1_usize;
        // pointers must strictly decrease, which also bounds the loop
        let mut last_pointer = name_start;
        let mut jumped: Option<BinDecoder<'r>> = None;

        loop {
            let cur = match jumped.as_mut() {
                Some(j) => j,
                None => &mut *decoder,
            };

            let len = cur.read_u8()?;
            match len {
                0 => break,
                len if len & 0b1100_0000 == 0b1100_0000 => {
                    let idx = cur.index() - 1;
                    let low = cur.read_u8()?;
                    let ptr = (u16::from(len & 0b0011_1111) << 8) | u16::from(low);
                    if ptr as usize >= last_pointer {
                        return Err(DnsErrorKind::PointerNotPriorToLabel { idx, ptr }.into());
                    }

                    last_pointer = ptr as usize;
                    jumped = Some(decoder.clone_at(ptr));
                }
                len if len & 0b1100_0000 != 0 => {
                    return Err(DnsErrorKind::UnrecognizedLabelCode(len).into());
                }
                len => {
                    let cur = match jumped.as_mut() {
                        Some(j) => j,
                        None => &mut *decoder,
                    };
                    let bytes = cur.read_slice(len as usize)?;
                    run_len += len as usize + 1;
                    if run_len > MAX_NAME_LENGTH {
                        return Err(DnsErrorKind::DomainNameTooLong(run_len).into());
                    }

                    labels.push(Label::from_raw_bytes(bytes)?);
                }
            }
        }

        Ok(Self {
            is_fqdn: true,
            labels,
        })
    }
}

impl FromStr for Name {
    type Err = DnsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_ascii(s)
    }
}

impl Display for Name {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return f.write_char('.');
        }

        let mut iter = self.labels.iter();
        if let Some(label) = iter.next() {
            write!(f, "{label}")?;
        }
        for label in iter {
            write!(f, ".{label}")?;
        }
        if self.is_fqdn {
            f.write_char('.')?;
        }

        Ok(())
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.is_fqdn == other.is_fqdn && self.cmp_labels(other, true) == Ordering::Equal
    }
}

impl PartialOrd for Name {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Name {
    /// Canonical DNS ordering per RFC 4034 §6.1: right to left, label by
    /// label, case folded
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.is_fqdn, other.is_fqdn) {
            (false, true) => Ordering::Less,
            (true, false) => Ordering::Greater,
            _ => self.cmp_labels(other, true),
        }
    }
}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.is_fqdn.hash(state);
        for label in &self.labels {
            label.hash(state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialize::binary::BinEncodable;

    fn name(s: &str) -> Name {
        Name::from_ascii(s).unwrap()
    }

    #[test]
    fn parse_and_display() {
        assert_eq!(name("www.example.com.").to_string(), "www.example.com.");
        assert_eq!(name(".").to_string(), ".");
        assert!(name("www.example.com.").is_fqdn());
        assert!(!name("www.example.com").is_fqdn());
    }

    #[test]
    fn zone_of() {
        assert!(name("example.com.").zone_of(&name("www.example.com.")));
        assert!(name("example.com.").zone_of(&name("example.com.")));
        assert!(name(".").zone_of(&name("example.com.")));
        assert!(!name("www.example.com.").zone_of(&name("example.com.")));
        assert!(!name("other.com.").zone_of(&name("www.example.com.")));
        // case insensitive
        assert!(name("EXAMPLE.com.").zone_of(&name("www.example.COM.")));
    }

    #[test]
    fn canonical_order() {
        // the ordered list from RFC 4034 section 6.1
        let ordered = [
            "example.",
            "a.example.",
            "yljkjljk.a.example.",
            "Z.a.example.",
            "zABC.a.EXAMPLE.",
            "z.example.",
            "\\001.z.example.",
            "*.z.example.",
            "\\200.z.example.",
        ];

        let mut names: Vec<Name> = ordered.iter().map(|s| name(s)).collect();
        names.sort();
        let sorted: Vec<String> = names.iter().map(|n| n.to_string()).collect();
        let expected: Vec<String> = ordered.iter().map(|s| name(s).to_string()).collect();
        assert_eq!(sorted, expected);
    }

    #[test]
    fn zone_of_implies_canonical_ge() {
        let a = name("www.example.com.");
        let b = name("example.com.");
        assert!(b.zone_of(&a));
        assert!(a.cmp(&b) != Ordering::Less);
    }

    #[test]
    fn wildcards() {
        let n = name("www.sub.example.com.");
        assert!(!n.is_wildcard());
        let wild = n.clone().into_wildcard();
        assert_eq!(wild.to_string(), "*.sub.example.com.");
        assert!(wild.is_wildcard());
        assert_eq!(wild.num_labels(), 3);
        assert_eq!(wild.label_count(), 4);

        // wildcard of an ancestor via trim + prepend
        let wc = n.trim_to(2).prepend_label(Label::wildcard()).unwrap();
        assert_eq!(wc.to_string(), "*.example.com.");
    }

    #[test]
    fn dname_substitution() {
        let qname = name("www.dept.example.com.");
        let dname_owner = name("dept.example.com.");
        let target = name("dept.example.net.");
        let substituted = qname.replace_suffix(&dname_owner, &target).unwrap();
        assert_eq!(substituted.to_string(), "www.dept.example.net.");

        // substitution must fail when the result exceeds 255 octets
        let mut long = Name::root();
        let mut overflow = name("short.com.");
        for _ in 0..3 {
            long = long
                .prepend_label(Label::from_raw_bytes(&[b'x'; 63]).unwrap())
                .unwrap();
            overflow = overflow
                .prepend_label(Label::from_raw_bytes(&[b'y'; 50]).unwrap())
                .unwrap();
        }
        let result = overflow.replace_suffix(&name("short.com."), &long);
        assert!(matches!(
            result.unwrap_err().kind(),
            DnsErrorKind::DomainNameTooLong(_)
        ));
    }

    #[test]
    fn name_too_long() {
        let mut n = Name::root();
        for _ in 0..3 {
            n = n
                .prepend_label(Label::from_raw_bytes(&[b'a'; 63]).unwrap())
                .unwrap();
        }
        // 3*64 + 1 = 193, one more 63-octet label overflows
        assert!(n.prepend_label(Label::from_raw_bytes(&[b'a'; 63]).unwrap()).is_err());
    }

    #[test]
    fn wire_round_trip_with_compression() {
        let first = name("www.example.com.");
        let second = name("mail.example.com.");

        let mut bytes = Vec::new();
        {
            let mut encoder = BinEncoder::new(&mut bytes);
            first.emit(&mut encoder).unwrap();
            second.emit(&mut encoder).unwrap();
        }

        // second name must reuse the example.com. suffix via a pointer
        assert!(bytes.len() < first.len() + second.len());

        let mut decoder = BinDecoder::new(&bytes);
        assert_eq!(Name::read(&mut decoder).unwrap(), first);
        assert_eq!(Name::read(&mut decoder).unwrap(), second);
    }

    #[test]
    fn forward_pointer_rejected() {
        // a name that is just a pointer to itself
        let bytes = [0xC0_u8, 0x00];
        let mut decoder = BinDecoder::new(&bytes);
        assert!(Name::read(&mut decoder).is_err());
    }

    #[test]
    fn preserves_case_but_compares_folded() {
        let upper = name("WWW.Example.COM.");
        let lower = name("www.example.com.");
        assert_eq!(upper, lower);
        assert_eq!(upper.to_string(), "WWW.Example.COM.");
        assert_eq!(upper.to_lowercase().to_string(), "www.example.com.");
    }
}
