// Copyright 2025-2026 the veridns authors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! RRSIG type and related implementations

use std::fmt::{self, Display, Formatter};

use crate::dnssec::Algorithm;
use crate::error::DnsResult;
use crate::rr::{Name, RecordType};
use crate::serialize::binary::{BinDecodable, BinDecoder, BinEncodable, BinEncoder};

/// [RFC 4034, DNSSEC Resource Records, March 2005](https://tools.ietf.org/html/rfc4034#section-3.1)
///
/// ```text
/// 3.1.  RRSIG RDATA Wire Format
///
///                         1 1 1 1 1 1 1 1 1 1 2 2 2 2 2 2 2 2 2 2 3 3
///     0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
///    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///    |        Type Covered           |  Algorithm    |     Labels    |
///    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///    |                         Original TTL                          |
///    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///    |                      Signature Expiration                     |
///    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///    |                      Signature Inception                      |
///    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///    |            Key Tag            |                               /
///    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+         Signer's Name         /
///    /                                                               /
///    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///    /                                                               /
///    /                            Signature                          /
///    /                                                               /
///    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct RRSIG {
    type_covered: RecordType,
    algorithm: Algorithm,
    num_labels: u8,
    original_ttl: u32,
    sig_expiration: u32,
    sig_inception: u32,
    key_tag: u16,
    signer_name: Name,
    sig: Vec<u8>,
}

impl RRSIG {
    /// Creates new RRSIG record data
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        type_covered: RecordType,
        algorithm: Algorithm,
        num_labels: u8,
        original_ttl: u32,
        sig_expiration: u32,
        sig_inception: u32,
        key_tag: u16,
        signer_name: Name,
        sig: Vec<u8>,
    ) -> Self {
        Self {
            type_covered,
            algorithm,
            num_labels,
            original_ttl,
            sig_expiration,
            sig_inception,
            key_tag,
            signer_name,
            sig,
        }
    }

    /// The type of the RRset this signature covers
    pub fn type_covered(&self) -> RecordType {
        self.type_covered
    }

    /// The algorithm of the signing key
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// The number of labels of the owner name, with wildcards uncounted
    /// (RFC 4034 §3.1.3); fewer labels than the owner means the RRset was
    /// synthesized from a wildcard
    pub fn num_labels(&self) -> u8 {
        self.num_labels
    }

    /// The TTL of the covered RRset as it appears in the zone
    pub fn original_ttl(&self) -> u32 {
        self.original_ttl
    }

    /// Seconds since the epoch after which the signature is no longer valid,
    /// to be compared in RFC 1982 serial number arithmetic
    pub fn sig_expiration(&self) -> u32 {
        self.sig_expiration
    }

    /// Seconds since the epoch before which the signature is not yet valid
    pub fn sig_inception(&self) -> u32 {
        self.sig_inception
    }

    /// The key tag of the DNSKEY that produced this signature
    pub fn key_tag(&self) -> u16 {
        self.key_tag
    }

    /// The owner of the DNSKEY that produced this signature; must be the
    /// zone that contains the covered RRset
    pub fn signer_name(&self) -> &Name {
        &self.signer_name
    }

    /// The raw signature bytes
    pub fn sig(&self) -> &[u8] {
        &self.sig
    }

    /// Replaces the signature bytes, used by tests to corrupt a signature
    #[cfg(any(test, feature = "testing"))]
    pub fn set_sig(&mut self, sig: Vec<u8>) {
        self.sig = sig;
    }

    /// Writes the rdata with the Signature field excluded and the signer
    /// name in canonical form, the leading portion of the signed stream
    /// (RFC 4034 §3.1.8.1)
    pub fn emit_pre_sig(&self, encoder: &mut BinEncoder<'_>) -> DnsResult<()> {
        self.type_covered.emit(encoder)?;
        self.algorithm.emit(encoder)?;
        encoder.emit_u8(self.num_labels)?;
        encoder.emit_u32(self.original_ttl)?;
        encoder.emit_u32(self.sig_expiration)?;
        encoder.emit_u32(self.sig_inception)?;
        encoder.emit_u16(self.key_tag)?;
        self.signer_name
            .to_lowercase()
            .emit_as_canonical(encoder, true)
    }

    /// Reads the rdata, consuming exactly `rdata_length` bytes
    pub fn read_data(decoder: &mut BinDecoder<'_>, rdata_length: u16) -> DnsResult<Self> {
        let start = decoder.index();
        let type_covered = RecordType::read(decoder)?;
        let algorithm = Algorithm::read(decoder)?;
        let num_labels = decoder.read_u8()?;
        let original_ttl = decoder.read_u32()?;
        let sig_expiration = decoder.read_u32()?;
        let sig_inception = decoder.read_u32()?;
        let key_tag = decoder.read_u16()?;
        let signer_name = Name::read(decoder)?;

        let sig_len = rdata_length as usize - (decoder.index() - start);
        let sig = decoder.read_vec(sig_len)?;

        Ok(Self {
            type_covered,
            algorithm,
            num_labels,
            original_ttl,
            sig_expiration,
            sig_inception,
            key_tag,
            signer_name,
            sig,
        })
    }
}

impl BinEncodable for RRSIG {
    fn emit(&self, encoder: &mut BinEncoder<'_>) -> DnsResult<()> {
        self.type_covered.emit(encoder)?;
        self.algorithm.emit(encoder)?;
        encoder.emit_u8(self.num_labels)?;
        encoder.emit_u32(self.original_ttl)?;
        encoder.emit_u32(self.sig_expiration)?;
        encoder.emit_u32(self.sig_inception)?;
        encoder.emit_u16(self.key_tag)?;
        // the signer name in RRSIG rdata is never compressed (RFC 3597 §4)
        // and is lowercased only in the canonical form
        let signer_name = if encoder.is_canonical_names() {
            self.signer_name.to_lowercase()
        } else {
            self.signer_name.clone()
        };
        signer_name.emit_as_canonical(encoder, true)?;
        encoder.emit_vec(&self.sig)
    }
}

impl Display for RRSIG {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {} {} {} (sig)",
            self.type_covered,
            u8::from(self.algorithm),
            self.num_labels,
            self.original_ttl,
            self.sig_expiration,
            self.sig_inception,
            self.key_tag,
            self.signer_name,
        )
    }
}
