// Copyright 2025-2026 the veridns authors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Error types for the crate

#![deny(missing_docs)]

use std::{fmt, io, sync::Arc};

use enum_as_inner::EnumAsInner;
use thiserror::Error;

use crate::rr::Name;

/// An alias for results returned by functions of this crate
pub type DnsResult<T> = Result<T, DnsError>;

/// The error kind for errors that get returned in the crate
#[derive(Debug, Clone, EnumAsInner, Error)]
#[non_exhaustive]
pub enum DnsErrorKind {
    /// Character data length exceeded the limit
    #[error("char data length exceeds {max}: {len}")]
    CharacterDataTooLong {
        /// Specified maximum
        max: usize,
        /// Actual length
        len: usize,
    },

    /// A domain name was too long
    #[error("name label data exceed 255: {0}")]
    DomainNameTooLong(usize),

    /// EDNS resource record label is not the root label, although required
    #[error("edns resource record label must be the root label (.): {0}")]
    EdnsNameNotRoot(Name),

    /// The length of rdata read was not as expected
    #[error("incorrect rdata length read: {read} expected: {len}")]
    IncorrectRDataLengthRead {
        /// The amount of read data
        read: usize,
        /// The expected length of the data
        len: usize,
    },

    /// Label bytes exceeded the limit of 63
    #[error("label bytes exceed 63: {0}")]
    LabelBytesTooLong(usize),

    /// A name pointer in a message referenced data at or after itself
    #[error("label points to data not prior to idx: {idx} ptr: {ptr}")]
    PointerNotPriorToLabel {
        /// index of the label containing this pointer
        idx: usize,
        /// location to which the pointer is directing
        ptr: u16,
    },

    /// The maximum buffer size was exceeded
    #[error("maximum buffer size exceeded: {0}")]
    MaxBufferSizeExceeded(usize),

    /// An error with an arbitrary message, referenced as &'static str
    #[error("{0}")]
    Message(&'static str),

    /// An error with an arbitrary message, stored as String
    #[error("{0}")]
    Msg(String),

    /// A relative name was passed where an absolute (fully-qualified) one is required
    #[error("relative name not allowed here: {0}")]
    RelativeName(Name),

    /// An unrecognized label code was found in a wire-format name
    #[error("unrecognized label code: {0:b}")]
    UnrecognizedLabelCode(u8),

    /// A DNS class string was not recognized
    #[error("unrecognized dns class: {0}")]
    UnknownDnsClassStr(String),

    /// A record type string was not recognized
    #[error("unrecognized record type: {0}")]
    UnknownRecordTypeStr(String),

    /// The DNSKEY protocol field must be 3
    #[error("dns key value unknown, must be 3: {0}")]
    DnsKeyProtocolNot3(u8),

    /// An io::Error, from the trust-anchor loader
    #[error("io error: {0}")]
    Io(Arc<io::Error>),
}

/// The error type for errors that get returned in the crate
#[derive(Debug, Clone)]
pub struct DnsError {
    kind: Box<DnsErrorKind>,
}

impl DnsError {
    /// Get the kind of the error
    pub fn kind(&self) -> &DnsErrorKind {
        &self.kind
    }
}

impl std::error::Error for DnsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.kind)
    }
}

impl fmt::Display for DnsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.kind, f)
    }
}

impl From<DnsErrorKind> for DnsError {
    fn from(kind: DnsErrorKind) -> Self {
        Self { kind: Box::new(kind) }
    }
}

impl From<&'static str> for DnsError {
    fn from(msg: &'static str) -> Self {
        DnsErrorKind::Message(msg).into()
    }
}

impl From<String> for DnsError {
    fn from(msg: String) -> Self {
        DnsErrorKind::Msg(msg).into()
    }
}

impl From<io::Error> for DnsError {
    fn from(e: io::Error) -> Self {
        DnsErrorKind::Io(Arc::new(e)).into()
    }
}
