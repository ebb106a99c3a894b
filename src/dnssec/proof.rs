// Copyright 2025-2026 the veridns authors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! The security state of validated data

use std::fmt::{self, Display, Formatter};

use crate::rr::rdata::EdeCode;

/// The security status of an RRset or a response.
///
/// See [RFC 4035, DNSSEC Protocol Modifications, March 2005](https://datatracker.ietf.org/doc/html/rfc4035#section-4.3):
/// a validator distinguishes Secure, Insecure, Bogus and Indeterminate
/// data; `Unchecked` is the initial state before any determination.
#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd)]
#[must_use = "the security status determines whether data may be used"]
pub enum SecurityStatus {
    /// No validation has been attempted yet
    #[default]
    Unchecked,
    /// The chain of trust could not be built because necessary records
    /// could not be obtained
    Indeterminate,
    /// A chain of trust ought to exist but could not be validated; possibly
    /// an attack, possibly a configuration error
    Bogus,
    /// The data is proven to lie in or below an unsigned zone; there is no
    /// chain of trust to verify against
    Insecure,
    /// A chain of signed DNSKEY and DS records links the data to a trust
    /// anchor and the signatures verify
    Secure,
}

impl SecurityStatus {
    /// True if the data was cryptographically proven
    #[inline]
    pub fn is_secure(self) -> bool {
        self == Self::Secure
    }

    /// True if the data is proven to be below unsigned space
    #[inline]
    pub fn is_insecure(self) -> bool {
        self == Self::Insecure
    }

    /// True if validation was attempted and failed
    #[inline]
    pub fn is_bogus(self) -> bool {
        self == Self::Bogus
    }

    /// True before validation has run
    #[inline]
    pub fn is_unchecked(self) -> bool {
        self == Self::Unchecked
    }
}

impl Display for SecurityStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unchecked => "Unchecked",
            Self::Indeterminate => "Indeterminate",
            Self::Bogus => "Bogus",
            Self::Insecure => "Insecure",
            Self::Secure => "Secure",
        };

        f.write_str(s)
    }
}

/// A security status together with the reason that justifies it, the form
/// every verification step reports in
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Verdict {
    /// The established status
    pub status: SecurityStatus,
    /// The Extended DNS Error that best describes a failure
    pub ede: Option<EdeCode>,
    /// Human-readable justification, surfaced in the reason TXT record
    pub reason: Option<String>,
}

impl Verdict {
    /// A secure verdict, no justification needed
    pub fn secure() -> Self {
        Self {
            status: SecurityStatus::Secure,
            ede: None,
            reason: None,
        }
    }

    /// A bogus verdict with its EDE code and reason
    pub fn bogus(ede: EdeCode, reason: impl Into<String>) -> Self {
        Self {
            status: SecurityStatus::Bogus,
            ede: Some(ede),
            reason: Some(reason.into()),
        }
    }

    /// An insecure verdict with an optional reason
    pub fn insecure(reason: impl Into<String>) -> Self {
        Self {
            status: SecurityStatus::Insecure,
            ede: None,
            reason: Some(reason.into()),
        }
    }

    /// A verdict with the given status and no justification
    pub fn of(status: SecurityStatus) -> Self {
        Self {
            status,
            ede: None,
            reason: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order() {
        assert!(SecurityStatus::Secure > SecurityStatus::Insecure);
        assert!(SecurityStatus::Insecure > SecurityStatus::Bogus);
        assert!(SecurityStatus::Bogus > SecurityStatus::Indeterminate);
        assert!(SecurityStatus::Indeterminate > SecurityStatus::Unchecked);
    }
}
