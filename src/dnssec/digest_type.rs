// Copyright 2025-2026 the veridns authors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! DS record digest types (RFC 4034 Appendix A.2 and the IANA registry)

use ring::digest;

use crate::error::DnsResult;

/// The digest algorithm of a DS record
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DigestType {
    /// 1 - SHA-1, still common in DS records
    SHA1,
    /// 2 - SHA-256
    SHA256,
    /// 4 - SHA-384
    SHA384,
    /// Any other digest number, unsupported
    Unknown(u8),
}

impl DigestType {
    /// Whether this crate can compute the digest
    pub fn is_supported(self) -> bool {
        matches!(self, Self::SHA1 | Self::SHA256 | Self::SHA384)
    }

    /// Computes the digest over the given bytes
    pub fn digest(self, data: &[u8]) -> DnsResult<Vec<u8>> {
        let algorithm = match self {
            Self::SHA1 => &digest::SHA1_FOR_LEGACY_USE_ONLY,
            Self::SHA256 => &digest::SHA256,
            Self::SHA384 => &digest::SHA384,
            Self::Unknown(value) => {
                return Err(format!("unsupported digest type: {value}").into());
            }
        };

        Ok(digest::digest(algorithm, data).as_ref().to_vec())
    }
}

impl From<u8> for DigestType {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::SHA1,
            2 => Self::SHA256,
            4 => Self::SHA384,
            _ => Self::Unknown(value),
        }
    }
}

impl From<DigestType> for u8 {
    fn from(digest_type: DigestType) -> Self {
        match digest_type {
            DigestType::SHA1 => 1,
            DigestType::SHA256 => 2,
            DigestType::SHA384 => 4,
            DigestType::Unknown(value) => value,
        }
    }
}
