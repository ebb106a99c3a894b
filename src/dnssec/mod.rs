// Copyright 2025-2026 the veridns authors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! dns security extension related modules

mod algorithm;
pub mod classify;
mod digest_type;
pub mod handle;
pub mod key_cache;
pub mod nsec;
pub mod nsec3;
mod proof;
pub mod public_key;
pub mod rdata;
pub mod srrset;
pub mod tbs;
pub mod trust_anchor;
pub mod verifier;

pub use self::algorithm::Algorithm;
pub use self::classify::{classify_response, ResponseClassification};
pub use self::digest_type::DigestType;
pub use self::handle::{ValidatingResolver, ValidatorConfig, VALIDATION_REASON_QCLASS};
pub use self::key_cache::{KeyCache, KeyEntry};
pub use self::proof::{SecurityStatus, Verdict};
pub use self::srrset::{SecMessage, SecRrset};
pub use self::trust_anchor::TrustAnchorStore;
