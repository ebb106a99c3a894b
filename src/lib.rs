// Copyright 2025-2026 the veridns authors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! veridns is a DNSSEC-validating stub resolver toolkit.
//!
//! The crate bundles the pieces a validating resolver front-end is made
//! of: the RFC 1035 wire codec ([`serialize::binary`]), domain names and
//! resource records ([`rr`]), message framing with EDNS and Extended DNS
//! Errors ([`op`]), an in-memory zone store ([`authority`]), a
//! credibility-aware cache ([`cache`]), and the DNSSEC machinery itself
//! ([`dnssec`]): trust anchors, a validated-key cache, RRSIG verification
//! over canonical RRsets, NSEC/NSEC3 denial proofs, and the
//! [`dnssec::ValidatingResolver`] state machine that ties them together.
//!
//! The validator wraps any transport implementing [`xfer::DnsHandle`].
//! Every client response is proven Secure (returned with the AD bit),
//! Insecure (returned unchanged), or Bogus (replaced by SERVFAIL with an
//! RFC 8914 Extended DNS Error and, optionally, a TXT record carrying the
//! human-readable reason).
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use veridns::dnssec::{TrustAnchorStore, ValidatingResolver, ValidatorConfig};
//! use veridns::op::{Message, Query};
//! use veridns::rr::{Name, RecordType};
//! use veridns::runtime::SystemClock;
//! # use veridns::xfer::{DnsHandle, DnsResponseFuture};
//! # #[derive(Clone)]
//! # struct Upstream;
//! # impl DnsHandle for Upstream {
//! #     fn send(&self, _request: Message) -> DnsResponseFuture {
//! #         unimplemented!()
//! #     }
//! # }
//!
//! # async fn example() -> veridns::error::DnsResult<()> {
//! let mut anchors = TrustAnchorStore::new();
//! anchors.load(&include_bytes!("../tests/data/root.key")[..])?;
//!
//! let resolver = ValidatingResolver::with_parts(
//!     Upstream,
//!     anchors,
//!     Arc::new(SystemClock),
//!     ValidatorConfig::default(),
//! );
//!
//! let query = Message::new_query(Query::query(
//!     Name::from_ascii("www.example.com.")?,
//!     RecordType::A,
//! ));
//! let response = resolver.send_validated(query).await?;
//! assert!(response.header().authentic_data());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![recursion_limit = "2048"]

pub mod authority;
pub mod cache;
pub mod dnssec;
pub mod error;
pub mod op;
pub mod rr;
pub mod runtime;
pub mod serialize;
pub mod xfer;

pub use crate::error::{DnsError, DnsErrorKind, DnsResult};
