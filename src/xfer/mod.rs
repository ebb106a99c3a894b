// Copyright 2025-2026 the veridns authors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! DNS high level transit implementations.
//!
//! The transport itself (UDP/TCP sockets, retries, server selection) lives
//! behind [`DnsHandle`]; this crate only requires that a fully parsed
//! [`Message`] comes back for each request.

use std::future::Future;
use std::pin::Pin;

use crate::error::DnsResult;
use crate::op::Message;

/// A boxed future resolving to a response message
pub type DnsResponseFuture = Pin<Box<dyn Future<Output = DnsResult<Message>> + Send>>;

/// A handle to a DNS transport: anything that can take a query message and
/// asynchronously produce the response
pub trait DnsHandle: Clone + Send + Sync + Unpin + 'static {
    /// Send the message and return a future of the response
    fn send(&self, request: Message) -> DnsResponseFuture;
}
