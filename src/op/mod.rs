// Copyright 2025-2026 the veridns authors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Operations to send with a `DnsHandle`, e.g. `Query` and `Message`

mod edns;
mod header;
mod message;
mod query;

pub use self::edns::{Edns, DEFAULT_PAYLOAD_SIZE};
pub use self::header::{Header, OpCode, ResponseCode};
pub use self::message::Message;
pub use self::query::Query;
