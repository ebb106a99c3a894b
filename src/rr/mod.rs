// Copyright 2025-2026 the veridns authors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Resource record related components, e.g. `Record`, `RData`, ...

mod dns_class;
pub mod domain;
pub mod rdata;
mod record_data;
mod record_type;
mod resource;
mod rr_set;

pub use self::dns_class::DNSClass;
pub use self::domain::{Label, Name};
pub use self::record_data::RData;
pub use self::record_type::RecordType;
pub use self::resource::Record;
pub use self::rr_set::RecordSet;
