// Copyright 2025-2026 the veridns authors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Record data for all the record types whose rdata is a single
//! `<domain-name>`: CNAME, NS, PTR and DNAME.

use crate::error::DnsResult;
use crate::rr::Name;
use crate::serialize::binary::{BinDecodable, BinDecoder, BinEncoder};

/// Read the single name out of the rdata
pub(crate) fn read(decoder: &mut BinDecoder<'_>) -> DnsResult<Name> {
    Name::read(decoder)
}

/// Write the single name
///
/// RFC 3597 restricts compression to the rdata of well-known types; CNAME,
/// NS and PTR are among them, DNAME (RFC 6672 §2.5) is not compressed.
pub(crate) fn emit(encoder: &mut BinEncoder<'_>, name: &Name, compressible: bool) -> DnsResult<()> {
    // in the canonical form embedded names of RFC 4034 §6.2 listed types are
    // lowercased; the encoder flag also disables compression
    if encoder.is_canonical_names() {
        return name.to_lowercase().emit_as_canonical(encoder, true);
    }

    name.emit_as_canonical(encoder, !compressible)
}
