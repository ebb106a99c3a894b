// Copyright 2025-2026 the veridns authors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Reconstruction of the signed data of an RRset, RFC 4035 §5.3.2

use crate::dnssec::rdata::RRSIG;
use crate::error::{DnsError, DnsResult};
use crate::rr::{Label, Name, Record, RecordSet};
use crate::serialize::binary::{BinEncodable, BinEncoder};

/// Computes the owner name the signature was made over:
///
/// ```text
///    let rrsig_labels = the value of the RRSIG Labels field
///    let fqdn_labels = Label count of the RRset's fully qualified
///                      domain name
///
///    if rrsig_labels = fqdn_labels, name = fqdn
///    if rrsig_labels < fqdn_labels,
///       name = "*." | the rightmost rrsig_label labels of the fqdn
///    if rrsig_labels > fqdn_labels
///       the RRSIG RR did not pass the necessary validation checks
/// ```
pub fn determine_name(name: &Name, rrsig_labels: u8) -> DnsResult<Name> {
    let fqdn_labels = name.num_labels();

    if rrsig_labels == fqdn_labels {
        return Ok(name.clone());
    }

    if rrsig_labels < fqdn_labels {
        let rightmost = name.trim_to(rrsig_labels as usize);
        return rightmost.prepend_label(Label::wildcard());
    }

    Err(DnsError::from(format!(
        "RRSIG labels {rrsig_labels} exceed owner labels of {name}"
    )))
}

/// Builds the signed octet stream for the RRset:
///
/// ```text
///    signed_data = RRSIG_RDATA | RR(1) | RR(2)...  where
///
///       RRSIG_RDATA is the wire format of the RRSIG RDATA fields
///          with the Signature field excluded and the Signer's Name
///          in canonical form.
///
///       RR(i) = name | type | class | OrigTTL | RDATA length | RDATA
/// ```
///
/// Records are sorted by their canonical rdata, owners are lowercased and
/// the TTL is replaced by the RRSIG original TTL.
pub fn rrset_tbs(rrsig: &RRSIG, rrset: &RecordSet) -> DnsResult<Vec<u8>> {
    let name = determine_name(rrset.name(), rrsig.num_labels())?;
    let records: Vec<&Record> = rrset.records().collect();
    rrset_tbs_with_name(rrsig, &name, rrset, &records)
}

fn rrset_tbs_with_name(
    rrsig: &RRSIG,
    name: &Name,
    rrset: &RecordSet,
    records: &[&Record],
) -> DnsResult<Vec<u8>> {
    // canonical rdata ordering is byte-wise over the canonical encodings
    let mut rdatas: Vec<Vec<u8>> = records
        .iter()
        .map(|r| r.data().to_canonical_bytes())
        .collect::<DnsResult<_>>()?;
    rdatas.sort();
    rdatas.dedup();

    let mut buf: Vec<u8> = Vec::new();
    {
        let mut encoder = BinEncoder::new(&mut buf);
        encoder.set_canonical_names(true);

        rrsig.emit_pre_sig(&mut encoder)?;

        let owner = name.to_lowercase();
        for rdata in &rdatas {
            owner.emit_as_canonical(&mut encoder, true)?;
            rrsig.type_covered().emit(&mut encoder)?;
            rrset.dns_class().emit(&mut encoder)?;
            encoder.emit_u32(rrsig.original_ttl())?;
            encoder.emit_u16(rdata.len() as u16)?;
            encoder.emit_vec(rdata)?;
        }
    }

    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dnssec::Algorithm;
    use crate::rr::rdata::A;
    use crate::rr::{DNSClass, RData, RecordType};
    use std::str::FromStr;

    #[test]
    fn determine_name_rules() {
        let name = Name::from_ascii("www.example.com.").unwrap();
        assert_eq!(determine_name(&name, 3).unwrap(), name);
        assert_eq!(
            determine_name(&name, 2).unwrap(),
            Name::from_ascii("*.example.com.").unwrap()
        );
        assert!(determine_name(&name, 4).is_err());
    }

    #[test]
    fn tbs_is_order_and_case_independent() {
        let rrsig = RRSIG::new(
            RecordType::A,
            Algorithm::ECDSAP256SHA256,
            3,
            3600,
            0xFFFF_FFFF,
            0,
            1234,
            Name::from_ascii("example.com.").unwrap(),
            Vec::new(),
        );

        let build = |owner: &str, ips: &[&str]| {
            let name = Name::from_ascii(owner).unwrap();
            let mut set = RecordSet::new(name.clone(), RecordType::A, DNSClass::IN);
            for ip in ips {
                set.add(Record::from_rdata(
                    name.clone(),
                    3600,
                    RData::A(A::from_str(ip).unwrap()),
                ))
                .unwrap();
            }
            rrset_tbs(&rrsig, &set).unwrap()
        };

        let a = build("www.example.com.", &["192.0.2.2", "192.0.2.1"]);
        let b = build("WWW.EXAMPLE.com.", &["192.0.2.1", "192.0.2.2"]);
        assert_eq!(a, b);
    }
}
