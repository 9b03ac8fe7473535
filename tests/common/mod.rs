//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::path::Path;

use rcgen::{CertificateParams, DistinguishedName, DnType, KeyPair, PublicKeyData, SigningKey};
use tinyca::{KeyAlgorithm, Store, StoreConfig};

/// Store with a fast root key type.
pub fn fast_store(dir: &Path) -> Store {
    Store::new(
        StoreConfig::default()
            .with_store_dir(dir)
            .with_key_algorithm(KeyAlgorithm::EcdsaP256),
    )
}

/// DER of a signing request for `sans` with an optional common name.
pub fn csr_der(sans: &[&str], common_name: Option<&str>) -> Vec<u8> {
    let key = KeyPair::generate().unwrap();
    csr_der_with(&key, sans, common_name, |_| {})
}

pub fn csr_der_with(
    key: &KeyPair,
    sans: &[&str],
    common_name: Option<&str>,
    customize: impl FnOnce(&mut CertificateParams),
) -> Vec<u8> {
    let mut params =
        CertificateParams::new(sans.iter().map(|s| s.to_string()).collect::<Vec<_>>()).unwrap();
    params.distinguished_name = DistinguishedName::new();
    if let Some(cn) = common_name {
        params.distinguished_name.push(DnType::CommonName, cn);
    }
    customize(&mut params);
    params.serialize_request(key).unwrap().der().to_vec()
}

/// DNS names in the certificate's SAN extension, in order.
pub fn dns_names(cert_der: &[u8]) -> Vec<String> {
    use x509_parser::extensions::GeneralName;

    let (_, cert) = x509_parser::parse_x509_certificate(cert_der).unwrap();
    match cert.subject_alternative_name().unwrap() {
        Some(san) => san
            .value
            .general_names
            .iter()
            .filter_map(|name| match name {
                GeneralName::DNSName(dns) => Some(dns.to_string()),
                _ => None,
            })
            .collect(),
        None => Vec::new(),
    }
}

pub const OID_DOMAIN_COMPONENT: &[u8] =
    &[0x09, 0x92, 0x26, 0x89, 0x93, 0xf2, 0x2c, 0x64, 0x01, 0x19];
pub const OID_COUNTRY: &[u8] = &[0x55, 0x04, 0x06];
pub const OID_ORGANIZATION: &[u8] = &[0x55, 0x04, 0x0a];
pub const OID_ORGANIZATIONAL_UNIT: &[u8] = &[0x55, 0x04, 0x0b];
pub const OID_COMMON_NAME: &[u8] = &[0x55, 0x04, 0x03];
const OID_ECDSA_WITH_SHA256: &[u8] = &[0x2a, 0x86, 0x48, 0xce, 0x3d, 0x04, 0x03, 0x02];

pub const TAG_UTF8_STRING: u8 = 0x0c;
pub const TAG_PRINTABLE_STRING: u8 = 0x13;
pub const TAG_TELETEX_STRING: u8 = 0x14;
pub const TAG_IA5_STRING: u8 = 0x16;

/// DER TLV with a definite length.
pub fn der(tag: u8, content: &[u8]) -> Vec<u8> {
    let len = content.len();
    let mut out = vec![tag];
    if len < 0x80 {
        out.push(len as u8);
    } else if len <= 0xff {
        out.extend([0x81, len as u8]);
    } else {
        out.extend([0x82, (len >> 8) as u8, len as u8]);
    }
    out.extend_from_slice(content);
    out
}

/// One single-valued RDN.
pub fn rdn(oid: &[u8], value_tag: u8, value: &str) -> Vec<u8> {
    let attribute = der(0x30, &[der(0x06, oid), der(value_tag, value.as_bytes())].concat());
    der(0x31, &attribute)
}

pub fn name(rdns: &[Vec<u8>]) -> Vec<u8> {
    der(0x30, &rdns.concat())
}

/// PKCS#10 request with an arbitrary raw subject, signed by a P-256 `key`.
pub fn csr_der_with_raw_subject(key: &KeyPair, subject: &[u8]) -> Vec<u8> {
    let info = der(
        0x30,
        &[
            der(0x02, &[0x00]),
            subject.to_vec(),
            key.subject_public_key_info(),
            vec![0xa0, 0x00],
        ]
        .concat(),
    );
    let signature = key.sign(&info).unwrap();
    let algorithm = der(0x30, &der(0x06, OID_ECDSA_WITH_SHA256));
    let bits = der(0x03, &[&[0x00][..], signature.as_slice()].concat());
    der(0x30, &[info, algorithm, bits].concat())
}
