//! X.509 building blocks: PEM containers, names, keys, validity windows,
//! certificate signing requests and the hostname grammar.

pub mod csr;
pub mod distinguished_name;
pub mod hostname;
pub mod keys;
pub mod pem_der;
pub mod validity;

pub use csr::{CertificateRequest, RequestedExtension};
pub use hostname::{validate_hostname, validate_hostnames, HOSTNAME_PATTERN};
pub use keys::{CsrPublicKey, KeyAlgorithm};
pub use pem_der::{decode_pem, encode_pem, PemDecodeError, PemType};
pub use validity::Validity;

use x509_parser::oid_registry::Oid;

/// Dotted components of an object identifier, empty if it has arcs wider than 64 bits.
pub(crate) fn oid_components(oid: &Oid<'_>) -> Vec<u64> {
    oid.iter().map(|arcs| arcs.collect()).unwrap_or_default()
}
