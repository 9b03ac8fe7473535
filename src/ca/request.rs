//! Issuance request shapes

use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::x509::{validate_hostnames, CertificateRequest};

/// What a caller asks the engine to certify.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IssuanceRequest {
    /// Hostnames and addresses; the engine generates the key pair.
    ByAttributes {
        /// DNS names, in SAN order
        hostnames: Vec<String>,
        /// IP addresses, after the DNS names
        addresses: Vec<IpAddr>,
    },
    /// A signing request carrying the caller's own public key.
    ByCsr(CertificateRequest),
}

/// Attribute request in the JSON shape HTTP clients send:
/// `{"dnsNames": [...], "IPs": [...]}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeRequest {
    /// DNS names for the SAN extension
    #[serde(rename = "dnsNames", default)]
    pub hostnames: Vec<String>,
    /// IP addresses for the SAN extension
    #[serde(rename = "IPs", default)]
    pub addresses: Vec<IpAddr>,
}

impl AttributeRequest {
    /// Check every hostname against the grammar.
    pub fn validate(&self) -> Result<()> {
        validate_hostnames(&self.hostnames)
    }

    /// Validate and turn into an [`IssuanceRequest`].
    pub fn into_request(self) -> Result<IssuanceRequest> {
        self.validate()?;
        Ok(IssuanceRequest::ByAttributes {
            hostnames: self.hostnames,
            addresses: self.addresses,
        })
    }
}

impl From<CertificateRequest> for IssuanceRequest {
    fn from(csr: CertificateRequest) -> Self {
        Self::ByCsr(csr)
    }
}
