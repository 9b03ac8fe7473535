//! PKCS#10 certificate signing requests

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use x509_parser::certification_request::X509CertificationRequest;
use x509_parser::cri_attributes::ParsedCriAttribute;
use x509_parser::prelude::FromDer;

use super::distinguished_name;
use super::oid_components;
use super::pem_der::{decode_pem, PemType};
use crate::error::{CaError, Result};

pub(crate) const SUBJECT_ALT_NAME: &[u64] = &[2, 5, 29, 17];

/// One extension from the request's extensionRequest attribute, kept as raw DER.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestedExtension {
    /// Object identifier arcs
    pub oid: Vec<u64>,
    /// Criticality flag as requested
    pub critical: bool,
    /// Contents of the extnValue OCTET STRING
    pub value: Vec<u8>,
}

impl RequestedExtension {
    /// Whether this is the subjectAltName extension.
    pub fn is_subject_alt_name(&self) -> bool {
        self.oid == SUBJECT_ALT_NAME
    }
}

/// A structurally valid certificate signing request.
///
/// Holds the DER bytes; the signature is only checked by
/// [`verify_signature`](Self::verify_signature), which issuance always calls first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CertificateRequest {
    der: Vec<u8>,
}

impl CertificateRequest {
    /// Parse a DER encoded request; the signature is not checked here.
    pub fn from_der(der: impl Into<Vec<u8>>) -> Result<Self> {
        let request = Self { der: der.into() };
        request.parsed()?;
        Ok(request)
    }

    /// Parse a `CERTIFICATE REQUEST` PEM block.
    pub fn from_pem(pem: &str) -> Result<Self> {
        let der = decode_pem(pem, PemType::CertificateRequest)
            .map_err(|e| CaError::MalformedRequest(e.to_string()))?;
        Self::from_der(der)
    }

    /// Parse a base64 encoded PEM block, the shape HTTP clients post.
    pub fn from_base64_pem(body: &str) -> Result<Self> {
        let compact: String = body.split_whitespace().collect();
        let decoded = BASE64
            .decode(compact.as_bytes())
            .map_err(|e| CaError::MalformedRequest(format!("invalid base64: {e}")))?;
        let pem = String::from_utf8(decoded)
            .map_err(|_| CaError::MalformedRequest("decoded body is not text".to_string()))?;
        Self::from_pem(&pem)
    }

    /// The request's DER encoding.
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    pub(crate) fn parsed(&self) -> Result<X509CertificationRequest<'_>> {
        let (rest, csr) = X509CertificationRequest::from_der(&self.der)
            .map_err(|e| CaError::MalformedRequest(e.to_string()))?;
        if !rest.is_empty() {
            return Err(CaError::MalformedRequest(format!(
                "{} trailing bytes after request",
                rest.len()
            )));
        }
        Ok(csr)
    }

    /// Check the self-signature against the request's own public key.
    pub fn verify_signature(&self) -> Result<()> {
        self.parsed()?
            .verify_signature()
            .map_err(|e| CaError::InvalidSignature(e.to_string()))
    }

    /// First common name of the subject.
    pub fn common_name(&self) -> Result<Option<String>> {
        let csr = self.parsed()?;
        Ok(distinguished_name::common_name(
            &csr.certification_request_info.subject,
        ))
    }

    /// Extensions requested through the extensionRequest attribute, in order.
    pub fn requested_extensions(&self) -> Result<Vec<RequestedExtension>> {
        let csr = self.parsed()?;
        let mut extensions = Vec::new();
        for attr in csr.certification_request_info.iter_attributes() {
            if let ParsedCriAttribute::ExtensionRequest(request) = attr.parsed_attribute() {
                extensions.extend(request.extensions.iter().map(|ext| RequestedExtension {
                    oid: oid_components(&ext.oid),
                    critical: ext.critical,
                    value: ext.value.to_vec(),
                }));
            }
        }
        Ok(extensions)
    }

    /// Whether a subjectAltName extension was requested.
    pub fn has_subject_alt_name(&self) -> Result<bool> {
        Ok(self
            .requested_extensions()?
            .iter()
            .any(RequestedExtension::is_subject_alt_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcgen::{CertificateParams, DistinguishedName, DnType, KeyPair};

    fn csr_der(sans: &[&str], cn: Option<&str>) -> Vec<u8> {
        let key = KeyPair::generate().unwrap();
        let mut params =
            CertificateParams::new(sans.iter().map(|s| s.to_string()).collect::<Vec<_>>()).unwrap();
        params.distinguished_name = DistinguishedName::new();
        if let Some(cn) = cn {
            params.distinguished_name.push(DnType::CommonName, cn);
        }
        params.serialize_request(&key).unwrap().der().to_vec()
    }

    #[test]
    fn test_parse_and_verify() {
        let csr = CertificateRequest::from_der(csr_der(&["a.test"], Some("a.test"))).unwrap();
        csr.verify_signature().unwrap();
        assert_eq!(csr.common_name().unwrap().as_deref(), Some("a.test"));
        assert!(csr.has_subject_alt_name().unwrap());
    }

    #[test]
    fn test_no_extensions() {
        let csr = CertificateRequest::from_der(csr_der(&[], Some("plain.test"))).unwrap();
        assert!(!csr.has_subject_alt_name().unwrap());
        assert!(csr.requested_extensions().unwrap().is_empty());
    }

    #[test]
    fn test_tampered_signature_fails_verification() {
        let mut der = csr_der(&["a.test"], Some("a.test"));
        let last = der.len() - 1;
        der[last] ^= 0xff;
        let csr = CertificateRequest::from_der(der).unwrap();
        assert!(matches!(
            csr.verify_signature(),
            Err(CaError::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert!(matches!(
            CertificateRequest::from_der(vec![0x30, 0x03, 0x01, 0x01, 0xff]),
            Err(CaError::MalformedRequest(_))
        ));
    }

    #[test]
    fn test_pem_and_base64_forms() {
        let der = csr_der(&["b.test"], None);
        let pem = crate::x509::encode_pem(&der, PemType::CertificateRequest);
        assert_eq!(CertificateRequest::from_pem(&pem).unwrap().der(), der.as_slice());

        let body = BASE64.encode(pem.as_bytes());
        assert_eq!(
            CertificateRequest::from_base64_pem(&body).unwrap().der(),
            der.as_slice()
        );

        let cert_pem = crate::x509::encode_pem(&der, PemType::Certificate);
        assert!(matches!(
            CertificateRequest::from_pem(&cert_pem),
            Err(CaError::MalformedRequest(_))
        ));
        assert!(matches!(
            CertificateRequest::from_base64_pem("%%%"),
            Err(CaError::MalformedRequest(_))
        ));
    }
}
