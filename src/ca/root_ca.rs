//! Root Certificate Authority

use std::path::{Path, PathBuf};

use log::debug;
use rcgen::{
    BasicConstraints, Certificate, CertificateParams, IsCa, Issuer, KeyPair, KeyUsagePurpose,
    PublicKeyData,
};
use x509_parser::parse_x509_certificate;
use zeroize::Zeroizing;

use super::serial::SerialNumber;
use crate::error::{CaError, Result};
use crate::x509::{decode_pem, distinguished_name, KeyAlgorithm, PemType, Validity};

/// Common name of every root this crate creates.
pub const ROOT_COMMON_NAME: &str = "Tiny CA";

/// The CA's identity: its signing key and self-signed certificate.
///
/// Only the store constructs one. Issuance borrows it; the key never leaves
/// the [`Issuer`] it is wrapped in.
pub struct RootAuthority {
    issuer: Issuer<'static, KeyPair>,
    cert_der: Vec<u8>,
    cert_pem: String,
    subject: String,
    serial: SerialNumber,
    validity: Validity,
    key_path: PathBuf,
    cert_path: PathBuf,
}

/// Freshly generated root material, not yet persisted.
pub(crate) struct GeneratedRoot {
    pub key_pem: Zeroizing<String>,
    pub cert_pem: String,
}

impl RootAuthority {
    /// Certificate template for a root: CA, path length 0, certSign only.
    fn params(serial: SerialNumber, validity: Validity) -> CertificateParams {
        let mut params = CertificateParams::default();
        params.distinguished_name = distinguished_name::common_name_only(ROOT_COMMON_NAME);
        params.serial_number = Some(serial.into());
        params.not_before = validity.not_before;
        params.not_after = validity.not_after;
        params.is_ca = IsCa::Ca(BasicConstraints::Constrained(0));
        params.key_usages = vec![KeyUsagePurpose::KeyCertSign];
        params
    }

    /// Generate a key pair and self-sign a root certificate with it.
    pub(crate) fn generate(key_algorithm: KeyAlgorithm) -> Result<GeneratedRoot> {
        let key = key_algorithm.generate()?;
        let serial = SerialNumber::random();
        let cert: Certificate = Self::params(serial, Validity::starting_now())
            .self_signed(&key)
            .map_err(|e| CaError::SignFailed(format!("self-signing root: {e}")))?;
        debug!("generated {key_algorithm} root, serial {serial}");

        Ok(GeneratedRoot {
            key_pem: Zeroizing::new(key.serialize_pem()),
            cert_pem: cert.pem(),
        })
    }

    /// Rebuild a root from its PEM containers.
    ///
    /// The paths are only used for error reporting and accessors.
    pub(crate) fn from_pem(
        key_pem: &str,
        cert_pem: &str,
        key_path: &Path,
        cert_path: &Path,
    ) -> Result<Self> {
        // Label check first: a swapped or foreign block is corruption
        decode_pem(key_pem, PemType::PrivateKey)
            .map(Zeroizing::new)
            .map_err(|e| CaError::corrupt(key_path, e))?;
        let cert_der = decode_pem(cert_pem, PemType::Certificate)
            .map_err(|e| CaError::corrupt(cert_path, e))?;

        let key = KeyPair::from_pem(key_pem)
            .map_err(|e| CaError::corrupt(key_path, format!("unreadable private key: {e}")))?;

        let (subject, serial, validity) = {
            let (_, cert) = parse_x509_certificate(&cert_der)
                .map_err(|e| CaError::corrupt(cert_path, format!("unreadable certificate: {e}")))?;

            let is_ca = cert
                .basic_constraints()
                .ok()
                .flatten()
                .map(|bc| bc.value.ca)
                .unwrap_or(false);
            if !is_ca {
                return Err(CaError::corrupt(cert_path, "certificate is not a CA"));
            }
            if cert.public_key().raw != key.subject_public_key_info().as_slice() {
                return Err(CaError::corrupt(
                    key_path,
                    "private key does not match the root certificate",
                ));
            }

            let serial = SerialNumber::from_be_slice(cert.raw_serial())
                .ok_or_else(|| CaError::corrupt(cert_path, "serial number wider than 128 bits"))?;
            let validity = Validity::new(
                cert.validity().not_before.to_datetime(),
                cert.validity().not_after.to_datetime(),
            );
            (cert.subject().to_string(), serial, validity)
        };

        let issuer = Issuer::from_ca_cert_pem(cert_pem, key)
            .map_err(|e| CaError::corrupt(cert_path, format!("unusable as issuer: {e}")))?;

        Ok(Self {
            issuer,
            cert_pem: cert_pem.to_string(),
            cert_der,
            subject,
            serial,
            validity,
            key_path: key_path.to_path_buf(),
            cert_path: cert_path.to_path_buf(),
        })
    }

    pub(crate) fn issuer(&self) -> &Issuer<'static, KeyPair> {
        &self.issuer
    }

    /// Root certificate, DER encoded.
    pub fn cert_der(&self) -> &[u8] {
        &self.cert_der
    }

    /// Root certificate as a `CERTIFICATE` PEM block.
    pub fn cert_pem(&self) -> &str {
        &self.cert_pem
    }

    /// Subject (and issuer) name in RFC 4514 style.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Root certificate serial number.
    pub fn serial(&self) -> SerialNumber {
        self.serial
    }

    /// Root certificate validity window.
    pub fn validity(&self) -> Validity {
        self.validity
    }

    /// File the private key was loaded from.
    pub fn key_path(&self) -> &Path {
        &self.key_path
    }

    /// File the certificate was loaded from.
    pub fn cert_path(&self) -> &Path {
        &self.cert_path
    }
}

impl std::fmt::Debug for RootAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RootAuthority")
            .field("subject", &self.subject)
            .field("serial", &self.serial)
            .field("cert_path", &self.cert_path)
            .finish_non_exhaustive()
    }
}
