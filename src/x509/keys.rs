//! Key generation profiles and CSR public keys

use std::fmt;
use std::str::FromStr;

use rcgen::{KeyPair, PublicKeyData, RsaKeySize, SignatureAlgorithm};
use serde::{Deserialize, Serialize};
use x509_parser::x509::SubjectPublicKeyInfo;

use super::oid_components;
use crate::error::{CaError, Result};

const RSA_ENCRYPTION: &[u64] = &[1, 2, 840, 113549, 1, 1, 1];
const EC_PUBLIC_KEY: &[u64] = &[1, 2, 840, 10045, 2, 1];
const ED25519: &[u64] = &[1, 3, 101, 112];
const SECP256R1: &[u64] = &[1, 2, 840, 10045, 3, 1, 7];
const SECP384R1: &[u64] = &[1, 3, 132, 0, 34];

/// Key type generated for the root and for attribute-path leaves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyAlgorithm {
    /// RSA 2048, PKCS#1 v1.5 with SHA-256
    Rsa2048,
    /// RSA 3072, PKCS#1 v1.5 with SHA-256
    Rsa3072,
    /// RSA 4096, PKCS#1 v1.5 with SHA-256
    #[default]
    Rsa4096,
    /// ECDSA on P-256 with SHA-256
    EcdsaP256,
    /// ECDSA on P-384 with SHA-384
    EcdsaP384,
    /// Ed25519
    Ed25519,
}

impl KeyAlgorithm {
    /// Every profile, in display order.
    pub const ALL: [KeyAlgorithm; 6] = [
        Self::Rsa2048,
        Self::Rsa3072,
        Self::Rsa4096,
        Self::EcdsaP256,
        Self::EcdsaP384,
        Self::Ed25519,
    ];

    /// Stable lowercase name, as accepted by `FromStr`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Rsa2048 => "rsa-2048",
            Self::Rsa3072 => "rsa-3072",
            Self::Rsa4096 => "rsa-4096",
            Self::EcdsaP256 => "ecdsa-p256",
            Self::EcdsaP384 => "ecdsa-p384",
            Self::Ed25519 => "ed25519",
        }
    }

    /// Signature algorithm a key of this type signs with.
    pub fn signature_algorithm(&self) -> &'static SignatureAlgorithm {
        match self {
            Self::Rsa2048 | Self::Rsa3072 | Self::Rsa4096 => &rcgen::PKCS_RSA_SHA256,
            Self::EcdsaP256 => &rcgen::PKCS_ECDSA_P256_SHA256,
            Self::EcdsaP384 => &rcgen::PKCS_ECDSA_P384_SHA384,
            Self::Ed25519 => &rcgen::PKCS_ED25519,
        }
    }

    /// Generate a fresh key pair from the OS random source.
    pub fn generate(&self) -> Result<KeyPair> {
        let alg = self.signature_algorithm();
        let generated = match self {
            Self::Rsa2048 => KeyPair::generate_rsa_for(alg, RsaKeySize::_2048),
            Self::Rsa3072 => KeyPair::generate_rsa_for(alg, RsaKeySize::_3072),
            Self::Rsa4096 => KeyPair::generate_rsa_for(alg, RsaKeySize::_4096),
            Self::EcdsaP256 | Self::EcdsaP384 | Self::Ed25519 => KeyPair::generate_for(alg),
        };
        generated.map_err(|e| CaError::KeyGenFailed(format!("{}: {e}", self.name())))
    }
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KeyAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|alg| alg.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let names: Vec<_> = Self::ALL.iter().map(|a| a.name()).collect();
                format!("unknown key algorithm '{s}' (expected one of: {})", names.join(", "))
            })
    }
}

/// Public key lifted out of a certificate request.
///
/// Signing a certificate only needs the subject's public key, so this is
/// what the CSR path hands to the issuer instead of a key pair.
#[derive(Clone, Debug)]
pub struct CsrPublicKey {
    /// Contents of the subjectPublicKey BIT STRING
    key: Vec<u8>,
    algorithm: &'static SignatureAlgorithm,
}

impl CsrPublicKey {
    /// Lift the key out of a request's SubjectPublicKeyInfo.
    ///
    /// RSA, P-256, P-384 and Ed25519 keys are accepted.
    pub fn from_spki(spki: &SubjectPublicKeyInfo<'_>) -> Result<Self> {
        let alg_oid = oid_components(&spki.algorithm.algorithm);
        let algorithm: &'static SignatureAlgorithm = match alg_oid.as_slice() {
            RSA_ENCRYPTION => &rcgen::PKCS_RSA_SHA256,
            ED25519 => &rcgen::PKCS_ED25519,
            EC_PUBLIC_KEY => {
                let curve = spki
                    .algorithm
                    .parameters
                    .as_ref()
                    .and_then(|p| p.as_oid().ok())
                    .map(|oid| oid_components(&oid))
                    .unwrap_or_default();
                match curve.as_slice() {
                    SECP256R1 => &rcgen::PKCS_ECDSA_P256_SHA256,
                    SECP384R1 => &rcgen::PKCS_ECDSA_P384_SHA384,
                    _ => {
                        return Err(CaError::UnsupportedKey(format!(
                            "EC curve {}",
                            dotted(&curve)
                        )))
                    }
                }
            }
            _ => {
                return Err(CaError::UnsupportedKey(format!(
                    "algorithm {}",
                    dotted(&alg_oid)
                )))
            }
        };

        Ok(Self {
            key: spki.subject_public_key.data.to_vec(),
            algorithm,
        })
    }
}

impl PublicKeyData for CsrPublicKey {
    fn der_bytes(&self) -> &[u8] {
        &self.key
    }

    fn algorithm(&self) -> &'static SignatureAlgorithm {
        self.algorithm
    }
}

fn dotted(components: &[u64]) -> String {
    if components.is_empty() {
        return "<none>".to_string();
    }
    components
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(".")
}
