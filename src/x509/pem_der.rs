//! PEM containers for keys, certificates and certificate requests

use pem::{EncodeConfig, LineEnding, Pem};
use thiserror::Error;

/// PEM types
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PemType {
    /// X.509 certificate
    Certificate,
    /// PKCS#8 private key
    PrivateKey,
    /// PKCS#10 certificate signing request
    CertificateRequest,
}

impl PemType {
    /// Get PEM header for this type
    pub fn header(&self) -> &'static str {
        match self {
            Self::Certificate => "CERTIFICATE",
            Self::PrivateKey => "PRIVATE KEY",
            Self::CertificateRequest => "CERTIFICATE REQUEST",
        }
    }
}

/// Why a PEM block could not be decoded.
#[derive(Error, Debug)]
pub enum PemDecodeError {
    /// Not PEM at all
    #[error("not a PEM block: {0}")]
    Pem(#[from] pem::PemError),

    /// Valid PEM with a different label
    #[error("unexpected PEM label: expected {expected}, found {found}")]
    UnexpectedLabel {
        /// Label the caller asked for
        expected: &'static str,
        /// Label in the input
        found: String,
    },
}

/// Encode DER bytes as a single PEM block with LF line endings.
pub fn encode_pem(data: &[u8], pem_type: PemType) -> String {
    let block = Pem::new(pem_type.header(), data.to_vec());
    pem::encode_config(&block, EncodeConfig::new().set_line_ending(LineEnding::LF))
}

/// Decode the first PEM block in `input`, which must carry `expected`'s label.
pub fn decode_pem(input: &str, expected: PemType) -> Result<Vec<u8>, PemDecodeError> {
    let block = pem::parse(input)?;
    if block.tag() != expected.header() {
        return Err(PemDecodeError::UnexpectedLabel {
            expected: expected.header(),
            found: block.tag().to_string(),
        });
    }
    Ok(block.into_contents())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_uses_standard_armor() {
        let pem = encode_pem(&[0x30, 0x03, 0x02, 0x01, 0x01], PemType::Certificate);
        assert!(pem.starts_with("-----BEGIN CERTIFICATE-----\n"));
        assert!(pem.ends_with("-----END CERTIFICATE-----\n"));
        assert!(!pem.contains('\r'));
    }

    #[test]
    fn test_decode_rejects_wrong_label() {
        let pem = encode_pem(b"not a key", PemType::Certificate);
        let err = decode_pem(&pem, PemType::PrivateKey).unwrap_err();
        let PemDecodeError::UnexpectedLabel { expected, found } = err else {
            panic!("expected a label mismatch");
        };
        assert_eq!(expected, "PRIVATE KEY");
        assert_eq!(found, "CERTIFICATE");
    }

    #[test]
    fn test_decode_skips_leading_text() {
        let body = vec![7u8; 100];
        let pem = format!("comment line\n{}", encode_pem(&body, PemType::CertificateRequest));
        assert_eq!(decode_pem(&pem, PemType::CertificateRequest).unwrap(), body);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode_pem("garbage", PemType::PrivateKey),
            Err(PemDecodeError::Pem(_))
        ));
    }
}
