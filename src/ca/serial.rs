//! Random 128-bit serial numbers

use std::fmt;

use rand::rngs::OsRng;
use rand::RngCore;

/// Serial number drawn uniformly from `[0, 2^128)`.
///
/// Collisions are not tracked; at 128 bits they are negligible.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SerialNumber(u128);

impl SerialNumber {
    /// Draw a serial from the OS random source.
    pub fn random() -> Self {
        let mut bytes = [0u8; 16];
        OsRng.fill_bytes(&mut bytes);
        Self(u128::from_be_bytes(bytes))
    }

    /// Serial with a fixed value.
    pub fn from_u128(value: u128) -> Self {
        Self(value)
    }

    /// Minimal big-endian magnitude, as a DER INTEGER stores it without sign padding.
    pub fn from_be_slice(bytes: &[u8]) -> Option<Self> {
        let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
        let magnitude = &bytes[start..];
        if magnitude.len() > 16 {
            return None;
        }
        let mut buf = [0u8; 16];
        buf[16 - magnitude.len()..].copy_from_slice(magnitude);
        Some(Self(u128::from_be_bytes(buf)))
    }

    /// The serial as an integer.
    pub fn as_u128(&self) -> u128 {
        self.0
    }

    /// Big-endian bytes with leading zeros stripped (at least one byte).
    pub fn to_be_bytes(&self) -> Vec<u8> {
        let bytes = self.0.to_be_bytes();
        let start = bytes.iter().position(|b| *b != 0).unwrap_or(15);
        bytes[start..].to_vec()
    }
}

impl From<SerialNumber> for rcgen::SerialNumber {
    fn from(serial: SerialNumber) -> Self {
        rcgen::SerialNumber::from_slice(&serial.to_be_bytes())
    }
}

impl fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}
