//! Error types for the library

use std::path::PathBuf;
use thiserror::Error;

/// Stable tag for each error variant, for hosts that map failures to statuses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`CaError::StoreInvalid`]
    StoreInvalid,
    /// See [`CaError::StoreCorrupt`]
    StoreCorrupt,
    /// See [`CaError::KeyGenFailed`]
    KeyGenFailed,
    /// See [`CaError::SignFailed`]
    SignFailed,
    /// See [`CaError::InvalidSignature`]
    InvalidSignature,
    /// See [`CaError::InvalidHostname`]
    InvalidHostname,
    /// See [`CaError::EncodeFailed`]
    EncodeFailed,
    /// See [`CaError::MalformedRequest`]
    MalformedRequest,
    /// See [`CaError::UnsupportedKey`]
    UnsupportedKey,
    /// See [`CaError::Io`]
    Io,
}

/// Every failure the store and the engine report.
#[derive(Error, Debug)]
pub enum CaError {
    /// The configured store path exists but is not a directory
    #[error("the root store must be a directory: {}", .0.display())]
    StoreInvalid(PathBuf),

    /// Root key or certificate present but unusable
    #[error("corrupt root material in {}: {reason}", .path.display())]
    StoreCorrupt {
        /// Offending file
        path: PathBuf,
        /// What is wrong with it
        reason: String,
    },

    /// The key pair could not be generated
    #[error("key generation failed: {0}")]
    KeyGenFailed(String),

    /// The root could not sign a certificate
    #[error("certificate signing failed: {0}")]
    SignFailed(String),

    /// A request's self-signature does not verify
    #[error("certificate request signature does not verify: {0}")]
    InvalidSignature(String),

    /// A hostname violates the hostname grammar
    #[error("bad format for hostname: [{hostname}] (expected: '{pattern}')")]
    InvalidHostname {
        /// The rejected value
        hostname: String,
        /// Pattern it had to match
        pattern: &'static str,
    },

    /// Encoding an issued artifact failed
    #[error("encoding failed: {0}")]
    EncodeFailed(String),

    /// Request bytes that cannot be parsed or carried over
    #[error("malformed certificate request: {0}")]
    MalformedRequest(String),

    /// A request public key that cannot go into a certificate
    #[error("unsupported public key in certificate request: {0}")]
    UnsupportedKey(String),

    /// Filesystem failure
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl CaError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn corrupt(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::StoreCorrupt {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Stable tag for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::StoreInvalid(_) => ErrorKind::StoreInvalid,
            Self::StoreCorrupt { .. } => ErrorKind::StoreCorrupt,
            Self::KeyGenFailed(_) => ErrorKind::KeyGenFailed,
            Self::SignFailed(_) => ErrorKind::SignFailed,
            Self::InvalidSignature(_) => ErrorKind::InvalidSignature,
            Self::InvalidHostname { .. } => ErrorKind::InvalidHostname,
            Self::EncodeFailed(_) => ErrorKind::EncodeFailed,
            Self::MalformedRequest(_) => ErrorKind::MalformedRequest,
            Self::UnsupportedKey(_) => ErrorKind::UnsupportedKey,
            Self::Io { .. } => ErrorKind::Io,
        }
    }

    /// True for failures caused by a single issuance request.
    ///
    /// These never touch the cached root authority, so the host can keep
    /// serving. Everything else comes from loading or bootstrapping the store
    /// and should stop startup.
    pub fn is_request_scoped(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::InvalidSignature
                | ErrorKind::InvalidHostname
                | ErrorKind::SignFailed
                | ErrorKind::KeyGenFailed
                | ErrorKind::EncodeFailed
                | ErrorKind::MalformedRequest
                | ErrorKind::UnsupportedKey
        )
    }
}

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, CaError>;
