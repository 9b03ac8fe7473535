//! Tiny CA
//!
//! A minimal certification authority engine: it owns a self-signed root key
//! pair and issues leaf certificates from it.
//!
//! # Features
//!
//! - **Store**: bootstraps the root key and certificate in a directory once,
//!   then loads and caches them for the life of the process
//! - **Issuance**: leaf certificates from hostnames/IP addresses (fresh key
//!   pair included) or from a PKCS#10 certificate signing request
//! - **Containers**: PEM `PRIVATE KEY`, `CERTIFICATE` and
//!   `CERTIFICATE REQUEST` blocks
//!
//! # Example
//!
//! ```rust,no_run
//! use tinyca::{Engine, EngineConfig, Store, StoreConfig};
//!
//! let store = Store::new(StoreConfig::from_env());
//! let root = store.open()?;
//!
//! let engine = Engine::new(EngineConfig::default());
//! let leaf = engine.issue_from_attributes(
//!     &root,
//!     &["localhost".to_string()],
//!     &["127.0.0.1".parse().unwrap()],
//! )?;
//! println!("{}", leaf.to_pem_string());
//! # Ok::<(), tinyca::CaError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod ca;
pub mod config;
pub mod error;
pub mod x509;

pub use ca::{
    AttributeRequest, Engine, IssuanceRequest, LeafCertificate, RootAuthority, SerialNumber,
    Store,
};
pub use config::{EngineConfig, StoreConfig};
pub use error::{CaError, ErrorKind, Result};
pub use x509::{CertificateRequest, KeyAlgorithm};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
