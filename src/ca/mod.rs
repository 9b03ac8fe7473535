//! Certificate Authority: root store and leaf issuance

pub mod issuer;
pub mod request;
pub mod root_ca;
pub mod serial;
pub mod store;

pub use issuer::{Engine, LeafCertificate};
pub use request::{AttributeRequest, IssuanceRequest};
pub use root_ca::{RootAuthority, ROOT_COMMON_NAME};
pub use serial::SerialNumber;
pub use store::Store;
