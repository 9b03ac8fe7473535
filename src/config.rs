//! Store and engine configuration

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::x509::KeyAlgorithm;

/// Environment variable overriding the store directory.
pub const ENV_STORE_DIR: &str = "CAROOT";
/// Environment variable overriding the root key file name.
pub const ENV_KEY_FILE: &str = "KEYNAME";
/// Environment variable overriding the root certificate file name.
pub const ENV_CERT_FILE: &str = "CRTNAME";

/// Root key file name when none is configured.
pub const DEFAULT_KEY_FILE: &str = "CAKey.pem";
/// Root certificate file name when none is configured.
pub const DEFAULT_CERT_FILE: &str = "CACrt.pem";
/// Subject organization of every attribute-path leaf.
pub const DEFAULT_LEAF_ORGANIZATION: &str = "Tiny CA development certificate";

/// Where the root authority lives and how it is generated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Explicit store directory. `None` selects the per-user data directory.
    pub store_dir: Option<PathBuf>,
    /// Root private key file name inside the store
    pub key_file: String,
    /// Root certificate file name inside the store
    pub cert_file: String,
    /// Key type used when bootstrapping a new root.
    pub key_algorithm: KeyAlgorithm,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            store_dir: None,
            key_file: DEFAULT_KEY_FILE.to_string(),
            cert_file: DEFAULT_CERT_FILE.to_string(),
            key_algorithm: KeyAlgorithm::default(),
        }
    }
}

impl StoreConfig {
    /// Read `CAROOT`, `KEYNAME` and `CRTNAME` from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; unset or empty values keep the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).filter(|value| !value.is_empty());
        let defaults = Self::default();
        Self {
            store_dir: get(ENV_STORE_DIR).map(PathBuf::from),
            key_file: get(ENV_KEY_FILE).unwrap_or(defaults.key_file),
            cert_file: get(ENV_CERT_FILE).unwrap_or(defaults.cert_file),
            key_algorithm: defaults.key_algorithm,
        }
    }

    /// Use `dir` instead of the per-user default.
    pub fn with_store_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.store_dir = Some(dir.into());
        self
    }

    /// Key type for a newly created root.
    pub fn with_key_algorithm(mut self, key_algorithm: KeyAlgorithm) -> Self {
        self.key_algorithm = key_algorithm;
        self
    }

    /// `<data dir>/tinyca`, e.g. `~/.local/share/tinyca` on Linux.
    pub fn default_store_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("tinyca"))
    }
}

/// Issuance policy knobs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Key type generated for attribute-path leaves.
    pub key_algorithm: KeyAlgorithm,
    /// Organization in the subject of attribute-path leaves.
    pub leaf_organization: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            key_algorithm: KeyAlgorithm::default(),
            leaf_organization: DEFAULT_LEAF_ORGANIZATION.to_string(),
        }
    }
}

impl EngineConfig {
    /// Key type generated for attribute-path leaves.
    pub fn with_key_algorithm(mut self, key_algorithm: KeyAlgorithm) -> Self {
        self.key_algorithm = key_algorithm;
        self
    }
}
