//! Root key/certificate store
//!
//! Bootstraps the root authority in a directory on first use and loads it
//! once per [`Store`]. Every later [`Store::open`] returns the same
//! in-memory instance.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use fd_lock::RwLock;
use log::info;

use super::root_ca::RootAuthority;
use crate::config::StoreConfig;
use crate::error::{CaError, Result};

/// Advisory lock serializing check-and-create across processes.
const LOCK_FILE: &str = ".tinyca.lock";

#[cfg(unix)]
const DIR_MODE_RESTRICTED: u32 = 0o700;
#[cfg(unix)]
const FILE_MODE_RESTRICTED: u32 = 0o600;

/// Owner of the root authority for one configured location.
pub struct Store {
    config: StoreConfig,
    root: OnceLock<Arc<RootAuthority>>,
    init: Mutex<()>,
}

impl Store {
    /// Store for `config`; nothing touches the disk until [`open`](Self::open).
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            root: OnceLock::new(),
            init: Mutex::new(()),
        }
    }

    /// Store rooted at `dir` with explicit file names and default key type.
    pub fn with_paths(
        dir: impl Into<PathBuf>,
        key_file: impl Into<String>,
        cert_file: impl Into<String>,
    ) -> Self {
        Self::new(StoreConfig {
            store_dir: Some(dir.into()),
            key_file: key_file.into(),
            cert_file: cert_file.into(),
            ..StoreConfig::default()
        })
    }

    /// Configuration this store was built with.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Load the root authority, creating it on disk first if either file is missing.
    ///
    /// Concurrent first calls are serialized: exactly one caller bootstraps,
    /// the rest wait and receive the same instance. A failed attempt caches
    /// nothing, so a later call tries again.
    pub fn open(&self) -> Result<Arc<RootAuthority>> {
        if let Some(root) = self.root.get() {
            return Ok(Arc::clone(root));
        }

        let _guard = self.init.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(root) = self.root.get() {
            return Ok(Arc::clone(root));
        }

        let root = Arc::new(self.load_or_bootstrap()?);
        // Only this thread sets the cell while holding the init lock
        let root = self.root.get_or_init(|| root);
        Ok(Arc::clone(root))
    }

    /// The cached root, if `open` has already succeeded.
    pub fn get(&self) -> Option<Arc<RootAuthority>> {
        self.root.get().cloned()
    }

    fn load_or_bootstrap(&self) -> Result<RootAuthority> {
        info!("check the CA key and certificate...");
        let dir = self.resolve_dir()?;
        info!("CA store: {}", dir.display());

        let key_path = dir.join(&self.config.key_file);
        let cert_path = dir.join(&self.config.cert_file);

        // Other stores and processes on the same directory wait here
        let lock_path = dir.join(LOCK_FILE);
        let mut lock = RwLock::new(open_lock_file(&lock_path)?);
        let _held = lock.write().map_err(|e| CaError::io(&lock_path, e))?;

        let key_exists = exists(&key_path)?;
        let cert_exists = exists(&cert_path)?;
        if !key_exists || !cert_exists {
            info!(
                "creating the CA key and the CA certificate ({})...",
                self.config.key_algorithm
            );
            let generated = RootAuthority::generate(self.config.key_algorithm)?;
            write_restricted(&key_path, generated.key_pem.as_bytes())?;
            write_restricted(&cert_path, generated.cert_pem.as_bytes())?;
        }

        let key_pem = zeroize::Zeroizing::new(
            fs::read_to_string(&key_path).map_err(|e| read_error(&key_path, e))?,
        );
        let cert_pem = fs::read_to_string(&cert_path).map_err(|e| read_error(&cert_path, e))?;
        let root = RootAuthority::from_pem(&key_pem, &cert_pem, &key_path, &cert_path)?;

        info!("the CA key and certificate are loaded properly!");
        info!("CA key: {}", key_path.display());
        info!("CA crt: {}", cert_path.display());
        Ok(root)
    }

    fn resolve_dir(&self) -> Result<PathBuf> {
        resolve_store_dir(self.config.store_dir.as_deref(), StoreConfig::default_store_dir)
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("config", &self.config)
            .field("loaded", &self.root.get().is_some())
            .finish()
    }
}

/// An explicit directory must already exist; the default one is created.
fn resolve_store_dir(
    explicit: Option<&Path>,
    default_dir: impl FnOnce() -> Option<PathBuf>,
) -> Result<PathBuf> {
    let dir = match explicit {
        Some(dir) => dir.to_path_buf(),
        None => {
            let dir = default_dir().ok_or_else(|| {
                CaError::io(
                    "<data dir>",
                    io::Error::new(io::ErrorKind::NotFound, "no per-user data directory"),
                )
            })?;
            if !exists(&dir)? {
                create_restricted_dir(&dir)?;
            }
            dir
        }
    };

    let meta = fs::metadata(&dir).map_err(|e| CaError::io(&dir, e))?;
    if !meta.is_dir() {
        return Err(CaError::StoreInvalid(dir));
    }
    Ok(dir)
}

fn exists(path: &Path) -> Result<bool> {
    match fs::symlink_metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(CaError::io(path, e)),
    }
}

/// Unreadable bytes are corruption; permission and other I/O problems are not.
fn read_error(path: &Path, e: io::Error) -> CaError {
    if e.kind() == io::ErrorKind::InvalidData {
        CaError::corrupt(path, "file is not valid UTF-8 text")
    } else {
        CaError::io(path, e)
    }
}

fn open_lock_file(path: &Path) -> Result<fs::File> {
    let mut options = fs::OpenOptions::new();
    options.read(true).write(true).create(true).truncate(false);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(FILE_MODE_RESTRICTED);
    }
    options.open(path).map_err(|e| CaError::io(path, e))
}

fn create_restricted_dir(dir: &Path) -> Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIR_MODE_RESTRICTED);
    }
    builder.create(dir).map_err(|e| CaError::io(dir, e))
}

/// Owner-only write through a temp file, fsync and rename.
///
/// Readers see either no file or the complete file, never a partial one.
fn write_restricted(path: &Path, contents: &[u8]) -> Result<()> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = path.with_file_name(format!(".{file_name}.tmp"));

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(FILE_MODE_RESTRICTED);
    }

    let mut file = options
        .open(&temp_path)
        .map_err(|e| CaError::io(&temp_path, e))?;
    file.write_all(contents)
        .and_then(|_| file.sync_all())
        .map_err(|e| CaError::io(&temp_path, e))?;
    drop(file);

    fs::rename(&temp_path, path).map_err(|e| CaError::io(path, e))?;

    #[cfg(unix)]
    if let Some(parent) = path.parent() {
        // Persist the directory entry as well
        fs::File::open(parent)
            .and_then(|dir| dir.sync_all())
            .map_err(|e| CaError::io(parent, e))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::x509::KeyAlgorithm;
    use tempfile::TempDir;

    fn fast_store(dir: &Path) -> Store {
        Store::new(
            StoreConfig::default()
                .with_store_dir(dir)
                .with_key_algorithm(KeyAlgorithm::EcdsaP256),
        )
    }

    #[test]
    fn test_write_restricted_replaces_atomically() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("CAKey.pem");

        write_restricted(&path, b"first").unwrap();
        write_restricted(&path, b"second").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"second");
        assert!(!temp_dir.path().join(".CAKey.pem.tmp").exists());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn test_missing_explicit_dir_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let store = fast_store(&temp_dir.path().join("absent"));
        let err = store.open().unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Io);
        assert!(store.get().is_none());
    }

    #[test]
    fn test_default_dir_created_owner_only() {
        let temp_dir = TempDir::new().unwrap();
        let default_dir = temp_dir.path().join("data").join("tinyca");

        let dir = resolve_store_dir(None, || Some(default_dir.clone())).unwrap();
        assert_eq!(dir, default_dir);
        assert!(dir.is_dir());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&dir).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o700);
        }

        // Existing default dir is reused as is
        assert_eq!(resolve_store_dir(None, || Some(default_dir.clone())).unwrap(), default_dir);
    }

    #[test]
    fn test_default_dir_is_a_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("tinyca");
        fs::write(&file, "x").unwrap();

        let err = resolve_store_dir(None, || Some(file.clone())).unwrap_err();
        assert!(matches!(err, CaError::StoreInvalid(ref path) if *path == file));
    }

    #[test]
    fn test_no_data_dir_is_io_error() {
        let err = resolve_store_dir(None, || None).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Io);
    }

    #[test]
    fn test_explicit_dir_wins_over_default() {
        let temp_dir = TempDir::new().unwrap();
        let unused = temp_dir.path().join("unused");

        let dir = resolve_store_dir(Some(temp_dir.path()), || Some(unused.clone())).unwrap();
        assert_eq!(dir, temp_dir.path());
        assert!(!unused.exists());
    }

    #[test]
    fn test_only_one_file_present_regenerates_both() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("CACrt.pem"), "stale").unwrap();

        let root = fast_store(temp_dir.path()).open().unwrap();
        let on_disk = fs::read_to_string(temp_dir.path().join("CACrt.pem")).unwrap();
        assert_eq!(on_disk, root.cert_pem());
    }
}
