//! Durable storage for the access/refresh token pair.
//!
//! DESIGN
//! ======
//! The store is a tiny key/value surface with atomic single-key operations,
//! mirroring browser local storage: exactly two keys are ever written
//! (`access_token`, `refresh_token`). The pipeline reads through it on every
//! request, so implementations must be cheap and never block on I/O for reads.
//!
//! ERROR HANDLING
//! ==============
//! Persistence failures in the file store are logged and swallowed. Losing a
//! token write degrades to "logged out on next start", which the session
//! store already handles; surfacing it would turn a storage hiccup into a
//! failed API call.

#[cfg(test)]
#[path = "tokens_test.rs"]
mod tokens_test;

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use records::TokenPair;
use tracing::{debug, warn};

/// Storage key for the access token.
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Storage key for the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Key/value persistence for bearer credentials.
pub trait TokenStore: Send + Sync {
    /// Read a value.
    fn get(&self, key: &str) -> Option<String>;
    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str);
    /// Delete a value. Missing keys are a no-op.
    fn remove(&self, key: &str);

    fn access_token(&self) -> Option<String> {
        self.get(ACCESS_TOKEN_KEY).filter(|t| !t.is_empty())
    }

    fn refresh_token(&self) -> Option<String> {
        self.get(REFRESH_TOKEN_KEY).filter(|t| !t.is_empty())
    }

    /// Persist both halves of a freshly issued pair.
    fn save_pair(&self, pair: &TokenPair) {
        self.set(ACCESS_TOKEN_KEY, &pair.access);
        self.set(REFRESH_TOKEN_KEY, &pair.refresh);
    }

    /// Drop both credentials.
    fn clear(&self) {
        self.remove(ACCESS_TOKEN_KEY);
        self.remove(REFRESH_TOKEN_KEY);
    }
}

// =============================================================================
// IN-MEMORY STORE
// =============================================================================

/// Process-local store, used for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with an existing pair.
    #[must_use]
    pub fn with_pair(pair: &TokenPair) -> Self {
        let store = Self::new();
        store.save_pair(pair);
        store
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: &str) -> Option<String> {
        let values = self.values.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        values.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut values = self.values.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        values.insert(key.to_owned(), value.to_owned());
    }

    fn remove(&self, key: &str) {
        let mut values = self.values.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        values.remove(key);
    }
}

// =============================================================================
// FILE STORE
// =============================================================================

/// JSON-file store that survives restarts.
///
/// Values are cached in memory and the whole map is rewritten on every
/// mutation via a temp file + rename, so a crash never leaves a torn file.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl FileTokenStore {
    /// Open (or lazily create) the store at `path`. An unreadable or corrupt
    /// file is treated as empty.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = read_values(&path);
        debug!(path = %path.display(), keys = values.len(), "token store opened");
        Self { path, values: Mutex::new(values) }
    }

    fn persist(&self, values: &BTreeMap<String, String>) {
        if let Err(e) = write_values(&self.path, values) {
            warn!(path = %self.path.display(), error = %e, "failed to persist tokens");
        }
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, key: &str) -> Option<String> {
        let values = self.values.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        values.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut values = self.values.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        values.insert(key.to_owned(), value.to_owned());
        self.persist(&values);
    }

    fn remove(&self, key: &str) {
        let mut values = self.values.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if values.remove(key).is_some() {
            self.persist(&values);
        }
    }
}

fn read_values(path: &Path) -> BTreeMap<String, String> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read token store");
            return BTreeMap::new();
        }
    };
    serde_json::from_str(&raw).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "token store is corrupt; starting empty");
        BTreeMap::new()
    })
}

fn write_values(path: &Path, values: &BTreeMap<String, String>) -> std::io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let body = serde_json::to_vec_pretty(values).map_err(std::io::Error::other)?;
    let tmp = path.with_extension("json.tmp");
    let mut file = owner_only().open(&tmp)?;
    restrict_to_owner(&file)?;
    file.write_all(&body)?;
    file.sync_all()?;
    drop(file);
    std::fs::rename(&tmp, path)
}

/// Tokens are bearer credentials: the file is readable by its owner only.
fn owner_only() -> OpenOptions {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options
}

// `mode` only applies on creation; a leftover temp file keeps its old bits.
#[cfg(unix)]
fn restrict_to_owner(file: &File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_to_owner(_file: &File) -> std::io::Result<()> {
    Ok(())
}
