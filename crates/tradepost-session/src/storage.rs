//! Durable storage for the credential token.
//!
//! The token is the only piece of session state that outlives the
//! process. Everything else is rebuilt from it by
//! [`SessionStore::initialize`](crate::SessionStore::initialize).

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::StorageError;

/// Key/value storage for opaque token strings.
///
/// Synchronous on purpose: reads and writes are tiny, and the store
/// calls them between awaits, never while holding anything a network
/// call needs.
pub trait TokenStore: Send + Sync + 'static {
    /// Returns the token stored under `key`, if any.
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `token` under `key`, replacing any previous value.
    fn save(&self, key: &str, token: &str) -> Result<(), StorageError>;

    /// Removes the token under `key`. Removing a missing key is not an
    /// error.
    fn clear(&self, key: &str) -> Result<(), StorageError>;
}

// ---------------------------------------------------------------------------
// MemoryTokenStore
// ---------------------------------------------------------------------------

/// Process-local storage. Survives nothing, which makes it the right
/// choice for tests and for clients that must not write to disk.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `token` under `key`, as if a previous
    /// run had logged in.
    pub fn with_token(key: &str, token: &str) -> Self {
        let store = Self::new();
        if let Ok(mut entries) = store.entries.lock() {
            entries.insert(key.to_string(), token.to_string());
        }
        store
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StorageError>
    {
        self.entries
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn save(&self, key: &str, token: &str) -> Result<(), StorageError> {
        self.lock()?.insert(key.to_string(), token.to_string());
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<(), StorageError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FileTokenStore
// ---------------------------------------------------------------------------

/// Stores tokens in a JSON object on disk: `{"authToken": "..."}`.
///
/// A missing file reads as empty. Writes go through a file opened with
/// mode 0600 on unix so other local users can't read the token.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<HashMap<String, String>, StorageError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Ok(HashMap::new());
            }
            Err(source) => {
                return Err(StorageError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        if contents.trim().is_empty() {
            return Ok(HashMap::new());
        }

        serde_json::from_str(&contents).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Entries to base a write on. A corrupt file is replaced rather than
    /// patched; the flag reports that it must be rewritten.
    fn read_for_write(
        &self,
    ) -> Result<(HashMap<String, String>, bool), StorageError> {
        match self.read_all() {
            Ok(entries) => Ok((entries, false)),
            Err(StorageError::Corrupt { path, source }) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %source,
                    "token file is corrupt, overwriting it"
                );
                Ok((HashMap::new(), true))
            }
            Err(e) => Err(e),
        }
    }

    fn write_all(
        &self,
        entries: &HashMap<String, String>,
    ) -> Result<(), StorageError> {
        let io_err = |source| StorageError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let contents =
            serde_json::to_string_pretty(entries).map_err(|source| {
                StorageError::Corrupt {
                    path: self.path.clone(),
                    source,
                }
            })?;

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&self.path).map_err(io_err)?;
        file.write_all(contents.as_bytes()).map_err(io_err)?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_all()?.remove(key))
    }

    fn save(&self, key: &str, token: &str) -> Result<(), StorageError> {
        let (mut entries, _) = self.read_for_write()?;
        entries.insert(key.to_string(), token.to_string());
        self.write_all(&entries)
    }

    fn clear(&self, key: &str) -> Result<(), StorageError> {
        let (mut entries, reset) = self.read_for_write()?;
        if entries.remove(key).is_none() && !reset {
            return Ok(());
        }
        self.write_all(&entries)
    }
}
