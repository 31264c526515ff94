//! Persistent session state and 401 handling

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::config::SessionPolicy;
use crate::error::StoreError;

/// Persistent client-side key/value storage
///
/// The credential is written by an external sign-in flow; the client only
/// reads it and clears it on 401.
pub trait SessionStore: Send + Sync {
    /// Read a value
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete a value
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be written.
    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Every stored key
    fn keys(&self) -> Vec<String>;
}

/// In-process storage
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries().remove(key);
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.entries().keys().cloned().collect()
    }
}

/// JSON file storage, written through on every change
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`; a missing file is an empty store
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Location of the backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn update(&self, f: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut entries);
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&*entries)?)?;
        Ok(())
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.update(|entries| {
            entries.remove(key);
        })
    }

    fn keys(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }
}

/// Sends the user back to the sign-in entry point
pub trait SignInRedirect: Send + Sync {
    fn redirect(&self, sign_in_path: &str);
}

/// Redirect that only logs
#[derive(Debug, Default, Clone, Copy)]
pub struct LogRedirect;

impl SignInRedirect for LogRedirect {
    fn redirect(&self, sign_in_path: &str) {
        tracing::warn!(sign_in_path, "session expired, sign in again");
    }
}

/// Owns the credential lifecycle of one client
///
/// Teardown runs at most once per session: after the first 401 the latch
/// stays set until [`SessionGuard::sign_in`] runs or a credential other than
/// the torn-down one shows up in storage.
pub struct SessionGuard {
    store: Arc<dyn SessionStore>,
    redirect: Arc<dyn SignInRedirect>,
    policy: SessionPolicy,
    sign_in_path: String,
    torn_down: AtomicBool,
    revoked: Mutex<Option<String>>,
}

impl SessionGuard {
    /// Create a guard over `store`
    pub fn new(
        store: Arc<dyn SessionStore>,
        redirect: Arc<dyn SignInRedirect>,
        policy: SessionPolicy,
        sign_in_path: impl Into<String>,
    ) -> Self {
        Self {
            store,
            redirect,
            policy,
            sign_in_path: sign_in_path.into(),
            torn_down: AtomicBool::new(false),
            revoked: Mutex::new(None),
        }
    }

    /// Current bearer credential, if one is stored
    pub fn credential(&self) -> Option<String> {
        let token = self
            .store
            .get(&self.policy.token_key)
            .filter(|t| !t.is_empty());
        if let Some(token) = &token {
            let revoked = self.revoked.lock().unwrap_or_else(PoisonError::into_inner);
            if revoked.as_deref() != Some(token.as_str()) {
                self.torn_down.store(false, Ordering::SeqCst);
            }
        }
        token
    }

    /// Store a new credential
    ///
    /// # Errors
    /// Returns an error if the store cannot be written.
    pub fn sign_in(&self, token: &str) -> Result<(), StoreError> {
        self.store.set(&self.policy.token_key, token)?;
        *self.revoked.lock().unwrap_or_else(PoisonError::into_inner) = None;
        self.torn_down.store(false, Ordering::SeqCst);
        Ok(())
    }

    /// Clear every session key without redirecting
    ///
    /// # Errors
    /// Returns an error if the store cannot be written.
    pub fn sign_out(&self) -> Result<(), StoreError> {
        for key in self.session_keys() {
            self.store.remove(&key)?;
        }
        Ok(())
    }

    /// Clear the session and redirect to sign-in
    ///
    /// Returns `false` without side effects if the session was already torn
    /// down.
    pub fn teardown(&self) -> bool {
        if self.torn_down.swap(true, Ordering::SeqCst) {
            tracing::debug!("session already torn down");
            return false;
        }

        *self.revoked.lock().unwrap_or_else(PoisonError::into_inner) =
            self.store.get(&self.policy.token_key);
        let keys = self.session_keys();
        tracing::info!(keys = keys.len(), "clearing session after 401");
        for key in keys {
            if let Err(e) = self.store.remove(&key) {
                tracing::error!(key = %key, error = %e, "failed to clear session key");
            }
        }
        self.redirect.redirect(&self.sign_in_path);
        true
    }

    fn session_keys(&self) -> Vec<String> {
        self.store
            .keys()
            .into_iter()
            .filter(|k| self.policy.owns(k))
            .collect()
    }
}
