use async_trait::async_trait;
use std::{
    collections::HashMap,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::{Arc, PoisonError, RwLock},
};
use tokio::sync::Mutex;

use crate::{error::SessionError, guard::SessionContext};

/// Key under which the session flag is persisted.
pub const AUTH_STATE_KEY: &str = "authentication-state";

// 1. SessionStore Contract
/// SessionStore
///
/// The persistent key-value collaborator holding session state. Values are strings; the
/// session flag is stored as `"true"` under `AUTH_STATE_KEY`.
///
/// Swapping the file-backed store for the in-memory one in tests does not affect handlers,
/// which only see `SessionState`.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, SessionError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), SessionError>;

    /// Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), SessionError>;
}

/// SessionState
///
/// The concrete type used to share the session store across the application state.
pub type SessionState = Arc<dyn SessionStore>;

// 2. In-memory implementation (tests, local development)
#[derive(Default)]
pub struct InMemorySessionStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `value` for the session flag.
    pub fn with_flag(value: &str) -> Self {
        let store = Self::new();
        store
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(AUTH_STATE_KEY.to_string(), value.to_string());
        store
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), SessionError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

// 3. File-backed implementation
/// FileSessionStore
///
/// Persists all keys as one JSON object. A missing file reads as an empty store. Writes go to a
/// sibling temp file that is renamed over the original, and are serialized by `write_lock`.
pub struct FileSessionStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<HashMap<String, String>, SessionError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(HashMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_all(&self, entries: &HashMap<String, String>) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        // `.tmp` is appended, never substituted: a store at `x.tmp` must not be its own temp file.
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(entries)?).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    async fn update<F>(&self, apply: F) -> Result<(), SessionError>
    where
        F: FnOnce(&mut HashMap<String, String>) + Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.read_all().await?;
        apply(&mut entries);
        self.write_all(&entries).await
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.read_all().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<(), SessionError> {
        self.update(|entries| {
            entries.remove(key);
        })
        .await
    }
}

// 4. Session flag helpers
/// parse_flag
///
/// Interprets a stored flag value. Only the exact string `true` authenticates. `false` or no
/// value means anonymous; anything else is logged and also treated as anonymous.
pub fn parse_flag(value: Option<&str>) -> bool {
    match value {
        Some("true") => true,
        None | Some("false") => false,
        Some(other) => {
            tracing::warn!(
                key = AUTH_STATE_KEY,
                value = other,
                "unrecognized session flag value, treating session as anonymous"
            );
            false
        }
    }
}

/// load_context
///
/// Reads the session flag and packages it for the guard.
pub async fn load_context(store: &dyn SessionStore) -> Result<SessionContext, SessionError> {
    let value = store.get(AUTH_STATE_KEY).await?;
    Ok(SessionContext {
        authenticated: parse_flag(value.as_deref()),
    })
}

/// Records a successful login.
pub async fn mark_authenticated(store: &dyn SessionStore) -> Result<(), SessionError> {
    store.set(AUTH_STATE_KEY, "true").await?;
    tracing::info!("session marked authenticated");
    Ok(())
}

/// Records a logout.
pub async fn clear(store: &dyn SessionStore) -> Result<(), SessionError> {
    store.remove(AUTH_STATE_KEY).await?;
    tracing::info!("session cleared");
    Ok(())
}
