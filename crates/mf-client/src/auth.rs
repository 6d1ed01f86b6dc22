//! Persisted sign-in state.
//!
//! The session is a single JSON record (user, access token, refresh token)
//! stored under a fixed key. The API client reads the token before every
//! request, rewrites it after a refresh and clears it when the session is
//! gone for good.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::path::{Path, PathBuf};

/// Storage key; also the file stem of [`FileSessionStore`].
pub const SESSION_KEY: &str = "memeforge-session";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<serde_json::Value>,
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl StoredSession {
    pub fn new(token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            user: None,
            token: token.into(),
            refresh_token,
        }
    }
}

pub trait SessionStore {
    fn load(&self) -> Option<StoredSession>;
    fn save(&self, session: &StoredSession) -> std::io::Result<()>;
    fn clear(&self);
}

/// JSON file under the platform config directory.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/memeforge/memeforge-session.json`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("memeforge")
            .join(format!("{SESSION_KEY}.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileSessionStore {
    fn default() -> Self {
        Self::new(Self::default_path())
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Option<StoredSession> {
        let contents = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&contents) {
            Ok(session) => Some(session),
            Err(e) => {
                log::warn!("ignoring unreadable session {}: {e}", self.path.display());
                None
            }
        }
    }

    fn save(&self, session: &StoredSession) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, json)
    }

    fn clear(&self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => log::debug!("cleared session {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("failed to clear session {}: {e}", self.path.display()),
        }
    }
}

/// In-process store for tests and embedders that persist elsewhere.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: RefCell<Option<StoredSession>>,
}

impl MemorySessionStore {
    pub fn new(session: Option<StoredSession>) -> Self {
        Self {
            session: RefCell::new(session),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Option<StoredSession> {
        self.session.borrow().clone()
    }

    fn save(&self, session: &StoredSession) -> std::io::Result<()> {
        *self.session.borrow_mut() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) {
        self.session.borrow_mut().take();
    }
}

impl<S: SessionStore + ?Sized> SessionStore for std::rc::Rc<S> {
    fn load(&self) -> Option<StoredSession> {
        (**self).load()
    }

    fn save(&self, session: &StoredSession) -> std::io::Result<()> {
        (**self).save(session)
    }

    fn clear(&self) {
        (**self).clear()
    }
}
