//! # Session Store
//!
//! Single source of truth for who is signed in. The store is an explicit
//! object shared by `Arc` with the resource client (which reads the token
//! and clears the session on a 401) and with the dispute controller (which
//! reads the identity for role checks). Only the store writes the session.
//!
//! ## Lifecycle
//!
//! 1. [`SessionStore::restore`] on boot loads whatever the persistence
//!    backend holds, so a restart does not force re-authentication.
//! 2. [`SessionStore::establish`] after a successful login or registration.
//! 3. [`SessionStore::replace_identity`] after a profile update.
//! 4. [`SessionStore::logout`] tears everything down, in memory and on disk.
//!
//! Persistence failures are logged and never fail the in-memory operation:
//! the worst outcome is being asked to sign in again after a restart.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use paydesk_core::{Access, Action, Identity, Route};

// ── Token ───────────────────────────────────────────────────────────────

/// Opaque bearer token issued by the backend. Zeroed on drop and redacted
/// from `Debug` output.
#[derive(Clone)]
pub struct BearerToken(Zeroizing<String>);

impl BearerToken {
    /// Wrap a token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(Zeroizing::new(token.into()))
    }

    /// Access the raw token.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    /// `Authorization` header value for this token.
    pub fn header_value(&self) -> Zeroizing<String> {
        Zeroizing::new(format!("Bearer {}", self.0.as_str()))
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken([REDACTED])")
    }
}

// ── Persistence ─────────────────────────────────────────────────────────

/// The session as written to persistent storage.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    pub identity: Identity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl std::fmt::Debug for PersistedSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistedSession")
            .field("identity", &self.identity)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Errors from a session persistence backend.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("session file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("session file {path} is not a valid session: {source}")]
    Format {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Where the session survives between runs.
pub trait SessionPersistence: Send + Sync {
    /// Load the stored session, if any.
    fn load(&self) -> Result<Option<PersistedSession>, PersistenceError>;
    /// Store `session`, replacing any previous one.
    fn save(&self, session: &PersistedSession) -> Result<(), PersistenceError>;
    /// Remove the stored session. Succeeds if there is none.
    fn clear(&self) -> Result<(), PersistenceError>;
}

/// JSON file backend.
#[derive(Debug, Clone)]
pub struct FileSessionPersistence {
    path: PathBuf,
}

impl FileSessionPersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SessionPersistence for FileSessionPersistence {
    fn load(&self) -> Result<Option<PersistedSession>, PersistenceError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| PersistenceError::Format {
                path: self.path.clone(),
                source,
            })
    }

    fn save(&self, session: &PersistedSession) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let json = serde_json::to_vec_pretty(session).map_err(|source| PersistenceError::Format {
            path: self.path.clone(),
            source,
        })?;

        // Readers never observe a half-written session file.
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json).map_err(|e| self.io_error(e))?;
        restrict_permissions(&tmp).map_err(|e| self.io_error(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))
    }

    fn clear(&self) -> Result<(), PersistenceError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

/// In-memory backend. Survives nothing; used by tests and headless callers.
#[derive(Debug, Default)]
pub struct MemorySessionPersistence {
    slot: Mutex<Option<PersistedSession>>,
}

impl MemorySessionPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate the backend, as if a previous run had signed in.
    pub fn with_session(session: PersistedSession) -> Self {
        Self {
            slot: Mutex::new(Some(session)),
        }
    }

    /// Snapshot of what is currently stored.
    pub fn stored(&self) -> Option<PersistedSession> {
        self.slot.lock().clone()
    }
}

impl SessionPersistence for MemorySessionPersistence {
    fn load(&self) -> Result<Option<PersistedSession>, PersistenceError> {
        Ok(self.slot.lock().clone())
    }

    fn save(&self, session: &PersistedSession) -> Result<(), PersistenceError> {
        *self.slot.lock() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), PersistenceError> {
        *self.slot.lock() = None;
        Ok(())
    }
}

// ── Store ───────────────────────────────────────────────────────────────

#[derive(Clone)]
struct Session {
    identity: Identity,
    token: Option<BearerToken>,
}

impl Session {
    fn to_persisted(&self) -> PersistedSession {
        PersistedSession {
            identity: self.identity.clone(),
            token: self.token.as_ref().map(|t| t.expose().to_string()),
        }
    }
}

/// Holds the signed-in identity and its bearer token.
pub struct SessionStore {
    current: RwLock<Option<Session>>,
    persistence: Arc<dyn SessionPersistence>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let current = self.current.read();
        f.debug_struct("SessionStore")
            .field("identity", &current.as_ref().map(|s| &s.identity))
            .field(
                "token",
                &current
                    .as_ref()
                    .and_then(|s| s.token.as_ref())
                    .map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl SessionStore {
    /// An empty store backed by `persistence`. Does not read it.
    pub fn new(persistence: Arc<dyn SessionPersistence>) -> Self {
        Self {
            current: RwLock::new(None),
            persistence,
        }
    }

    /// An empty store that persists nowhere.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySessionPersistence::new()))
    }

    /// Boot-time construction: load the persisted session, if any.
    ///
    /// An unreadable session is logged and treated as signed out.
    pub fn restore(persistence: Arc<dyn SessionPersistence>) -> Self {
        let restored = match persistence.load() {
            Ok(Some(persisted)) => {
                tracing::debug!(user = %persisted.identity.id, "restored persisted session");
                Some(Session {
                    identity: persisted.identity,
                    token: persisted.token.map(BearerToken::new),
                })
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("ignoring unreadable persisted session: {e}");
                None
            }
        };
        Self {
            current: RwLock::new(restored),
            persistence,
        }
    }

    /// Record a freshly authenticated identity and its token.
    pub fn establish(&self, identity: Identity, token: Option<BearerToken>) {
        let session = Session { identity, token };
        let persisted = session.to_persisted();
        *self.current.write() = Some(session);
        if let Err(e) = self.persistence.save(&persisted) {
            tracing::warn!("failed to persist session: {e}");
        }
    }

    /// Replace the stored identity, keeping the token.
    ///
    /// Returns `false` and changes nothing if nobody is signed in.
    pub fn replace_identity(&self, identity: Identity) -> bool {
        let persisted = {
            let mut current = self.current.write();
            let Some(session) = current.as_mut() else {
                return false;
            };
            session.identity = identity;
            session.to_persisted()
        };
        if let Err(e) = self.persistence.save(&persisted) {
            tracing::warn!("failed to persist session: {e}");
        }
        true
    }

    /// Clear identity and token, in memory and in persistence. Idempotent.
    ///
    /// Returns whether a session was present.
    pub fn logout(&self) -> bool {
        let previous = self.current.write().take();
        if let Err(e) = self.persistence.clear() {
            tracing::warn!("failed to clear persisted session: {e}");
        }
        if let Some(session) = &previous {
            tracing::debug!(user = %session.identity.id, "session cleared");
        }
        previous.is_some()
    }

    /// The signed-in identity.
    pub fn identity(&self) -> Option<Identity> {
        self.current.read().as_ref().map(|s| s.identity.clone())
    }

    /// True iff an identity is present.
    pub fn is_authenticated(&self) -> bool {
        self.current.read().is_some()
    }

    /// The current bearer token.
    pub fn token(&self) -> Option<BearerToken> {
        self.current.read().as_ref().and_then(|s| s.token.clone())
    }

    /// Run the authorization gate against the current identity.
    pub fn authorize(&self, route: Route) -> Access {
        let current = self.current.read();
        paydesk_core::authorize(route, current.as_ref().map(|s| &s.identity))
    }

    /// Whether the current identity may perform `action`.
    pub fn permits(&self, action: Action) -> bool {
        let current = self.current.read();
        paydesk_core::permits(action, current.as_ref().map(|s| &s.identity))
    }

    /// The current role for diagnostics, or "anonymous".
    pub fn role_label(&self) -> String {
        self.current
            .read()
            .as_ref()
            .map(|s| s.identity.role.to_string())
            .unwrap_or_else(|| "anonymous".to_string())
    }
}
