//! # paydesk-client -- Typed Rust client for the Paydesk backend
//!
//! Everything in the dashboard that talks to the server or remembers who is
//! signed in:
//! - **Session store** ([`session`], [`auth`]): the signed-in identity and
//!   its bearer token, persisted across restarts.
//! - **Remote resource client** ([`http`]): uniform request handling,
//!   bearer attachment, and the forced logout on 401.
//! - **Dispute lifecycle controller** ([`disputes`]): load, reply, assign,
//!   resolve, raise, and list disputes.
//!
//! The authorization tables live in `paydesk-core`; this crate only asks
//! them.
//!
//! ## Wiring
//!
//! A single [`SessionStore`] is shared by every component. Build it once,
//! hand it to [`PaydeskClient::new`], and create per-view controllers from
//! the client:
//!
//! ```ignore
//! let config = PaydeskConfig::from_env()?;
//! let persistence = Arc::new(FileSessionPersistence::new(&config.session_file));
//! let session = Arc::new(SessionStore::restore(persistence));
//! let client = PaydeskClient::new(&config, session, Arc::new(LoggingNavigator))?;
//! client.auth().login("a@x.io", "secret").await?;
//! let mut view = client.disputes();
//! view.load(&DisputeId::new("d1")).await?;
//! ```

pub mod auth;
pub mod config;
pub mod disputes;
pub mod error;
pub mod http;
pub mod navigation;
pub mod notify;
pub mod session;

pub use auth::AuthClient;
pub use config::{ConfigError, PaydeskConfig};
pub use disputes::{DisputeController, MountHandle};
pub use error::{ClientError, ErrorKind};
pub use http::{Auth, Endpoint, ResourceClient};
pub use navigation::{LoggingNavigator, Navigator};
pub use notify::{report, Notification, Notifier, Severity, TracingNotifier};
pub use session::{
    BearerToken, FileSessionPersistence, MemorySessionPersistence, PersistedSession,
    PersistenceError, SessionPersistence, SessionStore,
};

use std::sync::Arc;

use paydesk_core::{Access, Route};

/// Top-level Paydesk client. Cheap to clone; all clones share one session.
#[derive(Debug, Clone)]
pub struct PaydeskClient {
    api: ResourceClient,
    session: Arc<SessionStore>,
}

impl PaydeskClient {
    /// Create a client from configuration.
    pub fn new(
        config: &PaydeskConfig,
        session: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ClientError> {
        let api = ResourceClient::new(config, session.clone(), navigator)?;
        Ok(Self { api, session })
    }

    /// The shared session store.
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// The underlying resource client, for endpoints without a typed wrapper.
    pub fn api(&self) -> &ResourceClient {
        &self.api
    }

    /// Access the authentication operations.
    pub fn auth(&self) -> AuthClient {
        AuthClient::new(self.api.clone())
    }

    /// A fresh dispute controller for one view.
    pub fn disputes(&self) -> DisputeController {
        DisputeController::new(self.api.clone())
    }

    /// Run the authorization gate for `route` against the current session.
    pub fn authorize(&self, route: Route) -> Access {
        self.session.authorize(route)
    }
}
