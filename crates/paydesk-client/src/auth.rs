//! Authentication operations of the session store.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | POST | `auth/login` | [`AuthClient::login`] |
//! | POST | `auth/register` | [`AuthClient::register`] |
//! | PATCH | `auth/profile` | [`AuthClient::update_profile`] |
//!
//! Each endpoint answers `{success, token?, user}`. Login and registration
//! are anonymous requests; a failure of any kind surfaces as
//! [`ClientError::Auth`] and leaves the session untouched. No retries.

use std::sync::Arc;

use reqwest::Method;
use serde::{Deserialize, Serialize};

use paydesk_core::{Identity, ProfileUpdate, Role, ValidationError};

use crate::error::ClientError;
use crate::http::{Auth, ResourceClient};
use crate::session::{BearerToken, SessionStore};

/// Payload of the auth endpoints.
#[derive(Deserialize)]
struct AuthPayload {
    #[serde(default)]
    token: Option<String>,
    user: Identity,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
    role: Role,
}

/// Network half of the session store: talks to the auth endpoints and
/// writes the outcome into the [`SessionStore`].
#[derive(Debug, Clone)]
pub struct AuthClient {
    api: ResourceClient,
    session: Arc<SessionStore>,
}

impl AuthClient {
    pub(crate) fn new(api: ResourceClient) -> Self {
        let session = api.session().clone();
        Self { api, session }
    }

    /// Sign in and store the returned identity and token.
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, ClientError> {
        let body = to_body(&LoginRequest { email, password })?;
        let payload: AuthPayload = self
            .api
            .call(Method::POST, "auth/login", Some(&body), &[], Auth::Anonymous)
            .await
            .map_err(into_auth_error)?;
        Ok(self.establish(payload))
    }

    /// Create an account, then sign in as it.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<Identity, ClientError> {
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyText { field: "name" }.into());
        }
        let body = to_body(&RegisterRequest {
            name,
            email,
            password,
            role,
        })?;
        let payload: AuthPayload = self
            .api
            .call(Method::POST, "auth/register", Some(&body), &[], Auth::Anonymous)
            .await
            .map_err(into_auth_error)?;
        Ok(self.establish(payload))
    }

    /// Send a partial profile update and replace the stored identity with
    /// the server's answer. On failure the stored identity is unchanged.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<Identity, ClientError> {
        let body = to_body(update)?;
        let payload: AuthPayload = self
            .api
            .call(Method::PATCH, "auth/profile", Some(&body), &[], Auth::Bearer)
            .await?;

        if let Some(token) = payload.token {
            self.session
                .establish(payload.user.clone(), Some(BearerToken::new(token)));
        } else if !self.session.replace_identity(payload.user.clone()) {
            tracing::warn!("profile updated but the session ended before the response arrived");
        }
        Ok(payload.user)
    }

    /// Clear the session. Synchronous and idempotent.
    pub fn logout(&self) {
        self.session.logout();
    }

    /// The signed-in identity.
    pub fn current(&self) -> Option<Identity> {
        self.session.identity()
    }

    /// True iff an identity is present.
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    fn establish(&self, payload: AuthPayload) -> Identity {
        if payload.token.is_none() {
            tracing::warn!(user = %payload.user.id, "auth response carried no token");
        }
        tracing::info!(user = %payload.user.id, role = %payload.user.role, "signed in");
        self.session
            .establish(payload.user.clone(), payload.token.map(BearerToken::new));
        payload.user
    }
}

fn to_body<T: Serialize>(value: &T) -> Result<serde_json::Value, ClientError> {
    serde_json::to_value(value).map_err(|source| ClientError::Decode {
        endpoint: "request body".to_string(),
        source,
    })
}

fn into_auth_error(err: ClientError) -> ClientError {
    match err {
        ClientError::Validation(_) | ClientError::Auth(_) => err,
        other => ClientError::Auth(other.user_message()),
    }
}
