//! # Client Error Types
//!
//! Every failure the client can report, classified so the action handler
//! that receives it can decide what to show. Nothing here is fatal: each
//! variant ends up as a notification and the application stays usable.

use paydesk_core::{Action, DisputeId, ValidationError};

use crate::config::ConfigError;

/// Coarse classification of a [`ClientError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad credentials or a failed login/registration.
    Auth,
    /// The session token was rejected; the session has been cleared.
    Unauthorized,
    /// The server rejected the request.
    Request,
    /// No response was received.
    Network,
    /// The input was rejected before any request was issued.
    Validation,
    /// The signed-in role may not perform the action.
    Forbidden,
    /// A dispute could not be loaded.
    Load,
    /// A mutation was applied but the dispute could not be re-fetched.
    Reconcile,
    /// A successful response did not have the expected shape.
    Decode,
    /// The client is misconfigured.
    Config,
}

/// Errors from Paydesk client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Login or registration failed.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The backend answered 401 to an authenticated request.
    #[error("session expired or invalid while calling {endpoint}")]
    Unauthorized { endpoint: String },

    /// Non-2xx status, or a 2xx payload whose `success` flag is not `true`.
    #[error("{endpoint}: {message}")]
    Request {
        endpoint: String,
        /// HTTP status, absent when the server answered 2xx with `success: false`.
        status: Option<u16>,
        message: String,
    },

    /// Transport failure: no response was received.
    #[error("network error calling {endpoint}: {source}")]
    Network {
        endpoint: String,
        source: reqwest::Error,
    },

    /// Client-side validation failure.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The current identity may not perform the action.
    #[error("{role} may not {action}")]
    Forbidden {
        action: Action,
        /// The caller's role, or "anonymous".
        role: String,
    },

    /// The dispute could not be loaded.
    #[error("could not load dispute {dispute_id}: {source}")]
    Load {
        dispute_id: DisputeId,
        source: Box<ClientError>,
    },

    /// The server accepted a change but the follow-up fetch failed. The
    /// held dispute is stale until the next load.
    #[error("dispute {dispute_id} was updated but could not be refreshed: {source}")]
    Reconcile {
        dispute_id: DisputeId,
        source: Box<ClientError>,
    },

    /// The payload was marked successful but did not decode.
    #[error("unexpected response shape from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        source: serde_json::Error,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ClientError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Auth(_) => ErrorKind::Auth,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::Request { .. } => ErrorKind::Request,
            Self::Network { .. } => ErrorKind::Network,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::Load { .. } => ErrorKind::Load,
            Self::Reconcile { .. } => ErrorKind::Reconcile,
            Self::Decode { .. } => ErrorKind::Decode,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// The message suitable for showing to the user, without endpoint
    /// prefixes.
    pub fn user_message(&self) -> String {
        match self {
            Self::Auth(message) | Self::Request { message, .. } => message.clone(),
            Self::Load { source, .. } | Self::Reconcile { source, .. } => source.user_message(),
            other => other.to_string(),
        }
    }

    /// Whether the failure was caused by an expired session, directly or as
    /// the cause of a load or refresh failure.
    pub fn is_unauthorized(&self) -> bool {
        match self {
            Self::Unauthorized { .. } => true,
            Self::Load { source, .. } | Self::Reconcile { source, .. } => {
                source.is_unauthorized()
            }
            _ => false,
        }
    }
}
