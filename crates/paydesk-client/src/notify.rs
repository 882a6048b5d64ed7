//! User-facing notifications.
//!
//! Errors travel up to the action handler that started the operation. That
//! handler is the only place a failure turns into something the user sees:
//! it passes the result to [`report`], which emits exactly one
//! [`Notification`] and hands the result back unchanged.

use crate::error::{ClientError, ErrorKind};

/// How prominently a notification is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
}

impl Notification {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Severity::Success, message)
    }

    /// The notification shown for a failed operation.
    pub fn from_error(err: &ClientError) -> Self {
        match err.kind() {
            ErrorKind::Unauthorized => Self::new(
                Severity::Error,
                "Your session has expired. Please sign in again.",
            ),
            ErrorKind::Validation => Self::new(Severity::Warning, err.user_message()),
            ErrorKind::Forbidden => Self::new(
                Severity::Warning,
                "You do not have permission to do that.",
            ),
            ErrorKind::Network => Self::new(
                Severity::Error,
                "Could not reach the server. Check your connection and try again.",
            ),
            ErrorKind::Load | ErrorKind::Reconcile if err.is_unauthorized() => Self::new(
                Severity::Error,
                "Your session has expired. Please sign in again.",
            ),
            ErrorKind::Load => Self::new(
                Severity::Error,
                format!("Could not load the dispute: {}", err.user_message()),
            ),
            ErrorKind::Reconcile => Self::new(
                Severity::Warning,
                format!(
                    "Saved, but the dispute could not be refreshed: {}",
                    err.user_message()
                ),
            ),
            ErrorKind::Auth | ErrorKind::Request | ErrorKind::Decode | ErrorKind::Config => {
                Self::new(Severity::Error, err.user_message())
            }
        }
    }
}

/// Sink for notifications. The host application decides how to show them.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the tracing log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Error => tracing::error!("{}", notification.message),
            Severity::Warning => tracing::warn!("{}", notification.message),
            Severity::Info | Severity::Success => tracing::info!("{}", notification.message),
        }
    }
}

/// Emit one notification for `result` and return it unchanged.
///
/// On success the notification comes from `on_success`; returning `None`
/// stays silent.
pub fn report<T, F>(
    notifier: &dyn Notifier,
    result: Result<T, ClientError>,
    on_success: F,
) -> Result<T, ClientError>
where
    F: FnOnce(&T) -> Option<String>,
{
    match &result {
        Ok(value) => {
            if let Some(message) = on_success(value) {
                notifier.notify(Notification::success(message));
            }
        }
        Err(err) => notifier.notify(Notification::from_error(err)),
    }
    result
}
