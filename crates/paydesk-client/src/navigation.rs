//! Navigation seam.
//!
//! The client never renders anything, but a rejected session token must send
//! the user back to the login route no matter which call noticed it. The
//! host application supplies a [`Navigator`]; the resource client calls it.

use paydesk_core::Route;

/// Receives navigation requests issued from inside the client.
pub trait Navigator: Send + Sync {
    /// Navigate to `route`, replacing the current view.
    fn navigate(&self, route: Route);
}

/// A navigator that only logs. Useful for headless callers.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingNavigator;

impl Navigator for LoggingNavigator {
    fn navigate(&self, route: Route) {
        tracing::info!(route = %route, "navigation requested");
    }
}
