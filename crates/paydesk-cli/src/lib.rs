//! # paydesk-cli -- Command-line front end for the Paydesk dashboard
//!
//! Provides the `paydesk` binary. Every command is one action handler:
//! it calls the client, reports the outcome as a single notification on
//! stderr, and prints any data as pretty JSON on stdout.
//!
//! ## Subcommands
//!
//! - `paydesk login | register | logout | whoami | profile`: session management.
//! - `paydesk route <path>`: the authorization gate's decision for a path.
//! - `paydesk dispute ...`: the dispute queue.
//!
//! The session is persisted to `PAYDESK_SESSION_FILE`, so a login survives
//! between invocations.
//!
//! ```bash
//! paydesk login --email ana@example.com --password hunter2
//! paydesk dispute list --all --status OPEN
//! paydesk dispute assign d1 staff42
//! ```

pub mod account;
pub mod dispute;

use std::sync::Arc;

use anyhow::{Context as _, Result};
use serde::Serialize;

use paydesk_client::{
    report, ClientError, FileSessionPersistence, Navigator, Notification, Notifier, PaydeskClient,
    PaydeskConfig, SessionStore,
};
use paydesk_core::Route;

/// Everything a command handler needs.
pub struct Context {
    pub client: PaydeskClient,
    pub notifier: Arc<dyn Notifier>,
}

impl Context {
    /// Restore the persisted session and build a client for `config`.
    pub fn from_config(config: &PaydeskConfig) -> Result<Self> {
        let persistence = Arc::new(FileSessionPersistence::new(&config.session_file));
        let session = Arc::new(SessionStore::restore(persistence));
        tracing::debug!(
            api = %config.api_url,
            signed_in = session.is_authenticated(),
            "session restored"
        );
        let client = PaydeskClient::new(config, session, Arc::new(CliNavigator))
            .context("failed to build the API client")?;
        Ok(Self {
            client,
            notifier: Arc::new(StderrNotifier),
        })
    }

    /// Finish an action: notify once, print the data on success, and turn
    /// the outcome into an exit code.
    pub fn finish<T, F>(&self, result: Result<T, ClientError>, on_success: F) -> Result<u8>
    where
        T: Serialize,
        F: FnOnce(&T) -> Option<String>,
    {
        match report(self.notifier.as_ref(), result, on_success) {
            Ok(value) => {
                print_json(&value)?;
                Ok(0)
            }
            Err(_) => Ok(1),
        }
    }
}

/// Pretty-print `value` on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render output")?;
    println!("{rendered}");
    Ok(())
}

/// Shows notifications on stderr, one line each.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, notification: Notification) {
        eprintln!("[{}] {}", notification.severity, notification.message);
    }
}

/// A terminal has nowhere to navigate to; tell the user what to run.
#[derive(Debug, Default, Clone, Copy)]
pub struct CliNavigator;

impl Navigator for CliNavigator {
    fn navigate(&self, route: Route) {
        match route {
            Route::Login => eprintln!("run `paydesk login` to sign in again"),
            other => tracing::info!(route = %other, "navigation requested"),
        }
    }
}
