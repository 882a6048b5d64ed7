//! # Dispute Lifecycle Controller
//!
//! Mediates every dispute state change visible to the user.
//!
//! ## Endpoints
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET | `disputes/{id}` | [`DisputeController::load`] |
//! | POST | `disputes/{id}/reply` | [`DisputeController::reply`] |
//! | POST | `admin/disputes/{id}/assign` | [`DisputeController::assign`] (then re-fetch) |
//! | POST | `admin/disputes/{id}/resolve` | [`DisputeController::resolve`] (then re-fetch) |
//! | GET | `admin/disputes/staff` | [`DisputeController::staff_roster`] |
//! | POST | `disputes` | [`DisputeController::raise`] |
//! | GET | `disputes` | [`DisputeController::list_mine`] |
//! | GET | `admin/disputes` | [`DisputeController::list_all`] |
//!
//! ## Reconciliation
//!
//! The controller never fabricates dispute state. After a reply the
//! dispute returned by the server replaces the held one wholesale. Assign
//! and resolve answer only `{success}`, so they go through
//! [`mutate_then_reconcile`](DisputeController::mutate_then_reconcile),
//! which re-fetches the dispute and holds the server's copy. A failed call
//! leaves the held dispute as it was. When the mutation succeeds but the
//! re-fetch fails the error is [`ClientError::Reconcile`], so the caller can
//! tell the change was saved.
//!
//! ## Local checks
//!
//! Empty text, replies to a dispute already known to be `RESOLVED` or
//! `CLOSED`, and actions the signed-in role may not perform are rejected
//! before any request. The server re-validates all of them; the local
//! checks only spare a pointless round-trip.
//!
//! ## Unmounting
//!
//! A controller belongs to one view. Once that view calls
//! [`MountHandle::unmount`], responses still in flight are returned to
//! their caller but no longer applied to the held dispute.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};

use paydesk_core::{
    Action, Dispute, DisputeId, DisputeQuery, NewDispute, ResolveRequest, StaffMember, UserId,
    ValidationError,
};

use crate::error::ClientError;
use crate::http::{Auth, Endpoint, ResourceClient};
use crate::session::SessionStore;

#[derive(Deserialize)]
struct DisputePayload {
    dispute: Dispute,
}

#[derive(Deserialize)]
struct DisputeListPayload {
    #[serde(default)]
    disputes: Vec<Dispute>,
}

#[derive(Deserialize)]
struct StaffPayload {
    #[serde(default)]
    staff: Vec<StaffMember>,
}

#[derive(Deserialize)]
struct Ack {}

/// Cloneable handle the owning view uses to signal it has gone away.
#[derive(Debug, Clone)]
pub struct MountHandle(Arc<AtomicBool>);

impl MountHandle {
    /// Stop applying responses to the controller's held state.
    pub fn unmount(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    /// Whether the owning view is still mounted.
    pub fn is_mounted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Holds the dispute currently on screen and performs its transitions.
#[derive(Debug)]
pub struct DisputeController {
    api: ResourceClient,
    session: Arc<SessionStore>,
    current: Option<Dispute>,
    mounted: MountHandle,
}

impl DisputeController {
    pub(crate) fn new(api: ResourceClient) -> Self {
        let session = api.session().clone();
        Self {
            api,
            session,
            current: None,
            mounted: MountHandle(Arc::new(AtomicBool::new(true))),
        }
    }

    /// The dispute currently held, if any.
    pub fn current(&self) -> Option<&Dispute> {
        self.current.as_ref()
    }

    /// Handle for the owning view to report unmounting.
    pub fn mount_handle(&self) -> MountHandle {
        self.mounted.clone()
    }

    /// Fetch a dispute and hold it.
    ///
    /// # Errors
    ///
    /// Any failure is wrapped in [`ClientError::Load`]; the caller is
    /// expected to navigate back to the dispute list. No retry.
    pub async fn load(&mut self, id: &DisputeId) -> Result<Dispute, ClientError> {
        let dispute = self.fetch(id).await.map_err(|source| ClientError::Load {
            dispute_id: id.clone(),
            source: Box::new(source),
        })?;
        Ok(self.commit(dispute))
    }

    /// Post a reply. The dispute returned by the server replaces the held
    /// one.
    pub async fn reply(&mut self, id: &DisputeId, text: &str) -> Result<Dispute, ClientError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyText {
                field: "reply text",
            }
            .into());
        }
        if let Some(held) = self.current.as_ref().filter(|d| &d.id == id) {
            held.ensure_accepts_replies()?;
        }
        self.require(Action::ReplyToDispute)?;

        let path = Endpoint::new("disputes").param(id.as_str()).path("reply");
        let body = json!({ "message": text });
        let payload: DisputePayload = self
            .api
            .call(Method::POST, path, Some(&body), &[], Auth::Bearer)
            .await?;
        Ok(self.commit(payload.dispute))
    }

    /// Assign a dispute to a staff member, then hold the re-fetched dispute.
    pub async fn assign(
        &mut self,
        id: &DisputeId,
        staff_id: &UserId,
    ) -> Result<Dispute, ClientError> {
        self.require(Action::AssignDispute)?;
        let path = Endpoint::new("admin/disputes").param(id.as_str()).path("assign");
        let body = json!({ "staffId": staff_id });
        self.mutate_then_reconcile(id, path, body).await
    }

    /// Record a resolution, then hold the re-fetched dispute.
    pub async fn resolve(
        &mut self,
        id: &DisputeId,
        resolution: &ResolveRequest,
    ) -> Result<Dispute, ClientError> {
        self.require(Action::ResolveDispute)?;
        let path = Endpoint::new("admin/disputes").param(id.as_str()).path("resolve");
        let body = serde_json::to_value(resolution).map_err(|source| ClientError::Decode {
            endpoint: format!("POST {path}"),
            source,
        })?;
        self.mutate_then_reconcile(id, path, body).await
    }

    /// Staff members a dispute may be assigned to.
    pub async fn staff_roster(&self) -> Result<Vec<StaffMember>, ClientError> {
        self.require(Action::ViewStaffRoster)?;
        let payload: StaffPayload = self
            .api
            .call(Method::GET, "admin/disputes/staff", None, &[], Auth::Bearer)
            .await?;
        Ok(payload.staff)
    }

    /// Raise a new dispute. Returns the server's copy; the caller appends
    /// it to whatever list it shows.
    pub async fn raise(&self, new_dispute: &NewDispute) -> Result<Dispute, ClientError> {
        new_dispute.validate()?;
        self.require(Action::RaiseDispute)?;
        let body = serde_json::to_value(new_dispute).map_err(|source| ClientError::Decode {
            endpoint: "POST disputes".to_string(),
            source,
        })?;
        let payload: DisputePayload = self
            .api
            .call(Method::POST, "disputes", Some(&body), &[], Auth::Bearer)
            .await?;
        tracing::info!(dispute = %payload.dispute.id, "dispute raised");
        Ok(payload.dispute)
    }

    /// Disputes raised by or visible to the signed-in user.
    pub async fn list_mine(&self, query: &DisputeQuery) -> Result<Vec<Dispute>, ClientError> {
        self.require(Action::ListOwnDisputes)?;
        self.list("disputes", query).await
    }

    /// Every dispute, for the admin queue.
    pub async fn list_all(&self, query: &DisputeQuery) -> Result<Vec<Dispute>, ClientError> {
        self.require(Action::ListAllDisputes)?;
        self.list("admin/disputes", query).await
    }

    async fn list(&self, path: &str, query: &DisputeQuery) -> Result<Vec<Dispute>, ClientError> {
        let pairs = query.to_pairs();
        let payload: DisputeListPayload = self
            .api
            .call(Method::GET, path, None, &pairs, Auth::Bearer)
            .await?;
        Ok(payload.disputes)
    }

    /// Perform a mutation whose response carries no dispute, then re-fetch
    /// and hold the authoritative copy. Calls run in program order; if the
    /// mutation fails nothing is re-fetched and the held dispute is kept.
    /// A failed re-fetch also keeps it and reports [`ClientError::Reconcile`].
    async fn mutate_then_reconcile(
        &mut self,
        id: &DisputeId,
        path: Endpoint,
        body: Value,
    ) -> Result<Dispute, ClientError> {
        let _: Ack = self
            .api
            .call(Method::POST, path, Some(&body), &[], Auth::Bearer)
            .await?;
        let dispute = self.fetch(id).await.map_err(|source| {
            tracing::warn!(dispute = %id, "change saved but refresh failed: {source}");
            ClientError::Reconcile {
                dispute_id: id.clone(),
                source: Box::new(source),
            }
        })?;
        Ok(self.commit(dispute))
    }

    async fn fetch(&self, id: &DisputeId) -> Result<Dispute, ClientError> {
        let path = Endpoint::new("disputes").param(id.as_str());
        let payload: DisputePayload = self
            .api
            .call(Method::GET, path, None, &[], Auth::Bearer)
            .await?;
        Ok(payload.dispute)
    }

    /// Hold `dispute` unless the view has unmounted. Returns it either way.
    fn commit(&mut self, dispute: Dispute) -> Dispute {
        if !self.mounted.is_mounted() {
            tracing::debug!(dispute = %dispute.id, "view unmounted, discarding response");
            return dispute;
        }
        if let Some(held) = self.current.as_ref().filter(|d| d.id == dispute.id) {
            if let Err(e) = held.check_transition(dispute.status) {
                tracing::warn!(dispute = %dispute.id, "server moved dispute backwards: {e}");
            }
        }
        self.current = Some(dispute.clone());
        dispute
    }

    fn require(&self, action: Action) -> Result<(), ClientError> {
        if self.session.permits(action) {
            Ok(())
        } else {
            Err(ClientError::Forbidden {
                action,
                role: self.session.role_label(),
            })
        }
    }
}
