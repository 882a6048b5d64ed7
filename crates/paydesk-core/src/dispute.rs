//! # Dispute Lifecycle
//!
//! A dispute is raised by a player or agent against an order, discussed
//! through an append-only message log, and moved through a fixed status
//! lifecycle:
//!
//! ```text
//! OPEN ──▶ ASSIGNED ──▶ IN_PROGRESS ──▶ RESOLVED ──▶ CLOSED
//!   │                        ▲              ▲
//!   └────────────────────────┴──────────────┘
//! ```
//!
//! Status only moves forward. `ASSIGNED` and `IN_PROGRESS` may be skipped,
//! `CLOSED` is terminal, and once a dispute is `RESOLVED` or `CLOSED` its
//! message log no longer accepts replies.
//!
//! The backend is the authority on every dispute. These types describe what
//! it returns; they do not mutate disputes locally beyond the checks needed
//! to avoid pointless requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::identity::{DisputeId, MessageId, UserId, UserRef};

// ── Status ──────────────────────────────────────────────────────────────

/// The lifecycle status of a dispute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisputeStatus {
    /// Raised and waiting in the queue.
    Open,
    /// A staff member has been assigned.
    Assigned,
    /// The assignee is working on it.
    InProgress,
    /// An admin has recorded a resolution. Replies are locked.
    Resolved,
    /// Archived. Terminal state.
    Closed,
}

impl DisputeStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [DisputeStatus; 5] = [
        DisputeStatus::Open,
        DisputeStatus::Assigned,
        DisputeStatus::InProgress,
        DisputeStatus::Resolved,
        DisputeStatus::Closed,
    ];

    /// The canonical wire name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Assigned => "ASSIGNED",
            Self::InProgress => "IN_PROGRESS",
            Self::Resolved => "RESOLVED",
            Self::Closed => "CLOSED",
        }
    }

    /// Position in the lifecycle. Transitions must strictly increase it.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Open => 0,
            Self::Assigned => 1,
            Self::InProgress => 2,
            Self::Resolved => 3,
            Self::Closed => 4,
        }
    }

    /// Whether this status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Whether the message log still accepts replies.
    pub fn accepts_replies(&self) -> bool {
        !matches!(self, Self::Resolved | Self::Closed)
    }

    /// Valid target statuses from this status.
    pub fn valid_transitions(&self) -> &'static [DisputeStatus] {
        match self {
            Self::Open => &[Self::Assigned, Self::InProgress, Self::Resolved],
            Self::Assigned => &[Self::InProgress, Self::Resolved],
            Self::InProgress => &[Self::Resolved],
            Self::Resolved => &[Self::Closed],
            Self::Closed => &[],
        }
    }

    /// Whether moving to `next` is a forward step.
    pub fn can_transition_to(&self, next: DisputeStatus) -> bool {
        self.valid_transitions().contains(&next)
    }
}

impl std::fmt::Display for DisputeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of the status wire names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown dispute status: \"{0}\"")]
pub struct UnknownStatus(pub String);

impl std::str::FromStr for DisputeStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DisputeStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

// ── Records ─────────────────────────────────────────────────────────────

/// A message in a dispute's log. Never edited or removed once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(alias = "_id")]
    pub id: MessageId,
    pub sender: UserRef,
    pub text: String,
    /// Attachment descriptors as the backend sends them.
    #[serde(default)]
    pub attachments: Vec<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// The outcome an admin recorded when resolving a dispute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub outcome: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refund_amount: Option<serde_json::Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_by: Option<UserRef>,
}

/// A dispute as returned by the backend.
///
/// Amounts stay in their JSON number form; the client never does
/// arithmetic on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dispute {
    #[serde(alias = "_id")]
    pub id: DisputeId,
    pub raised_by: UserRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<serde_json::Number>,
    pub reason: String,
    pub status: DisputeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_staff: Option<UserRef>,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Dispute {
    /// Check that a reply may be posted to this dispute.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::RepliesClosed`] once the dispute is
    /// `RESOLVED` or `CLOSED`.
    pub fn ensure_accepts_replies(&self) -> Result<(), ValidationError> {
        if self.status.accepts_replies() {
            Ok(())
        } else {
            Err(ValidationError::RepliesClosed {
                dispute_id: self.id.to_string(),
                status: self.status.to_string(),
            })
        }
    }

    /// Check that `next` is a forward move from the current status.
    ///
    /// Replacing a dispute with the same status is not a transition and is
    /// always accepted.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidTransition`] for backward moves and
    /// moves out of `CLOSED`.
    pub fn check_transition(&self, next: DisputeStatus) -> Result<(), ValidationError> {
        if next == self.status || self.status.can_transition_to(next) {
            Ok(())
        } else {
            Err(ValidationError::InvalidTransition {
                from: self.status.to_string(),
                to: next.to_string(),
            })
        }
    }

    /// Whether the dispute is assigned to the given user.
    pub fn is_assigned_to(&self, user: &UserId) -> bool {
        self.assigned_staff
            .as_ref()
            .is_some_and(|staff| &staff.id == user)
    }

    /// The most recent message, if any.
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}

/// An entry of the staff roster offered for assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffMember {
    #[serde(alias = "_id")]
    pub id: UserId,
    pub name: String,
}

// ── Requests ────────────────────────────────────────────────────────────

/// A dispute raised by a player or agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDispute {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<serde_json::Number>,
    pub reason: String,
}

impl NewDispute {
    /// Reject a dispute with no reason.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyText`] if the reason is blank.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.reason.trim().is_empty() {
            return Err(ValidationError::EmptyText { field: "reason" });
        }
        Ok(())
    }
}

/// The resolution an admin submits.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveRequest {
    pub note: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund_amount: Option<serde_json::Number>,
}

impl ResolveRequest {
    /// A resolution carrying only a note.
    pub fn with_note(note: impl Into<String>) -> Self {
        Self {
            note: note.into(),
            ..Self::default()
        }
    }
}

/// Filters for dispute listings, sent as query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisputeQuery {
    pub status: Option<DisputeStatus>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl DisputeQuery {
    /// The populated filters as `(name, value)` pairs.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dispute_json(status: &str) -> serde_json::Value {
        json!({
            "_id": "d1",
            "raisedBy": {"_id": "p1", "name": "Player One"},
            "orderId": "ord-9",
            "amount": 125.5,
            "reason": "Deposit not credited",
            "status": status,
            "messages": [{
                "_id": "m1",
                "sender": {"id": "p1"},
                "text": "Still waiting",
                "attachments": [],
                "createdAt": "2026-03-01T10:00:00Z"
            }],
            "createdAt": "2026-03-01T09:00:00Z",
            "updatedAt": "2026-03-01T10:00:00Z"
        })
    }

    fn dispute(status: &str) -> Dispute {
        serde_json::from_value(dispute_json(status)).unwrap()
    }

    #[test]
    fn status_wire_names() {
        assert_eq!(
            serde_json::to_value(DisputeStatus::InProgress).unwrap(),
            json!("IN_PROGRESS")
        );
        for status in [
            DisputeStatus::Open,
            DisputeStatus::Assigned,
            DisputeStatus::InProgress,
            DisputeStatus::Resolved,
            DisputeStatus::Closed,
        ] {
            assert_eq!(serde_json::to_value(status).unwrap(), json!(status.as_str()));
        }
    }

    #[test]
    fn status_parses_from_wire_name() {
        assert_eq!(
            "IN_PROGRESS".parse::<DisputeStatus>(),
            Ok(DisputeStatus::InProgress)
        );
        assert_eq!(
            "in_progress".parse::<DisputeStatus>(),
            Err(UnknownStatus("in_progress".to_string()))
        );
        for status in DisputeStatus::ALL {
            assert_eq!(status.as_str().parse::<DisputeStatus>(), Ok(status));
        }
    }

    #[test]
    fn transitions_only_move_forward() {
        let all = [
            DisputeStatus::Open,
            DisputeStatus::Assigned,
            DisputeStatus::InProgress,
            DisputeStatus::Resolved,
            DisputeStatus::Closed,
        ];
        for from in all {
            for to in from.valid_transitions() {
                assert!(to.rank() > from.rank(), "{from} -> {to} moves backwards");
            }
        }
    }

    #[test]
    fn closed_is_terminal() {
        assert!(DisputeStatus::Closed.is_terminal());
        assert!(DisputeStatus::Closed.valid_transitions().is_empty());
        assert!(!DisputeStatus::Resolved.is_terminal());
        assert!(DisputeStatus::Resolved.can_transition_to(DisputeStatus::Closed));
    }

    #[test]
    fn assigned_may_be_skipped() {
        assert!(DisputeStatus::Open.can_transition_to(DisputeStatus::InProgress));
        assert!(!DisputeStatus::InProgress.can_transition_to(DisputeStatus::Assigned));
    }

    #[test]
    fn replies_lock_at_resolved() {
        assert!(DisputeStatus::Open.accepts_replies());
        assert!(DisputeStatus::InProgress.accepts_replies());
        assert!(!DisputeStatus::Resolved.accepts_replies());
        assert!(!DisputeStatus::Closed.accepts_replies());
    }

    #[test]
    fn dispute_parses_backend_payload() {
        let d = dispute("OPEN");
        assert_eq!(d.id, DisputeId::new("d1"));
        assert_eq!(d.status, DisputeStatus::Open);
        assert_eq!(d.order_id.as_deref(), Some("ord-9"));
        assert_eq!(d.amount.as_ref().map(|n| n.to_string()), Some("125.5".to_string()));
        assert_eq!(d.messages.len(), 1);
        assert_eq!(d.last_message().map(|m| m.text.as_str()), Some("Still waiting"));
        assert!(d.assigned_staff.is_none());
        assert!(d.resolution.is_none());
    }

    #[test]
    fn resolved_dispute_rejects_replies() {
        let err = dispute("RESOLVED").ensure_accepts_replies().unwrap_err();
        assert!(matches!(err, ValidationError::RepliesClosed { .. }));
        assert!(dispute("ASSIGNED").ensure_accepts_replies().is_ok());
    }

    #[test]
    fn check_transition_rejects_regression() {
        let d = dispute("RESOLVED");
        assert!(d.check_transition(DisputeStatus::Closed).is_ok());
        assert!(d.check_transition(DisputeStatus::Resolved).is_ok());
        assert_eq!(
            d.check_transition(DisputeStatus::Open),
            Err(ValidationError::InvalidTransition {
                from: "RESOLVED".to_string(),
                to: "OPEN".to_string(),
            })
        );
    }

    #[test]
    fn assignment_lookup() {
        let mut value = dispute_json("ASSIGNED");
        value["assignedStaff"] = json!({"id": "staff42", "name": "Sam"});
        let d: Dispute = serde_json::from_value(value).unwrap();
        assert!(d.is_assigned_to(&UserId::new("staff42")));
        assert!(!d.is_assigned_to(&UserId::new("staff7")));
    }

    #[test]
    fn new_dispute_requires_reason() {
        let blank = NewDispute {
            reason: "  \t".to_string(),
            ..NewDispute::default()
        };
        assert_eq!(
            blank.validate(),
            Err(ValidationError::EmptyText { field: "reason" })
        );
        let ok = NewDispute {
            reason: "Withdrawal stuck".to_string(),
            order_id: Some("ord-1".to_string()),
            amount: None,
        };
        assert!(ok.validate().is_ok());
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({"orderId": "ord-1", "reason": "Withdrawal stuck"})
        );
    }

    #[test]
    fn query_pairs_skip_unset_filters() {
        let query = DisputeQuery {
            status: Some(DisputeStatus::Open),
            page: None,
            limit: Some(20),
        };
        assert_eq!(
            query.to_pairs(),
            vec![("status", "OPEN".to_string()), ("limit", "20".to_string())]
        );
        assert!(DisputeQuery::default().to_pairs().is_empty());
    }
}
