//! # Identity Types
//!
//! Identifier newtypes, the fixed role enumeration, and the signed-in
//! [`Identity`].
//!
//! Identifiers are opaque strings assigned by the backend. Each is a
//! distinct type, so a [`UserId`] cannot be passed where a [`DisputeId`] is
//! expected.
//!
//! ## Roles
//!
//! [`Role`] is a closed enumeration compared case-sensitively. The backend
//! may still send a role this client does not know; [`RoleClaim`] keeps that
//! raw value so the identity round-trips unchanged, while the authorization
//! gate treats it as a member of no allowed set.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Backend identifier of a user (player, agent, staff member, admin).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wrap a backend user identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Access the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Backend identifier of a dispute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisputeId(String);

impl DisputeId {
    /// Wrap a backend dispute identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Access the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DisputeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Backend identifier of a message inside a dispute's log.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// Wrap a backend message identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Access the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

/// Dashboard roles. Determines route visibility and permitted actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Platform administrator. Resolves disputes and manages staff.
    Admin,
    /// Operations staff. Handles assigned disputes.
    Staff,
    /// Customer support. Reads the dispute queue.
    Support,
    /// Agent managing a book of players.
    Agent,
    /// End user making deposits and withdrawals.
    Player,
}

impl Role {
    /// Every known role, in declaration order.
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::Staff,
        Role::Support,
        Role::Agent,
        Role::Player,
    ];

    /// The wire name of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Staff => "STAFF",
            Self::Support => "SUPPORT",
            Self::Agent => "AGENT",
            Self::Player => "PLAYER",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of the known role names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: \"{0}\"")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    /// Case-sensitive: `"admin"` is not `ADMIN`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// The role value carried by an identity as the backend sent it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RoleClaim {
    /// One of the fixed roles.
    Known(Role),
    /// Any other value, kept verbatim.
    Unknown(String),
}

impl RoleClaim {
    /// The known role, if the claim names one.
    pub fn known(&self) -> Option<Role> {
        match self {
            Self::Known(role) => Some(*role),
            Self::Unknown(_) => None,
        }
    }

    /// The wire value of the claim.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Known(role) => role.as_str(),
            Self::Unknown(raw) => raw,
        }
    }
}

impl From<Role> for RoleClaim {
    fn from(role: Role) -> Self {
        Self::Known(role)
    }
}

impl From<String> for RoleClaim {
    fn from(raw: String) -> Self {
        match raw.parse::<Role>() {
            Ok(role) => Self::Known(role),
            Err(_) => Self::Unknown(raw),
        }
    }
}

impl From<RoleClaim> for String {
    fn from(claim: RoleClaim) -> Self {
        match claim {
            RoleClaim::Known(role) => role.as_str().to_string(),
            RoleClaim::Unknown(raw) => raw,
        }
    }
}

impl std::fmt::Display for RoleClaim {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// The authenticated user as returned by the auth endpoints.
///
/// Created on login or registration, replaced wholesale on profile update,
/// destroyed on logout. Only the session store holds one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    #[serde(alias = "_id")]
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: RoleClaim,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Identity {
    /// The identity's role if it is one of the known roles.
    pub fn role(&self) -> Option<Role> {
        self.role.known()
    }

    /// A reference to this identity suitable for embedding in records.
    pub fn to_user_ref(&self) -> UserRef {
        UserRef {
            id: self.id.clone(),
            name: Some(self.name.clone()),
            email: Some(self.email.clone()),
            role: Some(self.role.clone()),
        }
    }
}

/// A user embedded in another record (dispute raiser, assignee, message
/// sender). Only the identifier is guaranteed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    #[serde(alias = "_id")]
    pub id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<RoleClaim>,
}

/// Partial profile update. Only the populated fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl ProfileUpdate {
    /// Whether the update carries no field at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.location.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn role_parsing_is_case_sensitive() {
        assert_eq!("ADMIN".parse::<Role>(), Ok(Role::Admin));
        assert_eq!("PLAYER".parse::<Role>(), Ok(Role::Player));
        assert_eq!(
            "admin".parse::<Role>(),
            Err(UnknownRole("admin".to_string()))
        );
    }

    #[test]
    fn role_as_str_matches_serde() {
        for role in Role::ALL {
            let wire = serde_json::to_value(role).unwrap();
            assert_eq!(wire, json!(role.as_str()));
        }
    }

    #[test]
    fn unknown_role_claim_is_kept_verbatim() {
        let claim: RoleClaim = serde_json::from_value(json!("superuser")).unwrap();
        assert_eq!(claim, RoleClaim::Unknown("superuser".to_string()));
        assert_eq!(claim.known(), None);
        assert_eq!(serde_json::to_value(&claim).unwrap(), json!("superuser"));
    }

    #[test]
    fn lowercase_role_claim_is_unknown() {
        let claim = RoleClaim::from("staff".to_string());
        assert_eq!(claim.known(), None);
    }

    #[test]
    fn identity_accepts_mongo_style_id() {
        let identity: Identity = serde_json::from_value(json!({
            "_id": "u1",
            "name": "Ana",
            "email": "ana@example.com",
            "role": "AGENT"
        }))
        .unwrap();
        assert_eq!(identity.id, UserId::new("u1"));
        assert_eq!(identity.role(), Some(Role::Agent));
        assert_eq!(identity.location, None);
    }

    #[test]
    fn identity_without_location_serializes_without_the_field() {
        let identity = Identity {
            id: UserId::new("u2"),
            name: "Bo".to_string(),
            email: "bo@example.com".to_string(),
            role: Role::Player.into(),
            location: None,
        };
        let value = serde_json::to_value(&identity).unwrap();
        assert_eq!(
            value,
            json!({"id": "u2", "name": "Bo", "email": "bo@example.com", "role": "PLAYER"})
        );
    }

    #[test]
    fn to_user_ref_carries_identity_fields() {
        let identity = Identity {
            id: UserId::new("u3"),
            name: "Cy".to_string(),
            email: "cy@example.com".to_string(),
            role: Role::Staff.into(),
            location: Some("Lagos".to_string()),
        };
        let user_ref = identity.to_user_ref();
        assert_eq!(user_ref.id, identity.id);
        assert_eq!(user_ref.role, Some(RoleClaim::Known(Role::Staff)));
    }

    #[test]
    fn profile_update_sends_only_populated_fields() {
        let update = ProfileUpdate {
            location: Some("Nairobi".to_string()),
            ..ProfileUpdate::default()
        };
        assert!(!update.is_empty());
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({"location": "Nairobi"})
        );
        assert!(ProfileUpdate::default().is_empty());
    }
}
