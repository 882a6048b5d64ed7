//! # Authorization Gate
//!
//! Decides, without contacting the server, whether the current identity may
//! view a route or perform an action. Both decisions are table lookups:
//!
//! - [`Route::allowed_roles`] maps each dashboard route to the roles that
//!   may view it. An empty set means "any authenticated role".
//! - [`Action::allowed_roles`] maps each dispute action to the roles that
//!   may perform it.
//!
//! These tables are the only place roles are compared. Other components ask
//! [`authorize`] or [`permits`] instead of matching on roles themselves.
//!
//! Roles are compared against the fixed [`Role`] enumeration. An identity
//! whose role the client does not recognise is a member of no set: it may
//! open role-agnostic routes and nothing else.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::identity::{Identity, Role};

// ── Routes ──────────────────────────────────────────────────────────────

/// Navigation targets of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Login,
    Register,
    Home,
    Profile,
    Notifications,
    Disputes,
    DisputeDetail,
    Deposits,
    Withdrawals,
    AdminDashboard,
    AdminDisputes,
    StaffManagement,
    AgentPlayers,
}

const FUNDS_ROLES: &[Role] = &[Role::Admin, Role::Staff, Role::Agent, Role::Player];
const ANY_AUTHENTICATED: &[Role] = &[];

impl Route {
    /// Every route, in declaration order.
    pub const ALL: [Route; 13] = [
        Route::Login,
        Route::Register,
        Route::Home,
        Route::Profile,
        Route::Notifications,
        Route::Disputes,
        Route::DisputeDetail,
        Route::Deposits,
        Route::Withdrawals,
        Route::AdminDashboard,
        Route::AdminDisputes,
        Route::StaffManagement,
        Route::AgentPlayers,
    ];

    /// The path pattern of this route. `:id` marks a path parameter.
    pub fn pattern(&self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Register => "/register",
            Self::Home => "/",
            Self::Profile => "/profile",
            Self::Notifications => "/notifications",
            Self::Disputes => "/disputes",
            Self::DisputeDetail => "/disputes/:id",
            Self::Deposits => "/deposits",
            Self::Withdrawals => "/withdrawals",
            Self::AdminDashboard => "/admin",
            Self::AdminDisputes => "/admin/disputes",
            Self::StaffManagement => "/admin/staff",
            Self::AgentPlayers => "/agent/players",
        }
    }

    /// Routes reachable without signing in. The gate never applies to them.
    pub fn is_public(&self) -> bool {
        matches!(self, Self::Login | Self::Register)
    }

    /// Roles allowed to view this route. Empty means any authenticated role.
    pub fn allowed_roles(&self) -> &'static [Role] {
        match self {
            Self::Login
            | Self::Register
            | Self::Home
            | Self::Profile
            | Self::Notifications
            | Self::Disputes
            | Self::DisputeDetail => ANY_AUTHENTICATED,
            Self::Deposits | Self::Withdrawals => FUNDS_ROLES,
            Self::AdminDashboard => &[Role::Admin, Role::Staff],
            Self::AdminDisputes => &[Role::Admin, Role::Staff, Role::Support],
            Self::StaffManagement => &[Role::Admin],
            Self::AgentPlayers => &[Role::Agent],
        }
    }

    /// Resolve a concrete path such as `/disputes/d1` to its route.
    ///
    /// Trailing slashes and query strings are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ParseRouteError`] if no route pattern matches.
    pub fn from_path(path: &str) -> Result<Self, ParseRouteError> {
        let trimmed = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();

        Route::ALL
            .into_iter()
            .find(|route| {
                let pattern: Vec<&str> = route
                    .pattern()
                    .split('/')
                    .filter(|s| !s.is_empty())
                    .collect();
                pattern.len() == segments.len()
                    && pattern
                        .iter()
                        .zip(&segments)
                        .all(|(p, s)| p.starts_with(':') || p == s)
            })
            .ok_or_else(|| ParseRouteError(path.to_string()))
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.pattern())
    }
}

impl FromStr for Route {
    type Err = ParseRouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_path(s)
    }
}

/// No dashboard route matches the given path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no route matches path \"{0}\"")]
pub struct ParseRouteError(pub String);

// ── Gate ────────────────────────────────────────────────────────────────

/// Outcome of the authorization gate for one navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Access {
    /// Render the route.
    Allow,
    /// Nobody is signed in; go to the login route.
    RedirectLogin,
    /// Signed in without the required role; go home.
    RedirectHome,
}

impl Access {
    /// The route to navigate to instead, if any.
    pub fn redirect_target(&self) -> Option<Route> {
        match self {
            Self::Allow => None,
            Self::RedirectLogin => Some(Route::Login),
            Self::RedirectHome => Some(Route::Home),
        }
    }

    /// The wire name of this outcome.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allow => "ALLOW",
            Self::RedirectLogin => "REDIRECT_LOGIN",
            Self::RedirectHome => "REDIRECT_HOME",
        }
    }
}

impl std::fmt::Display for Access {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decide whether `identity` may view `route`.
///
/// Pure: no side effects, no I/O. Evaluated on every navigation.
pub fn authorize(route: Route, identity: Option<&Identity>) -> Access {
    if route.is_public() {
        return Access::Allow;
    }
    let Some(identity) = identity else {
        return Access::RedirectLogin;
    };
    let allowed = route.allowed_roles();
    if allowed.is_empty() || role_in(identity, allowed) {
        Access::Allow
    } else {
        Access::RedirectHome
    }
}

// ── Actions ─────────────────────────────────────────────────────────────

/// Dispute actions subject to a role check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Post a message to a dispute's log.
    ReplyToDispute,
    /// Open a new dispute against an order.
    RaiseDispute,
    /// Assign a dispute to a staff member.
    AssignDispute,
    /// Record a dispute's resolution.
    ResolveDispute,
    /// Read the roster of assignable staff.
    ViewStaffRoster,
    /// Read the disputes one raised or is involved in.
    ListOwnDisputes,
    /// Read every dispute rather than one's own.
    ListAllDisputes,
}

impl Action {
    /// Roles allowed to perform this action.
    pub fn allowed_roles(&self) -> &'static [Role] {
        match self {
            Self::ReplyToDispute => &Role::ALL,
            Self::RaiseDispute => &[Role::Agent, Role::Player],
            Self::AssignDispute => &[Role::Admin, Role::Staff],
            Self::ResolveDispute => &[Role::Admin],
            Self::ViewStaffRoster => &[Role::Admin, Role::Staff],
            Self::ListOwnDisputes => &Role::ALL,
            Self::ListAllDisputes => &[Role::Admin, Role::Staff, Role::Support],
        }
    }

    /// Human-readable name for error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReplyToDispute => "reply to dispute",
            Self::RaiseDispute => "raise dispute",
            Self::AssignDispute => "assign dispute",
            Self::ResolveDispute => "resolve dispute",
            Self::ViewStaffRoster => "view staff roster",
            Self::ListOwnDisputes => "list own disputes",
            Self::ListAllDisputes => "list all disputes",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether `identity` may perform `action`. Nobody signed in may do nothing.
pub fn permits(action: Action, identity: Option<&Identity>) -> bool {
    identity.is_some_and(|identity| role_in(identity, action.allowed_roles()))
}

fn role_in(identity: &Identity, allowed: &[Role]) -> bool {
    identity
        .role()
        .is_some_and(|role| allowed.contains(&role))
}
