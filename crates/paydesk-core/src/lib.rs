//! # paydesk-core — Domain Model for the Paydesk Dashboard
//!
//! Pure types and decisions shared by every other crate in the workspace.
//! Nothing here performs I/O.
//!
//! - **Identity** ([`identity`]): identifier newtypes, the fixed [`Role`]
//!   enumeration, the signed-in [`Identity`] and embedded [`UserRef`]s.
//!
//! - **Dispute** ([`dispute`]): the dispute record, its append-only message
//!   log, resolution details, and the forward-only [`DisputeStatus`]
//!   lifecycle.
//!
//! - **Access** ([`access`]): the route and action permission tables and the
//!   authorization gate. Every role check in the workspace goes through this
//!   module.
//!
//! - **Error** ([`error`]): client-side validation failures raised before
//!   any request is issued.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `paydesk-*` crates.
//! - No `unsafe` code.
//! - No `.unwrap()` outside tests.

pub mod access;
pub mod dispute;
pub mod error;
pub mod identity;

pub use access::{authorize, permits, Access, Action, ParseRouteError, Route};
pub use dispute::{
    Dispute, DisputeQuery, DisputeStatus, Message, NewDispute, Resolution, ResolveRequest,
    StaffMember, UnknownStatus,
};
pub use error::ValidationError;
pub use identity::{
    DisputeId, Identity, MessageId, ProfileUpdate, Role, RoleClaim, UnknownRole, UserId, UserRef,
};
