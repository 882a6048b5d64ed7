//! # Dispute Subcommands
//!
//! Work the dispute queue as the signed-in user. Role checks happen in the
//! client before any request; a refused action exits 1 without touching
//! the network.
//!
//! - `show <id>` — load one dispute with its message log.
//! - `reply <id> <text>` — load the dispute, then post a reply.
//! - `assign <id> <staff-id>` — assign to a staff member (admin, staff).
//! - `resolve <id> --note` — record a resolution (admin).
//! - `staff` — list assignable staff (admin, staff).
//! - `raise --reason` — open a new dispute (agent, player).
//! - `list [--all]` — own disputes, or the full queue.

use anyhow::Result;
use clap::{Args, Subcommand};
use serde_json::Number;

use paydesk_core::{DisputeId, DisputeQuery, DisputeStatus, NewDispute, ResolveRequest, UserId};

use crate::Context;

/// Arguments for the `paydesk dispute` subcommand.
#[derive(Args, Debug)]
pub struct DisputeArgs {
    #[command(subcommand)]
    pub command: DisputeCommand,
}

/// Dispute subcommands.
#[derive(Subcommand, Debug)]
pub enum DisputeCommand {
    /// Show a dispute and its message log.
    Show { id: String },

    /// Post a reply to a dispute.
    Reply { id: String, text: String },

    /// Assign a dispute to a staff member.
    Assign { id: String, staff_id: String },

    /// Record a dispute's resolution.
    Resolve {
        id: String,
        #[arg(long)]
        note: String,
        /// Outcome label, e.g. REFUNDED or REJECTED.
        #[arg(long)]
        outcome: Option<String>,
        #[arg(long)]
        refund_amount: Option<Number>,
    },

    /// List staff members a dispute may be assigned to.
    Staff,

    /// Open a new dispute.
    Raise {
        #[arg(long)]
        reason: String,
        #[arg(long)]
        order_id: Option<String>,
        #[arg(long)]
        amount: Option<Number>,
    },

    /// List disputes.
    List {
        /// The full admin queue instead of your own disputes.
        #[arg(long)]
        all: bool,
        /// OPEN, ASSIGNED, IN_PROGRESS, RESOLVED or CLOSED.
        #[arg(long)]
        status: Option<DisputeStatus>,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
    },
}

/// Execute the dispute subcommand.
pub async fn run_dispute(ctx: &Context, args: &DisputeArgs) -> Result<u8> {
    let mut view = ctx.client.disputes();

    match &args.command {
        DisputeCommand::Show { id } => {
            let result = view.load(&DisputeId::new(id.as_str())).await;
            ctx.finish(result, |_| None)
        }

        DisputeCommand::Reply { id, text } => {
            // Each invocation starts with an empty controller; load so the
            // reply is checked against the dispute's current status.
            let id = DisputeId::new(id.as_str());
            let result = match view.load(&id).await {
                Ok(_) => view.reply(&id, text).await,
                Err(e) => Err(e),
            };
            ctx.finish(result, |_| Some("Reply sent".to_string()))
        }

        DisputeCommand::Assign { id, staff_id } => {
            let result = view
                .assign(&DisputeId::new(id.as_str()), &UserId::new(staff_id.as_str()))
                .await;
            ctx.finish(result, |d| {
                Some(format!("Dispute {} assigned to {staff_id}", d.id))
            })
        }

        DisputeCommand::Resolve {
            id,
            note,
            outcome,
            refund_amount,
        } => {
            let request = ResolveRequest {
                note: note.clone(),
                outcome: outcome.clone(),
                refund_amount: refund_amount.clone(),
            };
            let result = view.resolve(&DisputeId::new(id.as_str()), &request).await;
            ctx.finish(result, |d| Some(format!("Dispute {} resolved", d.id)))
        }

        DisputeCommand::Staff => {
            let result = view.staff_roster().await;
            ctx.finish(result, |_| None)
        }

        DisputeCommand::Raise {
            reason,
            order_id,
            amount,
        } => {
            let new_dispute = NewDispute {
                order_id: order_id.clone(),
                amount: amount.clone(),
                reason: reason.clone(),
            };
            let result = view.raise(&new_dispute).await;
            ctx.finish(result, |d| Some(format!("Dispute {} raised", d.id)))
        }

        DisputeCommand::List {
            all,
            status,
            page,
            limit,
        } => {
            let query = DisputeQuery {
                status: *status,
                page: *page,
                limit: *limit,
            };
            let result = if *all {
                view.list_all(&query).await
            } else {
                view.list_mine(&query).await
            };
            ctx.finish(result, |_| None)
        }
    }
}
