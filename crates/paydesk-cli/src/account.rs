//! # Session Subcommands
//!
//! - `login` / `register`: authenticate and persist the session.
//! - `logout`: clear the session. Succeeds when nobody is signed in.
//! - `whoami`: print the signed-in identity.
//! - `profile`: send a partial profile update.
//! - `route`: print the gate's decision for a dashboard path.

use anyhow::{bail, Result};
use clap::Args;
use serde_json::json;

use paydesk_client::{Notification, Notifier};
use paydesk_core::{ProfileUpdate, Role, Route};

use crate::{print_json, Context};

/// Arguments for `paydesk login`.
#[derive(Args, Debug)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub password: String,
}

/// Arguments for `paydesk register`.
#[derive(Args, Debug)]
pub struct RegisterArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub password: String,
    /// One of ADMIN, STAFF, SUPPORT, AGENT, PLAYER.
    #[arg(long, default_value = "PLAYER")]
    pub role: Role,
}

/// Arguments for `paydesk profile`.
#[derive(Args, Debug)]
pub struct ProfileArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
}

/// Arguments for `paydesk route`.
#[derive(Args, Debug)]
pub struct RouteArgs {
    /// Dashboard path, e.g. `/admin/disputes` or `/disputes/d1`.
    pub path: String,
}

pub async fn run_login(ctx: &Context, args: &LoginArgs) -> Result<u8> {
    let result = ctx.client.auth().login(&args.email, &args.password).await;
    ctx.finish(result, |who| Some(format!("Welcome back, {}", who.name)))
}

pub async fn run_register(ctx: &Context, args: &RegisterArgs) -> Result<u8> {
    let result = ctx
        .client
        .auth()
        .register(&args.name, &args.email, &args.password, args.role)
        .await;
    ctx.finish(result, |who| Some(format!("Account created for {}", who.email)))
}

pub fn run_logout(ctx: &Context) -> Result<u8> {
    if ctx.client.session().logout() {
        ctx.notifier.notify(Notification::success("Signed out"));
    }
    Ok(0)
}

pub fn run_whoami(ctx: &Context) -> Result<u8> {
    match ctx.client.session().identity() {
        Some(identity) => {
            print_json(&identity)?;
            Ok(0)
        }
        None => {
            eprintln!("not signed in; run `paydesk login`");
            Ok(1)
        }
    }
}

pub async fn run_profile(ctx: &Context, args: &ProfileArgs) -> Result<u8> {
    let update = ProfileUpdate {
        name: args.name.clone(),
        email: args.email.clone(),
        location: args.location.clone(),
    };
    if update.is_empty() {
        bail!("nothing to update: pass at least one of --name, --email, --location");
    }
    let result = ctx.client.auth().update_profile(&update).await;
    ctx.finish(result, |_| Some("Profile updated".to_string()))
}

pub fn run_route(ctx: &Context, args: &RouteArgs) -> Result<u8> {
    let route: Route = args.path.parse()?;
    let access = ctx.client.authorize(route);
    print_json(&json!({
        "route": route.pattern(),
        "access": access.as_str(),
        "redirect": access.redirect_target().map(|r| r.pattern()),
    }))?;
    Ok(0)
}
