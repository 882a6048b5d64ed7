//! # paydesk CLI entry point
//!
//! Parses command-line arguments, loads configuration from the environment,
//! and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use paydesk_cli::account::{
    run_login, run_logout, run_profile, run_register, run_route, run_whoami, LoginArgs,
    ProfileArgs, RegisterArgs, RouteArgs,
};
use paydesk_cli::dispute::{run_dispute, DisputeArgs};
use paydesk_cli::Context;
use paydesk_client::PaydeskConfig;

/// Paydesk dashboard from the terminal.
///
/// Reads `PAYDESK_API_URL`, `PAYDESK_TIMEOUT_SECS` and
/// `PAYDESK_SESSION_FILE` from the environment.
#[derive(Parser, Debug)]
#[command(name = "paydesk", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign in and remember the session.
    Login(LoginArgs),

    /// Create an account and sign in as it.
    Register(RegisterArgs),

    /// Forget the stored session.
    Logout,

    /// Print the signed-in identity.
    Whoami,

    /// Update name, email, or location.
    Profile(ProfileArgs),

    /// Show whether the current session may open a dashboard path.
    Route(RouteArgs),

    /// Dispute queue operations.
    Dispute(DisputeArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match PaydeskConfig::from_env() {
        Ok(config) => match Context::from_config(&config) {
            Ok(ctx) => dispatch(&ctx, &cli.command).await,
            Err(e) => Err(e),
        },
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

async fn dispatch(ctx: &Context, command: &Commands) -> anyhow::Result<u8> {
    match command {
        Commands::Login(args) => run_login(ctx, args).await,
        Commands::Register(args) => run_register(ctx, args).await,
        Commands::Logout => run_logout(ctx),
        Commands::Whoami => run_whoami(ctx),
        Commands::Profile(args) => run_profile(ctx, args).await,
        Commands::Route(args) => run_route(ctx, args),
        Commands::Dispute(args) => run_dispute(ctx, args).await,
    }
}
