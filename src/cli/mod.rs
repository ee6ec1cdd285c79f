//! CLI module for the HCC session client
//!
//! Drives the session manager from the command line:
//! - `login` / `logout` / `refresh`: session lifecycle
//! - `status` / `whoami` / `roles`: inspect the current session
//! - `navigate`: run the route guard for a path
//! - `signup` / `change-password` / `delete-account`: account operations

pub mod account;
pub mod navigate;
pub mod session;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;
use crate::PortalSession;

/// HCC Session - authentication client for the clinical-records portal
#[derive(Parser)]
#[command(name = "hcc-session")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Sign in and persist the session
    Login(session::LoginArgs),

    /// End the session (always clears local credentials)
    Logout,

    /// Exchange the current token for a fresh one
    Refresh,

    /// Show whether the session is authenticated
    Status,

    /// Show the current principal's claims and display name
    Whoami,

    /// List the roles of the current session
    Roles,

    /// Check whether the session may navigate to a path
    Navigate(navigate::NavigateArgs),

    /// Register a new account
    Signup(account::SignupArgs),

    /// Change the password (ends the session)
    ChangePassword(account::ChangePasswordArgs),

    /// Delete the account (ends the session)
    DeleteAccount,
}

/// Dispatch a parsed command line
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let manager = bootstrap()?;

    match cli.command {
        Command::Login(args) => session::login(&manager, args).await,
        Command::Logout => session::logout(&manager).await,
        Command::Refresh => session::refresh(&manager).await,
        Command::Status => session::status(&manager),
        Command::Whoami => session::whoami(&manager).await,
        Command::Roles => session::roles(&manager),
        Command::Navigate(args) => navigate::run(&manager, args),
        Command::Signup(args) => account::signup(&manager, args).await,
        Command::ChangePassword(args) => account::change_password(&manager, args).await,
        Command::DeleteAccount => account::delete_account(&manager).await,
    }
}

/// Load configuration, initialise logging and build the session manager
fn bootstrap() -> anyhow::Result<PortalSession> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let logging_config = logging::LoggingConfig::from(&config.logging);
    logging::init_logging(&logging_config);

    Ok(crate::create_session_manager(&config)?)
}
