//! Session lifecycle commands

use anyhow::anyhow;
use chrono::{TimeZone, Utc};
use clap::Args;

use crate::domain::{AuthError, LoginCredentials, RoleSet};
use crate::PortalSession;

/// Arguments for the login command
#[derive(Args, Clone)]
pub struct LoginArgs {
    /// National identity number
    #[arg(long)]
    pub nif: String,

    #[arg(long)]
    pub password: String,
}

pub async fn login(manager: &PortalSession, args: LoginArgs) -> anyhow::Result<()> {
    let outcome = manager
        .login(&LoginCredentials::new(args.nif, args.password))
        .await
        .map_err(user_facing)?;

    println!("Signed in");
    println!("  expires: {}", format_expiry(outcome.expires_at_ms));
    println!("  roles:   {}", format_roles(&outcome.roles));
    Ok(())
}

pub async fn logout(manager: &PortalSession) -> anyhow::Result<()> {
    manager.logout().await;
    println!("Signed out");
    Ok(())
}

pub async fn refresh(manager: &PortalSession) -> anyhow::Result<()> {
    manager.refresh_token().await.map_err(user_facing)?;

    let snapshot = manager.snapshot();
    println!("Token refreshed");
    println!("  expires: {}", format_expiry(snapshot.expires_at_ms));
    Ok(())
}

pub fn status(manager: &PortalSession) -> anyhow::Result<()> {
    let snapshot = manager.snapshot();

    println!("state:   {:?}", snapshot.state());
    if snapshot.authenticated {
        let expiry = snapshot
            .principal
            .as_ref()
            .and_then(|claims| claims.expires_at_ms())
            .or(snapshot.expires_at_ms);
        println!("expires: {}", format_expiry(expiry));
        println!("roles:   {}", format_roles(&snapshot.roles));
    }
    Ok(())
}

pub async fn whoami(manager: &PortalSession) -> anyhow::Result<()> {
    let Some(principal) = manager.current_principal() else {
        println!("Not signed in");
        return Ok(());
    };

    if let Some(name) = manager.principal_summary().await.map_err(user_facing)? {
        println!("name:    {}", name);
    }
    if let Some(subject) = principal.subject() {
        println!("subject: {}", subject);
    }
    println!("{}", serde_json::to_string_pretty(principal.as_map())?);
    Ok(())
}

pub fn roles(manager: &PortalSession) -> anyhow::Result<()> {
    if !manager.is_authenticated() {
        println!("Not signed in");
        return Ok(());
    }

    for role in manager.roles() {
        println!("{}", role);
    }
    Ok(())
}

pub(crate) fn user_facing(error: AuthError) -> anyhow::Error {
    tracing::debug!(error = %error, "Command failed");
    anyhow!(error.user_message())
}

fn format_expiry(expires_at_ms: Option<i64>) -> String {
    expires_at_ms
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
        .map(|at| at.to_rfc3339())
        .unwrap_or_else(|| "unknown".to_string())
}

fn format_roles(roles: &RoleSet) -> String {
    if roles.is_empty() {
        "-".to_string()
    } else {
        roles.iter().cloned().collect::<Vec<_>>().join(", ")
    }
}
