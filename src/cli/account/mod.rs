//! Account commands

use clap::Args;

use super::session::user_facing;
use crate::domain::SignupProfile;
use crate::PortalSession;

/// Arguments for the signup command
#[derive(Args, Clone)]
pub struct SignupArgs {
    #[arg(long)]
    pub nif: String,

    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub first_surname: Option<String>,

    #[arg(long)]
    pub second_surname: Option<String>,

    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub password: String,

    #[arg(long)]
    pub phone: Option<String>,

    /// Birth date, YYYY-MM-DD
    #[arg(long)]
    pub birth_date: Option<String>,
}

impl From<SignupArgs> for SignupProfile {
    fn from(args: SignupArgs) -> Self {
        Self {
            nif: args.nif,
            name: args.name,
            first_surname: args.first_surname,
            second_surname: args.second_surname,
            email: args.email,
            password: args.password,
            phone: args.phone,
            birth_date: args.birth_date,
        }
    }
}

/// Arguments for the change-password command
#[derive(Args, Clone)]
pub struct ChangePasswordArgs {
    #[arg(long)]
    pub current: String,

    #[arg(long)]
    pub new: String,
}

pub async fn signup(manager: &PortalSession, args: SignupArgs) -> anyhow::Result<()> {
    let identity = manager
        .signup(&SignupProfile::from(args))
        .await
        .map_err(user_facing)?;

    match identity.display_name() {
        Some(name) => println!("Account created for {}", name),
        None => println!("Account created"),
    }
    Ok(())
}

pub async fn change_password(
    manager: &PortalSession,
    args: ChangePasswordArgs,
) -> anyhow::Result<()> {
    manager
        .change_password(&args.current, &args.new)
        .await
        .map_err(user_facing)?;

    println!("Password changed. Please sign in again.");
    Ok(())
}

pub async fn delete_account(manager: &PortalSession) -> anyhow::Result<()> {
    manager.delete_account().await.map_err(user_facing)?;
    println!("Account deleted");
    Ok(())
}
