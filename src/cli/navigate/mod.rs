//! Navigate command - runs the route guard without leaving the terminal

use anyhow::bail;
use clap::Args;

use crate::domain::{NavigationDecision, RouteName};
use crate::PortalSession;

/// Arguments for the navigate command
#[derive(Args, Clone)]
pub struct NavigateArgs {
    /// Route path, e.g. `/dashboard`
    pub path: String,
}

pub fn run(manager: &PortalSession, args: NavigateArgs) -> anyhow::Result<()> {
    let Some(route) = RouteName::from_path(&args.path) else {
        bail!("No route matches '{}'", args.path);
    };

    match manager.authorize(route) {
        NavigationDecision::Allow => println!("allow {}", route.path()),
        NavigationDecision::RedirectTo(target) => {
            println!("redirect {} -> {} ({})", route.path(), target.path(), target)
        }
    }
    Ok(())
}
