//! Disable and enable commands

use adlc_core::directory::Directory;
use adlc_core::session::Reconciler;
use clap::Args;

use crate::error::CliResult;
use crate::output::{Outcome, Report};

/// Arguments for the disable and enable commands
#[derive(Debug, Args)]
pub struct StateArgs {
    /// DN of the computer object
    pub dn: String,
}

/// Execute the disable command
pub async fn disable<D: Directory>(
    reconciler: &Reconciler<D>,
    args: StateArgs,
) -> CliResult<Report> {
    let disabled = reconciler.disable(&args.dn).await?;
    Ok(Report::new(
        "disable",
        args.dn,
        Outcome::Changed {
            action: "Disabled",
            dn: disabled.dn.to_string(),
        },
    ))
}

/// Execute the enable command
pub async fn enable<D: Directory>(
    reconciler: &Reconciler<D>,
    args: StateArgs,
) -> CliResult<Report> {
    let enabled = reconciler.enable(&args.dn).await?;
    Ok(Report::new(
        "enable",
        args.dn,
        Outcome::Changed {
            action: "Enabled",
            dn: enabled.dn.to_string(),
        },
    ))
}
