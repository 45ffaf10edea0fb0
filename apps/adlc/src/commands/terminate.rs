//! Terminate command - reconcile an instance termination

use adlc_core::directory::Directory;
use adlc_core::session::Reconciler;
use clap::Args;

use crate::error::CliResult;
use crate::output::{Outcome, Report};

/// Arguments for the terminate command
#[derive(Debug, Args)]
pub struct TerminateArgs {
    /// Instance id, e.g. i-0123456789abcdef0
    pub instance_id: String,
}

/// Execute the terminate command
pub async fn execute<D: Directory>(
    reconciler: &Reconciler<D>,
    args: TerminateArgs,
) -> CliResult<Report> {
    let outcome = reconciler.reconcile_termination(&args.instance_id).await?;
    Ok(Report::new(
        "terminate",
        args.instance_id,
        Outcome::Termination(outcome),
    ))
}
