//! Delete command - remove a computer object by DN

use adlc_core::directory::Directory;
use adlc_core::session::Reconciler;
use clap::Args;

use crate::error::CliResult;
use crate::output::{Outcome, Report};

/// Arguments for the delete command
#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// DN of the computer object
    pub dn: String,
}

/// Execute the delete command
pub async fn execute<D: Directory>(
    reconciler: &Reconciler<D>,
    args: DeleteArgs,
) -> CliResult<Report> {
    let deleted = reconciler.delete(&args.dn).await?;
    Ok(Report::new(
        "delete",
        args.dn,
        Outcome::Changed {
            action: "Deleted",
            dn: deleted.dn.to_string(),
        },
    ))
}
