//! Lookup and find commands - read-only resolution

use adlc_core::directory::Directory;
use adlc_core::session::Reconciler;
use clap::Args;

use crate::config::AppConfig;
use crate::error::{CliError, CliResult};
use crate::output::{Outcome, Report};

/// Arguments for the lookup command
#[derive(Debug, Args)]
pub struct LookupArgs {
    /// Instance id, e.g. i-0123456789abcdef0
    pub instance_id: String,
}

/// Arguments for the find command
#[derive(Debug, Args)]
pub struct FindArgs {
    /// Computer name (CN); defaults to `computer_name` from the config file
    pub name: Option<String>,
}

/// Execute the lookup command
pub async fn execute<D: Directory>(
    reconciler: &Reconciler<D>,
    args: LookupArgs,
) -> CliResult<Report> {
    let outcome = reconciler.lookup(&args.instance_id).await?;
    Ok(Report::new(
        "lookup",
        args.instance_id,
        Outcome::Resolution(outcome),
    ))
}

/// Execute the find command
pub async fn execute_find<D: Directory>(
    reconciler: &Reconciler<D>,
    config: &AppConfig,
    args: FindArgs,
) -> CliResult<Report> {
    let name = args
        .name
        .or_else(|| config.computer_name.clone())
        .ok_or_else(|| {
            CliError::Validation("no computer name given and none configured".to_string())
        })?;

    let outcome = reconciler.lookup_by_name(&name).await?;
    Ok(Report::new("find", name, Outcome::Resolution(outcome)))
}
