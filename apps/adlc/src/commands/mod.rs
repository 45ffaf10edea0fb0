//! CLI subcommands
//!
//! Every command runs inside one bind/unbind pair and returns a [`Report`].

pub mod create;
pub mod delete;
pub mod lookup;
pub mod state;
pub mod terminate;

use adlc_core::directory::Directory;
use adlc_core::session::Reconciler;
use clap::Subcommand;

use crate::config::AppConfig;
use crate::error::CliResult;
use crate::output::Report;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Delete the computer object of a terminated instance
    Terminate(terminate::TerminateArgs),

    /// Resolve an instance id to its computer object without changing it
    Lookup(lookup::LookupArgs),

    /// Find a computer object by exact name
    Find(lookup::FindArgs),

    /// Pre-stage a computer object for a domain join
    Create(create::CreateArgs),

    /// Disable a computer object
    Disable(state::StateArgs),

    /// Re-enable a disabled computer object
    Enable(state::StateArgs),

    /// Delete a computer object by DN
    Delete(delete::DeleteArgs),
}

/// Run a command against a reconciler.
pub async fn execute<D: Directory>(
    reconciler: &Reconciler<D>,
    config: &AppConfig,
    command: Command,
) -> CliResult<Report> {
    match command {
        Command::Terminate(args) => terminate::execute(reconciler, args).await,
        Command::Lookup(args) => lookup::execute(reconciler, args).await,
        Command::Find(args) => lookup::execute_find(reconciler, config, args).await,
        Command::Create(args) => create::execute(reconciler, config, args).await,
        Command::Disable(args) => state::disable(reconciler, args).await,
        Command::Enable(args) => state::enable(reconciler, args).await,
        Command::Delete(args) => delete::execute(reconciler, args).await,
    }
}
