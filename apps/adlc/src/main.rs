//! adlc CLI - Active Directory computer lifecycle
//!
//! This CLI enables operators to:
//! - Delete the computer object of a terminated instance
//! - Look up computer objects by instance id or name
//! - Pre-stage, disable, enable and delete computer objects

use std::path::PathBuf;

use adlc::commands::{self, Command};
use adlc::config::{AppConfig, DEFAULT_CONFIG_PATH};
use adlc::error::CliResult;
use adlc::logging::init_logging;
use adlc_ldap::LdapDirectory;
use clap::{ArgAction, Parser};

/// adlc - Active Directory computer lifecycle
#[derive(Parser)]
#[command(name = "adlc")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, global = true, env = "ADLC_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Emit logs as JSON on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_json);

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            e.print();
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> CliResult<i32> {
    let config = AppConfig::load(&cli.config)?;
    let reconciler = config.reconciler(LdapDirectory::new())?;

    let report = commands::execute(&reconciler, &config, cli.command).await?;
    report.print(cli.json)?;
    Ok(report.exit_code())
}
