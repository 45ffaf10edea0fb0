//! Terminal output helpers for consistent CLI formatting

use adlc_core::controller::TerminationOutcome;
use adlc_core::resolver::ResolutionOutcome;
use serde::Serialize;

use crate::error::{CliResult, EXIT_AMBIGUOUS, EXIT_SUCCESS};

/// Check if color output is enabled
fn use_color() -> bool {
    std::env::var("NO_COLOR").is_err()
}

/// Print a success message (green checkmark)
pub fn print_success(message: &str) {
    if use_color() {
        println!("\x1b[32m✓\x1b[0m {}", message);
    } else {
        println!("OK: {}", message);
    }
}

/// Print a warning message (yellow)
pub fn print_warning(message: &str) {
    if use_color() {
        eprintln!("\x1b[33mWarning:\x1b[0m {}", message);
    } else {
        eprintln!("Warning: {}", message);
    }
}

/// Print an info message (blue)
pub fn print_info(message: &str) {
    if use_color() {
        println!("\x1b[34mℹ\x1b[0m {}", message);
    } else {
        println!("Info: {}", message);
    }
}

/// Print a key-value pair with consistent formatting
pub fn print_key_value(key: &str, value: &str) {
    if use_color() {
        println!("  \x1b[1m{}:\x1b[0m {}", key, value);
    } else {
        println!("  {}: {}", key, value);
    }
}

/// What a command did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    Termination(TerminationOutcome),
    Resolution(ResolutionOutcome),
    Changed { action: &'static str, dn: String },
}

/// Result of one command, printed as text or JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub command: &'static str,
    pub target: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl Report {
    pub fn new(command: &'static str, target: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            command,
            target: target.into(),
            outcome,
        }
    }

    /// Ambiguous matches exit non-zero; everything else reaching here is success.
    pub fn exit_code(&self) -> i32 {
        match &self.outcome {
            Outcome::Termination(TerminationOutcome::Ambiguous { .. })
            | Outcome::Resolution(ResolutionOutcome::Ambiguous { .. }) => EXIT_AMBIGUOUS,
            _ => EXIT_SUCCESS,
        }
    }

    /// Print to stdout.
    pub fn print(&self, json: bool) -> CliResult<()> {
        if json {
            println!("{}", serde_json::to_string_pretty(self)?);
            return Ok(());
        }

        match &self.outcome {
            Outcome::Termination(TerminationOutcome::Deleted { dn }) => {
                print_success(&format!("Deleted computer object for {}", self.target));
                print_key_value("DN", dn.as_str());
            }
            Outcome::Termination(TerminationOutcome::NotFound)
            | Outcome::Resolution(ResolutionOutcome::NotFound) => {
                print_info(&format!("No computer object matches {}", self.target));
            }
            Outcome::Termination(TerminationOutcome::Ambiguous { count, dns })
            | Outcome::Resolution(ResolutionOutcome::Ambiguous { count, dns }) => {
                print_warning(&format!(
                    "{} matches {} or more computer objects; nothing was changed",
                    self.target, count
                ));
                for dn in dns {
                    print_key_value("DN", dn);
                }
            }
            Outcome::Resolution(ResolutionOutcome::Unique { dn }) => {
                print_key_value("DN", dn.as_str());
            }
            Outcome::Changed { action, dn } => {
                print_success(&format!("{action} {dn}"));
            }
        }
        Ok(())
    }
}
