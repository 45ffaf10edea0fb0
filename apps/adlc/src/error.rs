//! CLI error types and exit codes

use adlc_core::error::{DirectoryError, LifecycleError};
use thiserror::Error;

/// Exit codes for the CLI
/// - 0: Success (including "not found")
/// - 1: General error
/// - 2: Authentication failed
/// - 3: Ambiguous match, operator action required
/// - 4: Invalid input
/// - 5: Corrupt directory data
pub type CliResult<T> = Result<T, CliError>;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ERROR: i32 = 1;
pub const EXIT_AUTH: i32 = 2;
pub const EXIT_AMBIGUOUS: i32 = 3;
pub const EXIT_INVALID_INPUT: i32 = 4;
pub const EXIT_CORRUPT: i32 = 5;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Get the process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) | CliError::Json(_) => EXIT_ERROR,
            CliError::Validation(_) => EXIT_INVALID_INPUT,
            CliError::Lifecycle(e) => match e {
                LifecycleError::Format(_) | LifecycleError::ReservedAttribute { .. } => {
                    EXIT_INVALID_INPUT
                }
                LifecycleError::CorruptDirectoryData { .. } => EXIT_CORRUPT,
                LifecycleError::Directory(DirectoryError::AuthenticationFailed) => EXIT_AUTH,
                LifecycleError::Directory(_) | LifecycleError::InvalidConfiguration { .. } => {
                    EXIT_ERROR
                }
            },
        }
    }

    /// Print the error to stderr with formatting
    pub fn print(&self) {
        let use_color = std::env::var("NO_COLOR").is_err();

        if use_color {
            eprintln!("\x1b[31mError:\x1b[0m {}", self);
        } else {
            eprintln!("Error: {}", self);
        }

        if let Some(suggestion) = self.suggestion() {
            if use_color {
                eprintln!("\n\x1b[33mSuggestion:\x1b[0m {}", suggestion);
            } else {
                eprintln!("\nSuggestion: {}", suggestion);
            }
        }
    }

    /// Get a suggested action for this error
    fn suggestion(&self) -> Option<&'static str> {
        match self {
            CliError::Config(_) => Some(
                "Check .config.yml (or --config) and the ADLC_* environment variables.",
            ),
            CliError::Lifecycle(LifecycleError::Directory(
                DirectoryError::AuthenticationFailed,
            )) => Some("Check username and password; use a UPN or DOMAIN\\user for simple binds."),
            CliError::Lifecycle(LifecycleError::CorruptDirectoryData { .. }) => Some(
                "Inspect the object by hand; its name does not follow the computer naming rules.",
            ),
            CliError::Lifecycle(e) if e.is_transient() => {
                Some("The directory may be unreachable. Check server, port and TLS settings.")
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adlc_core::directory::DirectoryOperation;
    use adlc_core::error::FormatError;

    #[test]
    fn test_exit_codes() {
        let cases: Vec<(CliError, i32)> = vec![
            (CliError::Config("missing server".into()), 1),
            (CliError::Validation("bad attr".into()), 4),
            (
                LifecycleError::from(FormatError::InvalidIdentifier {
                    value: "i-1".into(),
                })
                .into(),
                4,
            ),
            (
                LifecycleError::ReservedAttribute {
                    attribute: "objectClass".into(),
                }
                .into(),
                4,
            ),
            (
                LifecycleError::CorruptDirectoryData {
                    dn: "CN=bad name,DC=test".into(),
                }
                .into(),
                5,
            ),
            (
                LifecycleError::from(DirectoryError::AuthenticationFailed).into(),
                2,
            ),
            (
                LifecycleError::from(DirectoryError::transport(
                    DirectoryOperation::Search,
                    "timeout",
                ))
                .into(),
                1,
            ),
        ];

        for (err, code) in cases {
            assert_eq!(err.exit_code(), code, "{err}");
        }
    }

    #[test]
    fn test_suggestions() {
        let err: CliError = LifecycleError::from(DirectoryError::AuthenticationFailed).into();
        assert!(err.suggestion().is_some());

        let err: CliError =
            LifecycleError::from(DirectoryError::bind_failed("connection refused")).into();
        assert!(err.suggestion().unwrap().contains("unreachable"));

        assert!(CliError::Validation("x".into()).suggestion().is_none());
    }
}
