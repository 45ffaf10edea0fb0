//! Lifecycle engine error types
//!
//! Three layers, each with its own enum:
//! - [`FormatError`]: local input validation (identifiers, DNs, suffix lengths)
//! - [`DirectoryError`]: failures reported by the directory collaborator
//! - [`LifecycleError`]: everything an engine operation can fail with
//!
//! Normal outcomes such as "not found" or "ambiguous" are NOT errors; they are
//! variants of [`crate::resolver::ResolutionOutcome`].

use thiserror::Error;

use crate::directory::DirectoryOperation;

/// Input that does not satisfy a naming invariant.
///
/// Never produced after a directory call: validation always runs first.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// External identifier does not match `^i-[A-Za-z0-9]{17}$`.
    #[error(
        "instance identifier '{value}' is in wrong format \
         (expected 'i-' followed by 17 alphanumeric characters)"
    )]
    InvalidIdentifier { value: String },

    /// Distinguished name does not match `^CN=[A-Za-z0-9-]{1,63},.+$`.
    #[error("DN '{value}' is in wrong format")]
    InvalidDn { value: String },

    /// Computer name is not 1-63 letters, digits or hyphens.
    #[error("computer name '{value}' is in wrong format")]
    InvalidComputerName { value: String },

    /// Naming suffix length outside the identifier body.
    #[error("suffix length {length} is out of range (1..={max})")]
    InvalidSuffixLength { length: usize, max: usize },
}

/// Error reported by the directory collaborator.
///
/// The collaborator's own description is carried verbatim so operators see
/// exactly what the directory said.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Could not establish or authenticate a session.
    #[error("bind failed: {message}")]
    BindFailed {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Directory rejected the credentials (LDAP result code 49).
    #[error("bind failed: invalid credentials")]
    AuthenticationFailed,

    /// Network or protocol failure while talking to the directory.
    #[error("{operation} failed: {message}")]
    Transport {
        operation: DirectoryOperation,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The directory answered with a non-success result code.
    #[error("{operation} of '{dn}' rejected with code {rc}: {description}")]
    OperationRejected {
        operation: DirectoryOperation,
        dn: String,
        rc: u32,
        description: String,
    },

    /// An attribute value read from the directory could not be decoded.
    #[error("invalid value for attribute '{attribute}': '{value}'")]
    InvalidAttribute { attribute: String, value: String },
}

impl DirectoryError {
    /// Check if this error is transient and the operation may succeed later.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DirectoryError::BindFailed { .. } | DirectoryError::Transport { .. }
        )
    }

    /// Get an error code for classification.
    pub fn error_code(&self) -> &'static str {
        match self {
            DirectoryError::BindFailed { .. } => "BIND_FAILED",
            DirectoryError::AuthenticationFailed => "AUTH_FAILED",
            DirectoryError::Transport { .. } => "TRANSPORT_ERROR",
            DirectoryError::OperationRejected { .. } => "OPERATION_REJECTED",
            DirectoryError::InvalidAttribute { .. } => "INVALID_ATTRIBUTE",
        }
    }

    /// Create a bind failed error.
    pub fn bind_failed(message: impl Into<String>) -> Self {
        DirectoryError::BindFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Create a bind failed error with source.
    pub fn bind_failed_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        DirectoryError::BindFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a transport error.
    pub fn transport(operation: DirectoryOperation, message: impl Into<String>) -> Self {
        DirectoryError::Transport {
            operation,
            message: message.into(),
            source: None,
        }
    }

    /// Create a transport error with source.
    pub fn transport_with_source(
        operation: DirectoryOperation,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        DirectoryError::Transport {
            operation,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Error returned by resolver and controller operations.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Caller input failed validation; no directory call was made.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// The directory collaborator failed or rejected an operation.
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// A unique search result carried a DN that fails validation.
    #[error("corrupt directory data: search returned malformed DN '{dn}'")]
    CorruptDirectoryData { dn: String },

    /// Caller tried to set an attribute the controller owns.
    #[error(
        "attribute '{attribute}' is managed by the lifecycle controller and cannot be supplied"
    )]
    ReservedAttribute { attribute: String },

    /// Engine configuration is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },
}

impl LifecycleError {
    /// Get an error code for classification.
    pub fn error_code(&self) -> &'static str {
        match self {
            LifecycleError::Format(FormatError::InvalidIdentifier { .. }) => "INVALID_IDENTIFIER",
            LifecycleError::Format(FormatError::InvalidDn { .. }) => "INVALID_DN",
            LifecycleError::Format(FormatError::InvalidComputerName { .. }) => {
                "INVALID_COMPUTER_NAME"
            }
            LifecycleError::Format(FormatError::InvalidSuffixLength { .. }) => {
                "INVALID_SUFFIX_LENGTH"
            }
            LifecycleError::Directory(e) => e.error_code(),
            LifecycleError::CorruptDirectoryData { .. } => "CORRUPT_DIRECTORY_DATA",
            LifecycleError::ReservedAttribute { .. } => "RESERVED_ATTRIBUTE",
            LifecycleError::InvalidConfiguration { .. } => "INVALID_CONFIG",
        }
    }

    /// Check if this error is transient.
    pub fn is_transient(&self) -> bool {
        match self {
            LifecycleError::Directory(e) => e.is_transient(),
            _ => false,
        }
    }
}

/// Result type for lifecycle operations.
pub type LifecycleResult<T> = Result<T, LifecycleError>;

/// Result type for directory collaborator calls.
pub type DirectoryResult<T> = Result<T, DirectoryError>;
