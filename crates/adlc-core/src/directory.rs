//! Directory collaborator traits
//!
//! The engine never talks to the wire itself. It drives an implementation
//! of [`Directory`] (to bind) and [`DirectorySession`] (everything else).
//! Mutating calls only accept a [`DistinguishedName`], so an unvalidated DN
//! cannot reach them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

use crate::config::{DirectoryCredentials, DirectoryEndpoint};
use crate::dn::DistinguishedName;
use crate::error::{DirectoryError, DirectoryResult};

/// LDAP result code: success.
pub const RC_SUCCESS: u32 = 0;
/// LDAP result code: sizeLimitExceeded.
pub const RC_SIZE_LIMIT_EXCEEDED: u32 = 4;
/// LDAP result code: noSuchObject.
pub const RC_NO_SUCH_OBJECT: u32 = 32;
/// LDAP result code: invalidCredentials.
pub const RC_INVALID_CREDENTIALS: u32 = 49;
/// LDAP result code: insufficientAccessRights.
pub const RC_INSUFFICIENT_ACCESS: u32 = 50;
/// LDAP result code: entryAlreadyExists.
pub const RC_ALREADY_EXISTS: u32 = 68;

/// Kind of directory call, used in error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectoryOperation {
    Bind,
    Search,
    Add,
    Modify,
    Delete,
    Unbind,
}

impl fmt::Display for DirectoryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DirectoryOperation::Bind => "bind",
            DirectoryOperation::Search => "search",
            DirectoryOperation::Add => "add",
            DirectoryOperation::Modify => "modify",
            DirectoryOperation::Delete => "delete",
            DirectoryOperation::Unbind => "unbind",
        };
        f.write_str(name)
    }
}

/// Search scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchScope {
    Base,
    OneLevel,
    #[default]
    Subtree,
}

/// A search as handed to the collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Base DN of the search.
    pub base: String,
    /// Search scope.
    pub scope: SearchScope,
    /// RFC 4515 filter string.
    pub filter: String,
    /// Attributes to return.
    pub attributes: Vec<String>,
    /// Maximum number of entries the directory should return.
    pub size_limit: i32,
}

/// One entry returned by a search.
///
/// The DN is kept raw; callers validate it before using it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DirectoryEntry {
    pub dn: String,
    pub attributes: HashMap<String, Vec<String>>,
}

impl DirectoryEntry {
    /// Create an entry with no attributes.
    pub fn new(dn: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            attributes: HashMap::new(),
        }
    }

    /// Builder: add a single-valued attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes
            .entry(name.into())
            .or_default()
            .push(value.into());
        self
    }

    /// First value of an attribute. Names compare case-insensitively.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .and_then(|(_, values)| values.first())
            .map(String::as_str)
    }
}

/// Structured result of a mutating call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationResult {
    /// LDAP result code.
    pub rc: u32,
    /// Matched DN reported by the server, if any.
    pub matched_dn: String,
    /// Diagnostic message from the server.
    pub description: String,
}

impl OperationResult {
    /// A successful result with no diagnostics.
    pub fn success() -> Self {
        Self {
            rc: RC_SUCCESS,
            matched_dn: String::new(),
            description: String::new(),
        }
    }

    /// A result carrying a failure code.
    pub fn rejected(rc: u32, description: impl Into<String>) -> Self {
        Self {
            rc,
            matched_dn: String::new(),
            description: description.into(),
        }
    }

    /// Only result code 0 counts as success.
    pub fn is_success(&self) -> bool {
        self.rc == RC_SUCCESS
    }

    /// Turn a non-zero result code into [`DirectoryError::OperationRejected`].
    pub fn into_result(
        self,
        operation: DirectoryOperation,
        dn: &DistinguishedName,
    ) -> DirectoryResult<()> {
        if self.is_success() {
            return Ok(());
        }
        if !self.matched_dn.is_empty() {
            debug!(
                operation = %operation,
                rc = self.rc,
                matched_dn = %self.matched_dn,
                "Directory reported the closest existing entry"
            );
        }
        Err(DirectoryError::OperationRejected {
            operation,
            dn: dn.to_string(),
            rc: self.rc,
            description: self.description,
        })
    }
}

/// One change in a modify request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modification {
    Replace { attribute: String, values: Vec<String> },
    Add { attribute: String, values: Vec<String> },
    Delete { attribute: String, values: Vec<String> },
}

impl Modification {
    /// Replace an attribute with a single value.
    pub fn replace(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Modification::Replace {
            attribute: attribute.into(),
            values: vec![value.into()],
        }
    }

    /// Name of the attribute this change touches.
    pub fn attribute(&self) -> &str {
        match self {
            Modification::Replace { attribute, .. }
            | Modification::Add { attribute, .. }
            | Modification::Delete { attribute, .. } => attribute,
        }
    }
}

/// Attribute list for an add request, in insertion order.
pub type AttributeList = Vec<(String, Vec<String>)>;

/// An authenticated directory session.
///
/// Transport failures are `Err`. Mutations that reached the server return
/// `Ok(OperationResult)` whatever the result code; checking it is the
/// caller's job.
#[async_trait]
pub trait DirectorySession: Send {
    /// Run a search.
    async fn search(&mut self, request: &SearchRequest) -> DirectoryResult<Vec<DirectoryEntry>>;

    /// Add an entry.
    async fn add(
        &mut self,
        dn: &DistinguishedName,
        attributes: &[(String, Vec<String>)],
    ) -> DirectoryResult<OperationResult>;

    /// Modify an entry.
    async fn modify(
        &mut self,
        dn: &DistinguishedName,
        changes: &[Modification],
    ) -> DirectoryResult<OperationResult>;

    /// Delete an entry.
    async fn delete(&mut self, dn: &DistinguishedName) -> DirectoryResult<OperationResult>;

    /// Close the session.
    async fn unbind(&mut self) -> DirectoryResult<()>;
}

/// Factory for directory sessions.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Session type produced by [`Directory::bind`].
    type Session: DirectorySession;

    /// Connect and authenticate.
    async fn bind(
        &self,
        endpoint: &DirectoryEndpoint,
        credentials: &DirectoryCredentials,
    ) -> DirectoryResult<Self::Session>;
}
