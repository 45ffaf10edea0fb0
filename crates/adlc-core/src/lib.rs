//! # Computer Object Lifecycle Engine
//!
//! Keeps Active Directory computer objects in step with the cloud instances
//! they belong to.
//!
//! Computers are named after the trailing characters of their instance id
//! (`i-0123456789abcdef0` becomes `...-9abcdef0`). When an instance
//! terminates, its computer object is found again from the id alone and
//! deleted, but only when exactly one object matches.
//!
//! ## Architecture
//!
//! - [`identifier`] and [`dn`] - validated newtypes; every directory call
//!   takes one of these, never a raw string
//! - [`resolver`] - search construction and the 0/1/2+ match classification
//! - [`controller`] - create, disable, enable, delete and termination
//!   reconciliation on a bound session
//! - [`session`] - [`session::Reconciler`], one bind/unbind per use case
//! - [`directory`] - the collaborator traits a wire adapter implements
//!
//! ## Example
//!
//! ```ignore
//! use adlc_core::prelude::*;
//!
//! let reconciler = Reconciler::new(
//!     directory,
//!     DirectoryEndpoint::new("dc01.corp.example.com").with_ssl(),
//!     DirectoryCredentials::new("CORP\\svc-adlc", password),
//!     LifecycleConfig::new("OU=Computers,DC=corp,DC=example,DC=com"),
//! )?;
//!
//! match reconciler.reconcile_termination("i-0123456789abcdef0").await? {
//!     TerminationOutcome::Deleted { dn } => println!("deleted {dn}"),
//!     TerminationOutcome::NotFound => {}
//!     TerminationOutcome::Ambiguous { dns, .. } => escalate(dns),
//! }
//! ```

pub mod account_control;
pub mod config;
pub mod controller;
pub mod directory;
pub mod dn;
pub mod error;
pub mod identifier;
pub mod resolver;
pub mod session;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::account_control::AccountControl;
    pub use crate::config::{DirectoryCredentials, DirectoryEndpoint, LifecycleConfig};
    pub use crate::controller::{
        Created, Deleted, Disabled, Enabled, LifecycleController, TerminationOutcome,
    };
    pub use crate::directory::{
        Directory, DirectoryEntry, DirectoryOperation, DirectorySession, Modification,
        OperationResult, SearchRequest, SearchScope,
    };
    pub use crate::dn::{validate_dn, DistinguishedName};
    pub use crate::error::{
        DirectoryError, DirectoryResult, FormatError, LifecycleError, LifecycleResult,
    };
    pub use crate::identifier::{derive_suffix, InstanceId, NamingSuffix, SuffixLength};
    pub use crate::resolver::{ObjectResolver, ResolutionOutcome};
    pub use crate::session::Reconciler;
}

// Re-export async_trait for directory adapters
pub use async_trait::async_trait;
