//! adlc - reconcile Active Directory computer objects with instance lifecycles
//!
//! The binary in `main.rs` wires these modules to a real LDAP directory;
//! everything here is generic over [`adlc_core::directory::Directory`].

pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
