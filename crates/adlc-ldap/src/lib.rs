//! # LDAP Directory Adapter
//!
//! [`adlc_core::directory::Directory`] implementation over `ldap3`, for
//! Active Directory domain controllers.
//!
//! Each [`LdapDirectory::bind`](adlc_core::directory::Directory::bind) opens a
//! fresh connection, spawns its driver task and performs a simple bind. The
//! returned [`LdapSession`] owns the connection until it is unbound.

pub mod directory;
pub mod session;

pub use directory::LdapDirectory;
pub use session::LdapSession;
