//! Engine configuration
//!
//! Plain values passed into each entry point. Nothing here reads files or
//! the environment; that is the caller's job.

use serde::{Deserialize, Serialize};

use crate::error::{FormatError, LifecycleError, LifecycleResult};
use crate::identifier::SuffixLength;

/// Where the directory lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEndpoint {
    /// Directory server hostname or IP address.
    pub host: String,

    /// Server port (389 for LDAP, 636 for LDAPS).
    #[serde(default = "default_ldap_port")]
    pub port: u16,

    /// Use SSL/TLS (LDAPS).
    #[serde(default)]
    pub use_ssl: bool,

    /// Use STARTTLS upgrade on plain LDAP connection.
    #[serde(default)]
    pub use_starttls: bool,

    /// Skip certificate verification (lab directories only).
    #[serde(default)]
    pub skip_tls_verify: bool,

    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_ldap_port() -> u16 {
    389
}

fn default_connect_timeout() -> u64 {
    30
}

impl DirectoryEndpoint {
    /// Plain LDAP endpoint on the default port.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: default_ldap_port(),
            use_ssl: false,
            use_starttls: false,
            skip_tls_verify: false,
            connect_timeout_secs: default_connect_timeout(),
        }
    }

    /// Enable SSL (LDAPS) on port 636.
    #[must_use]
    pub fn with_ssl(mut self) -> Self {
        self.use_ssl = true;
        self.port = 636;
        self
    }

    /// Enable STARTTLS.
    #[must_use]
    pub fn with_starttls(mut self) -> Self {
        self.use_starttls = true;
        self
    }

    /// Override the port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Connection URL, `ldap://` or `ldaps://`.
    pub fn url(&self) -> String {
        if self.use_ssl {
            format!("ldaps://{}:{}", self.host, self.port)
        } else {
            format!("ldap://{}:{}", self.host, self.port)
        }
    }

    /// Validate the endpoint.
    pub fn validate(&self) -> LifecycleResult<()> {
        if self.host.trim().is_empty() {
            return Err(invalid_config("directory host is required"));
        }
        if self.port == 0 {
            return Err(invalid_config("directory port must be greater than 0"));
        }
        if self.use_ssl && self.use_starttls {
            return Err(invalid_config(
                "use_ssl and use_starttls are mutually exclusive",
            ));
        }
        Ok(())
    }
}

/// Bind credentials.
///
/// Active Directory accepts a bind DN, a UPN (`svc@corp.example.com`) or a
/// down-level name (`CORP\svc`) as the username of a simple bind.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryCredentials {
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
}

impl DirectoryCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for DirectoryCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryCredentials")
            .field("username", &self.username)
            .field("password", &"***REDACTED***")
            .finish()
    }
}

/// Naming and audit parameters of the lifecycle engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleConfig {
    /// Base DN under which computer objects are searched.
    pub search_base: String,

    /// Trailing identifier characters used in computer names.
    #[serde(default)]
    pub suffix_length: SuffixLength,

    /// Attribute holding the raw instance id on renamed objects.
    #[serde(default = "default_instance_id_attribute")]
    pub instance_id_attribute: String,

    /// Attribute receiving the audit note on disable/enable.
    #[serde(default = "default_audit_attribute")]
    pub audit_attribute: String,

    /// Prefix of audit notes.
    #[serde(default = "default_audit_prefix")]
    pub audit_prefix: String,
}

fn default_instance_id_attribute() -> String {
    "description".to_string()
}

fn default_audit_attribute() -> String {
    "info".to_string()
}

fn default_audit_prefix() -> String {
    "adlc".to_string()
}

impl LifecycleConfig {
    /// Config with defaults for everything but the search base.
    pub fn new(search_base: impl Into<String>) -> Self {
        Self {
            search_base: search_base.into(),
            suffix_length: SuffixLength::default(),
            instance_id_attribute: default_instance_id_attribute(),
            audit_attribute: default_audit_attribute(),
            audit_prefix: default_audit_prefix(),
        }
    }

    /// Set the suffix length.
    pub fn with_suffix_length(mut self, length: usize) -> Result<Self, FormatError> {
        self.suffix_length = SuffixLength::new(length)?;
        Ok(self)
    }

    /// Set the instance id attribute.
    #[must_use]
    pub fn with_instance_id_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.instance_id_attribute = attribute.into();
        self
    }

    /// Set the audit attribute.
    #[must_use]
    pub fn with_audit_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.audit_attribute = attribute.into();
        self
    }

    /// Set the audit note prefix.
    #[must_use]
    pub fn with_audit_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.audit_prefix = prefix.into();
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> LifecycleResult<()> {
        if self.search_base.trim().is_empty() {
            return Err(invalid_config("search_base is required"));
        }
        for (field, value) in [
            ("instance_id_attribute", &self.instance_id_attribute),
            ("audit_attribute", &self.audit_attribute),
        ] {
            if !is_attribute_name(value) {
                return Err(invalid_config(format!(
                    "{field} must be an attribute name, got '{value}'"
                )));
            }
        }
        if self
            .instance_id_attribute
            .eq_ignore_ascii_case(&self.audit_attribute)
        {
            // Audit notes would overwrite the id used for matching.
            return Err(invalid_config(format!(
                "audit_attribute must differ from instance_id_attribute ('{}')",
                self.instance_id_attribute
            )));
        }
        Ok(())
    }
}

/// RFC 4512 `descr`: a letter followed by letters, digits or hyphens.
fn is_attribute_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn invalid_config(message: impl Into<String>) -> LifecycleError {
    LifecycleError::InvalidConfiguration {
        message: message.into(),
    }
}
