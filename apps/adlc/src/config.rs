//! CLI configuration
//!
//! Settings come from a flat YAML file (`.config.yml` by default) and are
//! overridden by `ADLC_*` environment variables:
//!
//! ```yaml
//! server: dc01.corp.example.com
//! username: CORP\svc-adlc
//! password: change-me
//! search_base: OU=Computers,DC=corp,DC=example,DC=com
//! use_ssl: true
//! suffix_length: 8
//! ```

use std::env::VarError;
use std::path::Path;
use std::str::FromStr;

use adlc_core::config::{DirectoryCredentials, DirectoryEndpoint, LifecycleConfig};
use adlc_core::directory::Directory;
use adlc_core::session::Reconciler;
use serde::Deserialize;
use tracing::debug;

use crate::error::{CliError, CliResult};

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = ".config.yml";

/// Settings as written in the YAML file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub server: Option<String>,
    pub port: Option<u16>,
    pub use_ssl: Option<bool>,
    pub use_starttls: Option<bool>,
    pub skip_tls_verify: Option<bool>,
    pub connect_timeout_secs: Option<u64>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub search_base: Option<String>,
    pub suffix_length: Option<usize>,
    pub instance_id_attribute: Option<String>,
    pub audit_attribute: Option<String>,
    pub audit_prefix: Option<String>,
    /// Default name for `adlc find`.
    pub computer_name: Option<String>,
}

impl FileConfig {
    /// Parse YAML content.
    pub fn parse(content: &str) -> CliResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| CliError::Config(format!("invalid YAML: {e}")))
    }

    /// Read a configuration file. A missing file yields empty settings.
    pub fn read(path: &Path) -> CliResult<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No configuration file, using environment only");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(CliError::Config(format!(
                    "failed to read {}: {e}",
                    path.display()
                )))
            }
        };

        Self::parse(&content).map_err(|e| match e {
            CliError::Config(message) => CliError::Config(format!("{}: {message}", path.display())),
            other => other,
        })
    }

    /// Apply `ADLC_*` overrides from a variable reader.
    pub fn apply_env<F>(mut self, reader: F) -> CliResult<Self>
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        override_string(&reader, "ADLC_SERVER", &mut self.server);
        override_parsed(&reader, "ADLC_PORT", &mut self.port)?;
        override_parsed(&reader, "ADLC_USE_SSL", &mut self.use_ssl)?;
        override_parsed(&reader, "ADLC_USE_STARTTLS", &mut self.use_starttls)?;
        override_parsed(&reader, "ADLC_SKIP_TLS_VERIFY", &mut self.skip_tls_verify)?;
        override_parsed(&reader, "ADLC_CONNECT_TIMEOUT_SECS", &mut self.connect_timeout_secs)?;
        override_string(&reader, "ADLC_USERNAME", &mut self.username);
        override_string(&reader, "ADLC_PASSWORD", &mut self.password);
        override_string(&reader, "ADLC_SEARCH_BASE", &mut self.search_base);
        override_parsed(&reader, "ADLC_SUFFIX_LENGTH", &mut self.suffix_length)?;
        override_string(&reader, "ADLC_INSTANCE_ID_ATTRIBUTE", &mut self.instance_id_attribute);
        override_string(&reader, "ADLC_AUDIT_ATTRIBUTE", &mut self.audit_attribute);
        override_string(&reader, "ADLC_AUDIT_PREFIX", &mut self.audit_prefix);
        Ok(self)
    }
}

fn override_string<F>(reader: &F, key: &str, slot: &mut Option<String>)
where
    F: Fn(&str) -> Result<String, VarError>,
{
    if let Ok(value) = reader(key) {
        *slot = Some(value);
    }
}

fn override_parsed<F, T>(reader: &F, key: &str, slot: &mut Option<T>) -> CliResult<()>
where
    F: Fn(&str) -> Result<String, VarError>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    if let Ok(value) = reader(key) {
        let parsed = value
            .trim()
            .parse::<T>()
            .map_err(|e| CliError::Config(format!("invalid value for {key}: {e}")))?;
        *slot = Some(parsed);
    }
    Ok(())
}

/// Resolved settings for one CLI run.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub endpoint: DirectoryEndpoint,
    pub credentials: DirectoryCredentials,
    pub lifecycle: LifecycleConfig,
    pub computer_name: Option<String>,
}

impl AppConfig {
    /// Load from a file plus the process environment.
    pub fn load(path: &Path) -> CliResult<Self> {
        Self::load_with(path, |key| std::env::var(key))
    }

    /// Load from a file plus a custom variable reader.
    pub fn load_with<F>(path: &Path, reader: F) -> CliResult<Self>
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        Self::from_file_config(FileConfig::read(path)?.apply_env(reader)?)
    }

    /// Resolve required settings and defaults.
    pub fn from_file_config(file: FileConfig) -> CliResult<Self> {
        let server = required(file.server, "server", "ADLC_SERVER")?;
        let username = required(file.username, "username", "ADLC_USERNAME")?;
        let password = required(file.password, "password", "ADLC_PASSWORD")?;
        let search_base = required(file.search_base, "search_base", "ADLC_SEARCH_BASE")?;

        let mut endpoint = DirectoryEndpoint::new(server);
        if file.use_ssl.unwrap_or(false) {
            endpoint = endpoint.with_ssl();
        }
        if file.use_starttls.unwrap_or(false) {
            endpoint = endpoint.with_starttls();
        }
        if let Some(port) = file.port {
            endpoint = endpoint.with_port(port);
        }
        endpoint.skip_tls_verify = file.skip_tls_verify.unwrap_or(false);
        if let Some(timeout) = file.connect_timeout_secs {
            endpoint.connect_timeout_secs = timeout;
        }

        let mut lifecycle = LifecycleConfig::new(search_base);
        if let Some(length) = file.suffix_length {
            lifecycle = lifecycle
                .with_suffix_length(length)
                .map_err(|e| CliError::Config(e.to_string()))?;
        }
        if let Some(attribute) = file.instance_id_attribute {
            lifecycle = lifecycle.with_instance_id_attribute(attribute);
        }
        if let Some(attribute) = file.audit_attribute {
            lifecycle = lifecycle.with_audit_attribute(attribute);
        }
        if let Some(prefix) = file.audit_prefix {
            lifecycle = lifecycle.with_audit_prefix(prefix);
        }

        Ok(Self {
            endpoint,
            credentials: DirectoryCredentials::new(username, password),
            lifecycle,
            computer_name: file.computer_name,
        })
    }

    /// Build a reconciler over the given directory.
    pub fn reconciler<D: Directory>(&self, directory: D) -> CliResult<Reconciler<D>> {
        Ok(Reconciler::new(
            directory,
            self.endpoint.clone(),
            self.credentials.clone(),
            self.lifecycle.clone(),
        )?)
    }
}

fn required(value: Option<String>, key: &str, env: &str) -> CliResult<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| CliError::Config(format!("missing required setting '{key}' (or {env})")))
}
