//! Object resolution
//!
//! Maps an instance id to at most one computer object. A computer matches
//! when its CN ends with the naming suffix, or when the instance id
//! attribute holds the raw id (objects renamed after creation keep the id
//! there).
//!
//! The search asks for two entries, not one. A single entry is only trusted
//! because the directory had the chance to return a second one and did not.

use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::account_control::{self, AccountControl};
use crate::config::LifecycleConfig;
use crate::directory::{DirectoryEntry, DirectorySession, SearchRequest, SearchScope};
use crate::dn::{validate_computer_name, DistinguishedName};
use crate::error::{LifecycleError, LifecycleResult};
use crate::identifier::{derive_suffix, InstanceId, SuffixLength};

/// Size limit used to detect ambiguity.
pub const RESOLVE_SIZE_LIMIT: i32 = 2;

/// Object class of managed objects.
pub const COMPUTER_OBJECT_CLASS: &str = "computer";

/// Result of matching an identifier against the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ResolutionOutcome {
    /// No computer matched.
    NotFound,
    /// Exactly one computer matched and its DN is well formed.
    Unique { dn: DistinguishedName },
    /// More than one computer matched. Never resolved automatically.
    Ambiguous { count: usize, dns: Vec<String> },
}

impl ResolutionOutcome {
    /// The resolved DN, if unique.
    pub fn unique_dn(&self) -> Option<&DistinguishedName> {
        match self {
            ResolutionOutcome::Unique { dn } => Some(dn),
            _ => None,
        }
    }
}

/// Builds resolution searches and classifies their results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectResolver {
    suffix_length: SuffixLength,
    instance_id_attribute: String,
}

impl ObjectResolver {
    pub fn new(suffix_length: SuffixLength, instance_id_attribute: impl Into<String>) -> Self {
        Self {
            suffix_length,
            instance_id_attribute: instance_id_attribute.into(),
        }
    }

    pub fn from_config(config: &LifecycleConfig) -> Self {
        Self::new(config.suffix_length, config.instance_id_attribute.clone())
    }

    /// `(&(objectClass=computer)(|(cn=*<suffix>)(<attr>=<id>)))`
    pub fn instance_filter(&self, id: &InstanceId) -> String {
        let suffix = derive_suffix(id, self.suffix_length);
        format!(
            "(&(objectClass={})(|(cn=*{})({}={})))",
            COMPUTER_OBJECT_CLASS,
            escape_filter_value(suffix.as_str()),
            self.instance_id_attribute,
            escape_filter_value(id.as_str()),
        )
    }

    /// `(&(objectClass=computer)(cn=<name>))`
    pub fn name_filter(&self, name: &str) -> String {
        format!(
            "(&(objectClass={})(cn={}))",
            COMPUTER_OBJECT_CLASS,
            escape_filter_value(name)
        )
    }

    /// The search issued by [`ObjectResolver::resolve`].
    pub fn search_request(&self, search_base: &str, id: &InstanceId) -> SearchRequest {
        self.request(search_base, self.instance_filter(id))
    }

    fn request(&self, search_base: &str, filter: String) -> SearchRequest {
        SearchRequest {
            base: search_base.to_string(),
            scope: SearchScope::Subtree,
            filter,
            attributes: vec![
                "cn".to_string(),
                "distinguishedName".to_string(),
                account_control::ATTRIBUTE.to_string(),
                self.instance_id_attribute.clone(),
            ],
            size_limit: RESOLVE_SIZE_LIMIT,
        }
    }

    /// Resolve an instance id to at most one computer.
    ///
    /// # Errors
    /// - [`LifecycleError::Directory`] when the search itself fails
    /// - [`LifecycleError::CorruptDirectoryData`] when the single match has a
    ///   malformed DN
    #[instrument(skip(self, session), fields(instance_id = %id))]
    pub async fn resolve<S>(
        &self,
        session: &mut S,
        search_base: &str,
        id: &InstanceId,
    ) -> LifecycleResult<ResolutionOutcome>
    where
        S: DirectorySession + ?Sized,
    {
        let request = self.search_request(search_base, id);
        debug!(filter = %request.filter, base = %request.base, "Resolving computer object");

        let entries = session.search(&request).await?;
        classify(entries)
    }

    /// Resolve an exact computer name (CN) to at most one computer.
    #[instrument(skip(self, session))]
    pub async fn resolve_by_name<S>(
        &self,
        session: &mut S,
        search_base: &str,
        name: &str,
    ) -> LifecycleResult<ResolutionOutcome>
    where
        S: DirectorySession + ?Sized,
    {
        validate_computer_name(name)?;

        let request = self.request(search_base, self.name_filter(name));
        debug!(filter = %request.filter, base = %request.base, "Resolving computer by name");

        let entries = session.search(&request).await?;
        classify(entries)
    }
}

// Unreadable values only cost the log field; resolution never depends on them.
fn account_state(entry: &DirectoryEntry) -> Option<AccountControl> {
    entry
        .first(account_control::ATTRIBUTE)
        .and_then(|value| AccountControl::decode(value).ok())
}

/// Apply the count table: 0 → NotFound, 1 → Unique, 2+ → Ambiguous.
pub fn classify(entries: Vec<DirectoryEntry>) -> LifecycleResult<ResolutionOutcome> {
    match entries.len() {
        0 => Ok(ResolutionOutcome::NotFound),
        1 => {
            let entry = entries.into_iter().next().unwrap_or_default();
            match DistinguishedName::parse(&entry.dn) {
                Ok(dn) => {
                    if let Some(state) = account_state(&entry) {
                        debug!(
                            dn = %dn,
                            state = %state,
                            disabled = state.is_disabled(),
                            "Resolved computer object"
                        );
                    }
                    Ok(ResolutionOutcome::Unique { dn })
                }
                Err(_) => {
                    warn!(dn = %entry.dn, "Directory returned a malformed computer DN");
                    Err(LifecycleError::CorruptDirectoryData { dn: entry.dn })
                }
            }
        }
        count => {
            let dns: Vec<String> = entries.into_iter().map(|entry| entry.dn).collect();
            warn!(count, dns = ?dns, "Ambiguous computer resolution");
            Ok(ResolutionOutcome::Ambiguous { count, dns })
        }
    }
}

/// Escape special characters in LDAP filter values (RFC 4515).
pub fn escape_filter_value(value: &str) -> String {
    value
        .replace('\\', "\\5c")
        .replace('*', "\\2a")
        .replace('(', "\\28")
        .replace(')', "\\29")
        .replace('\0', "\\00")
}
