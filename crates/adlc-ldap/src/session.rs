//! Bound LDAP session.
//!
//! Searches accept `sizeLimitExceeded` (rc 4) as a partial success: the
//! resolver asks for two entries on purpose and must see what came back.
//! Mutations hand their result code back untouched.

use std::collections::{HashMap, HashSet};

use adlc_core::async_trait;
use adlc_core::directory::{
    DirectoryEntry, DirectoryOperation, DirectorySession, Modification, OperationResult,
    SearchRequest, SearchScope, RC_SIZE_LIMIT_EXCEEDED, RC_SUCCESS,
};
use adlc_core::dn::DistinguishedName;
use adlc_core::error::{DirectoryError, DirectoryResult};
use ldap3::{Ldap, LdapResult, Mod, Scope, SearchEntry, SearchOptions};
use tracing::{debug, instrument};

/// An authenticated connection to a directory server.
pub struct LdapSession {
    ldap: Ldap,
}

impl LdapSession {
    pub(crate) fn new(ldap: Ldap) -> Self {
        Self { ldap }
    }
}

impl std::fmt::Debug for LdapSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LdapSession").finish_non_exhaustive()
    }
}

#[async_trait]
impl DirectorySession for LdapSession {
    #[instrument(skip(self, request), fields(base = %request.base, filter = %request.filter))]
    async fn search(&mut self, request: &SearchRequest) -> DirectoryResult<Vec<DirectoryEntry>> {
        let attrs: Vec<&str> = request.attributes.iter().map(String::as_str).collect();

        let ldap3::SearchResult(entries, result) = self
            .ldap
            .with_search_options(SearchOptions::new().sizelimit(request.size_limit))
            .search(&request.base, scope(request.scope), &request.filter, attrs)
            .await
            .map_err(|e| {
                DirectoryError::transport_with_source(
                    DirectoryOperation::Search,
                    "LDAP search failed",
                    e,
                )
            })?;

        check_search(&result)?;

        let entries: Vec<DirectoryEntry> = entries
            .into_iter()
            .filter(|entry| !entry.is_ref())
            .map(SearchEntry::construct)
            .map(to_directory_entry)
            .collect();

        debug!(
            found = entries.len(),
            truncated = result.rc == RC_SIZE_LIMIT_EXCEEDED,
            "LDAP search completed"
        );
        Ok(entries)
    }

    #[instrument(skip(self, attributes), fields(dn = %dn))]
    async fn add(
        &mut self,
        dn: &DistinguishedName,
        attributes: &[(String, Vec<String>)],
    ) -> DirectoryResult<OperationResult> {
        let attrs: Vec<(&str, HashSet<&str>)> = attributes
            .iter()
            .map(|(name, values)| {
                (
                    name.as_str(),
                    values.iter().map(String::as_str).collect(),
                )
            })
            .collect();

        let result = self.ldap.add(dn.as_str(), attrs).await.map_err(|e| {
            DirectoryError::transport_with_source(
                DirectoryOperation::Add,
                format!("failed to add entry: {dn}"),
                e,
            )
        })?;
        Ok(operation_result(result))
    }

    #[instrument(skip(self, changes), fields(dn = %dn))]
    async fn modify(
        &mut self,
        dn: &DistinguishedName,
        changes: &[Modification],
    ) -> DirectoryResult<OperationResult> {
        let attributes: Vec<&str> = changes.iter().map(Modification::attribute).collect();
        debug!(attributes = ?attributes, "Modifying LDAP entry");
        let mods: Vec<Mod<String>> = changes.iter().map(to_mod).collect();

        let result = self.ldap.modify(dn.as_str(), mods).await.map_err(|e| {
            DirectoryError::transport_with_source(
                DirectoryOperation::Modify,
                format!("failed to modify entry: {dn}"),
                e,
            )
        })?;
        Ok(operation_result(result))
    }

    #[instrument(skip(self), fields(dn = %dn))]
    async fn delete(&mut self, dn: &DistinguishedName) -> DirectoryResult<OperationResult> {
        let result = self.ldap.delete(dn.as_str()).await.map_err(|e| {
            DirectoryError::transport_with_source(
                DirectoryOperation::Delete,
                format!("failed to delete entry: {dn}"),
                e,
            )
        })?;
        Ok(operation_result(result))
    }

    async fn unbind(&mut self) -> DirectoryResult<()> {
        self.ldap.unbind().await.map_err(|e| {
            DirectoryError::transport_with_source(
                DirectoryOperation::Unbind,
                "LDAP unbind failed",
                e,
            )
        })
    }
}

fn scope(scope: SearchScope) -> Scope {
    match scope {
        SearchScope::Base => Scope::Base,
        SearchScope::OneLevel => Scope::OneLevel,
        SearchScope::Subtree => Scope::Subtree,
    }
}

/// Success and sizeLimitExceeded both carry usable entries.
fn check_search(result: &LdapResult) -> DirectoryResult<()> {
    match result.rc {
        RC_SUCCESS | RC_SIZE_LIMIT_EXCEEDED => Ok(()),
        rc => Err(DirectoryError::transport(
            DirectoryOperation::Search,
            format!("LDAP search failed with code {rc}: {}", result.text),
        )),
    }
}

fn operation_result(result: LdapResult) -> OperationResult {
    OperationResult {
        rc: result.rc,
        matched_dn: result.matched,
        description: result.text,
    }
}

fn to_directory_entry(entry: SearchEntry) -> DirectoryEntry {
    DirectoryEntry {
        dn: entry.dn,
        attributes: entry.attrs.into_iter().collect::<HashMap<_, _>>(),
    }
}

fn to_mod(change: &Modification) -> Mod<String> {
    let set = |values: &[String]| values.iter().cloned().collect::<HashSet<String>>();
    match change {
        Modification::Replace { attribute, values } => Mod::Replace(attribute.clone(), set(values)),
        Modification::Add { attribute, values } => Mod::Add(attribute.clone(), set(values)),
        Modification::Delete { attribute, values } => Mod::Delete(attribute.clone(), set(values)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ldap_result(rc: u32, text: &str) -> LdapResult {
        LdapResult {
            rc,
            matched: String::new(),
            text: text.to_string(),
            refs: vec![],
            ctrls: vec![],
        }
    }

    #[test]
    fn test_scope_mapping() {
        assert!(matches!(scope(SearchScope::Base), Scope::Base));
        assert!(matches!(scope(SearchScope::OneLevel), Scope::OneLevel));
        assert!(matches!(scope(SearchScope::Subtree), Scope::Subtree));
    }

    #[test]
    fn test_check_search_accepts_size_limit_exceeded() {
        assert!(check_search(&ldap_result(0, "")).is_ok());
        assert!(check_search(&ldap_result(4, "Size limit exceeded")).is_ok());
    }

    #[test]
    fn test_check_search_rejects_other_codes() {
        let err = check_search(&ldap_result(32, "0000208D: NameErr")).unwrap_err();
        assert_eq!(err.error_code(), "TRANSPORT_ERROR");
        assert!(err.to_string().contains("code 32"));
    }

    #[test]
    fn test_operation_result_keeps_code_and_text() {
        let result = operation_result(LdapResult {
            rc: 50,
            matched: "OU=Computers,DC=corp,DC=example,DC=com".to_string(),
            text: "00002098: SecErr".to_string(),
            refs: vec![],
            ctrls: vec![],
        });
        assert_eq!(result.rc, 50);
        assert_eq!(result.matched_dn, "OU=Computers,DC=corp,DC=example,DC=com");
        assert_eq!(result.description, "00002098: SecErr");
        assert!(!result.is_success());
    }

    #[test]
    fn test_to_directory_entry() {
        let mut attrs = HashMap::new();
        attrs.insert("cn".to_string(), vec!["web-9abcdef0".to_string()]);
        attrs.insert("userAccountControl".to_string(), vec!["4098".to_string()]);
        let entry = to_directory_entry(SearchEntry {
            dn: "CN=web-9abcdef0,OU=Computers,DC=corp,DC=example,DC=com".to_string(),
            attrs,
            bin_attrs: HashMap::new(),
        });

        assert_eq!(entry.dn, "CN=web-9abcdef0,OU=Computers,DC=corp,DC=example,DC=com");
        assert_eq!(entry.first("useraccountcontrol"), Some("4098"));
    }

    #[test]
    fn test_to_mod_replace() {
        let change = Modification::replace("userAccountControl", "4098");
        match to_mod(&change) {
            Mod::Replace(name, values) => {
                assert_eq!(name, "userAccountControl");
                assert!(values.contains("4098"));
            }
            _ => panic!("expected replace"),
        }
    }
}
