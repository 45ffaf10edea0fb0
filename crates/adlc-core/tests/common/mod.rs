//! Common test utilities for lifecycle engine tests.
//!
//! [`FakeDirectory`] is an in-memory directory that evaluates the two filter
//! shapes the resolver emits, records every call, and can be told to fail
//! or reject individual operations.

#![allow(dead_code)]

use std::sync::{Arc, LazyLock, Mutex, Once};

use adlc_core::async_trait;
use adlc_core::directory::{
    AttributeList, Directory, DirectoryEntry, DirectoryOperation, DirectorySession, Modification,
    OperationResult, SearchRequest, RC_ALREADY_EXISTS, RC_NO_SUCH_OBJECT,
};
use adlc_core::prelude::*;
use regex::Regex;

static INIT: Once = Once::new();

/// Initialize logging for tests (once).
pub fn init_test_logging() {
    INIT.call_once(|| {
        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::fmt()
                .with_test_writer()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .try_init()
                .ok();
        }
    });
}

pub const SEARCH_BASE: &str = "OU=Computers,DC=corp,DC=example,DC=com";
pub const INSTANCE_ID: &str = "i-0123456789abcdef0";

/// A call seen by the fake directory.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Bind { username: String },
    Search(SearchRequest),
    Add { dn: String, attributes: AttributeList },
    Modify { dn: String, changes: Vec<Modification> },
    Delete { dn: String },
    Unbind,
}

impl Call {
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Call::Add { .. } | Call::Modify { .. } | Call::Delete { .. }
        )
    }
}

#[derive(Default)]
struct State {
    entries: Vec<DirectoryEntry>,
    calls: Vec<Call>,
    bind_error: Option<fn() -> DirectoryError>,
    search_error: Option<String>,
    unbind_error: bool,
    add_result: Option<OperationResult>,
    modify_result: Option<OperationResult>,
    delete_result: Option<OperationResult>,
}

/// In-memory directory shared between the test and its sessions.
#[derive(Clone, Default)]
pub struct FakeDirectory {
    state: Arc<Mutex<State>>,
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory pre-populated with entries.
    pub fn with_entries(entries: impl IntoIterator<Item = DirectoryEntry>) -> Self {
        let directory = Self::new();
        directory.state().entries.extend(entries);
        directory
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn fail_bind_with(&self, error: fn() -> DirectoryError) {
        self.state().bind_error = Some(error);
    }

    pub fn fail_search(&self, message: &str) {
        self.state().search_error = Some(message.to_string());
    }

    pub fn fail_unbind(&self) {
        self.state().unbind_error = true;
    }

    pub fn reject_add(&self, rc: u32, description: &str) {
        self.state().add_result = Some(OperationResult::rejected(rc, description));
    }

    pub fn reject_modify(&self, rc: u32, description: &str) {
        self.state().modify_result = Some(OperationResult::rejected(rc, description));
    }

    pub fn reject_delete(&self, rc: u32, description: &str) {
        self.state().delete_result = Some(OperationResult::rejected(rc, description));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.state().calls.iter().filter(|&call| predicate(call)).count()
    }

    pub fn binds(&self) -> usize {
        self.count(|call| matches!(call, Call::Bind { .. }))
    }

    pub fn unbinds(&self) -> usize {
        self.count(|call| matches!(call, Call::Unbind))
    }

    pub fn entries(&self) -> Vec<DirectoryEntry> {
        self.state().entries.clone()
    }

    pub fn entry(&self, dn: &str) -> Option<DirectoryEntry> {
        self.state()
            .entries
            .iter()
            .find(|entry| entry.dn.eq_ignore_ascii_case(dn))
            .cloned()
    }
}

#[async_trait]
impl Directory for FakeDirectory {
    type Session = FakeSession;

    async fn bind(
        &self,
        _endpoint: &DirectoryEndpoint,
        credentials: &DirectoryCredentials,
    ) -> DirectoryResult<FakeSession> {
        let mut state = self.state();
        state.calls.push(Call::Bind {
            username: credentials.username.clone(),
        });
        if let Some(error) = state.bind_error {
            return Err(error());
        }
        Ok(FakeSession {
            directory: self.clone(),
        })
    }
}

/// Session handed out by [`FakeDirectory`].
pub struct FakeSession {
    directory: FakeDirectory,
}

#[async_trait]
impl DirectorySession for FakeSession {
    async fn search(&mut self, request: &SearchRequest) -> DirectoryResult<Vec<DirectoryEntry>> {
        let mut state = self.directory.state();
        state.calls.push(Call::Search(request.clone()));
        if let Some(message) = &state.search_error {
            return Err(DirectoryError::transport(
                DirectoryOperation::Search,
                message.clone(),
            ));
        }

        let mut found: Vec<DirectoryEntry> = state
            .entries
            .iter()
            .filter(|entry| matches_filter(entry, &request.filter))
            .cloned()
            .collect();
        if request.size_limit > 0 {
            found.truncate(request.size_limit as usize);
        }
        Ok(found)
    }

    async fn add(
        &mut self,
        dn: &DistinguishedName,
        attributes: &[(String, Vec<String>)],
    ) -> DirectoryResult<OperationResult> {
        let mut state = self.directory.state();
        state.calls.push(Call::Add {
            dn: dn.to_string(),
            attributes: attributes.to_vec(),
        });
        if let Some(result) = state.add_result.clone() {
            return Ok(result);
        }
        if state
            .entries
            .iter()
            .any(|entry| entry.dn.eq_ignore_ascii_case(dn.as_str()))
        {
            return Ok(OperationResult::rejected(
                RC_ALREADY_EXISTS,
                "00000524: UpdErr: DSID-031A11E2, problem 6005 (ENTRY_EXISTS)",
            ));
        }

        let mut entry = DirectoryEntry::new(dn.as_str()).with_attribute("cn", dn.common_name());
        for (name, values) in attributes {
            entry.attributes.insert(name.clone(), values.clone());
        }
        state.entries.push(entry);
        Ok(OperationResult::success())
    }

    async fn modify(
        &mut self,
        dn: &DistinguishedName,
        changes: &[Modification],
    ) -> DirectoryResult<OperationResult> {
        let mut state = self.directory.state();
        state.calls.push(Call::Modify {
            dn: dn.to_string(),
            changes: changes.to_vec(),
        });
        if let Some(result) = state.modify_result.clone() {
            return Ok(result);
        }
        let Some(entry) = state
            .entries
            .iter_mut()
            .find(|entry| entry.dn.eq_ignore_ascii_case(dn.as_str()))
        else {
            return Ok(no_such_object());
        };

        for change in changes {
            if let Modification::Replace { attribute, values } = change {
                entry.attributes.insert(attribute.clone(), values.clone());
            }
        }
        Ok(OperationResult::success())
    }

    async fn delete(&mut self, dn: &DistinguishedName) -> DirectoryResult<OperationResult> {
        let mut state = self.directory.state();
        state.calls.push(Call::Delete { dn: dn.to_string() });
        if let Some(result) = state.delete_result.clone() {
            return Ok(result);
        }
        let before = state.entries.len();
        state
            .entries
            .retain(|entry| !entry.dn.eq_ignore_ascii_case(dn.as_str()));
        if state.entries.len() == before {
            return Ok(no_such_object());
        }
        Ok(OperationResult::success())
    }

    async fn unbind(&mut self) -> DirectoryResult<()> {
        let mut state = self.directory.state();
        state.calls.push(Call::Unbind);
        if state.unbind_error {
            return Err(DirectoryError::transport(
                DirectoryOperation::Unbind,
                "connection reset by peer",
            ));
        }
        Ok(())
    }
}

fn no_such_object() -> OperationResult {
    OperationResult::rejected(
        RC_NO_SUCH_OBJECT,
        "0000208D: NameErr: DSID-03100213, problem 2001 (NO_OBJECT)",
    )
}

static CLAUSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([A-Za-z][A-Za-z0-9-]*)=([^()]*)\)").unwrap());

/// Evaluate `(&(objectClass=computer)(|(a=b)(c=*d)))` and
/// `(&(objectClass=computer)(cn=x))`: the entry must match any non-objectClass
/// clause. A leading `*` is a suffix match; comparisons ignore case.
fn matches_filter(entry: &DirectoryEntry, filter: &str) -> bool {
    CLAUSE_RE
        .captures_iter(filter)
        .filter(|caps| !caps[1].eq_ignore_ascii_case("objectClass"))
        .any(|caps| {
            let (attribute, wanted) = (&caps[1], &caps[2]);
            let Some(actual) = entry.first(attribute) else {
                return false;
            };
            let actual = actual.to_ascii_lowercase();
            match wanted.strip_prefix('*') {
                Some(suffix) => actual.ends_with(&suffix.to_ascii_lowercase()),
                None => actual == wanted.to_ascii_lowercase(),
            }
        })
}

/// A computer entry with its `cn` taken from the DN.
pub fn computer(dn: &str) -> DirectoryEntry {
    let cn = dn
        .split(',')
        .next()
        .and_then(|rdn| rdn.split_once('='))
        .map(|(_, value)| value)
        .unwrap_or_default()
        .to_string();
    DirectoryEntry::new(dn).with_attribute("cn", cn)
}

/// A computer entry carrying the instance id in `description`.
pub fn renamed_computer(dn: &str, instance_id: &str) -> DirectoryEntry {
    computer(dn).with_attribute("description", instance_id)
}

pub fn endpoint() -> DirectoryEndpoint {
    DirectoryEndpoint::new("dc01.corp.example.com")
}

pub fn credentials() -> DirectoryCredentials {
    DirectoryCredentials::new("CORP\\svc-adlc", "s3cret")
}

pub fn config() -> LifecycleConfig {
    LifecycleConfig::new(SEARCH_BASE)
}

pub fn reconciler(directory: &FakeDirectory) -> Reconciler<FakeDirectory> {
    Reconciler::new(directory.clone(), endpoint(), credentials(), config()).unwrap()
}
