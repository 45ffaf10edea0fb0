//! Common test utilities for CLI tests.
//!
//! [`StubDirectory`] answers every search with its stored entries (capped at
//! the size limit) and records mutations. Matching logic is covered by the
//! core crate's tests; here only the command wiring matters.

#![allow(dead_code)]

use std::io::Write;
use std::sync::{Arc, Mutex};

use adlc::config::AppConfig;
use adlc_core::directory::{
    Directory, DirectoryEntry, DirectorySession, Modification, OperationResult, SearchRequest,
};
use adlc_core::prelude::*;
use async_trait::async_trait;
use tempfile::NamedTempFile;

pub const CONFIG_YAML: &str = r#"
server: dc01.corp.example.com
username: CORP\svc-adlc
password: s3cret
search_base: OU=Computers,DC=corp,DC=example,DC=com
computer_name: web-9abcdef0
"#;

#[derive(Default)]
struct State {
    entries: Vec<String>,
    mutations: Vec<String>,
    binds: usize,
    unbinds: usize,
    reject_bind: bool,
}

#[derive(Clone, Default)]
pub struct StubDirectory {
    state: Arc<Mutex<State>>,
}

impl StubDirectory {
    pub fn with_entries(dns: &[&str]) -> Self {
        let stub = Self::default();
        stub.state.lock().unwrap().entries = dns.iter().map(|dn| dn.to_string()).collect();
        stub
    }

    pub fn reject_bind(&self) {
        self.state.lock().unwrap().reject_bind = true;
    }

    /// Mutations as `"<op> <dn>"`.
    pub fn mutations(&self) -> Vec<String> {
        self.state.lock().unwrap().mutations.clone()
    }

    pub fn sessions(&self) -> (usize, usize) {
        let state = self.state.lock().unwrap();
        (state.binds, state.unbinds)
    }

    fn record(&self, op: &str, dn: &DistinguishedName) {
        self.state
            .lock()
            .unwrap()
            .mutations
            .push(format!("{op} {dn}"));
    }
}

#[async_trait]
impl Directory for StubDirectory {
    type Session = StubSession;

    async fn bind(
        &self,
        _endpoint: &DirectoryEndpoint,
        _credentials: &DirectoryCredentials,
    ) -> DirectoryResult<StubSession> {
        let mut state = self.state.lock().unwrap();
        state.binds += 1;
        if state.reject_bind {
            return Err(DirectoryError::AuthenticationFailed);
        }
        Ok(StubSession {
            directory: self.clone(),
        })
    }
}

pub struct StubSession {
    directory: StubDirectory,
}

#[async_trait]
impl DirectorySession for StubSession {
    async fn search(&mut self, request: &SearchRequest) -> DirectoryResult<Vec<DirectoryEntry>> {
        let state = self.directory.state.lock().unwrap();
        Ok(state
            .entries
            .iter()
            .take(request.size_limit.max(0) as usize)
            .map(|dn| DirectoryEntry::new(dn.as_str()))
            .collect())
    }

    async fn add(
        &mut self,
        dn: &DistinguishedName,
        _attributes: &[(String, Vec<String>)],
    ) -> DirectoryResult<OperationResult> {
        self.directory.record("add", dn);
        Ok(OperationResult::success())
    }

    async fn modify(
        &mut self,
        dn: &DistinguishedName,
        _changes: &[Modification],
    ) -> DirectoryResult<OperationResult> {
        self.directory.record("modify", dn);
        Ok(OperationResult::success())
    }

    async fn delete(&mut self, dn: &DistinguishedName) -> DirectoryResult<OperationResult> {
        self.directory.record("delete", dn);
        Ok(OperationResult::success())
    }

    async fn unbind(&mut self) -> DirectoryResult<()> {
        self.directory.state.lock().unwrap().unbinds += 1;
        Ok(())
    }
}

/// Write YAML to a temporary file.
pub fn config_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

/// Configuration loaded from [`CONFIG_YAML`] with no environment.
pub fn app_config() -> AppConfig {
    let file = config_file(CONFIG_YAML);
    AppConfig::load_with(file.path(), |_| Err(std::env::VarError::NotPresent)).unwrap()
}
