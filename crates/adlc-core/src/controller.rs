//! Lifecycle transitions for computer objects
//!
//! `Absent -> Created -> (Active <-> Disabled) -> Deleted`
//!
//! Every transition validates its DN before touching the directory, checks
//! the directory's result code explicitly, and performs exactly the change it
//! names. Delete never disables first; disable never deletes.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::account_control::{self, AccountControl};
use crate::config::LifecycleConfig;
use crate::directory::{AttributeList, DirectoryOperation, DirectorySession, Modification};
use crate::dn::DistinguishedName;
use crate::error::{LifecycleError, LifecycleResult};
use crate::identifier::InstanceId;
use crate::resolver::{ObjectResolver, ResolutionOutcome, COMPUTER_OBJECT_CLASS};

/// Object classes written on create, most general first.
pub const COMPUTER_OBJECT_CLASSES: [&str; 5] = [
    "top",
    "person",
    "organizationalPerson",
    "user",
    COMPUTER_OBJECT_CLASS,
];

/// Attributes the controller sets itself on create.
const RESERVED_ATTRIBUTES: [&str; 2] = ["objectClass", account_control::ATTRIBUTE];

/// A computer object was added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Created {
    pub dn: DistinguishedName,
}

/// A computer object was disabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Disabled {
    pub dn: DistinguishedName,
}

/// A computer object was re-enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Enabled {
    pub dn: DistinguishedName,
}

/// A computer object was deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deleted {
    pub dn: DistinguishedName,
}

/// Result of reconciling an instance termination.
///
/// `NotFound` and `Ambiguous` are normal outcomes. `Ambiguous` must be
/// escalated to an operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TerminationOutcome {
    Deleted { dn: DistinguishedName },
    NotFound,
    Ambiguous { count: usize, dns: Vec<String> },
}

/// Drives lifecycle transitions over a directory session.
#[derive(Debug, Clone)]
pub struct LifecycleController {
    config: LifecycleConfig,
    resolver: ObjectResolver,
}

impl LifecycleController {
    /// Create a controller; the configuration is validated.
    pub fn new(config: LifecycleConfig) -> LifecycleResult<Self> {
        config.validate()?;
        let resolver = ObjectResolver::from_config(&config);
        Ok(Self { config, resolver })
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    pub fn resolver(&self) -> &ObjectResolver {
        &self.resolver
    }

    /// Add a computer object in the pending-join state.
    ///
    /// `attributes` are written alongside the controller's own. They may not
    /// include `objectClass` or `userAccountControl`. `sAMAccountName`
    /// defaults to `<CN>$`.
    pub async fn create<S>(
        &self,
        session: &mut S,
        dn: &str,
        attributes: &[(String, Vec<String>)],
    ) -> LifecycleResult<Created>
    where
        S: DirectorySession + ?Sized,
    {
        let dn = DistinguishedName::parse(dn)?;
        self.create_dn(session, &dn, attributes).await
    }

    /// [`LifecycleController::create`] for an already validated DN.
    #[instrument(skip(self, session, attributes), fields(dn = %dn))]
    pub async fn create_dn<S>(
        &self,
        session: &mut S,
        dn: &DistinguishedName,
        attributes: &[(String, Vec<String>)],
    ) -> LifecycleResult<Created>
    where
        S: DirectorySession + ?Sized,
    {
        let entry = Self::creation_attributes(dn, attributes)?;

        let result = session.add(dn, &entry).await?;
        result.into_result(DirectoryOperation::Add, dn)?;

        info!(
            dn = %dn,
            container = dn.parent(),
            state = %AccountControl::PendingJoin,
            "Computer object created"
        );
        Ok(Created { dn: dn.clone() })
    }

    /// Build the attribute list of a new computer object.
    pub fn creation_attributes(
        dn: &DistinguishedName,
        attributes: &[(String, Vec<String>)],
    ) -> LifecycleResult<AttributeList> {
        if let Some((name, _)) = attributes.iter().find(|(name, _)| {
            RESERVED_ATTRIBUTES
                .iter()
                .any(|reserved| reserved.eq_ignore_ascii_case(name))
        }) {
            return Err(LifecycleError::ReservedAttribute {
                attribute: name.clone(),
            });
        }

        let mut entry: AttributeList = vec![
            (
                "objectClass".to_string(),
                COMPUTER_OBJECT_CLASSES.iter().map(|c| c.to_string()).collect(),
            ),
            (
                account_control::ATTRIBUTE.to_string(),
                vec![AccountControl::PendingJoin.encode()],
            ),
        ];

        let has_account_name = attributes
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case("sAMAccountName"));
        if !has_account_name {
            entry.push((
                "sAMAccountName".to_string(),
                vec![format!("{}$", dn.common_name())],
            ));
        }

        entry.extend(
            attributes
                .iter()
                .filter(|(_, values)| !values.is_empty())
                .cloned(),
        );
        Ok(entry)
    }

    /// Disable a computer object. Disabling a disabled object is not an error.
    pub async fn disable<S>(&self, session: &mut S, dn: &str) -> LifecycleResult<Disabled>
    where
        S: DirectorySession + ?Sized,
    {
        let dn = DistinguishedName::parse(dn)?;
        self.disable_dn(session, &dn).await
    }

    /// [`LifecycleController::disable`] for an already validated DN.
    #[instrument(skip(self, session), fields(dn = %dn))]
    pub async fn disable_dn<S>(
        &self,
        session: &mut S,
        dn: &DistinguishedName,
    ) -> LifecycleResult<Disabled>
    where
        S: DirectorySession + ?Sized,
    {
        self.set_account_control(session, dn, AccountControl::Disabled, "disabled")
            .await?;
        info!(dn = %dn, "Computer object disabled");
        Ok(Disabled { dn: dn.clone() })
    }

    /// Re-enable a disabled computer object. Idempotent.
    pub async fn enable<S>(&self, session: &mut S, dn: &str) -> LifecycleResult<Enabled>
    where
        S: DirectorySession + ?Sized,
    {
        let dn = DistinguishedName::parse(dn)?;
        self.enable_dn(session, &dn).await
    }

    /// [`LifecycleController::enable`] for an already validated DN.
    #[instrument(skip(self, session), fields(dn = %dn))]
    pub async fn enable_dn<S>(
        &self,
        session: &mut S,
        dn: &DistinguishedName,
    ) -> LifecycleResult<Enabled>
    where
        S: DirectorySession + ?Sized,
    {
        self.set_account_control(session, dn, AccountControl::Active, "enabled")
            .await?;
        info!(dn = %dn, "Computer object enabled");
        Ok(Enabled { dn: dn.clone() })
    }

    /// Delete a computer object.
    ///
    /// The directory's result code decides success. A non-zero code becomes
    /// [`crate::error::DirectoryError::OperationRejected`] with the
    /// directory's description.
    pub async fn delete<S>(&self, session: &mut S, dn: &str) -> LifecycleResult<Deleted>
    where
        S: DirectorySession + ?Sized,
    {
        let dn = DistinguishedName::parse(dn)?;
        self.delete_dn(session, &dn).await
    }

    /// [`LifecycleController::delete`] for an already validated DN.
    #[instrument(skip(self, session), fields(dn = %dn))]
    pub async fn delete_dn<S>(
        &self,
        session: &mut S,
        dn: &DistinguishedName,
    ) -> LifecycleResult<Deleted>
    where
        S: DirectorySession + ?Sized,
    {
        let result = session.delete(dn).await?;
        result.into_result(DirectoryOperation::Delete, dn)?;

        info!(dn = %dn, "Computer object deleted");
        Ok(Deleted { dn: dn.clone() })
    }

    /// Validate and resolve an instance id without changing anything.
    pub async fn lookup<S>(&self, session: &mut S, id: &str) -> LifecycleResult<ResolutionOutcome>
    where
        S: DirectorySession + ?Sized,
    {
        let id = InstanceId::parse(id)?;
        self.lookup_instance(session, &id).await
    }

    /// [`LifecycleController::lookup`] for an already validated id.
    pub async fn lookup_instance<S>(
        &self,
        session: &mut S,
        id: &InstanceId,
    ) -> LifecycleResult<ResolutionOutcome>
    where
        S: DirectorySession + ?Sized,
    {
        self.resolver
            .resolve(session, &self.config.search_base, id)
            .await
    }

    /// Resolve an exact computer name without changing anything.
    pub async fn lookup_by_name<S>(
        &self,
        session: &mut S,
        name: &str,
    ) -> LifecycleResult<ResolutionOutcome>
    where
        S: DirectorySession + ?Sized,
    {
        self.resolver
            .resolve_by_name(session, &self.config.search_base, name)
            .await
    }

    /// Delete the computer object of a terminated instance.
    ///
    /// Validate, resolve, and delete only on a unique match. An invalid id
    /// fails before any directory call.
    pub async fn reconcile_termination<S>(
        &self,
        session: &mut S,
        id: &str,
    ) -> LifecycleResult<TerminationOutcome>
    where
        S: DirectorySession + ?Sized,
    {
        let id = InstanceId::parse(id)?;
        self.reconcile_instance(session, &id).await
    }

    /// [`LifecycleController::reconcile_termination`] for an already validated id.
    #[instrument(skip(self, session), fields(instance_id = %id))]
    pub async fn reconcile_instance<S>(
        &self,
        session: &mut S,
        id: &InstanceId,
    ) -> LifecycleResult<TerminationOutcome>
    where
        S: DirectorySession + ?Sized,
    {
        match self.lookup_instance(session, id).await? {
            ResolutionOutcome::Unique { dn } => {
                let deleted = self.delete_dn(session, &dn).await?;
                Ok(TerminationOutcome::Deleted { dn: deleted.dn })
            }
            ResolutionOutcome::NotFound => {
                info!(instance_id = %id, "No computer object for terminated instance");
                Ok(TerminationOutcome::NotFound)
            }
            ResolutionOutcome::Ambiguous { count, dns } => {
                warn!(
                    instance_id = %id,
                    count,
                    dns = ?dns,
                    "Several computer objects match terminated instance, operator action required"
                );
                Ok(TerminationOutcome::Ambiguous { count, dns })
            }
        }
    }

    async fn set_account_control<S>(
        &self,
        session: &mut S,
        dn: &DistinguishedName,
        state: AccountControl,
        action: &str,
    ) -> LifecycleResult<()>
    where
        S: DirectorySession + ?Sized,
    {
        let changes = [
            Modification::replace(account_control::ATTRIBUTE, state.encode()),
            Modification::replace(self.config.audit_attribute.clone(), self.audit_note(action)),
        ];
        let result = session.modify(dn, &changes).await?;
        result.into_result(DirectoryOperation::Modify, dn)?;
        Ok(())
    }

    /// `"<prefix>: <action> at <RFC 3339 UTC>"`
    fn audit_note(&self, action: &str) -> String {
        format!(
            "{}: {} at {}",
            self.config.audit_prefix,
            action,
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
        )
    }
}
