//! Session-scoped entry points
//!
//! [`Reconciler`] owns everything needed to talk to one directory and runs
//! each use case inside its own bind/unbind pair. Input is validated before
//! binding, so malformed identifiers and DNs never cost a connection.

use tracing::{debug, instrument, warn};

use crate::config::{DirectoryCredentials, DirectoryEndpoint, LifecycleConfig};
use crate::controller::{
    Created, Deleted, Disabled, Enabled, LifecycleController, TerminationOutcome,
};
use crate::directory::{Directory, DirectorySession};
use crate::dn::{validate_computer_name, DistinguishedName};
use crate::error::LifecycleResult;
use crate::identifier::InstanceId;
use crate::resolver::ResolutionOutcome;

/// A directory, where to reach it, and the controller to run against it.
pub struct Reconciler<D: Directory> {
    directory: D,
    endpoint: DirectoryEndpoint,
    credentials: DirectoryCredentials,
    controller: LifecycleController,
}

impl<D: Directory> Reconciler<D> {
    /// Create a reconciler. Endpoint and lifecycle config are validated.
    pub fn new(
        directory: D,
        endpoint: DirectoryEndpoint,
        credentials: DirectoryCredentials,
        config: LifecycleConfig,
    ) -> LifecycleResult<Self> {
        endpoint.validate()?;
        let controller = LifecycleController::new(config)?;
        Ok(Self {
            directory,
            endpoint,
            credentials,
            controller,
        })
    }

    pub fn controller(&self) -> &LifecycleController {
        &self.controller
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// Delete the computer object of a terminated instance.
    pub async fn reconcile_termination(&self, id: &str) -> LifecycleResult<TerminationOutcome> {
        let id = InstanceId::parse(id)?;
        let mut session = self.open().await?;
        let result = self.controller.reconcile_instance(&mut session, &id).await;
        self.close(session).await;
        result
    }

    /// Resolve an instance id without changing anything.
    pub async fn lookup(&self, id: &str) -> LifecycleResult<ResolutionOutcome> {
        let id = InstanceId::parse(id)?;
        let mut session = self.open().await?;
        let result = self.controller.lookup_instance(&mut session, &id).await;
        self.close(session).await;
        result
    }

    /// Resolve an exact computer name without changing anything.
    pub async fn lookup_by_name(&self, name: &str) -> LifecycleResult<ResolutionOutcome> {
        validate_computer_name(name)?;
        let mut session = self.open().await?;
        let result = self.controller.lookup_by_name(&mut session, name).await;
        self.close(session).await;
        result
    }

    /// Add a computer object in the pending-join state.
    pub async fn create(
        &self,
        dn: &str,
        attributes: &[(String, Vec<String>)],
    ) -> LifecycleResult<Created> {
        let dn = DistinguishedName::parse(dn)?;
        LifecycleController::creation_attributes(&dn, attributes)?;
        let mut session = self.open().await?;
        let result = self
            .controller
            .create_dn(&mut session, &dn, attributes)
            .await;
        self.close(session).await;
        result
    }

    /// Disable a computer object.
    pub async fn disable(&self, dn: &str) -> LifecycleResult<Disabled> {
        let dn = DistinguishedName::parse(dn)?;
        let mut session = self.open().await?;
        let result = self.controller.disable_dn(&mut session, &dn).await;
        self.close(session).await;
        result
    }

    /// Re-enable a computer object.
    pub async fn enable(&self, dn: &str) -> LifecycleResult<Enabled> {
        let dn = DistinguishedName::parse(dn)?;
        let mut session = self.open().await?;
        let result = self.controller.enable_dn(&mut session, &dn).await;
        self.close(session).await;
        result
    }

    /// Delete a computer object.
    pub async fn delete(&self, dn: &str) -> LifecycleResult<Deleted> {
        let dn = DistinguishedName::parse(dn)?;
        let mut session = self.open().await?;
        let result = self.controller.delete_dn(&mut session, &dn).await;
        self.close(session).await;
        result
    }

    #[instrument(
        skip(self),
        fields(host = %self.endpoint.host, username = %self.credentials.username)
    )]
    async fn open(&self) -> LifecycleResult<D::Session> {
        let session = self
            .directory
            .bind(&self.endpoint, &self.credentials)
            .await?;
        debug!("Directory session opened");
        Ok(session)
    }

    // Unbind errors are logged, never returned: they must not mask the
    // outcome of the operation that already ran.
    async fn close(&self, mut session: D::Session) {
        match session.unbind().await {
            Ok(()) => debug!("Directory session closed"),
            Err(e) => warn!(error = %e, "Error during directory unbind"),
        }
    }
}

impl<D: Directory> std::fmt::Debug for Reconciler<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("endpoint", &self.endpoint)
            .field("credentials", &self.credentials)
            .field("controller", &self.controller)
            .finish()
    }
}
