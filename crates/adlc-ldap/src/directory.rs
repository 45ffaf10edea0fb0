//! Connection setup and bind.

use std::time::Duration;

use adlc_core::async_trait;
use adlc_core::config::{DirectoryCredentials, DirectoryEndpoint};
use adlc_core::directory::{Directory, RC_INVALID_CREDENTIALS, RC_SUCCESS};
use adlc_core::error::{DirectoryError, DirectoryResult};
use ldap3::{LdapConnAsync, LdapConnSettings, LdapResult};
use tracing::{debug, info, instrument, warn};

use crate::session::LdapSession;

/// Opens authenticated LDAP sessions.
#[derive(Debug, Clone, Copy, Default)]
pub struct LdapDirectory;

impl LdapDirectory {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Directory for LdapDirectory {
    type Session = LdapSession;

    #[instrument(
        skip(self, credentials),
        fields(url = %endpoint.url(), username = %credentials.username)
    )]
    async fn bind(
        &self,
        endpoint: &DirectoryEndpoint,
        credentials: &DirectoryCredentials,
    ) -> DirectoryResult<LdapSession> {
        let url = endpoint.url();
        debug!(url = %url, "Connecting to LDAP server");

        let settings = connection_settings(endpoint);
        let (conn, mut ldap) = LdapConnAsync::with_settings(settings, &url)
            .await
            .map_err(|e| {
                DirectoryError::bind_failed_with_source(
                    format!("failed to connect to LDAP server at {url}"),
                    e,
                )
            })?;

        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                warn!(error = %e, "LDAP connection driver error");
            }
        });

        debug!(username = %credentials.username, "Performing LDAP bind");
        let result = ldap
            .simple_bind(&credentials.username, &credentials.password)
            .await
            .map_err(|e| {
                DirectoryError::bind_failed_with_source(
                    format!("LDAP bind failed for {}", credentials.username),
                    e,
                )
            })?;

        if let Err(e) = check_bind(&result) {
            log_unbind_error(ldap.unbind().await);
            return Err(e);
        }

        info!(host = %endpoint.host, "LDAP connection established");
        Ok(LdapSession::new(ldap))
    }
}

fn connection_settings(endpoint: &DirectoryEndpoint) -> LdapConnSettings {
    LdapConnSettings::new()
        .set_conn_timeout(Duration::from_secs(endpoint.connect_timeout_secs))
        .set_starttls(endpoint.use_starttls)
        .set_no_tls_verify(endpoint.skip_tls_verify)
}

/// Unbind after a failed bind. The bind error is what the caller sees, so an
/// unbind failure is only logged.
pub(crate) fn log_unbind_error(result: ldap3::result::Result<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Error during LDAP unbind");
            false
        }
    }
}

/// Map a bind result code onto the directory error model.
pub(crate) fn check_bind(result: &LdapResult) -> DirectoryResult<()> {
    match result.rc {
        RC_SUCCESS => Ok(()),
        RC_INVALID_CREDENTIALS => Err(DirectoryError::AuthenticationFailed),
        rc => Err(DirectoryError::bind_failed(format!(
            "LDAP bind failed with code {rc}: {}",
            result.text
        ))),
    }
}
