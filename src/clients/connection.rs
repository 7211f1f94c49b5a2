//! Lazily-initialized authenticated connection and the provider that caches
//! it for the process lifetime.

use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::OnceCell;

use crate::clients::core_api::CoreClient;
use crate::clients::git::GitClient;
use crate::clients::rest::RestChannel;
use crate::clients::work_items::WorkItemClient;
use crate::core::error::AdoError;
use crate::infra::config::{AdoConfig, ORG_URL_VAR, PAT_VAR};
use crate::infra::http::make_http_client;

/// Handshake response body; only the caller's identity is kept.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionData {
    pub authenticated_user: Option<AuthenticatedUser>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthenticatedUser {
    pub id: Option<String>,
    pub provider_display_name: Option<String>,
}

/// Authenticated handle to one Azure DevOps organization. Never mutated after
/// creation, only replaced.
pub struct Connection {
    channel: RestChannel,
    authenticated_user: Option<AuthenticatedUser>,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("authenticated_user", &self.authenticated_user)
            .finish_non_exhaustive()
    }
}

impl Connection {
    /// Validate configuration, then perform the one-time handshake against
    /// `_apis/connectionData`. No network call is attempted with partial
    /// configuration.
    async fn establish(cfg: &AdoConfig) -> Result<Arc<Self>, AdoError> {
        let pat = cfg
            .pat
            .clone()
            .ok_or_else(|| AdoError::Configuration(format!("{PAT_VAR} is not set")))?;
        let org_url = cfg
            .organization_url
            .clone()
            .ok_or_else(|| AdoError::Configuration(format!("{ORG_URL_VAR} is not set")))?;
        if !org_url.starts_with("http://") && !org_url.starts_with("https://") {
            return Err(AdoError::Configuration(format!(
                "{ORG_URL_VAR} must be an http(s) URL"
            )));
        }

        let channel = RestChannel::new(make_http_client(), org_url, pat);
        let data: ConnectionData = channel
            .get_json(
                "_apis/connectionData",
                &[("api-version", "7.1-preview".into())],
            )
            .await
            .map_err(|e| AdoError::Client(format!("Azure DevOps authentication failed: {e}")))?;
        tracing::info!("connected to Azure DevOps");
        Ok(Arc::new(Self {
            channel,
            authenticated_user: data.authenticated_user,
        }))
    }

    /// The identity the handshake authenticated as, when the service reported
    /// one. Needed for operations that act as the caller, such as reviewer
    /// votes.
    pub fn authenticated_user(&self) -> Option<&AuthenticatedUser> {
        self.authenticated_user.as_ref()
    }

    pub fn work_item_client(&self) -> WorkItemClient {
        WorkItemClient::new(self.channel.clone())
    }

    pub fn git_client(&self) -> GitClient {
        GitClient::new(self.channel.clone())
    }

    pub fn core_client(&self) -> CoreClient {
        CoreClient::new(self.channel.clone())
    }
}

/// Process-scoped holder for the cached connection.
///
/// Guarded lazy initialization: concurrent first callers race into
/// `get_or_try_init`, at most one handshake completes and is observed by all
/// of them, and a failed attempt is not cached, so the next call retries from
/// scratch. Handed to the service by `Arc` so tests can substitute a provider
/// pointing at a fake endpoint.
pub struct ConnectionProvider {
    cfg: AdoConfig,
    conn: OnceCell<Arc<Connection>>,
}

impl ConnectionProvider {
    pub fn new(cfg: AdoConfig) -> Self {
        Self {
            cfg,
            conn: OnceCell::new(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(AdoConfig::from_env())
    }

    /// The cached connection, built on first use.
    pub async fn connection(&self) -> Result<Arc<Connection>, AdoError> {
        let conn = self
            .conn
            .get_or_try_init(|| Connection::establish(&self.cfg))
            .await?;
        Ok(conn.clone())
    }

    pub async fn work_item_client(&self) -> Result<WorkItemClient, AdoError> {
        Ok(self.connection().await?.work_item_client())
    }

    pub async fn git_client(&self) -> Result<GitClient, AdoError> {
        Ok(self.connection().await?.git_client())
    }

    pub async fn core_client(&self) -> Result<CoreClient, AdoError> {
        Ok(self.connection().await?.core_client())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn handshake_mock(server: &MockServer) -> httpmock::Mock<'_> {
        server.mock(|when, then| {
            when.method(GET).path("/_apis/connectionData");
            then.status(200)
                .json_body(json!({"authenticatedUser": {"id": "u1"}}));
        })
    }

    #[tokio::test]
    async fn missing_pat_is_a_configuration_error_and_makes_no_network_call() {
        let server = MockServer::start();
        let m = handshake_mock(&server);

        let provider = ConnectionProvider::new(AdoConfig {
            pat: None,
            organization_url: Some(server.base_url()),
        });
        let err = provider.connection().await.unwrap_err();
        assert!(matches!(err, AdoError::Configuration(_)));
        assert!(err.to_string().contains("AZURE_DEVOPS_PAT"));
        assert_eq!(m.hits(), 0);
    }

    #[tokio::test]
    async fn missing_org_url_names_the_variable() {
        let provider = ConnectionProvider::new(AdoConfig {
            pat: Some("pat".into()),
            organization_url: None,
        });
        let err = provider.connection().await.unwrap_err();
        assert!(err.to_string().contains("AZURE_DEVOPS_ORGANIZATION_URL"));
    }

    #[tokio::test]
    async fn non_http_org_url_is_rejected_before_any_request() {
        let provider =
            ConnectionProvider::new(AdoConfig::new("pat", "dev.azure.com/contoso"));
        let err = provider.connection().await.unwrap_err();
        assert!(matches!(err, AdoError::Configuration(_)));
        assert!(err.to_string().contains("http(s)"));
    }

    #[tokio::test]
    async fn the_connection_is_cached_and_the_handshake_runs_once() {
        let server = MockServer::start();
        let m = handshake_mock(&server);

        let provider = ConnectionProvider::new(AdoConfig::new("pat", server.base_url()));
        let first = provider.connection().await.unwrap();
        let second = provider.connection().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(m.hits(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_first_use_performs_exactly_one_handshake() {
        let server = MockServer::start();
        let m = handshake_mock(&server);

        let provider = Arc::new(ConnectionProvider::new(AdoConfig::new(
            "pat",
            server.base_url(),
        )));
        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let provider = provider.clone();
                tokio::spawn(async move { provider.connection().await.unwrap() })
            })
            .collect();
        let mut conns = Vec::new();
        for task in tasks {
            conns.push(task.await.unwrap());
        }
        assert!(conns.iter().all(|c| Arc::ptr_eq(c, &conns[0])));
        assert_eq!(m.hits(), 1);
    }

    #[tokio::test]
    async fn a_failed_handshake_does_not_poison_later_attempts() {
        let server = MockServer::start();
        let mut failing = server.mock(|when, then| {
            when.method(GET).path("/_apis/connectionData");
            then.status(401).json_body(json!({"message": "bad token"}));
        });

        let provider = ConnectionProvider::new(AdoConfig::new("pat", server.base_url()));
        let err = provider.connection().await.unwrap_err();
        assert!(matches!(err, AdoError::Client(_)));
        assert!(err.to_string().contains("authentication failed"));

        failing.delete();
        let m = handshake_mock(&server);
        let conn = provider.connection().await;
        assert!(conn.is_ok());
        assert_eq!(m.hits(), 1);
    }
}
