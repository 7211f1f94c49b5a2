//! Low-level REST channel shared by all domain clients.
//!
//! Responsible for URL joining, PAT auth, standard headers, JSON bodies, and
//! decoding the Azure DevOps error envelope. No retries here: each call is a
//! single bounded request.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::clients::JsonPatchOp;
use crate::core::error::AdoError;
use crate::infra::http::add_standard_headers;

pub const API_VERSION: &str = "7.1";

/// Media type required by the work item patch-document endpoints.
const JSON_PATCH_CONTENT_TYPE: &str = "application/json-patch+json";

/// One authenticated channel to an organization's REST endpoint.
#[derive(Clone)]
pub struct RestChannel {
    http: reqwest::Client,
    base_url: String,
    pat: String,
}

impl RestChannel {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        pat: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            pat: pat.into(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, AdoError> {
        let builder = self.authed(self.http.get(self.url(path))).query(query);
        Self::decode(builder.send().await?).await
    }

    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        body: &B,
    ) -> Result<T, AdoError> {
        let builder = self
            .authed(self.http.post(self.url(path)))
            .query(query)
            .json(body);
        Self::decode(builder.send().await?).await
    }

    pub async fn patch_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        body: &B,
    ) -> Result<T, AdoError> {
        let builder = self
            .authed(self.http.patch(self.url(path)))
            .query(query)
            .json(body);
        Self::decode(builder.send().await?).await
    }

    pub async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        body: &B,
    ) -> Result<T, AdoError> {
        let builder = self
            .authed(self.http.put(self.url(path)))
            .query(query)
            .json(body);
        Self::decode(builder.send().await?).await
    }

    /// POST an RFC 6902 document (work item creation).
    pub async fn post_patch_document<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        document: &[JsonPatchOp],
    ) -> Result<T, AdoError> {
        let builder = self
            .authed(self.http.post(self.url(path)))
            .query(query)
            .header(reqwest::header::CONTENT_TYPE, JSON_PATCH_CONTENT_TYPE)
            .body(serde_json::to_string(document).map_err(|e| AdoError::Client(e.to_string()))?);
        Self::decode(builder.send().await?).await
    }

    /// PATCH an RFC 6902 document (work item update).
    pub async fn patch_patch_document<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        document: &[JsonPatchOp],
    ) -> Result<T, AdoError> {
        let builder = self
            .authed(self.http.patch(self.url(path)))
            .query(query)
            .header(reqwest::header::CONTENT_TYPE, JSON_PATCH_CONTENT_TYPE)
            .body(serde_json::to_string(document).map_err(|e| AdoError::Client(e.to_string()))?);
        Self::decode(builder.send().await?).await
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let (builder, _rid) = add_standard_headers(builder, None);
        builder.basic_auth("", Some(&self.pat))
    }

    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, AdoError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .ok()
                .and_then(|e| e.message)
                .unwrap_or_else(|| format!("Azure DevOps returned {status}"));
            return Err(AdoError::remote(message));
        }
        resp.json::<T>()
            .await
            .map_err(|e| AdoError::Client(format!("malformed response from Azure DevOps: {e}")))
    }
}

/// Error body shape used across the ADO REST surface.
#[derive(Deserialize)]
struct ErrorEnvelope {
    message: Option<String>,
}

/// Paged list wrapper (`{"count": n, "value": [...]}`).
#[derive(Debug, Deserialize)]
pub struct Collection<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn channel(server: &MockServer) -> RestChannel {
        RestChannel::new(
            crate::infra::http::make_http_client(),
            server.base_url(),
            "pat",
        )
    }

    #[test]
    fn urls_join_without_doubled_slashes() {
        let c = RestChannel::new(
            crate::infra::http::make_http_client(),
            "https://dev.azure.com/contoso/",
            "pat",
        );
        assert_eq!(
            c.url("/_apis/projects"),
            "https://dev.azure.com/contoso/_apis/projects"
        );
    }

    #[tokio::test]
    async fn requests_carry_auth_and_standard_headers() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET)
                .path("/_apis/projects")
                .header_exists("authorization")
                .header_exists("x-request-id")
                .header_exists("user-agent");
            then.status(200).json_body(json!({"count": 0, "value": []}));
        });

        let c = channel(&server);
        let out: Collection<serde_json::Value> = c
            .get_json("_apis/projects", &[("api-version", API_VERSION.into())])
            .await
            .unwrap();
        m.assert();
        assert!(out.value.is_empty());
    }

    #[tokio::test]
    async fn error_envelopes_surface_their_message() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/_apis/wit/workitems/999");
            then.status(404).json_body(json!({"message": "Not found"}));
        });

        let c = channel(&server);
        let err = c
            .get_json::<serde_json::Value>("_apis/wit/workitems/999", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, AdoError::Unclassified(_)));
        assert_eq!(err.to_string(), "Not found");
    }

    #[tokio::test]
    async fn non_json_error_bodies_fall_back_to_the_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/_apis/teams");
            then.status(503).body("upstream unavailable");
        });

        let c = channel(&server);
        let err = c
            .get_json::<serde_json::Value>("_apis/teams", &[])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn malformed_success_bodies_are_client_errors() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/_apis/projects");
            then.status(200).body("not json");
        });

        let c = channel(&server);
        let err = c
            .get_json::<Collection<serde_json::Value>>("_apis/projects", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, AdoError::Client(_)));
    }
}
