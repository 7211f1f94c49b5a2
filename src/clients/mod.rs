//! Clients for the Azure DevOps 7.1 REST API.
//!
//! [`connection::ConnectionProvider`] owns the lazily-built authenticated
//! handle; each domain client ([`work_items::WorkItemClient`],
//! [`git::GitClient`], [`core_api::CoreClient`]) is a thin stateless view
//! over a clone of the underlying [`rest::RestChannel`].

pub mod connection;
pub mod core_api;
pub mod git;
pub mod rest;
pub mod work_items;

use serde::{Deserialize, Serialize};

/// Identity reference as returned across the Azure DevOps APIs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IdentityRef {
    pub id: Option<String>,
    pub display_name: Option<String>,
    pub unique_name: Option<String>,
}

/// RFC 6902 operation used by the work item create/update endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct JsonPatchOp {
    pub op: &'static str,
    pub path: String,
    pub value: serde_json::Value,
}

impl JsonPatchOp {
    pub fn add(path: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            op: "add",
            path: path.into(),
            value,
        }
    }

    pub fn replace(path: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            op: "replace",
            path: path.into(),
            value,
        }
    }
}
