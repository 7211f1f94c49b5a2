//! Core client: projects, long-running project operations, process
//! templates, and teams.

use serde::{Deserialize, Serialize};

use crate::clients::rest::{Collection, RestChannel, API_VERSION};
use crate::core::error::AdoError;

/// Teams listing is still versioned as a preview API.
const TEAMS_API_VERSION: &str = "7.1-preview.3";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TeamProjectReference {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub state: Option<String>,
    pub visibility: Option<String>,
    pub url: Option<String>,
    pub last_update_time: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OperationReference {
    pub id: Option<String>,
    pub status: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Operation {
    pub id: Option<String>,
    pub status: Option<String>,
    pub url: Option<String>,
    pub created_date: Option<String>,
    pub last_modified_date: Option<String>,
    pub detailed_message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Process {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebApiTeam {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub project_name: Option<String>,
    pub project_id: Option<String>,
}

/// Body for queuing project creation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCreateRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub visibility: String,
    pub capabilities: serde_json::Value,
}

impl ProjectCreateRequest {
    pub fn new(
        name: String,
        description: Option<String>,
        source_control_type: &str,
        process_template_id: Option<&str>,
        visibility: String,
    ) -> Self {
        let mut capabilities = serde_json::json!({
            "versioncontrol": {"sourceControlType": source_control_type}
        });
        if let Some(template) = process_template_id {
            capabilities["processTemplate"] = serde_json::json!({"templateTypeId": template});
        }
        Self {
            name,
            description,
            visibility,
            capabilities,
        }
    }
}

#[derive(Clone)]
pub struct CoreClient {
    channel: RestChannel,
}

impl CoreClient {
    pub(crate) fn new(channel: RestChannel) -> Self {
        Self { channel }
    }

    pub async fn get_projects(
        &self,
        state_filter: Option<&str>,
        top: Option<u32>,
    ) -> Result<Vec<TeamProjectReference>, AdoError> {
        let mut query: Vec<(&str, String)> = vec![("api-version", API_VERSION.into())];
        if let Some(state) = state_filter {
            query.push(("stateFilter", state.to_string()));
        }
        if let Some(top) = top {
            query.push(("$top", top.to_string()));
        }
        let list: Collection<TeamProjectReference> =
            self.channel.get_json("_apis/projects", &query).await?;
        Ok(list.value)
    }

    pub async fn queue_create_project(
        &self,
        request: &ProjectCreateRequest,
    ) -> Result<OperationReference, AdoError> {
        self.channel
            .post_json(
                "_apis/projects",
                &[("api-version", API_VERSION.into())],
                request,
            )
            .await
    }

    pub async fn get_operation(&self, operation_id: &str) -> Result<Operation, AdoError> {
        self.channel
            .get_json(
                &format!("_apis/operations/{operation_id}"),
                &[("api-version", API_VERSION.into())],
            )
            .await
    }

    pub async fn get_processes(&self) -> Result<Vec<Process>, AdoError> {
        let list: Collection<Process> = self
            .channel
            .get_json(
                "_apis/process/processes",
                &[("api-version", API_VERSION.into())],
            )
            .await?;
        Ok(list.value)
    }

    pub async fn get_all_teams(
        &self,
        mine: Option<bool>,
        top: Option<u32>,
        skip: Option<u32>,
    ) -> Result<Vec<WebApiTeam>, AdoError> {
        let mut query: Vec<(&str, String)> = vec![("api-version", TEAMS_API_VERSION.into())];
        if let Some(mine) = mine {
            query.push(("$mine", mine.to_string()));
        }
        if let Some(top) = top {
            query.push(("$top", top.to_string()));
        }
        if let Some(skip) = skip {
            query.push(("$skip", skip.to_string()));
        }
        let list: Collection<WebApiTeam> = self.channel.get_json("_apis/teams", &query).await?;
        Ok(list.value)
    }
}
