//! Project tools.

pub mod ops;

use std::future::Future;

use rmcp::handler::server::tool::{Parameters, ToolRouter};
use rmcp::model::{CallToolResult, JsonObject};
use rmcp::ErrorData as McpError;

use crate::core::dispatch::dispatch;
use crate::core::params;
use crate::features::AdoService;

#[rmcp::tool_router(router = projects_tools)]
impl AdoService {
    #[rmcp::tool(
        name = "get_projects",
        description = "List the projects in the organization, optionally filtered by state (e.g. WellFormed, Deleting)"
    )]
    pub async fn get_projects(
        &self,
        params: Parameters<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let args = params.0;
        Ok(dispatch("retrieving projects", async {
            let state_filter = params::optional_str(&args, "state_filter")?;
            let top = params::optional_count(&args, "top")?;
            let client = self.provider.core_client().await?;
            ops::get_projects(&client, state_filter.as_deref(), top).await
        })
        .await)
    }

    #[rmcp::tool(
        name = "create_project",
        description = "Create a new project; source_control_type is Git or Tfvc, visibility is private or public"
    )]
    pub async fn create_project(
        &self,
        params: Parameters<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let args = params.0;
        Ok(dispatch("creating project", async {
            let name = params::required_str(&args, "name")?;
            let description = params::optional_str(&args, "description")?;
            let source_control_type = params::optional_str(&args, "source_control_type")?
                .unwrap_or_else(|| "Git".to_string());
            let process_template_id = params::optional_str(&args, "process_template_id")?;
            let visibility = params::optional_str(&args, "visibility")?
                .unwrap_or_else(|| "private".to_string());
            let client = self.provider.core_client().await?;
            ops::create_project(
                &client,
                &name,
                description,
                &source_control_type,
                process_template_id.as_deref(),
                &visibility,
            )
            .await
        })
        .await)
    }

    #[rmcp::tool(
        name = "check_project_creation_status",
        description = "Check the status of a queued project creation operation"
    )]
    pub async fn check_project_creation_status(
        &self,
        params: Parameters<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let args = params.0;
        Ok(dispatch("checking operation status", async {
            let operation_id = params::required_str(&args, "operation_id")?;
            let client = self.provider.core_client().await?;
            ops::check_project_creation_status(&client, &operation_id).await
        })
        .await)
    }

    #[rmcp::tool(
        name = "get_process_templates",
        description = "List the process templates available for project creation"
    )]
    pub async fn get_process_templates(
        &self,
        _params: Parameters<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        Ok(dispatch("retrieving process templates", async {
            let client = self.provider.core_client().await?;
            ops::get_process_templates(&client).await
        })
        .await)
    }
}

impl AdoService {
    pub fn projects_router() -> ToolRouter<AdoService> {
        Self::projects_tools()
    }
}
