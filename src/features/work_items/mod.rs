//! Work item tools.

pub mod format;
pub mod ops;

use std::future::Future;

use rmcp::handler::server::tool::{Parameters, ToolRouter};
use rmcp::model::{CallToolResult, JsonObject};
use rmcp::ErrorData as McpError;

use crate::core::dispatch::dispatch;
use crate::core::params;
use crate::features::AdoService;

#[rmcp::tool_router(router = work_items_tools)]
impl AdoService {
    #[rmcp::tool(
        name = "get_work_item",
        description = "Get detailed information about a work item by id"
    )]
    pub async fn get_work_item(
        &self,
        params: Parameters<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let args = params.0;
        Ok(dispatch("getting work item", async {
            let id = params::required_id(&args, "id")?;
            let client = self.provider.work_item_client().await?;
            ops::get_work_item(&client, id).await
        })
        .await)
    }

    #[rmcp::tool(
        name = "query_work_items",
        description = "Query work items using WIQL; top limits the number of results (default 30)"
    )]
    pub async fn query_work_items(
        &self,
        params: Parameters<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let args = params.0;
        Ok(dispatch("querying work items", async {
            let query = params::required_str(&args, "query")?;
            let top = params::optional_count(&args, "top")?.unwrap_or(ops::DEFAULT_QUERY_TOP);
            let client = self.provider.work_item_client().await?;
            ops::query_work_items(&client, &query, top).await
        })
        .await)
    }

    #[rmcp::tool(
        name = "create_work_item",
        description = "Create a work item (e.g. Bug, Task, User Story); optionally link it under a parent"
    )]
    pub async fn create_work_item(
        &self,
        params: Parameters<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let args = params.0;
        Ok(dispatch("creating work item", async {
            let project = params::required_str(&args, "project")?;
            let work_item_type = params::required_str(&args, "work_item_type")?;
            let title = params::required_str(&args, "title")?;
            let description = params::optional_str(&args, "description")?;
            let parent_id = params::optional_id(&args, "parent_id")?;
            let client = self.provider.work_item_client().await?;
            ops::create_work_item(
                &client,
                &project,
                &work_item_type,
                &title,
                description.as_deref(),
                parent_id,
            )
            .await
        })
        .await)
    }

    #[rmcp::tool(
        name = "update_work_item",
        description = "Update fields of a work item; fields maps field reference names to new values"
    )]
    pub async fn update_work_item(
        &self,
        params: Parameters<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let args = params.0;
        Ok(dispatch("updating work item", async {
            let id = params::required_id(&args, "id")?;
            let fields = params::required_object(&args, "fields")?;
            let client = self.provider.work_item_client().await?;
            ops::update_work_item(&client, id, &fields).await
        })
        .await)
    }

    #[rmcp::tool(
        name = "get_work_item_comments",
        description = "Get all comments for a work item; project is resolved from the item when omitted"
    )]
    pub async fn get_work_item_comments(
        &self,
        params: Parameters<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let args = params.0;
        Ok(dispatch("getting work item comments", async {
            let id = params::required_id(&args, "id")?;
            let project = params::optional_str(&args, "project")?;
            let client = self.provider.work_item_client().await?;
            ops::get_work_item_comments(&client, id, project).await
        })
        .await)
    }

    #[rmcp::tool(
        name = "get_work_item_types",
        description = "List the work item types available in a project"
    )]
    pub async fn get_work_item_types(
        &self,
        params: Parameters<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let args = params.0;
        Ok(dispatch("getting work item types", async {
            let project = params::required_str(&args, "project")?;
            let client = self.provider.work_item_client().await?;
            ops::get_work_item_types(&client, &project).await
        })
        .await)
    }

    #[rmcp::tool(
        name = "get_work_item_type",
        description = "Get details of one work item type, including its states"
    )]
    pub async fn get_work_item_type(
        &self,
        params: Parameters<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let args = params.0;
        Ok(dispatch("getting work item type", async {
            let project = params::required_str(&args, "project")?;
            let type_name = params::required_str(&args, "type_name")?;
            let client = self.provider.work_item_client().await?;
            ops::get_work_item_type(&client, &project, &type_name).await
        })
        .await)
    }

    #[rmcp::tool(
        name = "get_work_item_type_fields",
        description = "List the fields of a work item type with their required/read-only status"
    )]
    pub async fn get_work_item_type_fields(
        &self,
        params: Parameters<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let args = params.0;
        Ok(dispatch("getting work item type fields", async {
            let project = params::required_str(&args, "project")?;
            let type_name = params::required_str(&args, "type_name")?;
            let client = self.provider.work_item_client().await?;
            ops::get_work_item_type_fields(&client, &project, &type_name).await
        })
        .await)
    }

    #[rmcp::tool(
        name = "get_work_item_type_field",
        description = "Get details of one field of a work item type, including allowed values"
    )]
    pub async fn get_work_item_type_field(
        &self,
        params: Parameters<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let args = params.0;
        Ok(dispatch("getting work item type field", async {
            let project = params::required_str(&args, "project")?;
            let type_name = params::required_str(&args, "type_name")?;
            let field_name = params::required_str(&args, "field_name")?;
            let client = self.provider.work_item_client().await?;
            ops::get_work_item_type_field(&client, &project, &type_name, &field_name).await
        })
        .await)
    }

    #[rmcp::tool(
        name = "get_work_item_templates",
        description = "List the work item templates of a team, optionally filtered by work item type"
    )]
    pub async fn get_work_item_templates(
        &self,
        params: Parameters<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let args = params.0;
        Ok(dispatch("getting work item templates", async {
            let project = params::required_str(&args, "project")?;
            let team = params::required_str(&args, "team")?;
            let work_item_type = params::optional_str(&args, "work_item_type")?;
            let client = self.provider.work_item_client().await?;
            ops::get_work_item_templates(&client, &project, &team, work_item_type.as_deref())
                .await
        })
        .await)
    }

    #[rmcp::tool(
        name = "get_work_item_template",
        description = "Get details of one work item template, including its default field values"
    )]
    pub async fn get_work_item_template(
        &self,
        params: Parameters<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let args = params.0;
        Ok(dispatch("getting work item template", async {
            let project = params::required_str(&args, "project")?;
            let team = params::required_str(&args, "team")?;
            let template_id = params::required_str(&args, "template_id")?;
            let client = self.provider.work_item_client().await?;
            ops::get_work_item_template(&client, &project, &team, &template_id).await
        })
        .await)
    }

    #[rmcp::tool(
        name = "add_work_item_comment",
        description = "Add a comment to a work item"
    )]
    pub async fn add_work_item_comment(
        &self,
        params: Parameters<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let args = params.0;
        Ok(dispatch("adding work item comment", async {
            let id = params::required_id(&args, "id")?;
            let project = params::required_str(&args, "project")?;
            let text = params::required_str(&args, "text")?;
            let client = self.provider.work_item_client().await?;
            ops::add_work_item_comment(&client, id, &project, &text).await
        })
        .await)
    }
}

impl AdoService {
    pub fn work_items_router() -> ToolRouter<AdoService> {
        Self::work_items_tools()
    }
}
