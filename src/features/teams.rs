//! Team tools.

use std::future::Future;

use rmcp::handler::server::tool::{Parameters, ToolRouter};
use rmcp::model::{CallToolResult, JsonObject};
use rmcp::ErrorData as McpError;

use crate::clients::core_api::{CoreClient, WebApiTeam};
use crate::core::dispatch::dispatch;
use crate::core::error::AdoError;
use crate::core::format::{join_blocks, none_found, Block};
use crate::core::params;
use crate::features::AdoService;

fn format_team(team: &WebApiTeam) -> String {
    let name = team.name.as_deref().unwrap_or("Unnamed");
    Block::new(format!("# Team: {name}"))
        .field("ID", team.id.as_deref())
        .field("Description", team.description.as_deref())
        .field("Project", team.project_name.as_deref())
        .field("Project ID", team.project_id.as_deref())
        .render()
}

pub async fn get_all_teams(
    client: &CoreClient,
    user_is_member_of: Option<bool>,
    top: Option<u32>,
    skip: Option<u32>,
) -> Result<String, AdoError> {
    let teams = client.get_all_teams(user_is_member_of, top, skip).await?;
    if teams.is_empty() {
        return Ok(none_found("teams"));
    }
    Ok(join_blocks(teams.iter().map(format_team)))
}

#[rmcp::tool_router(router = teams_tools)]
impl AdoService {
    #[rmcp::tool(
        name = "get_all_teams",
        description = "List the teams in the organization; user_is_member_of restricts the list to the caller's teams"
    )]
    pub async fn get_all_teams(
        &self,
        params: Parameters<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let args = params.0;
        Ok(dispatch("retrieving teams", async {
            let user_is_member_of = params::optional_bool(&args, "user_is_member_of")?;
            let top = params::optional_count(&args, "top")?;
            let skip = params::optional_count(&args, "skip")?;
            let client = self.provider.core_client().await?;
            get_all_teams(&client, user_is_member_of, top, skip).await
        })
        .await)
    }
}

impl AdoService {
    pub fn teams_router() -> ToolRouter<AdoService> {
        Self::teams_tools()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client(server: &MockServer) -> CoreClient {
        CoreClient::new(crate::clients::rest::RestChannel::new(
            crate::infra::http::make_http_client(),
            server.base_url(),
            "pat",
        ))
    }

    #[tokio::test]
    async fn teams_render_one_block_each() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET)
                .path("/_apis/teams")
                .query_param("$mine", "true")
                .query_param("$top", "10");
            then.status(200).json_body(json!({"value": [
                {"id": "t1", "name": "Platform", "projectName": "Contoso"},
                {"id": "t2", "name": "Web"}
            ]}));
        });
        let out = get_all_teams(&client(&server), Some(true), Some(10), None)
            .await
            .unwrap();
        m.assert();
        assert!(out.contains("# Team: Platform"));
        assert!(out.contains("Project: Contoso"));
        let web = out.split("\n\n").nth(1).unwrap();
        assert!(!web.contains("Project"));
    }

    #[tokio::test]
    async fn empty_team_list_renders_the_explanatory_line() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/_apis/teams");
            then.status(200).json_body(json!({"value": []}));
        });
        let out = get_all_teams(&client(&server), None, None, None).await.unwrap();
        assert_eq!(out, "No teams found.");
    }
}
