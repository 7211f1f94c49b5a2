//! Pull request tools.

pub mod format;
pub mod ops;

use std::future::Future;

use rmcp::handler::server::tool::{Parameters, ToolRouter};
use rmcp::model::{CallToolResult, JsonObject};
use rmcp::ErrorData as McpError;

use crate::core::dispatch::dispatch;
use crate::core::error::AdoError;
use crate::core::params;
use crate::features::AdoService;

#[rmcp::tool_router(router = pull_requests_tools)]
impl AdoService {
    #[rmcp::tool(
        name = "list_pull_requests",
        description = "List pull requests in a repository, optionally filtered by status (active, abandoned, completed, all), creator, reviewer or target branch"
    )]
    pub async fn list_pull_requests(
        &self,
        params: Parameters<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let args = params.0;
        Ok(dispatch("listing pull requests", async {
            let project = params::required_str(&args, "project")?;
            let repository_id = params::required_str(&args, "repository_id")?;
            let status = params::optional_str(&args, "status")?;
            let creator_id = params::optional_str(&args, "creator_id")?;
            let reviewer_id = params::optional_str(&args, "reviewer_id")?;
            let target_branch = params::optional_str(&args, "target_branch")?;
            let client = self.provider.git_client().await?;
            ops::list_pull_requests(
                &client,
                &project,
                &repository_id,
                status,
                creator_id,
                reviewer_id,
                target_branch,
            )
            .await
        })
        .await)
    }

    #[rmcp::tool(
        name = "get_pull_request",
        description = "Get details of a pull request by id"
    )]
    pub async fn get_pull_request(
        &self,
        params: Parameters<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let args = params.0;
        Ok(dispatch("getting pull request", async {
            let project = params::required_str(&args, "project")?;
            let repository_id = params::required_str(&args, "repository_id")?;
            let pull_request_id = params::required_id(&args, "pull_request_id")?;
            let client = self.provider.git_client().await?;
            ops::get_pull_request(&client, &project, &repository_id, pull_request_id).await
        })
        .await)
    }

    #[rmcp::tool(
        name = "create_pull_request",
        description = "Create a pull request from source_branch into target_branch, optionally with a description and reviewers"
    )]
    pub async fn create_pull_request(
        &self,
        params: Parameters<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let args = params.0;
        Ok(dispatch("creating pull request", async {
            let project = params::required_str(&args, "project")?;
            let repository_id = params::required_str(&args, "repository_id")?;
            let title = params::required_str(&args, "title")?;
            let source_branch = params::required_str(&args, "source_branch")?;
            let target_branch = params::required_str(&args, "target_branch")?;
            let description = params::optional_str(&args, "description")?;
            let reviewers = params::optional_str_list(&args, "reviewers")?;
            let client = self.provider.git_client().await?;
            ops::create_pull_request(
                &client,
                &project,
                &repository_id,
                &title,
                &source_branch,
                &target_branch,
                description.as_deref(),
                reviewers,
            )
            .await
        })
        .await)
    }

    #[rmcp::tool(
        name = "update_pull_request",
        description = "Update a pull request's title, description or status (active, abandoned, completed)"
    )]
    pub async fn update_pull_request(
        &self,
        params: Parameters<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let args = params.0;
        Ok(dispatch("updating pull request", async {
            let project = params::required_str(&args, "project")?;
            let repository_id = params::required_str(&args, "repository_id")?;
            let pull_request_id = params::required_id(&args, "pull_request_id")?;
            let title = params::optional_str(&args, "title")?;
            let description = params::optional_str(&args, "description")?;
            let status = params::optional_str(&args, "status")?;
            let client = self.provider.git_client().await?;
            ops::update_pull_request(
                &client,
                &project,
                &repository_id,
                pull_request_id,
                title,
                description,
                status,
            )
            .await
        })
        .await)
    }

    #[rmcp::tool(
        name = "get_pull_request_commits",
        description = "List the commits in a pull request"
    )]
    pub async fn get_pull_request_commits(
        &self,
        params: Parameters<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let args = params.0;
        Ok(dispatch("getting pull request commits", async {
            let project = params::required_str(&args, "project")?;
            let repository_id = params::required_str(&args, "repository_id")?;
            let pull_request_id = params::required_id(&args, "pull_request_id")?;
            let client = self.provider.git_client().await?;
            ops::get_pull_request_commits(&client, &project, &repository_id, pull_request_id).await
        })
        .await)
    }

    #[rmcp::tool(
        name = "approve_pull_request",
        description = "Approve a pull request, casting a vote as the signed-in user"
    )]
    pub async fn approve_pull_request(
        &self,
        params: Parameters<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        self.cast_vote("approving pull request", params.0, ops::APPROVE_VOTE)
            .await
    }

    #[rmcp::tool(
        name = "reject_pull_request",
        description = "Reject a pull request, casting a vote as the signed-in user"
    )]
    pub async fn reject_pull_request(
        &self,
        params: Parameters<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        self.cast_vote("rejecting pull request", params.0, ops::REJECT_VOTE)
            .await
    }

    #[rmcp::tool(
        name = "complete_pull_request",
        description = "Complete (merge) a pull request with a merge strategy (squash, rebase, rebaseMerge, merge), optionally deleting the source branch or customizing the merge commit message"
    )]
    pub async fn complete_pull_request(
        &self,
        params: Parameters<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let args = params.0;
        Ok(dispatch("completing pull request", async {
            let project = params::required_str(&args, "project")?;
            let repository_id = params::required_str(&args, "repository_id")?;
            let pull_request_id = params::required_id(&args, "pull_request_id")?;
            let merge_strategy = params::optional_str(&args, "merge_strategy")?
                .unwrap_or_else(|| "squash".to_string());
            let delete_source_branch =
                params::optional_bool(&args, "delete_source_branch")?.unwrap_or(false);
            let merge_commit_message = params::optional_str(&args, "merge_commit_message")?;
            let client = self.provider.git_client().await?;
            ops::complete_pull_request(
                &client,
                &project,
                &repository_id,
                pull_request_id,
                &merge_strategy,
                delete_source_branch,
                merge_commit_message,
            )
            .await
        })
        .await)
    }

    #[rmcp::tool(
        name = "abandon_pull_request",
        description = "Abandon a pull request"
    )]
    pub async fn abandon_pull_request(
        &self,
        params: Parameters<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let args = params.0;
        Ok(dispatch("abandoning pull request", async {
            let project = params::required_str(&args, "project")?;
            let repository_id = params::required_str(&args, "repository_id")?;
            let pull_request_id = params::required_id(&args, "pull_request_id")?;
            let client = self.provider.git_client().await?;
            ops::abandon_pull_request(&client, &project, &repository_id, pull_request_id).await
        })
        .await)
    }

    #[rmcp::tool(
        name = "reactivate_pull_request",
        description = "Reactivate an abandoned pull request"
    )]
    pub async fn reactivate_pull_request(
        &self,
        params: Parameters<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let args = params.0;
        Ok(dispatch("reactivating pull request", async {
            let project = params::required_str(&args, "project")?;
            let repository_id = params::required_str(&args, "repository_id")?;
            let pull_request_id = params::required_id(&args, "pull_request_id")?;
            let client = self.provider.git_client().await?;
            ops::reactivate_pull_request(&client, &project, &repository_id, pull_request_id).await
        })
        .await)
    }

    #[rmcp::tool(
        name = "get_pull_request_changes",
        description = "List the file changes in the latest iteration of a pull request"
    )]
    pub async fn get_pull_request_changes(
        &self,
        params: Parameters<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let args = params.0;
        Ok(dispatch("getting pull request changes", async {
            let project = params::required_str(&args, "project")?;
            let repository_id = params::required_str(&args, "repository_id")?;
            let pull_request_id = params::required_id(&args, "pull_request_id")?;
            let client = self.provider.git_client().await?;
            ops::get_pull_request_changes(&client, &project, &repository_id, pull_request_id).await
        })
        .await)
    }

    #[rmcp::tool(
        name = "get_pull_request_thread_comments",
        description = "List the comments in one thread of a pull request"
    )]
    pub async fn get_pull_request_thread_comments(
        &self,
        params: Parameters<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let args = params.0;
        Ok(dispatch("getting pull request thread comments", async {
            let project = params::required_str(&args, "project")?;
            let repository_id = params::required_str(&args, "repository_id")?;
            let pull_request_id = params::required_id(&args, "pull_request_id")?;
            let thread_id = params::required_id(&args, "thread_id")?;
            let client = self.provider.git_client().await?;
            ops::get_pull_request_thread_comments(
                &client,
                &project,
                &repository_id,
                pull_request_id,
                thread_id,
            )
            .await
        })
        .await)
    }

    #[rmcp::tool(
        name = "get_pull_request_work_items",
        description = "List the work items linked to a pull request"
    )]
    pub async fn get_pull_request_work_items(
        &self,
        params: Parameters<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let args = params.0;
        Ok(dispatch("getting pull request work items", async {
            let project = params::required_str(&args, "project")?;
            let repository_id = params::required_str(&args, "repository_id")?;
            let pull_request_id = params::required_id(&args, "pull_request_id")?;
            let conn = self.provider.connection().await?;
            ops::get_pull_request_work_items(
                &conn.git_client(),
                &conn.work_item_client(),
                &project,
                &repository_id,
                pull_request_id,
            )
            .await
        })
        .await)
    }

    #[rmcp::tool(
        name = "add_work_items_to_pull_request",
        description = "Link existing work items to a pull request by id"
    )]
    pub async fn add_work_items_to_pull_request(
        &self,
        params: Parameters<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let args = params.0;
        Ok(dispatch("linking work items to pull request", async {
            let project = params::required_str(&args, "project")?;
            let repository_id = params::required_str(&args, "repository_id")?;
            let pull_request_id = params::required_id(&args, "pull_request_id")?;
            let work_item_ids = params::required_id_list(&args, "work_item_ids")?;
            let conn = self.provider.connection().await?;
            ops::link_work_items_to_pull_request(
                &conn.git_client(),
                &conn.work_item_client(),
                &project,
                &repository_id,
                pull_request_id,
                &work_item_ids,
            )
            .await
        })
        .await)
    }

    #[rmcp::tool(
        name = "add_pull_request_comment",
        description = "Add a comment to a pull request (opens a new active thread)"
    )]
    pub async fn add_pull_request_comment(
        &self,
        params: Parameters<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let args = params.0;
        Ok(dispatch("adding pull request comment", async {
            let project = params::required_str(&args, "project")?;
            let repository_id = params::required_str(&args, "repository_id")?;
            let pull_request_id = params::required_id(&args, "pull_request_id")?;
            let content = params::required_str(&args, "content")?;
            let client = self.provider.git_client().await?;
            ops::add_pull_request_comment(
                &client,
                &project,
                &repository_id,
                pull_request_id,
                &content,
            )
            .await
        })
        .await)
    }
}

impl AdoService {
    pub fn pull_requests_router() -> ToolRouter<AdoService> {
        Self::pull_requests_tools()
    }

    /// Shared body of the approve and reject tools; the vote is cast as the
    /// identity the handshake authenticated.
    async fn cast_vote(
        &self,
        action: &str,
        args: JsonObject,
        vote: i32,
    ) -> Result<CallToolResult, McpError> {
        Ok(dispatch(action, async {
            let project = params::required_str(&args, "project")?;
            let repository_id = params::required_str(&args, "repository_id")?;
            let pull_request_id = params::required_id(&args, "pull_request_id")?;
            let conn = self.provider.connection().await?;
            let reviewer_id = conn
                .authenticated_user()
                .and_then(|u| u.id.clone())
                .ok_or_else(|| {
                    AdoError::Client(
                        "the service did not report a signed-in identity for voting".to_string(),
                    )
                })?;
            ops::vote_on_pull_request(
                &conn.git_client(),
                &project,
                &repository_id,
                pull_request_id,
                &reviewer_id,
                vote,
            )
            .await
        })
        .await)
    }
}
