//! Implementation functions for pull request tools.

use crate::clients::git::{
    CompletionOptions, CreatePullRequest, GitClient, PullRequestSearch, ReviewerRef,
    UpdatePullRequest,
};
use crate::clients::work_items::WorkItemClient;
use crate::clients::JsonPatchOp;
use crate::core::error::AdoError;
use crate::core::format::{join_blocks, none_found};
use crate::core::params::one_of;
use crate::features::pull_requests::format::{format_commit, format_pull_request};

const LIST_STATUSES: &[&str] = &["active", "abandoned", "completed", "all"];
const UPDATE_STATUSES: &[&str] = &["active", "abandoned", "completed"];
const MERGE_STRATEGIES: &[&str] = &["squash", "rebase", "rebaseMerge", "merge"];

pub const APPROVE_VOTE: i32 = 10;
pub const REJECT_VOTE: i32 = -10;

fn vote_description(vote: i32) -> &'static str {
    match vote {
        10 => "approved",
        5 => "approved with suggestions",
        0 => "reset their vote on",
        -5 => "is waiting for the author on",
        -10 => "rejected",
        _ => "voted on",
    }
}

/// Normalize a branch name to a full ref.
fn as_ref_name(branch: &str) -> String {
    if branch.starts_with("refs/") {
        branch.to_string()
    } else {
        format!("refs/heads/{branch}")
    }
}

pub async fn list_pull_requests(
    client: &GitClient,
    project: &str,
    repository_id: &str,
    status: Option<String>,
    creator_id: Option<String>,
    reviewer_id: Option<String>,
    target_branch: Option<String>,
) -> Result<String, AdoError> {
    if let Some(status) = &status {
        one_of("status", status, LIST_STATUSES)?;
    }
    let search = PullRequestSearch {
        status,
        creator_id,
        reviewer_id,
        target_ref_name: target_branch.as_deref().map(as_ref_name),
    };
    let prs = client
        .get_pull_requests(project, repository_id, &search)
        .await?;
    if prs.is_empty() {
        return Ok(none_found("pull requests"));
    }
    Ok(join_blocks(prs.iter().map(format_pull_request)))
}

pub async fn get_pull_request(
    client: &GitClient,
    project: &str,
    repository_id: &str,
    pull_request_id: i64,
) -> Result<String, AdoError> {
    let pr = client
        .get_pull_request(project, repository_id, pull_request_id)
        .await?;
    Ok(format_pull_request(&pr))
}

#[allow(clippy::too_many_arguments)]
pub async fn create_pull_request(
    client: &GitClient,
    project: &str,
    repository_id: &str,
    title: &str,
    source_branch: &str,
    target_branch: &str,
    description: Option<&str>,
    reviewers: Option<Vec<String>>,
) -> Result<String, AdoError> {
    if title.trim().is_empty() {
        return Err(AdoError::validation("title must not be empty"));
    }
    if source_branch == target_branch {
        return Err(AdoError::validation(
            "source_branch and target_branch must differ",
        ));
    }
    let body = CreatePullRequest {
        source_ref_name: as_ref_name(source_branch),
        target_ref_name: as_ref_name(target_branch),
        title: title.to_string(),
        description: description.unwrap_or_default().to_string(),
        reviewers: reviewers
            .map(|ids| ids.into_iter().map(|id| ReviewerRef { id }).collect()),
    };
    let pr = client
        .create_pull_request(project, repository_id, &body)
        .await?;
    Ok(format_pull_request(&pr))
}

pub async fn update_pull_request(
    client: &GitClient,
    project: &str,
    repository_id: &str,
    pull_request_id: i64,
    title: Option<String>,
    description: Option<String>,
    status: Option<String>,
) -> Result<String, AdoError> {
    if title.is_none() && description.is_none() && status.is_none() {
        return Err(AdoError::validation(
            "at least one of title, description or status must be provided",
        ));
    }
    if let Some(status) = &status {
        one_of("status", status, UPDATE_STATUSES)?;
    }
    let body = UpdatePullRequest {
        title,
        description,
        status,
    };
    let pr = client
        .update_pull_request(project, repository_id, pull_request_id, &body)
        .await?;
    Ok(format_pull_request(&pr))
}

/// Cast the caller's reviewer vote and report what it meant.
pub async fn vote_on_pull_request(
    client: &GitClient,
    project: &str,
    repository_id: &str,
    pull_request_id: i64,
    reviewer_id: &str,
    vote: i32,
) -> Result<String, AdoError> {
    if ![-10, -5, 0, 5, 10].contains(&vote) {
        return Err(AdoError::validation(
            "vote must be one of -10, -5, 0, 5, 10",
        ));
    }
    let reviewer = client
        .set_reviewer_vote(project, repository_id, pull_request_id, reviewer_id, vote)
        .await?;
    let name = reviewer.display_name.as_deref().unwrap_or("User");
    Ok(format!(
        "{name} has {} pull request #{pull_request_id}.",
        vote_description(vote)
    ))
}

pub async fn complete_pull_request(
    client: &GitClient,
    project: &str,
    repository_id: &str,
    pull_request_id: i64,
    merge_strategy: &str,
    delete_source_branch: bool,
    merge_commit_message: Option<String>,
) -> Result<String, AdoError> {
    // Canonical spelling is what the service expects on the wire.
    let strategy = MERGE_STRATEGIES
        .iter()
        .find(|s| s.eq_ignore_ascii_case(merge_strategy))
        .ok_or_else(|| {
            AdoError::Validation(format!(
                "field merge_strategy must be one of: {}",
                MERGE_STRATEGIES.join(", ")
            ))
        })?;

    let pr = client
        .get_pull_request(project, repository_id, pull_request_id)
        .await?;
    let merge_commit_id = pr
        .last_merge_source_commit
        .as_ref()
        .and_then(|c| c.commit_id.as_deref())
        .ok_or_else(|| {
            AdoError::remote(format!(
                "pull request #{pull_request_id} has no merge source commit to complete"
            ))
        })?;

    let options = CompletionOptions {
        merge_strategy: strategy.to_string(),
        delete_source_branch,
        merge_commit_message,
    };
    let completed = client
        .complete_pull_request(
            project,
            repository_id,
            pull_request_id,
            merge_commit_id,
            &options,
        )
        .await?;

    let mut lines = vec![format!(
        "Pull request #{pull_request_id} has been completed successfully."
    )];
    if let Some(name) = completed
        .closed_by
        .as_ref()
        .and_then(|id| id.display_name.as_deref())
    {
        lines.push(format!("Completed by: {name}"));
    }
    lines.push(format!("Merge strategy: {strategy}"));
    lines.push(format!("Source branch deleted: {delete_source_branch}"));
    Ok(lines.join("\n"))
}

pub async fn abandon_pull_request(
    client: &GitClient,
    project: &str,
    repository_id: &str,
    pull_request_id: i64,
) -> Result<String, AdoError> {
    let body = UpdatePullRequest {
        status: Some("abandoned".to_string()),
        ..Default::default()
    };
    client
        .update_pull_request(project, repository_id, pull_request_id, &body)
        .await?;
    Ok(format!(
        "Pull request #{pull_request_id} has been abandoned successfully."
    ))
}

pub async fn reactivate_pull_request(
    client: &GitClient,
    project: &str,
    repository_id: &str,
    pull_request_id: i64,
) -> Result<String, AdoError> {
    let body = UpdatePullRequest {
        status: Some("active".to_string()),
        ..Default::default()
    };
    client
        .update_pull_request(project, repository_id, pull_request_id, &body)
        .await?;
    Ok(format!(
        "Pull request #{pull_request_id} has been reactivated successfully."
    ))
}

/// File changes in the latest iteration of a pull request.
pub async fn get_pull_request_changes(
    client: &GitClient,
    project: &str,
    repository_id: &str,
    pull_request_id: i64,
) -> Result<String, AdoError> {
    let iterations = client
        .get_iterations(project, repository_id, pull_request_id)
        .await?;
    let latest = match iterations.last() {
        Some(it) => it,
        None => {
            return Ok(format!(
                "No iterations found for pull request #{pull_request_id}."
            ))
        }
    };
    let changes = client
        .get_iteration_changes(project, repository_id, pull_request_id, latest.id)
        .await?;
    if changes.change_entries.is_empty() {
        return Ok(format!(
            "No file changes found in pull request #{pull_request_id}."
        ));
    }

    let blocks = changes.change_entries.iter().enumerate().map(|(i, change)| {
        let path = change
            .item
            .as_ref()
            .and_then(|item| item.path.as_deref())
            .unwrap_or("unknown");
        let change_type = change.change_type.as_deref().unwrap_or("unknown");
        format!("{}. {path}\nChange type: {change_type}", i + 1)
    });
    Ok(format!(
        "File changes in PR #{pull_request_id}:\n\n{}\n\nSummary: {} files changed.",
        join_blocks(blocks),
        changes.change_entries.len()
    ))
}

pub async fn get_pull_request_thread_comments(
    client: &GitClient,
    project: &str,
    repository_id: &str,
    pull_request_id: i64,
    thread_id: i64,
) -> Result<String, AdoError> {
    let comments = client
        .get_thread_comments(project, repository_id, pull_request_id, thread_id)
        .await?;
    if comments.is_empty() {
        return Ok(format!(
            "No comments found in thread #{thread_id} of pull request #{pull_request_id}."
        ));
    }
    let blocks = comments.iter().enumerate().map(|(i, comment)| {
        let author = comment
            .author
            .as_ref()
            .and_then(|id| id.display_name.as_deref())
            .unwrap_or("Unknown");
        let date = comment.published_date.as_deref().unwrap_or("Unknown date");
        let content = comment.content.as_deref().unwrap_or("No content");
        format!("{}. Author: {author}\nDate: {date}\nContent: {content}", i + 1)
    });
    Ok(format!(
        "Comments in thread #{thread_id} of PR #{pull_request_id}:\n\n{}",
        join_blocks(blocks)
    ))
}

/// Work items linked to a pull request, with their core fields.
pub async fn get_pull_request_work_items(
    git: &GitClient,
    work_items: &WorkItemClient,
    project: &str,
    repository_id: &str,
    pull_request_id: i64,
) -> Result<String, AdoError> {
    let refs = git
        .get_work_item_refs(project, repository_id, pull_request_id)
        .await?;
    if refs.is_empty() {
        return Ok(format!(
            "No work items are linked to pull request #{pull_request_id}."
        ));
    }
    let ids: Vec<i64> = refs
        .iter()
        .filter_map(|r| r.id.as_deref()?.parse().ok())
        .collect();
    if ids.is_empty() {
        return Ok(format!(
            "No valid work item ids found in pull request #{pull_request_id}."
        ));
    }
    let items = work_items.get_work_items(&ids).await?;
    let blocks = items.iter().enumerate().map(|(i, item)| {
        let title = item.fields.title.as_deref().unwrap_or("No title");
        let work_item_type = item.fields.work_item_type.as_deref().unwrap_or("Unknown");
        let state = item.fields.state.as_deref().unwrap_or("Unknown");
        format!(
            "{}. ID: {}\nTitle: {title}\nType: {work_item_type}\nState: {state}",
            i + 1,
            item.id
        )
    });
    Ok(format!(
        "Work Items linked to PR #{pull_request_id}:\n\n{}",
        join_blocks(blocks)
    ))
}

/// Link work items to a pull request by adding an artifact relation on each
/// item. The vstfs URL needs the project and repository GUIDs, so the pull
/// request is fetched first.
pub async fn link_work_items_to_pull_request(
    git: &GitClient,
    work_items: &WorkItemClient,
    project: &str,
    repository_id: &str,
    pull_request_id: i64,
    work_item_ids: &[i64],
) -> Result<String, AdoError> {
    let pr = git
        .get_pull_request(project, repository_id, pull_request_id)
        .await?;
    let repo = pr.repository.as_ref();
    let repo_guid = repo.and_then(|r| r.id.as_deref()).ok_or_else(|| {
        AdoError::remote(format!(
            "pull request #{pull_request_id} does not identify its repository"
        ))
    })?;
    let project_guid = repo
        .and_then(|r| r.project.as_ref())
        .and_then(|p| p.id.as_deref())
        .ok_or_else(|| {
            AdoError::remote(format!(
                "pull request #{pull_request_id} does not identify its project"
            ))
        })?;

    let found = work_items.get_work_items(work_item_ids).await?;
    if found.is_empty() {
        return Ok("None of the provided work item ids could be found.".to_string());
    }

    let artifact =
        format!("vstfs:///Git/PullRequestId/{project_guid}%2F{repo_guid}%2F{pull_request_id}");
    for item in &found {
        let document = [JsonPatchOp::add(
            "/relations/-",
            serde_json::json!({
                "rel": "ArtifactLink",
                "url": artifact,
                "attributes": {"name": "Pull Request"}
            }),
        )];
        work_items.update_work_item(item.id, &document).await?;
    }

    let linked = found
        .iter()
        .map(|item| item.id.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    Ok(format!(
        "Successfully linked work item(s) #{linked} to pull request #{pull_request_id}."
    ))
}

pub async fn get_pull_request_commits(
    client: &GitClient,
    project: &str,
    repository_id: &str,
    pull_request_id: i64,
) -> Result<String, AdoError> {
    let commits = client
        .get_pull_request_commits(project, repository_id, pull_request_id)
        .await?;
    if commits.is_empty() {
        return Ok(format!("No commits found in pull request #{pull_request_id}."));
    }
    let blocks = commits
        .iter()
        .enumerate()
        .map(|(i, commit)| format!("{}. {}", i + 1, format_commit(commit)));
    Ok(format!(
        "Commits in PR #{pull_request_id}:\n\n{}",
        join_blocks(blocks)
    ))
}

pub async fn add_pull_request_comment(
    client: &GitClient,
    project: &str,
    repository_id: &str,
    pull_request_id: i64,
    content: &str,
) -> Result<String, AdoError> {
    if content.trim().is_empty() {
        return Err(AdoError::validation("content must not be empty"));
    }
    let thread = client
        .add_comment_thread(project, repository_id, pull_request_id, content)
        .await?;
    let body = thread
        .comments
        .first()
        .and_then(|c| c.content.as_deref())
        .unwrap_or(content);
    Ok(format!(
        "Comment added to pull request #{pull_request_id}:\n{body}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client(server: &MockServer) -> GitClient {
        GitClient::new(crate::clients::rest::RestChannel::new(
            crate::infra::http::make_http_client(),
            server.base_url(),
            "pat",
        ))
    }

    fn wi_client(server: &MockServer) -> WorkItemClient {
        WorkItemClient::new(crate::clients::rest::RestChannel::new(
            crate::infra::http::make_http_client(),
            server.base_url(),
            "pat",
        ))
    }

    #[tokio::test]
    async fn unknown_status_is_rejected_before_any_request() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET)
                .path("/Contoso/_apis/git/repositories/app/pullrequests");
            then.status(200).json_body(json!({"value": []}));
        });
        let err = list_pull_requests(
            &client(&server),
            "Contoso",
            "app",
            Some("merged".into()),
            None,
            None,
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AdoError::Validation(_)));
        assert_eq!(m.hits(), 0);
    }

    #[tokio::test]
    async fn listing_filters_become_search_criteria() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET)
                .path("/Contoso/_apis/git/repositories/app/pullrequests")
                .query_param("searchCriteria.status", "active")
                .query_param("searchCriteria.targetRefName", "refs/heads/main");
            then.status(200).json_body(json!({"value": [
                {"pullRequestId": 9, "title": "One", "status": "active"}
            ]}));
        });
        let out = list_pull_requests(
            &client(&server),
            "Contoso",
            "app",
            Some("active".into()),
            None,
            None,
            Some("main".into()),
        )
        .await
        .unwrap();
        m.assert();
        assert!(out.contains("# Pull Request: One"));
    }

    #[tokio::test]
    async fn empty_listing_renders_the_explanatory_line() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/Contoso/_apis/git/repositories/app/pullrequests");
            then.status(200).json_body(json!({"value": []}));
        });
        let out = list_pull_requests(&client(&server), "Contoso", "app", None, None, None, None)
            .await
            .unwrap();
        assert_eq!(out, "No pull requests found.");
    }

    #[tokio::test]
    async fn create_normalizes_branches_and_sends_reviewers() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST)
                .path("/Contoso/_apis/git/repositories/app/pullrequests")
                .json_body_partial(
                    r#"{"sourceRefName": "refs/heads/feature", "targetRefName": "refs/heads/main", "reviewers": [{"id": "jane@contoso.com"}]}"#,
                );
            then.status(201).json_body(json!({
                "pullRequestId": 77,
                "title": "Add feature",
                "status": "active"
            }));
        });
        let out = create_pull_request(
            &client(&server),
            "Contoso",
            "app",
            "Add feature",
            "feature",
            "main",
            None,
            Some(vec!["jane@contoso.com".into()]),
        )
        .await
        .unwrap();
        m.assert();
        assert!(out.contains("ID: 77"));
    }

    #[tokio::test]
    async fn update_requires_at_least_one_change() {
        let server = MockServer::start();
        let err = update_pull_request(&client(&server), "P", "r", 1, None, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AdoError::Validation(_)));
    }

    #[tokio::test]
    async fn votes_are_put_on_the_reviewer_resource() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(PUT)
                .path("/Contoso/_apis/git/repositories/app/pullrequests/9/reviewers/u1")
                .json_body_partial(r#"{"id": "u1", "vote": 10}"#);
            then.status(200)
                .json_body(json!({"id": "u1", "displayName": "Jane Doe", "vote": 10}));
        });
        let out = vote_on_pull_request(&client(&server), "Contoso", "app", 9, "u1", APPROVE_VOTE)
            .await
            .unwrap();
        m.assert();
        assert_eq!(out, "Jane Doe has approved pull request #9.");
    }

    #[tokio::test]
    async fn rejection_votes_name_the_reviewer_or_fall_back() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(PUT)
                .path("/Contoso/_apis/git/repositories/app/pullrequests/9/reviewers/u1");
            then.status(200).json_body(json!({"id": "u1", "vote": -10}));
        });
        let out = vote_on_pull_request(&client(&server), "Contoso", "app", 9, "u1", REJECT_VOTE)
            .await
            .unwrap();
        assert_eq!(out, "User has rejected pull request #9.");
    }

    #[tokio::test]
    async fn completing_reuses_the_merge_source_commit() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/Contoso/_apis/git/repositories/app/pullrequests/9");
            then.status(200).json_body(json!({
                "pullRequestId": 9,
                "lastMergeSourceCommit": {"commitId": "abc123"}
            }));
        });
        let m = server.mock(|when, then| {
            when.method(httpmock::Method::PATCH)
                .path("/Contoso/_apis/git/repositories/app/pullrequests/9")
                .json_body_partial(
                    r#"{"status": "completed", "lastMergeSourceCommit": {"commitId": "abc123"}, "completionOptions": {"mergeStrategy": "rebaseMerge", "deleteSourceBranch": true}}"#,
                );
            then.status(200).json_body(json!({
                "pullRequestId": 9,
                "status": "completed",
                "closedBy": {"displayName": "Jane Doe"}
            }));
        });
        let out = complete_pull_request(
            &client(&server),
            "Contoso",
            "app",
            9,
            "rebasemerge",
            true,
            None,
        )
        .await
        .unwrap();
        m.assert();
        assert!(out.starts_with("Pull request #9 has been completed successfully."));
        assert!(out.contains("Completed by: Jane Doe"));
        assert!(out.contains("Merge strategy: rebaseMerge"));
        assert!(out.contains("Source branch deleted: true"));
    }

    #[tokio::test]
    async fn unknown_merge_strategies_are_rejected_before_any_request() {
        let server = MockServer::start();
        let err = complete_pull_request(&client(&server), "P", "r", 1, "fastforward", false, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AdoError::Validation(_)));
        assert!(err.to_string().contains("must be one of"));
    }

    #[tokio::test]
    async fn abandoning_patches_the_status_and_confirms() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(httpmock::Method::PATCH)
                .path("/Contoso/_apis/git/repositories/app/pullrequests/9")
                .json_body(json!({"status": "abandoned"}));
            then.status(200)
                .json_body(json!({"pullRequestId": 9, "status": "abandoned"}));
        });
        let out = abandon_pull_request(&client(&server), "Contoso", "app", 9)
            .await
            .unwrap();
        m.assert();
        assert_eq!(out, "Pull request #9 has been abandoned successfully.");
    }

    #[tokio::test]
    async fn changes_come_from_the_latest_iteration() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/Contoso/_apis/git/repositories/app/pullrequests/9/iterations");
            then.status(200)
                .json_body(json!({"value": [{"id": 1}, {"id": 2}]}));
        });
        let m = server.mock(|when, then| {
            when.method(GET)
                .path("/Contoso/_apis/git/repositories/app/pullrequests/9/iterations/2/changes");
            then.status(200).json_body(json!({"changeEntries": [
                {"changeType": "edit", "item": {"path": "/src/main.rs"}},
                {"changeType": "add", "item": {"path": "/src/lib.rs"}}
            ]}));
        });
        let out = get_pull_request_changes(&client(&server), "Contoso", "app", 9)
            .await
            .unwrap();
        m.assert();
        assert!(out.starts_with("File changes in PR #9:"));
        assert!(out.contains("1. /src/main.rs\nChange type: edit"));
        assert!(out.contains("2. /src/lib.rs\nChange type: add"));
        assert!(out.ends_with("Summary: 2 files changed."));
    }

    #[tokio::test]
    async fn a_pull_request_without_iterations_says_so() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/Contoso/_apis/git/repositories/app/pullrequests/9/iterations");
            then.status(200).json_body(json!({"value": []}));
        });
        let out = get_pull_request_changes(&client(&server), "Contoso", "app", 9)
            .await
            .unwrap();
        assert_eq!(out, "No iterations found for pull request #9.");
    }

    #[tokio::test]
    async fn thread_comment_listing_renders_authors_and_fallbacks() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/Contoso/_apis/git/repositories/app/pullrequests/9/threads/3/comments");
            then.status(200).json_body(json!({"value": [
                {
                    "content": "Looks good",
                    "author": {"displayName": "Jane Doe"},
                    "publishedDate": "2024-05-01"
                },
                {}
            ]}));
        });
        let out = get_pull_request_thread_comments(&client(&server), "Contoso", "app", 9, 3)
            .await
            .unwrap();
        assert!(out.starts_with("Comments in thread #3 of PR #9:"));
        assert!(out.contains("1. Author: Jane Doe\nDate: 2024-05-01\nContent: Looks good"));
        assert!(out.contains("2. Author: Unknown\nDate: Unknown date\nContent: No content"));
    }

    #[tokio::test]
    async fn an_empty_thread_renders_the_explanatory_line() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/Contoso/_apis/git/repositories/app/pullrequests/9/threads/3/comments");
            then.status(200).json_body(json!({"value": []}));
        });
        let out = get_pull_request_thread_comments(&client(&server), "Contoso", "app", 9, 3)
            .await
            .unwrap();
        assert_eq!(out, "No comments found in thread #3 of pull request #9.");
    }

    #[tokio::test]
    async fn linked_work_items_are_resolved_and_rendered() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/Contoso/_apis/git/repositories/app/pullrequests/9/workitems");
            then.status(200)
                .json_body(json!({"value": [{"id": "101"}, {"id": "102"}]}));
        });
        let m = server.mock(|when, then| {
            when.method(GET)
                .path("/_apis/wit/workitems")
                .query_param("ids", "101,102");
            then.status(200).json_body(json!({"value": [
                {"id": 101, "fields": {"System.Title": "Fix crash", "System.WorkItemType": "Bug", "System.State": "Active"}},
                {"id": 102, "fields": {}}
            ]}));
        });
        let out = get_pull_request_work_items(
            &client(&server),
            &wi_client(&server),
            "Contoso",
            "app",
            9,
        )
        .await
        .unwrap();
        m.assert();
        assert!(out.starts_with("Work Items linked to PR #9:"));
        assert!(out.contains("1. ID: 101\nTitle: Fix crash\nType: Bug\nState: Active"));
        assert!(out.contains("2. ID: 102\nTitle: No title\nType: Unknown\nState: Unknown"));
    }

    #[tokio::test]
    async fn a_pull_request_with_no_linked_items_says_so() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/Contoso/_apis/git/repositories/app/pullrequests/9/workitems");
            then.status(200).json_body(json!({"value": []}));
        });
        let out = get_pull_request_work_items(
            &client(&server),
            &wi_client(&server),
            "Contoso",
            "app",
            9,
        )
        .await
        .unwrap();
        assert_eq!(out, "No work items are linked to pull request #9.");
    }

    #[tokio::test]
    async fn linking_adds_an_artifact_relation_per_item() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/Contoso/_apis/git/repositories/app/pullrequests/9");
            then.status(200).json_body(json!({
                "pullRequestId": 9,
                "repository": {
                    "id": "repo-guid",
                    "project": {"id": "proj-guid"}
                }
            }));
        });
        server.mock(|when, then| {
            when.method(GET)
                .path("/_apis/wit/workitems")
                .query_param("ids", "101");
            then.status(200)
                .json_body(json!({"value": [{"id": 101, "fields": {}}]}));
        });
        let patch = server.mock(|when, then| {
            when.method(httpmock::Method::PATCH)
                .path("/_apis/wit/workitems/101")
                .json_body_partial(
                    r#"[{
                        "op": "add",
                        "path": "/relations/-",
                        "value": {
                            "rel": "ArtifactLink",
                            "url": "vstfs:///Git/PullRequestId/proj-guid%2Frepo-guid%2F9",
                            "attributes": {"name": "Pull Request"}
                        }
                    }]"#,
                );
            then.status(200).json_body(json!({"id": 101, "fields": {}}));
        });
        let out = link_work_items_to_pull_request(
            &client(&server),
            &wi_client(&server),
            "Contoso",
            "app",
            9,
            &[101],
        )
        .await
        .unwrap();
        patch.assert();
        assert_eq!(out, "Successfully linked work item(s) #101 to pull request #9.");
    }

    #[tokio::test]
    async fn linking_unknown_work_items_reports_none_found() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/Contoso/_apis/git/repositories/app/pullrequests/9");
            then.status(200).json_body(json!({
                "pullRequestId": 9,
                "repository": {"id": "repo-guid", "project": {"id": "proj-guid"}}
            }));
        });
        server.mock(|when, then| {
            when.method(GET).path("/_apis/wit/workitems");
            then.status(200).json_body(json!({"value": []}));
        });
        let out = link_work_items_to_pull_request(
            &client(&server),
            &wi_client(&server),
            "Contoso",
            "app",
            9,
            &[999],
        )
        .await
        .unwrap();
        assert_eq!(out, "None of the provided work item ids could be found.");
    }

    #[tokio::test]
    async fn commit_listing_is_numbered_in_remote_order() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/Contoso/_apis/git/repositories/app/pullrequests/9/commits");
            then.status(200).json_body(json!({"value": [
                {"commitId": "aaaaaaaaaaaa", "comment": "first"},
                {"commitId": "bbbbbbbbbbbb", "comment": "second"}
            ]}));
        });
        let out = get_pull_request_commits(&client(&server), "Contoso", "app", 9)
            .await
            .unwrap();
        assert!(out.starts_with("Commits in PR #9:"));
        let a = out.find("1. Commit ID: aaaaaaaa").unwrap();
        let b = out.find("2. Commit ID: bbbbbbbb").unwrap();
        assert!(a < b);
    }
}
