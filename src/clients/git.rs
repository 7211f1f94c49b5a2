//! Git client: pull requests, their commits, and comment threads.

use serde::{Deserialize, Serialize};

use crate::clients::rest::{Collection, RestChannel, API_VERSION};
use crate::clients::IdentityRef;
use crate::core::error::AdoError;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PullRequest {
    pub pull_request_id: i64,
    pub title: Option<String>,
    pub status: Option<String>,
    pub source_ref_name: Option<String>,
    pub target_ref_name: Option<String>,
    pub created_by: Option<IdentityRef>,
    pub closed_by: Option<IdentityRef>,
    pub creation_date: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub repository: Option<GitRepositoryRef>,
    pub last_merge_source_commit: Option<GitCommitRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GitRepositoryRef {
    pub id: Option<String>,
    pub name: Option<String>,
    pub project: Option<ProjectRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProjectRef {
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GitCommitRef {
    pub commit_id: Option<String>,
    pub author: Option<GitUserDate>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GitUserDate {
    pub name: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommentThread {
    pub id: i64,
    pub status: Option<String>,
    #[serde(default)]
    pub comments: Vec<ThreadComment>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThreadComment {
    pub content: Option<String>,
    pub author: Option<IdentityRef>,
    pub published_date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PullRequestIteration {
    pub id: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IterationChangeList {
    pub change_entries: Vec<IterationChange>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IterationChange {
    pub change_type: Option<String>,
    pub item: Option<ChangedItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChangedItem {
    pub path: Option<String>,
}

/// `{id, url}` reference to an artifact in another area, here always a work
/// item linked to a pull request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResourceRef {
    pub id: Option<String>,
    pub url: Option<String>,
}

/// Reviewer identity as returned by the vote endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IdentityRefWithVote {
    pub id: Option<String>,
    pub display_name: Option<String>,
    pub vote: Option<i32>,
}

/// Merge options sent when completing a pull request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionOptions {
    pub merge_strategy: String,
    pub delete_source_branch: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_commit_message: Option<String>,
}

/// Server-side filters for pull request listing.
#[derive(Debug, Clone, Default)]
pub struct PullRequestSearch {
    pub status: Option<String>,
    pub creator_id: Option<String>,
    pub reviewer_id: Option<String>,
    pub target_ref_name: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePullRequest {
    pub source_ref_name: String,
    pub target_ref_name: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewers: Option<Vec<ReviewerRef>>,
}

#[derive(Serialize)]
pub struct ReviewerRef {
    pub id: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePullRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Clone)]
pub struct GitClient {
    channel: RestChannel,
}

impl GitClient {
    pub(crate) fn new(channel: RestChannel) -> Self {
        Self { channel }
    }

    fn pr_base(project: &str, repository_id: &str) -> String {
        format!("{project}/_apis/git/repositories/{repository_id}/pullrequests")
    }

    pub async fn get_pull_requests(
        &self,
        project: &str,
        repository_id: &str,
        search: &PullRequestSearch,
    ) -> Result<Vec<PullRequest>, AdoError> {
        let mut query: Vec<(&str, String)> = vec![("api-version", API_VERSION.into())];
        if let Some(status) = &search.status {
            query.push(("searchCriteria.status", status.clone()));
        }
        if let Some(creator) = &search.creator_id {
            query.push(("searchCriteria.creatorId", creator.clone()));
        }
        if let Some(reviewer) = &search.reviewer_id {
            query.push(("searchCriteria.reviewerId", reviewer.clone()));
        }
        if let Some(target) = &search.target_ref_name {
            query.push(("searchCriteria.targetRefName", target.clone()));
        }
        let list: Collection<PullRequest> = self
            .channel
            .get_json(&Self::pr_base(project, repository_id), &query)
            .await?;
        Ok(list.value)
    }

    pub async fn get_pull_request(
        &self,
        project: &str,
        repository_id: &str,
        pull_request_id: i64,
    ) -> Result<PullRequest, AdoError> {
        self.channel
            .get_json(
                &format!(
                    "{}/{pull_request_id}",
                    Self::pr_base(project, repository_id)
                ),
                &[("api-version", API_VERSION.into())],
            )
            .await
    }

    pub async fn create_pull_request(
        &self,
        project: &str,
        repository_id: &str,
        body: &CreatePullRequest,
    ) -> Result<PullRequest, AdoError> {
        self.channel
            .post_json(
                &Self::pr_base(project, repository_id),
                &[("api-version", API_VERSION.into())],
                body,
            )
            .await
    }

    pub async fn update_pull_request(
        &self,
        project: &str,
        repository_id: &str,
        pull_request_id: i64,
        body: &UpdatePullRequest,
    ) -> Result<PullRequest, AdoError> {
        self.channel
            .patch_json(
                &format!(
                    "{}/{pull_request_id}",
                    Self::pr_base(project, repository_id)
                ),
                &[("api-version", API_VERSION.into())],
                body,
            )
            .await
    }

    pub async fn get_pull_request_commits(
        &self,
        project: &str,
        repository_id: &str,
        pull_request_id: i64,
    ) -> Result<Vec<GitCommitRef>, AdoError> {
        let list: Collection<GitCommitRef> = self
            .channel
            .get_json(
                &format!(
                    "{}/{pull_request_id}/commits",
                    Self::pr_base(project, repository_id)
                ),
                &[("api-version", API_VERSION.into())],
            )
            .await?;
        Ok(list.value)
    }

    /// Cast or replace the caller's reviewer vote.
    pub async fn set_reviewer_vote(
        &self,
        project: &str,
        repository_id: &str,
        pull_request_id: i64,
        reviewer_id: &str,
        vote: i32,
    ) -> Result<IdentityRefWithVote, AdoError> {
        let body = serde_json::json!({"id": reviewer_id, "vote": vote});
        self.channel
            .put_json(
                &format!(
                    "{}/{pull_request_id}/reviewers/{reviewer_id}",
                    Self::pr_base(project, repository_id)
                ),
                &[("api-version", API_VERSION.into())],
                &body,
            )
            .await
    }

    /// Complete (merge) a pull request. The last merge source commit comes
    /// from a prior GET of the same pull request.
    pub async fn complete_pull_request(
        &self,
        project: &str,
        repository_id: &str,
        pull_request_id: i64,
        last_merge_commit_id: &str,
        options: &CompletionOptions,
    ) -> Result<PullRequest, AdoError> {
        let body = serde_json::json!({
            "status": "completed",
            "lastMergeSourceCommit": {"commitId": last_merge_commit_id},
            "completionOptions": options,
        });
        self.channel
            .patch_json(
                &format!(
                    "{}/{pull_request_id}",
                    Self::pr_base(project, repository_id)
                ),
                &[("api-version", API_VERSION.into())],
                &body,
            )
            .await
    }

    pub async fn get_iterations(
        &self,
        project: &str,
        repository_id: &str,
        pull_request_id: i64,
    ) -> Result<Vec<PullRequestIteration>, AdoError> {
        let list: Collection<PullRequestIteration> = self
            .channel
            .get_json(
                &format!(
                    "{}/{pull_request_id}/iterations",
                    Self::pr_base(project, repository_id)
                ),
                &[("api-version", API_VERSION.into())],
            )
            .await?;
        Ok(list.value)
    }

    pub async fn get_iteration_changes(
        &self,
        project: &str,
        repository_id: &str,
        pull_request_id: i64,
        iteration_id: i64,
    ) -> Result<IterationChangeList, AdoError> {
        self.channel
            .get_json(
                &format!(
                    "{}/{pull_request_id}/iterations/{iteration_id}/changes",
                    Self::pr_base(project, repository_id)
                ),
                &[("api-version", API_VERSION.into())],
            )
            .await
    }

    pub async fn get_thread_comments(
        &self,
        project: &str,
        repository_id: &str,
        pull_request_id: i64,
        thread_id: i64,
    ) -> Result<Vec<ThreadComment>, AdoError> {
        let list: Collection<ThreadComment> = self
            .channel
            .get_json(
                &format!(
                    "{}/{pull_request_id}/threads/{thread_id}/comments",
                    Self::pr_base(project, repository_id)
                ),
                &[("api-version", API_VERSION.into())],
            )
            .await?;
        Ok(list.value)
    }

    /// References to the work items linked to a pull request.
    pub async fn get_work_item_refs(
        &self,
        project: &str,
        repository_id: &str,
        pull_request_id: i64,
    ) -> Result<Vec<ResourceRef>, AdoError> {
        let list: Collection<ResourceRef> = self
            .channel
            .get_json(
                &format!(
                    "{}/{pull_request_id}/workitems",
                    Self::pr_base(project, repository_id)
                ),
                &[("api-version", API_VERSION.into())],
            )
            .await?;
        Ok(list.value)
    }

    /// Open a new active comment thread on a pull request.
    pub async fn add_comment_thread(
        &self,
        project: &str,
        repository_id: &str,
        pull_request_id: i64,
        content: &str,
    ) -> Result<CommentThread, AdoError> {
        let body = serde_json::json!({
            "comments": [{
                "parentCommentId": 0,
                "content": content,
                "commentType": "text"
            }],
            "status": "active"
        });
        self.channel
            .post_json(
                &format!(
                    "{}/{pull_request_id}/threads",
                    Self::pr_base(project, repository_id)
                ),
                &[("api-version", API_VERSION.into())],
                &body,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_body_skips_absent_reviewers() {
        let body = CreatePullRequest {
            source_ref_name: "refs/heads/feature".into(),
            target_ref_name: "refs/heads/main".into(),
            title: "Add feature".into(),
            description: String::new(),
            reviewers: None,
        };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["sourceRefName"], "refs/heads/feature");
        assert!(v.get("reviewers").is_none());
    }

    #[test]
    fn update_body_serializes_only_the_requested_changes() {
        let body = UpdatePullRequest {
            status: Some("abandoned".into()),
            ..Default::default()
        };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v, json!({"status": "abandoned"}));
    }

    #[test]
    fn completion_options_omit_the_message_when_unset() {
        let opts = CompletionOptions {
            merge_strategy: "squash".into(),
            delete_source_branch: true,
            merge_commit_message: None,
        };
        let v = serde_json::to_value(&opts).unwrap();
        assert_eq!(v, json!({"mergeStrategy": "squash", "deleteSourceBranch": true}));
    }

    #[test]
    fn pull_request_carries_repository_and_merge_source_when_present() {
        let pr: PullRequest = serde_json::from_value(json!({
            "pullRequestId": 5,
            "repository": {
                "id": "repo-guid",
                "project": {"id": "proj-guid", "name": "Contoso"}
            },
            "lastMergeSourceCommit": {"commitId": "abc123"}
        }))
        .unwrap();
        let repo = pr.repository.unwrap();
        assert_eq!(repo.id.as_deref(), Some("repo-guid"));
        assert_eq!(repo.project.unwrap().id.as_deref(), Some("proj-guid"));
        assert_eq!(
            pr.last_merge_source_commit.unwrap().commit_id.as_deref(),
            Some("abc123")
        );
    }

    #[test]
    fn pull_request_deserializes_with_sparse_fields() {
        let pr: PullRequest = serde_json::from_value(json!({
            "pullRequestId": 42,
            "title": "Fix crash",
            "status": "active",
            "createdBy": {"displayName": "Jane Doe"}
        }))
        .unwrap();
        assert_eq!(pr.pull_request_id, 42);
        assert!(pr.source_ref_name.is_none());
        assert_eq!(
            pr.created_by.unwrap().display_name.as_deref(),
            Some("Jane Doe")
        );
    }
}
