//! Rendering for pull requests and their commits.

use crate::clients::git::{GitCommitRef, PullRequest};
use crate::core::format::{truncate, Block};

/// Branch names come back as full refs; show the short form.
pub fn short_branch(ref_name: &str) -> &str {
    ref_name.strip_prefix("refs/heads/").unwrap_or(ref_name)
}

pub fn format_pull_request(pr: &PullRequest) -> String {
    let title = pr.title.as_deref().unwrap_or("Untitled");
    Block::new(format!("# Pull Request: {title}"))
        .line(format!("ID: {}", pr.pull_request_id))
        .field("Status", pr.status.as_deref())
        .field(
            "Source Branch",
            pr.source_ref_name.as_deref().map(short_branch),
        )
        .field(
            "Target Branch",
            pr.target_ref_name.as_deref().map(short_branch),
        )
        .field(
            "Creator",
            pr.created_by
                .as_ref()
                .and_then(|id| id.display_name.as_deref()),
        )
        .field("Creation Date", pr.creation_date.as_deref())
        .field(
            "Description",
            pr.description.as_deref().map(|d| truncate(d, 100)),
        )
        .field("URL", pr.url.as_deref())
        .render()
}

pub fn format_commit(commit: &GitCommitRef) -> String {
    // Char-based so an odd id coming off the wire can never split a byte
    // boundary.
    let short_id = commit
        .commit_id
        .as_deref()
        .map(|id| id.chars().take(8).collect::<String>())
        .unwrap_or_else(|| "N/A".to_string());
    Block::new(format!("Commit ID: {short_id}"))
        .field(
            "Author",
            commit.author.as_ref().and_then(|a| a.name.as_deref()),
        )
        .field(
            "Date",
            commit.author.as_ref().and_then(|a| a.date.as_deref()),
        )
        .field(
            "Comment",
            commit.comment.as_deref().map(|c| truncate(c, 100)),
        )
        .render()
}
