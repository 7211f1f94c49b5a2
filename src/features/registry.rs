//! Explicit tool registry.
//!
//! Every feature contributes one named router; they are assembled here and
//! duplicate tool names are rejected before the server starts, so one tool
//! can never silently shadow another.

use std::collections::HashSet;

use rmcp::handler::server::tool::ToolRouter;

use crate::features::AdoService;

pub fn build_tool_router() -> anyhow::Result<ToolRouter<AdoService>> {
    // Names are collected per feature router before combining; the combined
    // router is map-backed and would silently drop a duplicate.
    let names = [
        AdoService::work_items_router(),
        AdoService::pull_requests_router(),
        AdoService::projects_router(),
        AdoService::teams_router(),
    ]
    .into_iter()
    .flat_map(|router| {
        router
            .into_iter()
            .map(|r| r.name().to_string())
            .collect::<Vec<_>>()
    });
    verify_unique_tool_names(names)?;

    Ok(AdoService::work_items_router()
        + AdoService::pull_requests_router()
        + AdoService::projects_router()
        + AdoService::teams_router())
}

/// A duplicate name is a programming error, fatal at startup.
pub fn verify_unique_tool_names<I>(names: I) -> anyhow::Result<()>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name.clone()) {
            anyhow::bail!("duplicate tool name registered: {name}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_full_router_builds_and_contains_every_feature() {
        let router = build_tool_router().expect("router should build");
        let names: Vec<String> = router.into_iter().map(|r| r.name().to_string()).collect();
        for expected in [
            "get_work_item",
            "query_work_items",
            "create_work_item",
            "update_work_item",
            "get_work_item_comments",
            "add_work_item_comment",
            "get_work_item_types",
            "get_work_item_type",
            "get_work_item_type_fields",
            "get_work_item_type_field",
            "get_work_item_templates",
            "get_work_item_template",
            "list_pull_requests",
            "get_pull_request",
            "create_pull_request",
            "update_pull_request",
            "approve_pull_request",
            "reject_pull_request",
            "complete_pull_request",
            "abandon_pull_request",
            "reactivate_pull_request",
            "get_pull_request_commits",
            "get_pull_request_changes",
            "get_pull_request_thread_comments",
            "get_pull_request_work_items",
            "add_work_items_to_pull_request",
            "add_pull_request_comment",
            "get_projects",
            "create_project",
            "check_project_creation_status",
            "get_process_templates",
            "get_all_teams",
        ] {
            assert!(names.iter().any(|n| n == expected), "missing tool {expected}");
        }
    }

    #[test]
    fn duplicate_tool_names_are_a_startup_error() {
        let err = verify_unique_tool_names(vec![
            "get_work_item".to_string(),
            "get_projects".to_string(),
            "get_work_item".to_string(),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("duplicate tool name"));
        assert!(err.to_string().contains("get_work_item"));
    }
}
