//! Implementation functions for work item tools.
//!
//! Each takes an already-derived [`WorkItemClient`] plus validated arguments
//! and returns formatted text or a taxonomy error. No authentication and no
//! client construction happens here.

use serde_json::Value as JsonValue;

use crate::clients::work_items::{WorkItem, WorkItemClient};
use crate::clients::JsonPatchOp;
use crate::core::error::AdoError;
use crate::core::format::join_blocks;
use crate::features::work_items::format::{
    format_comments, format_field_table, format_template, format_template_table,
    format_type_field, format_type_table, format_work_item, format_work_item_type,
};

pub const DEFAULT_QUERY_TOP: u32 = 30;

pub async fn get_work_item(client: &WorkItemClient, id: i64) -> Result<String, AdoError> {
    let item = client.get_work_item(id).await?;
    Ok(format_work_item(&item))
}

pub async fn query_work_items(
    client: &WorkItemClient,
    query: &str,
    top: u32,
) -> Result<String, AdoError> {
    if query.trim().is_empty() {
        return Err(AdoError::validation("query must not be empty"));
    }
    let hits = client.query_by_wiql(query, top).await?;
    if hits.is_empty() {
        return Ok("No work items found matching the query.".to_string());
    }
    let ids: Vec<i64> = hits.iter().map(|r| r.id).collect();
    let items = client.get_work_items(&ids).await?;
    Ok(join_blocks(items.iter().map(format_work_item)))
}

pub async fn create_work_item(
    client: &WorkItemClient,
    project: &str,
    work_item_type: &str,
    title: &str,
    description: Option<&str>,
    parent_id: Option<i64>,
) -> Result<String, AdoError> {
    if title.trim().is_empty() {
        return Err(AdoError::validation("title must not be empty"));
    }
    let mut document = vec![JsonPatchOp::add(
        "/fields/System.Title",
        JsonValue::String(title.to_string()),
    )];
    if let Some(description) = description {
        document.push(JsonPatchOp::add(
            "/fields/System.Description",
            JsonValue::String(description.to_string()),
        ));
    }

    let item = client
        .create_work_item(project, work_item_type, &document)
        .await?;

    if let Some(parent_id) = parent_id {
        match link_to_parent(client, &item, parent_id).await {
            Ok(updated) => return Ok(format_work_item(&updated)),
            Err(e) => {
                // The item exists; report the partial failure rather than
                // discarding it.
                return Ok(format!(
                    "Work item created successfully, but failed to establish \
                     parent-child relationship: {e}\n\n{}",
                    format_work_item(&item)
                ));
            }
        }
    }

    Ok(format_work_item(&item))
}

async fn link_to_parent(
    client: &WorkItemClient,
    item: &WorkItem,
    parent_id: i64,
) -> Result<WorkItem, AdoError> {
    let org_url = item
        .links
        .as_ref()
        .and_then(|l| l.self_link.as_ref())
        .and_then(|s| s.href.split("/_apis").next())
        .ok_or_else(|| AdoError::remote("created work item carries no self link"))?;
    let document = [JsonPatchOp::add(
        "/relations/-",
        serde_json::json!({
            "rel": "System.LinkTypes.Hierarchy-Reverse",
            "url": format!("{org_url}/_apis/wit/workItems/{parent_id}")
        }),
    )];
    client.update_work_item(item.id, &document).await
}

pub async fn update_work_item(
    client: &WorkItemClient,
    id: i64,
    fields: &serde_json::Map<String, JsonValue>,
) -> Result<String, AdoError> {
    if fields.is_empty() {
        return Err(AdoError::validation(
            "fields must contain at least one field/value pair",
        ));
    }
    let document: Vec<JsonPatchOp> = fields
        .iter()
        .map(|(name, value)| {
            let path = if name.starts_with("/fields/") {
                name.clone()
            } else {
                format!("/fields/{name}")
            };
            JsonPatchOp::replace(path, value.clone())
        })
        .collect();
    let item = client.update_work_item(id, &document).await?;
    Ok(format_work_item(&item))
}

pub async fn get_work_item_comments(
    client: &WorkItemClient,
    id: i64,
    project: Option<String>,
) -> Result<String, AdoError> {
    let project = match project {
        Some(p) => p,
        // Resolve the project from the item itself when the caller omitted it.
        None => {
            let item = client.get_work_item(id).await?;
            item.fields.team_project.ok_or_else(|| {
                AdoError::remote(format!("work item {id} does not name its project"))
            })?
        }
    };
    let comments = client.get_comments(&project, id).await?;
    Ok(format_comments(&comments))
}

pub async fn add_work_item_comment(
    client: &WorkItemClient,
    id: i64,
    project: &str,
    text: &str,
) -> Result<String, AdoError> {
    if text.trim().is_empty() {
        return Err(AdoError::validation("text must not be empty"));
    }
    let comment = client.add_comment(project, id, text).await?;
    let body = comment.text.as_deref().unwrap_or(text);
    Ok(format!("Comment added to work item {id}:\n{body}"))
}

pub async fn get_work_item_types(
    client: &WorkItemClient,
    project: &str,
) -> Result<String, AdoError> {
    let types = client.get_work_item_types(project).await?;
    if types.is_empty() {
        return Ok(format!("No work item types found in project {project}."));
    }
    Ok(format_type_table(project, &types))
}

pub async fn get_work_item_type(
    client: &WorkItemClient,
    project: &str,
    type_name: &str,
) -> Result<String, AdoError> {
    let wit = client.get_work_item_type(project, type_name).await?;
    Ok(format_work_item_type(&wit))
}

pub async fn get_work_item_type_fields(
    client: &WorkItemClient,
    project: &str,
    type_name: &str,
) -> Result<String, AdoError> {
    let fields = client.get_work_item_type_fields(project, type_name).await?;
    if fields.is_empty() {
        return Ok(format!(
            "No fields found for work item type '{type_name}' in project {project}."
        ));
    }
    Ok(format_field_table(type_name, &fields))
}

pub async fn get_work_item_type_field(
    client: &WorkItemClient,
    project: &str,
    type_name: &str,
    field_name: &str,
) -> Result<String, AdoError> {
    let field = client
        .get_work_item_type_field(project, type_name, field_name)
        .await?;
    Ok(format_type_field(&field))
}

pub async fn get_work_item_templates(
    client: &WorkItemClient,
    project: &str,
    team: &str,
    work_item_type: Option<&str>,
) -> Result<String, AdoError> {
    let templates = client.get_templates(project, team, work_item_type).await?;
    if templates.is_empty() {
        let filter = work_item_type
            .map(|wit| format!(" for work item type '{wit}'"))
            .unwrap_or_default();
        return Ok(format!("No templates found{filter} in team {team}."));
    }
    Ok(format_template_table(project, team, work_item_type, &templates))
}

pub async fn get_work_item_template(
    client: &WorkItemClient,
    project: &str,
    team: &str,
    template_id: &str,
) -> Result<String, AdoError> {
    let template = client.get_template(project, team, template_id).await?;
    Ok(format_template(&template))
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client(server: &MockServer) -> WorkItemClient {
        WorkItemClient::new(crate::clients::rest::RestChannel::new(
            crate::infra::http::make_http_client(),
            server.base_url(),
            "pat",
        ))
    }

    #[tokio::test]
    async fn empty_query_is_rejected_before_any_request() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST).path("/_apis/wit/wiql");
            then.status(200).json_body(json!({"workItems": []}));
        });
        let err = query_work_items(&client(&server), "   ", 30).await.unwrap_err();
        assert!(matches!(err, AdoError::Validation(_)));
        assert_eq!(m.hits(), 0);
    }

    #[tokio::test]
    async fn empty_query_results_render_the_explanatory_line() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/_apis/wit/wiql");
            then.status(200).json_body(json!({"workItems": []}));
        });
        let out = query_work_items(&client(&server), "SELECT [System.Id] FROM WorkItems", 30)
            .await
            .unwrap();
        assert_eq!(out, "No work items found matching the query.");
    }

    #[tokio::test]
    async fn query_results_preserve_remote_order() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/_apis/wit/wiql");
            then.status(200)
                .json_body(json!({"workItems": [{"id": 2}, {"id": 1}]}));
        });
        server.mock(|when, then| {
            when.method(GET).path("/_apis/wit/workitems");
            then.status(200).json_body(json!({"count": 2, "value": [
                {"id": 2, "fields": {"System.Title": "Second"}},
                {"id": 1, "fields": {"System.Title": "First"}}
            ]}));
        });
        let out = query_work_items(&client(&server), "SELECT [System.Id] FROM WorkItems", 30)
            .await
            .unwrap();
        let second = out.find("# Work Item 2: Second").unwrap();
        let first = out.find("# Work Item 1: First").unwrap();
        assert!(second < first);
        assert!(out.contains("\n\n"));
    }

    #[tokio::test]
    async fn create_sends_a_patch_document_and_formats_the_result() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST)
                .path("/Contoso/_apis/wit/workitems/$Bug")
                .header("content-type", "application/json-patch+json");
            then.status(200).json_body(json!({
                "id": 201,
                "fields": {"System.Title": "New bug", "System.WorkItemType": "Bug"}
            }));
        });
        let out = create_work_item(&client(&server), "Contoso", "Bug", "New bug", None, None)
            .await
            .unwrap();
        m.assert();
        assert!(out.starts_with("# Work Item 201: New bug"));
    }

    #[tokio::test]
    async fn update_rejects_an_empty_field_map_locally() {
        let server = MockServer::start();
        let fields = serde_json::Map::new();
        let err = update_work_item(&client(&server), 1, &fields).await.unwrap_err();
        assert!(matches!(err, AdoError::Validation(_)));
    }

    #[tokio::test]
    async fn update_normalizes_field_names_to_patch_paths() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(httpmock::Method::PATCH)
                .path("/_apis/wit/workitems/42")
                .json_body(json!([
                    {"op": "replace", "path": "/fields/System.State", "value": "Closed"}
                ]));
            then.status(200).json_body(json!({
                "id": 42,
                "fields": {"System.Title": "Done", "System.State": "Closed"}
            }));
        });
        let mut fields = serde_json::Map::new();
        fields.insert("System.State".to_string(), json!("Closed"));
        let out = update_work_item(&client(&server), 42, &fields).await.unwrap();
        m.assert();
        assert!(out.contains("State: Closed"));
    }

    #[tokio::test]
    async fn type_listing_renders_a_table_or_says_none_exist() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET).path("/Contoso/_apis/wit/workitemtypes");
            then.status(200).json_body(json!({"value": [
                {"name": "Bug", "referenceName": "Microsoft.VSTS.WorkItemTypes.Bug"}
            ]}));
        });
        let out = get_work_item_types(&client(&server), "Contoso").await.unwrap();
        m.assert();
        assert!(out.starts_with("# Work Item Types in Project: Contoso"));
        assert!(out.contains("| Bug | Microsoft.VSTS.WorkItemTypes.Bug | N/A |"));

        let empty = MockServer::start();
        empty.mock(|when, then| {
            when.method(GET).path("/Empty/_apis/wit/workitemtypes");
            then.status(200).json_body(json!({"value": []}));
        });
        let out = get_work_item_types(&client(&empty), "Empty").await.unwrap();
        assert_eq!(out, "No work item types found in project Empty.");
    }

    #[tokio::test]
    async fn type_field_listing_requests_the_expanded_view() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET)
                .path("/Contoso/_apis/wit/workitemtypes/Bug/fields")
                .query_param("$expand", "all");
            then.status(200).json_body(json!({"value": [
                {"name": "Title", "referenceName": "System.Title",
                 "type": "string", "alwaysRequired": true}
            ]}));
        });
        let out = get_work_item_type_fields(&client(&server), "Contoso", "Bug")
            .await
            .unwrap();
        m.assert();
        assert!(out.contains("| Title | System.Title | string | Yes | No |"));
    }

    #[tokio::test]
    async fn template_listing_is_team_scoped_and_filterable() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET)
                .path("/Contoso/AppTeam/_apis/wit/templates")
                .query_param("workitemtypename", "Bug");
            then.status(200).json_body(json!({"value": [
                {"id": "t-1", "name": "Standard Bug", "workItemTypeName": "Bug"}
            ]}));
        });
        let out = get_work_item_templates(&client(&server), "Contoso", "AppTeam", Some("Bug"))
            .await
            .unwrap();
        m.assert();
        assert!(out.contains("| Standard Bug | Bug | N/A |"));
    }

    #[tokio::test]
    async fn an_empty_template_listing_names_the_filter_and_team() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/Contoso/App/_apis/wit/templates");
            then.status(200).json_body(json!({"value": []}));
        });
        let out = get_work_item_templates(&client(&server), "Contoso", "App", Some("Bug"))
            .await
            .unwrap();
        assert_eq!(out, "No templates found for work item type 'Bug' in team App.");
    }

    #[tokio::test]
    async fn template_detail_renders_default_field_values() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/Contoso/App/_apis/wit/templates/t-1");
            then.status(200).json_body(json!({
                "id": "t-1",
                "name": "Standard Bug",
                "fields": {"System.Tags": "triage"}
            }));
        });
        let out = get_work_item_template(&client(&server), "Contoso", "App", "t-1")
            .await
            .unwrap();
        assert!(out.starts_with("# Template: Standard Bug"));
        assert!(out.contains("- **System.Tags**: triage"));
    }

    #[tokio::test]
    async fn comments_resolve_the_project_from_the_work_item() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/_apis/wit/workitems/5");
            then.status(200).json_body(json!({
                "id": 5,
                "fields": {"System.TeamProject": "Contoso"}
            }));
        });
        let m = server.mock(|when, then| {
            when.method(GET).path("/Contoso/_apis/wit/workItems/5/comments");
            then.status(200).json_body(json!({"comments": []}));
        });
        let out = get_work_item_comments(&client(&server), 5, None).await.unwrap();
        m.assert();
        assert_eq!(out, "No comments found for this work item.");
    }
}
