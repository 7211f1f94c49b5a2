//! Implementation functions for project tools, formatters included.

use crate::clients::core_api::{CoreClient, Operation, ProjectCreateRequest, TeamProjectReference};
use crate::core::error::AdoError;
use crate::core::format::{join_blocks, none_found, Block};
use crate::core::params::one_of;

const SOURCE_CONTROL_TYPES: &[&str] = &["Git", "Tfvc"];
const VISIBILITIES: &[&str] = &["private", "public"];

fn format_project(project: &TeamProjectReference) -> String {
    let name = project.name.as_deref().unwrap_or("Unnamed");
    Block::new(format!("# Project: {name}"))
        .field("ID", project.id.as_deref())
        .field("Description", project.description.as_deref())
        .field("State", project.state.as_deref())
        .field("Visibility", project.visibility.as_deref())
        .field("URL", project.url.as_deref())
        .field("Last Updated", project.last_update_time.as_deref())
        .render()
}

pub async fn get_projects(
    client: &CoreClient,
    state_filter: Option<&str>,
    top: Option<u32>,
) -> Result<String, AdoError> {
    let projects = client.get_projects(state_filter, top).await?;
    if projects.is_empty() {
        return Ok(none_found("projects"));
    }
    Ok(join_blocks(projects.iter().map(format_project)))
}

pub async fn create_project(
    client: &CoreClient,
    name: &str,
    description: Option<String>,
    source_control_type: &str,
    process_template_id: Option<&str>,
    visibility: &str,
) -> Result<String, AdoError> {
    if name.trim().is_empty() {
        return Err(AdoError::validation("name must not be empty"));
    }
    one_of("source_control_type", source_control_type, SOURCE_CONTROL_TYPES)?;
    one_of("visibility", visibility, VISIBILITIES)?;

    // Creation queues server-side work; a denied caller gets a clear message
    // up front instead of a stuck operation.
    if let Err(err) = client.get_projects(None, Some(1)).await {
        let msg = err.to_string().to_lowercase();
        if msg.contains("authorized") || msg.contains("permission") {
            return Err(AdoError::Client(
                "You do not have permission to create projects in this organization. \
                 Please contact your Azure DevOps administrator for assistance."
                    .into(),
            ));
        }
    }

    let request = ProjectCreateRequest::new(
        name.to_string(),
        description,
        source_control_type,
        process_template_id,
        visibility.to_lowercase(),
    );
    let operation = client.queue_create_project(&request).await?;

    Ok(Block::new(format!("# Project Creation Initiated: {name}"))
        .line("")
        .line("The project creation has been queued in Azure DevOps.")
        .line("")
        .line("**Operation Details:**")
        .field("- Operation ID", operation.id.as_deref())
        .field("- Status", operation.status.as_deref())
        .field("- Status URL", operation.url.as_deref())
        .line("")
        .line(
            "Project creation may take a few minutes to complete. You can check the \
             status using the `check_project_creation_status` tool with the Operation ID.",
        )
        .render())
}

pub async fn check_project_creation_status(
    client: &CoreClient,
    operation_id: &str,
) -> Result<String, AdoError> {
    if operation_id.trim().is_empty() {
        return Err(AdoError::validation("operation_id must not be empty"));
    }
    let operation = client.get_operation(operation_id).await?;
    Ok(format_operation(&operation))
}

fn format_operation(operation: &Operation) -> String {
    let status = operation.status.as_deref().unwrap_or("unknown");
    let mut block = Block::new(format!("# Operation Status: {status}"))
        .line("")
        .line("**Operation Details:**")
        .field("- Operation ID", operation.id.as_deref())
        .field("- Status", operation.status.as_deref())
        .field("- Created", operation.created_date.as_deref())
        .field("- Modified", operation.last_modified_date.as_deref())
        .field("- URL", operation.url.as_deref());

    if let Some(message) = operation.detailed_message.as_deref() {
        block = block.line("").line(format!("**Completion Message:** {message}"));
    }

    let guidance = match status.to_lowercase().as_str() {
        "succeeded" => Some(
            "The project has been successfully created. You can now use it in Azure DevOps.",
        ),
        "failed" => Some(
            "The project creation has failed. Please check the completion message for \
             details or contact your Azure DevOps administrator.",
        ),
        "inprogress" | "in progress" => Some(
            "The project creation is still in progress. Please check again later using \
             this tool with the same operation ID.",
        ),
        _ => None,
    };
    if let Some(guidance) = guidance {
        block = block.line("").line(guidance);
    }
    block.render()
}

pub async fn get_process_templates(client: &CoreClient) -> Result<String, AdoError> {
    let templates = client.get_processes().await?;
    if templates.is_empty() {
        return Ok(none_found("process templates"));
    }
    let mut block = Block::new("# Available Process Templates")
        .line("")
        .line(
            "Use these templates when creating projects with the `create_project` tool \
             by specifying the process_template_id parameter.",
        )
        .line("");
    for template in &templates {
        let name = template.name.as_deref().unwrap_or("Unnamed");
        let id = template.id.as_deref().unwrap_or("unknown");
        let line = match template.description.as_deref() {
            Some(description) => format!("**{name}**: {id} ({description})"),
            None => format!("**{name}**: {id}"),
        };
        block = block.item(line);
    }
    Ok(block.render())
}
