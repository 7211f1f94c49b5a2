//! Rendering for work items, their comments, and the type metadata family.

use crate::clients::work_items::{
    WorkItem, WorkItemComment, WorkItemRelation, WorkItemTemplate, WorkItemType,
    WorkItemTypeField,
};
use crate::clients::IdentityRef;
use crate::core::format::{join_blocks, Block};

/// One person, rendered as `Display Name (unique@name)` with either half
/// optional. `None` when the identity carries no usable name at all.
pub fn identity_label(identity: &IdentityRef) -> Option<String> {
    match (&identity.display_name, &identity.unique_name) {
        (Some(d), Some(u)) => Some(format!("{d} ({u})")),
        (Some(d), None) => Some(d.clone()),
        (None, Some(u)) => Some(u.clone()),
        (None, None) => None,
    }
}

pub fn format_work_item(item: &WorkItem) -> String {
    let f = &item.fields;
    let title = f.title.as_deref().unwrap_or("Untitled");

    let mut block = Block::new(format!("# Work Item {}: {}", item.id, title))
        .field("Type", f.work_item_type.as_deref())
        .field("State", f.state.as_deref())
        .field("Project", f.team_project.as_deref())
        .field(
            "Web URL",
            item.links
                .as_ref()
                .and_then(|l| l.html.as_ref())
                .map(|h| h.href.as_str()),
        )
        .section("Description", f.description.as_deref())
        .section("Acceptance Criteria", f.acceptance_criteria.as_deref())
        .section("Repro Steps", f.repro_steps.as_deref())
        .heading("Additional Details")
        .field(
            "Assigned To",
            f.assigned_to.as_ref().and_then(identity_label),
        )
        .field(
            "Created By",
            f.created_by
                .as_ref()
                .and_then(|id| id.display_name.as_deref()),
        )
        .field("Created Date", f.created_date.as_deref());

    // ChangedBy only makes sense alongside ChangedDate.
    if let Some(changed_date) = &f.changed_date {
        let by = f
            .changed_by
            .as_ref()
            .and_then(|id| id.display_name.as_deref());
        block = match by {
            Some(name) => block.line(format!("Last updated {changed_date} by {name}")),
            None => block.line(format!("Last updated: {changed_date}")),
        };
    }

    block = block
        .field("Iteration", f.iteration_path.as_deref())
        .field("Area", f.area_path.as_deref())
        .field("Tags", f.tags.as_deref().filter(|t| !t.is_empty()))
        .field("Priority", f.priority)
        .field("Effort", f.effort)
        .field("Story Points", f.story_points);

    if let Some(relations) = item.relations.as_ref().filter(|r| !r.is_empty()) {
        block = block.heading("Related Items");
        for relation in relations {
            block = block.item(relation_label(relation));
        }
    }

    block.render()
}

fn relation_label(relation: &WorkItemRelation) -> String {
    let rel = relation.rel.as_deref().unwrap_or("Unknown relation");
    let url = relation.url.as_deref().unwrap_or("Unknown URL");

    let mut link_text = url.to_string();
    if url.to_lowercase().contains("workitem") {
        if let Some(id) = url.rsplit('/').next().filter(|s| {
            !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
        }) {
            link_text = format!("Work Item #{id}");
        }
    }

    let comment = relation
        .attributes
        .as_ref()
        .and_then(|a| a.get("comment"))
        .and_then(|c| c.as_str())
        .filter(|c| !c.is_empty())
        .map(|c| format!(" - Comment: {c}"))
        .unwrap_or_default();

    format!("{rel}: {link_text}{comment}")
}

pub fn format_comments(comments: &[WorkItemComment]) -> String {
    if comments.is_empty() {
        return "No comments found for this work item.".to_string();
    }
    join_blocks(comments.iter().map(|comment| {
        let author = comment
            .created_by
            .as_ref()
            .and_then(|id| id.display_name.clone())
            .unwrap_or_else(|| "Unknown".to_string());
        let when = comment
            .created_date
            .as_deref()
            .map(|d| format!(" on {d}"))
            .unwrap_or_default();
        let text = comment.text.as_deref().unwrap_or("No text");
        format!("## Comment by {author}{when}:\n{text}")
    }))
}

/// Overview table of every type in a project.
pub fn format_type_table(project: &str, types: &[WorkItemType]) -> String {
    let mut lines = vec![
        format!("# Work Item Types in Project: {project}\n"),
        "| Name | Reference Name | Description |".to_string(),
        "| ---- | -------------- | ----------- |".to_string(),
    ];
    for wit in types {
        lines.push(format!(
            "| {} | {} | {} |",
            wit.name.as_deref().unwrap_or("N/A"),
            wit.reference_name.as_deref().unwrap_or("N/A"),
            wit.description.as_deref().unwrap_or("N/A"),
        ));
    }
    lines.join("\n")
}

pub fn format_work_item_type(wit: &WorkItemType) -> String {
    let name = wit.name.as_deref().unwrap_or("Unknown");
    let mut block = Block::new(format!("# Work Item Type: {name}"))
        .field("Description", wit.description.as_deref())
        .field("Reference Name", wit.reference_name.as_deref())
        .field("Color", wit.color.as_deref())
        .field(
            "Icon",
            wit.icon.as_ref().and_then(|i| i.id.as_deref()),
        )
        .field("Is Disabled", wit.is_disabled);
    if !wit.states.is_empty() {
        block = block.heading("States");
        for state in &wit.states {
            block = block.item(format!(
                "**{}** (Category: {}, Color: {})",
                state.name.as_deref().unwrap_or("Unknown"),
                state.category.as_deref().unwrap_or("N/A"),
                state.color.as_deref().unwrap_or("N/A"),
            ));
        }
    }
    block.render()
}

/// Overview table of every field on a type.
pub fn format_field_table(type_name: &str, fields: &[WorkItemTypeField]) -> String {
    let mut lines = vec![
        format!("# Fields for Work Item Type: {type_name}\n"),
        "| Name | Reference Name | Type | Required | Read Only |".to_string(),
        "| ---- | -------------- | ---- | -------- | --------- |".to_string(),
    ];
    for field in fields {
        lines.push(format!(
            "| {} | {} | {} | {} | {} |",
            field.name.as_deref().unwrap_or("N/A"),
            field.reference_name.as_deref().unwrap_or("N/A"),
            field.field_type.as_deref().unwrap_or("N/A"),
            yes_no(field.always_required),
            yes_no(field.read_only),
        ));
    }
    lines.join("\n")
}

fn yes_no(flag: Option<bool>) -> &'static str {
    if flag.unwrap_or(false) {
        "Yes"
    } else {
        "No"
    }
}

pub fn format_type_field(field: &WorkItemTypeField) -> String {
    let name = field.name.as_deref().unwrap_or("Unknown");
    let mut block = Block::new(format!("# Field: {name}"))
        .field("Reference Name", field.reference_name.as_deref())
        .field("Description", field.description.as_deref())
        .field("Type", field.field_type.as_deref())
        .field("Read Only", field.read_only)
        .field("Required", field.always_required);
    if !field.allowed_values.is_empty() {
        block = block.heading("Allowed Values");
        for value in &field.allowed_values {
            match value.as_str() {
                Some(s) => block = block.item(s),
                None => block = block.item(value),
            }
        }
    }
    block.render()
}

/// Overview table of the templates defined for a team.
pub fn format_template_table(
    project: &str,
    team: &str,
    work_item_type: Option<&str>,
    templates: &[WorkItemTemplate],
) -> String {
    let mut heading =
        format!("# Work Item Templates for Team: {team} (Project: {project})");
    if let Some(wit) = work_item_type {
        heading.push_str(&format!(" (Filtered by type: {wit})"));
    }
    heading.push('\n');
    let mut lines = vec![
        heading,
        "| Name | Work Item Type | Description |".to_string(),
        "| ---- | -------------- | ----------- |".to_string(),
    ];
    for template in templates {
        lines.push(format!(
            "| {} | {} | {} |",
            template.name.as_deref().unwrap_or("N/A"),
            template.work_item_type_name.as_deref().unwrap_or("N/A"),
            template.description.as_deref().unwrap_or("N/A"),
        ));
    }
    lines.join("\n")
}

pub fn format_template(template: &WorkItemTemplate) -> String {
    let name = template.name.as_deref().unwrap_or("Unknown");
    let mut block = Block::new(format!("# Template: {name}"))
        .field("Description", template.description.as_deref())
        .field(
            "Work Item Type",
            template.work_item_type_name.as_deref(),
        )
        .field("ID", template.id.as_deref());
    if !template.fields.is_empty() {
        block = block.heading("Default Field Values");
        for (field, value) in &template.fields {
            match value.as_str() {
                Some(s) => block = block.item(format!("**{field}**: {s}")),
                None => block = block.item(format!("**{field}**: {value}")),
            }
        }
    }
    block.render()
}
