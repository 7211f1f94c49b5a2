//! Work item tracking client (the `wit` area of the REST API).
//!
//! Field reference names (`System.*`, `Microsoft.VSTS.*`) are mapped onto an
//! explicit optional-field schema instead of a loose field bag, so formatters
//! never probe for attributes at runtime.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::clients::rest::{Collection, RestChannel, API_VERSION};
use crate::clients::{IdentityRef, JsonPatchOp};
use crate::core::error::AdoError;

/// Comments endpoints are still versioned as a preview API.
const COMMENTS_API_VERSION: &str = "7.1-preview.3";

/// Team template endpoints likewise.
const TEMPLATES_API_VERSION: &str = "7.1-preview.1";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WorkItem {
    pub id: i64,
    pub fields: WorkItemFields,
    pub relations: Option<Vec<WorkItemRelation>>,
    #[serde(rename = "_links")]
    pub links: Option<WorkItemLinks>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WorkItemFields {
    #[serde(rename = "System.Title")]
    pub title: Option<String>,
    #[serde(rename = "System.WorkItemType")]
    pub work_item_type: Option<String>,
    #[serde(rename = "System.State")]
    pub state: Option<String>,
    #[serde(rename = "System.TeamProject")]
    pub team_project: Option<String>,
    #[serde(rename = "System.Description")]
    pub description: Option<String>,
    #[serde(rename = "Microsoft.VSTS.Common.AcceptanceCriteria")]
    pub acceptance_criteria: Option<String>,
    #[serde(rename = "Microsoft.VSTS.TCM.ReproSteps")]
    pub repro_steps: Option<String>,
    #[serde(rename = "System.AssignedTo")]
    pub assigned_to: Option<IdentityRef>,
    #[serde(rename = "System.CreatedBy")]
    pub created_by: Option<IdentityRef>,
    #[serde(rename = "System.CreatedDate")]
    pub created_date: Option<String>,
    #[serde(rename = "System.ChangedDate")]
    pub changed_date: Option<String>,
    #[serde(rename = "System.ChangedBy")]
    pub changed_by: Option<IdentityRef>,
    #[serde(rename = "System.IterationPath")]
    pub iteration_path: Option<String>,
    #[serde(rename = "System.AreaPath")]
    pub area_path: Option<String>,
    #[serde(rename = "System.Tags")]
    pub tags: Option<String>,
    #[serde(rename = "Microsoft.VSTS.Common.Priority")]
    pub priority: Option<f64>,
    #[serde(rename = "Microsoft.VSTS.Scheduling.Effort")]
    pub effort: Option<f64>,
    #[serde(rename = "Microsoft.VSTS.Scheduling.StoryPoints")]
    pub story_points: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WorkItemRelation {
    pub rel: Option<String>,
    pub url: Option<String>,
    pub attributes: Option<JsonValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WorkItemLinks {
    pub html: Option<Href>,
    #[serde(rename = "self")]
    pub self_link: Option<Href>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Href {
    pub href: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItemQueryResult {
    #[serde(default)]
    pub work_items: Vec<WorkItemReference>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkItemReference {
    pub id: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkItemComment {
    pub text: Option<String>,
    pub created_by: Option<IdentityRef>,
    pub created_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommentList {
    #[serde(default)]
    comments: Vec<WorkItemComment>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkItemType {
    pub name: Option<String>,
    pub reference_name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<WorkItemIcon>,
    pub is_disabled: Option<bool>,
    #[serde(default)]
    pub states: Vec<WorkItemStateColor>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WorkItemIcon {
    pub id: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkItemStateColor {
    pub name: Option<String>,
    pub color: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkItemTypeField {
    pub name: Option<String>,
    pub reference_name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub field_type: Option<String>,
    pub always_required: Option<bool>,
    pub read_only: Option<bool>,
    #[serde(default)]
    pub allowed_values: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkItemTemplate {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub work_item_type_name: Option<String>,
    #[serde(default)]
    pub fields: serde_json::Map<String, JsonValue>,
}

#[derive(Serialize)]
struct Wiql<'a> {
    query: &'a str,
}

#[derive(Clone)]
pub struct WorkItemClient {
    channel: RestChannel,
}

impl WorkItemClient {
    pub(crate) fn new(channel: RestChannel) -> Self {
        Self { channel }
    }

    pub async fn get_work_item(&self, id: i64) -> Result<WorkItem, AdoError> {
        self.channel
            .get_json(
                &format!("_apis/wit/workitems/{id}"),
                &[
                    ("$expand", "all".into()),
                    ("api-version", API_VERSION.into()),
                ],
            )
            .await
    }

    /// Batch fetch; items the service cannot resolve are omitted, not errors.
    pub async fn get_work_items(&self, ids: &[i64]) -> Result<Vec<WorkItem>, AdoError> {
        let ids_param = ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let list: Collection<WorkItem> = self
            .channel
            .get_json(
                "_apis/wit/workitems",
                &[
                    ("ids", ids_param),
                    ("$expand", "all".into()),
                    ("errorPolicy", "omit".into()),
                    ("api-version", API_VERSION.into()),
                ],
            )
            .await?;
        Ok(list.value)
    }

    pub async fn query_by_wiql(
        &self,
        query: &str,
        top: u32,
    ) -> Result<Vec<WorkItemReference>, AdoError> {
        let result: WorkItemQueryResult = self
            .channel
            .post_json(
                "_apis/wit/wiql",
                &[
                    ("$top", top.to_string()),
                    ("api-version", API_VERSION.into()),
                ],
                &Wiql { query },
            )
            .await?;
        Ok(result.work_items)
    }

    pub async fn create_work_item(
        &self,
        project: &str,
        work_item_type: &str,
        document: &[JsonPatchOp],
    ) -> Result<WorkItem, AdoError> {
        self.channel
            .post_patch_document(
                &format!("{project}/_apis/wit/workitems/${work_item_type}"),
                &[("api-version", API_VERSION.into())],
                document,
            )
            .await
    }

    pub async fn update_work_item(
        &self,
        id: i64,
        document: &[JsonPatchOp],
    ) -> Result<WorkItem, AdoError> {
        self.channel
            .patch_patch_document(
                &format!("_apis/wit/workitems/{id}"),
                &[("api-version", API_VERSION.into())],
                document,
            )
            .await
    }

    pub async fn get_comments(
        &self,
        project: &str,
        id: i64,
    ) -> Result<Vec<WorkItemComment>, AdoError> {
        let list: CommentList = self
            .channel
            .get_json(
                &format!("{project}/_apis/wit/workItems/{id}/comments"),
                &[("api-version", COMMENTS_API_VERSION.into())],
            )
            .await?;
        Ok(list.comments)
    }

    pub async fn get_work_item_types(&self, project: &str) -> Result<Vec<WorkItemType>, AdoError> {
        let list: Collection<WorkItemType> = self
            .channel
            .get_json(
                &format!("{project}/_apis/wit/workitemtypes"),
                &[("api-version", API_VERSION.into())],
            )
            .await?;
        Ok(list.value)
    }

    pub async fn get_work_item_type(
        &self,
        project: &str,
        type_name: &str,
    ) -> Result<WorkItemType, AdoError> {
        self.channel
            .get_json(
                &format!("{project}/_apis/wit/workitemtypes/{type_name}"),
                &[("api-version", API_VERSION.into())],
            )
            .await
    }

    pub async fn get_work_item_type_fields(
        &self,
        project: &str,
        type_name: &str,
    ) -> Result<Vec<WorkItemTypeField>, AdoError> {
        let list: Collection<WorkItemTypeField> = self
            .channel
            .get_json(
                &format!("{project}/_apis/wit/workitemtypes/{type_name}/fields"),
                &[
                    ("$expand", "all".into()),
                    ("api-version", API_VERSION.into()),
                ],
            )
            .await?;
        Ok(list.value)
    }

    pub async fn get_work_item_type_field(
        &self,
        project: &str,
        type_name: &str,
        field_name: &str,
    ) -> Result<WorkItemTypeField, AdoError> {
        self.channel
            .get_json(
                &format!("{project}/_apis/wit/workitemtypes/{type_name}/fields/{field_name}"),
                &[
                    ("$expand", "all".into()),
                    ("api-version", API_VERSION.into()),
                ],
            )
            .await
    }

    /// Templates are scoped to a team, not just a project.
    pub async fn get_templates(
        &self,
        project: &str,
        team: &str,
        work_item_type: Option<&str>,
    ) -> Result<Vec<WorkItemTemplate>, AdoError> {
        let mut query: Vec<(&str, String)> = vec![("api-version", TEMPLATES_API_VERSION.into())];
        if let Some(wit) = work_item_type {
            query.push(("workitemtypename", wit.to_string()));
        }
        let list: Collection<WorkItemTemplate> = self
            .channel
            .get_json(&format!("{project}/{team}/_apis/wit/templates"), &query)
            .await?;
        Ok(list.value)
    }

    pub async fn get_template(
        &self,
        project: &str,
        team: &str,
        template_id: &str,
    ) -> Result<WorkItemTemplate, AdoError> {
        self.channel
            .get_json(
                &format!("{project}/{team}/_apis/wit/templates/{template_id}"),
                &[("api-version", TEMPLATES_API_VERSION.into())],
            )
            .await
    }

    pub async fn add_comment(
        &self,
        project: &str,
        id: i64,
        text: &str,
    ) -> Result<WorkItemComment, AdoError> {
        #[derive(Serialize)]
        struct NewComment<'a> {
            text: &'a str,
        }
        self.channel
            .post_json(
                &format!("{project}/_apis/wit/workItems/{id}/comments"),
                &[("api-version", COMMENTS_API_VERSION.into())],
                &NewComment { text },
            )
            .await
    }
}
