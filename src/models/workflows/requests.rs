use crate::models::common::{PaginationQuery, deserialize_optional_i64};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct WorkflowListParams {
    #[serde(flatten)]
    pub pagination: PaginationQuery,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub department_id: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct WorkflowListQuery {
    pub page: u64,
    pub size: u64,
    pub department_id: Option<i64>,
}

impl From<WorkflowListParams> for WorkflowListQuery {
    fn from(params: WorkflowListParams) -> Self {
        Self {
            page: params.pagination.page(),
            size: params.pagination.size(),
            department_id: params.department_id,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateWorkflowRequest {
    pub name: String,
    pub department_id: i64,
    pub steps: Vec<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateWorkflowRequest {
    pub name: Option<String>,
    pub steps: Option<Vec<i64>>,
}
