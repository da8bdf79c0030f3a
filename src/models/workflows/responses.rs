use super::entities::Workflow;
use crate::models::common::PaginationInfo;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct WorkflowListResponse {
    pub items: Vec<Workflow>,
    pub pagination: PaginationInfo,
}
