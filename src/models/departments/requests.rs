use crate::models::common::{PaginationQuery, deserialize_optional_i64};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct DepartmentListParams {
    #[serde(flatten)]
    pub pagination: PaginationQuery,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub group_id: Option<i64>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DepartmentListQuery {
    pub page: u64,
    pub size: u64,
    pub group_id: Option<i64>,
    pub search: Option<String>,
}

impl From<DepartmentListParams> for DepartmentListQuery {
    fn from(params: DepartmentListParams) -> Self {
        Self {
            page: params.pagination.page(),
            size: params.pagination.size(),
            group_id: params.group_id,
            search: params.search,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateDepartmentRequest {
    pub group_id: i64,
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateDepartmentRequest {
    pub group_id: Option<i64>,
    pub name: Option<String>,
}
