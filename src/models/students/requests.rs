use crate::models::common::{PaginationQuery, deserialize_optional_i64};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct StudentListParams {
    #[serde(flatten)]
    pub pagination: PaginationQuery,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub department_id: Option<i64>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct StudentListQuery {
    pub page: u64,
    pub size: u64,
    pub department_id: Option<i64>,
    pub search: Option<String>,
}

impl From<StudentListParams> for StudentListQuery {
    fn from(params: StudentListParams) -> Self {
        Self {
            page: params.pagination.page(),
            size: params.pagination.size(),
            department_id: params.department_id,
            search: params.search,
        }
    }
}

// 创建学生（同时创建登录账号）
#[derive(Debug, Deserialize)]
pub struct CreateStudentRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub department_id: i64,
    pub matric_number: String,
    pub level: i32,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateStudentRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub department_id: Option<i64>,
    pub level: Option<i32>,
}
