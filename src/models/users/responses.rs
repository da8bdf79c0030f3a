use super::entities::User;
use crate::models::common::PaginationInfo;
use crate::models::staff::entities::Staff;
use crate::models::students::entities::Student;
use serde::Serialize;

// 用户响应
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: User,
}

/// 管理员查看的用户详情，附带教职工或学生档案
#[derive(Debug, Serialize)]
pub struct UserDetailResponse {
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staff: Option<Staff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<Student>,
}

// 用户列表响应
#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub items: Vec<User>,
    pub pagination: PaginationInfo,
}

/// 管理员仪表盘统计
#[derive(Debug, Serialize)]
pub struct UserStatsResponse {
    pub users: u64,
    pub admins: u64,
    pub staff: u64,
    pub students: u64,
    pub documents: u64,
}
