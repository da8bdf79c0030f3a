use super::entities::Staff;
use crate::models::common::PaginationInfo;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct StaffListResponse {
    pub items: Vec<Staff>,
    pub pagination: PaginationInfo,
}

/// 教职工仪表盘统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StaffStatistics {
    /// 当前分配给我的文档总数
    pub assigned_total: u64,
    pub pending: u64,
    pub in_review: u64,
    /// 我执行过的通过/转交次数
    pub approved: u64,
    /// 我执行过的驳回/退回次数
    pub rejected: u64,
    pub changes_requested: u64,
}
