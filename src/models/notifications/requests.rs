use crate::models::common::{PaginationQuery, deserialize_optional_bool};
use serde::Deserialize;

/// 通知列表查询参数
#[derive(Debug, Deserialize)]
pub struct NotificationListParams {
    #[serde(flatten)]
    pub pagination: PaginationQuery,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub unread_only: Option<bool>,
}

/// 存储层通知查询
#[derive(Debug, Clone, Default)]
pub struct NotificationListQuery {
    pub page: u64,
    pub size: u64,
    pub unread_only: bool,
}

impl From<NotificationListParams> for NotificationListQuery {
    fn from(params: NotificationListParams) -> Self {
        Self {
            page: params.pagination.page(),
            size: params.pagination.size(),
            unread_only: params.unread_only.unwrap_or(false),
        }
    }
}

/// 服务内部创建通知
#[derive(Debug, Clone)]
pub struct CreateNotificationRequest {
    pub user_id: i64,
    pub title: String,
    pub content: String,
}
