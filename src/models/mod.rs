pub mod auth;
pub mod common;
pub mod departments;
pub mod documents;
pub mod files;
pub mod groups;
pub mod notifications;
pub mod staff;
pub mod students;
pub mod users;
pub mod workflows;

pub use common::{ApiResponse, ErrorCode, PaginationInfo, PaginationQuery};

/// 程序启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}
