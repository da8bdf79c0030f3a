//! SeaORM 实体定义
//!
//! 这些实体用于数据库操作，与 models 模块中的业务实体分离。
//! Storage 层使用这些实体进行 CRUD 操作，然后转换为 models 中的业务实体。

pub mod prelude;

pub mod departments;
pub mod document_actions;
pub mod documents;
pub mod files;
pub mod groups;
pub mod notifications;
pub mod staff;
pub mod students;
pub mod user_settings;
pub mod users;
pub mod workflows;

/// 数据库中的时间均为 Unix 秒；超出范围的值读作纪元时间
pub(crate) fn timestamp(secs: i64) -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::from_timestamp(secs, 0).unwrap_or_default()
}
