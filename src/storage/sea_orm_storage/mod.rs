//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod departments;
mod documents;
mod files;
mod groups;
mod notifications;
mod staff;
mod students;
mod users;
mod workflows;

use crate::config::AppConfig;
use crate::errors::{Result, UniAdminError};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// 把 `DbErr` 包装为带操作说明的数据库错误
fn db_err(action: &'static str) -> impl Fn(sea_orm::DbErr) -> UniAdminError {
    move |e| UniAdminError::database_operation(format!("{action}: {e}"))
}

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 按全局配置创建 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        Self::connect(
            &config.database.url,
            config.database.pool_size,
            config.database.timeout,
        )
        .await
    }

    /// 连接数据库并运行迁移
    pub async fn connect(url: &str, pool_size: u32, timeout: u64) -> Result<Self> {
        let db_url = normalize_database_url(url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite:") {
            Self::connect_sqlite(&db_url, pool_size, timeout).await?
        } else {
            Self::connect_generic(&db_url, pool_size, timeout).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| UniAdminError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库类型: {}", redact_database_url(&db_url));

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, pool_size: u32, timeout: u64) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| UniAdminError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory")
            .pragma("mmap_size", "536870912")
            .pragma("wal_autocheckpoint", "1000");

        // 内存数据库每个连接各自独立，只能使用单连接
        let in_memory = url.contains(":memory:") || url.contains("mode=memory");
        let pool_size = if in_memory { 1 } else { pool_size };

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(timeout))
            .idle_timeout((!in_memory).then(|| Duration::from_secs(300)))
            .max_lifetime((!in_memory).then(|| Duration::from_secs(1800)))
            .connect_with(opt)
            .await
            .map_err(|e| UniAdminError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, pool_size: u32, timeout: u64) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(pool_size)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(timeout))
            .acquire_timeout(Duration::from_secs(timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| UniAdminError::database_connection(format!("无法连接到数据库: {e}")))
    }
}

/// 补全数据库 URL：裸文件路径按 SQLite 处理
fn normalize_database_url(url: &str) -> Result<String> {
    const SERVER_SCHEMES: [&str; 4] = ["postgres://", "postgresql://", "mysql://", "mariadb://"];

    if url.starts_with("sqlite:") || SERVER_SCHEMES.iter().any(|s| url.starts_with(s)) {
        Ok(url.to_string())
    } else if url == ":memory:" {
        Ok("sqlite::memory:".to_string())
    } else if url.ends_with(".db") || url.ends_with(".sqlite") {
        Ok(format!("sqlite://{url}?mode=rwc"))
    } else {
        Err(UniAdminError::database_config(format!(
            "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
        )))
    }
}

/// 日志中只输出 scheme
fn redact_database_url(url: &str) -> &str {
    url.split_once("://")
        .map(|(scheme, _)| scheme)
        .or_else(|| url.split_once(':').map(|(scheme, _)| scheme))
        .unwrap_or("unknown")
}

// Storage trait 实现
use crate::models::{
    departments::{
        entities::Department,
        requests::{CreateDepartmentRequest, DepartmentListQuery, UpdateDepartmentRequest},
        responses::DepartmentListResponse,
    },
    documents::{
        entities::{Document, DocumentAction, DocumentState},
        requests::{CreateDocumentRequest, DocumentChanges, DocumentListQuery},
        responses::DocumentListResponse,
        transitions::Transition,
    },
    files::entities::File,
    groups::{
        entities::Group,
        requests::{CreateGroupRequest, GroupListQuery, UpdateGroupRequest},
        responses::GroupListResponse,
    },
    notifications::{
        entities::Notification,
        requests::{CreateNotificationRequest, NotificationListQuery},
        responses::NotificationListResponse,
    },
    staff::{
        entities::Staff,
        requests::{CreateStaffRequest, StaffListQuery, UpdateStaffRequest},
        responses::{StaffListResponse, StaffStatistics},
    },
    students::{
        entities::Student,
        requests::{CreateStudentRequest, StudentListQuery, UpdateStudentRequest},
        responses::StudentListResponse,
    },
    users::{
        entities::{User, UserRole, UserSettings},
        requests::{CreateUserRequest, UpdateUserRequest, UserListQuery},
        responses::UserListResponse,
    },
    workflows::{
        entities::Workflow,
        requests::{CreateWorkflowRequest, UpdateWorkflowRequest, WorkflowListQuery},
        responses::WorkflowListResponse,
    },
};
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.get_user_by_email_impl(email).await
    }

    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse> {
        self.list_users_with_pagination_impl(query).await
    }

    async fn update_user(&self, id: i64, update: UpdateUserRequest) -> Result<Option<User>> {
        self.update_user_impl(id, update).await
    }

    async fn delete_user(&self, id: i64) -> Result<bool> {
        self.delete_user_impl(id).await
    }

    async fn update_last_login(&self, id: i64) -> Result<bool> {
        self.update_last_login_impl(id).await
    }

    async fn count_users(&self) -> Result<u64> {
        self.count_users_impl().await
    }

    async fn count_users_by_role(&self, role: UserRole) -> Result<u64> {
        self.count_users_by_role_impl(role).await
    }

    async fn save_reset_token(&self, id: i64, token: &str, expires_at: i64) -> Result<bool> {
        self.save_reset_token_impl(id, token, expires_at).await
    }

    async fn save_password(&self, id: i64, password_hash: &str) -> Result<bool> {
        self.save_password_impl(id, password_hash).await
    }

    async fn get_user_settings(&self, user_id: i64) -> Result<Option<UserSettings>> {
        self.get_user_settings_impl(user_id).await
    }

    // 学院模块
    async fn create_group(&self, group: CreateGroupRequest) -> Result<Group> {
        self.create_group_impl(group).await
    }

    async fn get_group_by_id(&self, id: i64) -> Result<Option<Group>> {
        self.get_group_by_id_impl(id).await
    }

    async fn list_groups_with_pagination(
        &self,
        query: GroupListQuery,
    ) -> Result<GroupListResponse> {
        self.list_groups_with_pagination_impl(query).await
    }

    async fn update_group(&self, id: i64, update: UpdateGroupRequest) -> Result<Option<Group>> {
        self.update_group_impl(id, update).await
    }

    async fn delete_group(&self, id: i64) -> Result<bool> {
        self.delete_group_impl(id).await
    }

    // 院系模块
    async fn create_department(&self, department: CreateDepartmentRequest) -> Result<Department> {
        self.create_department_impl(department).await
    }

    async fn get_department_by_id(&self, id: i64) -> Result<Option<Department>> {
        self.get_department_by_id_impl(id).await
    }

    async fn list_departments_with_pagination(
        &self,
        query: DepartmentListQuery,
    ) -> Result<DepartmentListResponse> {
        self.list_departments_with_pagination_impl(query).await
    }

    async fn update_department(
        &self,
        id: i64,
        update: UpdateDepartmentRequest,
    ) -> Result<Option<Department>> {
        self.update_department_impl(id, update).await
    }

    async fn delete_department(&self, id: i64) -> Result<bool> {
        self.delete_department_impl(id).await
    }

    // 教职工模块
    async fn create_staff(&self, staff: CreateStaffRequest) -> Result<Staff> {
        self.create_staff_impl(staff).await
    }

    async fn get_staff_by_id(&self, id: i64) -> Result<Option<Staff>> {
        self.get_staff_by_id_impl(id).await
    }

    async fn get_staff_by_user_id(&self, user_id: i64) -> Result<Option<Staff>> {
        self.get_staff_by_user_id_impl(user_id).await
    }

    async fn list_staff_with_pagination(
        &self,
        query: StaffListQuery,
    ) -> Result<StaffListResponse> {
        self.list_staff_with_pagination_impl(query).await
    }

    async fn update_staff(&self, id: i64, update: UpdateStaffRequest) -> Result<Option<Staff>> {
        self.update_staff_impl(id, update).await
    }

    async fn delete_staff(&self, id: i64) -> Result<bool> {
        self.delete_staff_impl(id).await
    }

    async fn count_staff(&self) -> Result<u64> {
        self.count_staff_impl().await
    }

    // 学生模块
    async fn create_student(&self, student: CreateStudentRequest) -> Result<Student> {
        self.create_student_impl(student).await
    }

    async fn get_student_by_id(&self, id: i64) -> Result<Option<Student>> {
        self.get_student_by_id_impl(id).await
    }

    async fn get_student_by_user_id(&self, user_id: i64) -> Result<Option<Student>> {
        self.get_student_by_user_id_impl(user_id).await
    }

    async fn get_student_by_matric_number(&self, matric_number: &str) -> Result<Option<Student>> {
        self.get_student_by_matric_number_impl(matric_number).await
    }

    async fn list_students_with_pagination(
        &self,
        query: StudentListQuery,
    ) -> Result<StudentListResponse> {
        self.list_students_with_pagination_impl(query).await
    }

    async fn update_student(
        &self,
        id: i64,
        update: UpdateStudentRequest,
    ) -> Result<Option<Student>> {
        self.update_student_impl(id, update).await
    }

    async fn delete_student(&self, id: i64) -> Result<bool> {
        self.delete_student_impl(id).await
    }

    async fn count_students(&self) -> Result<u64> {
        self.count_students_impl().await
    }

    // 审批流程模块
    async fn create_workflow(
        &self,
        workflow: CreateWorkflowRequest,
        created_by: i64,
    ) -> Result<Workflow> {
        self.create_workflow_impl(workflow, created_by).await
    }

    async fn get_workflow_by_id(&self, id: i64) -> Result<Option<Workflow>> {
        self.get_workflow_by_id_impl(id).await
    }

    async fn list_workflows_with_pagination(
        &self,
        query: WorkflowListQuery,
    ) -> Result<WorkflowListResponse> {
        self.list_workflows_with_pagination_impl(query).await
    }

    async fn update_workflow(
        &self,
        id: i64,
        update: UpdateWorkflowRequest,
    ) -> Result<Option<Workflow>> {
        self.update_workflow_impl(id, update).await
    }

    async fn delete_workflow(&self, id: i64) -> Result<bool> {
        self.delete_workflow_impl(id).await
    }

    // 文档模块
    async fn create_document(
        &self,
        document: CreateDocumentRequest,
        actor_id: i64,
    ) -> Result<Document> {
        self.create_document_impl(document, actor_id).await
    }

    async fn get_document_by_id(&self, id: i64) -> Result<Option<Document>> {
        self.get_document_by_id_impl(id).await
    }

    async fn list_documents_with_pagination(
        &self,
        query: DocumentListQuery,
    ) -> Result<DocumentListResponse> {
        self.list_documents_with_pagination_impl(query).await
    }

    async fn update_document_content(
        &self,
        id: i64,
        expected: DocumentState,
        changes: DocumentChanges,
        actor_id: i64,
    ) -> Result<Option<Document>> {
        self.update_document_content_impl(id, expected, changes, actor_id)
            .await
    }

    async fn apply_document_transition(
        &self,
        id: i64,
        transition: Transition,
        changes: DocumentChanges,
        actor_id: i64,
    ) -> Result<Document> {
        self.apply_document_transition_impl(id, transition, changes, actor_id)
            .await
    }

    async fn delete_document(&self, id: i64) -> Result<bool> {
        self.delete_document_impl(id).await
    }

    async fn list_document_actions(&self, document_id: i64) -> Result<Vec<DocumentAction>> {
        self.list_document_actions_impl(document_id).await
    }

    async fn get_staff_statistics(&self, staff_id: i64, user_id: i64) -> Result<StaffStatistics> {
        self.get_staff_statistics_impl(staff_id, user_id).await
    }

    async fn count_documents(&self) -> Result<u64> {
        self.count_documents_impl().await
    }

    // 通知模块
    async fn create_notification(&self, req: CreateNotificationRequest) -> Result<Notification> {
        self.create_notification_impl(req).await
    }

    async fn list_notifications_with_pagination(
        &self,
        user_id: i64,
        query: NotificationListQuery,
    ) -> Result<NotificationListResponse> {
        self.list_notifications_with_pagination_impl(user_id, query)
            .await
    }

    async fn get_unread_notification_count(&self, user_id: i64) -> Result<i64> {
        self.get_unread_notification_count_impl(user_id).await
    }

    async fn mark_notification_as_read(&self, user_id: i64, id: i64) -> Result<bool> {
        self.mark_notification_as_read_impl(user_id, id).await
    }

    async fn mark_all_notifications_as_read(&self, user_id: i64) -> Result<i64> {
        self.mark_all_notifications_as_read_impl(user_id).await
    }

    async fn delete_notification(&self, user_id: i64, id: i64) -> Result<bool> {
        self.delete_notification_impl(user_id, id).await
    }

    // 文件模块
    async fn create_file(
        &self,
        download_token: &str,
        original_name: &str,
        stored_name: &str,
        file_size: i64,
        file_type: &str,
        user_id: Option<i64>,
    ) -> Result<File> {
        self.create_file_impl(
            download_token,
            original_name,
            stored_name,
            file_size,
            file_type,
            user_id,
        )
        .await
    }

    async fn get_file_by_token(&self, token: &str) -> Result<Option<File>> {
        self.get_file_by_token_impl(token).await
    }

    async fn delete_file(&self, token: &str) -> Result<bool> {
        self.delete_file_impl(token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_database_url() {
        assert_eq!(normalize_database_url(":memory:").unwrap(), "sqlite::memory:");
        assert_eq!(
            normalize_database_url("data/uniadmin.db").unwrap(),
            "sqlite://data/uniadmin.db?mode=rwc"
        );
        assert_eq!(
            normalize_database_url("postgres://u:p@db/uni").unwrap(),
            "postgres://u:p@db/uni"
        );
        assert!(normalize_database_url("oracle://db").is_err());
    }

    #[test]
    fn test_redacted_url_hides_credentials() {
        assert_eq!(redact_database_url("postgres://admin:secret@db/uni"), "postgres");
        assert_eq!(redact_database_url("sqlite::memory:"), "sqlite");
    }
}
