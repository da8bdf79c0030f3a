use std::sync::Arc;

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

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户（同时创建用户设置），密码字段为已哈希的值
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过邮箱获取用户信息
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    // 列出用户
    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse>;
    // 更新用户信息
    async fn update_user(&self, id: i64, update: UpdateUserRequest) -> Result<Option<User>>;
    // 删除用户
    async fn delete_user(&self, id: i64) -> Result<bool>;
    // 更新用户最后登录时间
    async fn update_last_login(&self, id: i64) -> Result<bool>;
    // 统计用户数量
    async fn count_users(&self) -> Result<u64>;
    // 按角色统计用户数量
    async fn count_users_by_role(&self, role: UserRole) -> Result<u64>;
    // 保存密码重置令牌
    async fn save_reset_token(&self, id: i64, token: &str, expires_at: i64) -> Result<bool>;
    // 保存新密码并清除重置令牌
    async fn save_password(&self, id: i64, password_hash: &str) -> Result<bool>;
    // 获取用户设置
    async fn get_user_settings(&self, user_id: i64) -> Result<Option<UserSettings>>;

    /// 学院管理方法
    async fn create_group(&self, group: CreateGroupRequest) -> Result<Group>;
    async fn get_group_by_id(&self, id: i64) -> Result<Option<Group>>;
    async fn list_groups_with_pagination(&self, query: GroupListQuery)
    -> Result<GroupListResponse>;
    async fn update_group(&self, id: i64, update: UpdateGroupRequest) -> Result<Option<Group>>;
    async fn delete_group(&self, id: i64) -> Result<bool>;

    /// 院系管理方法
    async fn create_department(&self, department: CreateDepartmentRequest) -> Result<Department>;
    async fn get_department_by_id(&self, id: i64) -> Result<Option<Department>>;
    async fn list_departments_with_pagination(
        &self,
        query: DepartmentListQuery,
    ) -> Result<DepartmentListResponse>;
    async fn update_department(
        &self,
        id: i64,
        update: UpdateDepartmentRequest,
    ) -> Result<Option<Department>>;
    async fn delete_department(&self, id: i64) -> Result<bool>;

    /// 教职工管理方法
    // 在同一事务中创建账号、用户设置和教职工记录，密码字段为已哈希的值
    async fn create_staff(&self, staff: CreateStaffRequest) -> Result<Staff>;
    async fn get_staff_by_id(&self, id: i64) -> Result<Option<Staff>>;
    async fn get_staff_by_user_id(&self, user_id: i64) -> Result<Option<Staff>>;
    async fn list_staff_with_pagination(&self, query: StaffListQuery)
    -> Result<StaffListResponse>;
    async fn update_staff(&self, id: i64, update: UpdateStaffRequest) -> Result<Option<Staff>>;
    // 删除教职工及其账号
    async fn delete_staff(&self, id: i64) -> Result<bool>;
    async fn count_staff(&self) -> Result<u64>;

    /// 学生管理方法
    async fn create_student(&self, student: CreateStudentRequest) -> Result<Student>;
    async fn get_student_by_id(&self, id: i64) -> Result<Option<Student>>;
    async fn get_student_by_user_id(&self, user_id: i64) -> Result<Option<Student>>;
    async fn get_student_by_matric_number(&self, matric_number: &str) -> Result<Option<Student>>;
    async fn list_students_with_pagination(
        &self,
        query: StudentListQuery,
    ) -> Result<StudentListResponse>;
    async fn update_student(
        &self,
        id: i64,
        update: UpdateStudentRequest,
    ) -> Result<Option<Student>>;
    async fn delete_student(&self, id: i64) -> Result<bool>;
    async fn count_students(&self) -> Result<u64>;

    /// 审批流程管理方法
    async fn create_workflow(
        &self,
        workflow: CreateWorkflowRequest,
        created_by: i64,
    ) -> Result<Workflow>;
    async fn get_workflow_by_id(&self, id: i64) -> Result<Option<Workflow>>;
    async fn list_workflows_with_pagination(
        &self,
        query: WorkflowListQuery,
    ) -> Result<WorkflowListResponse>;
    async fn update_workflow(
        &self,
        id: i64,
        update: UpdateWorkflowRequest,
    ) -> Result<Option<Workflow>>;
    async fn delete_workflow(&self, id: i64) -> Result<bool>;

    /// 文档管理方法
    // 创建文档并记录提交动作
    async fn create_document(
        &self,
        document: CreateDocumentRequest,
        actor_id: i64,
    ) -> Result<Document>;
    async fn get_document_by_id(&self, id: i64) -> Result<Option<Document>>;
    async fn list_documents_with_pagination(
        &self,
        query: DocumentListQuery,
    ) -> Result<DocumentListResponse>;
    // 修改文档内容（不改变状态），文档须仍处于 expected 状态
    async fn update_document_content(
        &self,
        id: i64,
        expected: DocumentState,
        changes: DocumentChanges,
        actor_id: i64,
    ) -> Result<Option<Document>>;
    // 在同一事务中写入状态流转与流转记录
    async fn apply_document_transition(
        &self,
        id: i64,
        transition: Transition,
        changes: DocumentChanges,
        actor_id: i64,
    ) -> Result<Document>;
    async fn delete_document(&self, id: i64) -> Result<bool>;
    async fn list_document_actions(&self, document_id: i64) -> Result<Vec<DocumentAction>>;
    // 教职工仪表盘统计
    async fn get_staff_statistics(&self, staff_id: i64, user_id: i64) -> Result<StaffStatistics>;
    async fn count_documents(&self) -> Result<u64>;

    /// 通知管理方法
    async fn create_notification(&self, req: CreateNotificationRequest) -> Result<Notification>;
    async fn list_notifications_with_pagination(
        &self,
        user_id: i64,
        query: NotificationListQuery,
    ) -> Result<NotificationListResponse>;
    async fn get_unread_notification_count(&self, user_id: i64) -> Result<i64>;
    // 只作用于 user_id 自己的通知
    async fn mark_notification_as_read(&self, user_id: i64, id: i64) -> Result<bool>;
    async fn mark_all_notifications_as_read(&self, user_id: i64) -> Result<i64>;
    async fn delete_notification(&self, user_id: i64, id: i64) -> Result<bool>;

    /// 文件管理方法
    // 记录已写入磁盘的文件
    async fn create_file(
        &self,
        download_token: &str,
        original_name: &str,
        stored_name: &str,
        file_size: i64,
        file_type: &str,
        user_id: Option<i64>,
    ) -> Result<File>;
    // 通过唯一 token 获取文件信息
    async fn get_file_by_token(&self, token: &str) -> Result<Option<File>>;
    // 删除文件记录，磁盘文件由调用方清理
    async fn delete_file(&self, token: &str) -> Result<bool>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
