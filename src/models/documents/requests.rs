use super::entities::DocumentState;
use crate::models::common::PaginationQuery;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct DocumentListParams {
    #[serde(flatten)]
    pub pagination: PaginationQuery,
    pub state: Option<DocumentState>,
}

/// 存储层文档查询
#[derive(Debug, Clone, Default)]
pub struct DocumentListQuery {
    pub page: u64,
    pub size: u64,
    /// 按提交学生过滤
    pub owner_id: Option<i64>,
    /// 按当前负责人过滤
    pub assigned_to: Option<i64>,
    pub state: Option<DocumentState>,
}

impl DocumentListQuery {
    pub fn from_params(params: DocumentListParams) -> Self {
        Self {
            page: params.pagination.page(),
            size: params.pagination.size(),
            state: params.state,
            ..Default::default()
        }
    }

    pub fn owned_by(mut self, student_id: i64) -> Self {
        self.owner_id = Some(student_id);
        self
    }

    pub fn assigned_to(mut self, staff_id: i64) -> Self {
        self.assigned_to = Some(staff_id);
        self
    }
}

/// 学生提交文档（multipart 解析结果）
#[derive(Debug, Default)]
pub struct CreateDocumentForm {
    pub title: String,
    pub description: Option<String>,
    /// 接收文档的教职工 ID
    pub recipient_id: i64,
    pub attachment: Option<String>,
}

/// 存储层创建文档
#[derive(Debug, Clone)]
pub struct CreateDocumentRequest {
    pub owner_id: i64,
    pub department_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub attachment: Option<String>,
    pub assigned_to: i64,
}

/// 文档内容变更
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(skip)]
    pub attachment: Option<String>,
}

impl DocumentChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.attachment.is_none()
    }
}

/// 通过/转交（multipart：comment + 可选文件 document）
#[derive(Debug, Default)]
pub struct ForwardDocumentForm {
    pub comment: Option<String>,
    pub attachment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RejectDocumentRequest {
    pub comment: String,
}

#[derive(Debug, Deserialize)]
pub struct RequestChangesRequest {
    pub comment: String,
}

#[derive(Debug, Deserialize)]
pub struct SetWorkflowRequest {
    pub workflow_id: i64,
}
