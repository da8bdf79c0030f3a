use serde::{Deserialize, Serialize};

// 文档状态
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DocumentState {
    Pending,          // 待处理
    InReview,         // 审核中
    ChangesRequested, // 需修改
    Approved,         // 已通过
    Rejected,         // 已驳回
}

impl DocumentState {
    pub const PENDING: &'static str = "pending";
    pub const IN_REVIEW: &'static str = "in_review";
    pub const CHANGES_REQUESTED: &'static str = "changes_requested";
    pub const APPROVED: &'static str = "approved";
    pub const REJECTED: &'static str = "rejected";

    /// 终态不再接受任何流转
    pub fn is_terminal(&self) -> bool {
        matches!(self, DocumentState::Approved | DocumentState::Rejected)
    }

    /// 教职工可以审批的状态
    pub fn is_reviewable(&self) -> bool {
        matches!(self, DocumentState::Pending | DocumentState::InReview)
    }

    fn as_str(&self) -> &'static str {
        match self {
            DocumentState::Pending => Self::PENDING,
            DocumentState::InReview => Self::IN_REVIEW,
            DocumentState::ChangesRequested => Self::CHANGES_REQUESTED,
            DocumentState::Approved => Self::APPROVED,
            DocumentState::Rejected => Self::REJECTED,
        }
    }
}

impl<'de> Deserialize<'de> for DocumentState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的文档状态: '{s}'. 支持的状态: pending, in_review, changes_requested, approved, rejected"
            ))
        })
    }
}

impl std::fmt::Display for DocumentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DocumentState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            DocumentState::PENDING => Ok(DocumentState::Pending),
            DocumentState::IN_REVIEW => Ok(DocumentState::InReview),
            DocumentState::CHANGES_REQUESTED => Ok(DocumentState::ChangesRequested),
            DocumentState::APPROVED => Ok(DocumentState::Approved),
            DocumentState::REJECTED => Ok(DocumentState::Rejected),
            _ => Err(format!("Invalid document state: {s}")),
        }
    }
}

// 文档流转动作
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DocumentActionKind {
    Submit,
    Update,
    SetWorkflow,
    Forward,
    Approve,
    Reject,
    Return,
    RequestChanges,
    Resubmit,
}

impl DocumentActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentActionKind::Submit => "submit",
            DocumentActionKind::Update => "update",
            DocumentActionKind::SetWorkflow => "set_workflow",
            DocumentActionKind::Forward => "forward",
            DocumentActionKind::Approve => "approve",
            DocumentActionKind::Reject => "reject",
            DocumentActionKind::Return => "return",
            DocumentActionKind::RequestChanges => "request_changes",
            DocumentActionKind::Resubmit => "resubmit",
        }
    }
}

impl<'de> Deserialize<'de> for DocumentActionKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for DocumentActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DocumentActionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submit" => Ok(DocumentActionKind::Submit),
            "update" => Ok(DocumentActionKind::Update),
            "set_workflow" => Ok(DocumentActionKind::SetWorkflow),
            "forward" => Ok(DocumentActionKind::Forward),
            "approve" => Ok(DocumentActionKind::Approve),
            "reject" => Ok(DocumentActionKind::Reject),
            "return" => Ok(DocumentActionKind::Return),
            "request_changes" => Ok(DocumentActionKind::RequestChanges),
            "resubmit" => Ok(DocumentActionKind::Resubmit),
            _ => Err(format!("Invalid document action: {s}")),
        }
    }
}

// 文档实体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    /// 提交者（学生 ID）
    pub owner_id: i64,
    pub department_id: i64,
    pub title: String,
    pub description: Option<String>,
    /// 附件下载令牌
    pub attachment: Option<String>,
    pub state: DocumentState,
    pub workflow_id: Option<i64>,
    /// 当前处于流程中的第几步
    pub current_step: Option<i32>,
    /// 当前负责处理的教职工 ID
    pub currently_assigned_id: Option<i64>,
    pub reviewer_comment: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 流转记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentAction {
    pub id: i64,
    pub document_id: i64,
    /// 操作者用户 ID
    pub actor_id: i64,
    pub action: DocumentActionKind,
    pub from_state: Option<DocumentState>,
    pub to_state: DocumentState,
    pub comment: Option<String>,
    pub attachment: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_names() {
        assert_eq!(DocumentState::ChangesRequested.to_string(), "changes_requested");
        assert_eq!(
            "in_review".parse::<DocumentState>().unwrap(),
            DocumentState::InReview
        );
        assert!("archived".parse::<DocumentState>().is_err());
        assert!(DocumentState::Approved.is_terminal());
        assert!(!DocumentState::ChangesRequested.is_reviewable());
    }

    #[test]
    fn test_state_serializes_snake_case() {
        let json = serde_json::to_string(&DocumentState::InReview).unwrap();
        assert_eq!(json, "\"in_review\"");
        let kind: DocumentActionKind = serde_json::from_str("\"request_changes\"").unwrap();
        assert_eq!(kind, DocumentActionKind::RequestChanges);
    }
}
