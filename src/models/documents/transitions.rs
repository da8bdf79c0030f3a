//! 文档审批状态机
//!
//! 纯函数：根据文档当前状态与审批流程计算下一状态，不访问存储。
//! 存储层在同一事务内写入文档并追加流转记录。

use super::entities::{Document, DocumentActionKind, DocumentState};
use crate::models::workflows::entities::Workflow;

/// 一次流转的结果
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub action: DocumentActionKind,
    pub from: DocumentState,
    pub to: DocumentState,
    pub workflow_id: Option<i64>,
    pub current_step: Option<i32>,
    pub assigned_to: Option<i64>,
    /// 流转前的负责人，写入时用于并发校验
    pub previous_assignee: Option<i64>,
    pub comment: Option<String>,
    pub attachment: Option<String>,
}

impl Transition {
    fn keep(doc: &Document, action: DocumentActionKind, to: DocumentState) -> Self {
        Self {
            action,
            from: doc.state,
            to,
            workflow_id: doc.workflow_id,
            current_step: doc.current_step,
            assigned_to: doc.currently_assigned_id,
            previous_assignee: doc.currently_assigned_id,
            comment: None,
            attachment: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_attachment(mut self, attachment: Option<String>) -> Self {
        self.attachment = attachment;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// 当前状态不允许该动作
    InvalidState {
        state: DocumentState,
        action: DocumentActionKind,
    },
    /// 操作者不是当前负责人
    NotAssigned,
}

impl std::fmt::Display for TransitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransitionError::InvalidState { state, action } => {
                write!(f, "Cannot {action} a document that is {state}")
            }
            TransitionError::NotAssigned => write!(f, "Document is not assigned to you"),
        }
    }
}

impl std::error::Error for TransitionError {}

pub type TransitionResult = Result<Transition, TransitionError>;

fn ensure_assigned(doc: &Document, staff_id: i64) -> Result<(), TransitionError> {
    if doc.currently_assigned_id == Some(staff_id) {
        Ok(())
    } else {
        Err(TransitionError::NotAssigned)
    }
}

fn ensure_reviewable(doc: &Document, action: DocumentActionKind) -> Result<(), TransitionError> {
    if doc.state.is_reviewable() {
        Ok(())
    } else {
        Err(TransitionError::InvalidState {
            state: doc.state,
            action,
        })
    }
}

/// 仅当文档确实挂在该流程上时才使用它
fn attached<'a>(doc: &Document, workflow: Option<&'a Workflow>) -> Option<&'a Workflow> {
    workflow.filter(|w| doc.workflow_id == Some(w.id))
}

/// 为文档指定审批流程
///
/// 操作者若在流程中，`current_step` 指向其位置；否则置空，表示操作者位于流程之前。
pub fn set_workflow(doc: &Document, staff_id: i64, workflow: &Workflow) -> TransitionResult {
    ensure_assigned(doc, staff_id)?;
    ensure_reviewable(doc, DocumentActionKind::SetWorkflow)?;

    let current_step = workflow.step_index(staff_id).map(|i| i as i32);
    Ok(Transition {
        workflow_id: Some(workflow.id),
        current_step,
        ..Transition::keep(doc, DocumentActionKind::SetWorkflow, DocumentState::InReview)
    })
}

/// 通过并转交下一步；流程走完或没有流程时文档通过
pub fn forward(doc: &Document, staff_id: i64, workflow: Option<&Workflow>) -> TransitionResult {
    ensure_assigned(doc, staff_id)?;
    ensure_reviewable(doc, DocumentActionKind::Forward)?;

    let next = match (attached(doc, workflow), doc.current_step) {
        (Some(w), Some(step)) => {
            let index = (step + 1) as usize;
            w.step(index).map(|staff| (index, staff))
        }
        (Some(w), None) => w.step(0).map(|staff| (0, staff)),
        (None, _) => None,
    };

    Ok(match next {
        Some((index, next_staff)) => Transition {
            current_step: Some(index as i32),
            assigned_to: Some(next_staff),
            ..Transition::keep(doc, DocumentActionKind::Forward, DocumentState::InReview)
        },
        None => Transition::keep(doc, DocumentActionKind::Approve, DocumentState::Approved),
    })
}

/// 驳回：不在第一步时退回上一步，否则终止为已驳回
pub fn reject(doc: &Document, staff_id: i64, workflow: Option<&Workflow>) -> TransitionResult {
    ensure_assigned(doc, staff_id)?;
    ensure_reviewable(doc, DocumentActionKind::Reject)?;

    let previous = match (attached(doc, workflow), doc.current_step) {
        (Some(w), Some(step)) if step > 0 => {
            let index = (step - 1) as usize;
            w.step(index).map(|staff| (index, staff))
        }
        _ => None,
    };

    Ok(match previous {
        Some((index, previous_staff)) => Transition {
            current_step: Some(index as i32),
            assigned_to: Some(previous_staff),
            ..Transition::keep(doc, DocumentActionKind::Return, DocumentState::InReview)
        },
        None => Transition::keep(doc, DocumentActionKind::Reject, DocumentState::Rejected),
    })
}

/// 要求学生修改，负责人不变
pub fn request_changes(doc: &Document, staff_id: i64) -> TransitionResult {
    ensure_assigned(doc, staff_id)?;
    ensure_reviewable(doc, DocumentActionKind::RequestChanges)?;

    Ok(Transition::keep(
        doc,
        DocumentActionKind::RequestChanges,
        DocumentState::ChangesRequested,
    ))
}

/// 学生修改后重新提交
pub fn resubmit(doc: &Document) -> TransitionResult {
    if doc.state != DocumentState::ChangesRequested {
        return Err(TransitionError::InvalidState {
            state: doc.state,
            action: DocumentActionKind::Resubmit,
        });
    }

    let to = if doc.workflow_id.is_some() {
        DocumentState::InReview
    } else {
        DocumentState::Pending
    };
    Ok(Transition::keep(doc, DocumentActionKind::Resubmit, to))
}

/// 学生是否还能编辑文档内容
pub fn student_can_edit(state: DocumentState) -> bool {
    matches!(
        state,
        DocumentState::Pending | DocumentState::ChangesRequested
    )
}

/// 学生是否还能删除文档
pub fn student_can_delete(state: DocumentState) -> bool {
    state == DocumentState::Pending
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIRST: i64 = 10;
    const SECOND: i64 = 20;
    const THIRD: i64 = 30;

    fn document(state: DocumentState, assigned: i64) -> Document {
        Document {
            id: 1,
            owner_id: 5,
            department_id: 1,
            title: "Transcript request".to_string(),
            description: None,
            attachment: None,
            state,
            workflow_id: None,
            current_step: None,
            currently_assigned_id: Some(assigned),
            reviewer_comment: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn chain() -> Workflow {
        Workflow {
            id: 7,
            department_id: 1,
            name: "Transcript".to_string(),
            steps: vec![FIRST, SECOND, THIRD],
            created_by: 1,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn on_chain(state: DocumentState, step: i32, assigned: i64) -> Document {
        Document {
            workflow_id: Some(7),
            current_step: Some(step),
            ..document(state, assigned)
        }
    }

    #[test]
    fn test_set_workflow_by_member_points_at_actor() {
        let doc = document(DocumentState::Pending, SECOND);
        let t = set_workflow(&doc, SECOND, &chain()).unwrap();
        assert_eq!(t.to, DocumentState::InReview);
        assert_eq!(t.workflow_id, Some(7));
        assert_eq!(t.current_step, Some(1));
        assert_eq!(t.assigned_to, Some(SECOND));
    }

    #[test]
    fn test_set_workflow_by_outsider_precedes_chain() {
        let doc = document(DocumentState::Pending, 99);
        let t = set_workflow(&doc, 99, &chain()).unwrap();
        assert_eq!(t.current_step, None);

        let doc = Document {
            workflow_id: t.workflow_id,
            current_step: t.current_step,
            state: t.to,
            ..doc
        };
        let t = forward(&doc, 99, Some(&chain())).unwrap();
        assert_eq!(t.action, DocumentActionKind::Forward);
        assert_eq!(t.current_step, Some(0));
        assert_eq!(t.assigned_to, Some(FIRST));
    }

    #[test]
    fn test_forward_advances_then_approves() {
        let doc = on_chain(DocumentState::InReview, 1, SECOND);
        let t = forward(&doc, SECOND, Some(&chain())).unwrap();
        assert_eq!(t.to, DocumentState::InReview);
        assert_eq!(t.current_step, Some(2));
        assert_eq!(t.assigned_to, Some(THIRD));

        let doc = on_chain(DocumentState::InReview, 2, THIRD);
        let t = forward(&doc, THIRD, Some(&chain())).unwrap();
        assert_eq!(t.action, DocumentActionKind::Approve);
        assert_eq!(t.to, DocumentState::Approved);
        assert_eq!(t.assigned_to, Some(THIRD));
    }

    #[test]
    fn test_forward_without_workflow_approves() {
        let doc = document(DocumentState::Pending, FIRST);
        let t = forward(&doc, FIRST, None).unwrap();
        assert_eq!(t.to, DocumentState::Approved);
    }

    #[test]
    fn test_reject_returns_to_previous_step() {
        let doc = on_chain(DocumentState::InReview, 2, THIRD);
        let t = reject(&doc, THIRD, Some(&chain()))
            .unwrap()
            .with_comment("Missing signature");
        assert_eq!(t.action, DocumentActionKind::Return);
        assert_eq!(t.to, DocumentState::InReview);
        assert_eq!(t.current_step, Some(1));
        assert_eq!(t.assigned_to, Some(SECOND));
        assert_eq!(t.comment.as_deref(), Some("Missing signature"));
    }

    #[test]
    fn test_reject_at_first_step_is_terminal() {
        let doc = on_chain(DocumentState::InReview, 0, FIRST);
        let t = reject(&doc, FIRST, Some(&chain())).unwrap();
        assert_eq!(t.to, DocumentState::Rejected);

        let doc = document(DocumentState::Pending, FIRST);
        let t = reject(&doc, FIRST, None).unwrap();
        assert_eq!(t.to, DocumentState::Rejected);
    }

    #[test]
    fn test_request_changes_keeps_assignee() {
        let doc = on_chain(DocumentState::InReview, 1, SECOND);
        let t = request_changes(&doc, SECOND).unwrap();
        assert_eq!(t.to, DocumentState::ChangesRequested);
        assert_eq!(t.assigned_to, Some(SECOND));
        assert_eq!(t.current_step, Some(1));
    }

    #[test]
    fn test_resubmit_depends_on_workflow() {
        let doc = on_chain(DocumentState::ChangesRequested, 1, SECOND);
        assert_eq!(resubmit(&doc).unwrap().to, DocumentState::InReview);

        let doc = document(DocumentState::ChangesRequested, FIRST);
        assert_eq!(resubmit(&doc).unwrap().to, DocumentState::Pending);

        let doc = document(DocumentState::Pending, FIRST);
        assert!(resubmit(&doc).is_err());
    }

    #[test]
    fn test_terminal_states_reject_everything() {
        for state in [DocumentState::Approved, DocumentState::Rejected] {
            let doc = on_chain(state, 1, SECOND);
            let w = chain();
            assert!(matches!(
                forward(&doc, SECOND, Some(&w)),
                Err(TransitionError::InvalidState { .. })
            ));
            assert!(reject(&doc, SECOND, Some(&w)).is_err());
            assert!(request_changes(&doc, SECOND).is_err());
            assert!(set_workflow(&doc, SECOND, &w).is_err());
            assert!(resubmit(&doc).is_err());
            assert!(!student_can_edit(state));
        }
    }

    #[test]
    fn test_changes_requested_blocks_review_actions() {
        let doc = on_chain(DocumentState::ChangesRequested, 1, SECOND);
        assert!(forward(&doc, SECOND, Some(&chain())).is_err());
        assert!(request_changes(&doc, SECOND).is_err());
        assert!(student_can_edit(doc.state));
        assert!(!student_can_delete(doc.state));
    }

    #[test]
    fn test_only_assignee_may_act() {
        let doc = on_chain(DocumentState::InReview, 1, SECOND);
        assert_eq!(
            forward(&doc, FIRST, Some(&chain())),
            Err(TransitionError::NotAssigned)
        );
        assert_eq!(request_changes(&doc, THIRD), Err(TransitionError::NotAssigned));
    }

    #[test]
    fn test_workflow_mismatch_is_ignored() {
        let doc = on_chain(DocumentState::InReview, 0, FIRST);
        let other = Workflow { id: 8, ..chain() };
        let t = forward(&doc, FIRST, Some(&other)).unwrap();
        assert_eq!(t.to, DocumentState::Approved);
    }
}
