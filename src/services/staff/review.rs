//! 审批动作：状态机计算流转，存储层在事务中落库，提交后再发通知和邮件

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use super::StaffService;
use super::documents::{load_document, transition_error_response};
use crate::mail::{MailTemplate, Mailer};
use crate::models::documents::entities::{Document, DocumentState};
use crate::models::documents::requests::{
    DocumentChanges, ForwardDocumentForm, RejectDocumentRequest, RequestChangesRequest,
    SetWorkflowRequest,
};
use crate::models::documents::transitions::{self, Transition};
use crate::models::workflows::entities::Workflow;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::files::upload::{UploadPolicy, discard_upload, read_multipart, store_upload};
use crate::services::notifications::{Notice, notify, notify_and_mail};
use crate::services::storage_error_response;
use crate::storage::Storage;

fn comment_required() -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(
        ErrorCode::BadRequest,
        "A comment is required",
    ))
}

fn non_empty(comment: &str) -> Option<String> {
    let comment = comment.trim();
    (!comment.is_empty()).then(|| comment.to_string())
}

async fn load_workflow(
    storage: &Arc<dyn Storage>,
    workflow_id: Option<i64>,
) -> Result<Option<Workflow>, HttpResponse> {
    let Some(workflow_id) = workflow_id else {
        return Ok(None);
    };
    storage
        .get_workflow_by_id(workflow_id)
        .await
        .map_err(|e| storage_error_response(&e, ErrorCode::InternalServerError))
}

async fn commit(
    storage: &Arc<dyn Storage>,
    id: i64,
    transition: Transition,
    actor_id: i64,
) -> Result<Document, HttpResponse> {
    storage
        .apply_document_transition(id, transition, DocumentChanges::default(), actor_id)
        .await
        .map_err(|e| storage_error_response(&e, ErrorCode::InternalServerError))
}

/// 通知文档所属学生
async fn notify_owner(
    storage: &Arc<dyn Storage>,
    mailer: Option<&Arc<dyn Mailer>>,
    doc: &Document,
    notice: Notice,
    template: MailTemplate,
) {
    match storage.get_student_by_id(doc.owner_id).await {
        Ok(Some(student)) => {
            notify_and_mail(storage, mailer, student.user_id, &student.email, notice, template)
                .await
        }
        Ok(None) => tracing::warn!("Owner {} of document {} no longer exists", doc.owner_id, doc.id),
        Err(e) => tracing::warn!("Failed to load owner of document {}: {}", doc.id, e),
    }
}

/// 通知文档新的负责人
async fn notify_assignee(
    storage: &Arc<dyn Storage>,
    mailer: Option<&Arc<dyn Mailer>>,
    doc: &Document,
    notice: Notice,
    template: MailTemplate,
) {
    let Some(staff_id) = doc.currently_assigned_id else {
        return;
    };
    match storage.get_staff_by_id(staff_id).await {
        Ok(Some(staff)) => {
            notify_and_mail(storage, mailer, staff.user_id, &staff.email, notice, template).await
        }
        Ok(None) => tracing::warn!("Assignee {} of document {} no longer exists", staff_id, doc.id),
        Err(e) => tracing::warn!("Failed to load assignee of document {}: {}", doc.id, e),
    }
}

impl ForwardDocumentForm {
    fn comment(&self) -> Option<String> {
        self.comment.as_deref().and_then(non_empty)
    }
}

/// 通过当前步骤：有下一步则转交，否则文档通过
pub async fn approve_document(
    service: &StaffService,
    id: i64,
    payload: Multipart,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let staff = match service.current_staff(request).await {
        Ok(staff) => staff,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);
    let mailer = service.get_mailer(request);

    let form = match read_multipart(payload, "document", UploadPolicy::Attachment).await {
        Ok(form) => form,
        Err(e) => return Ok(e.to_response()),
    };
    let mut forward_form = ForwardDocumentForm {
        comment: form.text("comment"),
        attachment: None,
    };

    let doc = match load_document(&storage, id).await {
        Ok(doc) => doc,
        Err(response) => return Ok(response),
    };
    let workflow = match load_workflow(&storage, doc.workflow_id).await {
        Ok(workflow) => workflow,
        Err(response) => return Ok(response),
    };

    let mut transition = match transitions::forward(&doc, staff.id, workflow.as_ref()) {
        Ok(transition) => transition,
        Err(e) => return Ok(transition_error_response(&e)),
    };

    // 状态校验通过后才保存上传的文件
    if let Some(upload) = form.file {
        match store_upload(&storage, upload, Some(staff.user_id)).await {
            Ok(file) => forward_form.attachment = Some(file.download_token),
            Err(e) => return Ok(e.to_response()),
        }
    }
    if let Some(comment) = forward_form.comment() {
        transition = transition.with_comment(comment);
    }
    transition = transition.with_attachment(forward_form.attachment.clone());

    let updated = match commit(&storage, id, transition, staff.user_id).await {
        Ok(doc) => doc,
        Err(response) => {
            if let Some(token) = &forward_form.attachment {
                discard_upload(&storage, token).await;
            }
            return Ok(response);
        }
    };

    notify(
        &storage,
        staff.user_id,
        Notice::new("Approved Document", format!("Approved Document with ID: {id}")),
    )
    .await;

    if updated.state == DocumentState::Approved {
        let owner_name = match storage.get_student_by_id(updated.owner_id).await {
            Ok(Some(student)) => student.full_name(),
            _ => String::new(),
        };
        notify_owner(
            &storage,
            mailer.as_ref(),
            &updated,
            Notice::new(
                "Approved Document",
                format!("Document {} with ID: {id} has been approved", updated.title),
            ),
            MailTemplate::DocumentApproved {
                name: owner_name,
                doc_title: updated.title.clone(),
            },
        )
        .await;
    } else {
        notify_assignee(
            &storage,
            mailer.as_ref(),
            &updated,
            Notice::new(
                "Forwarded Document",
                format!("Document with ID: {id} requires your attention"),
            ),
            MailTemplate::ForwardedDocument {
                name: staff.full_name(),
                doc_title: updated.title.clone(),
            },
        )
        .await;
    }

    tracing::info!("Document {} {} by staff {}", id, updated.state, staff.id);
    Ok(HttpResponse::Ok().json(ApiResponse::success(updated, "Document approved successfully")))
}

/// 驳回：不在第一步时退回上一位负责人，否则终止
pub async fn reject_document(
    service: &StaffService,
    id: i64,
    body: RejectDocumentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(comment) = non_empty(&body.comment) else {
        return Ok(comment_required());
    };
    let staff = match service.current_staff(request).await {
        Ok(staff) => staff,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);
    let mailer = service.get_mailer(request);

    let doc = match load_document(&storage, id).await {
        Ok(doc) => doc,
        Err(response) => return Ok(response),
    };
    let workflow = match load_workflow(&storage, doc.workflow_id).await {
        Ok(workflow) => workflow,
        Err(response) => return Ok(response),
    };

    let transition = match transitions::reject(&doc, staff.id, workflow.as_ref()) {
        Ok(transition) => transition.with_comment(comment.clone()),
        Err(e) => return Ok(transition_error_response(&e)),
    };

    let updated = match commit(&storage, id, transition, staff.user_id).await {
        Ok(doc) => doc,
        Err(response) => return Ok(response),
    };

    notify(
        &storage,
        staff.user_id,
        Notice::new("Rejected Document", format!("Rejected Document with ID: {id}")),
    )
    .await;

    if updated.state == DocumentState::Rejected {
        notify_owner(
            &storage,
            mailer.as_ref(),
            &updated,
            Notice::new(
                "Rejected Document",
                format!(
                    "Your document {} with ID: {id} has been rejected",
                    updated.title
                ),
            ),
            MailTemplate::DocumentRejected {
                doc_title: updated.title.clone(),
                reason: comment,
            },
        )
        .await;
    } else {
        notify_assignee(
            &storage,
            mailer.as_ref(),
            &updated,
            Notice::new(
                "Rejected Document",
                format!("Document with ID: {id} was returned to you: {comment}"),
            ),
            MailTemplate::DocumentRejected {
                doc_title: updated.title.clone(),
                reason: comment,
            },
        )
        .await;
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(updated, "Document rejected successfully")))
}

pub async fn request_changes(
    service: &StaffService,
    id: i64,
    body: RequestChangesRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(comment) = non_empty(&body.comment) else {
        return Ok(comment_required());
    };
    let staff = match service.current_staff(request).await {
        Ok(staff) => staff,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);
    let mailer = service.get_mailer(request);

    let doc = match load_document(&storage, id).await {
        Ok(doc) => doc,
        Err(response) => return Ok(response),
    };

    let transition = match transitions::request_changes(&doc, staff.id) {
        Ok(transition) => transition.with_comment(comment),
        Err(e) => return Ok(transition_error_response(&e)),
    };

    let updated = match commit(&storage, id, transition, staff.user_id).await {
        Ok(doc) => doc,
        Err(response) => return Ok(response),
    };

    notify(
        &storage,
        staff.user_id,
        Notice::new(
            "Changes Requested",
            format!("Changes Requested on Document with ID: {id}"),
        ),
    )
    .await;
    notify_owner(
        &storage,
        mailer.as_ref(),
        &updated,
        Notice::new(
            "Changes Requested",
            format!(
                "Your document {} with ID: {id} needs some changes",
                updated.title
            ),
        ),
        MailTemplate::ChangesRequested {
            doc_title: updated.title.clone(),
        },
    )
    .await;

    Ok(HttpResponse::Ok().json(ApiResponse::success(updated, "Changes requested successfully")))
}

pub async fn set_workflow(
    service: &StaffService,
    id: i64,
    body: SetWorkflowRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let staff = match service.current_staff(request).await {
        Ok(staff) => staff,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);

    let workflow = match load_workflow(&storage, Some(body.workflow_id)).await {
        Ok(Some(workflow)) => workflow,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::WorkflowNotFound,
                "Workflow not found",
            )));
        }
        Err(response) => return Ok(response),
    };

    let doc = match load_document(&storage, id).await {
        Ok(doc) => doc,
        Err(response) => return Ok(response),
    };

    let transition = match transitions::set_workflow(&doc, staff.id, &workflow) {
        Ok(transition) => transition,
        Err(e) => return Ok(transition_error_response(&e)),
    };

    let updated = match commit(&storage, id, transition, staff.user_id).await {
        Ok(doc) => doc,
        Err(response) => return Ok(response),
    };

    notify(
        &storage,
        staff.user_id,
        Notice::new(
            "Document Workflow",
            format!(
                "Set Workflow for Document with ID: {id}. Workflow ID: {}",
                workflow.id
            ),
        ),
    )
    .await;

    Ok(HttpResponse::Ok().json(ApiResponse::success(updated, "Workflow set successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_trimming() {
        assert_eq!(non_empty("  looks good "), Some("looks good".to_string()));
        assert_eq!(non_empty("   "), None);

        let form = ForwardDocumentForm {
            comment: Some("\n".to_string()),
            attachment: None,
        };
        assert_eq!(form.comment(), None);
    }
}
