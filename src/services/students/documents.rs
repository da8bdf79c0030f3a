use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use super::StudentService;
use crate::mail::MailTemplate;
use crate::models::documents::entities::{Document, DocumentState};
use crate::models::documents::requests::{
    CreateDocumentForm, CreateDocumentRequest, DocumentChanges, DocumentListParams,
    DocumentListQuery,
};
use crate::models::documents::responses::DocumentHistoryResponse;
use crate::models::documents::transitions::{self, student_can_delete, student_can_edit};
use crate::models::students::entities::Student;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::files::upload::{
    MultipartForm, PendingUpload, UploadPolicy, discard_upload, read_multipart, store_upload,
};
use crate::services::notifications::notify_and_mail;
use crate::services::notifications::Notice;
use crate::services::staff::documents::{document_not_found, transition_error_response};
use crate::services::storage_error_response;
use crate::storage::Storage;

fn bad_request(msg: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, msg))
}

fn state_conflict(action: &str, state: DocumentState) -> HttpResponse {
    HttpResponse::Conflict().json(ApiResponse::error_empty(
        ErrorCode::InvalidDocumentState,
        format!("Cannot {action} a document that is {state}"),
    ))
}

impl CreateDocumentForm {
    fn from_multipart(form: &MultipartForm) -> Result<Self, HttpResponse> {
        let Some(title) = form.text("title") else {
            return Err(bad_request("Title is required"));
        };
        let recipient_id = form
            .text("recipient_id")
            .and_then(|raw| raw.parse::<i64>().ok())
            .filter(|id| *id > 0)
            .ok_or_else(|| bad_request("A valid recipient_id is required"))?;

        Ok(Self {
            title,
            description: form.text("description"),
            recipient_id,
            attachment: None,
        })
    }
}

/// 只返回属于该学生的文档
async fn load_owned(
    storage: &Arc<dyn Storage>,
    student: &Student,
    id: i64,
) -> Result<Document, HttpResponse> {
    match storage.get_document_by_id(id).await {
        Ok(Some(doc)) if doc.owner_id == student.id => Ok(doc),
        Ok(_) => Err(document_not_found()),
        Err(e) => Err(storage_error_response(&e, ErrorCode::InternalServerError)),
    }
}

async fn save_attachment(
    storage: &Arc<dyn Storage>,
    upload: Option<PendingUpload>,
    user_id: i64,
) -> Result<Option<String>, HttpResponse> {
    match upload {
        Some(upload) => store_upload(storage, upload, Some(user_id))
            .await
            .map(|file| Some(file.download_token))
            .map_err(|e| e.to_response()),
        None => Ok(None),
    }
}

pub async fn create_document(
    service: &StudentService,
    payload: Multipart,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let student = match service.current_student(request).await {
        Ok(student) => student,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);
    let mailer = service.get_mailer(request);

    let form = match read_multipart(payload, "document", UploadPolicy::Attachment).await {
        Ok(form) => form,
        Err(e) => return Ok(e.to_response()),
    };
    let mut document_form = match CreateDocumentForm::from_multipart(&form) {
        Ok(document_form) => document_form,
        Err(response) => return Ok(response),
    };

    let recipient = match storage.get_staff_by_id(document_form.recipient_id).await {
        Ok(Some(staff)) => staff,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::StaffNotFound,
                "Recipient staff not found",
            )));
        }
        Err(e) => return Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    };

    document_form.attachment = match save_attachment(&storage, form.file, student.user_id).await {
        Ok(attachment) => attachment,
        Err(response) => return Ok(response),
    };

    let create_request = CreateDocumentRequest {
        owner_id: student.id,
        department_id: student.department_id,
        title: document_form.title,
        description: document_form.description,
        attachment: document_form.attachment,
        assigned_to: recipient.id,
    };

    let uploaded = create_request.attachment.clone();
    let doc = match storage.create_document(create_request, student.user_id).await {
        Ok(doc) => doc,
        Err(e) => {
            if let Some(token) = &uploaded {
                discard_upload(&storage, token).await;
            }
            return Ok(storage_error_response(&e, ErrorCode::DocumentCreationFailed));
        }
    };

    notify_and_mail(
        &storage,
        mailer.as_ref(),
        recipient.user_id,
        &recipient.email,
        Notice::new(
            "New Document",
            format!("Document with ID: {} requires your attention", doc.id),
        ),
        MailTemplate::DocumentSubmitted {
            name: student.full_name(),
            doc_title: doc.title.clone(),
        },
    )
    .await;

    tracing::info!(
        "Document {} submitted by student {} to staff {}",
        doc.id,
        student.id,
        recipient.id
    );
    Ok(HttpResponse::Created().json(ApiResponse::success(doc, "Document submitted successfully")))
}

pub async fn list_my_documents(
    service: &StudentService,
    query: DocumentListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let student = match service.current_student(request).await {
        Ok(student) => student,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);

    let query = DocumentListQuery::from_params(query).owned_by(student.id);
    match storage.list_documents_with_pagination(query).await {
        Ok(documents) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            documents,
            "Document list retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    }
}

pub async fn get_my_document(
    service: &StudentService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let student = match service.current_student(request).await {
        Ok(student) => student,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);

    match load_owned(&storage, &student, id).await {
        Ok(doc) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            doc,
            "Document retrieved successfully",
        ))),
        Err(response) => Ok(response),
    }
}

pub async fn get_document_history(
    service: &StudentService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let student = match service.current_student(request).await {
        Ok(student) => student,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);

    if let Err(response) = load_owned(&storage, &student, id).await {
        return Ok(response);
    }

    match storage.list_document_actions(id).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            DocumentHistoryResponse { items },
            "Document history retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    }
}

/// 待处理时直接修改；需修改时修改即重新提交
pub async fn update_document(
    service: &StudentService,
    id: i64,
    payload: Multipart,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let student = match service.current_student(request).await {
        Ok(student) => student,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);
    let mailer = service.get_mailer(request);

    let form = match read_multipart(payload, "document", UploadPolicy::Attachment).await {
        Ok(form) => form,
        Err(e) => return Ok(e.to_response()),
    };
    let mut changes = DocumentChanges {
        title: form.text("title"),
        description: form.text("description"),
        attachment: None,
    };

    let doc = match load_owned(&storage, &student, id).await {
        Ok(doc) => doc,
        Err(response) => return Ok(response),
    };
    if !student_can_edit(doc.state) {
        return Ok(state_conflict("edit", doc.state));
    }

    let resubmission = match doc.state {
        DocumentState::ChangesRequested => match transitions::resubmit(&doc) {
            Ok(transition) => Some(transition),
            Err(e) => return Ok(transition_error_response(&e)),
        },
        _ => None,
    };

    if form.file.is_none() && changes.is_empty() && resubmission.is_none() {
        return Ok(bad_request("Nothing to update"));
    }

    changes.attachment = match save_attachment(&storage, form.file, student.user_id).await {
        Ok(attachment) => attachment,
        Err(response) => return Ok(response),
    };

    let resubmitted = resubmission.is_some();
    let uploaded = changes.attachment.clone();
    let outcome = match resubmission {
        Some(transition) => storage
            .apply_document_transition(id, transition, changes, student.user_id)
            .await
            .map(Some),
        None => {
            storage
                .update_document_content(id, doc.state, changes, student.user_id)
                .await
        }
    };

    let updated = match outcome {
        Ok(Some(doc)) => doc,
        failed => {
            if let Some(token) = &uploaded {
                discard_upload(&storage, token).await;
            }
            return Ok(match failed {
                Err(e) => storage_error_response(&e, ErrorCode::InternalServerError),
                _ => document_not_found(),
            });
        }
    };

    if !resubmitted {
        return Ok(HttpResponse::Ok().json(ApiResponse::success(
            updated,
            "Document updated successfully",
        )));
    }

    if let Some(staff_id) = updated.currently_assigned_id {
        match storage.get_staff_by_id(staff_id).await {
            Ok(Some(staff)) => {
                notify_and_mail(
                    &storage,
                    mailer.as_ref(),
                    staff.user_id,
                    &staff.email,
                    Notice::new(
                        "Resubmitted Document",
                        format!("Document with ID: {id} requires your attention"),
                    ),
                    MailTemplate::DocumentSubmitted {
                        name: student.full_name(),
                        doc_title: updated.title.clone(),
                    },
                )
                .await
            }
            Ok(None) => tracing::warn!("Assignee {} of document {} no longer exists", staff_id, id),
            Err(e) => tracing::warn!("Failed to load assignee of document {}: {}", id, e),
        }
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        updated,
        "Document resubmitted successfully",
    )))
}

pub async fn delete_document(
    service: &StudentService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let student = match service.current_student(request).await {
        Ok(student) => student,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);

    let doc = match load_owned(&storage, &student, id).await {
        Ok(doc) => doc,
        Err(response) => return Ok(response),
    };
    if !student_can_delete(doc.state) {
        return Ok(state_conflict("delete", doc.state));
    }

    match storage.delete_document(id).await {
        Ok(true) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
            "Document deleted successfully",
        ))),
        Ok(false) => Ok(document_not_found()),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(fields: &[(&str, &str)]) -> MultipartForm {
        MultipartForm {
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            file: None,
        }
    }

    #[test]
    fn test_create_form_parsing() {
        let parsed = CreateDocumentForm::from_multipart(&form(&[
            ("title", " Transcript request "),
            ("recipient_id", "4"),
        ]))
        .unwrap();
        assert_eq!(parsed.title, "Transcript request");
        assert_eq!(parsed.recipient_id, 4);
        assert_eq!(parsed.description, None);

        assert!(CreateDocumentForm::from_multipart(&form(&[("recipient_id", "4")])).is_err());
        assert!(
            CreateDocumentForm::from_multipart(&form(&[("title", "x"), ("recipient_id", "abc")]))
                .is_err()
        );
        assert!(
            CreateDocumentForm::from_multipart(&form(&[("title", "x"), ("recipient_id", "-2")]))
                .is_err()
        );
    }
}
