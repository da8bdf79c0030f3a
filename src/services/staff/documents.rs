use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use super::StaffService;
use crate::models::documents::entities::Document;
use crate::models::documents::requests::{DocumentChanges, DocumentListParams, DocumentListQuery};
use crate::models::documents::transitions::TransitionError;
use crate::models::staff::entities::Staff;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::notifications::{Notice, notify};
use crate::services::storage_error_response;
use crate::storage::Storage;

pub(crate) fn document_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(
        ErrorCode::DocumentNotFound,
        "Document not found",
    ))
}

pub(crate) fn transition_error_response(err: &TransitionError) -> HttpResponse {
    match err {
        TransitionError::InvalidState { .. } => HttpResponse::Conflict().json(
            ApiResponse::error_empty(ErrorCode::InvalidDocumentState, err.to_string()),
        ),
        TransitionError::NotAssigned => HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::DocumentNotAssigned,
            err.to_string(),
        )),
    }
}

/// 审批动作使用：只有不存在时返回 404，是否分配给当前教职工由状态机判断
pub(crate) async fn load_document(
    storage: &Arc<dyn Storage>,
    id: i64,
) -> Result<Document, HttpResponse> {
    match storage.get_document_by_id(id).await {
        Ok(Some(doc)) => Ok(doc),
        Ok(None) => Err(document_not_found()),
        Err(e) => Err(storage_error_response(&e, ErrorCode::InternalServerError)),
    }
}

/// 只返回当前分配给该教职工的文档，其余一律视为不存在
pub(crate) async fn load_assigned(
    storage: &Arc<dyn Storage>,
    staff: &Staff,
    id: i64,
) -> Result<Document, HttpResponse> {
    match storage.get_document_by_id(id).await {
        Ok(Some(doc)) if doc.currently_assigned_id == Some(staff.id) => Ok(doc),
        Ok(_) => Err(document_not_found()),
        Err(e) => Err(storage_error_response(&e, ErrorCode::InternalServerError)),
    }
}

pub async fn list_my_documents(
    service: &StaffService,
    query: DocumentListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let staff = match service.current_staff(request).await {
        Ok(staff) => staff,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);

    let query = DocumentListQuery::from_params(query).assigned_to(staff.id);
    match storage.list_documents_with_pagination(query).await {
        Ok(documents) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            documents,
            "Document list retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    }
}

pub async fn get_my_document(
    service: &StaffService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let staff = match service.current_staff(request).await {
        Ok(staff) => staff,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);

    match load_assigned(&storage, &staff, id).await {
        Ok(doc) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            doc,
            "Document retrieved successfully",
        ))),
        Err(response) => Ok(response),
    }
}

/// 修改标题和描述，状态不变
pub async fn update_document(
    service: &StaffService,
    id: i64,
    mut changes: DocumentChanges,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let staff = match service.current_staff(request).await {
        Ok(staff) => staff,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);

    changes.attachment = None;
    changes.title = changes.title.map(|t| t.trim().to_string());
    if changes.title.as_deref() == Some("") {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "Title must not be empty",
        )));
    }
    if changes.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "Nothing to update",
        )));
    }

    let doc = match load_assigned(&storage, &staff, id).await {
        Ok(doc) => doc,
        Err(response) => return Ok(response),
    };
    if doc.state.is_terminal() {
        return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::InvalidDocumentState,
            format!("Cannot update a document that is {}", doc.state),
        )));
    }

    match storage
        .update_document_content(id, doc.state, changes, staff.user_id)
        .await
    {
        Ok(Some(doc)) => {
            notify(
                &storage,
                staff.user_id,
                Notice::new("Updated Document", format!("Update Document with ID: {}", doc.id)),
            )
            .await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(doc, "Document updated successfully")))
        }
        Ok(None) => Ok(document_not_found()),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::documents::entities::{DocumentActionKind, DocumentState};
    use actix_web::http::StatusCode;

    #[test]
    fn test_transition_error_status() {
        let invalid = TransitionError::InvalidState {
            state: DocumentState::Approved,
            action: DocumentActionKind::Reject,
        };
        assert_eq!(transition_error_response(&invalid).status(), StatusCode::CONFLICT);
        assert_eq!(
            transition_error_response(&TransitionError::NotAssigned).status(),
            StatusCode::FORBIDDEN
        );
    }
}
