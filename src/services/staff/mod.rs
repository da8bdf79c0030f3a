//! 教职工：管理员维护档案，教职工处理分配给自己的文档

pub mod documents;
pub mod manage;
pub mod review;
pub mod stats;

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::mail::Mailer;
use crate::middlewares::RequireJWT;
use crate::models::documents::requests::{
    DocumentChanges, DocumentListParams, RejectDocumentRequest, RequestChangesRequest,
    SetWorkflowRequest,
};
use crate::models::staff::entities::Staff;
use crate::models::staff::requests::{CreateStaffRequest, StaffListParams, UpdateStaffRequest};
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

pub struct StaffService {
    storage: Option<Arc<dyn Storage>>,
}

impl StaffService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        match &self.storage {
            Some(storage) => storage.clone(),
            None => super::storage_from(request),
        }
    }

    pub(crate) fn get_mailer(&self, request: &HttpRequest) -> Option<Arc<dyn Mailer>> {
        super::mailer_from(request)
    }

    /// 当前登录用户对应的教职工档案
    pub(crate) async fn current_staff(&self, request: &HttpRequest) -> Result<Staff, HttpResponse> {
        let Some(user_id) = RequireJWT::extract_user_id(request) else {
            return Err(super::unauthorized());
        };

        match self.get_storage(request).get_staff_by_user_id(user_id).await {
            Ok(Some(staff)) => Ok(staff),
            Ok(None) => Err(HttpResponse::Forbidden().json(ApiResponse::error_empty(
                ErrorCode::StaffNotFound,
                "No staff profile is linked to this account",
            ))),
            Err(e) => Err(super::storage_error_response(&e, ErrorCode::InternalServerError)),
        }
    }

    // 管理员：教职工列表
    pub async fn list_staff(
        &self,
        query: StaffListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        manage::list_staff(self, query, request).await
    }

    pub async fn create_staff(
        &self,
        staff: CreateStaffRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        manage::create_staff(self, staff, request).await
    }

    pub async fn get_staff(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        manage::get_staff(self, id, request).await
    }

    pub async fn update_staff(
        &self,
        id: i64,
        update: UpdateStaffRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        manage::update_staff(self, id, update, request).await
    }

    pub async fn delete_staff(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        manage::delete_staff(self, id, request).await
    }

    // 教职工：分配给我的文档
    pub async fn list_my_documents(
        &self,
        query: DocumentListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        documents::list_my_documents(self, query, request).await
    }

    pub async fn get_my_document(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        documents::get_my_document(self, id, request).await
    }

    pub async fn update_document(
        &self,
        id: i64,
        changes: DocumentChanges,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        documents::update_document(self, id, changes, request).await
    }

    // 审批动作
    pub async fn approve_document(
        &self,
        id: i64,
        payload: Multipart,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        review::approve_document(self, id, payload, request).await
    }

    pub async fn reject_document(
        &self,
        id: i64,
        body: RejectDocumentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        review::reject_document(self, id, body, request).await
    }

    pub async fn request_changes(
        &self,
        id: i64,
        body: RequestChangesRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        review::request_changes(self, id, body, request).await
    }

    pub async fn set_workflow(
        &self,
        id: i64,
        body: SetWorkflowRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        review::set_workflow(self, id, body, request).await
    }

    pub async fn get_dashboard_stats(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        stats::get_dashboard_stats(self, request).await
    }
}
