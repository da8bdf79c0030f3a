//! 学生：管理员维护档案，学生提交并跟踪自己的文档

pub mod documents;
pub mod manage;

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::mail::Mailer;
use crate::middlewares::RequireJWT;
use crate::models::documents::requests::DocumentListParams;
use crate::models::students::entities::Student;
use crate::models::students::requests::{
    CreateStudentRequest, StudentListParams, UpdateStudentRequest,
};
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

pub struct StudentService {
    storage: Option<Arc<dyn Storage>>,
}

impl StudentService {
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

    pub(crate) async fn current_student(
        &self,
        request: &HttpRequest,
    ) -> Result<Student, HttpResponse> {
        let Some(user_id) = RequireJWT::extract_user_id(request) else {
            return Err(super::unauthorized());
        };

        match self.get_storage(request).get_student_by_user_id(user_id).await {
            Ok(Some(student)) => Ok(student),
            Ok(None) => Err(HttpResponse::Forbidden().json(ApiResponse::error_empty(
                ErrorCode::StudentNotFound,
                "No student profile is linked to this account",
            ))),
            Err(e) => Err(super::storage_error_response(&e, ErrorCode::InternalServerError)),
        }
    }

    pub async fn list_students(
        &self,
        query: StudentListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        manage::list_students(self, query, request).await
    }

    pub async fn create_student(
        &self,
        student: CreateStudentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        manage::create_student(self, student, request).await
    }

    pub async fn get_student(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        manage::get_student(self, id, request).await
    }

    pub async fn update_student(
        &self,
        id: i64,
        update: UpdateStudentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        manage::update_student(self, id, update, request).await
    }

    pub async fn delete_student(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        manage::delete_student(self, id, request).await
    }

    // 学生提交文档
    pub async fn create_document(
        &self,
        payload: Multipart,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        documents::create_document(self, payload, request).await
    }

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

    pub async fn get_document_history(
        &self,
        id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        documents::get_document_history(self, id, request).await
    }

    pub async fn update_document(
        &self,
        id: i64,
        payload: Multipart,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        documents::update_document(self, id, payload, request).await
    }

    pub async fn delete_document(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        documents::delete_document(self, id, request).await
    }
}
