use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use super::DepartmentService;
use crate::models::departments::requests::{
    CreateDepartmentRequest, DepartmentListParams, DepartmentListQuery, UpdateDepartmentRequest,
};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{is_unique_violation, storage_error_response};
use crate::storage::Storage;
use crate::utils::validate::validate_name;

fn department_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(
        ErrorCode::DepartmentNotFound,
        "Department not found",
    ))
}

fn conflict_or(err: &crate::errors::UniAdminError) -> HttpResponse {
    if is_unique_violation(err) {
        return HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::DepartmentAlreadyExists,
            "A department with this name already exists in the group",
        ));
    }
    storage_error_response(err, ErrorCode::InternalServerError)
}

/// 院系必须挂在已存在的学院下
async fn ensure_group_exists(storage: &Arc<dyn Storage>, group_id: i64) -> Result<(), HttpResponse> {
    match storage.get_group_by_id(group_id).await {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::GroupNotFound,
            "Group not found",
        ))),
        Err(e) => Err(storage_error_response(&e, ErrorCode::InternalServerError)),
    }
}

pub async fn list_departments(
    service: &DepartmentService,
    query: DepartmentListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage
        .list_departments_with_pagination(DepartmentListQuery::from(query))
        .await
    {
        Ok(departments) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            departments,
            "Department list retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    }
}

pub async fn create_department(
    service: &DepartmentService,
    mut department: CreateDepartmentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    department.name = department.name.trim().to_string();
    if let Err(msg) = validate_name(&department.name) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, msg)));
    }

    let storage = service.get_storage(request);
    if let Err(response) = ensure_group_exists(&storage, department.group_id).await {
        return Ok(response);
    }

    match storage.create_department(department).await {
        Ok(department) => {
            tracing::info!(
                "Department {} created in group {}",
                department.id,
                department.group_id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                department,
                "Department created successfully",
            )))
        }
        Err(e) => Ok(conflict_or(&e)),
    }
}

pub async fn get_department(
    service: &DepartmentService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_department_by_id(id).await {
        Ok(Some(department)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            department,
            "Department retrieved successfully",
        ))),
        Ok(None) => Ok(department_not_found()),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    }
}

pub async fn update_department(
    service: &DepartmentService,
    id: i64,
    mut update: UpdateDepartmentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    update.name = update.name.map(|n| n.trim().to_string());
    if let Some(name) = &update.name
        && let Err(msg) = validate_name(name)
    {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, msg)));
    }

    let storage = service.get_storage(request);
    if let Some(group_id) = update.group_id
        && let Err(response) = ensure_group_exists(&storage, group_id).await
    {
        return Ok(response);
    }

    match storage.update_department(id, update).await {
        Ok(Some(department)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            department,
            "Department updated successfully",
        ))),
        Ok(None) => Ok(department_not_found()),
        Err(e) => Ok(conflict_or(&e)),
    }
}

/// 仍有教职工或学生归属时删除会因外键约束失败，返回 409
pub async fn delete_department(
    service: &DepartmentService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.delete_department(id).await {
        Ok(true) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
            "Department deleted successfully",
        ))),
        Ok(false) => Ok(department_not_found()),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    }
}
