use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use super::StaffService;
use crate::middlewares::RequireJWT;
use crate::models::staff::requests::{
    CreateStaffRequest, StaffListParams, StaffListQuery, UpdateStaffRequest,
};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{ensure_email_available, storage_error_response, validate_account_fields};
use crate::storage::Storage;
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_name, validate_phone};

fn staff_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(
        ErrorCode::StaffNotFound,
        "Staff not found",
    ))
}

pub(crate) async fn ensure_department_exists(
    storage: &Arc<dyn Storage>,
    department_id: i64,
) -> Result<(), HttpResponse> {
    match storage.get_department_by_id(department_id).await {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::DepartmentNotFound,
            "Department not found",
        ))),
        Err(e) => Err(storage_error_response(&e, ErrorCode::InternalServerError)),
    }
}

pub async fn list_staff(
    service: &StaffService,
    query: StaffListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage
        .list_staff_with_pagination(StaffListQuery::from(query))
        .await
    {
        Ok(staff) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            staff,
            "Staff list retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    }
}

/// 账号、用户设置和教职工档案在存储层同一事务中创建
pub async fn create_staff(
    service: &StaffService,
    mut staff: CreateStaffRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    staff.email = staff.email.trim().to_lowercase();
    staff.designation = staff.designation.trim().to_string();

    if let Err(response) = validate_account_fields(
        &staff.first_name,
        &staff.last_name,
        &staff.email,
        staff.phone.as_deref(),
        Some(&staff.password),
    ) {
        return Ok(response);
    }
    if let Err(msg) = validate_name(&staff.designation) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, msg)));
    }

    let storage = service.get_storage(request);
    if let Err(response) = ensure_department_exists(&storage, staff.department_id).await {
        return Ok(response);
    }
    if let Err(response) = ensure_email_available(&storage, &staff.email, None).await {
        return Ok(response);
    }

    staff.password = match hash_password(&staff.password) {
        Ok(hash) => hash,
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Password hashing failed: {e}"),
                )),
            );
        }
    };

    match storage.create_staff(staff).await {
        Ok(staff) => {
            tracing::info!("Staff {} created for user {}", staff.id, staff.user_id);
            Ok(HttpResponse::Created().json(ApiResponse::success(staff, "Staff created successfully")))
        }
        Err(e) => Ok(storage_error_response(&e, ErrorCode::UserCreationFailed)),
    }
}

pub async fn get_staff(
    service: &StaffService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_staff_by_id(id).await {
        Ok(Some(staff)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            staff,
            "Staff retrieved successfully",
        ))),
        Ok(None) => Ok(staff_not_found()),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    }
}

pub async fn update_staff(
    service: &StaffService,
    id: i64,
    update: UpdateStaffRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    for value in [&update.first_name, &update.last_name, &update.designation]
        .into_iter()
        .flatten()
    {
        if let Err(msg) = validate_name(value) {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, msg)));
        }
    }
    if let Some(phone) = &update.phone
        && let Err(msg) = validate_phone(phone)
    {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, msg)));
    }

    let storage = service.get_storage(request);
    if let Some(department_id) = update.department_id
        && let Err(response) = ensure_department_exists(&storage, department_id).await
    {
        return Ok(response);
    }

    match storage.update_staff(id, update).await {
        Ok(Some(staff)) => {
            RequireJWT::invalidate_user(request, staff.user_id).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(staff, "Staff updated successfully")))
        }
        Ok(None) => Ok(staff_not_found()),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::UserUpdateFailed)),
    }
}

/// 同时删除关联账号
pub async fn delete_staff(
    service: &StaffService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let staff = match storage.get_staff_by_id(id).await {
        Ok(Some(staff)) => staff,
        Ok(None) => return Ok(staff_not_found()),
        Err(e) => return Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    };

    if RequireJWT::extract_user_id(request) == Some(staff.user_id) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::CanNotDeleteCurrentUser,
            "Cannot delete current user",
        )));
    }

    match storage.delete_staff(id).await {
        Ok(true) => {
            RequireJWT::invalidate_user(request, staff.user_id).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Staff deleted successfully")))
        }
        Ok(false) => Ok(staff_not_found()),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::UserDeleteFailed)),
    }
}
