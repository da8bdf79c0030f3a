use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::StudentService;
use crate::middlewares::RequireJWT;
use crate::models::students::requests::{
    CreateStudentRequest, StudentListParams, StudentListQuery, UpdateStudentRequest,
};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::staff::manage::ensure_department_exists;
use crate::services::{
    ensure_email_available, is_unique_violation, storage_error_response, validate_account_fields,
};
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_matric_number, validate_name, validate_phone};

const MAX_LEVEL: i32 = 1000;

fn student_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(
        ErrorCode::StudentNotFound,
        "Student not found",
    ))
}

fn matric_taken() -> HttpResponse {
    HttpResponse::Conflict().json(ApiResponse::error_empty(
        ErrorCode::MatricNumberAlreadyExists,
        "Matric number already exists",
    ))
}

fn check_level(level: i32) -> Result<(), HttpResponse> {
    if (1..=MAX_LEVEL).contains(&level) {
        return Ok(());
    }
    Err(HttpResponse::BadRequest().json(ApiResponse::error_empty(
        ErrorCode::BadRequest,
        format!("Level must be between 1 and {MAX_LEVEL}"),
    )))
}

pub async fn list_students(
    service: &StudentService,
    query: StudentListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage
        .list_students_with_pagination(StudentListQuery::from(query))
        .await
    {
        Ok(students) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            students,
            "Student list retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    }
}

pub async fn create_student(
    service: &StudentService,
    mut student: CreateStudentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    student.email = student.email.trim().to_lowercase();
    student.matric_number = student.matric_number.trim().to_uppercase();

    if let Err(response) = validate_account_fields(
        &student.first_name,
        &student.last_name,
        &student.email,
        student.phone.as_deref(),
        Some(&student.password),
    ) {
        return Ok(response);
    }
    if let Err(msg) = validate_matric_number(&student.matric_number) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, msg)));
    }
    if let Err(response) = check_level(student.level) {
        return Ok(response);
    }

    let storage = service.get_storage(request);
    if let Err(response) = ensure_department_exists(&storage, student.department_id).await {
        return Ok(response);
    }
    if let Err(response) = ensure_email_available(&storage, &student.email, None).await {
        return Ok(response);
    }
    match storage
        .get_student_by_matric_number(&student.matric_number)
        .await
    {
        Ok(Some(_)) => return Ok(matric_taken()),
        Ok(None) => {}
        Err(e) => return Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    }

    student.password = match hash_password(&student.password) {
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

    match storage.create_student(student).await {
        Ok(student) => {
            tracing::info!("Student {} created for user {}", student.id, student.user_id);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                student,
                "Student created successfully",
            )))
        }
        // 并发创建时由唯一索引兜底
        Err(e) if is_unique_violation(&e) && e.message().contains("matric") => Ok(matric_taken()),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::UserCreationFailed)),
    }
}

pub async fn get_student(
    service: &StudentService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_student_by_id(id).await {
        Ok(Some(student)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            student,
            "Student retrieved successfully",
        ))),
        Ok(None) => Ok(student_not_found()),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    }
}

pub async fn update_student(
    service: &StudentService,
    id: i64,
    update: UpdateStudentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    for name in [&update.first_name, &update.last_name].into_iter().flatten() {
        if let Err(msg) = validate_name(name) {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::UserNameInvalid, msg)));
        }
    }
    if let Some(phone) = &update.phone
        && let Err(msg) = validate_phone(phone)
    {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, msg)));
    }
    if let Some(level) = update.level
        && let Err(response) = check_level(level)
    {
        return Ok(response);
    }

    let storage = service.get_storage(request);
    if let Some(department_id) = update.department_id
        && let Err(response) = ensure_department_exists(&storage, department_id).await
    {
        return Ok(response);
    }

    match storage.update_student(id, update).await {
        Ok(Some(student)) => {
            RequireJWT::invalidate_user(request, student.user_id).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                student,
                "Student updated successfully",
            )))
        }
        Ok(None) => Ok(student_not_found()),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::UserUpdateFailed)),
    }
}

/// 同时删除关联账号，其文档随外键级联删除
pub async fn delete_student(
    service: &StudentService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let student = match storage.get_student_by_id(id).await {
        Ok(Some(student)) => student,
        Ok(None) => return Ok(student_not_found()),
        Err(e) => return Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    };

    match storage.delete_student(id).await {
        Ok(true) => {
            RequireJWT::invalidate_user(request, student.user_id).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Student deleted successfully")))
        }
        Ok(false) => Ok(student_not_found()),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::UserDeleteFailed)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_bounds() {
        assert!(check_level(100).is_ok());
        assert!(check_level(0).is_err());
        assert!(check_level(MAX_LEVEL + 1).is_err());
    }
}
