use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::UserService;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    users::{requests::UpdateUserRequest, responses::UserResponse},
};
use crate::services::{ensure_email_available, storage_error_response};
use crate::utils::validate::{
    validate_email, validate_name, validate_password, validate_phone,
};

/// 仅校验请求中出现的字段
fn validate_update(update: &UpdateUserRequest) -> Result<(), HttpResponse> {
    let bad = |code, msg: String| {
        Err(HttpResponse::BadRequest().json(ApiResponse::error_empty(code, msg)))
    };

    for name in [&update.first_name, &update.last_name].into_iter().flatten() {
        if let Err(msg) = validate_name(name) {
            return bad(ErrorCode::UserNameInvalid, msg.to_string());
        }
    }
    if let Some(email) = &update.email
        && let Err(msg) = validate_email(email)
    {
        return bad(ErrorCode::UserEmailInvalid, msg.to_string());
    }
    if let Some(phone) = &update.phone
        && let Err(msg) = validate_phone(phone)
    {
        return bad(ErrorCode::BadRequest, msg.to_string());
    }
    if let Some(password) = &update.password
        && let Err(msg) = validate_password(password)
    {
        return bad(ErrorCode::UserPasswordInvalid, msg);
    }
    Ok(())
}

pub async fn update_user(
    service: &UserService,
    user_id: i64,
    mut update_data: UpdateUserRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    update_data.email = update_data.email.map(|e| e.trim().to_lowercase());
    if let Err(response) = validate_update(&update_data) {
        return Ok(response);
    }

    if let Some(email) = &update_data.email
        && let Err(response) = ensure_email_available(&storage, email, Some(user_id)).await
    {
        return Ok(response);
    }

    if let Some(password) = update_data.password {
        match crate::utils::password::hash_password(&password) {
            Ok(hash) => update_data.password = Some(hash),
            Err(e) => {
                return Ok(
                    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                        ErrorCode::InternalServerError,
                        format!("Password hashing failed: {e}"),
                    )),
                );
            }
        }
    }

    match storage.update_user(user_id, update_data).await {
        Ok(Some(user)) => {
            // 角色或状态可能已变化
            RequireJWT::invalidate_user(request, user_id).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                UserResponse { user },
                "User information updated successfully",
            )))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::UserNotFound,
            "User not found",
        ))),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::UserUpdateFailed)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_update_validation() {
        assert!(validate_update(&UpdateUserRequest::default()).is_ok());

        let update = UpdateUserRequest {
            first_name: Some("Grace".to_string()),
            ..Default::default()
        };
        assert!(validate_update(&update).is_ok());

        let update = UpdateUserRequest {
            email: Some("grace@".to_string()),
            ..Default::default()
        };
        assert!(validate_update(&update).is_err());

        let update = UpdateUserRequest {
            password: Some("weak".to_string()),
            ..Default::default()
        };
        assert!(validate_update(&update).is_err());
    }
}
