use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::UserService;
use crate::models::{
    ApiResponse, ErrorCode,
    users::{requests::CreateUserRequest, responses::UserResponse},
};
use crate::services::{ensure_email_available, storage_error_response, validate_account_fields};
use crate::utils::password::hash_password;

pub async fn create_user(
    service: &UserService,
    mut user_data: CreateUserRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    user_data.email = user_data.email.trim().to_lowercase();
    if let Err(response) = validate_account_fields(
        &user_data.first_name,
        &user_data.last_name,
        &user_data.email,
        user_data.phone.as_deref(),
        Some(&user_data.password),
    ) {
        return Ok(response);
    }

    if let Err(response) = ensure_email_available(&storage, &user_data.email, None).await {
        return Ok(response);
    }

    user_data.password = match hash_password(&user_data.password) {
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

    match storage.create_user(user_data).await {
        Ok(user) => {
            tracing::info!("User {} created with role {}", user.id, user.role);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                UserResponse { user },
                "User created successfully",
            )))
        }
        Err(e) => Ok(storage_error_response(&e, ErrorCode::UserCreationFailed)),
    }
}
