use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::UserService;
use crate::middlewares::RequireJWT;
use crate::models::users::requests::{UpdateProfileRequest, UpdateUserRequest};
use crate::models::users::responses::UserResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::files::upload::{UploadPolicy, download_url, read_multipart, store_upload};
use crate::services::{storage_error_response, unauthorized};
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_name, validate_password, validate_phone};

fn validate_profile(update: &UpdateProfileRequest) -> Result<(), HttpResponse> {
    for name in [&update.first_name, &update.last_name].into_iter().flatten() {
        if let Err(msg) = validate_name(name) {
            return Err(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::UserNameInvalid, msg)));
        }
    }
    if let Some(phone) = &update.phone
        && let Err(msg) = validate_phone(phone)
    {
        return Err(
            HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, msg)),
        );
    }
    if let Some(password) = &update.password
        && let Err(msg) = validate_password(password)
    {
        return Err(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserPasswordInvalid, msg)));
    }
    Ok(())
}

async fn save_user_update(
    service: &UserService,
    user_id: i64,
    update: UpdateUserRequest,
    request: &HttpRequest,
    message: &str,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.update_user(user_id, update).await {
        Ok(Some(user)) => {
            RequireJWT::invalidate_user(request, user_id).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(UserResponse { user }, message)))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::UserNotFound,
            "User not found",
        ))),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::UserUpdateFailed)),
    }
}

/// 用户只能修改自己的姓名、电话和密码
pub async fn update_profile(
    service: &UserService,
    update_data: UpdateProfileRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(user_id) = RequireJWT::extract_user_id(request) else {
        return Ok(unauthorized());
    };

    if let Err(response) = validate_profile(&update_data) {
        return Ok(response);
    }

    let password = match update_data.password {
        Some(password) => match hash_password(&password) {
            Ok(hash) => Some(hash),
            Err(e) => {
                return Ok(
                    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                        ErrorCode::InternalServerError,
                        format!("Password hashing failed: {e}"),
                    )),
                );
            }
        },
        None => None,
    };

    let update = UpdateUserRequest {
        first_name: update_data.first_name,
        last_name: update_data.last_name,
        phone: update_data.phone,
        password,
        ..Default::default()
    };

    save_user_update(service, user_id, update, request, "Profile updated successfully").await
}

pub async fn upload_avatar(
    service: &UserService,
    payload: Multipart,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(user_id) = RequireJWT::extract_user_id(request) else {
        return Ok(unauthorized());
    };

    let form = match read_multipart(payload, "avatar", UploadPolicy::Image).await {
        Ok(form) => form,
        Err(e) => return Ok(e.to_response()),
    };
    let Some(avatar) = form.file else {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::FileNotFound,
            "No avatar found in upload payload",
        )));
    };

    let storage = service.get_storage(request);
    let file = match store_upload(&storage, avatar, Some(user_id)).await {
        Ok(file) => file,
        Err(e) => return Ok(e.to_response()),
    };

    let update = UpdateUserRequest {
        avatar_url: Some(download_url(&file)),
        ..Default::default()
    };
    save_user_update(service, user_id, update, request, "Avatar updated successfully").await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_validation() {
        let ok = UpdateProfileRequest {
            first_name: Some("Grace".into()),
            last_name: None,
            phone: Some("+1 555 0100".into()),
            password: None,
        };
        assert!(validate_profile(&ok).is_ok());

        let bad_phone = UpdateProfileRequest {
            first_name: None,
            last_name: None,
            phone: Some("nope".into()),
            password: None,
        };
        assert!(validate_profile(&bad_phone).is_err());
    }
}
