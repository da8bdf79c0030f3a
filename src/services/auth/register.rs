use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::auth::requests::RegisterForm;
use crate::models::users::{entities::UserRole, requests::CreateUserRequest};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::files::upload::{
    MultipartForm, UploadPolicy, download_url, read_multipart, store_upload,
};
use crate::services::{ensure_email_available, storage_error_response, validate_account_fields};
use crate::utils::password::hash_password;

use super::AuthService;

impl RegisterForm {
    fn from_multipart(form: &MultipartForm) -> Self {
        Self {
            first_name: form.text("first_name").unwrap_or_default(),
            last_name: form.text("last_name").unwrap_or_default(),
            email: form.text("email").unwrap_or_default().to_lowercase(),
            password: form.fields.get("password").cloned().unwrap_or_default(),
            phone: form.text("phone"),
            avatar_url: None,
        }
    }
}

pub async fn handle_register(
    service: &AuthService,
    payload: Multipart,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let form = match read_multipart(payload, "avatar", UploadPolicy::Image).await {
        Ok(form) => form,
        Err(e) => return Ok(e.to_response()),
    };
    let mut register = RegisterForm::from_multipart(&form);

    if let Err(response) = validate_account_fields(
        &register.first_name,
        &register.last_name,
        &register.email,
        register.phone.as_deref(),
        Some(&register.password),
    ) {
        return Ok(response);
    }

    if let Err(response) = ensure_email_available(&storage, &register.email, None).await {
        return Ok(response);
    }

    // 校验通过后才落盘头像
    if let Some(avatar) = form.file {
        match store_upload(&storage, avatar, None).await {
            Ok(file) => register.avatar_url = Some(download_url(&file)),
            Err(e) => return Ok(e.to_response()),
        }
    }

    let password_hash = match hash_password(&register.password) {
        Ok(hash) => hash,
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::RegisterFailed,
                    format!("Password hashing failed: {e}"),
                )),
            );
        }
    };

    let create_request = CreateUserRequest {
        email: register.email,
        password: password_hash,
        first_name: register.first_name,
        last_name: register.last_name,
        phone: register.phone,
        role: UserRole::User,
        avatar_url: register.avatar_url,
    };

    match storage.create_user(create_request).await {
        Ok(user) => {
            tracing::info!("User {} registered", user.id);
            Ok(HttpResponse::Created().json(ApiResponse::success(user, "Registration successful")))
        }
        Err(e) => Ok(storage_error_response(&e, ErrorCode::RegisterFailed)),
    }
}
