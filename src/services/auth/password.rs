use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::mail::{self, MailTemplate};
use crate::models::auth::requests::{ForgotPasswordRequest, ResetPasswordRequest};
use crate::models::users::entities::User;
use crate::models::{ApiResponse, ErrorCode};
use crate::utils::jwt::JwtUtils;
use crate::utils::password::hash_password;
use crate::utils::validate::validate_password;

use super::AuthService;

fn invalid_reset_token() -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(
        ErrorCode::ResetTokenInvalid,
        "Reset token is invalid or expired",
    ))
}

/// 令牌需与用户当前保存的一致且未过期
pub fn reset_token_matches(user: &User, token: &str, now: chrono::DateTime<chrono::Utc>) -> bool {
    match (&user.reset_token, user.reset_token_expiry) {
        (Some(stored), Some(expiry)) => stored == token && expiry > now,
        _ => false,
    }
}

pub async fn handle_forgot_password(
    service: &AuthService,
    forgot_request: ForgotPasswordRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let config = service.get_config();
    let email = forgot_request.email.trim().to_lowercase();

    let user = match storage.get_user_by_email(&email).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::UserNotFound,
                "User not found",
            )));
        }
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Failed to look up user: {e}"),
                )),
            );
        }
    };

    let token = match JwtUtils::generate_reset_token(user.id, &user.role.to_string()) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!("Failed to generate reset token: {}", e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Unable to generate reset token",
                )),
            );
        }
    };

    let expires_in = config.jwt.reset_token_expiry;
    let expires_at = chrono::Utc::now().timestamp() + expires_in;

    if let Err(e) = storage.save_reset_token(user.id, &token, expires_at).await {
        return Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to save reset token: {e}"),
            )),
        );
    }

    match service.get_mailer(request) {
        Some(mailer) => {
            mail::deliver(
                mailer.as_ref(),
                &user.email,
                MailTemplate::ForgotPassword {
                    hash: token,
                    expires: expires_in / 60,
                },
            )
            .await
        }
        None => tracing::warn!("No mailer configured, reset mail for user {} not sent", user.id),
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
        "Password reset instructions have been sent",
    )))
}

pub async fn handle_reset_password(
    service: &AuthService,
    reset_request: ResetPasswordRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Ok(claims) = JwtUtils::verify_reset_token(&reset_request.token) else {
        return Ok(invalid_reset_token());
    };
    let Some(user_id) = claims.user_id() else {
        return Ok(invalid_reset_token());
    };

    if let Err(msg) = validate_password(&reset_request.password) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::UserPasswordInvalid,
            msg,
        )));
    }

    let user = match storage.get_user_by_id(user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => return Ok(invalid_reset_token()),
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Failed to look up user: {e}"),
                )),
            );
        }
    };

    if !reset_token_matches(&user, &reset_request.token, chrono::Utc::now()) {
        return Ok(invalid_reset_token());
    }

    let password_hash = match hash_password(&reset_request.password) {
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

    match storage.save_password(user.id, &password_hash).await {
        Ok(true) => {
            tracing::info!("Password reset for user {}", user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Password has been reset")))
        }
        Ok(false) => Ok(invalid_reset_token()),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to save password: {e}"),
            )),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::{UserRole, UserStatus};

    fn user_with_token(token: Option<&str>, expiry: Option<chrono::DateTime<chrono::Utc>>) -> User {
        let now = chrono::Utc::now();
        User {
            id: 3,
            email: "ada@uni.test".to_string(),
            password_hash: String::new(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            phone: None,
            role: UserRole::User,
            status: UserStatus::Active,
            avatar_url: None,
            reset_token: token.map(str::to_string),
            reset_token_expiry: expiry,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_reset_token_must_match_and_be_fresh() {
        let now = chrono::Utc::now();
        let later = now + chrono::TimeDelta::minutes(30);
        let earlier = now - chrono::TimeDelta::minutes(1);

        assert!(reset_token_matches(&user_with_token(Some("t1"), Some(later)), "t1", now));
        assert!(!reset_token_matches(&user_with_token(Some("t1"), Some(later)), "t2", now));
        assert!(!reset_token_matches(&user_with_token(Some("t1"), Some(earlier)), "t1", now));
        // 使用后令牌被清除
        assert!(!reset_token_matches(&user_with_token(None, None), "t1", now));
    }
}
