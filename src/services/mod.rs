pub mod auth;
pub mod departments;
pub mod files;
pub mod groups;
pub mod notifications;
pub mod staff;
pub mod students;
pub mod users;
pub mod workflows;

pub use auth::AuthService;
pub use departments::DepartmentService;
pub use files::FileService;
pub use groups::GroupService;
pub use notifications::NotificationService;
pub use staff::StaffService;
pub use students::StudentService;
pub use users::UserService;
pub use workflows::WorkflowService;

use actix_web::{HttpRequest, HttpResponse, web};
use std::sync::Arc;

use crate::errors::UniAdminError;
use crate::mail::Mailer;
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

pub(crate) fn storage_from(request: &HttpRequest) -> Arc<dyn Storage> {
    request
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .expect("Storage not found in app data")
        .get_ref()
        .clone()
}

/// 未配置邮件后端时不发信
pub(crate) fn mailer_from(request: &HttpRequest) -> Option<Arc<dyn Mailer>> {
    request
        .app_data::<web::Data<Arc<dyn Mailer>>>()
        .map(|data| data.get_ref().clone())
}

/// 唯一约束冲突（SQLite / PostgreSQL / MySQL）
pub(crate) fn is_unique_violation(err: &UniAdminError) -> bool {
    let msg = err.message();
    msg.contains("UNIQUE constraint failed")
        || msg.contains("duplicate key value")
        || msg.contains("Duplicate entry")
}

/// 外键约束阻止删除或引用了不存在的记录
pub(crate) fn is_foreign_key_violation(err: &UniAdminError) -> bool {
    let msg = err.message();
    msg.contains("FOREIGN KEY constraint failed")
        || msg.contains("violates foreign key constraint")
        || msg.contains("a foreign key constraint fails")
}

/// 将存储层错误转换为响应，未分类的错误使用 `fallback`
pub(crate) fn storage_error_response(err: &UniAdminError, fallback: ErrorCode) -> HttpResponse {
    let code = match err {
        UniAdminError::InvalidState(_) => ErrorCode::InvalidDocumentState,
        UniAdminError::Conflict(_) => ErrorCode::Conflict,
        UniAdminError::NotFound(_) => ErrorCode::NotFound,
        UniAdminError::Validation(_) => ErrorCode::BadRequest,
        _ if is_unique_violation(err) => {
            return HttpResponse::Conflict()
                .json(ApiResponse::error_empty(ErrorCode::Conflict, "Resource already exists"));
        }
        _ if is_foreign_key_violation(err) => {
            return HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::Conflict,
                "Resource is still referenced",
            ));
        }
        _ => fallback,
    };

    if !err.is_client_error() {
        tracing::error!("{}", err);
    }
    HttpResponse::build(err.status_code()).json(ApiResponse::error_empty(code, err.message()))
}

/// 账号字段校验，创建用户、注册、创建教职工和学生时共用
pub(crate) fn validate_account_fields(
    first_name: &str,
    last_name: &str,
    email: &str,
    phone: Option<&str>,
    password: Option<&str>,
) -> Result<(), HttpResponse> {
    use crate::utils::validate::{
        validate_email, validate_name, validate_password, validate_phone,
    };

    let bad_request = |code: ErrorCode, msg: String| {
        HttpResponse::BadRequest().json(ApiResponse::error_empty(code, msg))
    };

    for name in [first_name, last_name] {
        if let Err(msg) = validate_name(name) {
            return Err(bad_request(ErrorCode::UserNameInvalid, msg.to_string()));
        }
    }
    if let Err(msg) = validate_email(email) {
        return Err(bad_request(ErrorCode::UserEmailInvalid, msg.to_string()));
    }
    if let Some(phone) = phone
        && let Err(msg) = validate_phone(phone)
    {
        return Err(bad_request(ErrorCode::BadRequest, msg.to_string()));
    }
    if let Some(password) = password
        && let Err(msg) = validate_password(password)
    {
        return Err(bad_request(ErrorCode::UserPasswordInvalid, msg));
    }
    Ok(())
}

/// 邮箱已被占用时返回 409
pub(crate) async fn ensure_email_available(
    storage: &Arc<dyn Storage>,
    email: &str,
    except_user: Option<i64>,
) -> Result<(), HttpResponse> {
    match storage.get_user_by_email(email).await {
        Ok(Some(user)) if Some(user.id) != except_user => {
            Err(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::UserEmailAlreadyExists,
                "Email already exists",
            )))
        }
        Ok(_) => Ok(()),
        Err(e) => Err(storage_error_response(&e, ErrorCode::InternalServerError)),
    }
}

pub(crate) fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(ApiResponse::error_empty(
        ErrorCode::Unauthorized,
        "Unauthorized access, please login",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_account_field_validation() {
        assert!(validate_account_fields("Ada", "Lovelace", "ada@uni.test", None, None).is_ok());
        assert!(
            validate_account_fields("Ada", "Lovelace", "ada@uni.test", Some("+44 20 7946 0958"), Some("Passw0rdX"))
                .is_ok()
        );

        let res = validate_account_fields(" ", "Lovelace", "ada@uni.test", None, None).unwrap_err();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(validate_account_fields("Ada", "Lovelace", "not-an-email", None, None).is_err());
        assert!(validate_account_fields("Ada", "Lovelace", "ada@uni.test", Some("phone"), None).is_err());
        assert!(validate_account_fields("Ada", "Lovelace", "ada@uni.test", None, Some("short")).is_err());
    }

    #[test]
    fn test_storage_error_status() {
        let cases = [
            (UniAdminError::invalid_state("moved"), StatusCode::CONFLICT),
            (UniAdminError::not_found("gone"), StatusCode::NOT_FOUND),
            (UniAdminError::validation("bad"), StatusCode::BAD_REQUEST),
            (
                UniAdminError::database_operation("UNIQUE constraint failed: users.email"),
                StatusCode::CONFLICT,
            ),
            (
                UniAdminError::database_operation("FOREIGN KEY constraint failed"),
                StatusCode::CONFLICT,
            ),
            (
                UniAdminError::database_connection("refused"),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                UniAdminError::database_operation("disk I/O error"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(
                storage_error_response(&err, ErrorCode::InternalServerError).status(),
                status
            );
        }
    }
}
