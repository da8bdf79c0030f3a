use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::UserService;
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::storage_error_response;

/// 启动时创建的管理员账号
const SEED_ADMIN_ID: i64 = 1;

fn protected_account(target: i64, current: Option<i64>) -> Option<&'static str> {
    if target == SEED_ADMIN_ID {
        Some("The initial administrator cannot be deleted")
    } else if current == Some(target) {
        Some("Cannot delete the account you are signed in with")
    } else {
        None
    }
}

pub async fn delete_user(
    service: &UserService,
    user_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Some(reason) = protected_account(user_id, RequireJWT::extract_user_id(request)) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::CanNotDeleteCurrentUser,
            reason,
        )));
    }

    // 教职工和学生档案随账号级联删除
    match service.get_storage(request).delete_user(user_id).await {
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::UserNotFound,
            "User not found",
        ))),
        Ok(true) => {
            RequireJWT::invalidate_user(request, user_id).await;
            tracing::info!("User {} deleted", user_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("User deleted successfully")))
        }
        Err(e) => Ok(storage_error_response(&e, ErrorCode::UserDeleteFailed)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protected_accounts() {
        assert!(protected_account(SEED_ADMIN_ID, Some(7)).is_some());
        assert!(protected_account(7, Some(7)).is_some());
        assert!(protected_account(7, Some(8)).is_none());
        assert!(protected_account(7, None).is_none());
    }
}
