use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::UserService;
use crate::models::users::entities::UserRole;
use crate::models::users::responses::UserDetailResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::storage_error_response;

pub async fn get_user(
    service: &UserService,
    user_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let user = match storage.get_user_by_id(user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::UserNotFound,
                "User not found",
            )));
        }
        Err(e) => return Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    };

    // 只按角色查对应档案
    let profiles = match user.role {
        UserRole::Staff => storage
            .get_staff_by_user_id(user.id)
            .await
            .map(|staff| (staff, None)),
        UserRole::Student => storage
            .get_student_by_user_id(user.id)
            .await
            .map(|student| (None, student)),
        UserRole::User | UserRole::Admin => Ok((None, None)),
    };
    let (staff, student) = match profiles {
        Ok(found) => found,
        Err(e) => return Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        UserDetailResponse {
            user,
            staff,
            student,
        },
        "User information retrieved successfully",
    )))
}
