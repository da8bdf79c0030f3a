use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::UserService;
use crate::errors::Result;
use crate::models::users::{entities::UserRole, responses::UserStatsResponse};
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

async fn collect_stats(storage: &dyn Storage) -> Result<UserStatsResponse> {
    Ok(UserStatsResponse {
        users: storage.count_users_by_role(UserRole::User).await?,
        admins: storage.count_users_by_role(UserRole::Admin).await?,
        staff: storage.count_staff().await?,
        students: storage.count_students().await?,
        documents: storage.count_documents().await?,
    })
}

pub async fn get_stats(service: &UserService, request: &HttpRequest) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match collect_stats(storage.as_ref()).await {
        Ok(stats) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            stats,
            "Statistics retrieved successfully",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to collect statistics: {e}"),
            )),
        ),
    }
}
