use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::StaffService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::storage_error_response;

pub async fn get_dashboard_stats(
    service: &StaffService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let staff = match service.current_staff(request).await {
        Ok(staff) => staff,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);

    match storage.get_staff_statistics(staff.id, staff.user_id).await {
        Ok(stats) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            stats,
            "Statistics retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    }
}
