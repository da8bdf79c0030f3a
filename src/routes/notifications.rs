use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RequireJWT};
use crate::models::notifications::requests::NotificationListParams;
use crate::services::NotificationService;
use crate::utils::SafeNotificationIdI64;

static NOTIFICATION_SERVICE: Lazy<NotificationService> =
    Lazy::new(NotificationService::new_lazy);

pub async fn list_notifications(
    req: HttpRequest,
    query: web::Query<NotificationListParams>,
) -> ActixResult<HttpResponse> {
    let Some(user_id) = RequireJWT::extract_user_id(&req) else {
        return Ok(crate::services::unauthorized());
    };
    NOTIFICATION_SERVICE
        .list_notifications(&req, user_id, query.into_inner())
        .await
}

pub async fn get_unread_count(req: HttpRequest) -> ActixResult<HttpResponse> {
    let Some(user_id) = RequireJWT::extract_user_id(&req) else {
        return Ok(crate::services::unauthorized());
    };
    NOTIFICATION_SERVICE.get_unread_count(&req, user_id).await
}

pub async fn mark_as_read(
    req: HttpRequest,
    path: SafeNotificationIdI64,
) -> ActixResult<HttpResponse> {
    let Some(user_id) = RequireJWT::extract_user_id(&req) else {
        return Ok(crate::services::unauthorized());
    };
    NOTIFICATION_SERVICE.mark_as_read(&req, user_id, path.0).await
}

pub async fn mark_all_as_read(req: HttpRequest) -> ActixResult<HttpResponse> {
    let Some(user_id) = RequireJWT::extract_user_id(&req) else {
        return Ok(crate::services::unauthorized());
    };
    NOTIFICATION_SERVICE.mark_all_as_read(&req, user_id).await
}

pub async fn delete_notification(
    req: HttpRequest,
    path: SafeNotificationIdI64,
) -> ActixResult<HttpResponse> {
    let Some(user_id) = RequireJWT::extract_user_id(&req) else {
        return Ok(crate::services::unauthorized());
    };
    NOTIFICATION_SERVICE
        .delete_notification(&req, user_id, path.0)
        .await
}

// 只能操作自己的通知
pub fn configure_notification_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/notifications")
            .wrap(middlewares::RequireJWT)
            .route("", web::get().to(list_notifications))
            .route("/unread-count", web::get().to(get_unread_count))
            .route("/read-all", web::patch().to(mark_all_as_read))
            .route("/{notification_id}/read", web::patch().to(mark_as_read))
            .route("/{notification_id}", web::delete().to(delete_notification)),
    );
}
