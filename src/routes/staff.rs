use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::documents::requests::{
    DocumentChanges, DocumentListParams, RejectDocumentRequest, RequestChangesRequest,
    SetWorkflowRequest,
};
use crate::models::staff::requests::{CreateStaffRequest, StaffListParams, UpdateStaffRequest};
use crate::models::users::entities::UserRole;
use crate::services::StaffService;
use crate::utils::SafeIDI64;

static STAFF_SERVICE: Lazy<StaffService> = Lazy::new(StaffService::new_lazy);

// 管理员
pub async fn list_staff(
    req: HttpRequest,
    query: web::Query<StaffListParams>,
) -> ActixResult<HttpResponse> {
    STAFF_SERVICE.list_staff(query.into_inner(), &req).await
}

pub async fn create_staff(
    req: HttpRequest,
    body: web::Json<CreateStaffRequest>,
) -> ActixResult<HttpResponse> {
    STAFF_SERVICE.create_staff(body.into_inner(), &req).await
}

pub async fn get_staff(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    STAFF_SERVICE.get_staff(path.0, &req).await
}

pub async fn update_staff(
    req: HttpRequest,
    path: SafeIDI64,
    body: web::Json<UpdateStaffRequest>,
) -> ActixResult<HttpResponse> {
    STAFF_SERVICE
        .update_staff(path.0, body.into_inner(), &req)
        .await
}

pub async fn delete_staff(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    STAFF_SERVICE.delete_staff(path.0, &req).await
}

// 教职工
pub async fn list_my_documents(
    req: HttpRequest,
    query: web::Query<DocumentListParams>,
) -> ActixResult<HttpResponse> {
    STAFF_SERVICE
        .list_my_documents(query.into_inner(), &req)
        .await
}

pub async fn get_my_document(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    STAFF_SERVICE.get_my_document(path.0, &req).await
}

pub async fn update_document(
    req: HttpRequest,
    path: SafeIDI64,
    body: web::Json<DocumentChanges>,
) -> ActixResult<HttpResponse> {
    STAFF_SERVICE
        .update_document(path.0, body.into_inner(), &req)
        .await
}

pub async fn approve_document(
    req: HttpRequest,
    path: SafeIDI64,
    payload: Multipart,
) -> ActixResult<HttpResponse> {
    STAFF_SERVICE.approve_document(path.0, payload, &req).await
}

pub async fn reject_document(
    req: HttpRequest,
    path: SafeIDI64,
    body: web::Json<RejectDocumentRequest>,
) -> ActixResult<HttpResponse> {
    STAFF_SERVICE
        .reject_document(path.0, body.into_inner(), &req)
        .await
}

pub async fn request_changes(
    req: HttpRequest,
    path: SafeIDI64,
    body: web::Json<RequestChangesRequest>,
) -> ActixResult<HttpResponse> {
    STAFF_SERVICE
        .request_changes(path.0, body.into_inner(), &req)
        .await
}

pub async fn set_workflow(
    req: HttpRequest,
    path: SafeIDI64,
    body: web::Json<SetWorkflowRequest>,
) -> ActixResult<HttpResponse> {
    STAFF_SERVICE
        .set_workflow(path.0, body.into_inner(), &req)
        .await
}

pub async fn get_dashboard_stats(req: HttpRequest) -> ActixResult<HttpResponse> {
    STAFF_SERVICE.get_dashboard_stats(&req).await
}

// 配置路由；固定路径需在 /{id} 之前注册
pub fn configure_staff_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/staff")
            .wrap(middlewares::RequireJWT)
            .service(
                web::scope("/documents")
                    .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles()))
                    .route("", web::get().to(list_my_documents))
                    .route("/{id}", web::get().to(get_my_document))
                    .route("/{id}", web::patch().to(update_document))
                    .route("/{id}/approve", web::patch().to(approve_document))
                    .route("/{id}/reject", web::patch().to(reject_document))
                    .route("/{id}/request-changes", web::patch().to(request_changes))
                    .route("/{id}/set-workflow", web::patch().to(set_workflow)),
            )
            .service(
                web::resource("/dashboard-stats")
                    .route(web::get().to(get_dashboard_stats))
                    .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles())),
            )
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles()))
                    .route("", web::get().to(list_staff))
                    .route("", web::post().to(create_staff))
                    .route("/{id}", web::get().to(get_staff))
                    .route("/{id}", web::patch().to(update_staff))
                    .route("/{id}", web::delete().to(delete_staff)),
            ),
    );
}
