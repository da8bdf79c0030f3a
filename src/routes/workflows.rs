use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::users::entities::UserRole;
use crate::models::workflows::requests::{
    CreateWorkflowRequest, UpdateWorkflowRequest, WorkflowListParams,
};
use crate::services::WorkflowService;
use crate::utils::SafeIDI64;

static WORKFLOW_SERVICE: Lazy<WorkflowService> = Lazy::new(WorkflowService::new_lazy);

pub async fn list_workflows(
    req: HttpRequest,
    query: web::Query<WorkflowListParams>,
) -> ActixResult<HttpResponse> {
    WORKFLOW_SERVICE
        .list_workflows(query.into_inner(), &req)
        .await
}

pub async fn create_workflow(
    req: HttpRequest,
    body: web::Json<CreateWorkflowRequest>,
) -> ActixResult<HttpResponse> {
    WORKFLOW_SERVICE
        .create_workflow(body.into_inner(), &req)
        .await
}

pub async fn get_workflow(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    WORKFLOW_SERVICE.get_workflow(path.0, &req).await
}

pub async fn update_workflow(
    req: HttpRequest,
    path: SafeIDI64,
    body: web::Json<UpdateWorkflowRequest>,
) -> ActixResult<HttpResponse> {
    WORKFLOW_SERVICE
        .update_workflow(path.0, body.into_inner(), &req)
        .await
}

pub async fn delete_workflow(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    WORKFLOW_SERVICE.delete_workflow(path.0, &req).await
}

// 教职工可创建和查看，修改与删除仅管理员
pub fn configure_workflow_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/workflows")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(web::get().to(list_workflows))
                    .route(web::post().to(create_workflow))
                    .wrap(middlewares::RequireRole::new_any(
                        UserRole::staff_or_admin_roles(),
                    )),
            )
            .service(
                web::resource("/{id}")
                    .route(
                        web::get()
                            .to(get_workflow)
                            .wrap(middlewares::RequireRole::new_any(
                                UserRole::staff_or_admin_roles(),
                            )),
                    )
                    .route(
                        web::patch()
                            .to(update_workflow)
                            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                    )
                    .route(
                        web::delete()
                            .to(delete_workflow)
                            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                    ),
            ),
    );
}
