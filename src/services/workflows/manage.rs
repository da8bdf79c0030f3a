use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use super::WorkflowService;
use crate::middlewares::RequireJWT;
use crate::models::workflows::entities::Workflow;
use crate::models::workflows::requests::{
    CreateWorkflowRequest, UpdateWorkflowRequest, WorkflowListParams, WorkflowListQuery,
};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{storage_error_response, unauthorized};
use crate::storage::Storage;
use crate::utils::validate::validate_name;

fn workflow_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(
        ErrorCode::WorkflowNotFound,
        "Workflow not found",
    ))
}

fn invalid_workflow(msg: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::WorkflowInvalid, msg))
}

/// 步骤非空、不重复，且每一步都是已存在的教职工
async fn check_steps(storage: &Arc<dyn Storage>, steps: &[i64]) -> Result<(), HttpResponse> {
    Workflow::validate_steps(steps).map_err(invalid_workflow)?;

    for &staff_id in steps {
        match storage.get_staff_by_id(staff_id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return Err(invalid_workflow(format!(
                    "Staff {staff_id} in workflow steps does not exist"
                )));
            }
            Err(e) => return Err(storage_error_response(&e, ErrorCode::InternalServerError)),
        }
    }
    Ok(())
}

pub async fn list_workflows(
    service: &WorkflowService,
    query: WorkflowListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage
        .list_workflows_with_pagination(WorkflowListQuery::from(query))
        .await
    {
        Ok(workflows) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            workflows,
            "Workflow list retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    }
}

pub async fn create_workflow(
    service: &WorkflowService,
    mut workflow: CreateWorkflowRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(user_id) = RequireJWT::extract_user_id(request) else {
        return Ok(unauthorized());
    };

    workflow.name = workflow.name.trim().to_string();
    if let Err(msg) = validate_name(&workflow.name) {
        return Ok(invalid_workflow(msg));
    }

    let storage = service.get_storage(request);

    match storage.get_department_by_id(workflow.department_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::DepartmentNotFound,
                "Department not found",
            )));
        }
        Err(e) => return Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    }

    if let Err(response) = check_steps(&storage, &workflow.steps).await {
        return Ok(response);
    }

    match storage.create_workflow(workflow, user_id).await {
        Ok(workflow) => {
            tracing::info!(
                "Workflow {} created with {} steps",
                workflow.id,
                workflow.steps.len()
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                workflow,
                "Workflow created successfully",
            )))
        }
        Err(e) => Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    }
}

pub async fn get_workflow(
    service: &WorkflowService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_workflow_by_id(id).await {
        Ok(Some(workflow)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            workflow,
            "Workflow retrieved successfully",
        ))),
        Ok(None) => Ok(workflow_not_found()),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    }
}

/// 修改步骤不影响已在流转中的文档的当前负责人
pub async fn update_workflow(
    service: &WorkflowService,
    id: i64,
    mut update: UpdateWorkflowRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    update.name = update.name.map(|n| n.trim().to_string());
    if let Some(name) = &update.name
        && let Err(msg) = validate_name(name)
    {
        return Ok(invalid_workflow(msg));
    }

    let storage = service.get_storage(request);
    if let Some(steps) = &update.steps
        && let Err(response) = check_steps(&storage, steps).await
    {
        return Ok(response);
    }

    match storage.update_workflow(id, update).await {
        Ok(Some(workflow)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            workflow,
            "Workflow updated successfully",
        ))),
        Ok(None) => Ok(workflow_not_found()),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    }
}

pub async fn delete_workflow(
    service: &WorkflowService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.delete_workflow(id).await {
        Ok(true) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
            "Workflow deleted successfully",
        ))),
        Ok(false) => Ok(workflow_not_found()),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    }
}
