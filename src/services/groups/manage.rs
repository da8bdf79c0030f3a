use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::GroupService;
use crate::models::groups::requests::{
    CreateGroupRequest, GroupListParams, GroupListQuery, UpdateGroupRequest,
};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::storage_error_response;
use crate::utils::validate::validate_name;

fn group_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(
        ErrorCode::GroupNotFound,
        "Group not found",
    ))
}

fn conflict_or(err: &crate::errors::UniAdminError) -> HttpResponse {
    if crate::services::is_unique_violation(err) {
        return HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::GroupAlreadyExists,
            "A group with this name already exists",
        ));
    }
    storage_error_response(err, ErrorCode::InternalServerError)
}

pub async fn list_groups(
    service: &GroupService,
    query: GroupListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage
        .list_groups_with_pagination(GroupListQuery::from(query))
        .await
    {
        Ok(groups) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            groups,
            "Group list retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    }
}

pub async fn create_group(
    service: &GroupService,
    mut group: CreateGroupRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    group.name = group.name.trim().to_string();
    if let Err(msg) = validate_name(&group.name) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, msg)));
    }

    let storage = service.get_storage(request);
    match storage.create_group(group).await {
        Ok(group) => {
            tracing::info!("Group {} created", group.id);
            Ok(HttpResponse::Created().json(ApiResponse::success(group, "Group created successfully")))
        }
        Err(e) => Ok(conflict_or(&e)),
    }
}

pub async fn get_group(
    service: &GroupService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_group_by_id(id).await {
        Ok(Some(group)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            group,
            "Group retrieved successfully",
        ))),
        Ok(None) => Ok(group_not_found()),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    }
}

pub async fn update_group(
    service: &GroupService,
    id: i64,
    mut update: UpdateGroupRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    update.name = update.name.map(|n| n.trim().to_string());
    if let Some(name) = &update.name
        && let Err(msg) = validate_name(name)
    {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, msg)));
    }

    let storage = service.get_storage(request);
    match storage.update_group(id, update).await {
        Ok(Some(group)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            group,
            "Group updated successfully",
        ))),
        Ok(None) => Ok(group_not_found()),
        Err(e) => Ok(conflict_or(&e)),
    }
}

/// 院系随学院级联删除
pub async fn delete_group(
    service: &GroupService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.delete_group(id).await {
        Ok(true) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Group deleted successfully"))),
        Ok(false) => Ok(group_not_found()),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    }
}
