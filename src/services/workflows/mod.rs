pub mod manage;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::workflows::requests::{
    CreateWorkflowRequest, UpdateWorkflowRequest, WorkflowListParams,
};
use crate::storage::Storage;

pub struct WorkflowService {
    storage: Option<Arc<dyn Storage>>,
}

impl WorkflowService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        match &self.storage {
            Some(storage) => storage.clone(),
            None => super::storage_from(request),
        }
    }

    pub async fn list_workflows(
        &self,
        query: WorkflowListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        manage::list_workflows(self, query, request).await
    }

    pub async fn create_workflow(
        &self,
        workflow: CreateWorkflowRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        manage::create_workflow(self, workflow, request).await
    }

    pub async fn get_workflow(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        manage::get_workflow(self, id, request).await
    }

    pub async fn update_workflow(
        &self,
        id: i64,
        update: UpdateWorkflowRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        manage::update_workflow(self, id, update, request).await
    }

    pub async fn delete_workflow(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        manage::delete_workflow(self, id, request).await
    }
}
