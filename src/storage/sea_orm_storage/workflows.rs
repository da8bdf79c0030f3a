//! 审批流程存储操作

use super::{SeaOrmStorage, db_err};
use crate::entity::workflows::{ActiveModel, Column, Entity as Workflows};
use crate::errors::Result;
use crate::models::{
    PaginationInfo,
    workflows::{
        entities::Workflow,
        requests::{CreateWorkflowRequest, UpdateWorkflowRequest, WorkflowListQuery},
        responses::WorkflowListResponse,
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    pub async fn create_workflow_impl(
        &self,
        req: CreateWorkflowRequest,
        created_by: i64,
    ) -> Result<Workflow> {
        let now = chrono::Utc::now().timestamp();
        let steps = serde_json::to_string(&req.steps)?;

        let model = ActiveModel {
            department_id: Set(req.department_id),
            name: Set(req.name),
            steps: Set(steps),
            created_by: Set(created_by),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(db_err("创建审批流程失败"))?;

        Ok(result.into_workflow())
    }

    pub async fn get_workflow_by_id_impl(&self, id: i64) -> Result<Option<Workflow>> {
        let result = Workflows::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("查询审批流程失败"))?;

        Ok(result.map(|m| m.into_workflow()))
    }

    pub async fn list_workflows_with_pagination_impl(
        &self,
        query: WorkflowListQuery,
    ) -> Result<WorkflowListResponse> {
        let page = query.page.max(1);
        let size = query.size.clamp(1, 100);

        let mut select = Workflows::find();
        if let Some(department_id) = query.department_id {
            select = select.filter(Column::DepartmentId.eq(department_id));
        }

        let paginator = select.order_by_asc(Column::Id).paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(db_err("查询审批流程总数失败"))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(db_err("查询审批流程页数失败"))?;
        let workflows = paginator
            .fetch_page(page - 1)
            .await
            .map_err(db_err("查询审批流程列表失败"))?;

        Ok(WorkflowListResponse {
            items: workflows.into_iter().map(|m| m.into_workflow()).collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    pub async fn update_workflow_impl(
        &self,
        id: i64,
        update: UpdateWorkflowRequest,
    ) -> Result<Option<Workflow>> {
        if self.get_workflow_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(name) = update.name {
            model.name = Set(name);
        }

        if let Some(steps) = update.steps {
            model.steps = Set(serde_json::to_string(&steps)?);
        }

        model
            .update(&self.db)
            .await
            .map_err(db_err("更新审批流程失败"))?;

        self.get_workflow_by_id_impl(id).await
    }

    pub async fn delete_workflow_impl(&self, id: i64) -> Result<bool> {
        let result = Workflows::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err("删除审批流程失败"))?;

        Ok(result.rows_affected > 0)
    }
}
