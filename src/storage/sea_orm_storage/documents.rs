//! 文档存储操作

use super::{SeaOrmStorage, db_err};
use crate::entity::document_actions::{
    ActiveModel as ActionActiveModel, Column as ActionColumn, Entity as DocumentActions,
};
use crate::entity::documents::{ActiveModel, Column, Entity as Documents, Model as DocumentModel};
use crate::errors::{Result, UniAdminError};
use crate::models::{
    PaginationInfo,
    documents::{
        entities::{Document, DocumentAction, DocumentActionKind, DocumentState},
        requests::{CreateDocumentRequest, DocumentChanges, DocumentListQuery},
        responses::DocumentListResponse,
        transitions::Transition,
    },
    staff::responses::StaffStatistics,
};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Select, Set, TransactionTrait,
};

/// 追加一条流转记录，调用方负责事务
async fn record_action<C: ConnectionTrait>(
    conn: &C,
    document_id: i64,
    actor_id: i64,
    action: DocumentActionKind,
    from: Option<DocumentState>,
    to: DocumentState,
    comment: Option<String>,
    attachment: Option<String>,
) -> Result<()> {
    ActionActiveModel {
        document_id: Set(document_id),
        actor_id: Set(actor_id),
        action: Set(action.to_string()),
        from_state: Set(from.map(|s| s.to_string())),
        to_state: Set(to.to_string()),
        comment: Set(comment),
        attachment: Set(attachment),
        created_at: Set(chrono::Utc::now().timestamp()),
        ..Default::default()
    }
    .insert(conn)
    .await
    .map_err(db_err("记录文档流转失败"))?;

    Ok(())
}

/// 某用户执行过的指定动作
fn performed_by(user_id: i64, kinds: &[DocumentActionKind]) -> Select<DocumentActions> {
    DocumentActions::find()
        .filter(ActionColumn::ActorId.eq(user_id))
        .filter(ActionColumn::Action.is_in(kinds.iter().map(|k| k.to_string())))
}

async fn find_document<C: ConnectionTrait>(conn: &C, id: i64) -> Result<Option<DocumentModel>> {
    Documents::find_by_id(id)
        .one(conn)
        .await
        .map_err(db_err("查询文档失败"))
}

impl SeaOrmStorage {
    /// 创建文档并记录提交动作
    pub async fn create_document_impl(
        &self,
        req: CreateDocumentRequest,
        actor_id: i64,
    ) -> Result<Document> {
        let now = chrono::Utc::now().timestamp();
        let txn = self
            .db
            .begin()
            .await
            .map_err(db_err("开启事务失败"))?;

        let document = ActiveModel {
            owner_id: Set(req.owner_id),
            department_id: Set(req.department_id),
            title: Set(req.title),
            description: Set(req.description),
            attachment: Set(req.attachment.clone()),
            state: Set(DocumentState::Pending.to_string()),
            workflow_id: Set(None),
            current_step: Set(None),
            currently_assigned_id: Set(Some(req.assigned_to)),
            reviewer_comment: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(db_err("创建文档失败"))?;

        record_action(
            &txn,
            document.id,
            actor_id,
            DocumentActionKind::Submit,
            None,
            DocumentState::Pending,
            None,
            req.attachment,
        )
        .await?;

        txn.commit()
            .await
            .map_err(db_err("提交事务失败"))?;

        Ok(document.into_document())
    }

    pub async fn get_document_by_id_impl(&self, id: i64) -> Result<Option<Document>> {
        Ok(find_document(&self.db, id)
            .await?
            .map(|m| m.into_document()))
    }

    pub async fn list_documents_with_pagination_impl(
        &self,
        query: DocumentListQuery,
    ) -> Result<DocumentListResponse> {
        let page = query.page.max(1);
        let size = query.size.clamp(1, 100);

        let mut select = Documents::find();

        if let Some(owner_id) = query.owner_id {
            select = select.filter(Column::OwnerId.eq(owner_id));
        }

        if let Some(staff_id) = query.assigned_to {
            select = select.filter(Column::CurrentlyAssignedId.eq(staff_id));
        }

        if let Some(state) = query.state {
            select = select.filter(Column::State.eq(state.to_string()));
        }

        select = select
            .order_by_desc(Column::UpdatedAt)
            .order_by_desc(Column::Id);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(db_err("查询文档总数失败"))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(db_err("查询文档页数失败"))?;
        let documents = paginator
            .fetch_page(page - 1)
            .await
            .map_err(db_err("查询文档列表失败"))?;

        Ok(DocumentListResponse {
            items: documents.into_iter().map(|m| m.into_document()).collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    /// 修改文档内容，状态保持不变
    ///
    /// 仅当文档仍处于 `expected` 状态时写入，否则返回状态错误并回滚。
    pub async fn update_document_content_impl(
        &self,
        id: i64,
        expected: DocumentState,
        changes: DocumentChanges,
        actor_id: i64,
    ) -> Result<Option<Document>> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(db_err("开启事务失败"))?;

        let mut update = Documents::update_many()
            .col_expr(Column::UpdatedAt, Expr::value(chrono::Utc::now().timestamp()));
        if let Some(title) = changes.title {
            update = update.col_expr(Column::Title, Expr::value(title));
        }
        if let Some(description) = changes.description {
            update = update.col_expr(Column::Description, Expr::value(description));
        }
        if let Some(ref attachment) = changes.attachment {
            update = update.col_expr(Column::Attachment, Expr::value(attachment.clone()));
        }

        let result = update
            .filter(Column::Id.eq(id))
            .filter(Column::State.eq(expected.to_string()))
            .exec(&txn)
            .await
            .map_err(db_err("更新文档失败"))?;

        if result.rows_affected == 0 {
            return match find_document(&txn, id).await? {
                None => Ok(None),
                Some(_) => Err(UniAdminError::invalid_state(format!(
                    "文档 {id} 已不处于 {expected} 状态"
                ))),
            };
        }

        record_action(
            &txn,
            id,
            actor_id,
            DocumentActionKind::Update,
            Some(expected),
            expected,
            None,
            changes.attachment,
        )
        .await?;

        let document = find_document(&txn, id)
            .await?
            .ok_or_else(|| UniAdminError::not_found(format!("文档 {id} 不存在")))?;

        txn.commit()
            .await
            .map_err(db_err("提交事务失败"))?;

        Ok(Some(document.into_document()))
    }

    /// 写入状态流转
    ///
    /// 以流转前的状态和负责人作为条件更新；若已被并发修改则返回状态错误并回滚。
    pub async fn apply_document_transition_impl(
        &self,
        id: i64,
        transition: Transition,
        changes: DocumentChanges,
        actor_id: i64,
    ) -> Result<Document> {
        let now = chrono::Utc::now().timestamp();
        let attachment = transition.attachment.clone().or(changes.attachment);

        let txn = self
            .db
            .begin()
            .await
            .map_err(db_err("开启事务失败"))?;

        let mut update = Documents::update_many()
            .col_expr(Column::State, Expr::value(transition.to.to_string()))
            .col_expr(Column::WorkflowId, Expr::value(transition.workflow_id))
            .col_expr(Column::CurrentStep, Expr::value(transition.current_step))
            .col_expr(
                Column::CurrentlyAssignedId,
                Expr::value(transition.assigned_to),
            )
            .col_expr(Column::UpdatedAt, Expr::value(now));

        if let Some(ref comment) = transition.comment {
            update = update.col_expr(Column::ReviewerComment, Expr::value(comment.clone()));
        }
        if let Some(ref attachment) = attachment {
            update = update.col_expr(Column::Attachment, Expr::value(attachment.clone()));
        }
        if let Some(title) = changes.title {
            update = update.col_expr(Column::Title, Expr::value(title));
        }
        if let Some(description) = changes.description {
            update = update.col_expr(Column::Description, Expr::value(description));
        }

        update = update
            .filter(Column::Id.eq(id))
            .filter(Column::State.eq(transition.from.to_string()));
        update = match transition.previous_assignee {
            Some(staff_id) => update.filter(Column::CurrentlyAssignedId.eq(staff_id)),
            None => update.filter(Column::CurrentlyAssignedId.is_null()),
        };

        let result = update
            .exec(&txn)
            .await
            .map_err(db_err("更新文档状态失败"))?;

        if result.rows_affected == 0 {
            // 事务未提交，丢弃时自动回滚
            return Err(UniAdminError::invalid_state(format!(
                "文档 {id} 已不处于 {} 状态",
                transition.from
            )));
        }

        record_action(
            &txn,
            id,
            actor_id,
            transition.action,
            Some(transition.from),
            transition.to,
            transition.comment,
            attachment,
        )
        .await?;

        let document = find_document(&txn, id)
            .await?
            .ok_or_else(|| UniAdminError::not_found(format!("文档 {id} 不存在")))?;

        txn.commit()
            .await
            .map_err(db_err("提交事务失败"))?;

        Ok(document.into_document())
    }

    /// 删除文档，流转记录随外键级联删除
    pub async fn delete_document_impl(&self, id: i64) -> Result<bool> {
        let result = Documents::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err("删除文档失败"))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn list_document_actions_impl(&self, document_id: i64) -> Result<Vec<DocumentAction>> {
        let actions = DocumentActions::find()
            .filter(ActionColumn::DocumentId.eq(document_id))
            .order_by_asc(ActionColumn::CreatedAt)
            .order_by_asc(ActionColumn::Id)
            .all(&self.db)
            .await
            .map_err(db_err("查询文档流转记录失败"))?;

        Ok(actions
            .into_iter()
            .map(|m| m.into_document_action())
            .collect())
    }

    /// 统计分配给教职工的文档以及其执行过的审批动作
    pub async fn get_staff_statistics_impl(
        &self,
        staff_id: i64,
        user_id: i64,
    ) -> Result<StaffStatistics> {
        let assigned = || Documents::find().filter(Column::CurrentlyAssignedId.eq(staff_id));
        let count_err = db_err("统计文档失败");

        let assigned_total = assigned().count(&self.db).await.map_err(&count_err)?;
        let pending = assigned()
            .filter(Column::State.eq(DocumentState::Pending.to_string()))
            .count(&self.db)
            .await
            .map_err(&count_err)?;
        let in_review = assigned()
            .filter(Column::State.eq(DocumentState::InReview.to_string()))
            .count(&self.db)
            .await
            .map_err(&count_err)?;

        let approved = performed_by(user_id, &[DocumentActionKind::Forward, DocumentActionKind::Approve])
            .count(&self.db)
            .await
            .map_err(&count_err)?;
        let rejected = performed_by(user_id, &[DocumentActionKind::Reject, DocumentActionKind::Return])
            .count(&self.db)
            .await
            .map_err(&count_err)?;
        let changes_requested = performed_by(user_id, &[DocumentActionKind::RequestChanges])
            .count(&self.db)
            .await
            .map_err(&count_err)?;

        Ok(StaffStatistics {
            assigned_total,
            pending,
            in_review,
            approved,
            rejected,
            changes_requested,
        })
    }

    pub async fn count_documents_impl(&self) -> Result<u64> {
        Documents::find()
            .count(&self.db)
            .await
            .map_err(db_err("统计文档数量失败"))
    }
}
