//! 通知存储操作
//!
//! 读写都按接收人过滤，别人的通知对调用方表现为不存在。

use super::{SeaOrmStorage, db_err};
use crate::entity::notifications::{ActiveModel, Column, Entity as Notifications};
use crate::errors::Result;
use crate::models::{
    PaginationInfo,
    notifications::{
        entities::Notification,
        requests::{CreateNotificationRequest, NotificationListQuery},
        responses::NotificationListResponse,
    },
};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Select,
    Set,
};

fn inbox(user_id: i64, unread_only: bool) -> Select<Notifications> {
    let select = Notifications::find().filter(Column::UserId.eq(user_id));
    if unread_only {
        select.filter(Column::IsRead.eq(false))
    } else {
        select
    }
}

impl SeaOrmStorage {
    pub async fn create_notification_impl(
        &self,
        req: CreateNotificationRequest,
    ) -> Result<Notification> {
        let model = ActiveModel {
            user_id: Set(req.user_id),
            title: Set(req.title),
            content: Set(req.content),
            is_read: Set(false),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(db_err("创建通知失败"))?;

        Ok(model.into_notification())
    }

    /// 最新的在前
    pub async fn list_notifications_with_pagination_impl(
        &self,
        user_id: i64,
        query: NotificationListQuery,
    ) -> Result<NotificationListResponse> {
        let page = query.page.max(1);
        let size = query.size.clamp(1, 100);

        let paginator = inbox(user_id, query.unread_only)
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .paginate(&self.db, size);

        let counts = paginator
            .num_items_and_pages()
            .await
            .map_err(db_err("查询通知总数失败"))?;
        let items = paginator
            .fetch_page(page - 1)
            .await
            .map_err(db_err("查询通知列表失败"))?;

        Ok(NotificationListResponse {
            items: items.into_iter().map(|m| m.into_notification()).collect(),
            pagination: PaginationInfo::new(
                page,
                size,
                counts.number_of_items,
                counts.number_of_pages,
            ),
        })
    }

    pub async fn get_unread_notification_count_impl(&self, user_id: i64) -> Result<i64> {
        let count = inbox(user_id, true)
            .count(&self.db)
            .await
            .map_err(db_err("查询未读通知数量失败"))?;

        Ok(count as i64)
    }

    /// 返回是否命中该用户的通知
    pub async fn mark_notification_as_read_impl(
        &self,
        user_id: i64,
        notification_id: i64,
    ) -> Result<bool> {
        let result = Notifications::update_many()
            .col_expr(Column::IsRead, Expr::value(true))
            .filter(Column::Id.eq(notification_id))
            .filter(Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(db_err("标记通知已读失败"))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn mark_all_notifications_as_read_impl(&self, user_id: i64) -> Result<i64> {
        let result = Notifications::update_many()
            .col_expr(Column::IsRead, Expr::value(true))
            .filter(Column::UserId.eq(user_id))
            .filter(Column::IsRead.eq(false))
            .exec(&self.db)
            .await
            .map_err(db_err("标记全部通知已读失败"))?;

        Ok(result.rows_affected as i64)
    }

    pub async fn delete_notification_impl(&self, user_id: i64, notification_id: i64) -> Result<bool> {
        let result = Notifications::delete_many()
            .filter(Column::Id.eq(notification_id))
            .filter(Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(db_err("删除通知失败"))?;

        Ok(result.rows_affected > 0)
    }
}
