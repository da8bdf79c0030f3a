//! 用户存储操作

use super::{SeaOrmStorage, db_err};
use crate::entity::user_settings::{
    ActiveModel as SettingsActiveModel, Column as SettingsColumn, Entity as UserSettingsEntity,
};
use crate::entity::users::{ActiveModel, Column, Entity as Users, Model as UserModel};
use crate::errors::Result;
use crate::models::{
    PaginationInfo,
    users::{
        entities::{User, UserRole, UserSettings, UserStatus},
        requests::{CreateUserRequest, UpdateUserRequest, UserListQuery},
        responses::UserListResponse,
    },
};
use crate::utils::escape_like_pattern;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Select, Set, TransactionTrait,
};

/// 插入账号和对应的设置行，调用方负责事务
///
/// 教职工、学生的建档也经由这里创建账号。
pub(super) async fn insert_user_with_settings<C: ConnectionTrait>(
    conn: &C,
    req: CreateUserRequest,
) -> Result<UserModel> {
    let now = chrono::Utc::now().timestamp();

    let user = ActiveModel {
        email: Set(req.email),
        password_hash: Set(req.password),
        first_name: Set(req.first_name),
        last_name: Set(req.last_name),
        phone: Set(req.phone),
        role: Set(req.role.to_string()),
        status: Set(UserStatus::Active.to_string()),
        avatar_url: Set(req.avatar_url),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(conn)
    .await
    .map_err(db_err("创建用户失败"))?;

    SettingsActiveModel {
        user_id: Set(user.id),
        is_email_verified: Set(false),
        is_phone_verified: Set(false),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(conn)
    .await
    .map_err(db_err("创建用户设置失败"))?;

    Ok(user)
}

/// 关键字同时匹配邮箱和姓名
fn search_users(query: &UserListQuery) -> Select<Users> {
    let mut select = Users::find();

    if let Some(keyword) = query.search.as_deref().map(str::trim)
        && !keyword.is_empty()
    {
        let pattern = escape_like_pattern(keyword);
        select = select.filter(
            Condition::any()
                .add(Column::Email.contains(&pattern))
                .add(Column::FirstName.contains(&pattern))
                .add(Column::LastName.contains(&pattern)),
        );
    }
    if let Some(role) = &query.role {
        select = select.filter(Column::Role.eq(role.to_string()));
    }
    if let Some(status) = &query.status {
        select = select.filter(Column::Status.eq(status.to_string()));
    }

    select
        .order_by_desc(Column::CreatedAt)
        .order_by_desc(Column::Id)
}

impl SeaOrmStorage {
    pub async fn create_user_impl(&self, req: CreateUserRequest) -> Result<User> {
        let txn = self.db.begin().await.map_err(db_err("开启事务失败"))?;
        let user = insert_user_with_settings(&txn, req).await?;
        txn.commit().await.map_err(db_err("提交事务失败"))?;

        Ok(user.into_user())
    }

    async fn find_user(&self, id: i64) -> Result<Option<UserModel>> {
        Users::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("查询用户失败"))
    }

    pub async fn get_user_by_id_impl(&self, id: i64) -> Result<Option<User>> {
        Ok(self.find_user(id).await?.map(UserModel::into_user))
    }

    /// 邮箱需已规范化为小写
    pub async fn get_user_by_email_impl(&self, email: &str) -> Result<Option<User>> {
        let found = Users::find()
            .filter(Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(db_err("查询用户失败"))?;

        Ok(found.map(UserModel::into_user))
    }

    pub async fn list_users_with_pagination_impl(
        &self,
        query: UserListQuery,
    ) -> Result<UserListResponse> {
        let page = query.page.max(1);
        let size = query.size.clamp(1, 100);

        let paginator = search_users(&query).paginate(&self.db, size);
        let counts = paginator
            .num_items_and_pages()
            .await
            .map_err(db_err("查询用户总数失败"))?;
        let users = paginator
            .fetch_page(page - 1)
            .await
            .map_err(db_err("查询用户列表失败"))?;

        Ok(UserListResponse {
            items: users.into_iter().map(UserModel::into_user).collect(),
            pagination: PaginationInfo::new(
                page,
                size,
                counts.number_of_items,
                counts.number_of_pages,
            ),
        })
    }

    pub async fn update_last_login_impl(&self, id: i64) -> Result<bool> {
        let result = Users::update_many()
            .col_expr(Column::LastLogin, Expr::value(chrono::Utc::now().timestamp()))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err("更新最后登录时间失败"))?;

        Ok(result.rows_affected > 0)
    }

    /// 只写入请求中出现的字段；`password` 须已哈希
    pub async fn update_user_impl(
        &self,
        id: i64,
        update: UpdateUserRequest,
    ) -> Result<Option<User>> {
        let Some(existing) = self.find_user(id).await? else {
            return Ok(None);
        };

        let mut model = existing.into_active_model();
        if let Some(email) = update.email {
            model.email = Set(email);
        }
        if let Some(hash) = update.password {
            model.password_hash = Set(hash);
        }
        if let Some(first_name) = update.first_name {
            model.first_name = Set(first_name);
        }
        if let Some(last_name) = update.last_name {
            model.last_name = Set(last_name);
        }
        if update.phone.is_some() {
            model.phone = Set(update.phone);
        }
        if let Some(role) = update.role {
            model.role = Set(role.to_string());
        }
        if let Some(status) = update.status {
            model.status = Set(status.to_string());
        }
        if update.avatar_url.is_some() {
            model.avatar_url = Set(update.avatar_url);
        }
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let updated = model.update(&self.db).await.map_err(db_err("更新用户失败"))?;
        Ok(Some(updated.into_user()))
    }

    /// 教职工、学生档案与设置随外键级联删除
    pub async fn delete_user_impl(&self, id: i64) -> Result<bool> {
        let result = Users::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err("删除用户失败"))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count_users_impl(&self) -> Result<u64> {
        Users::find()
            .count(&self.db)
            .await
            .map_err(db_err("统计用户数量失败"))
    }

    pub async fn count_users_by_role_impl(&self, role: UserRole) -> Result<u64> {
        Users::find()
            .filter(Column::Role.eq(role.to_string()))
            .count(&self.db)
            .await
            .map_err(db_err("统计用户数量失败"))
    }

    /// `expires_at` 为 Unix 秒
    pub async fn save_reset_token_impl(
        &self,
        id: i64,
        token: &str,
        expires_at: i64,
    ) -> Result<bool> {
        let result = Users::update_many()
            .col_expr(Column::ResetToken, Expr::value(token))
            .col_expr(Column::ResetTokenExpiry, Expr::value(expires_at))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err("保存重置令牌失败"))?;

        Ok(result.rows_affected > 0)
    }

    /// 写入新密码并作废重置令牌，令牌只能使用一次
    pub async fn save_password_impl(&self, id: i64, password_hash: &str) -> Result<bool> {
        let result = Users::update_many()
            .col_expr(Column::PasswordHash, Expr::value(password_hash))
            .col_expr(Column::ResetToken, Expr::value(Option::<String>::None))
            .col_expr(Column::ResetTokenExpiry, Expr::value(Option::<i64>::None))
            .col_expr(Column::UpdatedAt, Expr::value(chrono::Utc::now().timestamp()))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err("保存密码失败"))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn get_user_settings_impl(&self, user_id: i64) -> Result<Option<UserSettings>> {
        let settings = UserSettingsEntity::find()
            .filter(SettingsColumn::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(db_err("查询用户设置失败"))?;

        Ok(settings.map(|m| m.into_user_settings()))
    }
}
