//! 教职工存储操作

use super::{SeaOrmStorage, db_err};
use super::users::insert_user_with_settings;
use crate::entity::staff::{ActiveModel, Column, Entity as StaffEntity};
use crate::entity::users::{
    ActiveModel as UserActiveModel, Column as UserColumn, Entity as Users,
};
use crate::errors::Result;
use crate::models::{
    PaginationInfo,
    staff::{
        entities::Staff,
        requests::{CreateStaffRequest, StaffListQuery, UpdateStaffRequest},
        responses::StaffListResponse,
    },
    users::{entities::UserRole, requests::CreateUserRequest},
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 创建教职工：账号、设置、教职工记录在同一事务中写入
    pub async fn create_staff_impl(&self, req: CreateStaffRequest) -> Result<Staff> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(db_err("开启事务失败"))?;

        let user = insert_user_with_settings(
            &txn,
            CreateUserRequest {
                email: req.email,
                password: req.password,
                first_name: req.first_name,
                last_name: req.last_name,
                phone: req.phone,
                role: UserRole::Staff,
                avatar_url: None,
            },
        )
        .await?;

        let now = chrono::Utc::now().timestamp();
        let staff = ActiveModel {
            user_id: Set(user.id),
            department_id: Set(req.department_id),
            designation: Set(req.designation),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(db_err("创建教职工失败"))?;

        txn.commit()
            .await
            .map_err(db_err("提交事务失败"))?;

        Ok(staff.into_staff(user))
    }

    pub async fn get_staff_by_id_impl(&self, id: i64) -> Result<Option<Staff>> {
        let result = StaffEntity::find_by_id(id)
            .find_also_related(Users)
            .one(&self.db)
            .await
            .map_err(db_err("查询教职工失败"))?;

        Ok(result.and_then(|(staff, user)| user.map(|u| staff.into_staff(u))))
    }

    pub async fn get_staff_by_user_id_impl(&self, user_id: i64) -> Result<Option<Staff>> {
        let result = StaffEntity::find()
            .filter(Column::UserId.eq(user_id))
            .find_also_related(Users)
            .one(&self.db)
            .await
            .map_err(db_err("查询教职工失败"))?;

        Ok(result.and_then(|(staff, user)| user.map(|u| staff.into_staff(u))))
    }

    pub async fn list_staff_with_pagination_impl(
        &self,
        query: StaffListQuery,
    ) -> Result<StaffListResponse> {
        let page = query.page.max(1);
        let size = query.size.clamp(1, 100);

        let mut select = StaffEntity::find().find_also_related(Users);

        // 院系筛选
        if let Some(department_id) = query.department_id {
            select = select.filter(Column::DepartmentId.eq(department_id));
        }

        // 搜索条件
        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(
                Condition::any()
                    .add(UserColumn::Email.contains(&escaped))
                    .add(UserColumn::FirstName.contains(&escaped))
                    .add(UserColumn::LastName.contains(&escaped))
                    .add(Column::Designation.contains(&escaped)),
            );
        }

        let paginator = select.order_by_asc(Column::Id).paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(db_err("查询教职工总数失败"))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(db_err("查询教职工页数失败"))?;
        let rows = paginator
            .fetch_page(page - 1)
            .await
            .map_err(db_err("查询教职工列表失败"))?;

        Ok(StaffListResponse {
            items: rows
                .into_iter()
                .filter_map(|(staff, user)| user.map(|u| staff.into_staff(u)))
                .collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    /// 更新教职工，姓名与电话写入关联账号
    pub async fn update_staff_impl(
        &self,
        id: i64,
        update: UpdateStaffRequest,
    ) -> Result<Option<Staff>> {
        let Some(existing) = StaffEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("查询教职工失败"))?
        else {
            return Ok(None);
        };

        let now = chrono::Utc::now().timestamp();
        let txn = self
            .db
            .begin()
            .await
            .map_err(db_err("开启事务失败"))?;

        let mut staff = ActiveModel {
            id: Set(id),
            updated_at: Set(now),
            ..Default::default()
        };
        if let Some(department_id) = update.department_id {
            staff.department_id = Set(department_id);
        }
        if let Some(designation) = update.designation {
            staff.designation = Set(designation);
        }
        staff
            .update(&txn)
            .await
            .map_err(db_err("更新教职工失败"))?;

        if update.first_name.is_some() || update.last_name.is_some() || update.phone.is_some() {
            let mut user = UserActiveModel {
                id: Set(existing.user_id),
                updated_at: Set(now),
                ..Default::default()
            };
            if let Some(first_name) = update.first_name {
                user.first_name = Set(first_name);
            }
            if let Some(last_name) = update.last_name {
                user.last_name = Set(last_name);
            }
            if let Some(phone) = update.phone {
                user.phone = Set(Some(phone));
            }
            user.update(&txn)
                .await
                .map_err(db_err("更新教职工账号失败"))?;
        }

        txn.commit()
            .await
            .map_err(db_err("提交事务失败"))?;

        self.get_staff_by_id_impl(id).await
    }

    /// 删除教职工及其账号
    pub async fn delete_staff_impl(&self, id: i64) -> Result<bool> {
        let Some(existing) = StaffEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("查询教职工失败"))?
        else {
            return Ok(false);
        };

        let txn = self
            .db
            .begin()
            .await
            .map_err(db_err("开启事务失败"))?;

        StaffEntity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(db_err("删除教职工失败"))?;
        Users::delete_by_id(existing.user_id)
            .exec(&txn)
            .await
            .map_err(db_err("删除教职工账号失败"))?;

        txn.commit()
            .await
            .map_err(db_err("提交事务失败"))?;

        Ok(true)
    }

    pub async fn count_staff_impl(&self) -> Result<u64> {
        StaffEntity::find()
            .count(&self.db)
            .await
            .map_err(db_err("统计教职工数量失败"))
    }
}
