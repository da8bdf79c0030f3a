//! 学生存储操作

use super::{SeaOrmStorage, db_err};
use super::users::insert_user_with_settings;
use crate::entity::students::{ActiveModel, Column, Entity as Students};
use crate::entity::users::{
    ActiveModel as UserActiveModel, Column as UserColumn, Entity as Users,
};
use crate::errors::Result;
use crate::models::{
    PaginationInfo,
    students::{
        entities::Student,
        requests::{CreateStudentRequest, StudentListQuery, UpdateStudentRequest},
        responses::StudentListResponse,
    },
    users::{entities::UserRole, requests::CreateUserRequest},
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 创建学生：账号、设置、学生记录在同一事务中写入
    pub async fn create_student_impl(&self, req: CreateStudentRequest) -> Result<Student> {
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
                role: UserRole::Student,
                avatar_url: None,
            },
        )
        .await?;

        let now = chrono::Utc::now().timestamp();
        let student = ActiveModel {
            user_id: Set(user.id),
            department_id: Set(req.department_id),
            matric_number: Set(req.matric_number),
            level: Set(req.level),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(db_err("创建学生失败"))?;

        txn.commit()
            .await
            .map_err(db_err("提交事务失败"))?;

        Ok(student.into_student(user))
    }

    pub async fn get_student_by_id_impl(&self, id: i64) -> Result<Option<Student>> {
        let result = Students::find_by_id(id)
            .find_also_related(Users)
            .one(&self.db)
            .await
            .map_err(db_err("查询学生失败"))?;

        Ok(result.and_then(|(student, user)| user.map(|u| student.into_student(u))))
    }

    pub async fn get_student_by_user_id_impl(&self, user_id: i64) -> Result<Option<Student>> {
        let result = Students::find()
            .filter(Column::UserId.eq(user_id))
            .find_also_related(Users)
            .one(&self.db)
            .await
            .map_err(db_err("查询学生失败"))?;

        Ok(result.and_then(|(student, user)| user.map(|u| student.into_student(u))))
    }

    pub async fn get_student_by_matric_number_impl(
        &self,
        matric_number: &str,
    ) -> Result<Option<Student>> {
        let result = Students::find()
            .filter(Column::MatricNumber.eq(matric_number))
            .find_also_related(Users)
            .one(&self.db)
            .await
            .map_err(db_err("查询学生失败"))?;

        Ok(result.and_then(|(student, user)| user.map(|u| student.into_student(u))))
    }

    pub async fn list_students_with_pagination_impl(
        &self,
        query: StudentListQuery,
    ) -> Result<StudentListResponse> {
        let page = query.page.max(1);
        let size = query.size.clamp(1, 100);

        let mut select = Students::find().find_also_related(Users);

        if let Some(department_id) = query.department_id {
            select = select.filter(Column::DepartmentId.eq(department_id));
        }

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(
                Condition::any()
                    .add(Column::MatricNumber.contains(&escaped))
                    .add(UserColumn::Email.contains(&escaped))
                    .add(UserColumn::FirstName.contains(&escaped))
                    .add(UserColumn::LastName.contains(&escaped)),
            );
        }

        let paginator = select.order_by_asc(Column::Id).paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(db_err("查询学生总数失败"))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(db_err("查询学生页数失败"))?;
        let rows = paginator
            .fetch_page(page - 1)
            .await
            .map_err(db_err("查询学生列表失败"))?;

        Ok(StudentListResponse {
            items: rows
                .into_iter()
                .filter_map(|(student, user)| user.map(|u| student.into_student(u)))
                .collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    pub async fn update_student_impl(
        &self,
        id: i64,
        update: UpdateStudentRequest,
    ) -> Result<Option<Student>> {
        let Some(existing) = Students::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("查询学生失败"))?
        else {
            return Ok(None);
        };

        let now = chrono::Utc::now().timestamp();
        let txn = self
            .db
            .begin()
            .await
            .map_err(db_err("开启事务失败"))?;

        let mut student = ActiveModel {
            id: Set(id),
            updated_at: Set(now),
            ..Default::default()
        };
        if let Some(department_id) = update.department_id {
            student.department_id = Set(department_id);
        }
        if let Some(level) = update.level {
            student.level = Set(level);
        }
        student
            .update(&txn)
            .await
            .map_err(db_err("更新学生失败"))?;

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
                .map_err(db_err("更新学生账号失败"))?;
        }

        txn.commit()
            .await
            .map_err(db_err("提交事务失败"))?;

        self.get_student_by_id_impl(id).await
    }

    /// 删除学生及其账号，文档随外键级联删除
    pub async fn delete_student_impl(&self, id: i64) -> Result<bool> {
        let Some(existing) = Students::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("查询学生失败"))?
        else {
            return Ok(false);
        };

        let txn = self
            .db
            .begin()
            .await
            .map_err(db_err("开启事务失败"))?;

        Students::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(db_err("删除学生失败"))?;
        Users::delete_by_id(existing.user_id)
            .exec(&txn)
            .await
            .map_err(db_err("删除学生账号失败"))?;

        txn.commit()
            .await
            .map_err(db_err("提交事务失败"))?;

        Ok(true)
    }

    pub async fn count_students_impl(&self) -> Result<u64> {
        Students::find()
            .count(&self.db)
            .await
            .map_err(db_err("统计学生数量失败"))
    }
}
