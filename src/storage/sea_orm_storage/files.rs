//! 文件存储操作

use super::{SeaOrmStorage, db_err};
use crate::entity::files::{ActiveModel, Column, Entity as Files};
use crate::errors::Result;
use crate::models::files::entities::File;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};

impl SeaOrmStorage {
    /// 创建文件记录
    pub async fn create_file_impl(
        &self,
        download_token: &str,
        original_name: &str,
        stored_name: &str,
        file_size: i64,
        file_type: &str,
        user_id: Option<i64>,
    ) -> Result<File> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            download_token: Set(download_token.to_string()),
            original_name: Set(original_name.to_string()),
            stored_name: Set(stored_name.to_string()),
            file_size: Set(file_size),
            file_type: Set(file_type.to_string()),
            user_id: Set(user_id),
            created_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(db_err("创建文件记录失败"))?;

        Ok(result.into_file())
    }

    /// 通过 token 获取文件
    pub async fn get_file_by_token_impl(&self, token: &str) -> Result<Option<File>> {
        let result = Files::find()
            .filter(Column::DownloadToken.eq(token))
            .one(&self.db)
            .await
            .map_err(db_err("查询文件失败"))?;

        Ok(result.map(|m| m.into_file()))
    }

    pub async fn delete_file_impl(&self, token: &str) -> Result<bool> {
        let result = Files::delete_many()
            .filter(Column::DownloadToken.eq(token))
            .exec(&self.db)
            .await
            .map_err(db_err("删除文件记录失败"))?;

        Ok(result.rows_affected > 0)
    }
}
