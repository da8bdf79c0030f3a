//! 用户设置实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "user_settings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub user_id: i64,
    pub is_email_verified: bool,
    pub is_phone_verified: bool,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_user_settings(self) -> crate::models::users::entities::UserSettings {
        use crate::models::users::entities::UserSettings;

        UserSettings {
            user_id: self.user_id,
            is_email_verified: self.is_email_verified,
            is_phone_verified: self.is_phone_verified,
            updated_at: super::timestamp(self.updated_at),
        }
    }
}
