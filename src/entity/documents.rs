//! 文档实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub owner_id: i64,
    pub department_id: i64,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub attachment: Option<String>,
    pub state: String,
    pub workflow_id: Option<i64>,
    pub current_step: Option<i32>,
    pub currently_assigned_id: Option<i64>,
    #[sea_orm(column_type = "Text", nullable)]
    pub reviewer_comment: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::students::Entity",
        from = "Column::OwnerId",
        to = "super::students::Column::Id"
    )]
    Owner,
    #[sea_orm(
        belongs_to = "super::workflows::Entity",
        from = "Column::WorkflowId",
        to = "super::workflows::Column::Id"
    )]
    Workflow,
    #[sea_orm(
        belongs_to = "super::staff::Entity",
        from = "Column::CurrentlyAssignedId",
        to = "super::staff::Column::Id"
    )]
    Assignee,
    #[sea_orm(has_many = "super::document_actions::Entity")]
    Actions,
}

impl Related<super::students::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::workflows::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Workflow.def()
    }
}

impl Related<super::staff::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignee.def()
    }
}

impl Related<super::document_actions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Actions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_document(self) -> crate::models::documents::entities::Document {
        use crate::models::documents::entities::{Document, DocumentState};

        Document {
            id: self.id,
            owner_id: self.owner_id,
            department_id: self.department_id,
            title: self.title,
            description: self.description,
            attachment: self.attachment,
            state: self
                .state
                .parse::<DocumentState>()
                .unwrap_or(DocumentState::Pending),
            workflow_id: self.workflow_id,
            current_step: self.current_step,
            currently_assigned_id: self.currently_assigned_id,
            reviewer_comment: self.reviewer_comment,
            created_at: super::timestamp(self.created_at),
            updated_at: super::timestamp(self.updated_at),
        }
    }
}
