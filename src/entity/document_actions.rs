//! 文档流转记录实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "document_actions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub document_id: i64,
    pub actor_id: i64,
    pub action: String,
    pub from_state: Option<String>,
    pub to_state: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub comment: Option<String>,
    pub attachment: Option<String>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::documents::Entity",
        from = "Column::DocumentId",
        to = "super::documents::Column::Id"
    )]
    Document,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::ActorId",
        to = "super::users::Column::Id"
    )]
    Actor,
}

impl Related<super::documents::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Document.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Actor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_document_action(self) -> crate::models::documents::entities::DocumentAction {
        use crate::models::documents::entities::{DocumentAction, DocumentActionKind, DocumentState};

        DocumentAction {
            id: self.id,
            document_id: self.document_id,
            actor_id: self.actor_id,
            action: self
                .action
                .parse::<DocumentActionKind>()
                .unwrap_or(DocumentActionKind::Update),
            from_state: self
                .from_state
                .and_then(|s| s.parse::<DocumentState>().ok()),
            to_state: self
                .to_state
                .parse::<DocumentState>()
                .unwrap_or(DocumentState::Pending),
            comment: self.comment,
            attachment: self.attachment,
            created_at: super::timestamp(self.created_at),
        }
    }
}
