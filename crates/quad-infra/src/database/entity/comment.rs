//! Comment entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "comments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub post_id: i64,
    pub user_id: i64,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub media_url: Option<String>,
    /// Milliseconds since the Unix epoch; doubles as the comment cursor.
    pub created_at: i64,
    pub upvotes: i64,
    pub downvotes: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::post::Entity",
        from = "Column::PostId",
        to = "super::post::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Post,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain Comment.
impl From<Model> for quad_core::domain::Comment {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            post_id: model.post_id,
            user_id: model.user_id,
            content: model.content,
            media_url: model.media_url,
            created_at: model.created_at,
            upvotes: model.upvotes,
            downvotes: model.downvotes,
        }
    }
}

/// Conversion from a draft to an insertable ActiveModel; the id stays
/// unset so the store assigns it.
impl From<quad_core::domain::NewComment> for ActiveModel {
    fn from(draft: quad_core::domain::NewComment) -> Self {
        Self {
            post_id: Set(draft.post_id),
            user_id: Set(draft.user_id),
            content: Set(draft.content),
            media_url: Set(draft.media_url),
            created_at: Set(draft.created_at),
            upvotes: Set(0),
            downvotes: Set(0),
            ..Default::default()
        }
    }
}
