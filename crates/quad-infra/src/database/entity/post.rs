//! Post entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub school_id: i64,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub media_url: Option<String>,
    /// Milliseconds since the Unix epoch; doubles as the feed cursor.
    pub created_at: i64,
    pub upvotes: i64,
    pub downvotes: i64,
    pub comments_count: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::school::Entity",
        from = "Column::SchoolId",
        to = "super::school::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    School,
    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::school::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::School.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain Post.
impl From<Model> for quad_core::domain::Post {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            school_id: model.school_id,
            content: model.content,
            media_url: model.media_url,
            created_at: model.created_at,
            upvotes: model.upvotes,
            downvotes: model.downvotes,
            comments_count: model.comments_count,
        }
    }
}

/// Conversion from a draft to an insertable ActiveModel; the id stays
/// unset so the store assigns it.
impl From<quad_core::domain::NewPost> for ActiveModel {
    fn from(draft: quad_core::domain::NewPost) -> Self {
        Self {
            user_id: Set(draft.user_id),
            school_id: Set(draft.school_id),
            content: Set(draft.content),
            media_url: Set(draft.media_url),
            created_at: Set(draft.created_at),
            upvotes: Set(0),
            downvotes: Set(0),
            comments_count: Set(0),
            ..Default::default()
        }
    }
}
