//! SeaORM entity model used by the database storage backend.
//!
//! Maps to the `sessions` table created by `database_storage`. The row key is
//! the session ID and is minted by the database on insert.

use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::{NotSet, Set};

use crate::storage::types::Session;

/// Sessions table entity model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    /// Auto-increment row key, exposed as the session ID
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    pub author: String,
    pub published_date: String,
    pub video_url: String,
    pub description: String,
    pub created_by: String,
    /// Filter column for per-creator listings
    pub created_by_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Session {
    fn from(m: Model) -> Self {
        Session {
            id: m.id,
            title: m.title,
            author: m.author,
            published_date: m.published_date,
            video_url: m.video_url,
            description: m.description,
            created_by: m.created_by,
            created_by_id: m.created_by_id,
        }
    }
}

impl ActiveModel {
    /// Active model carrying every field of `session`. The key is left unset
    /// when `with_id` is false so the database assigns one.
    pub fn from_session(session: &Session, with_id: bool) -> Self {
        ActiveModel {
            id: if with_id { Set(session.id) } else { NotSet },
            title: Set(session.title.clone()),
            author: Set(session.author.clone()),
            published_date: Set(session.published_date.clone()),
            video_url: Set(session.video_url.clone()),
            description: Set(session.description.clone()),
            created_by: Set(session.created_by.clone()),
            created_by_id: Set(session.created_by_id.clone()),
        }
    }
}
