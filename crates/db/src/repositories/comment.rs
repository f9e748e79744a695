//! Comment repository.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use murmur_common::{AppResult, IdGenerator};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

use super::db_error;
use crate::entities::{Comment, comment};
use crate::records::CommentRecord;
use crate::store::{CommentStore, NewComment};

/// Comment repository for database operations.
#[derive(Clone)]
pub struct CommentRepository {
    db: Arc<DatabaseConnection>,
    id_gen: IdGenerator,
}

impl CommentRepository {
    /// Create a new comment repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            id_gen: IdGenerator::new(),
        }
    }
}

impl From<comment::Model> for CommentRecord {
    fn from(model: comment::Model) -> Self {
        Self {
            id: model.id,
            post_id: model.post_id,
            author_id: model.user_id,
            text: model.text,
            created_at: model.created_at.into(),
        }
    }
}

#[async_trait]
impl CommentStore for CommentRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<CommentRecord>> {
        Ok(Comment::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(db_error)?
            .map(Into::into))
    }

    async fn create(&self, comment: NewComment) -> AppResult<CommentRecord> {
        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            post_id: Set(comment.post_id),
            user_id: Set(comment.author_id),
            text: Set(comment.text),
            created_at: Set(Utc::now().into()),
        };

        Ok(model
            .insert(self.db.as_ref())
            .await
            .map_err(db_error)?
            .into())
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        let result = Comment::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(db_error)?;

        Ok(result.rows_affected > 0)
    }
}
