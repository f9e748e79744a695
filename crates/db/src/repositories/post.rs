//! Post repository.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use murmur_common::{AppError, AppResult, IdGenerator};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    Value, sea_query::Expr,
};
use serde_json::json;

use super::{db_error, decode_json};
use crate::entities::{Post, post};
use crate::records::{CommentRef, PostRecord};
use crate::store::{NewPost, PostSetField, PostStore};

/// Whether `comments` holds a reference whose `commentId` is `$1`.
const HAS_COMMENT: &str =
    "\"comments\" @> jsonb_build_array(jsonb_build_object('commentId', $1::text))";

/// Post repository for database operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
    id_gen: IdGenerator,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            id_gen: IdGenerator::new(),
        }
    }

    const fn column(field: PostSetField) -> post::Column {
        match field {
            PostSetField::Likes => post::Column::Likes,
        }
    }
}

impl TryFrom<post::Model> for PostRecord {
    type Error = AppError;

    fn try_from(model: post::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            likes: decode_json("likes", &model.likes)?,
            comments: decode_json("comments", &model.comments)?,
            id: model.id,
            owner_id: model.user_id,
            title: model.title,
            description: model.description,
            created_at: model.created_at.into(),
        })
    }
}

#[async_trait]
impl PostStore for PostRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<PostRecord>> {
        Post::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(db_error)?
            .map(PostRecord::try_from)
            .transpose()
    }

    async fn find_by_owner(&self, owner_id: &str) -> AppResult<Vec<PostRecord>> {
        Post::find()
            .filter(post::Column::UserId.eq(owner_id))
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(db_error)?
            .into_iter()
            .map(PostRecord::try_from)
            .collect()
    }

    async fn create(&self, post: NewPost) -> AppResult<PostRecord> {
        let model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(post.owner_id),
            title: Set(post.title),
            description: Set(post.description),
            likes: Set(json!([])),
            comments: Set(json!([])),
            created_at: Set(Utc::now().into()),
        };

        model
            .insert(self.db.as_ref())
            .await
            .map_err(db_error)?
            .try_into()
    }

    async fn add_to_set(&self, id: &str, field: PostSetField, value: &str) -> AppResult<bool> {
        let name = field.as_str();
        let result = Post::update_many()
            .col_expr(
                Self::column(field),
                Expr::cust_with_values(
                    format!("\"{name}\" || jsonb_build_array($1::text)"),
                    [value],
                ),
            )
            .filter(post::Column::Id.eq(id))
            .filter(Expr::cust_with_values(
                format!("NOT jsonb_exists(\"{name}\", $1)"),
                [value],
            ))
            .exec(self.db.as_ref())
            .await
            .map_err(db_error)?;

        Ok(result.rows_affected > 0)
    }

    async fn remove_from_set(
        &self,
        id: &str,
        field: PostSetField,
        value: &str,
    ) -> AppResult<bool> {
        let name = field.as_str();
        let result = Post::update_many()
            .col_expr(
                Self::column(field),
                Expr::cust_with_values(format!("\"{name}\" - $1::text"), [value]),
            )
            .filter(post::Column::Id.eq(id))
            .filter(Expr::cust_with_values(
                format!("jsonb_exists(\"{name}\", $1)"),
                [value],
            ))
            .exec(self.db.as_ref())
            .await
            .map_err(db_error)?;

        Ok(result.rows_affected > 0)
    }

    async fn append_comment(&self, id: &str, comment: &CommentRef) -> AppResult<bool> {
        let value = serde_json::to_value(comment)
            .map_err(|e| AppError::Internal(format!("Failed to encode comment: {e}")))?;

        // A reference already present leaves the array as is but still
        // counts as an affected row, so `false` keeps meaning "no such post".
        let result = Post::update_many()
            .col_expr(
                post::Column::Comments,
                Expr::cust_with_values(
                    format!(
                        "CASE WHEN {HAS_COMMENT} THEN \"comments\" \
                         ELSE \"comments\" || jsonb_build_array($2::jsonb) END"
                    ),
                    [Value::from(comment.comment_id.as_str()), Value::from(value)],
                ),
            )
            .filter(post::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(db_error)?;

        Ok(result.rows_affected > 0)
    }

    async fn remove_comment(&self, id: &str, comment_id: &str) -> AppResult<bool> {
        let result = Post::update_many()
            .col_expr(
                post::Column::Comments,
                Expr::cust_with_values(
                    "COALESCE((SELECT jsonb_agg(elem ORDER BY ord) \
                     FROM jsonb_array_elements(\"comments\") WITH ORDINALITY AS t(elem, ord) \
                     WHERE elem->>'commentId' <> $1), '[]'::jsonb)",
                    [comment_id],
                ),
            )
            .filter(post::Column::Id.eq(id))
            .filter(Expr::cust_with_values(HAS_COMMENT, [comment_id]))
            .exec(self.db.as_ref())
            .await
            .map_err(db_error)?;

        Ok(result.rows_affected > 0)
    }

    /// Comment rows go with the post through `fk_comment_post ON DELETE CASCADE`.
    async fn delete(&self, id: &str) -> AppResult<bool> {
        let result = Post::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(db_error)?;

        Ok(result.rows_affected > 0)
    }
}
