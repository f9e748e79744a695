//! Posts, likes and comments.

use chrono::{DateTime, Utc};
use murmur_common::{AppError, AppResult};
use murmur_db::{
    NewComment, NewPost, PostRecord, PostSetField, SharedCommentStore, SharedPostStore,
};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::context::Actor;
use crate::services::dual_write::DualWrite;

/// Input for creating a post.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostInput {
    #[validate(length(max = 256), custom(function = "not_blank"))]
    pub title: String,

    #[validate(length(max = 8192), custom(function = "not_blank"))]
    pub description: String,
}

/// Input for commenting on a post.
#[derive(Debug, Deserialize, Validate)]
pub struct CommentInput {
    #[validate(length(max = 2048), custom(function = "not_blank"))]
    pub text: String,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Entry of an owner's post listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    pub like_count: usize,
    pub comment_count: usize,
    pub created_at: DateTime<Utc>,
}

impl From<PostRecord> for PostSummary {
    fn from(post: PostRecord) -> Self {
        Self {
            like_count: post.likes.len(),
            comment_count: post.comments.len(),
            id: post.id,
            title: post.title,
            description: post.description,
            created_at: post.created_at,
        }
    }
}

/// Like and comment counts of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Engagement {
    pub likes: usize,
    pub comments: usize,
}

/// Interaction service for business logic.
#[derive(Clone)]
pub struct InteractionService {
    posts: SharedPostStore,
    comments: SharedCommentStore,
    dual_write: DualWrite,
}

impl InteractionService {
    /// Create a new interaction service.
    #[must_use]
    pub fn new(posts: SharedPostStore, comments: SharedCommentStore, dual_write: DualWrite) -> Self {
        Self {
            posts,
            comments,
            dual_write,
        }
    }

    /// Create a post owned by `actor`.
    pub async fn create_post(&self, actor: &Actor, input: CreatePostInput) -> AppResult<PostRecord> {
        input.validate()?;

        let post = self
            .posts
            .create(NewPost {
                owner_id: actor.user_id.clone(),
                title: input.title,
                description: input.description,
            })
            .await?;

        tracing::debug!(post_id = %post.id, owner_id = %post.owner_id, "Created post");
        Ok(post)
    }

    /// Every post of `owner_id`, newest first.
    pub async fn list_owner_posts(&self, owner_id: &str) -> AppResult<Vec<PostSummary>> {
        Ok(self
            .posts
            .find_by_owner(owner_id)
            .await?
            .into_iter()
            .map(PostSummary::from)
            .collect())
    }

    /// Delete a post. Only its owner may do so.
    pub async fn delete_post(&self, actor: &Actor, post_id: &str) -> AppResult<()> {
        let post = self.load(post_id).await?;

        if !actor.is(&post.owner_id) {
            return Err(AppError::Forbidden(
                "You can only delete your own posts".to_string(),
            ));
        }

        if !self.posts.delete(post_id).await? {
            return Err(AppError::PostNotFound(post_id.to_string()));
        }

        tracing::debug!(post_id = %post_id, "Deleted post");
        Ok(())
    }

    /// Like a post. Returns the post id.
    pub async fn like(&self, actor: &Actor, post_id: &str) -> AppResult<String> {
        let post = self.load(post_id).await?;

        if post.likes.contains(&actor.user_id) {
            return Err(AppError::AlreadyLiked(post.id));
        }

        if !self
            .posts
            .add_to_set(post_id, PostSetField::Likes, &actor.user_id)
            .await?
        {
            // A concurrent like won, unless the post was deleted meanwhile.
            self.load(post_id).await?;
            return Err(AppError::AlreadyLiked(post.id));
        }

        tracing::debug!(post_id = %post_id, user_id = %actor.user_id, "Liked post");
        Ok(post.id)
    }

    /// Withdraw a like. Returns the post id.
    pub async fn dislike(&self, actor: &Actor, post_id: &str) -> AppResult<String> {
        let post = self.load(post_id).await?;

        if !post.likes.contains(&actor.user_id) {
            return Err(AppError::NotLiked(post.id));
        }

        if !self
            .posts
            .remove_from_set(post_id, PostSetField::Likes, &actor.user_id)
            .await?
        {
            self.load(post_id).await?;
            return Err(AppError::NotLiked(post.id));
        }

        tracing::debug!(post_id = %post_id, user_id = %actor.user_id, "Removed like");
        Ok(post.id)
    }

    /// Like and comment counts of `post_id`.
    pub async fn get_engagement(&self, post_id: &str) -> AppResult<Engagement> {
        let post = self.load(post_id).await?;
        Ok(Engagement {
            likes: post.likes.len(),
            comments: post.comments.len(),
        })
    }

    /// Comment on a post. Returns the new comment id.
    ///
    /// The post is resolved before the comment document is created, so a
    /// missing post never leaves an orphaned comment behind.
    pub async fn comment(
        &self,
        actor: &Actor,
        post_id: &str,
        input: CommentInput,
    ) -> AppResult<String> {
        input.validate()?;
        self.load(post_id).await?;

        let comment = self
            .comments
            .create(NewComment {
                post_id: post_id.to_string(),
                author_id: actor.user_id.clone(),
                text: input.text,
            })
            .await?;

        let posts = &self.posts;
        let comments = &self.comments;
        let reference = &comment.to_ref();
        let comment_id = comment.id.as_str();
        self.dual_write
            .complete(
                "comment",
                move || async move {
                    if posts.append_comment(post_id, reference).await? {
                        Ok(())
                    } else {
                        Err(AppError::PostNotFound(post_id.to_string()))
                    }
                },
                move || async move {
                    posts.remove_comment(post_id, comment_id).await?;
                    comments.delete(comment_id).await.map(drop)
                },
            )
            .await?;

        tracing::debug!(post_id = %post_id, comment_id = %comment.id, "Added comment");
        Ok(comment.id)
    }

    async fn load(&self, post_id: &str) -> AppResult<PostRecord> {
        self.posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| AppError::PostNotFound(post_id.to_string()))
    }
}
