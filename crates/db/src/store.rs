//! Store traits consumed by the core services.
//!
//! Every mutation here touches exactly one document and is atomic on its
//! own. Nothing spans two documents; callers that need that go through the
//! dual-write helper in `murmur-core`.

use async_trait::async_trait;
use murmur_common::AppResult;
use std::sync::Arc;

use crate::records::{CommentRecord, CommentRef, PostRecord, UserRecord};

/// Set-valued fields of a user document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserSetField {
    Followers,
    Following,
}

impl UserSetField {
    /// Stored column / field name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Followers => "followers",
            Self::Following => "following",
        }
    }
}

/// Set-valued fields of a post document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostSetField {
    Likes,
}

impl PostSetField {
    /// Stored column / field name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Likes => "likes",
        }
    }
}

/// Fields supplied when registering a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub credential_hash: String,
}

/// Fields supplied when creating a post.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub owner_id: String,
    pub title: String,
    pub description: String,
}

/// Fields supplied when creating a comment.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: String,
    pub author_id: String,
    pub text: String,
}

/// Identity store: user documents.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look a user up by id.
    async fn find_by_id(&self, id: &str) -> AppResult<Option<UserRecord>>;

    /// Look a user up by e-mail address.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>>;

    /// Insert a user with empty follower/following sets. The store assigns
    /// the id; a duplicate e-mail fails with `AppError::Conflict`.
    async fn create(&self, user: NewUser) -> AppResult<UserRecord>;

    /// Add `value` to a set field. Returns `false` when the document did not
    /// change: the value was already present, or no such user exists.
    async fn add_to_set(&self, id: &str, field: UserSetField, value: &str) -> AppResult<bool>;

    /// Remove `value` from a set field. Returns `false` when the document did
    /// not change.
    async fn remove_from_set(&self, id: &str, field: UserSetField, value: &str)
    -> AppResult<bool>;
}

/// Post store: post documents.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Look a post up by id.
    async fn find_by_id(&self, id: &str) -> AppResult<Option<PostRecord>>;

    /// All posts of an owner, newest first.
    async fn find_by_owner(&self, owner_id: &str) -> AppResult<Vec<PostRecord>>;

    /// Insert a post with empty likes and comments.
    async fn create(&self, post: NewPost) -> AppResult<PostRecord>;

    /// Add `value` to a set field. Returns `false` when nothing changed.
    async fn add_to_set(&self, id: &str, field: PostSetField, value: &str) -> AppResult<bool>;

    /// Remove `value` from a set field. Returns `false` when nothing changed.
    async fn remove_from_set(&self, id: &str, field: PostSetField, value: &str)
    -> AppResult<bool>;

    /// Append a comment reference unless one with the same `comment_id` is
    /// already there, so a retried append lands at most once. Returns `false`
    /// only if the post is gone.
    async fn append_comment(&self, id: &str, comment: &CommentRef) -> AppResult<bool>;

    /// Drop the reference to `comment_id`. Returns `false` when nothing changed.
    async fn remove_comment(&self, id: &str, comment_id: &str) -> AppResult<bool>;

    /// Delete a post together with its comment documents. Returns `false` if
    /// the post did not exist.
    async fn delete(&self, id: &str) -> AppResult<bool>;
}

/// Comment documents.
#[async_trait]
pub trait CommentStore: Send + Sync {
    /// Look a comment up by id.
    async fn find_by_id(&self, id: &str) -> AppResult<Option<CommentRecord>>;

    /// Insert a comment. Does not touch the post.
    async fn create(&self, comment: NewComment) -> AppResult<CommentRecord>;

    /// Delete a comment. Returns `false` if it did not exist.
    async fn delete(&self, id: &str) -> AppResult<bool>;
}

/// Shared handle to a user store.
pub type SharedUserStore = Arc<dyn UserStore>;

/// Shared handle to a post store.
pub type SharedPostStore = Arc<dyn PostStore>;

/// Shared handle to a comment store.
pub type SharedCommentStore = Arc<dyn CommentStore>;
