//! Domain documents as the services see them.
//!
//! Whatever the physical layout, membership fields are exposed as sets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub email: String,
    /// Argon2 PHC string. Never serialized into API responses.
    #[serde(skip_serializing)]
    pub credential_hash: String,
    /// Users following this user.
    pub followers: BTreeSet<String>,
    /// Users this user follows.
    pub following: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
}

/// A post and its accumulated interactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub description: String,
    pub likes: BTreeSet<String>,
    /// Comment references in the order they were appended.
    pub comments: Vec<CommentRef>,
    pub created_at: DateTime<Utc>,
}

/// The `(author, text)` reference a post keeps for each of its comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRef {
    pub comment_id: String,
    pub author_id: String,
    pub text: String,
}

/// A stored comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRecord {
    pub id: String,
    pub post_id: String,
    pub author_id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl CommentRecord {
    /// The reference appended to the owning post.
    #[must_use]
    pub fn to_ref(&self) -> CommentRef {
        CommentRef {
            comment_id: self.id.clone(),
            author_id: self.author_id.clone(),
            text: self.text.clone(),
        }
    }
}
