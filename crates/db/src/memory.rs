//! In-process document store.
//!
//! Backs `database.url = "memory://"` and the service-level tests. Each
//! operation takes the write lock once, so single-document mutations are
//! atomic here just as they are against Postgres.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use murmur_common::{AppError, AppResult, IdGenerator};
use tokio::sync::RwLock;

use crate::records::{CommentRecord, CommentRef, PostRecord, UserRecord};
use crate::store::{
    CommentStore, NewComment, NewPost, NewUser, PostSetField, PostStore, UserSetField, UserStore,
};

#[derive(Default)]
struct Documents {
    users: HashMap<String, UserRecord>,
    posts: HashMap<String, PostRecord>,
    comments: HashMap<String, CommentRecord>,
}

/// In-memory implementation of every store trait.
///
/// Clones share the same documents.
#[derive(Clone, Default)]
pub struct MemoryStore {
    docs: Arc<RwLock<Documents>>,
    id_gen: IdGenerator,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored comment documents.
    pub async fn comment_count(&self) -> usize {
        self.docs.read().await.comments.len()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<UserRecord>> {
        Ok(self.docs.read().await.users.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>> {
        Ok(self
            .docs
            .read()
            .await
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create(&self, user: NewUser) -> AppResult<UserRecord> {
        let mut docs = self.docs.write().await;
        if docs.users.values().any(|u| u.email == user.email) {
            return Err(AppError::Conflict(format!(
                "Email {} is already registered",
                user.email
            )));
        }

        let record = UserRecord {
            id: self.id_gen.generate(),
            username: user.username,
            email: user.email,
            credential_hash: user.credential_hash,
            followers: Default::default(),
            following: Default::default(),
            created_at: Utc::now(),
        };
        docs.users.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn add_to_set(&self, id: &str, field: UserSetField, value: &str) -> AppResult<bool> {
        let mut docs = self.docs.write().await;
        let Some(user) = docs.users.get_mut(id) else {
            return Ok(false);
        };
        let set = match field {
            UserSetField::Followers => &mut user.followers,
            UserSetField::Following => &mut user.following,
        };
        Ok(set.insert(value.to_string()))
    }

    async fn remove_from_set(
        &self,
        id: &str,
        field: UserSetField,
        value: &str,
    ) -> AppResult<bool> {
        let mut docs = self.docs.write().await;
        let Some(user) = docs.users.get_mut(id) else {
            return Ok(false);
        };
        let set = match field {
            UserSetField::Followers => &mut user.followers,
            UserSetField::Following => &mut user.following,
        };
        Ok(set.remove(value))
    }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<PostRecord>> {
        Ok(self.docs.read().await.posts.get(id).cloned())
    }

    async fn find_by_owner(&self, owner_id: &str) -> AppResult<Vec<PostRecord>> {
        let docs = self.docs.read().await;
        let mut posts: Vec<PostRecord> = docs
            .posts
            .values()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect();
        posts.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(posts)
    }

    async fn create(&self, post: NewPost) -> AppResult<PostRecord> {
        let record = PostRecord {
            id: self.id_gen.generate(),
            owner_id: post.owner_id,
            title: post.title,
            description: post.description,
            likes: Default::default(),
            comments: Vec::new(),
            created_at: Utc::now(),
        };
        self.docs
            .write()
            .await
            .posts
            .insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn add_to_set(&self, id: &str, field: PostSetField, value: &str) -> AppResult<bool> {
        let mut docs = self.docs.write().await;
        let Some(post) = docs.posts.get_mut(id) else {
            return Ok(false);
        };
        let set = match field {
            PostSetField::Likes => &mut post.likes,
        };
        Ok(set.insert(value.to_string()))
    }

    async fn remove_from_set(
        &self,
        id: &str,
        field: PostSetField,
        value: &str,
    ) -> AppResult<bool> {
        let mut docs = self.docs.write().await;
        let Some(post) = docs.posts.get_mut(id) else {
            return Ok(false);
        };
        let set = match field {
            PostSetField::Likes => &mut post.likes,
        };
        Ok(set.remove(value))
    }

    async fn append_comment(&self, id: &str, comment: &CommentRef) -> AppResult<bool> {
        let mut docs = self.docs.write().await;
        let Some(post) = docs.posts.get_mut(id) else {
            return Ok(false);
        };
        if !post
            .comments
            .iter()
            .any(|c| c.comment_id == comment.comment_id)
        {
            post.comments.push(comment.clone());
        }
        Ok(true)
    }

    async fn remove_comment(&self, id: &str, comment_id: &str) -> AppResult<bool> {
        let mut docs = self.docs.write().await;
        let Some(post) = docs.posts.get_mut(id) else {
            return Ok(false);
        };
        let before = post.comments.len();
        post.comments.retain(|c| c.comment_id != comment_id);
        Ok(post.comments.len() != before)
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        let mut docs = self.docs.write().await;
        if docs.posts.remove(id).is_none() {
            return Ok(false);
        }
        docs.comments.retain(|_, c| c.post_id != id);
        Ok(true)
    }
}

#[async_trait]
impl CommentStore for MemoryStore {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<CommentRecord>> {
        Ok(self.docs.read().await.comments.get(id).cloned())
    }

    async fn create(&self, comment: NewComment) -> AppResult<CommentRecord> {
        let record = CommentRecord {
            id: self.id_gen.generate(),
            post_id: comment.post_id,
            author_id: comment.author_id,
            text: comment.text,
            created_at: Utc::now(),
        };
        self.docs
            .write()
            .await
            .comments
            .insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        Ok(self.docs.write().await.comments.remove(id).is_some())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            username: email.split('@').next().unwrap().to_string(),
            email: email.to_string(),
            credential_hash: "hash".to_string(),
        }
    }

    fn new_post(owner_id: &str, title: &str) -> NewPost {
        NewPost {
            owner_id: owner_id.to_string(),
            title: title.to_string(),
            description: "D".to_string(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryStore::new();
        UserStore::create(&store, new_user("a@x.com")).await.unwrap();

        let result = UserStore::create(&store, new_user("a@x.com")).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_user_set_is_idempotent() {
        let store = MemoryStore::new();
        let user = UserStore::create(&store, new_user("a@x.com")).await.unwrap();

        assert!(
            UserStore::add_to_set(&store, &user.id, UserSetField::Followers, "u2")
                .await
                .unwrap()
        );
        assert!(
            !UserStore::add_to_set(&store, &user.id, UserSetField::Followers, "u2")
                .await
                .unwrap()
        );

        let found = store.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(found.followers.len(), 1);
        assert!(found.following.is_empty());
    }

    #[tokio::test]
    async fn test_set_ops_on_missing_document_report_no_change() {
        let store = MemoryStore::new();

        assert!(
            !UserStore::add_to_set(&store, "ghost", UserSetField::Following, "u2")
                .await
                .unwrap()
        );
        assert!(
            !PostStore::remove_from_set(&store, "ghost", PostSetField::Likes, "u2")
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_find_by_owner_newest_first() {
        let store = MemoryStore::new();
        let first = PostStore::create(&store, new_post("u1", "first")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let second = PostStore::create(&store, new_post("u1", "second")).await.unwrap();
        PostStore::create(&store, new_post("u2", "other")).await.unwrap();

        let posts = store.find_by_owner("u1").await.unwrap();
        let ids: Vec<_> = posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, [second.id.as_str(), first.id.as_str()]);
    }

    #[tokio::test]
    async fn test_delete_post_cascades_comments() {
        let store = MemoryStore::new();
        let post = PostStore::create(&store, new_post("u1", "T")).await.unwrap();
        let comment = CommentStore::create(
            &store,
            NewComment {
                post_id: post.id.clone(),
                author_id: "u2".to_string(),
                text: "hi".to_string(),
            },
        )
        .await
        .unwrap();
        assert!(store.append_comment(&post.id, &comment.to_ref()).await.unwrap());

        assert!(PostStore::delete(&store, &post.id).await.unwrap());
        assert_eq!(store.comment_count().await, 0);
        assert!(!PostStore::delete(&store, &post.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_append_comment_is_idempotent() {
        let store = MemoryStore::new();
        let post = PostStore::create(&store, new_post("u1", "T")).await.unwrap();
        let reference = CommentRef {
            comment_id: "c1".to_string(),
            author_id: "u2".to_string(),
            text: "hi".to_string(),
        };

        assert!(store.append_comment(&post.id, &reference).await.unwrap());
        assert!(store.append_comment(&post.id, &reference).await.unwrap());
        let found = PostStore::find_by_id(&store, &post.id).await.unwrap().unwrap();
        assert_eq!(found.comments, vec![reference]);

        assert!(store.remove_comment(&post.id, "c1").await.unwrap());
        assert!(!store.remove_comment(&post.id, "c1").await.unwrap());
        let found = PostStore::find_by_id(&store, &post.id).await.unwrap().unwrap();
        assert!(found.comments.is_empty());
    }

    #[tokio::test]
    async fn test_append_comment_to_missing_post() {
        let store = MemoryStore::new();
        let appended = store
            .append_comment(
                "ghost",
                &CommentRef {
                    comment_id: "c1".to_string(),
                    author_id: "u2".to_string(),
                    text: "hi".to_string(),
                },
            )
            .await
            .unwrap();

        assert!(!appended);
    }
}
