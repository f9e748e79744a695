//! Follow graph service.
//!
//! A follow edge lives in two documents: the actor's `following` set and the
//! target's `followers` set. The target side is written first and is the one
//! membership checks read; the actor side is completed through
//! [`DualWrite`].

use murmur_common::{AppError, AppResult};
use murmur_db::{SharedUserStore, UserRecord, UserSetField};
use serde::Serialize;

use crate::context::Actor;
use crate::services::dual_write::DualWrite;

/// Display identity returned by follow operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub username: String,
}

/// Public profile of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub username: String,
    pub followers_count: usize,
    pub following_count: usize,
}

impl From<&UserRecord> for Profile {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            followers_count: user.followers.len(),
            following_count: user.following.len(),
        }
    }
}

/// Social graph service for business logic.
#[derive(Clone)]
pub struct SocialGraphService {
    users: SharedUserStore,
    dual_write: DualWrite,
}

impl SocialGraphService {
    /// Create a new social graph service.
    #[must_use]
    pub fn new(users: SharedUserStore, dual_write: DualWrite) -> Self {
        Self { users, dual_write }
    }

    /// Username and follower/following counts of `user_id`.
    pub async fn get_profile(&self, user_id: &str) -> AppResult<Profile> {
        let user = self.load(user_id).await?;
        Ok(Profile::from(&user))
    }

    /// Make `actor` follow `target_id`.
    pub async fn follow(&self, actor: &Actor, target_id: &str) -> AppResult<UserSummary> {
        if actor.is(target_id) {
            return Err(AppError::SelfReference("follow".to_string()));
        }

        self.load(&actor.user_id).await?;
        let target = self.load(target_id).await?;

        if target.followers.contains(&actor.user_id) {
            return Err(AppError::AlreadyFollowing(target.username));
        }

        // A concurrent identical request got there first.
        if !self
            .users
            .add_to_set(target_id, UserSetField::Followers, &actor.user_id)
            .await?
        {
            return Err(AppError::AlreadyFollowing(target.username));
        }

        let users = &self.users;
        let actor_id = actor.user_id.as_str();
        self.dual_write
            .complete(
                "follow",
                move || async move {
                    users
                        .add_to_set(actor_id, UserSetField::Following, target_id)
                        .await
                        .map(drop)
                },
                move || async move {
                    users
                        .remove_from_set(target_id, UserSetField::Followers, actor_id)
                        .await
                        .map(drop)
                },
            )
            .await?;

        tracing::debug!(follower_id = %actor.user_id, followee_id = %target_id, "Followed user");

        Ok(UserSummary {
            id: target.id,
            username: target.username,
        })
    }

    /// Make `actor` stop following `target_id`.
    pub async fn unfollow(&self, actor: &Actor, target_id: &str) -> AppResult<UserSummary> {
        if actor.is(target_id) {
            return Err(AppError::SelfReference("unfollow".to_string()));
        }

        self.load(&actor.user_id).await?;
        let target = self.load(target_id).await?;

        if !target.followers.contains(&actor.user_id) {
            return Err(AppError::NotFollowing(target.username));
        }

        if !self
            .users
            .remove_from_set(target_id, UserSetField::Followers, &actor.user_id)
            .await?
        {
            return Err(AppError::NotFollowing(target.username));
        }

        let users = &self.users;
        let actor_id = actor.user_id.as_str();
        self.dual_write
            .complete(
                "unfollow",
                move || async move {
                    users
                        .remove_from_set(actor_id, UserSetField::Following, target_id)
                        .await
                        .map(drop)
                },
                move || async move {
                    users
                        .add_to_set(target_id, UserSetField::Followers, actor_id)
                        .await
                        .map(drop)
                },
            )
            .await?;

        tracing::debug!(follower_id = %actor.user_id, followee_id = %target_id, "Unfollowed user");

        Ok(UserSummary {
            id: target.id,
            username: target.username,
        })
    }

    async fn load(&self, user_id: &str) -> AppResult<UserRecord> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(user_id.to_string()))
    }
}
