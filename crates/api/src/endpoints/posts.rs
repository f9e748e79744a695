//! Post endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::{get, post},
};
use murmur_common::AppResult;
use murmur_core::{CreatePostInput, Engagement, PostSummary};
use murmur_db::PostRecord;
use serde::{Deserialize, Serialize};

use super::post_path_id;
use crate::{
    extractors::{ApiJson, AuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// Create post request.
#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub desc: String,
}

/// Deleted post.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedPost {
    pub post_id: String,
}

/// Create a post.
async fn create(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreatePostRequest>,
) -> AppResult<ApiResponse<PostRecord>> {
    let post = state
        .interaction_service
        .create_post(
            &actor,
            CreatePostInput {
                title: req.title,
                description: req.desc,
            },
        )
        .await?;

    Ok(ApiResponse::created(post).with_message("Post created successfully"))
}

/// All posts of the authenticated user.
async fn list_mine(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<PostSummary>>> {
    let posts = state
        .interaction_service
        .list_owner_posts(&actor.user_id)
        .await?;
    Ok(ApiResponse::ok(posts))
}

/// Like and comment counts of a post.
async fn engagement(
    AuthUser(_): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Engagement>> {
    let engagement = state
        .interaction_service
        .get_engagement(post_path_id(&id)?)
        .await?;

    let message = format!(
        "Likes: {} and Comments: {}",
        engagement.likes, engagement.comments
    );
    Ok(ApiResponse::ok(engagement).with_message(message))
}

/// Delete one of the authenticated user's posts.
async fn delete(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<DeletedPost>> {
    state
        .interaction_service
        .delete_post(&actor, post_path_id(&id)?)
        .await?;

    Ok(ApiResponse::ok(DeletedPost { post_id: id }).with_message("Post deleted successfully"))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/posts", post(create))
        .route("/posts/{id}", get(engagement).delete(delete))
        .route("/all_posts", get(list_mine))
}
