//! Like endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::post,
};
use murmur_common::AppResult;
use serde::Serialize;

use super::post_path_id;
use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Post a like was added to or removed from.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikedPost {
    pub post_id: String,
}

/// Like a post.
async fn like(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<LikedPost>> {
    let post_id = state
        .interaction_service
        .like(&actor, post_path_id(&id)?)
        .await?;

    let message = format!("You liked the post {post_id}");
    Ok(ApiResponse::ok(LikedPost { post_id }).with_message(message))
}

/// Remove a like.
async fn dislike(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<LikedPost>> {
    let post_id = state
        .interaction_service
        .dislike(&actor, post_path_id(&id)?)
        .await?;

    let message = format!("You disliked the post {post_id}");
    Ok(ApiResponse::ok(LikedPost { post_id }).with_message(message))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/like/{id}", post(like))
        .route("/dislike/{id}", post(dislike))
}
