//! Comment endpoint.

use axum::{
    Router,
    extract::{Path, State},
    routing::post,
};
use murmur_common::AppResult;
use murmur_core::CommentInput;
use serde::Serialize;

use super::post_path_id;
use crate::{
    extractors::{ApiJson, AuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// Created comment.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedComment {
    pub comment_id: String,
}

/// Comment on a post.
async fn create(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<CommentInput>,
) -> AppResult<ApiResponse<CreatedComment>> {
    let comment_id = state
        .interaction_service
        .comment(&actor, post_path_id(&id)?, req)
        .await?;

    Ok(ApiResponse::created(CreatedComment { comment_id }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/comment/{id}", post(create))
}
