//! Following endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::post,
};
use murmur_common::AppResult;
use murmur_core::UserSummary;

use super::user_path_id;
use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Follow a user.
async fn follow(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<UserSummary>> {
    let target = state
        .social_graph_service
        .follow(&actor, user_path_id(&id)?)
        .await?;

    let message = format!("You started following {}", target.username);
    Ok(ApiResponse::ok(target).with_message(message))
}

/// Unfollow a user.
async fn unfollow(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<UserSummary>> {
    let target = state
        .social_graph_service
        .unfollow(&actor, user_path_id(&id)?)
        .await?;

    let message = format!("You unfollowed {}", target.username);
    Ok(ApiResponse::ok(target).with_message(message))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/follow/{id}", post(follow))
        .route("/unfollow/{id}", post(unfollow))
}
