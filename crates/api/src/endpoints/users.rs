//! User endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::get,
};
use murmur_common::AppResult;
use murmur_core::Profile;

use super::user_path_id;
use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

fn respond(profile: Profile) -> ApiResponse<Profile> {
    let message = format!(
        "Username: {}, Followers: {}, Following: {}",
        profile.username, profile.followers_count, profile.following_count
    );
    ApiResponse::ok(profile).with_message(message)
}

/// Profile of the authenticated user.
async fn me(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Profile>> {
    let profile = state
        .social_graph_service
        .get_profile(&actor.user_id)
        .await?;
    Ok(respond(profile))
}

/// Profile of any user.
async fn show(
    AuthUser(_): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Profile>> {
    let profile = state
        .social_graph_service
        .get_profile(user_path_id(&id)?)
        .await?;
    Ok(respond(profile))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/user", get(me))
        .route("/users/{id}", get(show))
}
