//! API endpoints.

mod auth;
mod comments;
mod following;
mod posts;
mod reactions;
mod users;

use axum::{Router, middleware};
use murmur_common::{AppError, AppResult, IdGenerator};

use crate::middleware::{AppState, auth_middleware};

/// Create the API router.
///
/// Everything except `/authenticate` sits behind [`auth_middleware`].
pub fn router(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .merge(users::router())
        .merge(following::router())
        .merge(posts::router())
        .merge(reactions::router())
        .merge(comments::router())
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new().merge(auth::router()).merge(protected)
}

/// Path ids that cannot have been issued by a store resolve to "not found".
fn user_path_id(id: &str) -> AppResult<&str> {
    if IdGenerator::is_well_formed(id) {
        Ok(id)
    } else {
        Err(AppError::UserNotFound(id.to_string()))
    }
}

fn post_path_id(id: &str) -> AppResult<&str> {
    if IdGenerator::is_well_formed(id) {
        Ok(id)
    } else {
        Err(AppError::PostNotFound(id.to_string()))
    }
}
