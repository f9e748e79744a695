//! Authentication endpoint.

use axum::{Router, extract::State, routing::post};
use murmur_common::AppResult;
use murmur_core::{AuthOutcome, AuthenticateInput};

use crate::{extractors::ApiJson, middleware::AppState, response::ApiResponse};

/// Register with a new e-mail address, or sign in with a known one.
async fn authenticate(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<AuthenticateInput>,
) -> AppResult<ApiResponse<AuthOutcome>> {
    let outcome = state.account_service.register_or_authenticate(req).await?;

    let message = match outcome {
        AuthOutcome::Registered { .. } => "User created successfully",
        AuthOutcome::Authenticated { .. } => "Signed in successfully",
    };
    Ok(ApiResponse::ok(outcome).with_message(message))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/authenticate", post(authenticate))
}
