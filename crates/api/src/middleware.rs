//! API middleware.

use axum::{
    body::Body,
    extract::{Query, State},
    http::{Request, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use murmur_core::{
    AccountService, DualWrite, InteractionService, SharedTokenService, SocialGraphService,
};
use murmur_db::{SharedCommentStore, SharedPostStore, SharedUserStore};
use serde::Deserialize;

/// Legacy header carrying the bearer token.
pub const ACCESS_TOKEN_HEADER: &str = "x-access-token";

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub account_service: AccountService,
    pub social_graph_service: SocialGraphService,
    pub interaction_service: InteractionService,
}

impl AppState {
    /// Wire the services over the given stores.
    #[must_use]
    pub fn new(
        users: SharedUserStore,
        posts: SharedPostStore,
        comments: SharedCommentStore,
        tokens: SharedTokenService,
        dual_write: DualWrite,
    ) -> Self {
        Self {
            account_service: AccountService::new(users.clone(), tokens),
            social_graph_service: SocialGraphService::new(users, dual_write.clone()),
            interaction_service: InteractionService::new(posts, comments, dual_write),
        }
    }
}

#[derive(Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// Find the bearer token: `Authorization: Bearer`, then `x-access-token`,
/// then the `token` query parameter.
fn request_token(req: &Request<Body>) -> Option<String> {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
    };

    header(AUTHORIZATION.as_str())
        .and_then(|v| v.strip_prefix("Bearer "))
        .or_else(|| header(ACCESS_TOKEN_HEADER))
        .map(str::to_owned)
        .or_else(|| {
            Query::<TokenQuery>::try_from_uri(req.uri())
                .ok()
                .and_then(|Query(q)| q.token)
        })
        .filter(|t| !t.is_empty())
}

/// Authentication middleware.
///
/// A valid token attaches its [`murmur_core::Actor`] to the request. An
/// invalid one ends the request with `401` before the handler runs. A
/// missing one is left to the `AuthUser` extractor.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(token) = request_token(&req) {
        match state.account_service.resolve_token(&token) {
            Ok(actor) => {
                req.extensions_mut().insert(actor);
            }
            Err(e) => return e.into_response(),
        }
    }

    next.run(req).await
}
