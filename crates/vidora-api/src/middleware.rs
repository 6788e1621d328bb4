use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use tracing::debug;
use uuid::Uuid;

use vidora_types::api::Claims;

use crate::auth::AppState;
use crate::error::ApiError;

/// The requesting user on read paths, if any.
#[derive(Debug, Clone, Copy, Default)]
pub struct Viewer(pub Option<Uuid>);

fn bearer_claims(state: &AppState, headers: &HeaderMap) -> Option<Claims> {
    let auth = headers.typed_get::<Authorization<Bearer>>()?;
    state.verify_token(auth.token())
}

/// Reject requests without a valid Bearer token.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = bearer_claims(&state, req.headers()).ok_or(ApiError::Unauthorized)?;

    req.extensions_mut().insert(Viewer(Some(claims.sub)));
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Attach the viewer when a valid token is present; otherwise continue
/// anonymously.
pub async fn optional_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let viewer = match bearer_claims(&state, req.headers()) {
        Some(claims) => {
            let id = claims.sub;
            req.extensions_mut().insert(claims);
            Some(id)
        }
        None => {
            if req.headers().contains_key(axum::http::header::AUTHORIZATION) {
                debug!("Ignoring invalid token on read path");
            }
            None
        }
    };

    req.extensions_mut().insert(Viewer(viewer));
    next.run(req).await
}
