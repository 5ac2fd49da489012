//! Authentication middleware.
//!
//! Validates the bearer token once per request and stores the resulting
//! [`AuthUser`] in request extensions for the extractor to pick up.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{bearer_token, AuthUser};

fn authenticate(state: &AppState, req: &Request<Body>) -> Result<AuthUser, ApiError> {
    let token = bearer_token(req.headers())?;
    AuthUser::from_token(&state.jwt, token)
}

/// Rejects requests without a valid bearer token (401).
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match authenticate(&state, &req) {
        Ok(auth) => {
            req.extensions_mut().insert(auth);
            next.run(req).await
        }
        Err(err) => err.into_response(),
    }
}

/// Admin-only routes: 401 without a valid token, 403 for other roles.
pub async fn require_admin(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let auth = match authenticate(&state, &req) {
        Ok(auth) => auth,
        Err(err) => return err.into_response(),
    };

    if !auth.is_admin() {
        tracing::warn!(user_id = %auth.user_id, role = %auth.role, "Admin route refused");
        return ApiError::Forbidden("Accès réservé aux administrateurs".into()).into_response();
    }

    req.extensions_mut().insert(auth);
    next.run(req).await
}
