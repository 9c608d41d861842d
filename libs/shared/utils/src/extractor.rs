use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use headers::{authorization::Bearer, Authorization, HeaderMapExt};

use shared_models::error::AppError;

use crate::jwt::validate_token;
use crate::state::AppState;

pub fn extract_bearer_token(headers: &HeaderMap) -> Result<String, AppError> {
    if !headers.contains_key("Authorization") {
        return Err(AppError::Auth("Missing authorization header".to_string()));
    }

    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string())
        .ok_or_else(|| AppError::Auth("Invalid authorization header format".to_string()))
}

/// Validates the bearer token and attaches the caller's live
/// [`AdminSession`](shared_models::session::AdminSession) to the request.
///
/// Only tokens opened through login and not yet logged out are accepted.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(request.headers())?;

    if let Err(err) = validate_token(&token, &state.config.clinic_jwt_secret) {
        // Expired sessions are dropped on first use
        state.sessions.end(&token).await;
        return Err(AppError::Auth(err));
    }

    let session = state
        .sessions
        .get(&token)
        .await
        .ok_or_else(|| AppError::Auth("No active session for token".to_string()))?;

    request.extensions_mut().insert(session);

    Ok(next.run(request).await)
}
