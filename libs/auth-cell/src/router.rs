use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_utils::extractor::auth_middleware;
use shared_utils::AppState;

use crate::handlers;

pub fn auth_routes(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/login", post(handlers::login));

    let protected_routes = Router::new()
        .route("/session", get(handlers::get_session))
        .route("/session/navigate", post(handlers::navigate))
        .route("/logout", post(handlers::logout))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
