use axum::{routing::get, Router};

use auth_cell::auth_routes;
use professional_cell::professional_routes;
use shared_utils::AppState;

/// Both cells share one [`AppState`], so a session opened at `/auth/login`
/// is the one `/professionals` sees.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic Admin API is running!" }))
        .nest("/auth", auth_routes(state.clone()))
        .nest("/professionals", professional_routes(state))
}
