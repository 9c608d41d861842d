use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_utils::extractor::auth_middleware;
use shared_utils::AppState;

use crate::handlers;

pub fn professional_routes(state: AppState) -> Router {
    // Every route needs a session with access to the Professionals section
    Router::new()
        .route("/", post(handlers::create_professional))
        .route("/{professional_id}", get(handlers::get_professional))
        .route(
            "/{professional_id}/availability",
            get(handlers::get_availability).put(handlers::save_availability),
        )
        // Stateless editor: the client sends the grid with each edit
        .route("/availability/new", get(handlers::new_availability))
        .route("/availability/edit", post(handlers::edit_availability))
        .route("/availability/export", post(handlers::export_availability))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
