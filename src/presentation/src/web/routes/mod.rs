//! Route definitions for the Axum server

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{handlers, state::AppState};

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(handlers::health_check))
        // Conversation
        .route("/chat", post(handlers::chat))
        .route("/clear", post(handlers::clear_history))
        .route("/history", get(handlers::get_history))
        // Engine
        .route("/execute", post(handlers::execute_commands))
        .route(
            "/structures",
            get(handlers::list_structures).post(handlers::load_structure),
        );

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
