//! Route definitions.

use crate::handlers;
use crate::state::AppState;
use axum::Router;
use axum::http::{Method, header};
use axum::routing::{delete, get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Path of the JWKS discovery document.
pub const JWKS_PATH: &str = "/.well-known/jwks.json";

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(JWKS_PATH, get(handlers::jwks))
        .route("/generate-token", post(handlers::generate_token))
        .route("/generate-invalid-token", post(handlers::generate_invalid_token))
        .route("/introspect", post(handlers::introspect))
        .route("/keys", get(handlers::list_keys).post(handlers::add_key))
        .route("/keys/{kid}", delete(handlers::remove_key))
        .route("/health", get(handlers::health))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
