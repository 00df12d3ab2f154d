mod dto;
mod handlers;

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::service::LibraryService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<LibraryService>,
}

/// Builds the HTTP boundary: one route per aggregate operation, permissive CORS (this service
/// has no notion of an authenticated origin), and request tracing.
pub fn build_router(service: Arc<LibraryService>) -> Router {
    let state = AppState { service };

    Router::new()
        .route("/health", get(handlers::health))
        .route("/libraries", post(handlers::create_library))
        .route(
            "/libraries/:library_id",
            get(handlers::get_library)
                .put(handlers::update_library)
                .delete(handlers::delete_library),
        )
        .route(
            "/libraries/:library_id/documents",
            post(handlers::create_document).get(handlers::list_documents),
        )
        .route(
            "/libraries/:library_id/chunks",
            post(handlers::add_chunk).get(handlers::list_chunks),
        )
        .route(
            "/libraries/:library_id/chunks/:chunk_id",
            put(handlers::update_chunk).delete(handlers::delete_chunk),
        )
        .route("/libraries/:library_id/search", post(handlers::search))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
