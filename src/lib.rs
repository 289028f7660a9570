use axum::Router;
use std::sync::Arc;
use tower_http::compression::{predicate::SizeAbove, CompressionLayer};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod db;
pub mod domains;
pub mod middleware;
pub mod services;
pub mod settings;
pub mod state;

use api::create_api_router;
use state::AppState;

pub fn create_app_router(app_state: Arc<AppState>) -> Router {
    let api_router = create_api_router();

    Router::new()
        .merge(api_router)
        .with_state(app_state)
        .layer(
            CompressionLayer::new()
                .gzip(true)
                .compress_when(SizeAbove::new(1024)),
        )
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
