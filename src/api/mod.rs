pub mod admin_items;
pub mod admin_posts;
pub mod admin_redemptions;
pub mod admin_settings;
pub mod common;
pub mod points;
pub mod redemptions;

use axum::{
    extract::State,
    middleware::from_fn,
    routing::{get, post, put},
    Json, Router,
};
use std::sync::Arc;

use crate::middleware::extract_current_user;
use crate::state::AppState;

/// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let database = if crate::db::health_check(&state.db_pool).await {
        "up"
    } else {
        "down"
    };

    Json(serde_json::json!({
        "status": "ok",
        "database": database,
    }))
}

/// Create the API router with all endpoints. JWT authentication protects
/// everything under /api/v1; admin role checks live in the handlers.
pub fn create_api_router() -> Router<Arc<AppState>> {
    let protected = Router::new()
        // Point ledger
        .route("/points/balance", get(points::get_balance))
        .route("/points/history", get(points::get_history))
        // Redemption catalog and submissions
        .route("/redemptions/items", get(redemptions::list_items))
        .route("/redemptions/items/:id", get(redemptions::get_item))
        .route("/redemptions", post(redemptions::submit_redemption))
        .route("/redemptions/history", get(redemptions::list_history))
        .layer(from_fn(extract_current_user));

    let admin = Router::new()
        .route("/admin/redemptions", get(admin_redemptions::list_requests))
        .route(
            "/admin/redemptions/:id/status",
            put(admin_redemptions::update_status),
        )
        .route(
            "/admin/redemption-items",
            get(admin_items::list_items).post(admin_items::create_item),
        )
        .route("/admin/redemption-items/:id", put(admin_items::update_item))
        .route(
            "/admin/redemption-items/:id/activate",
            post(admin_items::activate_item),
        )
        .route(
            "/admin/redemption-items/:id/deactivate",
            post(admin_items::deactivate_item),
        )
        .route(
            "/admin/settings",
            get(admin_settings::list_settings).put(admin_settings::update_setting),
        )
        .route("/admin/posts/:id/publish", post(admin_posts::publish_post))
        .layer(from_fn(extract_current_user));

    Router::new()
        .nest("/api/v1", protected.merge(admin))
        .route("/health", get(health))
}
