use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{delete, get, patch, post},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/admin", get(handlers::admin))
        .route("/api/data", get(handlers::get_data).put(handlers::put_data))
        .route("/api/metrics", get(handlers::get_metrics))
        .route("/api/entries", post(handlers::add_entry))
        .route("/api/entries/:id", delete(handlers::delete_entry))
        .route("/api/settings", patch(handlers::update_settings))
        .with_state(state)
}
