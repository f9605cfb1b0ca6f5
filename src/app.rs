use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/log", post(handlers::log_drink_form))
        .route("/profile", post(handlers::profile_form))
        .route("/eco/toggle", post(handlers::eco_toggle_form))
        .route("/export.csv", get(handlers::export_logs))
        .route("/api/today", get(handlers::get_today))
        .route("/api/stats", get(handlers::get_stats))
        .route("/api/badges", get(handlers::get_badges))
        .route("/api/entries", get(handlers::get_entries))
        .route("/api/log", post(handlers::log_drink))
        .route("/api/profile", get(handlers::get_profile).put(handlers::put_profile))
        .route("/api/eco", post(handlers::set_eco))
        .route("/api/goal/recommended", get(handlers::recommended_goal))
        .with_state(state)
}
