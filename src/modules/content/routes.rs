use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use super::controller;
use crate::AppState;

pub fn content_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/complete-video", post(controller::complete_video))
        .route("/complete-routine", post(controller::complete_routine))
        .route("/complete-habits", post(controller::complete_habits))
        .route("/progress/{username}", get(controller::progress))
        .route("/user/{username}", get(controller::user_content))
        .route("/routines", get(controller::routines))
        .route("/habits", get(controller::habits))
        .route("/admin/video", post(controller::add_video))
        .route("/admin/routine", post(controller::add_routine_step))
        .route("/admin/habit", post(controller::add_habit))
        .route(
            "/admin/habit/{id}",
            put(controller::update_habit).delete(controller::delete_habit),
        )
}
