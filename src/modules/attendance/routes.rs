use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use super::controller;
use crate::AppState;

pub fn attendance_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/mark", post(controller::mark))
        .route("/user/{username}", get(controller::list_for_user))
        .route("/all", get(controller::list_all))
        .route("/users", get(controller::list_users))
        .route("/{id}", put(controller::update))
}
