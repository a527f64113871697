use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use super::controller;
use crate::AppState;

pub fn auth_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(controller::register))
        .route("/login", post(controller::login))
        .route("/refresh", post(controller::refresh))
        .route("/logout", post(controller::logout))
        .route("/me", get(controller::me))
        .route("/verify-email", post(controller::verify_email))
        .route("/resend-verification", post(controller::resend_verification))
        .route("/forgot-password", post(controller::forgot_password))
        .route("/reset-password", post(controller::reset_password))
        .route("/pending", get(controller::pending_users))
        .route("/approve/{username}", post(controller::approve_user))
        .route("/users/{username}", delete(controller::delete_user))
}
