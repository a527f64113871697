pub mod config;
pub mod modules;
pub mod services;

use axum::{middleware, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use config::DbPool;
use modules::attendance::attendance_routes;
use modules::auth::auth_routes;
use modules::content::content_routes;
use services::jwt::JwtService;
use services::mailer::Mailer;
use services::rate_limit::{create_rate_limiter, RateLimitLayer};
use services::security::security_headers;

pub struct AppState {
    pub db: DbPool,
    pub jwt_service: JwtService,
    pub mailer: Mailer,
    pub admin_username: String,
}

pub async fn create_app(
    db: DbPool,
    jwt_service: JwtService,
    mailer: Mailer,
    admin_username: String,
) -> Router {
    let state = Arc::new(AppState {
        db,
        jwt_service,
        mailer,
        admin_username,
    });

    // Steady 50 req/s with burst headroom; business errors are never retried
    // by this layer.
    let rate_limiter = create_rate_limiter(50, 200);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/auth", auth_routes())
        .nest("/attendance", attendance_routes())
        .nest("/content", content_routes())
        .layer(middleware::from_fn(security_headers))
        .layer(RequestBodyLimitLayer::new(1024 * 64)) // 64KB max body
        .layer(RateLimitLayer::new(rate_limiter))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn root() -> &'static str {
    "Yoga Attendance API"
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
