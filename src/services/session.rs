use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, StatusCode},
    Json,
};
use std::sync::Arc;

use crate::modules::auth::model::Role;
use crate::modules::auth::schema::ErrorResponse;
use crate::AppState;

/// Authenticated caller, extracted from the Bearer access token.
///
/// ```ignore
/// async fn handler(user: CurrentUser) -> ... {
///     // user.username and user.role are verified claims
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub username: String,
    pub role: Role,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Authenticated caller that must hold the ADMIN role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub CurrentUser);

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

fn unauthorized(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (StatusCode::UNAUTHORIZED, Json(ErrorResponse::new(message)))
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = Arc::<AppState>::from_ref(state);

        let token = bearer_token(parts).ok_or_else(|| unauthorized("Missing bearer token"))?;

        let data = state.jwt_service.verify_access_token(token).map_err(|e| {
            tracing::debug!("access token rejected: {}", e);
            unauthorized("Invalid or expired token")
        })?;

        let role = Role::try_from(data.claims.role.as_str())
            .map_err(|_| unauthorized("Invalid or expired token"))?;

        Ok(CurrentUser {
            username: data.claims.sub,
            role,
        })
    }
}

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;

        if !user.is_admin() {
            return Err((
                StatusCode::FORBIDDEN,
                Json(ErrorResponse::new("Admin access required")),
            ));
        }

        Ok(AdminUser(user))
    }
}
