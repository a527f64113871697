use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::modules::auth::{
    crud::{AuthCrud, AuthError},
    model::{Role, User},
    schema::{
        ErrorResponse, ForgotPasswordRequest, LoginRequest, LoginResponse, LogoutRequest,
        MeResponse, MessageResponse, PendingUserResponse, RefreshTokenRequest,
        RefreshTokenResponse, RegisterRequest, RegisterResponse, ResendVerificationRequest,
        ResetPasswordRequest, VerifyEmailRequest,
    },
};
use crate::services::session::{AdminUser, CurrentUser};
use crate::services::{hashing, progression, sanitize::sanitize};
use crate::AppState;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn auth_error(e: AuthError) -> ApiError {
    (e.status_code(), Json(ErrorResponse::new(e.to_string())))
}

fn bad_request(message: impl Into<String>) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message)))
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    if let Err(e) = req.validate() {
        return Err(bad_request(e.to_string()));
    }

    if req.password.len() < 8 {
        return Err(bad_request("Password must be at least 8 characters"));
    }

    let username = sanitize(&req.username);
    let name = sanitize(&req.name);
    let phone = sanitize(&req.phone);
    let email = req.email.trim().to_string();

    if username.is_empty() || username != req.username.trim() {
        return Err(bad_request("Username contains invalid characters"));
    }

    let crud = AuthCrud::new(state.db.clone(), &state.jwt_service);

    if crud.username_exists(&username).await.map_err(auth_error)? {
        return Err(auth_error(AuthError::UsernameTaken));
    }
    if crud.email_exists(&email).await.map_err(auth_error)? {
        return Err(auth_error(AuthError::EmailTaken));
    }

    let password_hash =
        hashing::hash_password(&req.password).map_err(|e| bad_request(e.to_string()))?;

    let now = chrono::Utc::now();
    let user = User {
        id: Uuid::new_v4().to_string(),
        username: username.clone(),
        name,
        email,
        phone,
        password_hash,
        role: Role::User,
        level: 1,
        current_video_index: 0,
        email_verified: false,
        approved: false,
        created_at: now,
        updated_at: now,
    };

    crud.create(&user).await.map_err(auth_error)?;

    let token = crud.create_verification(&user.id).await.map_err(auth_error)?;
    state.mailer.send_verification(&user.email, &token).await;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Registration successful. Please verify your email and wait for approval.",
            username,
        }),
    ))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let crud = AuthCrud::new(state.db.clone(), &state.jwt_service);

    let result = crud.login(&req.username, &req.password).await.map_err(auth_error)?;

    Ok(Json(LoginResponse {
        access_token: result.access_token,
        refresh_token: result.refresh_token,
        token_type: "Bearer",
        expires_in: result.expires_in,
        username: result.user.username,
        name: result.user.name,
        role: result.user.role.as_str().to_string(),
        level: result.user.level,
    }))
}

pub async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RefreshTokenRequest>,
) -> Result<Json<RefreshTokenResponse>, ApiError> {
    let crud = AuthCrud::new(state.db.clone(), &state.jwt_service);

    let pair = crud.refresh_tokens(&req.refresh_token).await.map_err(auth_error)?;

    Ok(Json(RefreshTokenResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        token_type: "Bearer",
        expires_in: pair.expires_in,
    }))
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LogoutRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let crud = AuthCrud::new(state.db.clone(), &state.jwt_service);
    crud.logout(&req.refresh_token).await.map_err(auth_error)?;

    Ok(Json(MessageResponse {
        message: "Logged out",
    }))
}

pub async fn me(
    user: CurrentUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<MeResponse>, ApiError> {
    let crud = AuthCrud::new(state.db.clone(), &state.jwt_service);
    let record = crud
        .find_by_username(&user.username)
        .await
        .map_err(auth_error)?
        .ok_or_else(|| auth_error(AuthError::UserNotFound))?;

    let days = progression::days_completed(&state.db, &record.id)
        .await
        .map_err(|e| auth_error(e.into()))?;

    Ok(Json(MeResponse {
        username: record.username,
        name: record.name,
        email: record.email,
        phone: record.phone,
        role: record.role.as_str().to_string(),
        // Recomputation is authoritative; the stored field is a cache.
        level: progression::current_level(days),
        days_completed: days,
        created_at: record.created_at,
    }))
}

pub async fn verify_email(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VerifyEmailRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let crud = AuthCrud::new(state.db.clone(), &state.jwt_service);
    crud.verify_email(&req.token).await.map_err(auth_error)?;

    Ok(Json(MessageResponse {
        message: "Email verified successfully",
    }))
}

pub async fn resend_verification(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResendVerificationRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let crud = AuthCrud::new(state.db.clone(), &state.jwt_service);
    let (user, token) = crud
        .resend_verification(&req.email)
        .await
        .map_err(auth_error)?;
    state.mailer.send_verification(&user.email, &token).await;

    Ok(Json(MessageResponse {
        message: "Verification email sent",
    }))
}

pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let crud = AuthCrud::new(state.db.clone(), &state.jwt_service);
    let (user, otp) = crud
        .initiate_password_reset(&req.email)
        .await
        .map_err(auth_error)?;
    state.mailer.send_reset_otp(&user.email, &otp).await;

    Ok(Json(MessageResponse {
        message: "Password reset code sent to email",
    }))
}

pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if req.new_password.len() < 8 {
        return Err(bad_request("Password must be at least 8 characters"));
    }

    let crud = AuthCrud::new(state.db.clone(), &state.jwt_service);
    crud.reset_password(&req.email, &req.otp, &req.new_password)
        .await
        .map_err(auth_error)?;

    Ok(Json(MessageResponse {
        message: "Password reset successful",
    }))
}

pub async fn pending_users(
    AdminUser(_admin): AdminUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PendingUserResponse>>, ApiError> {
    let crud = AuthCrud::new(state.db.clone(), &state.jwt_service);
    let users = crud.pending_users().await.map_err(auth_error)?;

    Ok(Json(
        users
            .into_iter()
            .map(|u| PendingUserResponse {
                username: u.username,
                name: u.name,
                email: u.email,
                phone: u.phone,
                created_at: u.created_at,
            })
            .collect(),
    ))
}

pub async fn approve_user(
    AdminUser(_admin): AdminUser,
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let crud = AuthCrud::new(state.db.clone(), &state.jwt_service);
    crud.approve_user(&username).await.map_err(auth_error)?;

    Ok(Json(MessageResponse {
        message: "User approved successfully",
    }))
}

pub async fn delete_user(
    AdminUser(_admin): AdminUser,
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let crud = AuthCrud::new(state.db.clone(), &state.jwt_service);
    crud.delete_user(&username).await.map_err(auth_error)?;

    Ok(Json(MessageResponse {
        message: "User deleted successfully",
    }))
}
