use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::modules::attendance::{
    crud::{AttendanceCrud, AttendanceError},
    schema::{
        AttendanceEntryResponse, AttendanceRecordResponse, MarkAttendanceRequest,
        MarkAttendanceResponse, UpdateAttendanceRequest, UserSummaryResponse,
    },
};
use crate::modules::auth::schema::ErrorResponse;
use crate::services::session::{AdminUser, CurrentUser};
use crate::AppState;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn attendance_error(e: AttendanceError) -> ApiError {
    let body = match &e {
        AttendanceError::IncompleteTasks(missing) => {
            ErrorResponse::with_missing(e.to_string(), missing.clone())
        }
        _ => ErrorResponse::new(e.to_string()),
    };
    (e.status_code(), Json(body))
}

pub async fn mark(
    user: CurrentUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<MarkAttendanceRequest>,
) -> Result<(StatusCode, Json<MarkAttendanceResponse>), ApiError> {
    let crud = AttendanceCrud::new(state.db.clone());

    let outcome = crud
        .mark_attendance(&user.username, req.attended, &req.device_info)
        .await
        .map_err(attendance_error)?;

    Ok((
        StatusCode::CREATED,
        Json(MarkAttendanceResponse {
            message: "Attendance marked successfully",
            record: outcome.record.into(),
            level: outcome.level,
            days_completed: outcome.days_completed,
        }),
    ))
}

pub async fn list_for_user(
    user: CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<Vec<AttendanceRecordResponse>>, ApiError> {
    if user.username != username && !user.is_admin() {
        return Err((
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::new("Cannot view another user's attendance")),
        ));
    }

    let crud = AttendanceCrud::new(state.db.clone());
    let records = crud.list_for_user(&username).await.map_err(attendance_error)?;

    Ok(Json(records.into_iter().map(Into::into).collect()))
}

pub async fn list_all(
    AdminUser(_admin): AdminUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<AttendanceEntryResponse>>, ApiError> {
    let crud = AttendanceCrud::new(state.db.clone());
    let rows = crud
        .list_all(&state.admin_username)
        .await
        .map_err(attendance_error)?;

    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

pub async fn update(
    AdminUser(_admin): AdminUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateAttendanceRequest>,
) -> Result<Json<AttendanceRecordResponse>, ApiError> {
    let crud = AttendanceCrud::new(state.db.clone());
    let record = crud
        .update_record(&id, req.attended)
        .await
        .map_err(attendance_error)?;

    Ok(Json(record.into()))
}

pub async fn list_users(
    AdminUser(_admin): AdminUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserSummaryResponse>>, ApiError> {
    let crud = AttendanceCrud::new(state.db.clone());
    let users = crud
        .list_users(&state.admin_username)
        .await
        .map_err(attendance_error)?;

    Ok(Json(users.into_iter().map(Into::into).collect()))
}
