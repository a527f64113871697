use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use validator::Validate;

use crate::modules::auth::schema::{ErrorResponse, MessageResponse};
use crate::modules::content::{
    crud::{ContentCrud, ContentError},
    schema::{
        CompleteTaskRequest, CompleteVideoRequest, HabitRequest, HabitTaskResponse,
        NewVideoRequest, ProgressResponse, RoutineStepRequest, RoutineStepResponse,
        UserContentResponse, VideoResponse,
    },
};
use crate::services::session::{AdminUser, CurrentUser};
use crate::AppState;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn content_error(e: ContentError) -> ApiError {
    (e.status_code(), Json(ErrorResponse::new(e.to_string())))
}

fn forbid_other_user(user: &CurrentUser, username: &str) -> Result<(), ApiError> {
    if user.username != username && !user.is_admin() {
        return Err((
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::new("Cannot act on another user's progress")),
        ));
    }
    Ok(())
}

pub async fn complete_video(
    user: CurrentUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CompleteVideoRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    forbid_other_user(&user, &req.username)?;

    let crud = ContentCrud::new(state.db.clone());
    crud.mark_video_complete(&req.username, &req.video_id)
        .await
        .map_err(content_error)?;

    Ok(Json(MessageResponse {
        message: "Video completed",
    }))
}

pub async fn complete_routine(
    user: CurrentUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CompleteTaskRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    forbid_other_user(&user, &req.username)?;

    let crud = ContentCrud::new(state.db.clone());
    crud.mark_routine_complete(&req.username)
        .await
        .map_err(content_error)?;

    Ok(Json(MessageResponse {
        message: "Routine completed",
    }))
}

pub async fn complete_habits(
    user: CurrentUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CompleteTaskRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    forbid_other_user(&user, &req.username)?;

    let crud = ContentCrud::new(state.db.clone());
    crud.mark_habits_complete(&req.username)
        .await
        .map_err(content_error)?;

    Ok(Json(MessageResponse {
        message: "Habits completed",
    }))
}

pub async fn progress(
    user: CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<ProgressResponse>, ApiError> {
    forbid_other_user(&user, &username)?;

    let crud = ContentCrud::new(state.db.clone());
    let p = crud.progress_today(&username).await.map_err(content_error)?;

    let can_submit = p.video_completed && p.routine_completed && p.habits_completed;
    Ok(Json(ProgressResponse {
        date: p.progress_date,
        video_completed: p.video_completed,
        routine_completed: p.routine_completed,
        habits_completed: p.habits_completed,
        can_submit_present: can_submit,
    }))
}

pub async fn user_content(
    user: CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<UserContentResponse>, ApiError> {
    forbid_other_user(&user, &username)?;

    let crud = ContentCrud::new(state.db.clone());
    let content = crud.user_content(&username).await.map_err(content_error)?;

    Ok(Json(UserContentResponse {
        level: content.level,
        days_completed: content.days_completed,
        days_into_level: content.days_into_level,
        days_required: content.days_required,
        current_video_index: content.current_video_index,
        current_video: content.current_video.map(Into::into),
        total_videos: content.total_videos,
    }))
}

pub async fn routines(
    _user: CurrentUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<RoutineStepResponse>>, ApiError> {
    let crud = ContentCrud::new(state.db.clone());
    let steps = crud.list_routines().await.map_err(content_error)?;
    Ok(Json(steps.into_iter().map(Into::into).collect()))
}

pub async fn habits(
    _user: CurrentUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<HabitTaskResponse>>, ApiError> {
    let crud = ContentCrud::new(state.db.clone());
    let habits = crud.list_habits().await.map_err(content_error)?;
    Ok(Json(habits.into_iter().map(Into::into).collect()))
}

// =============================================================================
// ADMIN: CONTENT MANAGEMENT
// =============================================================================

pub async fn add_video(
    AdminUser(_admin): AdminUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewVideoRequest>,
) -> Result<(StatusCode, Json<VideoResponse>), ApiError> {
    if let Err(e) = req.validate() {
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse::new(e.to_string()))));
    }

    let crud = ContentCrud::new(state.db.clone());
    let video = crud
        .add_video(&req.title, &req.url, req.level)
        .await
        .map_err(content_error)?;

    Ok((StatusCode::CREATED, Json(video.into())))
}

pub async fn add_routine_step(
    AdminUser(_admin): AdminUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<RoutineStepRequest>,
) -> Result<(StatusCode, Json<RoutineStepResponse>), ApiError> {
    if let Err(e) = req.validate() {
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse::new(e.to_string()))));
    }

    let crud = ContentCrud::new(state.db.clone());
    let step = crud
        .add_routine_step(req.sequence, &req.name, &req.description)
        .await
        .map_err(content_error)?;

    Ok((StatusCode::CREATED, Json(step.into())))
}

pub async fn add_habit(
    AdminUser(_admin): AdminUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<HabitRequest>,
) -> Result<(StatusCode, Json<HabitTaskResponse>), ApiError> {
    if let Err(e) = req.validate() {
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse::new(e.to_string()))));
    }

    let crud = ContentCrud::new(state.db.clone());
    let habit = crud
        .add_habit(&req.name, &req.description)
        .await
        .map_err(content_error)?;

    Ok((StatusCode::CREATED, Json(habit.into())))
}

pub async fn update_habit(
    AdminUser(_admin): AdminUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<HabitRequest>,
) -> Result<Json<HabitTaskResponse>, ApiError> {
    if let Err(e) = req.validate() {
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse::new(e.to_string()))));
    }

    let crud = ContentCrud::new(state.db.clone());
    let habit = crud
        .update_habit(&id, &req.name, &req.description)
        .await
        .map_err(content_error)?;

    Ok(Json(habit.into()))
}

pub async fn delete_habit(
    AdminUser(_admin): AdminUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let crud = ContentCrud::new(state.db.clone());
    crud.delete_habit(&id).await.map_err(content_error)?;

    Ok(Json(MessageResponse {
        message: "Habit deleted successfully",
    }))
}
