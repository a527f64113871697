use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::model::{HabitTask, RoutineStep, Video};

// =============================================================================
// CHECKLIST MARKS
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CompleteVideoRequest {
    pub username: String,
    pub video_id: String,
}

#[derive(Debug, Deserialize)]
pub struct CompleteTaskRequest {
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub date: NaiveDate,
    pub video_completed: bool,
    pub routine_completed: bool,
    pub habits_completed: bool,
    pub can_submit_present: bool,
}

// =============================================================================
// USER CONTENT / LEVEL PROGRESS
// =============================================================================

#[derive(Debug, Serialize)]
pub struct VideoResponse {
    pub id: String,
    pub title: String,
    pub url: String,
    pub level: i32,
}

impl From<Video> for VideoResponse {
    fn from(v: Video) -> Self {
        Self {
            id: v.id,
            title: v.title,
            url: v.url,
            level: v.level,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserContentResponse {
    pub level: i32,
    pub days_completed: i64,
    pub days_into_level: i64,
    /// Absent on the terminal level: the program is completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_required: Option<i64>,
    pub current_video_index: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_video: Option<VideoResponse>,
    pub total_videos: i64,
}

#[derive(Debug, Serialize)]
pub struct RoutineStepResponse {
    pub id: String,
    pub sequence: i32,
    pub name: String,
    pub description: String,
}

impl From<RoutineStep> for RoutineStepResponse {
    fn from(s: RoutineStep) -> Self {
        Self {
            id: s.id,
            sequence: s.sequence,
            name: s.name,
            description: s.description,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HabitTaskResponse {
    pub id: String,
    pub name: String,
    pub description: String,
}

impl From<HabitTask> for HabitTaskResponse {
    fn from(h: HabitTask) -> Self {
        Self {
            id: h.id,
            name: h.name,
            description: h.description,
        }
    }
}

// =============================================================================
// ADMIN: CONTENT MANAGEMENT
// =============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct NewVideoRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(url(message = "Invalid video URL"))]
    pub url: String,
    #[validate(range(min = 1, max = 3))]
    pub level: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RoutineStepRequest {
    #[validate(range(min = 1))]
    pub sequence: i32,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct HabitRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[serde(default)]
    pub description: String,
}
