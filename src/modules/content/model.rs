use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct Video {
    pub id: String,
    pub title: String,
    pub url: String,
    pub level: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct RoutineStep {
    pub id: String,
    pub sequence: i32,
    pub name: String,
    pub description: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct HabitTask {
    pub id: String,
    pub name: String,
    pub description: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// The day's checklist for one user. Absence of a row reads as all-false;
/// a new calendar day therefore starts from a clean slate without an
/// explicit reset event.
#[derive(Debug, Clone, FromRow)]
pub struct DailyProgress {
    pub id: String,
    pub username: String,
    pub progress_date: NaiveDate,
    pub video_completed: bool,
    pub routine_completed: bool,
    pub habits_completed: bool,
    pub completed_video_id: Option<String>,
    pub created_at: DateTime<Utc>,
}
