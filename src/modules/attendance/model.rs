use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct AttendanceRecord {
    pub id: String,
    pub user_id: String,
    pub attendance_date: NaiveDate,
    pub attended: bool,
    /// The user's level at marking time. A snapshot; never recomputed
    /// retroactively, even when the row's attended flag is toggled later.
    pub level: i32,
    pub device_info: String,
    pub created_at: DateTime<Utc>,
}

/// Ledger row joined with its owner, for the admin roll-up view.
#[derive(Debug, Clone, FromRow)]
pub struct AttendanceWithUser {
    pub id: String,
    pub username: String,
    pub name: String,
    pub attendance_date: NaiveDate,
    pub attended: bool,
    pub level: i32,
    pub device_info: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct UserSummary {
    pub username: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub level: i32,
    pub days_completed: i64,
    pub created_at: DateTime<Utc>,
}
