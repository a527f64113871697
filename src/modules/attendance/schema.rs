use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::model::{AttendanceRecord, AttendanceWithUser, UserSummary};

#[derive(Debug, Deserialize)]
pub struct MarkAttendanceRequest {
    pub attended: bool,
    #[serde(default)]
    pub device_info: String,
}

#[derive(Debug, Serialize)]
pub struct AttendanceRecordResponse {
    pub id: String,
    pub date: NaiveDate,
    pub attended: bool,
    pub level: i32,
    pub device_info: String,
}

impl From<AttendanceRecord> for AttendanceRecordResponse {
    fn from(r: AttendanceRecord) -> Self {
        Self {
            id: r.id,
            date: r.attendance_date,
            attended: r.attended,
            level: r.level,
            device_info: r.device_info,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MarkAttendanceResponse {
    pub message: &'static str,
    pub record: AttendanceRecordResponse,
    pub level: i32,
    pub days_completed: i64,
}

#[derive(Debug, Serialize)]
pub struct AttendanceEntryResponse {
    pub id: String,
    pub username: String,
    pub name: String,
    pub date: NaiveDate,
    pub attended: bool,
    pub level: i32,
    pub device_info: String,
}

impl From<AttendanceWithUser> for AttendanceEntryResponse {
    fn from(r: AttendanceWithUser) -> Self {
        Self {
            id: r.id,
            username: r.username,
            name: r.name,
            date: r.attendance_date,
            attended: r.attended,
            level: r.level,
            device_info: r.device_info,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateAttendanceRequest {
    pub attended: bool,
}

#[derive(Debug, Serialize)]
pub struct UserSummaryResponse {
    pub username: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub level: i32,
    pub days_completed: i64,
    pub created_at: DateTime<Utc>,
}

impl From<UserSummary> for UserSummaryResponse {
    fn from(u: UserSummary) -> Self {
        Self {
            username: u.username,
            name: u.name,
            email: u.email,
            phone: u.phone,
            level: u.level,
            days_completed: u.days_completed,
            created_at: u.created_at,
        }
    }
}
