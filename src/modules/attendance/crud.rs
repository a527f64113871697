use chrono::Utc;
use uuid::Uuid;

use crate::config::DbPool;
use crate::modules::attendance::model::{AttendanceRecord, AttendanceWithUser, UserSummary};
use crate::modules::auth::crud::is_unique_violation;
use crate::modules::auth::model::User;
use crate::services::progression;

#[derive(Debug, thiserror::Error)]
pub enum AttendanceError {
    #[error("Attendance already marked for today")]
    AlreadyMarkedToday,

    #[error("Complete today's tasks before marking present")]
    IncompleteTasks(Vec<String>),

    #[error("User not found")]
    UserNotFound,

    #[error("Attendance record not found")]
    RecordNotFound,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AttendanceError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            Self::AlreadyMarkedToday | Self::IncompleteTasks(_) => StatusCode::CONFLICT,
            Self::UserNotFound | Self::RecordNotFound => StatusCode::NOT_FOUND,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub struct SubmissionOutcome {
    pub record: AttendanceRecord,
    pub level: i32,
    pub days_completed: i64,
}

pub struct AttendanceCrud {
    pool: DbPool,
}

impl AttendanceCrud {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// The one-submission-per-day workflow. Runs in a transaction so the
    /// ledger insert, the checklist persistence, and the level write-through
    /// land together. The (user_id, attendance_date) uniqueness constraint
    /// is the arbiter under concurrent submissions; an application-level
    /// pre-check alone would be racy.
    pub async fn mark_attendance(
        &self,
        username: &str,
        attended: bool,
        device_info: &str,
    ) -> Result<SubmissionOutcome, AttendanceError> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(AttendanceError::UserNotFound)?;

        let today = Utc::now().date_naive();

        let existing: Option<(String,)> = sqlx::query_as(
            "SELECT id FROM attendance WHERE user_id = ? AND attendance_date = ?",
        )
        .bind(&user.id)
        .bind(today)
        .fetch_optional(&mut *tx)
        .await?;
        if existing.is_some() {
            return Err(AttendanceError::AlreadyMarkedToday);
        }

        // A "Present" submission is gated on the day's checklist. "Absent"
        // is always accepted and completes nothing.
        if attended {
            let flags: Option<(bool, bool, bool)> = sqlx::query_as(
                r#"
                SELECT video_completed, routine_completed, habits_completed
                FROM daily_progress
                WHERE username = ? AND progress_date = ?
                "#,
            )
            .bind(username)
            .bind(today)
            .fetch_optional(&mut *tx)
            .await?;

            let (video, routine, habits) = flags.unwrap_or((false, false, false));
            let mut missing = Vec::new();
            if !video {
                missing.push("video".to_string());
            }
            if !routine {
                missing.push("routine".to_string());
            }
            if !habits {
                missing.push("habits".to_string());
            }
            if !missing.is_empty() {
                return Err(AttendanceError::IncompleteTasks(missing));
            }
        }

        let record = AttendanceRecord {
            id: Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            attendance_date: today,
            attended,
            level: user.level,
            device_info: device_info.to_string(),
            created_at: Utc::now(),
        };

        let insert = sqlx::query(
            r#"
            INSERT INTO attendance (id, user_id, attendance_date, attended, level, device_info)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.user_id)
        .bind(record.attendance_date)
        .bind(record.attended)
        .bind(record.level)
        .bind(&record.device_info)
        .execute(&mut *tx)
        .await;

        if let Err(e) = insert {
            if is_unique_violation(&e) {
                // A concurrent submission won the race.
                return Err(AttendanceError::AlreadyMarkedToday);
            }
            return Err(e.into());
        }

        if attended {
            // Persist routine/habit completion as historical fact for the
            // submitted day. Tomorrow has no row and reads as all-false.
            sqlx::query(
                r#"
                INSERT INTO daily_progress (id, username, progress_date,
                                            video_completed, routine_completed, habits_completed)
                VALUES (?, ?, ?, TRUE, TRUE, TRUE)
                ON DUPLICATE KEY UPDATE routine_completed = TRUE, habits_completed = TRUE
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(username)
            .bind(today)
            .execute(&mut *tx)
            .await?;
        }

        let days: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM attendance WHERE user_id = ? AND attended = TRUE",
        )
        .bind(&user.id)
        .fetch_one(&mut *tx)
        .await?;
        let days_completed = days.0;

        let level = progression::current_level(days_completed);
        if level != user.level {
            tracing::info!(username, from = user.level, to = level, "level threshold crossed");
        }
        sqlx::query("UPDATE users SET level = ? WHERE id = ?")
            .bind(level)
            .bind(&user.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(SubmissionOutcome {
            record,
            level,
            days_completed,
        })
    }

    pub async fn list_for_user(&self, username: &str) -> Result<Vec<AttendanceRecord>, AttendanceError> {
        let user_id: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        let (user_id,) = user_id.ok_or(AttendanceError::UserNotFound)?;

        let records = sqlx::query_as::<_, AttendanceRecord>(
            "SELECT * FROM attendance WHERE user_id = ? ORDER BY attendance_date DESC",
        )
        .bind(&user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Every user's ledger, excluding the system admin account: it
    /// participates in auth but not in attendance analytics.
    pub async fn list_all(&self, admin_username: &str) -> Result<Vec<AttendanceWithUser>, AttendanceError> {
        let rows = sqlx::query_as::<_, AttendanceWithUser>(
            r#"
            SELECT a.id, u.username, u.name, a.attendance_date, a.attended, a.level, a.device_info
            FROM attendance a
            JOIN users u ON u.id = a.user_id
            WHERE u.username <> ?
            ORDER BY a.attendance_date DESC, u.username ASC
            "#,
        )
        .bind(admin_username)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Admin toggle of a historical record. The row's stored level snapshot
    /// is left untouched; only the owner's cached level is refreshed so it
    /// keeps agreeing with recomputation.
    pub async fn update_record(&self, id: &str, attended: bool) -> Result<AttendanceRecord, AttendanceError> {
        // rows_affected is 0 both for a missing row and for a no-op write on
        // MySQL, so existence is checked up front.
        let existing: Option<(String,)> = sqlx::query_as("SELECT id FROM attendance WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_none() {
            return Err(AttendanceError::RecordNotFound);
        }

        sqlx::query("UPDATE attendance SET attended = ? WHERE id = ?")
            .bind(attended)
            .bind(id)
            .execute(&self.pool)
            .await?;

        let record = sqlx::query_as::<_, AttendanceRecord>("SELECT * FROM attendance WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        let days = progression::days_completed(&self.pool, &record.user_id).await?;
        sqlx::query("UPDATE users SET level = ? WHERE id = ?")
            .bind(progression::current_level(days))
            .bind(&record.user_id)
            .execute(&self.pool)
            .await?;

        Ok(record)
    }

    pub async fn list_users(&self, admin_username: &str) -> Result<Vec<UserSummary>, AttendanceError> {
        let rows = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT u.username, u.name, u.email, u.phone, u.level,
                   COUNT(a.id) AS days_completed, u.created_at
            FROM users u
            LEFT JOIN attendance a ON a.user_id = u.id AND a.attended = TRUE
            WHERE u.username <> ?
            GROUP BY u.id, u.username, u.name, u.email, u.phone, u.level, u.created_at
            ORDER BY u.created_at ASC
            "#,
        )
        .bind(admin_username)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
