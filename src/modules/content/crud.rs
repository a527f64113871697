use chrono::Utc;
use uuid::Uuid;

use crate::config::DbPool;
use crate::modules::auth::model::User;
use crate::modules::content::model::{DailyProgress, HabitTask, RoutineStep, Video};
use crate::services::progression;

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("User not found")]
    UserNotFound,

    #[error("Not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ContentError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            Self::UserNotFound | Self::NotFound => StatusCode::NOT_FOUND,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub struct UserContent {
    pub level: i32,
    pub days_completed: i64,
    pub days_into_level: i64,
    pub days_required: Option<i64>,
    pub current_video_index: i32,
    pub current_video: Option<Video>,
    pub total_videos: i64,
}

pub struct ContentCrud {
    pool: DbPool,
}

impl ContentCrud {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn require_user(&self, username: &str) -> Result<User, ContentError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ContentError::UserNotFound)
    }

    // =========================================================================
    // DAILY CHECKLIST
    // =========================================================================

    /// Idempotent: repeated calls leave the flag set and advance the video
    /// cursor at most once per day.
    pub async fn mark_video_complete(&self, username: &str, video_id: &str) -> Result<(), ContentError> {
        let user = self.require_user(username).await?;
        let today = Utc::now().date_naive();

        let mut tx = self.pool.begin().await?;

        let already: Option<(bool,)> = sqlx::query_as(
            "SELECT video_completed FROM daily_progress WHERE username = ? AND progress_date = ?",
        )
        .bind(username)
        .bind(today)
        .fetch_optional(&mut *tx)
        .await?;
        let first_completion = !already.map(|(v,)| v).unwrap_or(false);

        sqlx::query(
            r#"
            INSERT INTO daily_progress (id, username, progress_date, video_completed, completed_video_id)
            VALUES (?, ?, ?, TRUE, ?)
            ON DUPLICATE KEY UPDATE video_completed = TRUE, completed_video_id = ?
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(username)
        .bind(today)
        .bind(video_id)
        .bind(video_id)
        .execute(&mut *tx)
        .await?;

        if first_completion {
            let total: (i64,) =
                sqlx::query_as("SELECT COUNT(*) FROM videos WHERE level = ? AND active = TRUE")
                    .bind(user.level)
                    .fetch_one(&mut *tx)
                    .await?;
            let last_index = (total.0 - 1).max(0);
            sqlx::query("UPDATE users SET current_video_index = LEAST(current_video_index + 1, ?) WHERE id = ?")
                .bind(last_index)
                .bind(&user.id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn mark_routine_complete(&self, username: &str) -> Result<(), ContentError> {
        self.require_user(username).await?;
        self.set_flag(username, "routine_completed").await
    }

    pub async fn mark_habits_complete(&self, username: &str) -> Result<(), ContentError> {
        self.require_user(username).await?;
        self.set_flag(username, "habits_completed").await
    }

    async fn set_flag(&self, username: &str, column: &'static str) -> Result<(), ContentError> {
        let today = Utc::now().date_naive();
        // Column name comes from a fixed whitelist above, never from input.
        let sql = format!(
            r#"
            INSERT INTO daily_progress (id, username, progress_date, {col})
            VALUES (?, ?, ?, TRUE)
            ON DUPLICATE KEY UPDATE {col} = TRUE
            "#,
            col = column
        );
        sqlx::query(&sql)
            .bind(Uuid::new_v4().to_string())
            .bind(username)
            .bind(today)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn progress_today(&self, username: &str) -> Result<DailyProgress, ContentError> {
        self.require_user(username).await?;
        let today = Utc::now().date_naive();

        let row = sqlx::query_as::<_, DailyProgress>(
            "SELECT * FROM daily_progress WHERE username = ? AND progress_date = ?",
        )
        .bind(username)
        .bind(today)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.unwrap_or(DailyProgress {
            id: String::new(),
            username: username.to_string(),
            progress_date: today,
            video_completed: false,
            routine_completed: false,
            habits_completed: false,
            completed_video_id: None,
            created_at: Utc::now(),
        }))
    }

    // =========================================================================
    // USER CONTENT / LEVEL PROGRESS
    // =========================================================================

    pub async fn user_content(&self, username: &str) -> Result<UserContent, ContentError> {
        let user = self.require_user(username).await?;

        let days = progression::days_completed(&self.pool, &user.id).await?;
        let progress = progression::progress_within_level(days);

        let videos = sqlx::query_as::<_, Video>(
            "SELECT * FROM videos WHERE level = ? AND active = TRUE ORDER BY created_at ASC, id ASC",
        )
        .bind(progress.level)
        .fetch_all(&self.pool)
        .await?;

        let total_videos = videos.len() as i64;
        let index = usize::try_from(user.current_video_index).unwrap_or(0);
        let current_video = if videos.is_empty() {
            None
        } else {
            Some(videos[index.min(videos.len() - 1)].clone())
        };

        Ok(UserContent {
            level: progress.level,
            days_completed: days,
            days_into_level: progress.days_into_level,
            days_required: progress.days_required,
            current_video_index: user.current_video_index,
            current_video,
            total_videos,
        })
    }

    pub async fn list_routines(&self) -> Result<Vec<RoutineStep>, ContentError> {
        let steps = sqlx::query_as::<_, RoutineStep>(
            "SELECT * FROM routine_steps WHERE active = TRUE ORDER BY sequence ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(steps)
    }

    pub async fn list_habits(&self) -> Result<Vec<HabitTask>, ContentError> {
        let habits = sqlx::query_as::<_, HabitTask>(
            "SELECT * FROM habit_tasks WHERE active = TRUE ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(habits)
    }

    // =========================================================================
    // ADMIN: CONTENT MANAGEMENT
    // =========================================================================

    pub async fn add_video(&self, title: &str, url: &str, level: i32) -> Result<Video, ContentError> {
        let video = Video {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            url: url.to_string(),
            level,
            active: true,
            created_at: Utc::now(),
        };
        sqlx::query("INSERT INTO videos (id, title, url, level, active) VALUES (?, ?, ?, ?, TRUE)")
            .bind(&video.id)
            .bind(&video.title)
            .bind(&video.url)
            .bind(video.level)
            .execute(&self.pool)
            .await?;
        Ok(video)
    }

    pub async fn add_routine_step(
        &self,
        sequence: i32,
        name: &str,
        description: &str,
    ) -> Result<RoutineStep, ContentError> {
        let step = RoutineStep {
            id: Uuid::new_v4().to_string(),
            sequence,
            name: name.to_string(),
            description: description.to_string(),
            active: true,
            created_at: Utc::now(),
        };
        sqlx::query(
            "INSERT INTO routine_steps (id, sequence, name, description, active) VALUES (?, ?, ?, ?, TRUE)",
        )
        .bind(&step.id)
        .bind(step.sequence)
        .bind(&step.name)
        .bind(&step.description)
        .execute(&self.pool)
        .await?;
        Ok(step)
    }

    pub async fn add_habit(&self, name: &str, description: &str) -> Result<HabitTask, ContentError> {
        let habit = HabitTask {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: description.to_string(),
            active: true,
            created_at: Utc::now(),
        };
        sqlx::query(
            "INSERT INTO habit_tasks (id, name, description, active) VALUES (?, ?, ?, TRUE)",
        )
        .bind(&habit.id)
        .bind(&habit.name)
        .bind(&habit.description)
        .execute(&self.pool)
        .await?;
        Ok(habit)
    }

    pub async fn update_habit(&self, id: &str, name: &str, description: &str) -> Result<HabitTask, ContentError> {
        sqlx::query_as::<_, HabitTask>("SELECT * FROM habit_tasks WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ContentError::NotFound)?;

        sqlx::query("UPDATE habit_tasks SET name = ?, description = ?, active = TRUE WHERE id = ?")
            .bind(name)
            .bind(description)
            .bind(id)
            .execute(&self.pool)
            .await?;

        let habit = sqlx::query_as::<_, HabitTask>("SELECT * FROM habit_tasks WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(habit)
    }

    pub async fn delete_habit(&self, id: &str) -> Result<(), ContentError> {
        let result = sqlx::query("DELETE FROM habit_tasks WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ContentError::NotFound);
        }
        Ok(())
    }
}
