use crate::config::DbPool;

/// Attended days required to clear one level.
pub const LEVEL_SPAN_DAYS: i64 = 120;
pub const MAX_LEVEL: i32 = 3;

/// Per-level progress for UI progress bars. `days_required` is `None` on
/// the terminal level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelProgress {
    pub level: i32,
    pub days_into_level: i64,
    pub days_required: Option<i64>,
}

/// Derives the level from an all-time attended-day count. Thresholds are
/// inclusive: the 120th attended day yields level 2 immediately.
pub fn current_level(days_completed: i64) -> i32 {
    if days_completed < LEVEL_SPAN_DAYS {
        1
    } else if days_completed < 2 * LEVEL_SPAN_DAYS {
        2
    } else {
        3
    }
}

pub fn is_level_unlocked(days_completed: i64, target_level: i32) -> bool {
    target_level <= current_level(days_completed)
}

pub fn progress_within_level(days_completed: i64) -> LevelProgress {
    let level = current_level(days_completed);
    let days_into_level = days_completed - i64::from(level - 1) * LEVEL_SPAN_DAYS;
    let days_required = if level < MAX_LEVEL {
        Some(LEVEL_SPAN_DAYS)
    } else {
        None
    };

    LevelProgress {
        level,
        days_into_level,
        days_required,
    }
}

/// All-time count of attended=true ledger rows. This recomputation is the
/// source of truth; `users.level` is a write-through cache of it.
pub async fn days_completed(pool: &DbPool, user_id: &str) -> Result<i64, sqlx::Error> {
    let row: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM attendance WHERE user_id = ? AND attended = TRUE")
            .bind(user_id)
            .fetch_one(pool)
            .await?;

    Ok(row.0)
}
