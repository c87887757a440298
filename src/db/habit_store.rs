use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use crate::error::AppResult;
use crate::jobs::daily_reset::{HabitStore, SaveOutcome};
use crate::models::habit::Habit;

#[derive(Clone)]
pub struct PgHabitStore {
    db: PgPool,
}

impl PgHabitStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl HabitStore for PgHabitStore {
    async fn load_active_habits(&self) -> AppResult<Vec<Habit>> {
        let habits = sqlx::query_as::<_, Habit>(
            "SELECT * FROM habits WHERE is_active = true ORDER BY created_at ASC",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(habits)
    }

    async fn save_reset(&self, habit: &Habit, run_date: NaiveDate) -> AppResult<SaveOutcome> {
        // A row already stamped for run_date was advanced by another run or
        // rolled over by a check-in. Same rule as `models::habit::is_reset_for`,
        // which the in-memory store in the job tests applies.
        let result = sqlx::query(
            r#"
            UPDATE habits SET
                last_tracked_date = $2,
                today_completed = $3,
                today_quantity = $4,
                current_streak = $5,
                best_streak = $6,
                last_reset_on = $7,
                updated_at = NOW()
            WHERE id = $1 AND (last_reset_on IS NULL OR last_reset_on < $7)
            "#,
        )
        .bind(habit.id)
        .bind(habit.last_tracked_date)
        .bind(habit.today_completed)
        .bind(habit.today_quantity)
        .bind(habit.current_streak)
        .bind(habit.best_streak)
        .bind(run_date)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            Ok(SaveOutcome::AlreadyReset)
        } else {
            Ok(SaveOutcome::Saved)
        }
    }
}
