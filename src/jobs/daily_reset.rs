use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use futures_util::stream::{self, StreamExt};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::error::AppResult;
use crate::jobs::schedule::DailySchedule;
use crate::models::habit::Habit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// The stored row had already been reset for this date.
    AlreadyReset,
}

#[async_trait]
pub trait HabitStore: Send + Sync {
    /// All habits with `is_active = true`.
    async fn load_active_habits(&self) -> AppResult<Vec<Habit>>;

    /// Persist one habit's tracking fields and mark it reset for `run_date`.
    async fn save_reset(&self, habit: &Habit, run_date: NaiveDate) -> AppResult<SaveOutcome>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HabitOutcome {
    Advanced {
        habit_id: Uuid,
        completed: bool,
        current_streak: i32,
    },
    AlreadyReset {
        habit_id: Uuid,
    },
    Failed {
        habit_id: Uuid,
        reason: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub run_date: Option<NaiveDate>,
    pub loaded: usize,
    pub advanced: usize,
    /// Habits whose previous day counted as completed.
    pub completed: usize,
    pub already_reset: usize,
    pub failed: usize,
    pub failures: Vec<(Uuid, String)>,
}

impl RunReport {
    fn record(&mut self, outcome: HabitOutcome) {
        match outcome {
            HabitOutcome::Advanced { completed, .. } => {
                self.advanced += 1;
                if completed {
                    self.completed += 1;
                }
            }
            HabitOutcome::AlreadyReset { .. } => self.already_reset += 1,
            HabitOutcome::Failed { habit_id, reason } => {
                self.failed += 1;
                self.failures.push((habit_id, reason));
            }
        }
    }
}

/// Rolls every active habit from yesterday to today.
pub struct DailyResetJob {
    store: Arc<dyn HabitStore>,
    concurrency: usize,
}

impl DailyResetJob {
    pub fn new(store: Arc<dyn HabitStore>, concurrency: usize) -> Self {
        Self {
            store,
            concurrency: concurrency.max(1),
        }
    }

    /// Runs one reset for `run_date`. Only a failure to load the habits is
    /// returned as an error; per-habit failures are reported and logged.
    pub async fn run(&self, run_date: NaiveDate) -> AppResult<RunReport> {
        tracing::info!(%run_date, "Daily habit reset starting");

        let habits = self.store.load_active_habits().await?;
        let mut report = RunReport {
            run_date: Some(run_date),
            loaded: habits.len(),
            ..RunReport::default()
        };

        let outcomes: Vec<HabitOutcome> = stream::iter(habits)
            .map(|habit| self.reset_habit(habit, run_date))
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        for outcome in outcomes {
            report.record(outcome);
        }

        if report.failed > 0 {
            tracing::warn!(
                %run_date,
                loaded = report.loaded,
                advanced = report.advanced,
                already_reset = report.already_reset,
                failed = report.failed,
                "Daily habit reset finished with failures"
            );
        } else {
            tracing::info!(
                %run_date,
                loaded = report.loaded,
                advanced = report.advanced,
                completed = report.completed,
                already_reset = report.already_reset,
                "Daily habit reset finished"
            );
        }

        Ok(report)
    }

    async fn reset_habit(&self, mut habit: Habit, run_date: NaiveDate) -> HabitOutcome {
        let habit_id = habit.id;

        let Some(completed) = habit.roll_over(run_date) else {
            return HabitOutcome::AlreadyReset { habit_id };
        };

        match self.store.save_reset(&habit, run_date).await {
            Ok(SaveOutcome::Saved) => {
                tracing::debug!(
                    habit_id = %habit_id,
                    completed,
                    current_streak = habit.current_streak,
                    best_streak = habit.best_streak,
                    "Habit advanced"
                );
                HabitOutcome::Advanced {
                    habit_id,
                    completed,
                    current_streak: habit.current_streak,
                }
            }
            Ok(SaveOutcome::AlreadyReset) => HabitOutcome::AlreadyReset { habit_id },
            Err(e) => {
                tracing::error!(habit_id = %habit_id, error = %e, "Failed to save habit reset");
                HabitOutcome::Failed {
                    habit_id,
                    reason: e.to_string(),
                }
            }
        }
    }
}

/// Fires the reset once per day at the scheduled time.
pub fn spawn_daily_reset_worker(job: DailyResetJob, schedule: DailySchedule) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let now = Utc::now();
            let next = schedule.next_trigger_after(now);
            tracing::info!(next_run = %next, "Daily habit reset scheduled");

            tokio::time::sleep(DailySchedule::until(now, next)).await;

            match job.run(schedule.run_date(next)).await {
                Ok(report) => tracing::debug!(
                    run_date = ?report.run_date,
                    failures = ?report.failures,
                    "Daily habit reset report"
                ),
                Err(e) => {
                    tracing::error!(error = %e, "Daily habit reset aborted: could not load habits")
                }
            }
        }
    })
}
