use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::tracking::{advance_streak, record_check_in, was_completed, CheckIn, CheckInError};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Habit {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub unit: Option<String>,
    pub color: String,
    pub tracking_type: TrackingType,
    pub daily_goal: Option<i32>,
    pub is_active: bool,
    pub last_tracked_date: Option<NaiveDate>,
    pub today_completed: bool,
    pub today_quantity: i32,
    pub current_streak: i32,
    pub best_streak: i32,
    pub last_reset_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "tracking_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TrackingType {
    Boolean,
    Quantity,
}

impl Default for TrackingType {
    fn default() -> Self {
        Self::Boolean
    }
}

/// What the user has recorded for `last_tracked_date`, shaped by the
/// habit's tracking type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DailyProgress {
    Boolean { completed: bool },
    Quantity { goal: Option<u32>, progress: u32 },
}

impl DailyProgress {
    pub fn tracking_type(&self) -> TrackingType {
        match self {
            Self::Boolean { .. } => TrackingType::Boolean,
            Self::Quantity { .. } => TrackingType::Quantity,
        }
    }

    /// Same tracking type and goal, nothing recorded.
    pub fn cleared(&self) -> Self {
        match *self {
            Self::Boolean { .. } => Self::Boolean { completed: false },
            Self::Quantity { goal, .. } => Self::Quantity { goal, progress: 0 },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HabitTrackingState {
    pub last_tracked_date: Option<NaiveDate>,
    pub progress: DailyProgress,
    pub current_streak: u32,
    pub best_streak: u32,
}

fn non_negative(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

fn to_column(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

impl Habit {
    pub fn tracking_state(&self) -> HabitTrackingState {
        let progress = match self.tracking_type {
            TrackingType::Boolean => DailyProgress::Boolean {
                completed: self.today_completed,
            },
            TrackingType::Quantity => DailyProgress::Quantity {
                goal: self.daily_goal.filter(|g| *g > 0).map(non_negative),
                progress: non_negative(self.today_quantity),
            },
        };
        HabitTrackingState {
            last_tracked_date: self.last_tracked_date,
            progress,
            current_streak: non_negative(self.current_streak),
            best_streak: non_negative(self.best_streak),
        }
    }

    /// Writes `state` back into the row. The goal is configuration and is
    /// left as stored.
    pub fn apply_tracking_state(&mut self, state: &HabitTrackingState) {
        self.last_tracked_date = state.last_tracked_date;
        match state.progress {
            DailyProgress::Boolean { completed } => {
                self.today_completed = completed;
                self.today_quantity = 0;
            }
            DailyProgress::Quantity { progress, .. } => {
                self.today_completed = false;
                self.today_quantity = to_column(progress);
            }
        }
        self.current_streak = to_column(state.current_streak);
        self.best_streak = to_column(state.best_streak);
    }

    /// Folds the day before `run_date` into the streaks and clears today's
    /// fields, stamping `last_reset_on`. Returns whether that day counted as
    /// completed, or `None` when the habit was already rolled over for
    /// `run_date`.
    pub fn roll_over(&mut self, run_date: NaiveDate) -> Option<bool> {
        if is_reset_for(self.last_reset_on, run_date) {
            return None;
        }

        let state = self.tracking_state();
        let completed = run_date
            .pred_opt()
            .is_some_and(|yesterday| was_completed(&state, yesterday));
        self.apply_tracking_state(&advance_streak(&state, completed));
        self.last_reset_on = Some(run_date);
        Some(completed)
    }

    /// Records progress for the tracking day `today`. A roll-over still
    /// pending for `today` is applied first so the previous day's progress
    /// reaches the streaks before it is replaced.
    pub fn check_in(&mut self, today: NaiveDate, check_in: CheckIn) -> Result<(), CheckInError> {
        let mut next = self.clone();
        next.roll_over(today);
        let tracked = record_check_in(&next.tracking_state(), today, check_in)?;
        next.apply_tracking_state(&tracked);
        *self = next;
        Ok(())
    }
}

/// Whether a row stamped `last_reset_on` has already been rolled over for
/// `run_date`. `PgHabitStore::save_reset` enforces the same rule in its
/// `WHERE` clause.
pub fn is_reset_for(last_reset_on: Option<NaiveDate>, run_date: NaiveDate) -> bool {
    last_reset_on.is_some_and(|d| d >= run_date)
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TrackMode {
    #[default]
    Add,
    Set,
}

#[derive(Debug, Deserialize, Validate)]
pub struct TrackRequest {
    pub completed: Option<bool>,
    #[validate(range(min = 0, max = 100000, message = "Quantity must be between 0 and 100000"))]
    pub quantity: Option<i32>,
    #[serde(default)]
    pub mode: TrackMode,
}

#[derive(Debug, Serialize)]
pub struct HabitResponse {
    #[serde(flatten)]
    pub habit: Habit,
    pub tracked_today: bool,
    pub completed_today: bool,
}

#[derive(Debug, Serialize)]
pub struct StreakInfo {
    pub habit_id: Uuid,
    pub current_streak: i32,
    pub best_streak: i32,
    pub tracked_today: bool,
    pub completed_today: bool,
}

impl HabitResponse {
    pub fn new(habit: Habit, today: NaiveDate) -> Self {
        let state = habit.tracking_state();
        Self {
            tracked_today: state.last_tracked_date == Some(today),
            completed_today: was_completed(&state, today),
            habit,
        }
    }

    pub fn streak(&self) -> StreakInfo {
        StreakInfo {
            habit_id: self.habit.id,
            current_streak: self.habit.current_streak,
            best_streak: self.habit.best_streak,
            tracked_today: self.tracked_today,
            completed_today: self.completed_today,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    impl HabitTrackingState {
        pub(crate) fn fresh(tracking_type: TrackingType, daily_goal: Option<u32>) -> Self {
            let progress = match tracking_type {
                TrackingType::Boolean => DailyProgress::Boolean { completed: false },
                TrackingType::Quantity => DailyProgress::Quantity {
                    goal: daily_goal,
                    progress: 0,
                },
            };
            Self {
                last_tracked_date: None,
                progress,
                current_streak: 0,
                best_streak: 0,
            }
        }
    }

    pub(crate) fn habit(tracking_type: TrackingType, daily_goal: Option<i32>) -> Habit {
        let now = Utc::now();
        Habit {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Drink water".into(),
            description: None,
            unit: None,
            color: "#007bff".into(),
            tracking_type,
            daily_goal,
            is_active: true,
            last_tracked_date: None,
            today_completed: false,
            today_quantity: 0,
            current_streak: 0,
            best_streak: 0,
            last_reset_on: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
    }

    #[test]
    fn test_boolean_row_ignores_quantity_column() {
        let mut row = habit(TrackingType::Boolean, None);
        row.today_completed = true;
        row.today_quantity = 42;
        row.last_tracked_date = Some(date(4));

        let state = row.tracking_state();
        assert_eq!(state.progress, DailyProgress::Boolean { completed: true });
        assert_eq!(state.last_tracked_date, Some(date(4)));
    }

    #[test]
    fn test_quantity_row_ignores_completed_flag() {
        let mut row = habit(TrackingType::Quantity, Some(8));
        row.today_completed = true;
        row.today_quantity = 3;

        let state = row.tracking_state();
        assert_eq!(
            state.progress,
            DailyProgress::Quantity {
                goal: Some(8),
                progress: 3
            }
        );
    }

    #[test]
    fn test_negative_columns_read_as_zero() {
        let mut row = habit(TrackingType::Quantity, Some(-2));
        row.today_quantity = -5;
        row.current_streak = -1;
        row.best_streak = -3;

        let state = row.tracking_state();
        assert_eq!(
            state.progress,
            DailyProgress::Quantity {
                goal: None,
                progress: 0
            }
        );
        assert_eq!(state.current_streak, 0);
        assert_eq!(state.best_streak, 0);
    }

    #[test]
    fn test_apply_zeroes_column_of_other_type() {
        let mut row = habit(TrackingType::Boolean, None);
        row.today_quantity = 9;
        let state = HabitTrackingState {
            last_tracked_date: Some(date(2)),
            progress: DailyProgress::Boolean { completed: true },
            current_streak: 4,
            best_streak: 7,
        };

        row.apply_tracking_state(&state);
        assert!(row.today_completed);
        assert_eq!(row.today_quantity, 0);
        assert_eq!(row.current_streak, 4);
        assert_eq!(row.best_streak, 7);
        assert_eq!(row.tracking_state(), state);
    }

    #[test]
    fn test_fresh_state_is_empty() {
        let state = HabitTrackingState::fresh(TrackingType::Quantity, Some(8));
        assert_eq!(state.last_tracked_date, None);
        assert_eq!(state.current_streak, 0);
        assert_eq!(state.best_streak, 0);
        assert_eq!(state.progress.tracking_type(), TrackingType::Quantity);
        assert_eq!(state.progress.cleared(), state.progress);
    }

    #[test]
    fn test_response_flags_for_today() {
        let mut row = habit(TrackingType::Quantity, Some(8));
        row.last_tracked_date = Some(date(10));
        row.today_quantity = 8;

        let response = HabitResponse::new(row.clone(), date(10));
        assert!(response.tracked_today);
        assert!(response.completed_today);

        let response = HabitResponse::new(row, date(11));
        assert!(!response.tracked_today);
        assert!(!response.completed_today);
    }

    #[test]
    fn test_reset_stamp_rule() {
        assert!(!is_reset_for(None, date(10)));
        assert!(!is_reset_for(Some(date(9)), date(10)));
        assert!(is_reset_for(Some(date(10)), date(10)));
        assert!(is_reset_for(Some(date(11)), date(10)));
    }

    #[test]
    fn test_roll_over_once_per_date() {
        let mut row = habit(TrackingType::Boolean, None);
        row.last_tracked_date = Some(date(9));
        row.today_completed = true;
        row.current_streak = 2;
        row.best_streak = 2;

        assert_eq!(row.roll_over(date(10)), Some(true));
        assert_eq!(row.current_streak, 3);
        assert_eq!(row.best_streak, 3);
        assert_eq!(row.last_reset_on, Some(date(10)));
        assert_eq!(row.last_tracked_date, None);

        assert_eq!(row.roll_over(date(10)), None);
        assert_eq!(row.current_streak, 3);
    }

    #[test]
    fn test_check_in_folds_pending_previous_day() {
        let mut row = habit(TrackingType::Boolean, None);
        row.last_tracked_date = Some(date(9));
        row.today_completed = true;
        row.current_streak = 10;
        row.best_streak = 10;
        row.last_reset_on = Some(date(9));

        row.check_in(date(10), CheckIn::Done(true)).unwrap();

        assert_eq!(row.current_streak, 11);
        assert_eq!(row.best_streak, 11);
        assert_eq!(row.last_reset_on, Some(date(10)));
        assert_eq!(row.last_tracked_date, Some(date(10)));
        assert!(row.today_completed);
    }

    #[test]
    fn test_check_in_after_reset_leaves_streaks() {
        let mut row = habit(TrackingType::Quantity, Some(8));
        row.current_streak = 4;
        row.best_streak = 6;
        row.last_reset_on = Some(date(10));

        row.check_in(date(10), CheckIn::Add(3)).unwrap();
        row.check_in(date(10), CheckIn::Add(2)).unwrap();

        assert_eq!(row.today_quantity, 5);
        assert_eq!(row.current_streak, 4);
        assert_eq!(row.best_streak, 6);
        assert_eq!(row.last_reset_on, Some(date(10)));
    }

    #[test]
    fn test_rejected_check_in_leaves_row_unchanged() {
        let mut row = habit(TrackingType::Boolean, None);
        row.last_tracked_date = Some(date(9));
        row.today_completed = true;
        row.current_streak = 3;
        let before = row.clone();

        assert!(row.check_in(date(10), CheckIn::Add(1)).is_err());
        assert_eq!(row.current_streak, before.current_streak);
        assert_eq!(row.last_reset_on, before.last_reset_on);
        assert_eq!(row.last_tracked_date, before.last_tracked_date);
    }
}
