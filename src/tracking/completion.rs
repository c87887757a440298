use chrono::NaiveDate;

use crate::models::habit::{DailyProgress, HabitTrackingState};

/// Whether `reference_date` counts as a completed day for the habit.
///
/// Only progress recorded on `reference_date` itself is considered; a habit
/// that was not tracked that day is not completed. Quantity habits without a
/// configured goal are never completed.
pub fn was_completed(state: &HabitTrackingState, reference_date: NaiveDate) -> bool {
    if state.last_tracked_date != Some(reference_date) {
        return false;
    }

    match state.progress {
        DailyProgress::Boolean { completed } => completed,
        DailyProgress::Quantity { goal, progress } => goal.is_some_and(|goal| progress >= goal),
    }
}
