use chrono::NaiveDate;

use crate::models::habit::{DailyProgress, HabitTrackingState, TrackingType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckIn {
    /// Mark a boolean habit done or not done.
    Done(bool),
    /// Add to a quantity habit's progress for today.
    Add(u32),
    /// Overwrite a quantity habit's progress for today.
    SetQuantity(u32),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CheckInError {
    #[error("{0:?} habits cannot record this kind of progress")]
    WrongTrackingType(TrackingType),
}

/// Records user progress for `today`. Progress left over from an earlier
/// day is discarded first. Streak counters are untouched.
pub fn record_check_in(
    state: &HabitTrackingState,
    today: NaiveDate,
    check_in: CheckIn,
) -> Result<HabitTrackingState, CheckInError> {
    let current = if state.last_tracked_date == Some(today) {
        state.progress
    } else {
        state.progress.cleared()
    };

    let progress = match (current, check_in) {
        (DailyProgress::Boolean { .. }, CheckIn::Done(completed)) => {
            DailyProgress::Boolean { completed }
        }
        (DailyProgress::Quantity { goal, progress }, CheckIn::Add(amount)) => {
            DailyProgress::Quantity {
                goal,
                progress: progress.saturating_add(amount),
            }
        }
        (DailyProgress::Quantity { goal, .. }, CheckIn::SetQuantity(progress)) => {
            DailyProgress::Quantity { goal, progress }
        }
        (other, _) => return Err(CheckInError::WrongTrackingType(other.tracking_type())),
    };

    Ok(HabitTrackingState {
        last_tracked_date: Some(today),
        progress,
        ..*state
    })
}
