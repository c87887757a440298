use crate::models::habit::HabitTrackingState;

/// Folds the previous day's result into the streak counters and rolls the
/// habit to an empty day.
pub fn advance_streak(state: &HabitTrackingState, completed_yesterday: bool) -> HabitTrackingState {
    let (current_streak, best_streak) = if completed_yesterday {
        let current = state.current_streak.saturating_add(1);
        (current, state.best_streak.max(current))
    } else {
        (0, state.best_streak)
    };

    HabitTrackingState {
        last_tracked_date: None,
        progress: state.progress.cleared(),
        current_streak,
        best_streak,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::habit::DailyProgress;
    use chrono::NaiveDate;

    fn tracked(progress: DailyProgress, current_streak: u32, best_streak: u32) -> HabitTrackingState {
        HabitTrackingState {
            last_tracked_date: NaiveDate::from_ymd_opt(2026, 2, 9),
            progress,
            current_streak,
            best_streak,
        }
    }

    #[test]
    fn test_completed_day_extends_streak() {
        let before = tracked(DailyProgress::Boolean { completed: true }, 3, 5);
        let after = advance_streak(&before, true);

        assert_eq!(after.current_streak, 4);
        assert_eq!(after.best_streak, 5);
        assert_eq!(after.last_tracked_date, None);
        assert_eq!(after.progress, DailyProgress::Boolean { completed: false });
    }

    #[test]
    fn test_missed_day_resets_current_only() {
        let before = tracked(DailyProgress::Boolean { completed: false }, 4, 5);
        let after = advance_streak(&before, false);

        assert_eq!(after.current_streak, 0);
        assert_eq!(after.best_streak, 5);
    }

    #[test]
    fn test_new_best_streak() {
        let before = tracked(DailyProgress::Boolean { completed: true }, 5, 5);
        let after = advance_streak(&before, true);

        assert_eq!(after.current_streak, 6);
        assert_eq!(after.best_streak, 6);
    }

    #[test]
    fn test_quantity_progress_cleared_goal_kept() {
        let before = tracked(
            DailyProgress::Quantity {
                goal: Some(8),
                progress: 10,
            },
            0,
            2,
        );
        let after = advance_streak(&before, true);

        assert_eq!(after.current_streak, 1);
        assert_eq!(after.best_streak, 2);
        assert_eq!(
            after.progress,
            DailyProgress::Quantity {
                goal: Some(8),
                progress: 0
            }
        );
    }

    #[test]
    fn test_best_never_below_current() {
        // rows written before the invariant held
        let before = tracked(DailyProgress::Boolean { completed: true }, 9, 2);
        let after = advance_streak(&before, true);
        assert_eq!(after.current_streak, 10);
        assert_eq!(after.best_streak, 10);

        for completed in [true, false] {
            for (current, best) in [(0, 0), (1, 4), (4, 4), (u32::MAX, u32::MAX)] {
                let s = tracked(DailyProgress::Boolean { completed }, current, best);
                let next = advance_streak(&s, completed);
                assert!(next.best_streak >= next.current_streak);
                assert!(next.best_streak >= s.best_streak);
            }
        }
    }

    #[test]
    fn test_streak_saturates() {
        let before = tracked(DailyProgress::Boolean { completed: true }, u32::MAX, u32::MAX);
        let after = advance_streak(&before, true);
        assert_eq!(after.current_streak, u32::MAX);
    }
}
