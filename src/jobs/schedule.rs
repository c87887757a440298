use chrono::{
    DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc,
};

use crate::config::Config;

/// When the daily reset fires and which zone defines a day.
///
/// A tracking day starts at the trigger time, not at local midnight: with a
/// 03:00 trigger, a check-in at 01:00 still belongs to the previous day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailySchedule {
    pub time: NaiveTime,
    pub offset: FixedOffset,
}

impl DailySchedule {
    pub fn new(time: NaiveTime, offset: FixedOffset) -> Self {
        Self { time, offset }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.daily_reset_time, config.daily_reset_offset)
    }

    /// Tracking day at `now`: the local date of the most recent trigger.
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        let since_midnight = self.time - NaiveTime::default();
        (self.local(now) - since_midnight).date()
    }

    /// The first trigger strictly after `now`.
    pub fn next_trigger_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let local_trigger = self.local(now).date().and_time(self.time);
        let trigger = Utc.from_utc_datetime(
            &(local_trigger - Duration::seconds(i64::from(self.offset.local_minus_utc()))),
        );

        if trigger <= now {
            trigger + Duration::days(1)
        } else {
            trigger
        }
    }

    /// Date a trigger scheduled for `fired_at` processes. Progress recorded on
    /// the day before it is folded into the streaks.
    pub fn run_date(&self, fired_at: DateTime<Utc>) -> NaiveDate {
        self.today(fired_at)
    }

    fn local(&self, now: DateTime<Utc>) -> NaiveDateTime {
        now.with_timezone(&self.offset).naive_local()
    }

    pub fn until(now: DateTime<Utc>, next: DateTime<Utc>) -> std::time::Duration {
        (next - now).to_std().unwrap_or(std::time::Duration::ZERO)
    }
}

impl Default for DailySchedule {
    fn default() -> Self {
        Self::new(NaiveTime::default(), Utc.fix())
    }
}
