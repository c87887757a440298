pub mod daily_reset;
pub mod schedule;

pub use daily_reset::{spawn_daily_reset_worker, DailyResetJob};
pub use schedule::DailySchedule;
