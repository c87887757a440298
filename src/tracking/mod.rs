pub mod check_in;
pub mod completion;
pub mod streak;

pub use check_in::{record_check_in, CheckIn, CheckInError};
pub use completion::was_completed;
pub use streak::advance_streak;
