pub mod habit_store;
pub mod pool;

pub use habit_store::PgHabitStore;
pub use pool::create_pool;
