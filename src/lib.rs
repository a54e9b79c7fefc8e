// TodoStore - Task list persistence backed by a single JSON file

pub mod json;
pub mod store;
pub mod task;

// Re-export main types for convenience
pub use store::{DEFAULT_TASKS_FILE, TaskStore};
pub use task::Task;
