// Task list store backed by a single JSON file

use crate::json;
use crate::task::Task;
use eyre::Result;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default store location, relative to the working directory
pub const DEFAULT_TASKS_FILE: &str = "tasks.json";

/// Persistent task list
///
/// The file is the only state: every operation reloads the full list, applies
/// its change in memory, and rewrites the whole file. Nothing is cached
/// between calls.
///
/// Two flavours of each operation exist. The plain methods (`fetch_all`,
/// `add`, ...) never fail: storage problems degrade to an empty list or a
/// dropped write and are logged. The `try_*` methods return the underlying
/// error so a caller can tell an empty list from a broken store.
#[derive(Debug, Clone)]
pub struct TaskStore {
    path: PathBuf,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new(DEFAULT_TASKS_FILE)
    }
}

impl TaskStore {
    /// Create a store for the given file path
    ///
    /// Nothing is touched on disk until the first operation.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Get the path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    // ========================================================================
    // Lenient API
    // ========================================================================

    /// Read the full task list, or an empty list if the store is missing,
    /// unreadable or malformed
    pub fn fetch_all(&self) -> Vec<Task> {
        match self.try_fetch_all() {
            Ok(tasks) => tasks,
            Err(e) => {
                warn!(file = ?self.path, error = ?e, "Failed to load tasks, using empty list");
                Vec::new()
            }
        }
    }

    /// Overwrite the store with the given list, logging any failure
    pub fn save_all(&self, tasks: &[Task]) {
        if let Err(e) = self.try_save_all(tasks) {
            warn!(file = ?self.path, error = ?e, "Failed to save tasks, change not persisted");
        }
    }

    /// Append an open task; empty text returns the current list unchanged
    pub fn add(&self, text: &str) -> Vec<Task> {
        if text.is_empty() {
            debug!("Ignoring add with empty text");
            return self.fetch_all();
        }
        self.mutate(|tasks| apply_add(tasks, text))
    }

    /// Remove the task at `index`; out-of-range indices leave the list as is
    pub fn remove_at(&self, index: i64) -> Vec<Task> {
        self.mutate(|tasks| apply_remove(tasks, index))
    }

    /// Flip `completed` on the task at `index`; out-of-range indices leave
    /// the list as is
    pub fn toggle_at(&self, index: i64) -> Vec<Task> {
        self.mutate(|tasks| apply_toggle(tasks, index))
    }

    // ========================================================================
    // Strict API
    // ========================================================================

    /// Read the full task list; a missing store is an empty list, anything
    /// else that goes wrong is an error
    pub fn try_fetch_all(&self) -> Result<Vec<Task>> {
        json::read_tasks(&self.path)
    }

    /// Overwrite the store with the given list
    pub fn try_save_all(&self, tasks: &[Task]) -> Result<()> {
        json::write_tasks(&self.path, tasks)
    }

    pub fn try_add(&self, text: &str) -> Result<Vec<Task>> {
        if text.is_empty() {
            debug!("Ignoring add with empty text");
            return self.try_fetch_all();
        }
        self.try_mutate(|tasks| apply_add(tasks, text))
    }

    pub fn try_remove_at(&self, index: i64) -> Result<Vec<Task>> {
        self.try_mutate(|tasks| apply_remove(tasks, index))
    }

    pub fn try_toggle_at(&self, index: i64) -> Result<Vec<Task>> {
        self.try_mutate(|tasks| apply_toggle(tasks, index))
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    /// Read-modify-write under the store lock, degrading on every failure
    ///
    /// The lock is taken before the read, so it is held (and `<file>.lock`
    /// created) even when `apply` turns out to change nothing. Returns the
    /// in-memory post-state even when the write is dropped.
    fn mutate<F>(&self, apply: F) -> Vec<Task>
    where
        F: FnOnce(&mut Vec<Task>) -> bool,
    {
        let _lock = self.lock_lenient();

        let mut tasks = self.fetch_all();
        if apply(&mut tasks) {
            self.save_all(&tasks);
        }
        tasks
    }

    fn try_mutate<F>(&self, apply: F) -> Result<Vec<Task>>
    where
        F: FnOnce(&mut Vec<Task>) -> bool,
    {
        let _lock = json::lock_exclusive(&self.path)?;

        let mut tasks = self.try_fetch_all()?;
        if apply(&mut tasks) {
            self.try_save_all(&tasks)?;
        }
        Ok(tasks)
    }

    fn lock_lenient(&self) -> Option<File> {
        match json::lock_exclusive(&self.path) {
            Ok(lock) => Some(lock),
            Err(e) => {
                warn!(file = ?self.path, error = ?e, "Failed to lock task file, continuing unlocked");
                None
            }
        }
    }
}

/// Convert a caller-supplied index into a position in `tasks`
fn checked_index(tasks: &[Task], index: i64) -> Option<usize> {
    usize::try_from(index).ok().filter(|&i| i < tasks.len())
}

fn apply_add(tasks: &mut Vec<Task>, text: &str) -> bool {
    tasks.push(Task::new(text));
    true
}

fn apply_remove(tasks: &mut Vec<Task>, index: i64) -> bool {
    match checked_index(tasks, index) {
        Some(i) => {
            tasks.remove(i);
            true
        }
        None => {
            debug!(index, len = tasks.len(), "Ignoring remove with out-of-range index");
            false
        }
    }
}

fn apply_toggle(tasks: &mut [Task], index: i64) -> bool {
    match checked_index(tasks, index) {
        Some(i) => {
            tasks[i].toggle();
            true
        }
        None => {
            debug!(index, len = tasks.len(), "Ignoring toggle with out-of-range index");
            false
        }
    }
}
