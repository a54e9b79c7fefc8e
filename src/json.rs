// JSON file operations

use crate::task::Task;
use eyre::{Context, Result, eyre};
use fs2::FileExt;
use serde::Deserialize;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Read the full task list from a JSON array file
///
/// A missing file is an empty list. A file holding the literal `null` is an
/// empty list too. Only the first JSON value is decoded; anything after it is
/// ignored. A first value that does not parse as a whole is an error and
/// partially decoded content is never returned.
pub fn read_tasks(path: &Path) -> Result<Vec<Task>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(file = ?path, "Task file does not exist, returning empty list");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e).wrap_err_with(|| format!("Failed to read task file {}", path.display())),
    };

    let mut de = serde_json::Deserializer::from_slice(&bytes);
    let tasks = Option::<Vec<Task>>::deserialize(&mut de)
        .wrap_err_with(|| format!("Failed to parse task file {}", path.display()))?
        .unwrap_or_default();

    debug!(file = ?path, count = tasks.len(), "Loaded tasks");
    Ok(tasks)
}

/// Overwrite the task file with the given list
///
/// The list is pretty-printed with 2-space indentation into a sibling temp
/// file, synced, then renamed over the target. The temp file is removed if
/// any step fails.
pub fn write_tasks(path: &Path, tasks: &[Task]) -> Result<()> {
    let json = serde_json::to_vec_pretty(tasks).context("Failed to serialize tasks")?;

    let tmp_path = sibling_path(path, ".tmp")?;
    let result = write_synced(&tmp_path, &json).and_then(|()| {
        fs::rename(&tmp_path, path).wrap_err_with(|| format!("Failed to replace task file {}", path.display()))
    });

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result?;

    debug!(file = ?path, count = tasks.len(), "Wrote tasks");
    Ok(())
}

fn write_synced(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file =
        File::create(path).wrap_err_with(|| format!("Failed to create temp file {}", path.display()))?;
    file.write_all(bytes)
        .wrap_err_with(|| format!("Failed to write temp file {}", path.display()))?;
    file.sync_all() // Ensure data is flushed to disk
        .wrap_err_with(|| format!("Failed to sync temp file {}", path.display()))?;
    Ok(())
}

/// Take an exclusive advisory lock on `<file>.lock` next to the task file
///
/// The lock is released when the returned handle is dropped.
pub fn lock_exclusive(path: &Path) -> Result<File> {
    let lock_path = sibling_path(path, ".lock")?;

    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&lock_path)
        .wrap_err_with(|| format!("Failed to open lock file {}", lock_path.display()))?;

    file.lock_exclusive().context("Failed to acquire file lock")?;

    Ok(file)
}

fn sibling_path(path: &Path, suffix: &str) -> Result<PathBuf> {
    let name = path
        .file_name()
        .ok_or_else(|| eyre!("Invalid task file path: {:?}", path))?;

    let mut sibling = name.to_os_string();
    sibling.push(suffix);
    Ok(path.with_file_name(sibling))
}
