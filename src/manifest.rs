//! The task manifest: the plan persisted between planning and execution.

use crate::error::{Error, Result};
use crate::task::Task;
use crate::writer::write_file_atomic;
use std::fs;
use std::path::Path;
use tracing::info;

/// Writes `tasks` to `path` as a pretty-printed JSON array.
///
/// Parent directories are created as needed and the file is replaced
/// atomically.
///
/// # Errors
///
/// Returns an error if the manifest cannot be serialized or written.
pub fn write_manifest(path: &Path, tasks: &[Task]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let mut json = serde_json::to_vec_pretty(tasks)?;
    json.push(b'\n');
    write_file_atomic(path, &json)?;

    info!("Wrote {} tasks to {}", tasks.len(), path.display());
    Ok(())
}

/// Reads the task list written by [`write_manifest`].
///
/// # Errors
///
/// Returns an error if the file is missing or is not a JSON task array.
pub fn read_manifest(path: &Path) -> Result<Vec<Task>> {
    let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let tasks: Vec<Task> =
        serde_json::from_str(&content).map_err(|e| Error::manifest(path, e.to_string()))?;

    info!("Loaded {} tasks from {}", tasks.len(), path.display());
    Ok(tasks)
}
