//! Storage layer for taskdeck
//!
//! The whole task collection lives in one JSON document: an array of task
//! objects in collection order.
//!
//! ```text
//! ~/.taskdeck/
//!   config.toml     # configuration
//!   tasks.json      # task document
//!   tasks.bak       # last corrupt document, kept for inspection
//! ```
//!
//! Writes go through a temp file in the same directory followed by a rename,
//! so readers only ever see a complete document. A document that fails to
//! parse or decode is moved to the backup path and replaced by the seed
//! collection; filesystem errors are never masked.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tempfile::NamedTempFile;
use uuid::Uuid;

use crate::error::Result;
use crate::task::{ChecklistItem, Task};
use crate::workflow::DEFAULT_STATUS;

/// Extension given to the backup of a corrupt document
pub const BACKUP_EXTENSION: &str = "bak";

/// Storage manager for the task document
#[derive(Debug, Clone)]
pub struct Storage {
    /// Path to the task document
    data_path: PathBuf,
    /// Workflow columns used to spread the seed tasks over the board
    columns: Vec<String>,
}

impl Storage {
    /// Create a storage manager for the document at `data_path`
    pub fn new(data_path: impl Into<PathBuf>, columns: Vec<String>) -> Self {
        Self {
            data_path: data_path.into(),
            columns,
        }
    }

    /// Path to the task document
    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// Sibling path that receives a corrupt document
    pub fn backup_path(&self) -> PathBuf {
        self.data_path.with_extension(BACKUP_EXTENSION)
    }

    /// Write the seed collection if no document exists yet.
    pub fn ensure_seeded(&self) -> Result<()> {
        if self.data_path.exists() {
            return Ok(());
        }
        let tasks = seed_tasks(&self.columns, Local::now().date_naive());
        self.save(&tasks)?;
        tracing::info!(
            path = %self.data_path.display(),
            tasks = tasks.len(),
            "seeded task document"
        );
        Ok(())
    }

    /// Load the collection, seeding on first run and recovering from corruption.
    ///
    /// Only I/O failures are returned as errors.
    pub fn load(&self) -> Result<Vec<Task>> {
        self.ensure_seeded()?;
        let bytes = fs::read(&self.data_path)?;
        match serde_json::from_slice::<Vec<Task>>(&bytes) {
            Ok(tasks) => {
                tracing::debug!(
                    path = %self.data_path.display(),
                    tasks = tasks.len(),
                    "loaded task document"
                );
                Ok(tasks)
            }
            Err(err) => self.recover(&err),
        }
    }

    /// Serialize the full collection and replace the document atomically.
    pub fn save(&self, tasks: &[Task]) -> Result<()> {
        self.write_json(&self.data_path, tasks)?;
        tracing::debug!(
            path = %self.data_path.display(),
            tasks = tasks.len(),
            "saved task document"
        );
        Ok(())
    }

    fn recover(&self, cause: &serde_json::Error) -> Result<Vec<Task>> {
        let backup = self.backup_path();
        replace_file(&self.data_path, &backup)?;
        tracing::warn!(
            path = %self.data_path.display(),
            backup = %backup.display(),
            error = %cause,
            "task document is corrupt; moved aside and reseeded"
        );
        let tasks = seed_tasks(&self.columns, Local::now().date_naive());
        self.save(&tasks)?;
        Ok(tasks)
    }

    // =========================================================================
    // File operations
    // =========================================================================

    /// Write JSON data to a file atomically
    pub fn write_json<T: Serialize + ?Sized>(&self, path: &Path, data: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(data)?;
        write_atomic(path, json.as_bytes())
    }
}

/// Write data atomically using temp file + rename
///
/// The temp file lives in the destination directory so the rename never
/// crosses filesystems; the previous document stays intact until it succeeds.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(data)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|err| err.error)?;

    Ok(())
}

/// Rename `from` onto `to`, replacing any existing file at `to`.
fn replace_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::remove_file(to) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }
    fs::rename(from, to)
}

/// Sample collection written on first run and after corruption recovery.
///
/// Sample `i` takes `columns[i]`, clamped to the last column.
pub fn seed_tasks(columns: &[String], today: NaiveDate) -> Vec<Task> {
    let status_at = |index: usize| -> String {
        columns
            .get(index)
            .or_else(|| columns.last())
            .cloned()
            .unwrap_or_else(|| DEFAULT_STATUS.to_string())
    };

    let mut sketch = Task::new(fresh_id(), "Sketch board layout", status_at(0), 15 * 60);
    sketch.description = "Rough out how the kanban and list views should look.".to_string();
    sketch.tags = vec!["design".to_string(), "kanban".to_string()];
    sketch.checklist = vec![
        ChecklistItem::new("List view columns"),
        ChecklistItem::new("Board column titles"),
        ChecklistItem::new("Calendar cells"),
    ];

    let mut timers = Task::new(fresh_id(), "Wire up time tracking", status_at(1), 25 * 60);
    timers.description = "Make sure timers can be started and paused.".to_string();
    timers.tags = vec!["timer".to_string(), "tui".to_string()];
    timers.checklist = vec![
        ChecklistItem::done("Start/pause control"),
        ChecklistItem::new("Countdown per task"),
        ChecklistItem::new("Reset to default duration"),
    ];
    timers.remaining_seconds = 22 * 60;

    let mut demo = Task::new(fresh_id(), "Ship a first demo", status_at(2), 5 * 60);
    demo.description =
        "Create a default config and sample data so new users can explore.".to_string();
    demo.tags = vec!["docs".to_string(), "demo".to_string()];
    demo.checklist = vec![
        ChecklistItem::done("Default config file"),
        ChecklistItem::done("Sample tasks"),
        ChecklistItem::done("Update README"),
    ];
    demo.due = Some(today);
    demo.remaining_seconds = 0;

    vec![sketch, timers, demo]
}

/// Fresh opaque task identifier
pub fn fresh_id() -> String {
    Uuid::new_v4().to_string()
}
