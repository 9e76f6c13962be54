//! Task store: the single owner of the in-memory task collection.
//!
//! Every mutating operation applies its change and then saves the whole
//! collection before returning. Operations addressed at an unknown task, an
//! out-of-range checklist index, or a non-positive preset are silent no-ops
//! that return `Ok(false)` and perform no I/O.
//!
//! Timer ticks take the other write path: [`TaskStore::tick_at`] saves only
//! when the [`TimerScheduler`] says so.

use std::collections::{BTreeMap, HashSet};
use std::time::{Duration, Instant};

use chrono::Datelike;
use serde::Serialize;

use crate::config::Config;
use crate::error::Result;
use crate::storage::{fresh_id, Storage};
use crate::task::{NewTask, Task};
use crate::timer::{TickReport, TimerScheduler};
use crate::workflow;

/// Workflow and timer settings the store needs from configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    pub columns: Vec<String>,
    pub status_labels: BTreeMap<String, String>,
    pub default_timer_minutes: u32,
    pub timer_save_interval: Duration,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for StoreSettings {
    fn from(config: &Config) -> Self {
        Self {
            columns: config.app.board_columns.clone(),
            status_labels: config.app.status_labels.clone(),
            default_timer_minutes: config.app.default_timer_minutes,
            timer_save_interval: config.timer_save_interval(),
        }
    }
}

/// One board column with its tasks in collection order
#[derive(Debug, Clone, Serialize)]
pub struct BoardColumn<'a> {
    pub status: String,
    pub label: String,
    pub tasks: Vec<&'a Task>,
}

#[derive(Debug)]
pub struct TaskStore {
    storage: Storage,
    settings: StoreSettings,
    tasks: Vec<Task>,
    scheduler: TimerScheduler,
}

impl TaskStore {
    /// Load the collection from `storage`, seeding or recovering as needed.
    pub fn open(storage: Storage, settings: StoreSettings) -> Result<Self> {
        let tasks = storage.load()?;
        Ok(Self::with_tasks(storage, settings, tasks))
    }

    /// Build a store around an already loaded collection.
    pub fn with_tasks(storage: Storage, settings: StoreSettings, tasks: Vec<Task>) -> Self {
        let scheduler = TimerScheduler::new(settings.timer_save_interval, Instant::now());
        Self {
            storage,
            settings,
            tasks,
            scheduler,
        }
    }

    /// Open the store described by a loaded configuration.
    pub fn from_config(config: &Config, home: &std::path::Path) -> Result<Self> {
        let settings = StoreSettings::from(config);
        let storage = Storage::new(config.data_path(home), settings.columns.clone());
        Self::open(storage, settings)
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    // =========================================================================
    // Read side
    // =========================================================================

    /// The whole collection in canonical order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == task_id)
    }

    /// Tasks in collection order, restricted to those carrying `tag_filter`.
    ///
    /// `None` and an empty tag both mean "no filter".
    pub fn select(&self, tag_filter: Option<&str>) -> Vec<&Task> {
        match tag_filter.filter(|tag| !tag.is_empty()) {
            Some(tag) => self.tasks.iter().filter(|task| task.has_tag(tag)).collect(),
            None => self.tasks.iter().collect(),
        }
    }

    /// Board projection: one column per workflow status.
    ///
    /// Tasks whose status is not a configured column do not appear.
    pub fn board(&self, tag_filter: Option<&str>) -> Vec<BoardColumn<'_>> {
        let selected = self.select(tag_filter);
        self.settings
            .columns
            .iter()
            .map(|status| BoardColumn {
                status: status.clone(),
                label: workflow::status_label(status, &self.settings.status_labels),
                tasks: selected
                    .iter()
                    .copied()
                    .filter(|task| &task.status == status)
                    .collect(),
            })
            .collect()
    }

    /// Tasks due in `year`/`month`, keyed by day of month.
    pub fn calendar(
        &self,
        year: i32,
        month: u32,
        tag_filter: Option<&str>,
    ) -> BTreeMap<u32, Vec<&Task>> {
        let mut by_day: BTreeMap<u32, Vec<&Task>> = BTreeMap::new();
        for task in self.select(tag_filter) {
            let Some(due) = task.due else {
                continue;
            };
            if due.year() == year && due.month() == month {
                by_day.entry(due.day()).or_default().push(task);
            }
        }
        by_day
    }

    /// Display label for a status under the configured labels
    pub fn status_label(&self, status: &str) -> String {
        workflow::status_label(status, &self.settings.status_labels)
    }

    // =========================================================================
    // Mutations (each flushes synchronously)
    // =========================================================================

    /// Append a new task in the first workflow column and return it.
    pub fn add_task(&mut self, fields: NewTask) -> Result<Task> {
        let minutes = fields
            .countdown_minutes
            .filter(|minutes| *minutes > 0)
            .unwrap_or(self.settings.default_timer_minutes);
        let countdown_seconds = u64::from(minutes) * 60;

        let mut task = Task::new(
            self.unused_id(),
            fields.title,
            workflow::first_status(&self.settings.columns),
            countdown_seconds,
        );
        task.description = fields.description;
        task.tags = fields.tags;
        task.due = fields.due;
        task.checklist = fields.checklist;

        self.tasks.push(task.clone());
        self.flush()?;
        tracing::debug!(task = %task.id, "added task");
        Ok(task)
    }

    /// Move a task to the next workflow column.
    pub fn cycle_status(&mut self, task_id: &str) -> Result<bool> {
        if self.settings.columns.is_empty() {
            return Ok(false);
        }
        let columns = &self.settings.columns;
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == task_id) else {
            return Ok(false);
        };
        task.status = workflow::next_status(&task.status, columns);
        self.flush()?;
        Ok(true)
    }

    /// Jump a task straight to the last workflow column.
    pub fn mark_done(&mut self, task_id: &str) -> Result<bool> {
        let Some(last) = workflow::last_status(&self.settings.columns) else {
            return Ok(false);
        };
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == task_id) else {
            return Ok(false);
        };
        task.status = last.to_string();
        self.flush()?;
        Ok(true)
    }

    /// Start or pause a task's countdown.
    ///
    /// Starting a countdown that is already at zero is allowed; the next tick
    /// pauses it again.
    pub fn toggle_timer(&mut self, task_id: &str) -> Result<bool> {
        self.update(task_id, |task| task.timer_running = !task.timer_running)
    }

    /// Pause a task's countdown and rewind it to the full duration.
    pub fn reset_timer(&mut self, task_id: &str) -> Result<bool> {
        self.update(task_id, |task| {
            task.timer_running = false;
            task.remaining_seconds = task.countdown_seconds;
        })
    }

    /// Replace a task's countdown with `minutes` and pause it.
    ///
    /// Absent or non-positive minutes are ignored.
    pub fn apply_timer_preset(&mut self, task_id: &str, minutes: Option<i64>) -> Result<bool> {
        let Some(seconds) = minutes
            .filter(|minutes| *minutes > 0)
            .and_then(|minutes| u64::try_from(minutes).ok())
            .and_then(|minutes| minutes.checked_mul(60))
        else {
            return Ok(false);
        };
        self.update(task_id, |task| {
            task.countdown_seconds = seconds;
            task.remaining_seconds = seconds;
            task.timer_running = false;
        })
    }

    /// Set the `done` flag of the checklist item at `index`.
    pub fn toggle_checklist_item(
        &mut self,
        task_id: &str,
        index: usize,
        done: bool,
    ) -> Result<bool> {
        let Some(item) = self
            .tasks
            .iter_mut()
            .find(|task| task.id == task_id)
            .and_then(|task| task.checklist.get_mut(index))
        else {
            return Ok(false);
        };
        item.done = done;
        self.flush()?;
        Ok(true)
    }

    // =========================================================================
    // Timer ticks (debounced flush)
    // =========================================================================

    /// Advance running countdowns by one second.
    pub fn tick(&mut self) -> Result<TickReport> {
        self.tick_at(Instant::now())
    }

    /// Advance running countdowns as of `now`, flushing when the scheduler asks.
    pub fn tick_at(&mut self, now: Instant) -> Result<TickReport> {
        let mut report = TimerScheduler::advance(&mut self.tasks);
        if self.scheduler.should_flush(&report, now) {
            self.flush()?;
            report.flushed = true;
        }
        Ok(report)
    }

    /// Whether any countdown is currently running
    pub fn has_running_timers(&self) -> bool {
        self.tasks.iter().any(|task| task.timer_running)
    }

    fn update(&mut self, task_id: &str, apply: impl FnOnce(&mut Task)) -> Result<bool> {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == task_id) else {
            return Ok(false);
        };
        apply(task);
        self.flush()?;
        Ok(true)
    }

    fn flush(&self) -> Result<()> {
        self.storage.save(&self.tasks)
    }

    fn unused_id(&self) -> String {
        let taken: HashSet<&str> = self.tasks.iter().map(|task| task.id.as_str()).collect();
        loop {
            let id = fresh_id();
            if !taken.contains(id.as_str()) {
                return id;
            }
        }
    }
}
