//! Task model for taskdeck.
//!
//! Tasks and their checklist items are plain values. Documents are decoded
//! through [`TaskDocument`], which applies the per-field default policy:
//!
//! | field               | when absent                         |
//! |---------------------|-------------------------------------|
//! | `id`                | required                            |
//! | `title`             | `""`                                |
//! | `status`            | `"backlog"`                         |
//! | `description`       | `""`                                |
//! | `tags`              | `[]` (non-string entries dropped)   |
//! | `due`               | absent (`null` and `""` too)        |
//! | `checklist`         | `[]`                                |
//! | `countdown_seconds` | `1500`                              |
//! | `remaining_seconds` | `countdown_seconds`                 |
//! | `timer_running`     | `false`                             |
//!
//! A `due` string that is not an ISO calendar date fails the decode.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::workflow::DEFAULT_STATUS;

/// Default countdown used when a document carries none
pub const DEFAULT_COUNTDOWN_SECONDS: u64 = 25 * 60;

const DUE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub done: bool,
}

impl ChecklistItem {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            done: false,
        }
    }

    pub fn done(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            done: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TaskDocument")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub status: String,
    pub description: String,
    pub tags: Vec<String>,
    pub due: Option<NaiveDate>,
    pub checklist: Vec<ChecklistItem>,
    pub countdown_seconds: u64,
    pub remaining_seconds: u64,
    pub timer_running: bool,
}

impl Task {
    /// A task with an idle timer of `countdown_seconds` and every other field empty.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        status: impl Into<String>,
        countdown_seconds: u64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            status: status.into(),
            description: String::new(),
            tags: Vec::new(),
            due: None,
            checklist: Vec::new(),
            countdown_seconds,
            remaining_seconds: countdown_seconds,
            timer_running: false,
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|candidate| candidate == tag)
    }

    /// Remaining countdown as `MM:SS` (minutes are not wrapped at 60).
    pub fn timer_display(&self) -> String {
        format!(
            "{:02}:{:02}",
            self.remaining_seconds / 60,
            self.remaining_seconds % 60
        )
    }

    /// `(done, total)` checklist counts
    pub fn checklist_progress(&self) -> (usize, usize) {
        let done = self.checklist.iter().filter(|item| item.done).count();
        (done, self.checklist.len())
    }
}

/// Fields supplied by a presentation layer when creating a task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub due: Option<NaiveDate>,
    pub checklist: Vec<ChecklistItem>,
    /// Countdown length; `None` or `Some(0)` falls back to the configured default.
    pub countdown_minutes: Option<u32>,
}

impl NewTask {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Parse a `YYYY-MM-DD` calendar date.
///
/// Only the zero-padded form is accepted; surrounding whitespace is an error.
pub fn parse_due(raw: &str) -> Option<NaiveDate> {
    let shaped = raw.len() == 10
        && raw.bytes().enumerate().all(|(index, byte)| match index {
            4 | 7 => byte == b'-',
            _ => byte.is_ascii_digit(),
        });
    if !shaped {
        return None;
    }
    NaiveDate::parse_from_str(raw, DUE_FORMAT).ok()
}

/// Wire shape of a task document before defaults are applied.
#[derive(Debug, Deserialize)]
struct TaskDocument {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default = "default_status")]
    status: String,
    #[serde(default)]
    description: String,
    #[serde(default, deserialize_with = "string_entries")]
    tags: Vec<String>,
    #[serde(default, deserialize_with = "optional_due")]
    due: Option<NaiveDate>,
    #[serde(default)]
    checklist: Vec<ChecklistItem>,
    #[serde(default)]
    countdown_seconds: Option<u64>,
    #[serde(default)]
    remaining_seconds: Option<u64>,
    #[serde(default)]
    timer_running: bool,
}

impl From<TaskDocument> for Task {
    fn from(doc: TaskDocument) -> Self {
        let countdown_seconds = doc.countdown_seconds.unwrap_or(DEFAULT_COUNTDOWN_SECONDS);
        Task {
            id: doc.id,
            title: doc.title,
            status: doc.status,
            description: doc.description,
            tags: doc.tags,
            due: doc.due,
            checklist: doc.checklist,
            countdown_seconds,
            remaining_seconds: doc.remaining_seconds.unwrap_or(countdown_seconds),
            timer_running: doc.timer_running,
        }
    }
}

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

fn string_entries<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?;
    Ok(values
        .unwrap_or_default()
        .into_iter()
        .filter_map(|value| match value {
            serde_json::Value::String(tag) => Some(tag),
            _ => None,
        })
        .collect())
}

fn optional_due<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref() {
        None | Some("") => Ok(None),
        Some(value) => parse_due(value).map(Some).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid due date '{value}' (expected YYYY-MM-DD)"))
        }),
    }
}
