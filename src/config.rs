//! Configuration loading and management
//!
//! Handles `config.toml` inside the taskdeck home directory. The home is
//! `$TASKDECK_HOME` when set, otherwise `~/.taskdeck`.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::workflow;

/// Environment variable overriding the home directory
pub const HOME_ENV: &str = "TASKDECK_HOME";

/// Directory name under the user's home when no override is set
pub const HOME_DIR_NAME: &str = ".taskdeck";

pub const CONFIG_FILE: &str = "config.toml";
pub const TASKS_FILE: &str = "tasks.json";

const VIEWS: [&str; 4] = ["board", "list", "calendar", "details"];

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub app: AppConfig,
}

/// `[app]` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Location of the task document; relative paths resolve against the home
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_path: Option<PathBuf>,

    /// View a presentation layer opens first
    #[serde(default = "default_view")]
    pub default_view: String,

    /// Ordered workflow columns
    #[serde(default = "workflow::default_columns")]
    pub board_columns: Vec<String>,

    /// Display labels, merged over the built-in ones
    #[serde(default = "workflow::default_status_labels")]
    pub status_labels: BTreeMap<String, String>,

    /// Timer presets in minutes
    #[serde(default = "default_timer_presets")]
    pub timer_presets: Vec<u32>,

    /// Countdown for new tasks, in minutes
    #[serde(default = "default_timer_minutes")]
    pub default_timer_minutes: u32,

    /// Minimum spacing between flushes caused by timer ticks
    #[serde(default = "default_timer_save_interval_secs")]
    pub timer_save_interval_secs: u64,
}

fn default_view() -> String {
    "board".to_string()
}

fn default_timer_presets() -> Vec<u32> {
    vec![5, 15, 25, 50]
}

fn default_timer_minutes() -> u32 {
    25
}

fn default_timer_save_interval_secs() -> u64 {
    5
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            default_view: default_view(),
            board_columns: workflow::default_columns(),
            status_labels: workflow::default_status_labels(),
            timer_presets: default_timer_presets(),
            default_timer_minutes: default_timer_minutes(),
            timer_save_interval_secs: default_timer_save_interval_secs(),
        }
    }
}

impl AppConfig {
    fn validate(&self) -> Result<()> {
        if !VIEWS.contains(&self.default_view.as_str()) {
            return Err(Error::InvalidConfig(format!(
                "app.default_view: invalid view '{}' (expected board|list|calendar|details)",
                self.default_view
            )));
        }

        let mut seen = HashSet::new();
        for column in &self.board_columns {
            let trimmed = column.trim();
            if trimmed.is_empty() {
                return Err(Error::InvalidConfig(
                    "app.board_columns cannot include empty entries".to_string(),
                ));
            }
            if !seen.insert(trimmed) {
                return Err(Error::InvalidConfig(format!(
                    "app.board_columns has duplicate entry '{trimmed}'"
                )));
            }
        }

        if self.timer_presets.iter().any(|minutes| *minutes == 0) {
            return Err(Error::InvalidConfig(
                "app.timer_presets entries must be > 0".to_string(),
            ));
        }

        if self.default_timer_minutes == 0 {
            return Err(Error::InvalidConfig(
                "app.default_timer_minutes must be > 0".to_string(),
            ));
        }

        if self.timer_save_interval_secs == 0 {
            return Err(Error::InvalidConfig(
                "app.timer_save_interval_secs must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Config {
    /// Load configuration from a `config.toml` file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.app.validate()?;

        let mut labels = workflow::default_status_labels();
        labels.append(&mut config.app.status_labels);
        config.app.status_labels = labels;

        Ok(config)
    }

    /// Create the starter config if needed, load it, and resolve the data path.
    ///
    /// The stored `app.data_path` is absolute, so resolving it again against
    /// the same home is a no-op.
    pub fn load_or_init(home: &Path) -> Result<Self> {
        let home = std::path::absolute(home)?;
        let path = home.join(CONFIG_FILE);
        Self::ensure_file(&path)?;
        let mut config = Self::load(&path)?;
        config.app.data_path = Some(config.data_path(&home));
        Ok(config)
    }

    /// Write a commented starter config if no file exists yet
    pub fn ensure_file(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        if path.exists() {
            return Ok(());
        }
        fs::write(path, starter_config())?;
        tracing::info!(path = %path.display(), "created starter config");
        Ok(())
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    /// Task document location: `app.data_path` resolved against `home`,
    /// defaulting to `<home>/tasks.json`
    pub fn data_path(&self, home: &Path) -> PathBuf {
        match self.app.data_path.as_deref() {
            Some(path) => {
                let expanded = expand_tilde(path);
                if expanded.is_absolute() {
                    expanded
                } else {
                    home.join(expanded)
                }
            }
            None => home.join(TASKS_FILE),
        }
    }

    /// Debounce interval for timer-tick flushes
    pub fn timer_save_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.app.timer_save_interval_secs)
    }
}

/// Resolve the taskdeck home directory.
///
/// Precedence: explicit override, `$TASKDECK_HOME`, then `~/.taskdeck`.
pub fn home_dir(override_dir: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = override_dir {
        return Ok(std::path::absolute(expand_tilde(dir))?);
    }
    if let Some(dir) = std::env::var_os(HOME_ENV).filter(|value| !value.is_empty()) {
        return Ok(std::path::absolute(expand_tilde(Path::new(&dir)))?);
    }
    let base = directories::BaseDirs::new().ok_or_else(|| {
        Error::InvalidConfig(format!(
            "cannot determine home directory; set {HOME_ENV}"
        ))
    })?;
    Ok(base.home_dir().join(HOME_DIR_NAME))
}

fn expand_tilde(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match directories::BaseDirs::new() {
        Some(base) => base.home_dir().join(rest),
        None => path.to_path_buf(),
    }
}

fn starter_config() -> String {
    r#"# taskdeck configuration
[app]
# data_path = "~/.taskdeck/tasks.json"  # defaults to tasks.json next to this file
default_view = "board"  # options: board, list, calendar, details
board_columns = ["backlog", "in_progress", "done"]
status_labels = { backlog = "Backlog", in_progress = "In Progress", done = "Done" }
timer_presets = [5, 15, 25, 50]  # minutes
default_timer_minutes = 25
timer_save_interval_secs = 5
"#
    .to_string()
}
