//! Command-line interface for taskdeck
//!
//! This module defines the CLI structure using clap derive macros.
//! Each command group is implemented in its own submodule; all of them
//! drive the [`TaskStore`] and never touch the task document directly.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::config::{self, Config};
use crate::error::{Error, Result};
use crate::output::OutputOptions;
use crate::store::TaskStore;

mod config_cmd;
mod task;
mod timer;

/// taskdeck - personal task tracker
///
/// Keeps tasks on a board of workflow columns, each with a checklist and a
/// countdown timer.
#[derive(Parser, Debug)]
#[command(name = "taskdeck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// taskdeck home directory (defaults to ~/.taskdeck)
    #[arg(long, global = true, env = "TASKDECK_HOME")]
    pub home: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List tasks in collection order
    List {
        /// Only tasks carrying this tag
        #[arg(short, long)]
        tag: Option<String>,
    },

    /// Show tasks grouped by workflow column
    Board {
        /// Only tasks carrying this tag
        #[arg(short, long)]
        tag: Option<String>,
    },

    /// Show tasks due in a month, by day
    Calendar {
        /// Month as YYYY-MM (defaults to the current month)
        #[arg(short, long)]
        month: Option<String>,

        /// Only tasks carrying this tag
        #[arg(short, long)]
        tag: Option<String>,
    },

    /// Show one task in full
    Show {
        /// Task ID or unique prefix
        id: String,
    },

    /// Add a task to the first workflow column
    Add {
        /// Task title
        title: String,

        /// Longer description
        #[arg(short, long)]
        description: Option<String>,

        /// Tag to attach (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Due date as YYYY-MM-DD
        #[arg(long)]
        due: Option<String>,

        /// Countdown length in minutes (defaults to app.default_timer_minutes)
        #[arg(short, long)]
        minutes: Option<u32>,

        /// Checklist item (repeatable)
        #[arg(long = "item")]
        items: Vec<String>,
    },

    /// Move a task to the next workflow column
    Cycle {
        /// Task ID or unique prefix
        id: String,
    },

    /// Move a task to the last workflow column
    Done {
        /// Task ID or unique prefix
        id: String,
    },

    /// Tick off a checklist item
    Check {
        /// Task ID or unique prefix
        id: String,

        /// 1-based position of the checklist item
        index: usize,

        /// Mark the item as not done instead
        #[arg(long)]
        undo: bool,
    },

    /// Countdown timer commands
    #[command(subcommand)]
    Timer(TimerCommands),

    /// Configuration commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Timer subcommands
#[derive(Subcommand, Debug)]
pub enum TimerCommands {
    /// Start or pause a task's countdown
    Toggle {
        /// Task ID or unique prefix
        id: String,
    },

    /// Pause a countdown and rewind it to its full length
    Reset {
        /// Task ID or unique prefix
        id: String,
    },

    /// Replace a task's countdown length
    Preset {
        /// Task ID or unique prefix
        id: String,

        /// New countdown length in minutes
        #[arg(allow_negative_numbers = true)]
        minutes: i64,
    },

    /// List the configured timer presets
    Presets,

    /// Run running countdowns in the foreground, one tick per second
    Run {
        /// Stop after this many ticks
        #[arg(long)]
        ticks: Option<u64>,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Show where taskdeck keeps its files
    Path,

    /// Write the configuration file
    Init {
        /// Overwrite an existing file with the defaults
        #[arg(long)]
        force: bool,
    },
}

/// Flags shared by every command
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    pub home: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

impl GlobalOptions {
    fn output(&self) -> OutputOptions {
        OutputOptions {
            json: self.json,
            quiet: self.quiet,
        }
    }
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let global = GlobalOptions {
            home: self.home,
            json: self.json,
            quiet: self.quiet,
        };

        match self.command {
            Commands::List { tag } => task::run_list(task::ListOptions { tag, global }),
            Commands::Board { tag } => task::run_board(task::BoardOptions { tag, global }),
            Commands::Calendar { month, tag } => {
                task::run_calendar(task::CalendarOptions { month, tag, global })
            }
            Commands::Show { id } => task::run_show(task::TargetOptions { id, global }),
            Commands::Add { title, description, tags, due, minutes, items } => {
                task::run_add(task::AddOptions {
                    title,
                    description,
                    tags,
                    due,
                    minutes,
                    items,
                    global,
                })
            }
            Commands::Cycle { id } => task::run_cycle(task::TargetOptions { id, global }),
            Commands::Done { id } => task::run_done(task::TargetOptions { id, global }),
            Commands::Check { id, index, undo } => {
                task::run_check(task::CheckOptions { id, index, undo, global })
            }
            Commands::Timer(cmd) => match cmd {
                TimerCommands::Toggle { id } => {
                    timer::run_toggle(task::TargetOptions { id, global })
                }
                TimerCommands::Reset { id } => {
                    timer::run_reset(task::TargetOptions { id, global })
                }
                TimerCommands::Preset { id, minutes } => {
                    timer::run_preset(timer::PresetOptions { id, minutes, global })
                }
                TimerCommands::Presets => timer::run_presets(global),
                TimerCommands::Run { ticks } => {
                    timer::run_ticks(timer::RunOptions { ticks, global })
                }
            },
            Commands::Config(cmd) => match cmd {
                ConfigCommands::Show => config_cmd::run_show(global),
                ConfigCommands::Path => config_cmd::run_path(global),
                ConfigCommands::Init { force } => config_cmd::run_init(global, force),
            },
        }
    }
}

/// Everything a task command needs: resolved home, config and an open store
struct Context {
    home: PathBuf,
    config: Config,
    store: TaskStore,
}

fn load_context(home: Option<&Path>) -> Result<Context> {
    let home = config::home_dir(home)?;
    let config = Config::load_or_init(&home)?;
    let store = TaskStore::from_config(&config, &home)?;
    Ok(Context {
        home,
        config,
        store,
    })
}

/// Resolve a full task id from an exact id or a unique prefix.
fn resolve_task_id(store: &TaskStore, input: &str) -> Result<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidArgument("task id cannot be empty".to_string()));
    }
    if let Some(task) = store.get(trimmed) {
        return Ok(task.id.clone());
    }

    let matches: Vec<&str> = store
        .tasks()
        .iter()
        .map(|task| task.id.as_str())
        .filter(|id| id.starts_with(trimmed))
        .collect();

    match matches.as_slice() {
        [] => Err(Error::TaskNotFound(trimmed.to_string())),
        [only] => Ok((*only).to_string()),
        _ => Err(Error::InvalidArgument(format!(
            "ambiguous task id '{}': {}",
            trimmed,
            matches.join(", ")
        ))),
    }
}

/// Leading characters of an id, enough to address it in most collections
fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;
    use crate::store::StoreSettings;
    use crate::task::Task;

    fn store(ids: &[&str]) -> (tempfile::TempDir, TaskStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings = StoreSettings::default();
        let storage = Storage::new(dir.path().join("tasks.json"), settings.columns.clone());
        let tasks = ids
            .iter()
            .map(|id| Task::new(*id, *id, "backlog", 60))
            .collect();
        (dir, TaskStore::with_tasks(storage, settings, tasks))
    }

    #[test]
    fn resolve_prefers_exact_id() {
        let (_dir, store) = store(&["abc", "abcd"]);
        assert_eq!(resolve_task_id(&store, "abc").unwrap(), "abc");
    }

    #[test]
    fn resolve_accepts_unique_prefix() {
        let (_dir, store) = store(&["abc123", "def456"]);
        assert_eq!(resolve_task_id(&store, " de ").unwrap(), "def456");
    }

    #[test]
    fn resolve_reports_unknown_and_ambiguous() {
        let (_dir, store) = store(&["abc1", "abc2"]);
        assert!(matches!(
            resolve_task_id(&store, "zzz"),
            Err(Error::TaskNotFound(_))
        ));
        assert!(matches!(
            resolve_task_id(&store, "abc"),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            resolve_task_id(&store, "  "),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn short_id_handles_short_and_multibyte_ids() {
        assert_eq!(short_id("a1"), "a1");
        assert_eq!(short_id("ééééééééé"), "éééééééé");
    }

    #[test]
    fn cli_parses_negative_preset_minutes() {
        let cli = Cli::try_parse_from(["taskdeck", "timer", "preset", "abc", "-5"]).unwrap();
        match cli.command {
            Commands::Timer(TimerCommands::Preset { id, minutes }) => {
                assert_eq!(id, "abc");
                assert_eq!(minutes, -5);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
