//! taskdeck config command implementations.

use std::path::PathBuf;

use serde::Serialize;

use super::{load_context, GlobalOptions};
use crate::config::{self, Config, CONFIG_FILE};
use crate::error::Result;
use crate::output::{emit_success, HumanOutput};

#[derive(Serialize)]
struct PathsOutput {
    home: PathBuf,
    config: PathBuf,
    data: PathBuf,
    backup: PathBuf,
}

#[derive(Serialize)]
struct InitOutput {
    path: PathBuf,
    written: bool,
}

pub fn run_show(global: GlobalOptions) -> Result<()> {
    let ctx = load_context(global.home.as_deref())?;
    let app = &ctx.config.app;

    let mut human = HumanOutput::new("Configuration");
    human.push_summary("Default view", app.default_view.clone());
    human.push_summary("Columns", app.board_columns.join(" -> "));
    human.push_summary(
        "Presets",
        app.timer_presets
            .iter()
            .map(|minutes| format!("{minutes}m"))
            .collect::<Vec<_>>()
            .join(", "),
    );
    human.push_summary("Default timer", format!("{} min", app.default_timer_minutes));
    human.push_summary("Save interval", format!("{} s", app.timer_save_interval_secs));
    for status in &app.board_columns {
        human.push_detail(format!("{status}: {}", ctx.store.status_label(status)));
    }

    emit_success(global.output(), "config show", &ctx.config, Some(&human))
}

pub fn run_path(global: GlobalOptions) -> Result<()> {
    let ctx = load_context(global.home.as_deref())?;
    let output = PathsOutput {
        config: ctx.home.join(CONFIG_FILE),
        data: ctx.store.storage().data_path().to_path_buf(),
        backup: ctx.store.storage().backup_path(),
        home: ctx.home,
    };

    let mut human = HumanOutput::new("taskdeck paths");
    human.push_summary("Home", output.home.display().to_string());
    human.push_summary("Config", output.config.display().to_string());
    human.push_summary("Tasks", output.data.display().to_string());
    human.push_summary("Backup", output.backup.display().to_string());

    emit_success(global.output(), "config path", &output, Some(&human))
}

/// Write the starter config, or the defaults over an existing file with `force`.
pub fn run_init(global: GlobalOptions, force: bool) -> Result<()> {
    let home = config::home_dir(global.home.as_deref())?;
    let path = home.join(CONFIG_FILE);
    let existed = path.exists();

    if force {
        Config::default().save(&path)?;
    } else {
        Config::ensure_file(&path)?;
    }
    let written = force || !existed;

    let mut human = HumanOutput::new(if written {
        "Config written"
    } else {
        "Config already exists"
    });
    human.push_summary("Path", path.display().to_string());
    if !written {
        human.push_detail("taskdeck config init --force  # overwrite with defaults");
    }

    let output = InitOutput { path, written };
    emit_success(global.output(), "config init", &output, Some(&human))
}
