//! taskdeck timer command implementations.
//!
//! `timer run` is the tick driver: a single-threaded tokio runtime ticks the
//! store once per second until a stop condition is met. Progress made since
//! the last debounced flush is not saved on exit.

use serde::Serialize;
use tokio::time::MissedTickBehavior;

use super::task::{task_line, timer_summary, TargetOptions};
use super::{load_context, resolve_task_id, short_id, GlobalOptions};
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput};
use crate::store::TaskStore;
use crate::task::Task;
use crate::timer::{TickReport, TICK_INTERVAL};

pub struct PresetOptions {
    pub id: String,
    pub minutes: i64,
    pub global: GlobalOptions,
}

pub struct RunOptions {
    pub ticks: Option<u64>,
    pub global: GlobalOptions,
}

#[derive(Serialize)]
struct TimerOutput<'a> {
    id: &'a str,
    remaining_seconds: u64,
    countdown_seconds: u64,
    timer_running: bool,
}

impl<'a> From<&'a Task> for TimerOutput<'a> {
    fn from(task: &'a Task) -> Self {
        Self {
            id: &task.id,
            remaining_seconds: task.remaining_seconds,
            countdown_seconds: task.countdown_seconds,
            timer_running: task.timer_running,
        }
    }
}

#[derive(Serialize)]
struct PresetsOutput<'a> {
    presets: &'a [u32],
    default_minutes: u32,
}

/// Why the tick loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum StopReason {
    TickLimit,
    Idle,
    Interrupted,
}

#[derive(Debug, Default, Serialize)]
struct RunSummary {
    ticks: u64,
    flushes: u64,
    zero_crossings: Vec<String>,
    stopped: Option<StopReason>,
}

impl RunSummary {
    fn record(&mut self, report: &TickReport) {
        self.ticks += 1;
        if report.flushed {
            self.flushes += 1;
        }
        self.zero_crossings
            .extend(report.zero_crossings.iter().cloned());
    }
}

pub fn run_toggle(options: TargetOptions) -> Result<()> {
    let mut ctx = load_context(options.global.home.as_deref())?;
    let resolved = resolve_task_id(&ctx.store, &options.id)?;
    ctx.store.toggle_timer(&resolved)?;
    let task = get(&ctx.store, &resolved)?;

    let mut human = HumanOutput::new(if task.timer_running {
        "Timer started"
    } else {
        "Timer paused"
    });
    human.push_summary("Task", short_id(&task.id));
    human.push_summary("Timer", timer_summary(task));
    if task.timer_running && task.remaining_seconds == 0 {
        human.push_warning("countdown is already at zero; reset it or apply a preset first");
    } else if task.timer_running {
        human.push_detail("taskdeck timer run  # count down in the foreground");
    }

    emit_success(
        options.global.output(),
        "timer toggle",
        &TimerOutput::from(task),
        Some(&human),
    )
}

pub fn run_reset(options: TargetOptions) -> Result<()> {
    let mut ctx = load_context(options.global.home.as_deref())?;
    let resolved = resolve_task_id(&ctx.store, &options.id)?;
    ctx.store.reset_timer(&resolved)?;
    let task = get(&ctx.store, &resolved)?;

    let mut human = HumanOutput::new("Timer reset");
    human.push_summary("Task", short_id(&task.id));
    human.push_summary("Timer", timer_summary(task));

    emit_success(
        options.global.output(),
        "timer reset",
        &TimerOutput::from(task),
        Some(&human),
    )
}

pub fn run_preset(options: PresetOptions) -> Result<()> {
    let mut ctx = load_context(options.global.home.as_deref())?;
    let resolved = resolve_task_id(&ctx.store, &options.id)?;
    if !ctx
        .store
        .apply_timer_preset(&resolved, Some(options.minutes))?
    {
        return Err(Error::InvalidArgument(format!(
            "invalid timer length {} (minutes must be > 0)",
            options.minutes
        )));
    }
    let task = get(&ctx.store, &resolved)?;

    let mut human = HumanOutput::new("Timer preset applied");
    human.push_summary("Task", short_id(&task.id));
    human.push_summary("Timer", timer_summary(task));

    emit_success(
        options.global.output(),
        "timer preset",
        &TimerOutput::from(task),
        Some(&human),
    )
}

pub fn run_presets(global: GlobalOptions) -> Result<()> {
    let ctx = load_context(global.home.as_deref())?;
    let app = &ctx.config.app;

    let mut human = HumanOutput::new("Timer presets");
    human.push_summary("Default", format!("{} min", app.default_timer_minutes));
    for minutes in &app.timer_presets {
        human.push_detail(format!("{minutes} min"));
    }

    let output = PresetsOutput {
        presets: &app.timer_presets,
        default_minutes: app.default_timer_minutes,
    };
    emit_success(global.output(), "timer presets", &output, Some(&human))
}

pub fn run_ticks(options: RunOptions) -> Result<()> {
    let mut ctx = load_context(options.global.home.as_deref())?;
    let verbose = !options.global.json && !options.global.quiet;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let summary = runtime.block_on(drive_ticks(&mut ctx.store, options.ticks, |store, report| {
        if !verbose {
            return;
        }
        for id in &report.changed {
            if let Some(task) = store.get(id) {
                println!("{}", task_line(store, task));
            }
        }
        for id in &report.zero_crossings {
            println!("time is up: {}", short_id(id));
        }
    }))?;

    let mut human = HumanOutput::new("Timers stopped");
    human.push_summary("Ticks", summary.ticks.to_string());
    human.push_summary("Saves", summary.flushes.to_string());
    match summary.stopped {
        Some(StopReason::TickLimit) => human.push_summary("Reason", "tick limit reached"),
        Some(StopReason::Idle) => human.push_summary("Reason", "no timer running"),
        Some(StopReason::Interrupted) => {
            human.push_summary("Reason", "interrupted");
            human.push_warning("progress since the last save was not written");
        }
        None => {}
    }
    for id in &summary.zero_crossings {
        human.push_detail(format!("finished: {}", short_id(id)));
    }

    emit_success(options.global.output(), "timer run", &summary, Some(&human))
}

/// Tick `store` once per [`TICK_INTERVAL`] until `limit` ticks have run, no
/// timer is running, or Ctrl-C arrives.
async fn drive_ticks(
    store: &mut TaskStore,
    limit: Option<u64>,
    mut on_tick: impl FnMut(&TaskStore, &TickReport),
) -> Result<RunSummary> {
    let mut interval = tokio::time::interval(TICK_INTERVAL);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    interval.tick().await;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut summary = RunSummary::default();
    let reason = loop {
        if limit.is_some_and(|limit| summary.ticks >= limit) {
            break StopReason::TickLimit;
        }
        if !store.has_running_timers() {
            break StopReason::Idle;
        }
        tokio::select! {
            _ = interval.tick() => {
                let report = store.tick()?;
                summary.record(&report);
                on_tick(&*store, &report);
            }
            _ = &mut ctrl_c => break StopReason::Interrupted,
        }
    };
    tracing::debug!(ticks = summary.ticks, reason = ?reason, "tick loop stopped");
    summary.stopped = Some(reason);
    Ok(summary)
}

fn get<'a>(store: &'a TaskStore, task_id: &str) -> Result<&'a Task> {
    store
        .get(task_id)
        .ok_or_else(|| Error::TaskNotFound(task_id.to_string()))
}
