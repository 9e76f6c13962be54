//! taskdeck task command implementations.

use std::collections::BTreeMap;

use chrono::{Datelike, Local, NaiveDate};
use serde::Serialize;

use super::{load_context, resolve_task_id, short_id, GlobalOptions};
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput};
use crate::store::{BoardColumn, TaskStore};
use crate::task::{parse_due, ChecklistItem, NewTask, Task};

pub struct ListOptions {
    pub tag: Option<String>,
    pub global: GlobalOptions,
}

pub struct BoardOptions {
    pub tag: Option<String>,
    pub global: GlobalOptions,
}

pub struct CalendarOptions {
    pub month: Option<String>,
    pub tag: Option<String>,
    pub global: GlobalOptions,
}

/// Options for commands addressed at a single task
pub struct TargetOptions {
    pub id: String,
    pub global: GlobalOptions,
}

pub struct AddOptions {
    pub title: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub due: Option<String>,
    pub minutes: Option<u32>,
    pub items: Vec<String>,
    pub global: GlobalOptions,
}

pub struct CheckOptions {
    pub id: String,
    pub index: usize,
    pub undo: bool,
    pub global: GlobalOptions,
}

#[derive(Serialize)]
struct TaskListOutput<'a> {
    total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    tag: Option<&'a str>,
    tasks: Vec<&'a Task>,
}

#[derive(Serialize)]
struct BoardOutput<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    tag: Option<&'a str>,
    columns: Vec<BoardColumn<'a>>,
}

#[derive(Serialize)]
struct CalendarOutput<'a> {
    year: i32,
    month: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    tag: Option<&'a str>,
    days: BTreeMap<u32, Vec<&'a Task>>,
}

#[derive(Serialize)]
struct TaskStatusOutput<'a> {
    id: &'a str,
    status: &'a str,
    label: String,
}

#[derive(Serialize)]
struct ChecklistOutput<'a> {
    id: &'a str,
    index: usize,
    item: &'a ChecklistItem,
}

pub fn run_list(options: ListOptions) -> Result<()> {
    let ctx = load_context(options.global.home.as_deref())?;
    let tag = options.tag.as_deref();
    let tasks = ctx.store.select(tag);

    let mut human = HumanOutput::new("Tasks");
    human.push_summary("Total", tasks.len().to_string());
    if let Some(tag) = tag {
        human.push_summary("Tag", tag);
    }
    for task in &tasks {
        human.push_detail(task_line(&ctx.store, task));
    }

    let output = TaskListOutput {
        total: tasks.len(),
        tag,
        tasks,
    };

    emit_success(options.global.output(), "list", &output, Some(&human))
}

pub fn run_board(options: BoardOptions) -> Result<()> {
    let ctx = load_context(options.global.home.as_deref())?;
    let tag = options.tag.as_deref();
    let columns = ctx.store.board(tag);

    let mut human = HumanOutput::new("Board");
    if columns.is_empty() {
        human.push_warning("no board columns configured (app.board_columns)");
    }
    for column in &columns {
        human.push_summary(column.label.clone(), column.tasks.len().to_string());
    }
    for column in &columns {
        for task in &column.tasks {
            human.push_detail(format!(
                "{}: {} {} ({})",
                column.label,
                short_id(&task.id),
                task.title,
                task.timer_display()
            ));
        }
    }

    let output = BoardOutput { tag, columns };
    emit_success(options.global.output(), "board", &output, Some(&human))
}

pub fn run_calendar(options: CalendarOptions) -> Result<()> {
    let ctx = load_context(options.global.home.as_deref())?;
    let (year, month) = match options.month.as_deref() {
        Some(raw) => parse_month(raw)?,
        None => {
            let today = Local::now().date_naive();
            (today.year(), today.month())
        }
    };
    let tag = options.tag.as_deref();
    let days = ctx.store.calendar(year, month, tag);

    let mut human = HumanOutput::new(format!("Calendar {year:04}-{month:02}"));
    human.push_summary("Due", days.values().map(Vec::len).sum::<usize>().to_string());
    if let Some(tag) = tag {
        human.push_summary("Tag", tag);
    }
    for (day, tasks) in &days {
        for task in tasks {
            human.push_detail(format!(
                "{year:04}-{month:02}-{day:02} {} {} [{}]",
                short_id(&task.id),
                task.title,
                ctx.store.status_label(&task.status)
            ));
        }
    }

    let output = CalendarOutput {
        year,
        month,
        tag,
        days,
    };
    emit_success(options.global.output(), "calendar", &output, Some(&human))
}

pub fn run_show(options: TargetOptions) -> Result<()> {
    let ctx = load_context(options.global.home.as_deref())?;
    let resolved = resolve_task_id(&ctx.store, &options.id)?;
    let task = ctx
        .store
        .get(&resolved)
        .ok_or_else(|| Error::TaskNotFound(resolved.clone()))?;

    let mut human = HumanOutput::new(format!("Task {}", task.id));
    human.push_summary("Title", task.title.clone());
    human.push_summary("Status", ctx.store.status_label(&task.status));
    if !task.description.is_empty() {
        human.push_summary("Description", task.description.clone());
    }
    if !task.tags.is_empty() {
        human.push_summary("Tags", task.tags.join(", "));
    }
    if let Some(due) = task.due {
        human.push_summary("Due", due.to_string());
    }
    human.push_summary("Timer", timer_summary(task));
    if !task.checklist.is_empty() {
        let (done, total) = task.checklist_progress();
        human.push_summary("Checklist", format!("{done}/{total}"));
    }
    for (position, item) in task.checklist.iter().enumerate() {
        let mark = if item.done { "x" } else { " " };
        human.push_detail(format!("[{mark}] {}. {}", position + 1, item.label));
    }

    emit_success(options.global.output(), "show", task, Some(&human))
}

pub fn run_add(options: AddOptions) -> Result<()> {
    let title = options.title.trim();
    if title.is_empty() {
        return Err(Error::InvalidArgument("title cannot be empty".to_string()));
    }
    let due = match options.due.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => Some(parse_due(raw).ok_or_else(|| {
            Error::InvalidArgument(format!("invalid due date '{raw}' (expected YYYY-MM-DD)"))
        })?),
        _ => None,
    };
    let tags = options
        .tags
        .iter()
        .map(|tag| tag.trim())
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect();
    let checklist = options
        .items
        .iter()
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(ChecklistItem::new)
        .collect();

    let mut ctx = load_context(options.global.home.as_deref())?;
    let task = ctx.store.add_task(NewTask {
        title: title.to_string(),
        description: options.description.unwrap_or_default(),
        tags,
        due,
        checklist,
        countdown_minutes: options.minutes,
    })?;

    let mut human = HumanOutput::new("Task added");
    human.push_summary("ID", task.id.clone());
    human.push_summary("Status", ctx.store.status_label(&task.status));
    human.push_summary("Timer", timer_summary(&task));

    emit_success(options.global.output(), "add", &task, Some(&human))
}

pub fn run_cycle(options: TargetOptions) -> Result<()> {
    let mut ctx = load_context(options.global.home.as_deref())?;
    let resolved = resolve_task_id(&ctx.store, &options.id)?;
    let moved = ctx.store.cycle_status(&resolved)?;
    emit_status_change(&ctx.store, &resolved, moved, "cycle", "Task moved", options.global)
}

pub fn run_done(options: TargetOptions) -> Result<()> {
    let mut ctx = load_context(options.global.home.as_deref())?;
    let resolved = resolve_task_id(&ctx.store, &options.id)?;
    let moved = ctx.store.mark_done(&resolved)?;
    emit_status_change(&ctx.store, &resolved, moved, "done", "Task done", options.global)
}

pub fn run_check(options: CheckOptions) -> Result<()> {
    let mut ctx = load_context(options.global.home.as_deref())?;
    let resolved = resolve_task_id(&ctx.store, &options.id)?;
    let position = options.index.checked_sub(1).ok_or_else(|| {
        Error::InvalidArgument("checklist positions start at 1".to_string())
    })?;

    if !ctx
        .store
        .toggle_checklist_item(&resolved, position, !options.undo)?
    {
        return Err(Error::InvalidArgument(format!(
            "task {} has no checklist item {}",
            short_id(&resolved),
            options.index
        )));
    }

    let task = ctx
        .store
        .get(&resolved)
        .ok_or_else(|| Error::TaskNotFound(resolved.clone()))?;
    let item = &task.checklist[position];
    let (done, total) = task.checklist_progress();

    let mut human = HumanOutput::new(if item.done {
        "Checklist item done"
    } else {
        "Checklist item reopened"
    });
    human.push_summary("Task", short_id(&task.id));
    human.push_summary("Item", item.label.clone());
    human.push_summary("Progress", format!("{done}/{total}"));

    let output = ChecklistOutput {
        id: &task.id,
        index: options.index,
        item,
    };
    emit_success(options.global.output(), "check", &output, Some(&human))
}

fn emit_status_change(
    store: &TaskStore,
    task_id: &str,
    moved: bool,
    command: &str,
    header: &str,
    global: GlobalOptions,
) -> Result<()> {
    let task = store
        .get(task_id)
        .ok_or_else(|| Error::TaskNotFound(task_id.to_string()))?;

    let mut human = HumanOutput::new(header);
    human.push_summary("ID", short_id(&task.id));
    human.push_summary("Status", store.status_label(&task.status));
    if !moved {
        human.push_warning("no board columns configured (app.board_columns); status unchanged");
    }

    let output = TaskStatusOutput {
        id: &task.id,
        status: &task.status,
        label: store.status_label(&task.status),
    };
    emit_success(global.output(), command, &output, Some(&human))
}

pub(super) fn task_line(store: &TaskStore, task: &Task) -> String {
    let mut line = format!(
        "[{}] {} {} ({})",
        store.status_label(&task.status),
        short_id(&task.id),
        task.title,
        task.timer_display()
    );
    if task.timer_running {
        line.push_str(" running");
    }
    if let Some(due) = task.due {
        line.push_str(&format!(" due {due}"));
    }
    if !task.tags.is_empty() {
        line.push_str(&format!(" #{}", task.tags.join(" #")));
    }
    line
}

pub(super) fn timer_summary(task: &Task) -> String {
    let state = if task.timer_running {
        "running"
    } else {
        "paused"
    };
    format!(
        "{} of {:02}:{:02} ({state})",
        task.timer_display(),
        task.countdown_seconds / 60,
        task.countdown_seconds % 60
    )
}

/// Parse a `YYYY-MM` month argument.
fn parse_month(raw: &str) -> Result<(i32, u32)> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(&format!("{trimmed}-01"), "%Y-%m-%d")
        .map(|date| (date.year(), date.month()))
        .map_err(|_| {
            Error::InvalidArgument(format!("invalid month '{trimmed}' (expected YYYY-MM)"))
        })
}
