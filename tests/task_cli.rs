mod support;

use predicates::str::contains;
use serde_json::{json, Value};

use support::{json_data, task_json, TestHome};

#[test]
fn add_then_list_in_collection_order() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::init()?;
    home.write_tasks(&json!([task_json("seed-1", "Existing", "done")]))?;

    let added = json_data(home.cmd().args([
        "add",
        "Write report",
        "--description",
        "quarterly numbers",
        "--tag",
        "work",
        "--tag",
        "writing",
        "--due",
        "2024-05-20",
        "--minutes",
        "10",
        "--item",
        "outline",
        "--item",
        "draft",
    ]))?;
    assert_eq!(added["title"], "Write report");
    assert_eq!(added["status"], "backlog");
    assert_eq!(added["due"], "2024-05-20");
    assert_eq!(added["countdown_seconds"], 600);
    assert_eq!(added["remaining_seconds"], 600);
    assert_eq!(added["timer_running"], false);
    assert_eq!(added["checklist"][1]["label"], "draft");

    let listed = json_data(home.cmd().arg("list"))?;
    assert_eq!(listed["total"], 2);
    assert_eq!(listed["tasks"][0]["id"], "seed-1");
    assert_eq!(listed["tasks"][1]["id"], added["id"]);

    let tagged = json_data(home.cmd().args(["list", "--tag", "work"]))?;
    assert_eq!(tagged["total"], 1);
    assert_eq!(tagged["tasks"][0]["title"], "Write report");

    let saved = home.read_tasks()?;
    assert_eq!(saved.len(), 2);
    assert_eq!(saved[1]["tags"], json!(["work", "writing"]));
    Ok(())
}

#[test]
fn add_uses_default_timer_minutes() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::init()?;
    home.write_config("[app]\ndefault_timer_minutes = 45\n")?;
    home.write_tasks(&json!([]))?;

    let added = json_data(home.cmd().args(["add", "Plain"]))?;
    assert_eq!(added["countdown_seconds"], 45 * 60);
    Ok(())
}

#[test]
fn add_rejects_blank_title_and_bad_due() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::init()?;
    home.write_tasks(&json!([]))?;

    home.cmd()
        .args(["add", "   "])
        .assert()
        .code(2)
        .stderr(contains("title cannot be empty"));

    home.cmd()
        .args(["add", "Dated", "--due", "31/12/2024"])
        .assert()
        .code(2)
        .stderr(contains("invalid due date"));

    assert!(home.read_tasks()?.is_empty());
    Ok(())
}

#[test]
fn cycle_wraps_and_done_jumps_to_last_column() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::init()?;
    home.write_tasks(&json!([
        task_json("alpha", "Alpha", "backlog"),
        task_json("beta", "Beta", "archived")
    ]))?;

    let moved = json_data(home.cmd().args(["cycle", "alpha"]))?;
    assert_eq!(moved["status"], "in_progress");
    assert_eq!(moved["label"], "In Progress");

    json_data(home.cmd().args(["cycle", "alpha"]))?;
    let wrapped = json_data(home.cmd().args(["cycle", "alpha"]))?;
    assert_eq!(wrapped["status"], "backlog");

    let recovered = json_data(home.cmd().args(["cycle", "beta"]))?;
    assert_eq!(recovered["status"], "backlog");

    let done = json_data(home.cmd().args(["done", "alpha"]))?;
    assert_eq!(done["status"], "done");

    let saved = home.read_tasks()?;
    assert_eq!(saved[0]["status"], "done");
    assert_eq!(saved[1]["status"], "backlog");
    Ok(())
}

#[test]
fn ids_resolve_by_unique_prefix() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::init()?;
    home.write_tasks(&json!([
        task_json("abc-1", "One", "backlog"),
        task_json("abc-2", "Two", "backlog"),
        task_json("xyz-9", "Three", "backlog")
    ]))?;

    let shown = json_data(home.cmd().args(["show", "xy"]))?;
    assert_eq!(shown["id"], "xyz-9");

    home.cmd()
        .args(["show", "abc"])
        .assert()
        .code(2)
        .stderr(contains("ambiguous task id"));

    home.cmd()
        .args(["cycle", "nope"])
        .assert()
        .code(2)
        .stderr(contains("Task not found: nope"));
    Ok(())
}

#[test]
fn errors_use_json_envelope() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::init()?;
    home.write_tasks(&json!([]))?;

    let output = home.cmd().args(["show", "missing", "--json"]).output()?;
    assert_eq!(output.status.code(), Some(2));
    let envelope: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(envelope["status"], "error");
    assert_eq!(envelope["command"], "show");
    assert_eq!(envelope["error"]["kind"], "user_error");
    assert_eq!(envelope["error"]["code"], 2);
    Ok(())
}

#[test]
fn check_marks_items_by_position() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::init()?;
    let mut task = task_json("list", "List", "backlog");
    task["checklist"] = json!([
        {"label": "first", "done": false},
        {"label": "second", "done": false}
    ]);
    home.write_tasks(&json!([task]))?;

    let checked = json_data(home.cmd().args(["check", "list", "2"]))?;
    assert_eq!(checked["item"]["label"], "second");
    assert_eq!(checked["item"]["done"], true);
    assert_eq!(home.read_tasks()?[0]["checklist"][1]["done"], true);

    json_data(home.cmd().args(["check", "list", "2", "--undo"]))?;
    assert_eq!(home.read_tasks()?[0]["checklist"][1]["done"], false);

    home.cmd()
        .args(["check", "list", "3"])
        .assert()
        .code(2)
        .stderr(contains("no checklist item 3"));
    home.cmd().args(["check", "list", "0"]).assert().code(2);
    Ok(())
}

#[test]
fn board_and_calendar_group_tasks() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::init()?;
    let mut early = task_json("early", "Early", "backlog");
    early["due"] = json!("2024-05-02");
    early["tags"] = json!(["home"]);
    let mut late = task_json("late", "Late", "done");
    late["due"] = json!("2024-05-28");
    let mut june = task_json("june", "June", "done");
    june["due"] = json!("2024-06-01");
    home.write_tasks(&json!([early, late, june]))?;

    let board = json_data(home.cmd().arg("board"))?;
    let columns = board["columns"].as_array().ok_or("columns")?;
    assert_eq!(columns.len(), 3);
    assert_eq!(columns[0]["label"], "Backlog");
    assert_eq!(columns[0]["tasks"].as_array().ok_or("tasks")?.len(), 1);
    assert_eq!(columns[2]["tasks"].as_array().ok_or("tasks")?.len(), 2);

    let calendar = json_data(home.cmd().args(["calendar", "--month", "2024-05"]))?;
    assert_eq!(calendar["days"]["2"][0]["id"], "early");
    assert_eq!(calendar["days"]["28"][0]["id"], "late");
    assert!(calendar["days"].get("1").is_none());

    let filtered = json_data(home.cmd().args(["calendar", "--month", "2024-05", "--tag", "home"]))?;
    assert_eq!(filtered["days"].as_object().ok_or("days")?.len(), 1);

    home.cmd()
        .args(["calendar", "--month", "May"])
        .assert()
        .code(2);
    Ok(())
}

#[test]
fn corrupt_document_is_backed_up_on_first_command() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::init()?;
    std::fs::write(home.tasks_path(), "{ definitely not json")?;

    let listed = json_data(home.cmd().arg("list"))?;
    assert_eq!(listed["total"], 3);
    assert_eq!(
        std::fs::read_to_string(home.backup_path())?,
        "{ definitely not json"
    );
    assert_eq!(home.read_tasks()?.len(), 3);
    Ok(())
}
