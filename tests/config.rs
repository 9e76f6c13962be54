mod support;

use std::fs;

use predicates::str::contains;
use taskdeck::config::{Config, CONFIG_FILE};
use taskdeck::store::TaskStore;
use taskdeck::Error;

use support::{json_data, TestHome};

#[test]
fn config_overrides_drive_the_store() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    fs::write(
        dir.path().join(CONFIG_FILE),
        r#"
[app]
data_path = "data/board.json"
board_columns = ["todo", "doing"]
status_labels = { doing = "Doing now" }
default_timer_minutes = 10
"#,
    )?;

    let config = Config::load_or_init(dir.path())?;
    let data_path = dir.path().join("data").join("board.json");
    assert_eq!(config.app.data_path.as_deref(), Some(data_path.as_path()));

    let mut store = TaskStore::from_config(&config, dir.path())?;
    assert!(data_path.exists());
    let statuses: Vec<&str> = store.tasks().iter().map(|task| task.status.as_str()).collect();
    assert_eq!(statuses, vec!["todo", "doing", "doing"]);
    assert_eq!(store.status_label("doing"), "Doing now");
    assert_eq!(store.status_label("todo"), "Todo");
    assert_eq!(store.status_label("in_progress"), "In Progress");

    let id = store.tasks()[1].id.clone();
    assert!(store.cycle_status(&id)?);
    assert_eq!(store.get(&id).ok_or("missing task")?.status, "todo");
    Ok(())
}

#[test]
fn empty_columns_make_workflow_operations_no_ops() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join(CONFIG_FILE), "[app]\nboard_columns = []\n")?;

    let config = Config::load_or_init(dir.path())?;
    let mut store = TaskStore::from_config(&config, dir.path())?;
    assert!(store.tasks().iter().all(|task| task.status == "backlog"));
    assert!(store.board(None).is_empty());

    let id = store.tasks()[0].id.clone();
    assert!(!store.cycle_status(&id)?);
    assert!(!store.mark_done(&id)?);
    Ok(())
}

#[test]
fn invalid_config_is_a_user_error() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    fs::write(
        dir.path().join(CONFIG_FILE),
        "[app]\nboard_columns = [\"todo\", \" \"]\n",
    )?;
    let err = Config::load_or_init(dir.path()).expect_err("blank column");
    assert!(matches!(err, Error::InvalidConfig(_)));
    assert_eq!(err.exit_code(), 2);

    let home = TestHome::init()?;
    home.write_config("[app]\nboard_columns = [\"a\", \"a\"]\n")?;
    home.cmd()
        .arg("list")
        .assert()
        .code(2)
        .stderr(contains("duplicate entry 'a'"));
    Ok(())
}

#[test]
fn config_path_reports_resolved_locations() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::init()?;
    let paths = json_data(home.cmd().args(["config", "path"]))?;
    assert_eq!(paths["config"], home.config_path().display().to_string());
    assert_eq!(paths["data"], home.tasks_path().display().to_string());
    assert_eq!(paths["backup"], home.backup_path().display().to_string());
    Ok(())
}

#[test]
fn relative_home_is_resolved_against_the_working_directory(
) -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::init()?;
    json_data(
        home.cmd()
            .current_dir(home.path())
            .env("TASKDECK_HOME", "nested")
            .arg("list"),
    )?;
    let paths = json_data(
        home.cmd()
            .current_dir(home.path())
            .env("TASKDECK_HOME", "nested")
            .args(["config", "path"]),
    )?;

    let data = std::path::PathBuf::from(paths["data"].as_str().ok_or("missing data path")?);
    assert!(data.is_absolute());
    assert!(data.ends_with("nested/tasks.json"));
    assert!(home.path().join("nested").join("tasks.json").exists());
    assert!(!home.path().join("nested").join("nested").exists());
    Ok(())
}

#[test]
fn config_init_respects_existing_file_unless_forced() -> Result<(), Box<dyn std::error::Error>> {
    let home = TestHome::init()?;
    let first = json_data(home.cmd().args(["config", "init"]))?;
    assert_eq!(first["written"], true);

    home.write_config("[app]\ndefault_view = \"list\"\n")?;
    let second = json_data(home.cmd().args(["config", "init"]))?;
    assert_eq!(second["written"], false);
    assert!(fs::read_to_string(home.config_path())?.contains("\"list\""));

    let forced = json_data(home.cmd().args(["config", "init", "--force"]))?;
    assert_eq!(forced["written"], true);
    let shown = json_data(home.cmd().args(["config", "show"]))?;
    assert_eq!(shown["app"]["default_view"], "board");
    Ok(())
}
