#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

/// A throwaway taskdeck home directory
pub struct TestHome {
    dir: TempDir,
}

impl TestHome {
    pub fn init() -> std::io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn tasks_path(&self) -> PathBuf {
        self.dir.path().join("tasks.json")
    }

    pub fn backup_path(&self) -> PathBuf {
        self.dir.path().join("tasks.bak")
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("config.toml")
    }

    /// `taskdeck` pointed at this home, with logging off
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("taskdeck").expect("binary");
        cmd.env("TASKDECK_HOME", self.dir.path());
        cmd.env_remove("RUST_LOG");
        cmd
    }

    pub fn write_config(&self, contents: &str) -> std::io::Result<()> {
        fs::write(self.config_path(), contents)
    }

    pub fn write_tasks(&self, tasks: &Value) -> Result<(), Box<dyn std::error::Error>> {
        fs::write(self.tasks_path(), serde_json::to_vec_pretty(tasks)?)?;
        Ok(())
    }

    pub fn read_tasks(&self) -> Result<Vec<Value>, Box<dyn std::error::Error>> {
        let bytes = fs::read(self.tasks_path())?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Run `cmd` with `--json` and return the envelope's `data`
pub fn json_data(cmd: &mut Command) -> Result<Value, Box<dyn std::error::Error>> {
    let output = cmd.arg("--json").output()?;
    if !output.status.success() {
        return Err(format!(
            "command failed: {}",
            String::from_utf8_lossy(&output.stdout)
        )
        .into());
    }
    let envelope: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(envelope["schema_version"], "taskdeck.v1");
    assert_eq!(envelope["status"], "success");
    Ok(envelope["data"].clone())
}

/// A minimal task document record
pub fn task_json(id: &str, title: &str, status: &str) -> Value {
    serde_json::json!({
        "id": id,
        "title": title,
        "status": status,
        "description": "",
        "tags": [],
        "due": null,
        "checklist": [],
        "countdown_seconds": 1500,
        "remaining_seconds": 1500,
        "timer_running": false
    })
}
