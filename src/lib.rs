//! taskdeck - personal task tracker library
//!
//! The engine behind the taskdeck CLI: a task collection persisted as one
//! JSON document, a configurable status workflow, and per-task countdown
//! timers whose ticks are flushed to disk on a debounce.
//!
//! # Core Concepts
//!
//! - **Tasks**: records with a workflow status, tags, an optional due date,
//!   a checklist and a countdown timer
//! - **Workflow**: an ordered list of board columns that statuses cycle through
//! - **Timers**: one-second ticks decrement running countdowns; reaching zero
//!   pauses the timer and forces a save
//! - **Recovery**: a corrupt task document is moved aside and replaced by
//!   sample tasks instead of failing the load
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `config.toml`
//! - `error`: Error types and result aliases
//! - `output`: Human and JSON output for commands
//! - `storage`: Task document persistence and corruption recovery
//! - `store`: The task store that owns the collection and every mutation
//! - `task`: Task records and their on-disk schema
//! - `timer`: Countdown ticks and the flush debounce
//! - `workflow`: Status cycling and labels

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod storage;
pub mod store;
pub mod task;
pub mod timer;
pub mod workflow;

pub use error::{Error, Result};
