//! # daytask
//!
//! A terminal daily task tracker: tasks with priorities, time slots and
//! categories, completion statistics and a pomodoro focus timer. State lives
//! in a single JSON file in the user's data directory.

pub mod clock;
pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod pomodoro;
pub mod repository;
pub mod stats;
pub mod storage;
pub mod tui;

pub use error::{AppError, Result};
pub use repository::TaskRepository;
