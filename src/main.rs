//! # daytask
//!
//! A terminal daily task tracker with a scriptable CLI and an interactive TUI.
//!
//! ## Features
//!
//! *   **Priorities and time slots**: tasks are tagged urgent, important, normal
//!     or routine, and with a coarse part of the day (morning, noon, evening,
//!     bedtime). Listings always put urgent work first.
//! *   **Statistics**: today, last-7-days and all-time completion rates, a
//!     per-category breakdown and a daily series for the past week.
//! *   **Pomodoro timer**: 25 minute focus sessions and 5 minute breaks, with
//!     the number of finished sessions kept across runs.
//! *   **Backup**: export the whole state to a JSON file and import it back.
//!
//! ## Usage
//!
//! ```bash
//! # Interactive mode
//! daytask
//!
//! # Add a task
//! daytask add "Write report" --priority urgent --slot morning --category work
//!
//! # List open tasks
//! daytask list --filter incomplete
//!
//! # Toggle completion (any unique id prefix works)
//! daytask toggle 0192f3a1
//!
//! # Statistics
//! daytask stats
//! ```
//!
//! #### TUI Key Bindings
//!
//! *   `Tab`: next view (Tasks, Stats, Pomodoro, Settings)
//! *   `q`: Quit
//! *   Tasks: `a` add, `Space` toggle done, `e` edit title, `D` edit
//!     description, `p`/`s`/`g` cycle priority/slot/category, `f` cycle
//!     filter, `T` finish all of today, `C` clear completed, `d` delete
//! *   Pomodoro: `Space` start/pause, `r` reset, `n` skip phase
//! *   Settings: `j`/`k` move, `Space` toggle
//!
//! ## Data Storage
//!
//! State is saved in your local data directory:
//! *   Linux: `~/.local/share/daytask/data.json`
//! *   macOS: `~/Library/Application Support/daytask/data.json`
//! *   Windows: `%LOCALAPPDATA%\daytask\data.json`
//!
//! Override it with `--db <file>` or the `DAYTASK_DB` environment variable.
//! Logs go to `daytask.log` next to the data file; `RUST_LOG` overrides
//! `--log-level`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_appender::non_blocking::WorkerGuard;

use daytask::commands::*;
use daytask::config::{AppConfig, DB_ENV};
use daytask::models::{Category, NewTask, Priority, RecurringType, TaskFilter, TaskUpdate, TimeSlot};
use daytask::storage::JsonFileStore;
use daytask::tui::run_tui;
use daytask::{Result, TaskRepository};

#[derive(Parser)]
#[command(name = "daytask")]
#[command(about = "Daily task tracker with statistics and a pomodoro timer", long_about = None)]
struct Cli {
    /// Data file (defaults to the platform data directory)
    #[arg(long, global = true, env = DB_ENV)]
    db: Option<PathBuf>,
    /// Log file (defaults to daytask.log next to the data file)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
    /// Log level filter, e.g. info or daytask=debug
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        /// Task title (quoted if it has spaces)
        title: String,
        /// Longer description
        #[arg(short, long, default_value = "")]
        description: String,
        /// urgent, important, normal or routine
        #[arg(short, long, default_value_t = Priority::Normal)]
        priority: Priority,
        /// morning, noon, evening or bedtime
        #[arg(short, long, default_value_t = TimeSlot::Morning)]
        slot: TimeSlot,
        /// work, study, life or fitness
        #[arg(short, long, default_value_t = Category::Work)]
        category: Category,
        /// Recurrence (daily, weekly)
        #[arg(short, long)]
        recur: Option<RecurringType>,
    },
    /// List tasks, most urgent first
    List {
        /// all, incomplete or completed
        #[arg(short, long, default_value_t = TaskFilter::All)]
        filter: TaskFilter,
    },
    /// Show today's open tasks
    Today,
    /// Mark a task complete, or reopen it
    Toggle {
        id: String,
    },
    /// Edit a task
    Edit {
        id: String,
        /// New title
        #[arg(short, long)]
        title: Option<String>,
        /// New description
        #[arg(short, long)]
        description: Option<String>,
        /// New priority
        #[arg(short, long)]
        priority: Option<Priority>,
        /// New time slot
        #[arg(short, long)]
        slot: Option<TimeSlot>,
        /// New category
        #[arg(short, long)]
        category: Option<Category>,
        /// New recurrence (daily, weekly, none)
        #[arg(short, long)]
        recur: Option<RecurringType>,
    },
    /// Remove a task
    Remove {
        id: String,
    },
    /// Complete every open task created today
    CompleteToday,
    /// Remove all completed tasks
    ClearCompleted {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Show completion statistics
    Stats {
        /// Number of days in the daily series (1-366)
        #[arg(long, default_value_t = 7, value_parser = clap::value_parser!(u16).range(1..=366))]
        days: u16,
    },
    /// Show or change settings
    Settings {
        #[arg(long, value_parser = parse_switch)]
        notifications: Option<bool>,
        #[arg(long, value_parser = parse_switch)]
        dark_mode: Option<bool>,
        #[arg(long, value_parser = parse_switch)]
        morning_reminder: Option<bool>,
    },
    /// Write all data to a JSON file
    Export {
        file: PathBuf,
    },
    /// Replace all data with the contents of a JSON export
    Import {
        file: PathBuf,
    },
    /// Delete all tasks and settings
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
    /// Open interactive TUI
    Ui,
}

fn parse_switch(s: &str) -> std::result::Result<bool, String> {
    match s.to_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        _ => Err(format!("expected on or off, got '{}'", s)),
    }
}

/// Initialize file-based logging; the TUI owns stdout.
fn init_logging(level: &str, log_path: &Path) -> Option<WorkerGuard> {
    let log_dir = log_path.parent().filter(|d| !d.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let file_name = log_path.file_name()?.to_str()?;
    fs::create_dir_all(log_dir).ok()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

fn run(command: Option<Commands>, repo: &mut TaskRepository) -> Result<()> {
    match command {
        Some(Commands::Add { title, description, priority, slot, category, recur }) => {
            let recurring_type = recur.unwrap_or(RecurringType::None);
            cmd_add(repo, NewTask {
                title,
                description,
                priority,
                time_slot: slot,
                category,
                is_recurring: recurring_type != RecurringType::None,
                recurring_type,
            })?;
        }
        Some(Commands::List { filter }) => cmd_list(repo, filter),
        Some(Commands::Today) => cmd_today(repo),
        Some(Commands::Toggle { id }) => {
            cmd_toggle(repo, &id)?;
        }
        Some(Commands::Edit { id, title, description, priority, slot, category, recur }) => {
            let update = TaskUpdate {
                title,
                description,
                priority,
                time_slot: slot,
                category,
                is_recurring: recur.map(|r| r != RecurringType::None),
                recurring_type: recur,
            };
            cmd_edit(repo, &id, update)?;
        }
        Some(Commands::Remove { id }) => {
            cmd_remove(repo, &id)?;
        }
        Some(Commands::CompleteToday) => {
            cmd_complete_today(repo)?;
        }
        Some(Commands::ClearCompleted { force }) => {
            cmd_clear_completed(repo, force)?;
        }
        Some(Commands::Stats { days }) => cmd_stats(repo, usize::from(days)),
        Some(Commands::Settings { notifications, dark_mode, morning_reminder }) => {
            cmd_settings(repo, notifications, dark_mode, morning_reminder)?;
        }
        Some(Commands::Export { file }) => cmd_export(repo, &file)?,
        Some(Commands::Import { file }) => cmd_import(repo, &file)?,
        Some(Commands::Reset { force }) => cmd_reset(repo, force)?,
        Some(Commands::Completions { .. }) | Some(Commands::Ui) | None => {}
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "daytask", &mut io::stdout());
        return ExitCode::SUCCESS;
    }

    let config = AppConfig::resolve(cli.db, cli.log_file, &cli.log_level);
    let _log_guard = init_logging(&config.log_level, &config.log_file);
    tracing::debug!(data_file = %config.data_file.display(), "starting");

    let mut repo = TaskRepository::open(JsonFileStore::new(&config.data_file));

    if matches!(cli.command, Some(Commands::Ui) | None) {
        return match run_tui(repo) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error running TUI: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    match run(cli.command, &mut repo) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
