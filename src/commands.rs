use std::fs;
use std::io::{self, Write};
use std::path::Path;

use chrono::Local;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::error::{AppError, Result};
use crate::models::{NewTask, Priority, Settings, Task, TaskFilter, TaskUpdate};
use crate::repository::TaskRepository;
use crate::stats::CompletionRate;

/// Width of the longest bar in `stats` output.
const BAR_WIDTH: usize = 30;

pub fn priority_color(p: Priority) -> Color {
    match p {
        Priority::Urgent => Color::Red,
        Priority::Important => Color::Yellow,
        Priority::Normal => Color::Blue,
        Priority::Routine => Color::Green,
    }
}

fn bold(s: &str) -> Cell {
    Cell::new(s).add_attribute(Attribute::Bold)
}

fn task_table(tasks: &[Task]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            bold("ID"),
            bold("Title"),
            bold("Priority"),
            bold("Slot"),
            bold("Category"),
            bold("Created"),
            bold("Repeat"),
            bold("🍅"),
            bold("Status"),
        ]);

    for t in tasks {
        let status = if t.is_completed { "Done" } else { "Pending" };
        let status_color = if t.is_completed { Color::Green } else { Color::Yellow };
        let repeat = if t.is_recurring { t.recurring_type.as_str() } else { "-" };
        table.add_row(vec![
            Cell::new(t.id.short()),
            Cell::new(&t.title),
            Cell::new(t.priority).fg(priority_color(t.priority)),
            Cell::new(t.time_slot),
            Cell::new(t.category),
            Cell::new(t.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")),
            Cell::new(repeat),
            Cell::new(t.pomodoro_sessions),
            Cell::new(status).fg(status_color),
        ]);
    }
    table
}

/// Adds a new task and reports its id.
pub fn cmd_add(repo: &mut TaskRepository, new: NewTask) -> Result<Task> {
    let task = repo.create(new)?;
    println!("Task added (id = {})", task.id.short());
    Ok(task)
}

/// Lists tasks matching `filter`, most urgent first.
pub fn cmd_list(repo: &TaskRepository, filter: TaskFilter) {
    let tasks = repo.query(filter);
    if tasks.is_empty() {
        println!("No tasks found.");
        return;
    }
    println!("{}", task_table(&tasks));
}

/// Shows today's open tasks and today's completion rate.
pub fn cmd_today(repo: &TaskRepository) {
    let pending = repo.today_pending();
    let rate = repo.stats().today_completion_rate();
    if pending.is_empty() {
        println!("Nothing left for today.");
    } else {
        println!("{}", task_table(&pending));
    }
    println!("Today: {}/{} done ({}%)", rate.completed, rate.total, rate.percent);
}

pub fn cmd_toggle(repo: &mut TaskRepository, id: &str) -> Result<Task> {
    let id = repo.resolve_id(id)?;
    let task = repo.toggle_complete(&id)?;
    if task.is_completed {
        println!("Task {} marked as complete.", task.id.short());
    } else {
        println!("Task {} reopened.", task.id.short());
    }
    Ok(task)
}

pub fn cmd_edit(repo: &mut TaskRepository, id: &str, update: TaskUpdate) -> Result<Task> {
    let id = repo.resolve_id(id)?;
    if update.is_empty() {
        return Err(AppError::validation("nothing to change"));
    }
    let task = repo.update(&id, update)?;
    println!("Task {} updated.", task.id.short());
    Ok(task)
}

pub fn cmd_remove(repo: &mut TaskRepository, id: &str) -> Result<Task> {
    let id = repo.resolve_id(id)?;
    let task = repo.delete(&id)?;
    println!("Task {} removed.", task.id.short());
    Ok(task)
}

pub fn cmd_complete_today(repo: &mut TaskRepository) -> Result<usize> {
    let count = repo.complete_all_today()?;
    if count > 0 {
        println!("Completed {} of today's tasks.", count);
    } else {
        println!("No open tasks left for today.");
    }
    Ok(count)
}

/// Removes completed tasks after asking, unless `force` is set.
pub fn cmd_clear_completed(repo: &mut TaskRepository, force: bool) -> Result<usize> {
    let pending = repo.query(TaskFilter::Completed).len();
    if pending == 0 {
        println!("No completed tasks to clear.");
        return Ok(0);
    }
    if !force && !confirm(&format!("Remove {} completed task(s)? This cannot be undone.", pending)) {
        println!("Aborted.");
        return Ok(0);
    }
    let removed = repo.clear_completed()?;
    println!("Removed {} completed task(s).", removed);
    Ok(removed)
}

fn rate_row(label: &str, rate: CompletionRate) -> Vec<Cell> {
    vec![
        Cell::new(label),
        Cell::new(rate.completed),
        Cell::new(rate.total),
        Cell::new(format!("{}%", rate.percent)),
    ]
}

fn bar(value: usize, max: usize) -> String {
    "█".repeat(value * BAR_WIDTH / max.max(1))
}

/// Prints completion rates, the category breakdown and the daily series.
pub fn cmd_stats(repo: &TaskRepository, days: usize) {
    let stats = repo.stats();

    let mut rates = Table::new();
    rates
        .load_preset(UTF8_FULL)
        .set_header(vec![bold("Window"), bold("Done"), bold("Total"), bold("Rate")]);
    rates.add_row(rate_row("Today", stats.today_completion_rate()));
    rates.add_row(rate_row("Last 7 days", stats.week_completion_rate()));
    rates.add_row(rate_row("All time", stats.overall_stats()));
    println!("{rates}");

    let mut categories = Table::new();
    categories
        .load_preset(UTF8_FULL)
        .set_header(vec![bold("Category"), bold("Tasks")]);
    for (category, count) in stats.category_breakdown() {
        categories.add_row(vec![Cell::new(category), Cell::new(count)]);
    }
    println!("{categories}");

    let counts = stats.daily_counts(days);
    let trend = stats.daily_completion_trend(days);
    let max = counts.iter().map(|d| d.count).max().unwrap_or(0);
    let mut daily = Table::new();
    daily
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![bold("Day"), bold("Date"), bold("Created"), bold(""), bold("Done %")]);
    for (day, rate) in counts.iter().zip(trend) {
        daily.add_row(vec![
            Cell::new(day.label()),
            Cell::new(day.date),
            Cell::new(day.count),
            Cell::new(bar(day.count, max)).fg(Color::Cyan),
            Cell::new(format!("{}%", rate)),
        ]);
    }
    println!("{daily}");
    println!("Pomodoro sessions completed: {}", repo.pomodoro_count());
}

fn on_off(b: bool) -> &'static str {
    if b { "on" } else { "off" }
}

/// Changes the given flags and prints the resulting settings.
pub fn cmd_settings(
    repo: &mut TaskRepository,
    notifications: Option<bool>,
    dark_mode: Option<bool>,
    morning_reminder: Option<bool>,
) -> Result<Settings> {
    let mut settings = repo.settings();
    let changed = notifications.is_some() || dark_mode.is_some() || morning_reminder.is_some();
    if let Some(v) = notifications { settings.notifications = v; }
    if let Some(v) = dark_mode { settings.dark_mode = v; }
    if let Some(v) = morning_reminder { settings.morning_reminder = v; }
    if changed {
        repo.update_settings(settings)?;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![bold("Setting"), bold("Value")]);
    table.add_row(vec!["notifications", on_off(settings.notifications)]);
    table.add_row(vec!["dark mode", on_off(settings.dark_mode)]);
    table.add_row(vec!["morning reminder", on_off(settings.morning_reminder)]);
    println!("{table}");
    Ok(settings)
}

/// Writes the full state to `path` as JSON.
pub fn cmd_export(repo: &TaskRepository, path: &Path) -> Result<()> {
    let json = repo.export_json()?;
    fs::write(path, json).map_err(|source| AppError::Persistence { path: path.to_path_buf(), source })?;
    println!("Exported {} task(s) to {}", repo.tasks().len(), path.display());
    Ok(())
}

/// Replaces the current state with the contents of `path`.
pub fn cmd_import(repo: &mut TaskRepository, path: &Path) -> Result<()> {
    let payload = fs::read_to_string(path)
        .map_err(|source| AppError::Persistence { path: path.to_path_buf(), source })?;
    repo.import_json(&payload)?;
    println!("Imported {} task(s) from {}", repo.tasks().len(), path.display());
    Ok(())
}

/// Deletes all tasks and settings after confirmation.
pub fn cmd_reset(repo: &mut TaskRepository, force: bool) -> Result<()> {
    if !force && !confirm("Are you sure you want to delete all tasks and settings? This cannot be undone.") {
        println!("Aborted.");
        return Ok(());
    }
    repo.reset()?;
    println!("All data cleared.");
    Ok(())
}

fn confirm(prompt: &str) -> bool {
    print!("{} [y/N] ", prompt);
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return false;
    }
    input.trim().eq_ignore_ascii_case("y")
}
