use chrono::{Local, NaiveDate, Utc};

use crate::clock::{Clock, SystemClock};
use crate::error::{AppError, Result};
use crate::models::{NewTask, Settings, Task, TaskFilter, TaskId, TaskUpdate};
use crate::stats::Stats;
use crate::storage::{PersistedState, Store};

/// Owns the task list, settings and pomodoro count for the session.
///
/// Every mutation writes the whole state back to the store. If that write
/// fails the mutation still stands in memory and the error is returned, so
/// the session keeps working from what it has.
pub struct TaskRepository {
    state: PersistedState,
    store: Box<dyn Store>,
    clock: Box<dyn Clock>,
}

impl TaskRepository {
    /// Loads state from `store`, or starts empty if it holds nothing usable.
    pub fn open(store: impl Store + 'static) -> Self {
        Self::with_clock(store, SystemClock)
    }

    pub fn with_clock(store: impl Store + 'static, clock: impl Clock + 'static) -> Self {
        let state = store.load().unwrap_or_default();
        tracing::debug!(tasks = state.tasks.len(), "repository loaded");
        TaskRepository {
            state,
            store: Box::new(store),
            clock: Box::new(clock),
        }
    }

    fn flush(&mut self) -> Result<()> {
        self.store.persist(&self.state).inspect_err(|e| {
            tracing::error!(error = %e, "failed to persist state");
        })
    }

    fn today(&self) -> NaiveDate {
        self.clock.now().date_naive()
    }

    fn created_today(task: &Task, today: NaiveDate) -> bool {
        task.created_at.with_timezone(&Local).date_naive() == today
    }

    fn position(&self, id: &TaskId) -> Result<usize> {
        self.state
            .tasks
            .iter()
            .position(|t| t.id == *id)
            .ok_or_else(|| AppError::not_found(id.as_str()))
    }

    /// All tasks in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.state.tasks
    }

    pub fn get(&self, id: &TaskId) -> Result<&Task> {
        let idx = self.position(id)?;
        Ok(&self.state.tasks[idx])
    }

    /// Finds the one task whose id is `prefix` or starts with it.
    pub fn resolve_id(&self, prefix: &str) -> Result<TaskId> {
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return Err(AppError::validation("task id must not be empty"));
        }
        if let Some(t) = self.state.tasks.iter().find(|t| t.id.as_str() == prefix) {
            return Ok(t.id.clone());
        }
        let mut matches = self.state.tasks.iter().filter(|t| t.id.as_str().starts_with(prefix));
        match (matches.next(), matches.next()) {
            (Some(t), None) => Ok(t.id.clone()),
            (None, _) => Err(AppError::not_found(prefix)),
            (Some(_), Some(_)) => Err(AppError::validation(format!("task id '{}' is ambiguous", prefix))),
        }
    }

    /// Adds a task. Blank titles are rejected.
    pub fn create(&mut self, new: NewTask) -> Result<Task> {
        let title = new.title.trim();
        if title.is_empty() {
            return Err(AppError::validation("task title must not be empty"));
        }
        let task = Task {
            id: TaskId::new(),
            title: title.to_string(),
            description: new.description.trim().to_string(),
            priority: new.priority,
            time_slot: new.time_slot,
            category: new.category,
            created_at: self.clock.now().with_timezone(&Utc),
            is_completed: false,
            completed_at: None,
            is_recurring: new.is_recurring,
            recurring_type: new.recurring_type,
            pomodoro_sessions: 0,
        };
        tracing::info!(id = %task.id, title = %task.title, "task created");
        self.state.tasks.push(task.clone());
        self.flush()?;
        Ok(task)
    }

    /// Applies the supplied fields of `update` to a task.
    pub fn update(&mut self, id: &TaskId, update: TaskUpdate) -> Result<Task> {
        let idx = self.position(id)?;
        let title = match update.title {
            Some(t) => {
                let t = t.trim().to_string();
                if t.is_empty() {
                    return Err(AppError::validation("task title must not be empty"));
                }
                Some(t)
            }
            None => None,
        };

        let task = &mut self.state.tasks[idx];
        if let Some(t) = title { task.title = t; }
        if let Some(d) = update.description { task.description = d.trim().to_string(); }
        if let Some(p) = update.priority { task.priority = p; }
        if let Some(s) = update.time_slot { task.time_slot = s; }
        if let Some(c) = update.category { task.category = c; }
        if let Some(r) = update.is_recurring { task.is_recurring = r; }
        if let Some(r) = update.recurring_type { task.recurring_type = r; }
        let task = task.clone();

        tracing::info!(id = %task.id, "task updated");
        self.flush()?;
        Ok(task)
    }

    /// Flips a task between completed and incomplete.
    pub fn toggle_complete(&mut self, id: &TaskId) -> Result<Task> {
        let idx = self.position(id)?;
        let now = self.clock.now().with_timezone(&Utc);
        let task = &mut self.state.tasks[idx];
        if task.is_completed {
            task.mark_incomplete();
        } else {
            task.mark_completed(now);
        }
        let task = task.clone();

        tracing::info!(id = %task.id, completed = task.is_completed, "task toggled");
        self.flush()?;
        Ok(task)
    }

    /// Removes a task. Unknown ids are an error, not a no-op.
    pub fn delete(&mut self, id: &TaskId) -> Result<Task> {
        let idx = self.position(id)?;
        let task = self.state.tasks.remove(idx);
        tracing::info!(id = %task.id, "task deleted");
        self.flush()?;
        Ok(task)
    }

    /// Completes every open task created today, with a single write.
    pub fn complete_all_today(&mut self) -> Result<usize> {
        let today = self.today();
        let now = self.clock.now().with_timezone(&Utc);
        let mut count = 0;
        for task in self.state.tasks.iter_mut() {
            if !task.is_completed && Self::created_today(task, today) {
                task.mark_completed(now);
                count += 1;
            }
        }
        tracing::info!(count, "completed today's tasks");
        if count > 0 {
            self.flush()?;
        }
        Ok(count)
    }

    /// Drops every completed task, keeping the rest in order.
    pub fn clear_completed(&mut self) -> Result<usize> {
        let before = self.state.tasks.len();
        self.state.tasks.retain(|t| !t.is_completed);
        let removed = before - self.state.tasks.len();
        tracing::info!(removed, "cleared completed tasks");
        if removed > 0 {
            self.flush()?;
        }
        Ok(removed)
    }

    /// Tasks matching `filter`, most urgent first.
    ///
    /// Equal priorities keep insertion order.
    pub fn query(&self, filter: TaskFilter) -> Vec<Task> {
        let mut tasks: Vec<Task> = self
            .state
            .tasks
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        tasks.sort_by_key(|t| t.priority);
        tasks
    }

    /// Open tasks created today, in insertion order.
    pub fn today_pending(&self) -> Vec<Task> {
        let today = self.today();
        self.state
            .tasks
            .iter()
            .filter(|t| !t.is_completed && Self::created_today(t, today))
            .cloned()
            .collect()
    }

    pub fn stats(&self) -> Stats<'_> {
        Stats::new(&self.state.tasks, self.clock.now())
    }

    pub fn settings(&self) -> Settings {
        self.state.settings
    }

    pub fn update_settings(&mut self, settings: Settings) -> Result<Settings> {
        self.state.settings = settings;
        tracing::info!(?settings, "settings updated");
        self.flush()?;
        Ok(settings)
    }

    pub fn pomodoro_count(&self) -> u32 {
        self.state.pomodoro_count
    }

    /// Stores the cumulative number of finished focus sessions.
    pub fn record_pomodoro_count(&mut self, count: u32) -> Result<()> {
        self.state.pomodoro_count = count;
        tracing::debug!(count, "pomodoro count recorded");
        self.flush()
    }

    /// Forgets all tasks, settings and the pomodoro count.
    pub fn reset(&mut self) -> Result<()> {
        self.state = PersistedState::default();
        tracing::info!("all data cleared");
        self.flush()
    }

    /// The full state as pretty-printed JSON, in the stored layout.
    pub fn export_json(&self) -> Result<String> {
        self.state.to_json()
    }

    /// Replaces the whole state with an exported document.
    ///
    /// The payload is parsed before anything changes; a malformed payload
    /// leaves memory and store as they were.
    pub fn import_json(&mut self, payload: &str) -> Result<()> {
        let state = PersistedState::from_json(payload).map_err(AppError::ImportFormat)?;
        tracing::info!(tasks = state.tasks.len(), "state imported");
        self.state = state;
        self.flush()
    }
}
