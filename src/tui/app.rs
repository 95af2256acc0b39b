use std::time::Instant;

use ratatui::widgets::TableState;

use crate::error::Result;
use crate::models::{Category, NewTask, Priority, RecurringType, Task, TaskFilter, TaskId, TaskUpdate, TimeSlot};
use crate::pomodoro::{self, PomodoroTimer, SessionOutcome, TickSource};
use crate::repository::TaskRepository;

#[derive(PartialEq)]
pub enum InputMode {
    Normal,
    Editing,
    Adding,
}

#[derive(Clone, Copy, PartialEq)]
pub enum ViewMode {
    Tasks,
    Stats,
    Pomodoro,
    Settings,
}

impl ViewMode {
    pub const ALL: [ViewMode; 4] = [ViewMode::Tasks, ViewMode::Stats, ViewMode::Pomodoro, ViewMode::Settings];

    pub fn title(self) -> &'static str {
        match self {
            ViewMode::Tasks => "Tasks",
            ViewMode::Stats => "Stats",
            ViewMode::Pomodoro => "Pomodoro",
            ViewMode::Settings => "Settings",
        }
    }
}

pub enum InputField {
    None,
    Title,
    Description,
}

/// Rows of the settings view, in display order.
#[derive(Clone, Copy, PartialEq)]
pub enum SettingsField {
    Notifications,
    DarkMode,
    MorningReminder,
}

impl SettingsField {
    pub const ALL: [SettingsField; 3] = [
        SettingsField::Notifications,
        SettingsField::DarkMode,
        SettingsField::MorningReminder,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SettingsField::Notifications => "Notifications",
            SettingsField::DarkMode => "Dark mode",
            SettingsField::MorningReminder => "Morning reminder",
        }
    }
}

/// State for the multi-step "Add Task" wizard.
#[derive(Default)]
pub struct AddState {
    pub new: NewTask,
    pub step: usize, // 0: Title, 1: Description, 2: Priority, 3: Slot, 4: Category, 5: Recur
}

impl AddState {
    pub const STEPS: usize = 6;

    pub fn prompt(&self) -> &'static str {
        match self.step {
            0 => "Add Task: Enter Title",
            1 => "Add Task: Enter Description (Optional)",
            2 => "Add Task: Priority (urgent/important/normal/routine)",
            3 => "Add Task: Time Slot (morning/noon/evening/bedtime)",
            4 => "Add Task: Category (work/study/life/fitness)",
            5 => "Add Task: Recurrence (daily/weekly, empty for none)",
            _ => "Add Task",
        }
    }
}

pub struct App {
    pub repo: TaskRepository,
    pub tasks: Vec<Task>,
    pub state: TableState,
    pub filter: TaskFilter,
    pub view_mode: ViewMode,
    pub input_mode: InputMode,
    pub input_field: InputField,
    pub input_buffer: String,
    pub target_id: Option<TaskId>,
    pub add_state: AddState,
    pub timer: PomodoroTimer,
    pub ticks: TickSource,
    pub settings_selected: usize,
    /// One-line feedback shown above the help bar.
    pub status: Option<String>,
}

impl App {
    pub fn new(repo: TaskRepository) -> App {
        let timer = PomodoroTimer::new(repo.pomodoro_count());
        let mut app = App {
            repo,
            tasks: Vec::new(),
            state: TableState::default(),
            filter: TaskFilter::Incomplete,
            view_mode: ViewMode::Tasks,
            input_mode: InputMode::Normal,
            input_field: InputField::None,
            input_buffer: String::new(),
            target_id: None,
            add_state: AddState::default(),
            timer,
            ticks: TickSource::new(),
            settings_selected: 0,
            status: None,
        };
        app.reload();
        app
    }

    /// Records the outcome of a repository call in the status line.
    fn report<T>(&mut self, res: Result<T>, ok: impl FnOnce(&T) -> String) {
        self.status = Some(match &res {
            Ok(v) => ok(v),
            Err(e) => format!("Error: {}", e),
        });
    }

    pub fn dark_mode(&self) -> bool {
        self.repo.settings().dark_mode
    }

    /// Re-queries the task list and keeps the selection in range.
    pub fn reload(&mut self) {
        self.tasks = self.repo.query(self.filter);
        if self.tasks.is_empty() {
            self.state.select(None);
        } else if let Some(i) = self.state.selected() {
            if i >= self.tasks.len() {
                self.state.select(Some(self.tasks.len() - 1));
            }
        } else {
            self.state.select(Some(0));
        }
    }

    fn selected_task(&self) -> Option<&Task> {
        self.state.selected().and_then(|i| self.tasks.get(i))
    }

    pub fn next_view(&mut self) {
        let idx = ViewMode::ALL.iter().position(|v| *v == self.view_mode).unwrap_or(0);
        self.view_mode = ViewMode::ALL[(idx + 1) % ViewMode::ALL.len()];
    }

    /// Selects the next item in the current list.
    pub fn next(&mut self) {
        match self.view_mode {
            ViewMode::Tasks => {
                if self.tasks.is_empty() { return; }
                let i = match self.state.selected() {
                    Some(i) if i + 1 < self.tasks.len() => i + 1,
                    _ => 0,
                };
                self.state.select(Some(i));
            }
            ViewMode::Settings => {
                self.settings_selected = (self.settings_selected + 1) % SettingsField::ALL.len();
            }
            _ => {}
        }
    }

    /// Selects the previous item in the current list.
    pub fn previous(&mut self) {
        match self.view_mode {
            ViewMode::Tasks => {
                if self.tasks.is_empty() { return; }
                let i = match self.state.selected() {
                    Some(0) | None => self.tasks.len() - 1,
                    Some(i) => i - 1,
                };
                self.state.select(Some(i));
            }
            ViewMode::Settings => {
                let len = SettingsField::ALL.len();
                self.settings_selected = (self.settings_selected + len - 1) % len;
            }
            _ => {}
        }
    }

    pub fn cycle_filter(&mut self) {
        self.filter = self.filter.cycle();
        self.reload();
    }

    pub fn toggle_selected(&mut self) {
        let Some(id) = self.selected_task().map(|t| t.id.clone()) else { return };
        let res = self.repo.toggle_complete(&id);
        self.report(res, |t| {
            if t.is_completed { format!("Completed '{}'", t.title) } else { format!("Reopened '{}'", t.title) }
        });
        self.reload();
    }

    pub fn delete_selected(&mut self) {
        let Some(id) = self.selected_task().map(|t| t.id.clone()) else { return };
        let res = self.repo.delete(&id);
        self.report(res, |t| format!("Deleted '{}'", t.title));
        self.reload();
    }

    /// Applies a one-field change to the selected task.
    fn update_selected(&mut self, make: impl FnOnce(&Task) -> TaskUpdate) {
        let Some(task) = self.selected_task() else { return };
        let id = task.id.clone();
        let update = make(task);
        let res = self.repo.update(&id, update);
        self.report(res, |t| format!("Updated '{}'", t.title));
        self.reload();
    }

    pub fn cycle_priority(&mut self) {
        self.update_selected(|t| TaskUpdate { priority: Some(t.priority.cycle()), ..Default::default() });
    }

    pub fn cycle_time_slot(&mut self) {
        self.update_selected(|t| TaskUpdate { time_slot: Some(t.time_slot.cycle()), ..Default::default() });
    }

    pub fn cycle_category(&mut self) {
        self.update_selected(|t| TaskUpdate { category: Some(t.category.cycle()), ..Default::default() });
    }

    pub fn complete_today(&mut self) {
        let res = self.repo.complete_all_today();
        self.report(res, |n| {
            if *n > 0 { format!("Completed {} of today's tasks", n) } else { "No open tasks left for today".to_string() }
        });
        self.reload();
    }

    pub fn clear_completed(&mut self) {
        let res = self.repo.clear_completed();
        self.report(res, |n| format!("Removed {} completed task(s)", n));
        self.reload();
    }

    /// Initiates the "Add Task" wizard.
    pub fn start_add(&mut self) {
        self.input_mode = InputMode::Adding;
        self.add_state = AddState::default();
        self.input_buffer.clear();
    }

    /// Initiates editing of a text field of the selected task.
    pub fn start_edit(&mut self, field: InputField) {
        let Some(t) = self.selected_task() else { return };
        let prefill = match field {
            InputField::Title => t.title.clone(),
            InputField::Description => t.description.clone(),
            InputField::None => String::new(),
        };
        let id = t.id.clone();
        self.target_id = Some(id);
        self.input_buffer = prefill;
        self.input_field = field;
        self.input_mode = InputMode::Editing;
    }

    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input_field = InputField::None;
        self.input_buffer.clear();
    }

    /// Handles text input based on the current mode.
    pub fn handle_input(&mut self) {
        match self.input_mode {
            InputMode::Adding => self.handle_adding_input(),
            InputMode::Editing => self.handle_editing_input(),
            InputMode::Normal => {}
        }
    }

    /// Parses an optional keyword, keeping `default` for empty input.
    fn parse_or<T: std::str::FromStr>(&mut self, default: T) -> Option<T>
    where
        T::Err: std::fmt::Display,
    {
        let raw = self.input_buffer.trim();
        if raw.is_empty() {
            return Some(default);
        }
        match raw.parse() {
            Ok(v) => Some(v),
            Err(e) => {
                self.status = Some(format!("Error: {}", e));
                None
            }
        }
    }

    /// Handles input for the "Add Task" wizard.
    fn handle_adding_input(&mut self) {
        let accepted = match self.add_state.step {
            0 => {
                if self.input_buffer.trim().is_empty() {
                    false
                } else {
                    self.add_state.new.title = self.input_buffer.clone();
                    true
                }
            }
            1 => {
                self.add_state.new.description = self.input_buffer.clone();
                true
            }
            2 => self.parse_or(Priority::default()).map(|p| self.add_state.new.priority = p).is_some(),
            3 => self.parse_or(TimeSlot::default()).map(|s| self.add_state.new.time_slot = s).is_some(),
            4 => self.parse_or(Category::default()).map(|c| self.add_state.new.category = c).is_some(),
            _ => match self.parse_or(RecurringType::None) {
                Some(r) => {
                    self.add_state.new.is_recurring = r != RecurringType::None;
                    self.add_state.new.recurring_type = r;
                    true
                }
                None => false,
            },
        };
        if !accepted {
            return;
        }
        self.input_buffer.clear();
        self.add_state.step += 1;
        if self.add_state.step < AddState::STEPS {
            return;
        }

        let new = std::mem::take(&mut self.add_state.new);
        let res = self.repo.create(new);
        self.report(res, |t| format!("Added '{}'", t.title));
        self.input_mode = InputMode::Normal;
        self.reload();
    }

    /// Handles input for the "Edit Task" mode.
    fn handle_editing_input(&mut self) {
        if let Some(id) = self.target_id.take() {
            let value = std::mem::take(&mut self.input_buffer);
            let update = match self.input_field {
                InputField::Title => TaskUpdate { title: Some(value), ..Default::default() },
                InputField::Description => TaskUpdate { description: Some(value), ..Default::default() },
                InputField::None => TaskUpdate::default(),
            };
            if !update.is_empty() {
                let res = self.repo.update(&id, update);
                self.report(res, |t| format!("Updated '{}'", t.title));
            }
        }
        self.cancel_input();
        self.reload();
    }

    pub fn toggle_setting(&mut self) {
        let mut settings = self.repo.settings();
        match SettingsField::ALL[self.settings_selected] {
            SettingsField::Notifications => settings.notifications = !settings.notifications,
            SettingsField::DarkMode => settings.dark_mode = !settings.dark_mode,
            SettingsField::MorningReminder => settings.morning_reminder = !settings.morning_reminder,
        }
        let res = self.repo.update_settings(settings);
        self.report(res, |_| "Settings saved".to_string());
    }

    pub fn toggle_timer(&mut self, now: Instant) {
        self.timer.toggle();
        self.ticks.sync(&self.timer, now);
    }

    pub fn reset_timer(&mut self) {
        self.timer.reset();
        self.ticks.disarm();
    }

    pub fn skip_timer(&mut self) {
        let outcome = self.timer.complete_session();
        self.ticks.disarm();
        self.on_session_end(outcome);
    }

    /// Advances the pomodoro timer by however many seconds are due.
    pub fn on_tick(&mut self, now: Instant) {
        if let Some(outcome) = pomodoro::drive(&mut self.timer, &mut self.ticks, now) {
            self.on_session_end(outcome);
        }
    }

    fn on_session_end(&mut self, outcome: SessionOutcome) {
        let notify = self.repo.settings().notifications;
        match outcome {
            SessionOutcome::FocusCompleted { session_count } => {
                if let Err(e) = self.repo.record_pomodoro_count(session_count) {
                    self.status = Some(format!("Error: {}", e));
                    return;
                }
                if notify {
                    self.status = Some("Focus done. Take a 5 minute break.".to_string());
                }
            }
            SessionOutcome::BreakCompleted => {
                if notify {
                    self.status = Some("Break over. Ready for 25 minutes of focus.".to_string());
                }
            }
        }
    }
}
