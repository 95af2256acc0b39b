use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque task identifier.
///
/// Freshly created tasks get a UUIDv7; any string read back from storage is
/// accepted as-is so older exports keep their ids.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new() -> Self {
        TaskId(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First eight characters, enough to pick a task on the command line.
    pub fn short(&self) -> &str {
        let end = self.0.char_indices().nth(8).map(|(i, _)| i).unwrap_or(self.0.len());
        &self.0[..end]
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        TaskId(s.to_string())
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        TaskId(s)
    }
}

/// Error returned when a keyword does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseKindError {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for ParseKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for ParseKindError {}

/// Declares a lowercase keyword enum with `ALL`, `as_str`, `FromStr` and `Display`.
macro_rules! keyword_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            /// The variant after this one, wrapping around.
            pub fn cycle(self) -> Self {
                let all = Self::ALL;
                let idx = all.iter().position(|v| *v == self).unwrap_or(0);
                all[(idx + 1) % all.len()]
            }
        }

        impl FromStr for $name {
            type Err = ParseKindError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err(ParseKindError { kind: $kind, value: s.to_string() }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

keyword_enum!(
    /// Task priority. Declaration order is the display order: urgent first.
    Priority, "priority", {
        Urgent => "urgent",
        Important => "important",
        Normal => "normal",
        Routine => "routine",
    }
);

keyword_enum!(
    /// Coarse part-of-day tag.
    TimeSlot, "time slot", {
        Morning => "morning",
        Noon => "noon",
        Evening => "evening",
        Bedtime => "bedtime",
    }
);

keyword_enum!(
    Category, "category", {
        Work => "work",
        Study => "study",
        Life => "life",
        Fitness => "fitness",
    }
);

keyword_enum!(
    RecurringType, "recurrence", {
        Daily => "daily",
        Weekly => "weekly",
        None => "none",
    }
);

keyword_enum!(
    /// Which tasks a listing shows.
    TaskFilter, "filter", {
        All => "all",
        Incomplete => "incomplete",
        Completed => "completed",
    }
);

impl Default for Priority {
    fn default() -> Self {
        Priority::Normal
    }
}

impl Default for TimeSlot {
    fn default() -> Self {
        TimeSlot::Morning
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::Work
    }
}

impl Default for RecurringType {
    fn default() -> Self {
        RecurringType::None
    }
}

impl Default for TaskFilter {
    fn default() -> Self {
        TaskFilter::All
    }
}

impl TaskFilter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            TaskFilter::All => true,
            TaskFilter::Incomplete => !task.is_completed,
            TaskFilter::Completed => task.is_completed,
        }
    }
}

/// Represents a single task.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier, never reused.
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub time_slot: TimeSlot,
    #[serde(default)]
    pub category: Category,
    /// Creation timestamp, fixed for the task's lifetime.
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_completed: bool,
    /// Present exactly when `is_completed` is true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default)]
    pub recurring_type: RecurringType,
    #[serde(default)]
    pub pomodoro_sessions: u32,
}

impl Task {
    pub fn mark_completed(&mut self, at: DateTime<Utc>) {
        self.is_completed = true;
        self.completed_at = Some(at);
    }

    pub fn mark_incomplete(&mut self) {
        self.is_completed = false;
        self.completed_at = None;
    }

    /// Repairs records whose completion flag and timestamp disagree.
    ///
    /// Returns true if anything changed.
    pub fn normalize(&mut self) -> bool {
        match (self.is_completed, self.completed_at) {
            (true, None) => {
                self.completed_at = Some(self.created_at);
                true
            }
            (false, Some(_)) => {
                self.completed_at = None;
                true
            }
            _ => false,
        }
    }
}

/// Input for creating a task.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub time_slot: TimeSlot,
    pub category: Category,
    pub is_recurring: bool,
    pub recurring_type: RecurringType,
}

impl NewTask {
    pub fn titled(title: impl Into<String>) -> Self {
        NewTask { title: title.into(), ..Default::default() }
    }
}

/// Partial edit of a task: only `Some` fields are applied.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub time_slot: Option<TimeSlot>,
    pub category: Option<Category>,
    pub is_recurring: Option<bool>,
    pub recurring_type: Option<RecurringType>,
}

impl TaskUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.time_slot.is_none()
            && self.category.is_none()
            && self.is_recurring.is_none()
            && self.recurring_type.is_none()
    }
}

/// User preferences persisted next to the tasks.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub notifications: bool,
    pub dark_mode: bool,
    pub morning_reminder: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            notifications: true,
            dark_mode: false,
            morning_reminder: true,
        }
    }
}
