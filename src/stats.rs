//! Read-only aggregates over a snapshot of the task list.
//!
//! Every window is expressed in local calendar days: a task belongs to the
//! day on which its `created_at` falls in the local time zone.

use std::collections::BTreeMap;

use chrono::{DateTime, Days, Local, NaiveDate};

use crate::models::{Category, Task};

/// Completed over total for some window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompletionRate {
    pub completed: usize,
    pub total: usize,
    pub percent: u32,
}

impl CompletionRate {
    fn of<'a>(tasks: impl Iterator<Item = &'a Task>) -> Self {
        let (completed, total) = tasks.fold((0, 0), |(c, t), task| {
            (c + usize::from(task.is_completed), t + 1)
        });
        CompletionRate { completed, total, percent: percent(completed, total) }
    }
}

/// Tasks created on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: usize,
}

impl DailyCount {
    /// Abbreviated weekday, e.g. `Mon`.
    pub fn label(&self) -> String {
        self.date.format("%a").to_string()
    }
}

/// Longest daily series [`Stats::daily_counts`] will produce.
pub const MAX_SERIES_DAYS: usize = 366;

/// `completed / total` as a whole percentage, rounding halves up.
pub fn percent(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let scaled = (200 * completed + total) / (2 * total);
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

/// Statistics view borrowed from a repository.
pub struct Stats<'a> {
    tasks: &'a [Task],
    today: NaiveDate,
}

impl<'a> Stats<'a> {
    pub fn new(tasks: &'a [Task], now: DateTime<Local>) -> Self {
        Stats { tasks, today: now.date_naive() }
    }

    fn created_on(task: &Task) -> NaiveDate {
        task.created_at.with_timezone(&Local).date_naive()
    }

    /// Tasks created in `[first, last]`, both inclusive.
    fn created_between(&self, first: NaiveDate, last: NaiveDate) -> impl Iterator<Item = &'a Task> {
        let tasks: &'a [Task] = self.tasks;
        tasks.iter().filter(move |t| {
            let day = Self::created_on(t);
            day >= first && day <= last
        })
    }

    /// The trailing `days` calendar days ending today, oldest first.
    ///
    /// Capped at [`MAX_SERIES_DAYS`] and at the earliest representable date.
    fn trailing_days(&self, days: usize) -> Vec<NaiveDate> {
        let today = self.today;
        let mut dates: Vec<NaiveDate> = (0..days.min(MAX_SERIES_DAYS) as u64)
            .map_while(|back| today.checked_sub_days(Days::new(back)))
            .collect();
        dates.reverse();
        dates
    }

    pub fn today_completion_rate(&self) -> CompletionRate {
        CompletionRate::of(self.created_between(self.today, self.today))
    }

    /// The last seven calendar days, today included.
    pub fn week_completion_rate(&self) -> CompletionRate {
        let first = self.today.checked_sub_days(Days::new(6)).unwrap_or(NaiveDate::MIN);
        CompletionRate::of(self.created_between(first, self.today))
    }

    pub fn overall_stats(&self) -> CompletionRate {
        CompletionRate::of(self.tasks.iter())
    }

    /// Task count per category; every category is present.
    pub fn category_breakdown(&self) -> BTreeMap<Category, usize> {
        let mut counts: BTreeMap<Category, usize> =
            Category::ALL.iter().map(|c| (*c, 0)).collect();
        for task in self.tasks {
            *counts.entry(task.category).or_insert(0) += 1;
        }
        counts
    }

    pub fn daily_counts(&self, days: usize) -> Vec<DailyCount> {
        self.trailing_days(days)
            .into_iter()
            .map(|date| DailyCount {
                date,
                count: self.created_between(date, date).count(),
            })
            .collect()
    }

    /// Completion percent for each of the trailing `days`, oldest first.
    pub fn daily_completion_trend(&self, days: usize) -> Vec<u32> {
        self.trailing_days(days)
            .into_iter()
            .map(|date| CompletionRate::of(self.created_between(date, date)).percent)
            .collect()
    }
}
