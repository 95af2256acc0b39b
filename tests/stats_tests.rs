use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use daytask::models::{Category, Task, TaskId};
use daytask::stats::{percent, CompletionRate, Stats, MAX_SERIES_DAYS};

fn now() -> DateTime<Local> {
    Local.with_ymd_and_hms(2026, 6, 10, 12, 0, 0).unwrap()
}

fn task(days_ago: i64, completed: bool, category: Category) -> Task {
    let created: DateTime<Utc> = (now() - Duration::days(days_ago)).into();
    Task {
        id: TaskId::new(),
        title: format!("task from {} days ago", days_ago),
        description: String::new(),
        priority: Default::default(),
        time_slot: Default::default(),
        category,
        created_at: created,
        is_completed: completed,
        completed_at: completed.then_some(created),
        is_recurring: false,
        recurring_type: Default::default(),
        pomodoro_sessions: 0,
    }
}

#[test]
fn test_percent_rounds_half_up() {
    assert_eq!(percent(0, 0), 0);
    assert_eq!(percent(0, 5), 0);
    assert_eq!(percent(1, 3), 33);
    assert_eq!(percent(2, 3), 67);
    assert_eq!(percent(1, 8), 13); // 12.5
    assert_eq!(percent(1, 200), 1); // 0.5
    assert_eq!(percent(4, 4), 100);
}

#[test]
fn test_overall_stats() {
    let tasks = vec![
        task(0, true, Category::Work),
        task(1, false, Category::Work),
        task(3, true, Category::Life),
        task(20, false, Category::Study),
    ];
    let stats = Stats::new(&tasks, now());
    assert_eq!(stats.overall_stats(), CompletionRate { completed: 2, total: 4, percent: 50 });
}

#[test]
fn test_empty_task_list_is_all_zero() {
    let stats = Stats::new(&[], now());
    assert_eq!(stats.today_completion_rate(), CompletionRate::default());
    assert_eq!(stats.week_completion_rate(), CompletionRate::default());
    assert_eq!(stats.overall_stats(), CompletionRate::default());
    assert_eq!(stats.daily_completion_trend(7), vec![0; 7]);
    assert!(stats.daily_counts(7).iter().all(|d| d.count == 0));
}

#[test]
fn test_category_breakdown_includes_empty_categories() {
    let tasks = vec![
        task(0, false, Category::Work),
        task(0, true, Category::Work),
        task(2, false, Category::Life),
    ];
    let breakdown = Stats::new(&tasks, now()).category_breakdown();
    let pairs: Vec<(Category, usize)> = breakdown.into_iter().collect();
    assert_eq!(
        pairs,
        vec![
            (Category::Work, 2),
            (Category::Study, 0),
            (Category::Life, 1),
            (Category::Fitness, 0),
        ]
    );
}

#[test]
fn test_today_window_uses_local_day_boundaries() {
    let midnight = Local.with_ymd_and_hms(2026, 6, 10, 0, 0, 0).unwrap();
    let mut just_before = task(0, true, Category::Work);
    just_before.created_at = (midnight - Duration::seconds(1)).into();
    let mut at_midnight = task(0, false, Category::Work);
    at_midnight.created_at = midnight.into();
    let mut late = task(0, true, Category::Work);
    late.created_at = Local.with_ymd_and_hms(2026, 6, 10, 23, 59, 59).unwrap().into();

    let tasks = vec![just_before, at_midnight, late];
    let rate = Stats::new(&tasks, now()).today_completion_rate();
    assert_eq!(rate, CompletionRate { completed: 1, total: 2, percent: 50 });
}

#[test]
fn test_week_window_is_seven_days_including_today() {
    let tasks = vec![
        task(0, true, Category::Work),
        task(3, false, Category::Work),
        task(6, true, Category::Work),
        task(7, true, Category::Work),
        task(30, false, Category::Work),
    ];
    let rate = Stats::new(&tasks, now()).week_completion_rate();
    assert_eq!(rate, CompletionRate { completed: 2, total: 3, percent: 67 });
}

#[test]
fn test_daily_counts_are_oldest_first() {
    let tasks = vec![
        task(0, false, Category::Work),
        task(0, false, Category::Work),
        task(2, true, Category::Study),
        task(6, false, Category::Life),
        task(9, false, Category::Life),
    ];
    let counts = Stats::new(&tasks, now()).daily_counts(7);
    let values: Vec<usize> = counts.iter().map(|d| d.count).collect();
    assert_eq!(values, vec![1, 0, 0, 0, 1, 0, 2]);
    assert_eq!(counts[6].date, now().date_naive());
    assert_eq!(counts[0].date, now().date_naive() - Duration::days(6));
    // 2026-06-10 is a Wednesday.
    assert_eq!(counts[6].label(), "Wed");
    assert_eq!(counts[0].label(), "Thu");
}

#[test]
fn test_daily_completion_trend() {
    let tasks = vec![
        task(0, true, Category::Work),
        task(0, false, Category::Work),
        task(0, false, Category::Work),
        task(1, true, Category::Work),
        task(4, false, Category::Work),
    ];
    let trend = Stats::new(&tasks, now()).daily_completion_trend(7);
    assert_eq!(trend, vec![0, 0, 0, 0, 0, 100, 33]);

    let short = Stats::new(&tasks, now()).daily_completion_trend(2);
    assert_eq!(short, vec![100, 33]);
}

#[test]
fn test_daily_series_length_is_bounded() {
    let tasks = vec![task(0, true, Category::Work)];
    let stats = Stats::new(&tasks, now());
    assert!(stats.daily_counts(0).is_empty());
    assert!(stats.daily_completion_trend(0).is_empty());

    let counts = stats.daily_counts(300_000_000);
    assert_eq!(counts.len(), MAX_SERIES_DAYS);
    assert_eq!(counts.last().unwrap().date, now().date_naive());
    assert_eq!(counts.last().unwrap().count, 1);
    assert_eq!(stats.daily_completion_trend(usize::MAX).len(), MAX_SERIES_DAYS);
}
