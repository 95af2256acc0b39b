use chrono::{DateTime, Duration, Local, TimeZone};
use daytask::clock::FixedClock;
use daytask::models::{Category, NewTask, Priority, RecurringType, TaskFilter, TaskId, TaskUpdate, TimeSlot};
use daytask::storage::{MemoryStore, PersistedState};
use daytask::{AppError, TaskRepository};

fn noon() -> DateTime<Local> {
    Local.with_ymd_and_hms(2026, 6, 10, 12, 0, 0).unwrap()
}

fn setup() -> (TaskRepository, MemoryStore, FixedClock) {
    let store = MemoryStore::new();
    let clock = FixedClock::new(noon());
    let repo = TaskRepository::with_clock(store.clone(), clock.clone());
    (repo, store, clock)
}

fn with_priority(title: &str, priority: Priority) -> NewTask {
    NewTask { priority, ..NewTask::titled(title) }
}

#[test]
fn test_create_assigns_defaults_and_persists() {
    let (mut repo, store, _clock) = setup();
    let task = repo.create(NewTask::titled("  Write report  ")).unwrap();

    assert_eq!(task.title, "Write report");
    assert_eq!(task.priority, Priority::Normal);
    assert_eq!(task.time_slot, TimeSlot::Morning);
    assert!(!task.is_completed);
    assert!(task.completed_at.is_none());
    assert_eq!(task.pomodoro_sessions, 0);
    assert_eq!(task.created_at, noon());
    assert_eq!(store.writes(), 1);

    let saved = PersistedState::from_json(&store.contents().unwrap()).unwrap();
    assert_eq!(saved.tasks, vec![task]);
}

#[test]
fn test_blank_title_is_rejected() {
    let (mut repo, store, _clock) = setup();
    for title in ["", "   ", "\t\n"] {
        let err = repo.create(NewTask::titled(title)).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
    assert!(repo.tasks().is_empty());
    assert_eq!(store.writes(), 0);
}

#[test]
fn test_ids_are_unique_and_not_reused() {
    let (mut repo, _store, _clock) = setup();
    let a = repo.create(NewTask::titled("a")).unwrap();
    let b = repo.create(NewTask::titled("b")).unwrap();
    repo.delete(&b.id).unwrap();
    let c = repo.create(NewTask::titled("c")).unwrap();
    assert_ne!(a.id, b.id);
    assert_ne!(c.id, b.id);
    assert_ne!(c.id, a.id);
}

#[test]
fn test_toggle_is_its_own_inverse() {
    let (mut repo, _store, clock) = setup();
    let task = repo.create(NewTask::titled("Run")).unwrap();

    clock.advance(Duration::minutes(30));
    let done = repo.toggle_complete(&task.id).unwrap();
    assert!(done.is_completed);
    assert_eq!(done.completed_at, Some((noon() + Duration::minutes(30)).into()));

    let back = repo.toggle_complete(&task.id).unwrap();
    assert_eq!(back.is_completed, task.is_completed);
    assert_eq!(back.completed_at, task.completed_at);
}

#[test]
fn test_completion_invariant_holds_after_every_operation() {
    let (mut repo, _store, _clock) = setup();
    let ids: Vec<TaskId> = (0..5)
        .map(|i| repo.create(NewTask::titled(format!("t{}", i))).unwrap().id)
        .collect();
    repo.toggle_complete(&ids[1]).unwrap();
    repo.toggle_complete(&ids[2]).unwrap();
    repo.toggle_complete(&ids[2]).unwrap();
    repo.complete_all_today().unwrap();
    repo.toggle_complete(&ids[4]).unwrap();

    for t in repo.tasks() {
        assert_eq!(t.is_completed, t.completed_at.is_some(), "task {}", t.title);
    }
}

#[test]
fn test_unknown_id_is_not_found_and_changes_nothing() {
    let (mut repo, store, _clock) = setup();
    repo.create(NewTask::titled("keep")).unwrap();
    let before = repo.tasks().to_vec();
    let missing = TaskId::from("no-such-task");

    assert!(matches!(repo.toggle_complete(&missing), Err(AppError::NotFound(_))));
    assert!(matches!(repo.delete(&missing), Err(AppError::NotFound(_))));
    assert!(matches!(repo.update(&missing, TaskUpdate::default()), Err(AppError::NotFound(_))));
    assert_eq!(repo.tasks(), before.as_slice());
    assert_eq!(store.writes(), 1);
}

#[test]
fn test_update_overwrites_only_supplied_fields() {
    let (mut repo, _store, clock) = setup();
    let task = repo
        .create(NewTask {
            description: "first draft".into(),
            category: Category::Study,
            ..NewTask::titled("Essay")
        })
        .unwrap();
    clock.advance(Duration::hours(2));

    let updated = repo
        .update(&task.id, TaskUpdate {
            priority: Some(Priority::Urgent),
            is_recurring: Some(true),
            recurring_type: Some(RecurringType::Weekly),
            ..Default::default()
        })
        .unwrap();

    assert_eq!(updated.id, task.id);
    assert_eq!(updated.created_at, task.created_at);
    assert_eq!(updated.title, "Essay");
    assert_eq!(updated.description, "first draft");
    assert_eq!(updated.category, Category::Study);
    assert_eq!(updated.priority, Priority::Urgent);
    assert!(updated.is_recurring);
    assert_eq!(updated.recurring_type, RecurringType::Weekly);
}

#[test]
fn test_update_rejects_blank_title() {
    let (mut repo, _store, _clock) = setup();
    let task = repo.create(NewTask::titled("Essay")).unwrap();
    let err = repo
        .update(&task.id, TaskUpdate { title: Some("  ".into()), priority: Some(Priority::Urgent), ..Default::default() })
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(repo.get(&task.id).unwrap(), &task);
}

#[test]
fn test_query_sorts_by_priority_and_keeps_insertion_order() {
    let (mut repo, _store, _clock) = setup();
    repo.create(with_priority("routine-1", Priority::Routine)).unwrap();
    repo.create(with_priority("normal-1", Priority::Normal)).unwrap();
    repo.create(with_priority("urgent-1", Priority::Urgent)).unwrap();
    repo.create(with_priority("normal-2", Priority::Normal)).unwrap();
    repo.create(with_priority("important-1", Priority::Important)).unwrap();
    repo.create(with_priority("urgent-2", Priority::Urgent)).unwrap();

    let titles: Vec<String> = repo.query(TaskFilter::All).into_iter().map(|t| t.title).collect();
    assert_eq!(
        titles,
        ["urgent-1", "urgent-2", "important-1", "normal-1", "normal-2", "routine-1"]
    );
}

#[test]
fn test_query_filters() {
    let (mut repo, _store, _clock) = setup();
    let a = repo.create(with_priority("a", Priority::Routine)).unwrap();
    repo.create(with_priority("b", Priority::Urgent)).unwrap();
    let c = repo.create(with_priority("c", Priority::Important)).unwrap();
    repo.toggle_complete(&a.id).unwrap();
    repo.toggle_complete(&c.id).unwrap();

    let done: Vec<String> = repo.query(TaskFilter::Completed).into_iter().map(|t| t.title).collect();
    let open: Vec<String> = repo.query(TaskFilter::Incomplete).into_iter().map(|t| t.title).collect();
    assert_eq!(done, ["c", "a"]);
    assert_eq!(open, ["b"]);
    assert_eq!(repo.query(TaskFilter::All).len(), 3);
}

#[test]
fn test_complete_all_today_counts_only_open_tasks_from_today() {
    let (mut repo, store, clock) = setup();
    clock.set(noon() - Duration::days(1));
    let yesterday = repo.create(NewTask::titled("yesterday")).unwrap();
    clock.set(noon());

    let ids: Vec<TaskId> = (0..5)
        .map(|i| repo.create(NewTask::titled(format!("today {}", i))).unwrap().id)
        .collect();
    repo.toggle_complete(&ids[0]).unwrap();
    repo.toggle_complete(&ids[3]).unwrap();
    let writes = store.writes();

    assert_eq!(repo.complete_all_today().unwrap(), 3);
    assert_eq!(store.writes(), writes + 1);
    assert!(repo.today_pending().is_empty());
    assert_eq!(repo.stats().today_completion_rate().completed, 5);
    assert!(!repo.get(&yesterday.id).unwrap().is_completed);

    assert_eq!(repo.complete_all_today().unwrap(), 0);
    assert_eq!(store.writes(), writes + 1);
}

#[test]
fn test_clear_completed_removes_exactly_the_completed_subset() {
    let (mut repo, _store, _clock) = setup();
    let ids: Vec<TaskId> = (0..5)
        .map(|i| repo.create(NewTask::titled(format!("t{}", i))).unwrap().id)
        .collect();
    repo.toggle_complete(&ids[1]).unwrap();
    repo.toggle_complete(&ids[3]).unwrap();
    let survivors: Vec<_> = repo.tasks().iter().filter(|t| !t.is_completed).cloned().collect();

    assert_eq!(repo.clear_completed().unwrap(), 2);
    assert_eq!(repo.tasks(), survivors.as_slice());
    assert_eq!(repo.clear_completed().unwrap(), 0);
}

#[test]
fn test_today_pending_lists_open_tasks_created_today() {
    let (mut repo, _store, clock) = setup();
    clock.set(noon() - Duration::days(2));
    repo.create(NewTask::titled("old")).unwrap();
    clock.set(noon());
    let a = repo.create(with_priority("a", Priority::Routine)).unwrap();
    let b = repo.create(with_priority("b", Priority::Urgent)).unwrap();
    repo.toggle_complete(&b.id).unwrap();

    let pending = repo.today_pending();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, a.id);
}

#[test]
fn test_resolve_id_by_prefix() {
    let (mut repo, _store, _clock) = setup();
    let task = repo.create(NewTask::titled("a")).unwrap();
    let full = task.id.as_str().to_string();

    assert_eq!(repo.resolve_id(&full).unwrap(), task.id);
    assert_eq!(repo.resolve_id(&full[..8]).unwrap(), task.id);
    assert!(matches!(repo.resolve_id("zzzz"), Err(AppError::NotFound(_))));
    assert!(matches!(repo.resolve_id(" "), Err(AppError::Validation(_))));
}

#[test]
fn test_resolve_id_reports_ambiguous_prefix() {
    let raw = r#"{"tasks":[
        {"id":"task_1","title":"a","createdAt":"2026-06-10T10:00:00Z"},
        {"id":"task_2","title":"b","createdAt":"2026-06-10T10:00:00Z"}
    ]}"#;
    let repo = TaskRepository::with_clock(MemoryStore::with_contents(raw), FixedClock::new(noon()));
    assert!(matches!(repo.resolve_id("task_"), Err(AppError::Validation(_))));
    assert_eq!(repo.resolve_id("task_2").unwrap(), TaskId::from("task_2"));
}

#[test]
fn test_failed_write_keeps_in_memory_state() {
    let (mut repo, store, _clock) = setup();
    repo.create(NewTask::titled("saved")).unwrap();
    store.fail_writes(true);

    let err = repo.create(NewTask::titled("unsaved")).unwrap_err();
    assert!(err.is_persistence());
    assert_eq!(repo.tasks().len(), 2);
    assert_eq!(repo.tasks()[1].title, "unsaved");

    let on_disk = PersistedState::from_json(&store.contents().unwrap()).unwrap();
    assert_eq!(on_disk.tasks.len(), 1);

    store.fail_writes(false);
    repo.complete_all_today().unwrap();
    let on_disk = PersistedState::from_json(&store.contents().unwrap()).unwrap();
    assert_eq!(on_disk.tasks.len(), 2);
}

#[test]
fn test_state_survives_reopen() {
    let (mut repo, store, clock) = setup();
    repo.create(NewTask::titled("a")).unwrap();
    repo.record_pomodoro_count(4).unwrap();
    let mut settings = repo.settings();
    settings.dark_mode = true;
    repo.update_settings(settings).unwrap();

    let reopened = TaskRepository::with_clock(store.clone(), clock);
    assert_eq!(reopened.tasks(), repo.tasks());
    assert_eq!(reopened.pomodoro_count(), 4);
    assert!(reopened.settings().dark_mode);
}

#[test]
fn test_import_replaces_state() {
    let (mut repo, store, _clock) = setup();
    repo.create(NewTask::titled("old")).unwrap();
    let payload = r#"{
        "tasks": [{"id":"task_9","title":"imported","priority":"urgent","timeSlot":"noon",
                   "category":"fitness","createdAt":"2026-06-01T08:00:00.000Z",
                   "isCompleted":true,"completedAt":"2026-06-01T09:00:00.000Z",
                   "isRecurring":false,"recurringType":"none","pomodoroSessions":2}],
        "settings": {"notifications": false, "darkMode": true, "morningReminder": false},
        "pomodoroCount": 7
    }"#;

    repo.import_json(payload).unwrap();
    assert_eq!(repo.tasks().len(), 1);
    let t = &repo.tasks()[0];
    assert_eq!(t.title, "imported");
    assert_eq!(t.priority, Priority::Urgent);
    assert_eq!(t.time_slot, TimeSlot::Noon);
    assert_eq!(t.pomodoro_sessions, 2);
    assert!(t.is_completed);
    assert_eq!(repo.pomodoro_count(), 7);
    assert!(!repo.settings().notifications);

    let on_disk = PersistedState::from_json(&store.contents().unwrap()).unwrap();
    assert_eq!(on_disk.pomodoro_count, 7);
}

#[test]
fn test_malformed_import_changes_nothing() {
    let (mut repo, store, _clock) = setup();
    repo.create(NewTask::titled("keep me")).unwrap();
    let before_tasks = repo.tasks().to_vec();
    let before_disk = store.contents();

    for payload in ["{not json", "[1, 2, 3]", r#"{"tasks": [{"title": 5}]}"#] {
        let err = repo.import_json(payload).unwrap_err();
        assert!(matches!(err, AppError::ImportFormat(_)), "payload {}", payload);
    }
    assert_eq!(repo.tasks(), before_tasks.as_slice());
    assert_eq!(store.contents(), before_disk);
}

#[test]
fn test_export_then_import_round_trips_state() {
    let (mut repo, _store, _clock) = setup();
    let a = repo.create(with_priority("a", Priority::Important)).unwrap();
    repo.toggle_complete(&a.id).unwrap();
    repo.record_pomodoro_count(3).unwrap();
    let exported = repo.export_json().unwrap();

    let (mut other, _store, _clock) = setup();
    other.import_json(&exported).unwrap();
    assert_eq!(other.tasks(), repo.tasks());
    assert_eq!(other.pomodoro_count(), 3);
}

#[test]
fn test_reset_restores_defaults() {
    let (mut repo, _store, _clock) = setup();
    repo.create(NewTask::titled("a")).unwrap();
    repo.record_pomodoro_count(2).unwrap();
    repo.update_settings(daytask::models::Settings { dark_mode: true, ..Default::default() }).unwrap();

    repo.reset().unwrap();
    assert!(repo.tasks().is_empty());
    assert_eq!(repo.pomodoro_count(), 0);
    assert_eq!(repo.settings(), daytask::models::Settings::default());
}

#[test]
fn test_import_rejects_duplicate_ids_and_blank_titles() {
    let (mut repo, store, _clock) = setup();
    repo.create(NewTask::titled("keep me")).unwrap();
    let before_tasks = repo.tasks().to_vec();
    let before_disk = store.contents();

    let duplicate = r#"{"tasks": [
        {"id": "dup", "title": "a", "createdAt": "2026-06-01T08:00:00Z"},
        {"id": "dup", "title": "b", "createdAt": "2026-06-01T08:00:00Z"}
    ]}"#;
    let blank = r#"{"tasks": [{"id": "x", "title": "   ", "createdAt": "2026-06-01T08:00:00Z"}]}"#;
    for payload in [duplicate, blank] {
        let err = repo.import_json(payload).unwrap_err();
        assert!(matches!(err, AppError::ImportFormat(_)), "payload {}", payload);
    }
    assert_eq!(repo.tasks(), before_tasks.as_slice());
    assert_eq!(store.contents(), before_disk);
}
