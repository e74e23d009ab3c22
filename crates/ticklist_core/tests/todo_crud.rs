use chrono::{DateTime, Duration, TimeZone, Utc};
use std::cell::Cell;
use ticklist_core::{
    Clock, IdGenerator, InMemoryTodoRepository, RepoError, TodoPatch, TodoRepository, TodoService,
    TodoStatus,
};

fn fixed_ids(id: &str) -> IdGenerator {
    let id = id.to_string();
    Box::new(move || id.clone())
}

fn sequential_ids(start: u32) -> IdGenerator {
    let next = Cell::new(start);
    Box::new(move || {
        let id = next.get();
        next.set(id + 1);
        id.to_string()
    })
}

fn frozen_clock(at: DateTime<Utc>) -> Clock {
    Box::new(move || at)
}

/// Clock that advances by `step_secs` on every read.
fn stepping_clock(start: DateTime<Utc>, step_secs: i64) -> Clock {
    let ticks = Cell::new(0i64);
    Box::new(move || {
        let tick = ticks.get();
        ticks.set(tick + 1);
        start + Duration::seconds(step_secs * tick)
    })
}

fn nov(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 11, day, 0, 0, 0).unwrap()
}

#[test]
fn insert_stamps_identity_and_both_timestamps_from_one_clock_read() {
    let mut repo = InMemoryTodoRepository::with_clock(fixed_ids("123"), frozen_clock(nov(10)));

    let todo = repo
        .insert("Todo Description", Some(TodoStatus::Done))
        .unwrap();

    assert_eq!(todo.id, "123");
    assert_eq!(todo.description, "Todo Description");
    assert_eq!(todo.status, TodoStatus::Done);
    assert_eq!(todo.created_at, nov(10));
    assert_eq!(todo.updated_at, todo.created_at);
}

#[test]
fn insert_without_status_defaults_to_not_done() {
    let mut repo = InMemoryTodoRepository::with_clock(fixed_ids("123"), frozen_clock(nov(10)));

    let todo = repo.insert("No Status", None).unwrap();

    assert_eq!(todo.status, TodoStatus::NotDone);
}

#[test]
fn insert_empty_description_fails_and_leaves_store_unchanged() {
    let mut repo = InMemoryTodoRepository::new(sequential_ids(1));
    repo.insert("keep me", None).unwrap();

    let err = repo.insert("", Some(TodoStatus::Done)).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));

    let all = repo.fetch_all().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].description, "keep me");
}

#[test]
fn fetch_all_returns_records_in_insertion_order() {
    let mut repo = InMemoryTodoRepository::new(sequential_ids(1));
    repo.insert("first", None).unwrap();
    repo.insert("second", Some(TodoStatus::Done)).unwrap();
    repo.insert("third", None).unwrap();

    let all = repo.fetch_all().unwrap();
    let ids: Vec<&str> = all.iter().map(|todo| todo.id.as_str()).collect();
    assert_eq!(ids, ["1", "2", "3"]);
}

#[test]
fn fetch_operations_fail_until_the_store_exists() {
    let mut repo = InMemoryTodoRepository::uninitialized(sequential_ids(1));

    assert!(matches!(
        repo.fetch_all().unwrap_err(),
        RepoError::NotInitialized
    ));
    assert!(matches!(
        repo.fetch_by_query(&Default::default()).unwrap_err(),
        RepoError::NotInitialized
    ));

    // The first insert brings the store into existence.
    repo.insert("now it exists", None).unwrap();
    assert_eq!(repo.fetch_all().unwrap().len(), 1);
}

#[test]
fn empty_store_is_a_valid_result_not_an_error() {
    let repo = InMemoryTodoRepository::new(sequential_ids(1));
    assert_eq!(repo.fetch_all().unwrap(), Vec::new());
}

#[test]
fn update_description_refreshes_updated_at_and_keeps_created_at() {
    let mut repo =
        InMemoryTodoRepository::with_clock(fixed_ids("1234"), stepping_clock(nov(10), 60));
    let inserted = repo.insert("Description 1234", Some(TodoStatus::Done)).unwrap();

    let updated = repo
        .update("1234", &TodoPatch::description("New Description"))
        .unwrap();

    assert_eq!(updated.description, "New Description");
    assert_eq!(updated.status, TodoStatus::Done);
    assert_eq!(updated.created_at, inserted.created_at);
    assert!(updated.updated_at > inserted.updated_at);
}

#[test]
fn update_status_leaves_description_untouched() {
    let mut repo = InMemoryTodoRepository::with_clock(fixed_ids("1234"), frozen_clock(nov(10)));
    repo.insert("Description 1234", Some(TodoStatus::Done)).unwrap();

    let updated = repo
        .update("1234", &TodoPatch::status(TodoStatus::NotDone))
        .unwrap();

    assert_eq!(updated.description, "Description 1234");
    assert_eq!(updated.status, TodoStatus::NotDone);
}

#[test]
fn update_with_empty_patch_still_refreshes_updated_at() {
    let mut repo =
        InMemoryTodoRepository::with_clock(fixed_ids("1234"), stepping_clock(nov(10), 60));
    let inserted = repo.insert("unchanged", None).unwrap();

    let updated = repo.update("1234", &TodoPatch::default()).unwrap();

    assert_eq!(updated.description, inserted.description);
    assert_eq!(updated.status, inserted.status);
    assert!(updated.updated_at > inserted.updated_at);
}

#[test]
fn update_with_explicitly_empty_description_fails_without_mutation() {
    let mut repo =
        InMemoryTodoRepository::with_clock(fixed_ids("1234"), stepping_clock(nov(10), 60));
    let inserted = repo.insert("keep me", Some(TodoStatus::Done)).unwrap();

    let err = repo
        .update("1234", &TodoPatch::description(""))
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));

    // The rejected patch must not have touched the record, updated_at included.
    let stored = repo.fetch_all().unwrap();
    assert_eq!(stored[0], inserted);
}

#[test]
fn update_unknown_id_returns_not_found() {
    let mut repo = InMemoryTodoRepository::new(fixed_ids("1234"));
    repo.insert("Description 1234", None).unwrap();

    let err = repo
        .update("12345", &TodoPatch::status(TodoStatus::Done))
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == "12345"));
}

#[test]
fn delete_returns_the_record_and_preserves_remaining_order() {
    let mut repo = InMemoryTodoRepository::new(sequential_ids(1));
    repo.insert("first", None).unwrap();
    repo.insert("second", Some(TodoStatus::Done)).unwrap();
    repo.insert("third", None).unwrap();

    let removed = repo.delete("2").unwrap();
    assert_eq!(removed.description, "second");
    assert_eq!(removed.status, TodoStatus::Done);

    let all = repo.fetch_all().unwrap();
    let remaining: Vec<&str> = all.iter().map(|todo| todo.id.as_str()).collect();
    assert_eq!(remaining, ["1", "3"]);
}

#[test]
fn delete_unknown_id_returns_not_found() {
    let mut repo = InMemoryTodoRepository::new(fixed_ids("1234"));
    repo.insert("Description 1234", None).unwrap();

    let err = repo.delete("12345").unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == "12345"));
}

#[test]
fn returned_records_are_detached_copies() {
    let mut repo = InMemoryTodoRepository::new(fixed_ids("1"));
    repo.insert("original", None).unwrap();

    let mut fetched = repo.fetch_all().unwrap();
    fetched[0].description = "mutated copy".to_string();

    assert_eq!(repo.fetch_all().unwrap()[0].description, "original");
}

#[test]
fn service_wraps_repository_calls() {
    let repo = InMemoryTodoRepository::with_clock(sequential_ids(1), frozen_clock(nov(10)));
    let mut service = TodoService::new(repo);

    let added = service.add("from service").unwrap();
    assert_eq!(added.status, TodoStatus::NotDone);

    let done = service.mark_done(&added.id).unwrap();
    assert_eq!(done.status, TodoStatus::Done);

    let reopened = service.mark_not_done(&added.id).unwrap();
    assert_eq!(reopened.status, TodoStatus::NotDone);

    let explicit = service
        .add_with_status("already finished", TodoStatus::Done)
        .unwrap();
    assert_eq!(explicit.status, TodoStatus::Done);

    assert_eq!(service.fetch_all().unwrap().len(), 2);

    let removed = service.delete(&added.id).unwrap();
    assert_eq!(removed.description, "from service");
    assert_eq!(service.fetch_all().unwrap().len(), 1);
}
