//! Behaviour tests for `TodoRepository` over the in-memory datastore.

#![allow(clippy::unwrap_used)] // Test code uses unwrap for brevity

use chrono::Duration;
use proptest::prelude::*;
use std::sync::Arc;
use todos_core::{StoreError, Todo, TodoId, TodoRepository};
use todos_testing::{FailingDatastore, InMemoryDatastore, stepping_clock, test_clock, test_epoch};

fn repository() -> (InMemoryDatastore, TodoRepository) {
    let store = InMemoryDatastore::new();
    let repo = TodoRepository::new(Arc::new(store.clone()), Arc::new(stepping_clock()));
    (store, repo)
}

fn todo(text: &str, done: bool) -> Todo {
    let mut todo = Todo::new(text);
    todo.done = done;
    todo
}

#[tokio::test]
async fn test_create_assigns_id_and_created() {
    let store = InMemoryDatastore::new();
    let repo = TodoRepository::new(Arc::new(store.clone()), Arc::new(test_clock()));

    let saved = repo.save(Todo::new("buy milk")).await.unwrap();

    assert_eq!(saved.id, TodoId::new(1));
    assert_eq!(saved.text, "buy milk");
    assert!(!saved.done);
    assert_eq!(saved.created, test_epoch());
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_update_preserves_created() {
    let (_store, repo) = repository();
    let created = repo.save(Todo::new("buy milk")).await.unwrap();

    let mut update = created.clone();
    update.done = true;
    // A client-supplied timestamp is ignored
    update.created = test_epoch() + Duration::days(365);
    let updated = repo.save(update).await.unwrap();

    assert_eq!(updated.id, created.id);
    assert!(updated.done);
    assert_eq!(updated.created, created.created);
}

#[tokio::test]
async fn test_update_unknown_id_fails() {
    let (store, repo) = repository();
    let mut ghost = Todo::new("ghost");
    ghost.id = TodoId::new(42);

    let err = repo.save(ghost).await.unwrap_err();

    assert!(matches!(err, StoreError::NotFound { id, .. } if id == TodoId::new(42)));
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_list_all_empty() {
    let (_store, repo) = repository();
    assert!(repo.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_all_returns_every_todo_in_creation_order() {
    let (_store, repo) = repository();
    for text in ["one", "two", "three"] {
        repo.save(Todo::new(text)).await.unwrap();
    }

    // Updating the first todo must not move it to the end
    let mut first = repo.list_all().await.unwrap().remove(0);
    first.text = "one, edited".to_string();
    repo.save(first).await.unwrap();

    let texts: Vec<String> = repo
        .list_all()
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.text)
        .collect();

    assert_eq!(texts, ["one, edited", "two", "three"]);
}

#[tokio::test]
async fn test_delete_done_removes_only_done() {
    let (_store, repo) = repository();
    repo.save(todo("keep", false)).await.unwrap();
    repo.save(todo("drop 1", true)).await.unwrap();
    repo.save(todo("drop 2", true)).await.unwrap();

    let deleted = repo.delete_done().await.unwrap();
    let remaining = repo.list_all().await.unwrap();

    assert_eq!(deleted, 2);
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].text, "keep");
}

#[tokio::test]
async fn test_delete_done_twice_is_noop() {
    let (_store, repo) = repository();
    repo.save(todo("drop", true)).await.unwrap();

    assert_eq!(repo.delete_done().await.unwrap(), 1);
    assert_eq!(repo.delete_done().await.unwrap(), 0);
}

#[tokio::test]
async fn test_ids_unique_after_delete() {
    let (_store, repo) = repository();
    let first = repo.save(todo("a", true)).await.unwrap();
    repo.delete_done().await.unwrap();
    let second = repo.save(todo("b", false)).await.unwrap();

    assert_ne!(first.id, second.id);
}

#[tokio::test]
async fn test_milk_scenario() {
    let (_store, repo) = repository();

    let created = repo.save(Todo::new("buy milk")).await.unwrap();
    assert_eq!(created.id, TodoId::new(1));
    assert!(!created.done);

    let mut done = created.clone();
    done.done = true;
    let updated = repo.save(done).await.unwrap();
    assert_eq!(updated.id, TodoId::new(1));
    assert_eq!(updated.created, created.created);

    let listed = repo.list_all().await.unwrap();
    assert_eq!(listed, vec![updated]);

    repo.delete_done().await.unwrap();
    assert!(repo.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_storage_errors_surface_verbatim() {
    let repo = TodoRepository::new(
        Arc::new(FailingDatastore::new("connection reset")),
        Arc::new(test_clock()),
    );

    let err = repo.save(Todo::new("x")).await.unwrap_err();
    assert_eq!(err.to_string(), "datastore error: connection reset");
    assert!(repo.list_all().await.is_err());
    assert!(repo.delete_done().await.is_err());
    assert!(repo.ping().await.is_err());
}

proptest! {
    #[test]
    fn prop_delete_done_keeps_exactly_the_open_todos(flags in prop::collection::vec(any::<bool>(), 0..20)) {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        runtime.block_on(async {
            let (_store, repo) = repository();
            for (i, done) in flags.iter().enumerate() {
                repo.save(todo(&i.to_string(), *done)).await.unwrap();
            }

            let deleted = repo.delete_done().await.unwrap();
            let remaining = repo.list_all().await.unwrap();

            let expected_open: Vec<String> = flags
                .iter()
                .enumerate()
                .filter(|(_, done)| !**done)
                .map(|(i, _)| i.to_string())
                .collect();
            let open: Vec<String> = remaining.into_iter().map(|t| t.text).collect();

            assert_eq!(deleted, flags.iter().filter(|d| **d).count());
            assert_eq!(open, expected_open);
        });
    }
}
