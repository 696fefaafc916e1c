use chrono::NaiveDate;
use taskboard_core::TaskboardError;
use taskboard_domain::{StatusName, TaskDraft, TaskId};
use taskboard_persistence::{Identity, MemoryStore, TaskStore};

async fn create_and_fetch(store: &dyn TaskStore) {
    let alice = Identity::new("alice");
    let due = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
    let created = store
        .create_task(
            &alice,
            TaskDraft::new("  Write report  ")
                .with_description("quarterly")
                .with_due_date(due),
        )
        .await
        .unwrap();

    assert_eq!(created.title, "Write report");
    assert!(!created.id.is_temporary());

    let board = store.fetch_board(&alice).await.unwrap();
    assert_eq!(board.todo, vec![created.clone()]);
    assert!(board.doing.is_empty());
    assert_eq!(board.todo[0].due_date, Some(due));
}

async fn status_moves_between_columns(store: &dyn TaskStore) {
    let alice = Identity::new("alice");
    let task = store
        .create_task(&alice, TaskDraft::new("Move me"))
        .await
        .unwrap();

    store
        .update_status(&alice, &task.id, StatusName::Doing)
        .await
        .unwrap();
    let board = store.fetch_board(&alice).await.unwrap();
    assert!(board.todo.is_empty());
    assert_eq!(board.doing.len(), 1);

    store
        .update_status(&alice, &task.id, StatusName::Canceled)
        .await
        .unwrap();
    let board = store.fetch_board(&alice).await.unwrap();
    assert_eq!(board.task_count(), 0);
    assert_eq!(store.fetch_canceled(&alice).await.unwrap(), vec![task]);
}

async fn canceled_is_newest_first(store: &dyn TaskStore) {
    let alice = Identity::new("alice");
    let first = store.create_task(&alice, TaskDraft::new("a")).await.unwrap();
    let second = store.create_task(&alice, TaskDraft::new("b")).await.unwrap();

    store
        .update_status(&alice, &first.id, StatusName::Canceled)
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    store
        .update_status(&alice, &second.id, StatusName::Canceled)
        .await
        .unwrap();

    let canceled = store.fetch_canceled(&alice).await.unwrap();
    let ids: Vec<&TaskId> = canceled.iter().map(|t| &t.id).collect();
    assert_eq!(ids, vec![&second.id, &first.id]);
}

async fn foreign_tasks_are_not_found(store: &dyn TaskStore) {
    let alice = Identity::new("alice");
    let mallory = Identity::new("mallory");
    let task = store
        .create_task(&alice, TaskDraft::new("private"))
        .await
        .unwrap();

    let err = store
        .update_task(&mallory, &task.id, TaskDraft::new("hijacked"))
        .await
        .unwrap_err();
    assert!(matches!(err, TaskboardError::NotFound(_)));

    let err = store
        .update_status(&mallory, &task.id, StatusName::Done)
        .await
        .unwrap_err();
    assert!(matches!(err, TaskboardError::NotFound(_)));

    let err = store.delete_task(&mallory, &task.id).await.unwrap_err();
    assert!(matches!(err, TaskboardError::NotFound(_)));

    assert_eq!(store.fetch_board(&mallory).await.unwrap().task_count(), 0);
    assert_eq!(store.fetch_board(&alice).await.unwrap().todo[0].title, "private");
}

async fn edit_and_delete(store: &dyn TaskStore) {
    let alice = Identity::new("alice");
    let task = store
        .create_task(&alice, TaskDraft::new("draft").with_description("old"))
        .await
        .unwrap();

    let updated = store
        .update_task(&alice, &task.id, TaskDraft::new("final"))
        .await
        .unwrap();
    assert_eq!(updated.id, task.id);
    assert_eq!(updated.description, None);

    let err = store
        .update_task(&alice, &task.id, TaskDraft::new(""))
        .await
        .unwrap_err();
    assert!(matches!(err, TaskboardError::Validation(_)));

    store.delete_task(&alice, &task.id).await.unwrap();
    let err = store.delete_task(&alice, &task.id).await.unwrap_err();
    assert!(matches!(err, TaskboardError::NotFound(_)));
    assert_eq!(store.fetch_board(&alice).await.unwrap().task_count(), 0);
}

#[tokio::test]
async fn test_memory_store_contract() {
    create_and_fetch(&MemoryStore::new()).await;
    status_moves_between_columns(&MemoryStore::new()).await;
    canceled_is_newest_first(&MemoryStore::new()).await;
    foreign_tasks_are_not_found(&MemoryStore::new()).await;
    edit_and_delete(&MemoryStore::new()).await;
}

#[cfg(feature = "sqlite")]
mod sqlite {
    use super::*;
    use taskboard_persistence::SqliteStore;
    use tempfile::TempDir;

    fn store(dir: &TempDir, name: &str) -> SqliteStore {
        SqliteStore::new(dir.path().join(name))
    }

    #[tokio::test]
    async fn test_sqlite_store_contract() {
        let dir = TempDir::new().unwrap();
        create_and_fetch(&store(&dir, "a.db")).await;
        status_moves_between_columns(&store(&dir, "b.db")).await;
        canceled_is_newest_first(&store(&dir, "c.db")).await;
        foreign_tasks_are_not_found(&store(&dir, "d.db")).await;
        edit_and_delete(&store(&dir, "e.db")).await;
    }

    #[tokio::test]
    async fn test_sqlite_data_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let alice = Identity::new("alice");
        let task = {
            let store = store(&dir, "tasks.db");
            store
                .create_task(&alice, TaskDraft::new("persisted"))
                .await
                .unwrap()
        };

        let reopened = store(&dir, "tasks.db");
        reopened.ping().await.unwrap();
        let board = reopened.fetch_board(&alice).await.unwrap();
        assert_eq!(board.todo, vec![task]);
    }
}
