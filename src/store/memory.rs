//! In-memory [`TaskStore`] adapter. Same filter, sort and pagination
//! semantics as the PostgreSQL adapter, backed by a `HashMap` behind a
//! `parking_lot` lock. Used by the test suite and small embedded deployments.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use super::{StoreError, TaskStore};
use crate::models::Task;
use crate::query::{ListQuery, SortField, SortOrder};

/// Thread-safe in-memory task store.
#[derive(Debug, Clone, Default)]
pub struct MemoryTaskStore {
    tasks: Arc<RwLock<HashMap<Uuid, Task>>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records. Test helper.
    pub fn len(&self) -> usize {
        self.tasks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.read().is_empty()
    }

    fn matches(task: &Task, query: &ListQuery) -> bool {
        let filters = &query.filters;

        if let Some(worker_name) = &filters.worker_name {
            if &task.worker_name != worker_name {
                return false;
            }
        }
        if let Some(before) = filters.before {
            if task.date >= before {
                return false;
            }
        }
        if let Some(after) = filters.after {
            if task.date <= after {
                return false;
            }
        }

        true
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn get(&self, id: Uuid) -> Result<Task, StoreError> {
        self.tasks
            .read()
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn create(&self, task: Task) -> Result<Task, StoreError> {
        let mut tasks = self.tasks.write();
        if tasks.contains_key(&task.id) {
            return Err(StoreError::Conflict);
        }
        tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<Task>, StoreError> {
        let mut matching: Vec<Task> = self
            .tasks
            .read()
            .values()
            .filter(|t| Self::matches(t, query))
            .cloned()
            .collect();

        matching.sort_by(|a, b| {
            let ordering = match query.sort.by {
                SortField::Date => a.date.cmp(&b.date),
                SortField::WorkerName => a.worker_name.cmp(&b.worker_name),
            };
            match query.sort.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        let (offset, limit) = query.offset_limit();
        Ok(matching
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn update(&self, id: Uuid, previous: Task, next: Task) -> Result<Task, StoreError> {
        let mut tasks = self.tasks.write();
        let current = tasks.get(&id).ok_or(StoreError::NotFound)?;

        if *current != previous {
            return Err(StoreError::Conflict);
        }

        let stored = Task { id, ..next };
        tasks.insert(id, stored.clone());
        Ok(stored)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.tasks
            .write()
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{CallerIdentity, Role};
    use crate::models::TaskRequest;
    use crate::query::ListParams;

    fn manager() -> CallerIdentity {
        CallerIdentity::new("auth0|1", "boss", Role::Manager)
    }

    fn task(worker: &str, date: &str) -> Task {
        TaskRequest {
            summary: "encrypted-ish".to_string(),
            date: date.to_string(),
        }
        .into_task(worker)
        .unwrap()
    }

    async fn seeded_store() -> MemoryTaskStore {
        let store = MemoryTaskStore::new();
        store.create(task("ana", "2022-05-01 09:00:00AM")).await.unwrap();
        store.create(task("ana", "2022-05-02 09:00:00AM")).await.unwrap();
        store.create(task("bruno", "2022-05-03 09:00:00AM")).await.unwrap();
        store
    }

    fn query(params: ListParams) -> ListQuery {
        ListQuery::build(&params, &manager()).unwrap()
    }

    #[tokio::test]
    async fn test_get_and_not_found() {
        let store = seeded_store().await;
        assert!(matches!(
            store.get(Uuid::new_v4()).await.unwrap_err(),
            StoreError::NotFound
        ));
    }

    #[tokio::test]
    async fn test_create_duplicate_id_conflicts() {
        let store = MemoryTaskStore::new();
        let t = task("ana", "2022-05-01 09:00:00AM");
        store.create(t.clone()).await.unwrap();
        assert!(matches!(
            store.create(t).await.unwrap_err(),
            StoreError::Conflict
        ));
    }

    #[tokio::test]
    async fn test_list_filters_by_worker_name() {
        let store = seeded_store().await;
        let mut filters = HashMap::new();
        filters.insert("worker_name".to_string(), "ana".to_string());
        let q = query(ListParams {
            filters,
            ..ListParams::default()
        });

        let tasks = store.list(&q).await.unwrap();
        assert_eq!(tasks.len(), 2);
        assert!(tasks.iter().all(|t| t.worker_name == "ana"));
    }

    #[tokio::test]
    async fn test_list_interval_filters() {
        let store = seeded_store().await;
        let mut filters = HashMap::new();
        filters.insert("after".to_string(), "2022-05-01 09:00:00AM".to_string());
        filters.insert("before".to_string(), "2022-05-03 09:00:00AM".to_string());
        let q = query(ListParams {
            filters,
            ..ListParams::default()
        });

        let tasks = store.list(&q).await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(
            tasks[0].date.format(crate::models::DATE_FORMAT).to_string(),
            "2022-05-02 09:00:00AM"
        );
    }

    #[tokio::test]
    async fn test_list_default_sort_is_date_descending() {
        let store = seeded_store().await;
        let tasks = store.list(&query(ListParams::default())).await.unwrap();
        assert_eq!(tasks.len(), 3);
        assert!(tasks.windows(2).all(|w| w[0].date >= w[1].date));
    }

    #[tokio::test]
    async fn test_list_sort_by_name_ascending() {
        let store = seeded_store().await;
        let q = query(ListParams {
            sort_by: Some("name".to_string()),
            sort_order: Some("asc".to_string()),
            ..ListParams::default()
        });
        let tasks = store.list(&q).await.unwrap();
        assert_eq!(tasks[0].worker_name, "ana");
        assert_eq!(tasks[2].worker_name, "bruno");
    }

    #[tokio::test]
    async fn test_list_returns_at_most_page_size_plus_one() {
        let store = MemoryTaskStore::new();
        for _ in 0..25 {
            store.create(task("ana", "2022-05-01 09:00:00AM")).await.unwrap();
        }

        let q = query(ListParams {
            page: Some("1".to_string()),
            page_size: Some("20".to_string()),
            ..ListParams::default()
        });
        let tasks = store.list(&q).await.unwrap();
        // 21 rows: the full page plus the look-ahead row.
        assert_eq!(tasks.len(), 21);
    }

    #[tokio::test]
    async fn test_list_second_page_window() {
        let store = MemoryTaskStore::new();
        for _ in 0..25 {
            store.create(task("ana", "2022-05-01 09:00:00AM")).await.unwrap();
        }

        let q = query(ListParams {
            page: Some("2".to_string()),
            page_size: Some("20".to_string()),
            ..ListParams::default()
        });
        let tasks = store.list(&q).await.unwrap();
        assert_eq!(tasks.len(), 5);
    }

    #[tokio::test]
    async fn test_update_compare_and_swap() {
        let store = seeded_store().await;
        let original = task("ana", "2022-06-01 10:00:00AM");
        store.create(original.clone()).await.unwrap();

        let mut next = original.clone();
        next.summary = "rewritten".to_string();
        let updated = store
            .update(original.id, original.clone(), next.clone())
            .await
            .unwrap();
        assert_eq!(updated.summary, "rewritten");

        // Stale previous snapshot loses the swap.
        let mut next2 = original.clone();
        next2.summary = "stale write".to_string();
        assert!(matches!(
            store.update(original.id, original, next2).await.unwrap_err(),
            StoreError::Conflict
        ));
    }

    #[tokio::test]
    async fn test_delete_missing_record() {
        let store = seeded_store().await;
        assert!(matches!(
            store.delete(Uuid::new_v4()).await.unwrap_err(),
            StoreError::NotFound
        ));
    }
}
