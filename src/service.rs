//! # Task Service
//!
//! Orchestrates one task operation end to end: structural validation first,
//! then the authorization policy (before the store where the decision needs
//! no record, after the fetch where it needs ownership), then the store, with
//! the crypto engine transforming the summary right at the store boundary.
//!
//! The summary is plaintext everywhere inside this module and ciphertext
//! everywhere inside the store. It is never logged in either form.

use tracing::debug;
use uuid::Uuid;

use crate::auth::CallerIdentity;
use crate::crypto::CryptoEngine;
use crate::error::{Result, SupervisorError};
use crate::models::{to_list_response, Task, TaskListResponse, TaskRequest, TaskResponse};
use crate::policy;
use crate::query::{ListParams, ListQuery};
use crate::store::TaskStore;

/// The orchestrator. Generic over the store so tests and embedded
/// deployments can run on the in-memory adapter.
pub struct TaskService<S> {
    store: S,
    crypto: CryptoEngine,
}

impl<S: TaskStore> TaskService<S> {
    pub fn new(store: S, crypto: CryptoEngine) -> Self {
        Self { store, crypto }
    }

    /// Fetch a single task. Managers may read any record, workers only their
    /// own; the summary comes back decrypted.
    pub async fn get_task(&self, caller: &CallerIdentity, id: &str) -> Result<TaskResponse> {
        let id = parse_task_id(id)?;
        debug!(task_id = %id, "fetching task");

        let mut task = self.store.get(id).await?;
        if !policy::can_read_task(caller, &task) {
            return Err(SupervisorError::Unauthorized);
        }

        task.summary = self.crypto.decrypt(&task.summary)?;
        Ok(task.to_response())
    }

    /// List tasks under the caller's scope. Workers are pinned to their own
    /// records regardless of any filter they pass; managers may filter by
    /// worker. The look-ahead row fetched for pagination never surfaces.
    pub async fn list_tasks(
        &self,
        caller: &CallerIdentity,
        params: &ListParams,
    ) -> Result<TaskListResponse> {
        let mut query = ListQuery::build(params, caller)?;
        if let Some(owner) = policy::list_scope(caller) {
            query.filters.worker_name = Some(owner.to_string());
        }

        debug!(
            page = query.pagination.page,
            page_size = query.pagination.page_size,
            "listing tasks"
        );

        let mut tasks = self.store.list(&query).await?;
        let page_size = query.pagination.page_size as usize;
        if tasks.len() > page_size {
            tasks.truncate(page_size);
        }
        for task in &mut tasks {
            task.summary = self.crypto.decrypt(&task.summary)?;
        }

        Ok(to_list_response(
            tasks,
            query.pagination.page,
            query.pagination.page_size,
        ))
    }

    /// Create a task. The owner is the caller, unless a manager passes an
    /// explicit worker to act on behalf of. The summary is encrypted before
    /// it touches the store.
    pub async fn create_task(
        &self,
        caller: &CallerIdentity,
        request: TaskRequest,
        on_behalf_of: Option<String>,
    ) -> Result<TaskResponse> {
        request.validate()?;

        let owner = policy::resolve_owner(caller, on_behalf_of.as_deref()).to_string();
        let mut task = request.into_task(&owner)?;
        debug!(task_id = %task.id, worker_name = %task.worker_name, "creating task");

        let plaintext = std::mem::take(&mut task.summary);
        task.summary = self.crypto.encrypt(&plaintext);

        let mut created = self.store.create(task).await?;
        created.summary = plaintext;
        Ok(created.to_response())
    }

    /// Update a task's content. Owner only; managers are deliberately not
    /// granted update. The stored row is swapped against the fetched snapshot
    /// so a concurrent write surfaces as a conflict.
    pub async fn update_task(
        &self,
        caller: &CallerIdentity,
        id: &str,
        request: TaskRequest,
    ) -> Result<TaskResponse> {
        let id = parse_task_id(id)?;
        request.validate()?;

        let existing = self.store.get(id).await?;
        if !policy::can_update_task(caller, &existing) {
            return Err(SupervisorError::Unauthorized);
        }

        debug!(task_id = %id, "updating task");

        let date = request.parse_date()?;
        let next = Task {
            id,
            worker_name: existing.worker_name.clone(),
            summary: self.crypto.encrypt(&request.summary),
            date,
        };

        let mut updated = self.store.update(id, existing, next).await?;
        updated.summary = request.summary;
        Ok(updated.to_response())
    }

    /// Delete a task. Managers only, and the role check comes first: a
    /// worker probing a missing id still gets the uniform denial.
    pub async fn delete_task(&self, caller: &CallerIdentity, id: &str) -> Result<()> {
        let id = parse_task_id(id)?;

        if !policy::can_delete_tasks(caller) {
            return Err(SupervisorError::Unauthorized);
        }

        debug!(task_id = %id, "deleting task");
        self.store.delete(id).await?;
        Ok(())
    }
}

fn parse_task_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id)
        .map_err(|_| SupervisorError::Validation("invalid task id format".to_string()))
}
