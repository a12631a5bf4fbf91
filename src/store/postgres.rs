//! PostgreSQL [`TaskStore`] adapter built on sqlx.
//!
//! List queries are assembled at runtime from a validated
//! [`crate::query::ListQuery`]: filter conditions become numbered bind
//! parameters, while the ORDER BY column and direction come from the
//! builder's closed enums and the LIMIT/OFFSET window from its computed
//! integers, so no caller-controlled string ever reaches the SQL text.
//!
//! Expects the `tasks` table:
//!
//! ```sql
//! CREATE TABLE tasks (
//!   id UUID PRIMARY KEY,
//!   worker_name VARCHAR NOT NULL,
//!   summary TEXT NOT NULL,
//!   date TIMESTAMP NOT NULL
//! );
//! ```

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{StoreError, TaskStore};
use crate::models::Task;
use crate::query::ListQuery;

/// SQLSTATE for unique-constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

/// Task store backed by a PostgreSQL connection pool.
#[derive(Debug, Clone)]
pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_error(err: sqlx::Error) -> StoreError {
        match &err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                StoreError::Conflict
            }
            _ => StoreError::Backend(err.to_string()),
        }
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn get(&self, id: Uuid) -> Result<Task, StoreError> {
        sqlx::query_as::<_, Task>(
            "SELECT id, worker_name, summary, date FROM tasks WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Self::map_error)?
        .ok_or(StoreError::NotFound)
    }

    async fn create(&self, task: Task) -> Result<Task, StoreError> {
        sqlx::query_as::<_, Task>(
            r"
            INSERT INTO tasks (id, worker_name, summary, date)
            VALUES ($1, $2, $3, $4)
            RETURNING id, worker_name, summary, date
            ",
        )
        .bind(task.id)
        .bind(&task.worker_name)
        .bind(&task.summary)
        .bind(task.date)
        .fetch_one(&self.pool)
        .await
        .map_err(Self::map_error)
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<Task>, StoreError> {
        let sql = build_list_sql(query);

        let mut q = sqlx::query_as::<_, Task>(&sql);
        if let Some(worker_name) = &query.filters.worker_name {
            q = q.bind(worker_name);
        }
        if let Some(before) = query.filters.before {
            q = q.bind(before);
        }
        if let Some(after) = query.filters.after {
            q = q.bind(after);
        }

        q.fetch_all(&self.pool).await.map_err(Self::map_error)
    }

    async fn update(&self, id: Uuid, previous: Task, next: Task) -> Result<Task, StoreError> {
        let updated = sqlx::query_as::<_, Task>(
            r"
            UPDATE tasks
            SET summary = $1, date = $2
            WHERE id = $3 AND summary = $4 AND date = $5
            RETURNING id, worker_name, summary, date
            ",
        )
        .bind(&next.summary)
        .bind(next.date)
        .bind(id)
        .bind(&previous.summary)
        .bind(previous.date)
        .fetch_optional(&self.pool)
        .await
        .map_err(Self::map_error)?;

        match updated {
            Some(task) => Ok(task),
            // Row missing or snapshot stale; distinguish by existence.
            None => {
                self.get(id).await?;
                Err(StoreError::Conflict)
            }
        }
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Self::map_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

/// Assemble the list statement. Bind parameters are numbered in the same
/// order the adapter binds them: worker_name, before, after.
fn build_list_sql(query: &ListQuery) -> String {
    let mut conditions = Vec::new();
    let mut bind_index = 0u32;

    if query.filters.worker_name.is_some() {
        bind_index += 1;
        conditions.push(format!("worker_name = ${bind_index}"));
    }
    if query.filters.before.is_some() {
        bind_index += 1;
        conditions.push(format!("date < ${bind_index}"));
    }
    if query.filters.after.is_some() {
        bind_index += 1;
        conditions.push(format!("date > ${bind_index}"));
    }

    let mut sql = String::from("SELECT id, worker_name, summary, date FROM tasks");
    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }

    let (offset, limit) = query.offset_limit();
    sql.push_str(&format!(
        " ORDER BY {} {} LIMIT {limit} OFFSET {offset}",
        query.sort.by.column(),
        query.sort.order.as_sql(),
    ));

    sql
}
