//! # Task Model
//!
//! The task record plus its request/response shapes.
//!
//! ## Overview
//!
//! A `Task` is a work entry authored by a worker and reviewed by managers.
//! The summary column is encrypted at rest; everywhere inside business logic
//! it is plaintext, and the [`crate::service`] layer owns the transform at
//! the store boundary.
//!
//! ## Database Schema
//!
//! Maps to the `tasks` table:
//! - `id`: UUID primary key, assigned at creation, immutable
//! - `worker_name`: owning worker, immutable after creation
//! - `summary`: encrypted envelope (TEXT), ≤ 2500 plaintext characters
//! - `date`: TIMESTAMP, required
//!
//! Dates cross the API boundary as strings in one fixed format,
//! `2022-05-23 03:33:01PM`; the same format is used on the way out.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::{Result, SupervisorError};

/// Wire format for task dates, in and out.
pub const DATE_FORMAT: &str = "%Y-%m-%d %I:%M:%S%p";

/// Maximum plaintext summary length, in characters.
pub const MAX_SUMMARY_CHARS: usize = 2500;

const INVALID_DATE_MSG: &str = "invalid date format, use yyyy-mm-dd hh:mm:ssPM";

/// A persisted task record. The summary carried here matches whatever layer
/// holds it: ciphertext inside the store, plaintext inside the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub worker_name: String,
    pub summary: String,
    pub date: NaiveDateTime,
}

impl Task {
    /// Project into the caller-facing response shape.
    pub fn to_response(&self) -> TaskResponse {
        TaskResponse {
            id: self.id,
            worker_name: self.worker_name.clone(),
            summary: self.summary.clone(),
            date: self.date.format(DATE_FORMAT).to_string(),
        }
    }
}

/// Caller-supplied body for create and update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRequest {
    pub summary: String,
    pub date: String,
}

impl TaskRequest {
    /// Structural validation: date must parse under [`DATE_FORMAT`] and the
    /// summary must fit the column.
    pub fn validate(&self) -> Result<()> {
        self.parse_date()?;

        if self.summary.chars().count() > MAX_SUMMARY_CHARS {
            return Err(SupervisorError::Validation(format!(
                "summary max size is {MAX_SUMMARY_CHARS} characters"
            )));
        }

        Ok(())
    }

    /// Parse the date field under the fixed wire format.
    pub fn parse_date(&self) -> Result<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.date, DATE_FORMAT)
            .map_err(|_| SupervisorError::Validation(INVALID_DATE_MSG.to_string()))
    }

    /// Build a new record owned by `worker_name`. Identifiers are generated
    /// here, at the request layer, so a retried create carries a new id and
    /// `Conflict` from the store always means a genuine duplicate.
    pub fn into_task(self, worker_name: &str) -> Result<Task> {
        let date = self.parse_date()?;

        Ok(Task {
            id: Uuid::new_v4(),
            worker_name: worker_name.to_string(),
            summary: self.summary,
            date,
        })
    }
}

/// Single-task response shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResponse {
    pub id: Uuid,
    pub worker_name: String,
    pub summary: String,
    pub date: String,
}

/// Page of task responses plus pagination metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskListResponse {
    pub data: Vec<TaskResponse>,
    pub metadata: Metadata,
}

/// Pagination metadata echoed back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub page: u32,
    pub page_size: u32,
}

/// Assemble a list response, trimming the look-ahead row if the store
/// returned one. The extra row exists only to signal that further pages
/// exist; it never appears in output.
pub fn to_list_response(mut tasks: Vec<Task>, page: u32, page_size: u32) -> TaskListResponse {
    if tasks.len() > page_size as usize {
        tasks.truncate(page_size as usize);
    }

    TaskListResponse {
        data: tasks.iter().map(Task::to_response).collect(),
        metadata: Metadata { page, page_size },
    }
}
