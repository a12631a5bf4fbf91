#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Supervisor Core
//!
//! Core of a record-keeping service for task entries created by workers and
//! reviewed by managers: an access-controlled, paginated, sorted, filtered
//! query layer with field-level encryption of the task summary.
//!
//! ## Architecture
//!
//! Transport, token verification and storage wiring live outside this crate.
//! A request arrives as a validated [`auth::CallerIdentity`] plus typed
//! input; the [`service::TaskService`] then runs policy checks, query
//! normalization, store access and the crypto transform in a fixed order.
//!
//! ## Module Organization
//!
//! - [`crypto`] - AES-CFB encryption of the summary field
//! - [`query`] - validated list queries: filters, sort, pagination
//! - [`policy`] - pure role/ownership decision functions
//! - [`store`] - `TaskStore` trait with PostgreSQL and in-memory adapters
//! - [`service`] - per-operation orchestration
//! - [`models`] - the task record and its request/response shapes
//! - [`auth`] / [`config`] / [`error`] / [`logging`] - identity, env
//!   configuration, error taxonomy, tracing setup

pub mod auth;
pub mod config;
pub mod crypto;
pub mod error;
pub mod logging;
pub mod models;
pub mod policy;
pub mod query;
pub mod service;
pub mod store;

pub use auth::{CallerIdentity, Role};
pub use config::SupervisorConfig;
pub use crypto::CryptoEngine;
pub use error::{Result, SupervisorError};
pub use models::{Task, TaskListResponse, TaskRequest, TaskResponse};
pub use query::{ListParams, ListQuery};
pub use service::TaskService;
pub use store::{MemoryTaskStore, PgTaskStore, TaskStore};
