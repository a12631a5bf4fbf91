//! # Error Taxonomy
//!
//! Structured error handling for the supervisor core. Every operation surfaces
//! one of these variants; nothing is silently discarded. Validation messages
//! are stable strings that callers may rely on.

use thiserror::Error;

use crate::crypto::CryptoError;
use crate::store::StoreError;

/// Errors surfaced by the supervisor core.
///
/// When several failures could apply to one request, they surface in priority
/// order: validation, then not-found, then authorization, then conflict.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// Malformed caller input: bad id, bad date, oversized summary, bad
    /// pagination or sort parameters. The message is caller-facing.
    #[error("{0}")]
    Validation(String),

    /// The requested record does not exist. Only surfaced where the caller is
    /// allowed to learn that.
    #[error("task not found")]
    NotFound,

    /// Policy denial. Deliberately uniform: wrong role and wrong owner are
    /// indistinguishable from the outside.
    #[error("unauthorized")]
    Unauthorized,

    /// Unique-constraint violation or lost compare-and-swap on write.
    #[error("conflict writing task")]
    Conflict,

    /// Field encryption failure. On stored data this is a data-integrity
    /// error; on construction (bad key) it is fatal configuration.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Opaque backing-store failure, surfaced immediately without retry.
    #[error("store error: {0}")]
    Store(String),
}

impl From<StoreError> for SupervisorError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => SupervisorError::NotFound,
            StoreError::Conflict => SupervisorError::Conflict,
            StoreError::Backend(msg) => SupervisorError::Store(msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, SupervisorError>;
