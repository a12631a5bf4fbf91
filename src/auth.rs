//! # Caller Identity
//!
//! The identity value handed to every core operation. Token verification and
//! claim extraction happen upstream at the transport layer; by the time a
//! request reaches the core it carries a validated [`CallerIdentity`].
//!
//! Ownership of task records is keyed on the caller's nickname, which is what
//! gets persisted in the `worker_name` column.

use serde::{Deserialize, Serialize};

/// Role claim carried by an authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Worker,
    Manager,
}

/// Validated identity of the caller, request-scoped and read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    /// Stable subject identifier from the token.
    pub subject: String,
    /// Display nickname; the ownership key for task records.
    pub nickname: String,
    pub role: Role,
}

impl CallerIdentity {
    pub fn new(subject: impl Into<String>, nickname: impl Into<String>, role: Role) -> Self {
        Self {
            subject: subject.into(),
            nickname: nickname.into(),
            role,
        }
    }

    pub fn is_manager(&self) -> bool {
        self.role == Role::Manager
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manager_check() {
        let worker = CallerIdentity::new("auth0|1", "ana", Role::Worker);
        let manager = CallerIdentity::new("auth0|2", "rui", Role::Manager);
        assert!(!worker.is_manager());
        assert!(manager.is_manager());
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Manager).unwrap(), "\"manager\"");
        assert_eq!(serde_json::to_string(&Role::Worker).unwrap(), "\"worker\"");
    }
}
