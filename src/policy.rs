//! # Authorization Policy
//!
//! Pure decision functions over caller identity, an optional record, and the
//! operation kind. No I/O, no ambient state: the service layer fetches
//! whatever record a decision needs and passes it in, which keeps every rule
//! here unit-testable in isolation.
//!
//! Update deliberately excludes managers: only the owning worker may edit
//! content, while managers hold cross-owner read and delete rights. Denials
//! all collapse into the one [`crate::error::SupervisorError::Unauthorized`]
//! outcome upstream, so wrong-role and wrong-owner are indistinguishable to
//! the caller.

use crate::auth::CallerIdentity;
use crate::models::Task;

/// Read a single record: managers, or the record's owner.
pub fn can_read_task(caller: &CallerIdentity, task: &Task) -> bool {
    caller.is_manager() || caller.nickname == task.worker_name
}

/// Edit a record: the owner, and only the owner.
pub fn can_update_task(caller: &CallerIdentity, task: &Task) -> bool {
    caller.nickname == task.worker_name
}

/// Delete records: managers only.
pub fn can_delete_tasks(caller: &CallerIdentity) -> bool {
    caller.is_manager()
}

/// Owner scope forced onto list queries. Managers see everything (`None`);
/// workers are pinned to their own records, overriding any filter they tried
/// to pass.
pub fn list_scope(caller: &CallerIdentity) -> Option<&str> {
    if caller.is_manager() {
        None
    } else {
        Some(caller.nickname.as_str())
    }
}

/// Owner of a record being created. Managers may act on behalf of an explicit
/// target worker; everyone else creates for themselves.
pub fn resolve_owner<'a>(caller: &'a CallerIdentity, target: Option<&'a str>) -> &'a str {
    match target {
        Some(worker) if caller.is_manager() => worker,
        _ => caller.nickname.as_str(),
    }
}
