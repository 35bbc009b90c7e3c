//! Caller identity supplied by the (external) identity layer.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The acting user and the account that owns their collection.
///
/// The orchestrator never authenticates; it only checks that both pieces
/// of context are present before creating a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: Uuid,

    /// The owning account. Absent for users not yet attached to an
    /// account; imports are rejected synchronously in that case.
    pub account_id: Option<Uuid>,
}

impl Session {
    /// A session with both identity and owning account.
    pub fn new(user_id: Uuid, account_id: Uuid) -> Self {
        Self {
            user_id,
            account_id: Some(account_id),
        }
    }

    /// A signed-in user with no owning account.
    pub fn without_account(user_id: Uuid) -> Self {
        Self {
            user_id,
            account_id: None,
        }
    }
}
