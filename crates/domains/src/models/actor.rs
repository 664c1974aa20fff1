use serde::{Deserialize, Serialize};

use super::{Role, UserId};

/// The authenticated caller of an operation.
///
/// Produced by the authentication adapter from a bearer credential; the core
/// treats it as an opaque (id, role) pair for ownership checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: UserId,
    pub role: Role,
}

impl Actor {
    pub const fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// True when the actor is `owner` or an administrator.
    pub fn owns_or_admin(&self, owner: UserId) -> bool {
        self.id == owner || self.is_admin()
    }
}
