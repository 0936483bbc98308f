//! Read-mostly view over users and roles, used by seeding and the admin listings.

use async_trait::async_trait;
use serde::Serialize;

use bayu_auth::Role;
use bayu_core::{RoleId, StoreResult, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleRecord {
    pub id: RoleId,
    pub name: Role,
    pub description: Option<String>,
}

/// A user joined with its role. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub role_id: RoleId,
    pub role_name: Role,
}

#[derive(Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role_id: RoleId,
}

impl core::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("role_id", &self.role_id)
            .finish_non_exhaustive()
    }
}

#[async_trait]
pub trait Directory: Send + Sync {
    /// Insert the role if no role with `name` exists; return its id either way.
    async fn ensure_role(&self, name: &str, description: &str) -> StoreResult<RoleId>;

    async fn find_role_by_name(&self, name: &str) -> StoreResult<Option<RoleRecord>>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>>;

    /// Fails with `StoreError::Conflict` on a duplicate email or an unknown role.
    async fn insert_user(&self, user: NewUser) -> StoreResult<UserId>;

    /// All users, ordered by username.
    async fn list_users(&self) -> StoreResult<Vec<UserRecord>>;

    /// All roles, ordered by name.
    async fn list_roles(&self) -> StoreResult<Vec<RoleRecord>>;
}
