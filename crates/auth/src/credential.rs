use async_trait::async_trait;

use bayu_core::{RoleId, StoreResult, UserId};

use crate::Role;

/// A stored user record as seen by the login flow.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role_id: RoleId,
    pub role_name: Role,
}

impl Credential {
    /// The roles carried into a token for this user. Users hold exactly one.
    pub fn roles(&self) -> Vec<Role> {
        vec![self.role_name.clone()]
    }
}

impl core::fmt::Debug for Credential {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Credential")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("role_id", &self.role_id)
            .field("role_name", &self.role_name)
            .finish()
    }
}

/// Read access to user credentials joined with their role.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Exact, case-sensitive match on email.
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Credential>>;

    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<Credential>>;
}
