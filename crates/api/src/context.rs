use bayu_auth::{JwtClaims, Role};
use bayu_core::UserId;

/// Principal context for a request (authenticated identity + roles).
///
/// Inserted into request extensions by the authentication stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    user_id: UserId,
    email: String,
    roles: Vec<Role>,
}

impl PrincipalContext {
    pub fn new(user_id: UserId, email: impl Into<String>, roles: Vec<Role>) -> Self {
        Self {
            user_id,
            email: email.into(),
            roles,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }
}

impl From<JwtClaims> for PrincipalContext {
    fn from(claims: JwtClaims) -> Self {
        Self::new(claims.sub, claims.email, claims.roles)
    }
}
