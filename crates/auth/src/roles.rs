use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role name used for RBAC.
///
/// Roles are opaque strings at this layer; the catalogue of known roles lives
/// in the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub const ADMIN: Role = Role(Cow::Borrowed("admin"));
    pub const USER: Role = Role(Cow::Borrowed("user"));
    pub const PREMIUM_USER: Role = Role(Cow::Borrowed("premium_user"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for Role {
    fn from(value: &'static str) -> Self {
        Self(Cow::Borrowed(value))
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        Self(Cow::Owned(value))
    }
}

/// Roles required to reach a route.
///
/// Satisfied when the caller holds *any* of the listed roles (logical OR).
/// Order is preserved and duplicates are dropped. An empty policy is never
/// satisfied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolePolicy {
    required: Vec<Role>,
}

impl RolePolicy {
    pub fn any_of<I, R>(roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Role>,
    {
        let mut required: Vec<Role> = Vec::new();
        for role in roles {
            let role = role.into();
            if !required.contains(&role) {
                required.push(role);
            }
        }
        Self { required }
    }

    pub fn admin_only() -> Self {
        Self::any_of([Role::ADMIN])
    }

    pub fn required(&self) -> &[Role] {
        &self.required
    }

    pub fn is_satisfied_by(&self, granted: &[Role]) -> bool {
        self.required.iter().any(|r| granted.contains(r))
    }
}
