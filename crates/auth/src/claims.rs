use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use bayu_core::UserId;

use crate::Role;

/// Claims carried by a session token.
///
/// Tokens are stateless: nothing about an issued token is persisted, every
/// request reconstructs these claims from the signed payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (user identifier).
    pub sub: UserId,

    pub email: String,

    /// Granted roles. Accepts either a list of strings or a single string.
    #[serde(deserialize_with = "deserialize_roles")]
    pub roles: Vec<Role>,

    /// Issued-at, unix seconds.
    pub iat: i64,

    /// Expiry, unix seconds.
    pub exp: i64,
}

impl JwtClaims {
    pub fn new(
        sub: UserId,
        email: impl Into<String>,
        roles: Vec<Role>,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            sub,
            email: email.into(),
            roles,
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
        }
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,
}

/// Check the time window of already-verified claims against `now`.
///
/// A token is live while `now < exp`.
pub fn validate_claims(claims: &JwtClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now.timestamp() >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RoleClaim {
    Many(Vec<String>),
    One(String),
}

fn deserialize_roles<'de, D>(deserializer: D) -> Result<Vec<Role>, D::Error>
where
    D: Deserializer<'de>,
{
    let names = match RoleClaim::deserialize(deserializer)? {
        RoleClaim::Many(names) => names,
        RoleClaim::One(name) => vec![name],
    };

    let mut roles: Vec<Role> = Vec::with_capacity(names.len());
    for name in names {
        let role = Role::from(name);
        if !roles.contains(&role) {
            roles.push(role);
        }
    }
    Ok(roles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims_at(now: DateTime<Utc>) -> JwtClaims {
        JwtClaims::new(UserId::new(), "a@example.com", vec![Role::USER], now, Duration::hours(24))
    }

    #[test]
    fn fresh_claims_are_valid() {
        let now = Utc::now();
        assert_eq!(validate_claims(&claims_at(now), now), Ok(()));
    }

    #[test]
    fn claims_expire_at_exp() {
        let now = Utc::now();
        let claims = claims_at(now);
        let at_exp = claims.expires_at().unwrap();
        assert_eq!(validate_claims(&claims, at_exp), Err(TokenValidationError::Expired));
        assert_eq!(
            validate_claims(&claims, at_exp - Duration::seconds(1)),
            Ok(())
        );
    }

    #[test]
    fn inverted_window_is_rejected() {
        let now = Utc::now();
        let mut claims = claims_at(now);
        claims.exp = claims.iat;
        assert_eq!(
            validate_claims(&claims, now),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }

    #[test]
    fn roles_accept_list_or_single_string() {
        let sub = UserId::new();
        let listed: JwtClaims = serde_json::from_value(json!({
            "sub": sub, "email": "a@example.com", "roles": ["admin", "user", "admin"], "iat": 1, "exp": 2
        }))
        .unwrap();
        assert_eq!(listed.roles, vec![Role::ADMIN, Role::USER]);

        let single: JwtClaims = serde_json::from_value(json!({
            "sub": sub, "email": "a@example.com", "roles": "admin", "iat": 1, "exp": 2
        }))
        .unwrap();
        assert_eq!(single.roles, vec![Role::ADMIN]);
    }

    #[test]
    fn heterogeneous_roles_fail_extraction() {
        let result = serde_json::from_value::<JwtClaims>(json!({
            "sub": UserId::new(), "email": "a@example.com", "roles": ["admin", 7], "iat": 1, "exp": 2
        }));
        assert!(result.is_err());

        let result = serde_json::from_value::<JwtClaims>(json!({
            "sub": UserId::new(), "email": "a@example.com", "roles": {"admin": true}, "iat": 1, "exp": 2
        }));
        assert!(result.is_err());
    }
}
