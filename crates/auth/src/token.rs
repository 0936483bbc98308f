//! Session token issuance and validation (HS256 JWT).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;

use bayu_core::{ErrorKind, UserId};

use crate::claims::{JwtClaims, TokenValidationError, validate_claims};
use crate::Role;

/// Lifetime of every issued token.
pub const TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// Why a token was rejected.
///
/// The HTTP boundary maps `Malformed`, `BadSignature` and `Expired` to the
/// same response; the distinction exists for server-side logging only.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,

    #[error("token signature or algorithm rejected")]
    BadSignature,

    #[error("token has expired")]
    Expired,

    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl TokenError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TokenError::Signing(_) => ErrorKind::Internal,
            _ => ErrorKind::Unauthenticated,
        }
    }
}

impl From<TokenValidationError> for TokenError {
    fn from(value: TokenValidationError) -> Self {
        match value {
            TokenValidationError::Expired => TokenError::Expired,
            TokenValidationError::InvalidTimeWindow => TokenError::Malformed,
        }
    }
}

/// Issues and validates session tokens.
///
/// `now` is passed in rather than read from the system clock so callers
/// (and tests) control the time axis.
pub trait TokenService: Send + Sync {
    fn issue(
        &self,
        user_id: UserId,
        email: &str,
        roles: &[Role],
        now: DateTime<Utc>,
    ) -> Result<String, TokenError>;

    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenError>;
}

/// HMAC-SHA256 token service keyed by a process-wide secret.
///
/// Only `HS256` is accepted on validation: a token whose header names any
/// other algorithm is rejected before its claims are looked at.
pub struct Hs256TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl Hs256TokenService {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let secret = secret.as_ref();

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked by `validate_claims` against the injected clock.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl: Duration::seconds(TOKEN_TTL_SECS),
        }
    }
}

impl core::fmt::Debug for Hs256TokenService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256TokenService")
            .field("algorithm", &Algorithm::HS256)
            .field("ttl_secs", &self.ttl.num_seconds())
            .finish_non_exhaustive()
    }
}

impl TokenService for Hs256TokenService {
    fn issue(
        &self,
        user_id: UserId,
        email: &str,
        roles: &[Role],
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = JwtClaims::new(user_id, email, roles.to_vec(), now, self.ttl);
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenError> {
        let data = decode::<JwtClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| classify_jwt_error(&e))?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

fn classify_jwt_error(err: &jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        JwtErrorKind::InvalidSignature
        | JwtErrorKind::InvalidAlgorithm
        | JwtErrorKind::InvalidAlgorithmName
        | JwtErrorKind::InvalidKeyFormat => TokenError::BadSignature,
        JwtErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Malformed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SECRET: &str = "test-secret-key-that-is-long-enough";

    fn service() -> Hs256TokenService {
        Hs256TokenService::new(SECRET)
    }

    fn forge(header: Header, claims: &serde_json::Value, secret: &str) -> String {
        encode(&header, claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    #[test]
    fn issued_token_validates_with_same_identity() {
        let svc = service();
        let now = Utc::now();
        let user_id = UserId::new();
        let roles = vec![Role::ADMIN, Role::USER];

        let token = svc.issue(user_id, "admin@example.com", &roles, now).unwrap();
        let claims = svc.validate(&token, now).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "admin@example.com");
        assert_eq!(claims.roles, roles);
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_SECS);
    }

    #[test]
    fn token_expires_after_ttl() {
        let svc = service();
        let issued = Utc::now() - Duration::hours(25);
        let token = svc.issue(UserId::new(), "u@example.com", &[Role::USER], issued).unwrap();

        assert_eq!(svc.validate(&token, Utc::now()), Err(TokenError::Expired));
        assert!(svc.validate(&token, issued + Duration::hours(23)).is_ok());
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let other = Hs256TokenService::new("a-completely-different-secret");
        let now = Utc::now();
        let token = other.issue(UserId::new(), "u@example.com", &[Role::ADMIN], now).unwrap();

        assert_eq!(service().validate(&token, now), Err(TokenError::BadSignature));
    }

    #[test]
    fn other_hmac_algorithm_is_rejected_even_with_right_secret() {
        let now = Utc::now();
        let claims = json!({
            "sub": UserId::new(),
            "email": "u@example.com",
            "roles": ["admin"],
            "iat": now.timestamp(),
            "exp": now.timestamp() + 60,
        });
        let token = forge(Header::new(Algorithm::HS384), &claims, SECRET);

        assert_eq!(service().validate(&token, now), Err(TokenError::BadSignature));
    }

    #[test]
    fn tampered_payload_fails_signature() {
        let svc = service();
        let now = Utc::now();
        let token = svc.issue(UserId::new(), "u@example.com", &[Role::USER], now).unwrap();

        let forged_claims = json!({
            "sub": UserId::new(),
            "email": "u@example.com",
            "roles": ["admin"],
            "iat": now.timestamp(),
            "exp": now.timestamp() + 60,
        });
        let forged = forge(Header::new(Algorithm::HS256), &forged_claims, "attacker");
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged_parts: Vec<&str> = forged.split('.').collect();
        parts[1] = forged_parts[1];
        let spliced = parts.join(".");

        assert_eq!(svc.validate(&spliced, now), Err(TokenError::BadSignature));
    }

    #[test]
    fn garbage_is_malformed() {
        let now = Utc::now();
        assert_eq!(service().validate("not-a-token", now), Err(TokenError::Malformed));
        assert_eq!(service().validate("a.b.c", now), Err(TokenError::Malformed));
    }

    #[test]
    fn single_string_role_is_accepted() {
        let now = Utc::now();
        let user_id = UserId::new();
        let claims = json!({
            "sub": user_id,
            "email": "u@example.com",
            "roles": "premium_user",
            "iat": now.timestamp(),
            "exp": now.timestamp() + 60,
        });
        let token = forge(Header::new(Algorithm::HS256), &claims, SECRET);

        let decoded = service().validate(&token, now).unwrap();
        assert_eq!(decoded.sub, user_id);
        assert_eq!(decoded.roles, vec![Role::PREMIUM_USER]);
    }

    #[test]
    fn non_string_roles_are_malformed() {
        let now = Utc::now();
        let claims = json!({
            "sub": UserId::new(),
            "email": "u@example.com",
            "roles": [1, 2],
            "iat": now.timestamp(),
            "exp": now.timestamp() + 60,
        });
        let token = forge(Header::new(Algorithm::HS256), &claims, SECRET);

        assert_eq!(service().validate(&token, now), Err(TokenError::Malformed));
    }

    #[test]
    fn missing_expiry_is_malformed() {
        let now = Utc::now();
        let claims = json!({
            "sub": UserId::new(),
            "email": "u@example.com",
            "roles": ["user"],
            "iat": now.timestamp(),
        });
        let token = forge(Header::new(Algorithm::HS256), &claims, SECRET);

        assert_eq!(service().validate(&token, now), Err(TokenError::Malformed));
    }

    #[test]
    fn errors_classify_as_unauthenticated_except_signing() {
        assert_eq!(TokenError::Expired.kind(), ErrorKind::Unauthenticated);
        assert_eq!(TokenError::BadSignature.kind(), ErrorKind::Unauthenticated);
        assert_eq!(TokenError::Signing("x".into()).kind(), ErrorKind::Internal);
    }
}
