//! `bayu-auth`: credential verification, session tokens and role checks.
//!
//! This crate is decoupled from HTTP and from any particular database: stores
//! are reached through the [`CredentialStore`] and [`SessionLog`] traits.

pub mod authorize;
pub mod claims;
pub mod credential;
pub mod login;
pub mod password;
pub mod roles;
pub mod session_log;
pub mod token;

pub use authorize::{AuthzError, require_any_role};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use credential::{Credential, CredentialStore};
pub use login::{Authenticator, LoginError, LoginSuccess};
pub use password::{Argon2PasswordHasher, HashingError, PasswordHasher};
pub use roles::{Role, RolePolicy};
pub use session_log::{LogoutOutcome, SessionLog, SessionLogEntry};
pub use token::{Hs256TokenService, TOKEN_TTL_SECS, TokenError, TokenService};
