//! Login and logout orchestration.
//!
//! Control flow for a login: credential lookup, password verify, token issue,
//! then a best-effort session-log insert.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use bayu_core::{ErrorKind, SessionLogId, StoreError};

use crate::{
    Credential, CredentialStore, HashingError, LogoutOutcome, PasswordHasher, Role, SessionLog,
    TokenError, TokenService,
};

#[derive(Debug, Error)]
pub enum LoginError {
    /// Unknown email or wrong password. Callers see the same message for both.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Hashing(#[from] HashingError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LoginError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LoginError::InvalidCredentials => ErrorKind::Unauthenticated,
            LoginError::Token(e) => e.kind(),
            LoginError::Hashing(e) => e.kind(),
            // A failed lookup is an outage, not an authentication outcome.
            LoginError::Store(_) => ErrorKind::Internal,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoginSuccess {
    pub token: String,
    pub credential: Credential,
    pub roles: Vec<Role>,
    /// `None` when the session-log insert failed; the login still stands.
    pub session_log_id: Option<SessionLogId>,
}

/// Wires the credential store, hasher, token service and session log together.
#[derive(Clone)]
pub struct Authenticator {
    credentials: Arc<dyn CredentialStore>,
    sessions: Arc<dyn SessionLog>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenService>,
    /// Verified against when the email is unknown, so both rejection paths
    /// pay for one hash verification.
    dummy_hash: Arc<str>,
}

const DUMMY_PASSWORD: &str = "bayu-unknown-account";

impl Authenticator {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        sessions: Arc<dyn SessionLog>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        let dummy_hash = match hasher.hash(DUMMY_PASSWORD) {
            Ok(hash) => Arc::from(hash),
            Err(e) => {
                tracing::warn!(error = %e, "failed to precompute dummy password hash");
                Arc::from("")
            }
        };

        Self {
            credentials,
            sessions,
            hasher,
            tokens,
            dummy_hash,
        }
    }

    pub fn tokens(&self) -> &Arc<dyn TokenService> {
        &self.tokens
    }

    pub async fn login(
        &self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<LoginSuccess, LoginError> {
        let Some(credential) = self.credentials.find_by_email(email).await? else {
            let _ = self.verify_off_reactor(&self.dummy_hash, password).await?;
            tracing::debug!("login rejected: unknown email");
            return Err(LoginError::InvalidCredentials);
        };

        if !self.verify_off_reactor(&credential.password_hash, password).await? {
            tracing::debug!(user_id = %credential.id, "login rejected: password mismatch");
            return Err(LoginError::InvalidCredentials);
        }

        let roles = credential.roles();
        let token = self.tokens.issue(credential.id, &credential.email, &roles, now)?;

        let session_log_id = match self.sessions.record_login(credential.id, now).await {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!(user_id = %credential.id, error = %e, "failed to record login");
                None
            }
        };

        tracing::info!(user_id = %credential.id, "user logged in");

        Ok(LoginSuccess {
            token,
            credential,
            roles,
            session_log_id,
        })
    }

    /// Close the session-log entry the client echoed back.
    ///
    /// Errors are returned to the caller; the HTTP layer reports success to the
    /// client regardless.
    pub async fn logout(
        &self,
        id: SessionLogId,
        now: DateTime<Utc>,
    ) -> Result<LogoutOutcome, StoreError> {
        self.sessions.record_logout(id, now).await
    }

    async fn verify_off_reactor(&self, stored_hash: &str, password: &str) -> Result<bool, LoginError> {
        let hasher = Arc::clone(&self.hasher);
        let stored_hash = stored_hash.to_owned();
        let password = password.to_owned();

        tokio::task::spawn_blocking(move || hasher.verify(&stored_hash, &password))
            .await
            .map_err(|e| LoginError::Hashing(HashingError::Primitive(e.to_string())))
    }
}
