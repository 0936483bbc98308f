//! Service wiring: which store adapters back the API.

use std::sync::Arc;

use sqlx::PgPool;

use bayu_auth::{
    Argon2PasswordHasher, Authenticator, CredentialStore, Hs256TokenService, PasswordHasher,
    SessionLog, TokenService,
};
use bayu_infra::{
    AppConfig, Directory, InMemorySessionLog, InMemoryUserStore, PostgresSessionLog,
    PostgresUserStore, SeedError, SeedOutcome, seed_defaults,
};

#[derive(Clone)]
pub struct AppServices {
    pub authenticator: Authenticator,
    pub tokens: Arc<dyn TokenService>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub directory: Arc<dyn Directory>,
    pub sessions: Arc<dyn SessionLog>,
}

impl AppServices {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        directory: Arc<dyn Directory>,
        sessions: Arc<dyn SessionLog>,
        jwt_secret: &str,
    ) -> Self {
        let tokens: Arc<dyn TokenService> = Arc::new(Hs256TokenService::new(jwt_secret));
        let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2PasswordHasher::new());
        let authenticator = Authenticator::new(
            credentials,
            Arc::clone(&sessions),
            Arc::clone(&hasher),
            Arc::clone(&tokens),
        );

        Self {
            authenticator,
            tokens,
            hasher,
            directory,
            sessions,
        }
    }

    pub fn postgres(pool: PgPool, config: &AppConfig) -> Self {
        let users = Arc::new(PostgresUserStore::new(pool.clone()));
        let sessions = Arc::new(PostgresSessionLog::new(pool));
        Self::new(users.clone(), users, sessions, &config.jwt_secret)
    }

    /// Process-local stores, for tests and running without a database.
    pub fn in_memory(config: &AppConfig) -> Self {
        let users = Arc::new(InMemoryUserStore::new());
        let sessions = Arc::new(InMemorySessionLog::new());
        Self::new(users.clone(), users, sessions, &config.jwt_secret)
    }

    /// Ensure the role catalogue and the configured admin user exist.
    pub async fn seed(&self, config: &AppConfig) -> Result<SeedOutcome, SeedError> {
        seed_defaults(self.directory.as_ref(), Arc::clone(&self.hasher), config).await
    }
}
