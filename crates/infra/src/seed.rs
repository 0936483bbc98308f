//! Idempotent start-up seeding of the role catalogue and the default admin.

use std::sync::Arc;

use thiserror::Error;

use bayu_auth::{HashingError, PasswordHasher, Role};
use bayu_core::{StoreError, UserId};

use crate::config::AppConfig;
use crate::directory::{Directory, NewUser};

pub const DEFAULT_ADMIN_USERNAME: &str = "AdminUser";

/// Role catalogue: `(name, description)`.
pub const DEFAULT_ROLES: [(&str, &str); 3] = [
    ("admin", "Administrator role with full system access."),
    ("user", "Standard user role with general access."),
    ("premium_user", "User with premium features."),
];

#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Hashing(#[from] HashingError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Created(UserId),
    AlreadyPresent(UserId),
    /// The `admin` role does not exist, so no admin user was created.
    SkippedMissingRole,
}

pub async fn seed_roles(directory: &dyn Directory) -> Result<(), SeedError> {
    for (name, description) in DEFAULT_ROLES {
        let id = directory.ensure_role(name, description).await?;
        tracing::debug!(role = name, role_id = %id, "role ensured");
    }
    Ok(())
}

/// Create the admin user `email` with `password` unless a user with that
/// email already exists.
pub async fn seed_admin(
    directory: &dyn Directory,
    hasher: Arc<dyn PasswordHasher>,
    email: &str,
    password: &str,
) -> Result<SeedOutcome, SeedError> {
    let Some(admin_role) = directory.find_role_by_name(Role::ADMIN.as_str()).await? else {
        tracing::warn!("'admin' role not found, skipping admin user seed");
        return Ok(SeedOutcome::SkippedMissingRole);
    };

    if let Some(existing) = directory.find_user_by_email(email).await? {
        tracing::info!(user_id = %existing.id, "admin user already present");
        return Ok(SeedOutcome::AlreadyPresent(existing.id));
    }

    let password_hash = hash_off_reactor(hasher, password).await?;
    let id = directory
        .insert_user(NewUser {
            username: DEFAULT_ADMIN_USERNAME.to_string(),
            email: email.to_string(),
            password_hash,
            role_id: admin_role.id,
        })
        .await?;

    tracing::info!(user_id = %id, role_id = %admin_role.id, "admin user seeded");
    Ok(SeedOutcome::Created(id))
}

/// Roles first, then the admin from `AUTH_EMAIL` / `AUTH_PASSWORD`.
pub async fn seed_defaults(
    directory: &dyn Directory,
    hasher: Arc<dyn PasswordHasher>,
    config: &AppConfig,
) -> Result<SeedOutcome, SeedError> {
    seed_roles(directory).await?;
    seed_admin(directory, hasher, &config.auth_email, &config.auth_password).await
}

async fn hash_off_reactor(hasher: Arc<dyn PasswordHasher>, password: &str) -> Result<String, SeedError> {
    let password = password.to_owned();
    let hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|e| HashingError::Primitive(e.to_string()))??;
    Ok(hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::thread::ThreadId;

    use crate::memory::InMemoryUserStore;
    use bayu_auth::{Argon2PasswordHasher, CredentialStore};

    fn argon2() -> Arc<dyn PasswordHasher> {
        Arc::new(Argon2PasswordHasher::new())
    }

    /// Records which thread each `hash` call ran on.
    #[derive(Default)]
    struct ThreadRecordingHasher {
        inner: Argon2PasswordHasher,
        hashed_on: Mutex<Vec<ThreadId>>,
    }

    impl PasswordHasher for ThreadRecordingHasher {
        fn hash(&self, plaintext: &str) -> Result<String, HashingError> {
            self.hashed_on.lock().unwrap().push(std::thread::current().id());
            self.inner.hash(plaintext)
        }

        fn verify(&self, stored_hash: &str, plaintext: &str) -> bool {
            self.inner.verify(stored_hash, plaintext)
        }
    }

    #[tokio::test]
    async fn seeding_twice_creates_one_admin() {
        let store = InMemoryUserStore::new();
        let config = AppConfig::default();

        let first = seed_defaults(&store, argon2(), &config).await.unwrap();
        let second = seed_defaults(&store, argon2(), &config).await.unwrap();

        let SeedOutcome::Created(id) = first else {
            panic!("expected admin to be created, got {first:?}");
        };
        assert_eq!(second, SeedOutcome::AlreadyPresent(id));

        let roles = store.list_roles().await.unwrap();
        assert_eq!(roles.len(), DEFAULT_ROLES.len());

        let users = store.list_users().await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].username, DEFAULT_ADMIN_USERNAME);
        assert_eq!(users[0].role_name, Role::ADMIN);
    }

    #[tokio::test]
    async fn seeded_password_verifies() {
        let store = InMemoryUserStore::new();
        let hasher = argon2();
        seed_defaults(&store, hasher.clone(), &AppConfig::default()).await.unwrap();

        let cred = store.find_by_email("user@example.com").await.unwrap().unwrap();
        assert!(hasher.verify(&cred.password_hash, "password"));
    }

    #[tokio::test]
    async fn admin_seed_is_skipped_without_admin_role() {
        let store = InMemoryUserStore::new();
        store.ensure_role("user", "u").await.unwrap();

        let outcome = seed_admin(&store, argon2(), "a@example.com", "pw")
            .await
            .unwrap();
        assert_eq!(outcome, SeedOutcome::SkippedMissingRole);
        assert!(store.list_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn admin_password_is_hashed_off_the_runtime_thread() {
        let store = InMemoryUserStore::new();
        let hasher = Arc::new(ThreadRecordingHasher::default());

        seed_defaults(&store, hasher.clone(), &AppConfig::default()).await.unwrap();

        let hashed_on = hasher.hashed_on.lock().unwrap().clone();
        assert_eq!(hashed_on.len(), 1);
        assert_ne!(hashed_on[0], std::thread::current().id());

        let cred = store.find_by_email("user@example.com").await.unwrap().unwrap();
        assert!(hasher.verify(&cred.password_hash, "password"));
    }
}
