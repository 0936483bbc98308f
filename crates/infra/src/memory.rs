//! In-memory store adapters.
//!
//! Intended for tests/dev. Same observable semantics as the Postgres adapters:
//! unique emails and role names, session-log ids that only ever increase.

use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use bayu_auth::{Credential, CredentialStore, LogoutOutcome, Role, SessionLog, SessionLogEntry};
use bayu_core::{RoleId, SessionLogId, StoreError, StoreResult, UserId};

use crate::directory::{Directory, NewUser, RoleRecord, UserRecord};

fn poisoned<T>(_: PoisonError<T>) -> StoreError {
    StoreError::backend("lock poisoned")
}

#[derive(Debug, Clone)]
struct StoredUser {
    id: UserId,
    username: String,
    email: String,
    password_hash: String,
    role_id: RoleId,
}

#[derive(Debug, Default)]
struct Tables {
    roles: HashMap<RoleId, RoleRecord>,
    users: HashMap<UserId, StoredUser>,
}

impl Tables {
    fn credential(&self, user: &StoredUser) -> StoreResult<Credential> {
        let role = self
            .roles
            .get(&user.role_id)
            .ok_or_else(|| StoreError::backend(format!("user {} references missing role", user.id)))?;
        Ok(Credential {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            role_id: user.role_id,
            role_name: role.name.clone(),
        })
    }

    fn record(&self, user: &StoredUser) -> StoreResult<UserRecord> {
        let c = self.credential(user)?;
        Ok(UserRecord {
            id: c.id,
            username: c.username,
            email: c.email,
            role_id: c.role_id,
            role_name: c.role_name,
        })
    }
}

/// Users and roles held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    tables: RwLock<Tables>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Credential>> {
        let tables = self.tables.read().map_err(poisoned)?;
        tables
            .users
            .values()
            .find(|u| u.email == email)
            .map(|u| tables.credential(u))
            .transpose()
    }

    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<Credential>> {
        let tables = self.tables.read().map_err(poisoned)?;
        tables.users.get(&id).map(|u| tables.credential(u)).transpose()
    }
}

#[async_trait]
impl Directory for InMemoryUserStore {
    async fn ensure_role(&self, name: &str, description: &str) -> StoreResult<RoleId> {
        let mut tables = self.tables.write().map_err(poisoned)?;
        if let Some(existing) = tables.roles.values().find(|r| r.name.as_str() == name) {
            return Ok(existing.id);
        }

        let id = RoleId::new();
        tables.roles.insert(
            id,
            RoleRecord {
                id,
                name: Role::new(name.to_string()),
                description: Some(description.to_string()),
            },
        );
        Ok(id)
    }

    async fn find_role_by_name(&self, name: &str) -> StoreResult<Option<RoleRecord>> {
        let tables = self.tables.read().map_err(poisoned)?;
        Ok(tables.roles.values().find(|r| r.name.as_str() == name).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        let tables = self.tables.read().map_err(poisoned)?;
        tables
            .users
            .values()
            .find(|u| u.email == email)
            .map(|u| tables.record(u))
            .transpose()
    }

    async fn insert_user(&self, user: NewUser) -> StoreResult<UserId> {
        let mut tables = self.tables.write().map_err(poisoned)?;
        if !tables.roles.contains_key(&user.role_id) {
            return Err(StoreError::conflict(format!("unknown role {}", user.role_id)));
        }
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::conflict(format!("email already registered: {}", user.email)));
        }

        let id = UserId::new();
        tables.users.insert(
            id,
            StoredUser {
                id,
                username: user.username,
                email: user.email,
                password_hash: user.password_hash,
                role_id: user.role_id,
            },
        );
        Ok(id)
    }

    async fn list_users(&self) -> StoreResult<Vec<UserRecord>> {
        let tables = self.tables.read().map_err(poisoned)?;
        let mut out = tables
            .users
            .values()
            .map(|u| tables.record(u))
            .collect::<StoreResult<Vec<_>>>()?;
        out.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(out)
    }

    async fn list_roles(&self) -> StoreResult<Vec<RoleRecord>> {
        let tables = self.tables.read().map_err(poisoned)?;
        let mut out: Vec<RoleRecord> = tables.roles.values().cloned().collect();
        out.sort_by(|a, b| a.name.as_str().cmp(b.name.as_str()));
        Ok(out)
    }
}

#[derive(Debug, Default)]
struct LogTable {
    last_id: i64,
    entries: BTreeMap<SessionLogId, SessionLogEntry>,
}

/// Session log held in process memory.
#[derive(Debug, Default)]
pub struct InMemorySessionLog {
    inner: RwLock<LogTable>,
}

impl InMemorySessionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries still waiting for a logout.
    pub fn open_entries(&self) -> StoreResult<Vec<SessionLogEntry>> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.entries.values().filter(|e| e.is_open()).cloned().collect())
    }
}

#[async_trait]
impl SessionLog for InMemorySessionLog {
    async fn record_login(&self, user_id: UserId, at: DateTime<Utc>) -> StoreResult<SessionLogId> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        inner.last_id += 1;
        let id = SessionLogId::new(inner.last_id);
        inner.entries.insert(
            id,
            SessionLogEntry {
                id,
                user_id,
                login_at: at,
                logout_at: None,
            },
        );
        Ok(id)
    }

    async fn record_logout(&self, id: SessionLogId, at: DateTime<Utc>) -> StoreResult<LogoutOutcome> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        let entry = inner
            .entries
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(format!("session log entry {id}")))?;

        if entry.logout_at.is_some() {
            return Ok(LogoutOutcome::AlreadyClosed);
        }
        entry.logout_at = Some(at);
        Ok(LogoutOutcome::Closed)
    }

    async fn find(&self, id: SessionLogId) -> StoreResult<Option<SessionLogEntry>> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.entries.get(&id).cloned())
    }
}
