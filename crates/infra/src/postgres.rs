//! Postgres-backed store adapters.
//!
//! ## Error Mapping
//!
//! SQLx errors are mapped to `StoreError` by SQLSTATE code, never by message:
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (foreign key violation) | `23503` | `Conflict` |
//! | Database (other) | Any other | `Backend` |
//! | RowNotFound | N/A | `NotFound` |
//! | Other | N/A | `Backend` |

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use async_trait::async_trait;
use bayu_auth::{Credential, CredentialStore, LogoutOutcome, Role, SessionLog, SessionLogEntry};
use bayu_core::{RoleId, SessionLogId, StoreError, StoreResult, UserId};

use crate::directory::{Directory, NewUser, RoleRecord, UserRecord};

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some(UNIQUE_VIOLATION) | Some(FOREIGN_KEY_VIOLATION) => StoreError::Conflict(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::RowNotFound => StoreError::NotFound(format!("no row in {}", operation)),
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {}", operation))
        }
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}

fn decode_err(operation: &str) -> impl Fn(sqlx::Error) -> StoreError + '_ {
    move |e| StoreError::backend(format!("failed to decode row in {}: {}", operation, e))
}

const SELECT_USER_WITH_ROLE: &str = r#"
    SELECT u.id, u.username, u.email, u.password_hash, u.role_id, r.name AS role_name
    FROM users u
    JOIN roles r ON r.id = u.role_id
"#;

fn credential_from_row(row: &PgRow) -> Result<Credential, sqlx::Error> {
    Ok(Credential {
        id: UserId::from_uuid(row.try_get::<Uuid, _>("id")?),
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        role_id: RoleId::from_uuid(row.try_get::<Uuid, _>("role_id")?),
        role_name: Role::new(row.try_get::<String, _>("role_name")?),
    })
}

fn user_from_row(row: &PgRow) -> Result<UserRecord, sqlx::Error> {
    Ok(UserRecord {
        id: UserId::from_uuid(row.try_get::<Uuid, _>("id")?),
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        role_id: RoleId::from_uuid(row.try_get::<Uuid, _>("role_id")?),
        role_name: Role::new(row.try_get::<String, _>("role_name")?),
    })
}

fn role_from_row(row: &PgRow) -> Result<RoleRecord, sqlx::Error> {
    Ok(RoleRecord {
        id: RoleId::from_uuid(row.try_get::<Uuid, _>("id")?),
        name: Role::new(row.try_get::<String, _>("name")?),
        description: row.try_get("description")?,
    })
}

fn session_from_row(row: &PgRow) -> Result<SessionLogEntry, sqlx::Error> {
    Ok(SessionLogEntry {
        id: SessionLogId::new(row.try_get::<i64, _>("id")?),
        user_id: UserId::from_uuid(row.try_get::<Uuid, _>("user_id")?),
        login_at: row.try_get::<DateTime<Utc>, _>("login_at")?,
        logout_at: row.try_get::<Option<DateTime<Utc>>, _>("logout_at")?,
    })
}

/// Users and roles in Postgres. Serves both the login flow and the directory.
#[derive(Debug, Clone)]
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PostgresUserStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Credential>> {
        let sql = format!("{SELECT_USER_WITH_ROLE} WHERE u.email = $1");
        let row = sqlx::query(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_by_email", e))?;

        row.as_ref()
            .map(credential_from_row)
            .transpose()
            .map_err(decode_err("find_by_email"))
    }

    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<Credential>> {
        let sql = format!("{SELECT_USER_WITH_ROLE} WHERE u.id = $1");
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_by_id", e))?;

        row.as_ref()
            .map(credential_from_row)
            .transpose()
            .map_err(decode_err("find_by_id"))
    }
}

#[async_trait]
impl Directory for PostgresUserStore {
    async fn ensure_role(&self, name: &str, description: &str) -> StoreResult<RoleId> {
        sqlx::query(
            r#"
            INSERT INTO roles (id, name, description)
            VALUES ($1, $2, $3)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(description)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("ensure_role", e))?;

        let row = sqlx::query("SELECT id FROM roles WHERE name = $1")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_role", e))?;

        row.try_get::<Uuid, _>("id")
            .map(RoleId::from_uuid)
            .map_err(decode_err("ensure_role"))
    }

    async fn find_role_by_name(&self, name: &str) -> StoreResult<Option<RoleRecord>> {
        let row = sqlx::query("SELECT id, name, description FROM roles WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_role_by_name", e))?;

        row.as_ref()
            .map(role_from_row)
            .transpose()
            .map_err(decode_err("find_role_by_name"))
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        let sql = format!("{SELECT_USER_WITH_ROLE} WHERE u.email = $1");
        let row = sqlx::query(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user_by_email", e))?;

        row.as_ref()
            .map(user_from_row)
            .transpose()
            .map_err(decode_err("find_user_by_email"))
    }

    async fn insert_user(&self, user: NewUser) -> StoreResult<UserId> {
        let id = UserId::new();
        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, role_id)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(id.as_uuid())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_user", e))?;

        Ok(id)
    }

    async fn list_users(&self) -> StoreResult<Vec<UserRecord>> {
        let sql = format!("{SELECT_USER_WITH_ROLE} ORDER BY u.username ASC");
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_users", e))?;

        rows.iter()
            .map(user_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(decode_err("list_users"))
    }

    async fn list_roles(&self) -> StoreResult<Vec<RoleRecord>> {
        let rows = sqlx::query("SELECT id, name, description FROM roles ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_roles", e))?;

        rows.iter()
            .map(role_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(decode_err("list_roles"))
    }
}

/// `user_logs` table.
#[derive(Debug, Clone)]
pub struct PostgresSessionLog {
    pool: PgPool,
}

impl PostgresSessionLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionLog for PostgresSessionLog {
    async fn record_login(&self, user_id: UserId, at: DateTime<Utc>) -> StoreResult<SessionLogId> {
        let row = sqlx::query("INSERT INTO user_logs (user_id, login_at) VALUES ($1, $2) RETURNING id")
            .bind(user_id.as_uuid())
            .bind(at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("record_login", e))?;

        row.try_get::<i64, _>("id")
            .map(SessionLogId::new)
            .map_err(decode_err("record_login"))
    }

    async fn record_logout(&self, id: SessionLogId, at: DateTime<Utc>) -> StoreResult<LogoutOutcome> {
        // Only an open entry is updated, so concurrent logouts race harmlessly.
        let updated = sqlx::query(
            "UPDATE user_logs SET logout_at = $2 WHERE id = $1 AND logout_at IS NULL",
        )
        .bind(id.get())
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("record_logout", e))?;

        if updated.rows_affected() > 0 {
            return Ok(LogoutOutcome::Closed);
        }

        let exists: bool = sqlx::query("SELECT EXISTS (SELECT 1 FROM user_logs WHERE id = $1) AS present")
            .bind(id.get())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("record_logout", e))?
            .try_get("present")
            .map_err(decode_err("record_logout"))?;

        if exists {
            Ok(LogoutOutcome::AlreadyClosed)
        } else {
            Err(StoreError::not_found(format!("session log entry {id}")))
        }
    }

    async fn find(&self, id: SessionLogId) -> StoreResult<Option<SessionLogEntry>> {
        let row = sqlx::query("SELECT id, user_id, login_at, logout_at FROM user_logs WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_session", e))?;

        row.as_ref()
            .map(session_from_row)
            .transpose()
            .map_err(decode_err("find_session"))
    }
}
