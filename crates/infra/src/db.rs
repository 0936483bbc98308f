//! Postgres pool construction and schema bootstrap.

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use bayu_core::StoreError;

use crate::postgres::map_sqlx_error;

pub const CONNECT_ATTEMPTS: u32 = 5;
pub const CONNECT_RETRY_DELAY: Duration = Duration::from_secs(5);
pub const MAX_CONNECTIONS: u32 = 25;
pub const MAX_CONNECTION_LIFETIME: Duration = Duration::from_secs(5 * 60);

fn pool_options() -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .max_lifetime(MAX_CONNECTION_LIFETIME)
}

/// Connect with the default retry policy.
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    connect_with_retry(database_url, CONNECT_ATTEMPTS, CONNECT_RETRY_DELAY).await
}

/// Try to open a pool up to `attempts` times, sleeping `delay` between tries.
/// The last driver error is returned if every attempt fails.
pub async fn connect_with_retry(
    database_url: &str,
    attempts: u32,
    delay: Duration,
) -> Result<PgPool, sqlx::Error> {
    let attempts = attempts.max(1);
    let mut attempt = 1;

    loop {
        match pool_options().connect(database_url).await {
            Ok(pool) => {
                tracing::info!(attempt, "connected to postgres");
                return Ok(pool);
            }
            Err(e) if attempt < attempts => {
                tracing::warn!(attempt, attempts, error = %e, "postgres connection failed, retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                tracing::error!(attempts, error = %e, "giving up on postgres");
                return Err(e);
            }
        }
    }
}

const SCHEMA: &[(&str, &str)] = &[
    (
        "roles",
        r#"
        CREATE TABLE IF NOT EXISTS roles (
            id UUID PRIMARY KEY,
            name VARCHAR(50) UNIQUE NOT NULL,
            description TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    ),
    (
        "users",
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY,
            username VARCHAR(100) NOT NULL,
            email VARCHAR(255) UNIQUE NOT NULL,
            password_hash VARCHAR(255) NOT NULL,
            role_id UUID NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            CONSTRAINT fk_users_role FOREIGN KEY (role_id) REFERENCES roles(id) ON DELETE RESTRICT
        )
        "#,
    ),
    (
        "user_logs",
        r#"
        CREATE TABLE IF NOT EXISTS user_logs (
            id BIGSERIAL PRIMARY KEY,
            user_id UUID NOT NULL,
            login_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            logout_at TIMESTAMPTZ NULL,
            CONSTRAINT user_logs_user_id_fkey FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        )
        "#,
    ),
];

/// Create the `roles`, `users` and `user_logs` tables if they are missing.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
    for &(table, ddl) in SCHEMA {
        sqlx::query(ddl)
            .execute(pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        tracing::debug!(table, "table ensured");
    }
    tracing::info!("database schema ready");
    Ok(())
}
